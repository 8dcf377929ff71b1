//! Configuration parsing and management.

use crate::index::IndexOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Main configuration struct matching the notegen.yml schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Regexes matched against paths relative to the content root
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    #[serde(default = "default_related_limit")]
    pub related_limit: usize,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_base_url() -> String {
    String::from("/")
}

fn default_related_limit() -> usize {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_title")]
    pub title: String,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub description: String,
}

fn default_site_title() -> String {
    String::from("Study Notes")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_content_dir")]
    pub content: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output: PathBuf,
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("content")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("build")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8000
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = if contents.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&contents)?
        };

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Load the config file if it exists, otherwise fall back to defaults
    /// rooted next to where the config file would have been.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        tracing::debug!("No config at {:?}, using defaults", path);
        Ok(Config {
            config_path: Some(path.to_path_buf()),
            ..Config::default()
        })
    }

    /// Get the content directory, resolved relative to config file
    pub fn content_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.content)
    }

    /// Get the output directory, resolved relative to config file
    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.output)
    }

    /// Options handed to the content index builder
    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            ignore_patterns: self.ignore_patterns.clone(),
        }
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(config_path) = &self.config_path {
            match config_path.parent() {
                Some(parent) => parent.join(path),
                None => path.to_path_buf(),
            }
        } else {
            path.to_path_buf()
        }
    }

    /// Normalized base URL with leading and trailing slash ("/foo/" or "/")
    pub fn normalized_base_url(&self) -> String {
        normalize_base_url(&self.base_url)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            paths: PathsConfig::default(),
            server: ServerConfig::default(),
            base_url: default_base_url(),
            ignore_patterns: Vec::new(),
            related_limit: default_related_limit(),
            config_path: None,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_site_title(),
            author: String::new(),
            description: String::new(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            content: default_content_dir(),
            output: default_output_dir(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Ensure base URLs have a leading and trailing slash
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "/".to_string();
    }

    let mut s = trimmed.to_string();
    if !s.starts_with('/') {
        s.insert(0, '/');
    }
    if !s.ends_with('/') {
        s.push('/');
    }

    // Collapse duplicate slashes
    while s.contains("//") {
        s = s.replace("//", "/");
    }

    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_values() {
        let config = Config::default();

        assert_eq!(config.base_url, "/");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.related_limit, 5);
        assert_eq!(config.site.title, "Study Notes");
        assert_eq!(config.paths.content, PathBuf::from("content"));
        assert_eq!(config.paths.output, PathBuf::from("build"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notegen.yml");
        fs::write(
            &path,
            "site:\n  title: Physics\npaths:\n  content: notes\nrelated_limit: 3\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.site.title, "Physics");
        assert_eq!(config.related_limit, 3);
        assert_eq!(config.content_dir(), dir.path().join("notes"));
        assert_eq!(config.output_dir(), dir.path().join("build"));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("notegen.yml")).unwrap();
        assert_eq!(config.content_dir(), dir.path().join("content"));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notegen.yml");
        fs::write(&path, "site: [unclosed").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url(""), "/");
        assert_eq!(normalize_base_url("blog"), "/blog/");
        assert_eq!(normalize_base_url("/blog//notes"), "/blog/notes/");
        assert_eq!(normalize_base_url("  /  "), "/");
    }
}
