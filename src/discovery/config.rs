//! Project configuration (angora.yaml) parsing.
//!
//! The config names the directories to scan for bundles, paths to skip,
//! where published palettes are written and how the watcher behaves.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AngoraError, Result};

/// Project configuration loaded from angora.yaml.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directories or files to scan for bundles. Empty means the project root.
    pub sources: Vec<String>,

    /// Patterns to exclude from discovery.
    pub excludes: Vec<String>,

    pub publish: PublishConfig,

    pub watch: WatchConfig,
}

/// Where published palettes go.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// Write every published palette to this JSON file.
    pub json: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    /// Events for the same file closer together than this are coalesced.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: 200 }
    }
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AngoraError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        // An empty file deserializes as null rather than an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| AngoraError::Parse {
            message: format!("Invalid config: {}", e),
            help: Some("Check angora.yaml syntax".to_string()),
        })
    }

    /// Check if a path should be excluded based on exclude patterns.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path = path.to_string_lossy().replace('\\', "/");
        self.excludes
            .iter()
            .any(|pattern| matches_pattern(&path, pattern))
    }

    /// Source paths, defaulting to the project root.
    pub fn effective_sources(&self) -> Vec<String> {
        if self.sources.is_empty() {
            vec![".".to_string()]
        } else {
            self.sources.clone()
        }
    }

    /// JSON output path resolved against the project root.
    pub fn json_output(&self, root: &Path) -> Option<PathBuf> {
        self.publish.json.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                root.join(p)
            }
        })
    }
}

/// Minimal glob matching: `*.ext`, `dir/*`, `**/dir/*`, or a substring.
fn matches_pattern(path: &str, pattern: &str) -> bool {
    if let Some(rest) = pattern.strip_prefix("**/") {
        return match rest.strip_suffix("/*") {
            Some(dir) => {
                path.starts_with(&format!("{}/", dir)) || path.contains(&format!("/{}/", dir))
            }
            None => path.ends_with(rest) || path.contains(rest),
        };
    }

    if let Some(suffix) = pattern.strip_prefix('*') {
        if !pattern.contains('/') {
            return path.ends_with(suffix);
        }
    }

    if let Some(dir) = pattern.strip_suffix("/*") {
        return path.starts_with(&format!("{}/", dir)) || path.contains(&format!("/{}/", dir));
    }

    path.contains(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
sources:
  - palettes/
  - vendor/theme.bundle.yaml
excludes:
  - "*.bak"
  - "**/drafts/*"
publish:
  json: dist/colors.json
watch:
  debounce_ms: 50
"#;
        let config = Config::parse(yaml).unwrap();

        assert_eq!(config.sources, vec!["palettes/", "vendor/theme.bundle.yaml"]);
        assert_eq!(config.excludes, vec!["*.bak", "**/drafts/*"]);
        assert_eq!(config.publish.json, Some(PathBuf::from("dist/colors.json")));
        assert_eq!(config.watch.debounce(), Duration::from_millis(50));
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.effective_sources(), vec!["."]);
        assert_eq!(config.watch.debounce_ms, 200);
        assert!(config.json_output(Path::new("/p")).is_none());
    }

    #[test]
    fn test_partial_watch_section_keeps_defaults() {
        let config = Config::parse("watch: {}").unwrap();
        assert_eq!(config.watch.debounce_ms, 200);
    }

    #[test]
    fn test_unknown_key_is_error() {
        assert!(Config::parse("sourcez: [a]").is_err());
    }

    #[test]
    fn test_json_output_relative_to_root() {
        let config = Config::parse("publish:\n  json: out/c.json").unwrap();
        assert_eq!(
            config.json_output(Path::new("/project")),
            Some(PathBuf::from("/project/out/c.json"))
        );
    }

    #[test]
    fn test_is_excluded() {
        let config = Config {
            excludes: vec![
                "*.bak".to_string(),
                "**/drafts/*".to_string(),
                "vendor/*".to_string(),
            ],
            ..Default::default()
        };

        assert!(config.is_excluded(Path::new("a/b.bundle.yaml.bak")));
        assert!(config.is_excluded(Path::new("palettes/drafts/x.bundle.yaml")));
        assert!(config.is_excluded(Path::new("drafts/x.bundle.yaml")));
        assert!(config.is_excluded(Path::new("vendor/y.bundle.yaml")));
        assert!(!config.is_excluded(Path::new("palettes/base.bundle.yaml")));
    }
}
