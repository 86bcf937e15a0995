//! Bundle discovery for angora projects.
//!
//! Finds bundle files either from an `angora.yaml` config or by scanning
//! explicit paths. The returned file list is the load order.
//!
//! # Example
//!
//! ```ignore
//! use angora::discovery::discover;
//!
//! let found = discover("./my-project")?;
//! println!("Found {} bundle files", found.files.len());
//! ```

mod config;
mod scanner;

use std::path::{Path, PathBuf};

use crate::error::Result;

pub use config::{Config, PublishConfig, WatchConfig};
pub use scanner::{is_bundle_file, scan_directory, scan_sources, BUNDLE_SUFFIXES};

/// The name of the config file.
pub const CONFIG_FILENAME: &str = "angora.yaml";

/// Result of discovering bundles.
#[derive(Debug)]
pub struct Discovery {
    /// Project root the config and relative paths are resolved against.
    pub root: PathBuf,

    /// Loaded config (default if no angora.yaml was found).
    pub config: Config,

    pub has_config: bool,

    /// Bundle files in load order.
    pub files: Vec<PathBuf>,
}

impl Discovery {
    /// JSON output path from the config, resolved against the root.
    pub fn json_output(&self) -> Option<PathBuf> {
        self.config.json_output(&self.root)
    }
}

/// Discover bundles in a project directory.
///
/// Uses `angora.yaml` in `root` when present; otherwise scans all of `root`.
pub fn discover(root: impl AsRef<Path>) -> Result<Discovery> {
    let root = root.as_ref().to_path_buf();

    let config_path = root.join(CONFIG_FILENAME);
    let (config, has_config) = if config_path.exists() {
        (Config::load(&config_path)?, true)
    } else {
        (Config::default(), false)
    };

    let files = scan_sources(&config.effective_sources(), &root, &config);

    Ok(Discovery {
        root,
        config,
        has_config,
        files,
    })
}

/// Discover bundles from explicit paths (no config lookup).
///
/// Files are kept in the order given; directories are scanned.
pub fn discover_paths(paths: &[PathBuf]) -> Result<Discovery> {
    let config = Config::default();
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            files.extend(scan_directory(path, &config));
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            return Err(crate::error::AngoraError::Io {
                path: path.clone(),
                message: "No such file or directory".to_string(),
            });
        }
    }

    Ok(Discovery {
        root: std::env::current_dir()?,
        config,
        has_config: false,
        files,
    })
}

/// Discover from `paths` when given, otherwise from the current directory.
pub fn discover_args(paths: &[PathBuf]) -> Result<Discovery> {
    if paths.is_empty() {
        discover(".")
    } else {
        discover_paths(paths)
    }
}
