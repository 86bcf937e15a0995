//! Init command implementation.
//!
//! Generates an `angora.yaml` config listing the directories that hold
//! bundles.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;

use crate::discovery::{discover, PublishConfig, WatchConfig, CONFIG_FILENAME};
use crate::error::{AngoraError, Result};
use crate::output::{display_path, plural, Printer};

/// Generate an angora.yaml config from discovered bundles
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to scan (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite an existing angora.yaml
    #[arg(long)]
    pub force: bool,

    /// Publish every palette to this JSON file
    #[arg(long)]
    pub json: Option<PathBuf>,
}

pub fn run(args: InitArgs, printer: &Printer) -> Result<()> {
    let config_path = args.path.join(CONFIG_FILENAME);

    if config_path.exists() && !args.force {
        return Err(AngoraError::Validation {
            message: format!("{} already exists", CONFIG_FILENAME),
            help: Some("Use --force to overwrite".to_string()),
        });
    }

    printer.status("Scanning", &display_path(&args.path));
    let discovery = discover(&args.path)?;

    let source_dirs = source_dirs(&discovery.root, &discovery.files);
    let yaml = render_config(&source_dirs, args.json.as_deref())?;

    fs::write(&config_path, &yaml).map_err(|e| AngoraError::Io {
        path: config_path.clone(),
        message: format!("Failed to write config: {}", e),
    })?;

    if !source_dirs.is_empty() {
        let dirs: Vec<&str> = source_dirs.iter().map(String::as_str).collect();
        printer.info("Discovered", &dirs.join(", "));
    }

    printer.success(
        "Created",
        &format!(
            "{} ({} found)",
            CONFIG_FILENAME,
            plural(discovery.files.len(), "bundle file", "bundle files")
        ),
    );

    Ok(())
}

/// Parent directories of `files`, relative to `root`, with a trailing `/`.
fn source_dirs(root: &Path, files: &[PathBuf]) -> BTreeSet<String> {
    files
        .iter()
        .filter_map(|file| file.parent())
        .map(|parent| {
            let relative = parent.strip_prefix(root).unwrap_or(parent);
            if relative == Path::new("") {
                ".".to_string()
            } else {
                format!("{}/", relative.display())
            }
        })
        .collect()
}

/// The subset of `Config` worth writing out; defaults are left implicit.
#[derive(Serialize)]
struct InitConfig<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sources: Vec<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    publish: Option<PublishConfig>,

    watch: WatchConfig,
}

fn render_config(source_dirs: &BTreeSet<String>, json: Option<&Path>) -> Result<String> {
    let only_root = source_dirs.len() == 1 && source_dirs.contains(".");
    let sources = if only_root {
        Vec::new()
    } else {
        source_dirs.iter().map(String::as_str).collect()
    };

    let config = InitConfig {
        sources,
        publish: json.map(|path| PublishConfig {
            json: Some(path.to_path_buf()),
        }),
        watch: WatchConfig::default(),
    };

    serde_yaml::to_string(&config).map_err(|e| AngoraError::Parse {
        message: format!("Failed to serialize config: {}", e),
        help: None,
    })
}
