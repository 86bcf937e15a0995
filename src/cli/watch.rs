//! Watch command implementation.
//!
//! Loads every bundle once, then reloads a bundle file and republishes each
//! time it is created or modified. Loads are additive: tokens from deleted
//! files stay in the registry until the process restarts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use clap::Args;
use notify::{recommended_watcher, Event, EventKind, RecursiveMode, Watcher};

use crate::discovery::{discover_args, is_bundle_file, Discovery};
use crate::error::{AngoraError, Result};
use crate::output::{display_path, plural, Printer};

use super::{load_file, start_session};

/// Load bundles, then reload and republish whenever one changes
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Bundle files or directories to watch (default: angora.yaml or current directory)
    pub paths: Vec<PathBuf>,

    /// Also write every published palette to this JSON file
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Coalesce events for the same file closer together than this
    #[arg(long, value_name = "MS")]
    pub debounce: Option<u64>,
}

/// Drops repeat events for a path that arrive within `window` of the last
/// accepted one. Editors often write a file several times per save.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last: HashMap<PathBuf, Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last: HashMap::new(),
        }
    }

    pub fn accept(&mut self, path: &Path, now: Instant) -> bool {
        match self.last.get(path) {
            Some(seen) if now.saturating_duration_since(*seen) < self.window => false,
            _ => {
                self.last.insert(path.to_path_buf(), now);
                true
            }
        }
    }
}

pub fn run(args: WatchArgs, printer: &Printer) -> Result<()> {
    let discovery = discover_args(&args.paths)?;
    let session = start_session(&discovery, args.json, printer)?;

    let window = args
        .debounce
        .map(Duration::from_millis)
        .unwrap_or_else(|| discovery.config.watch.debounce());
    let mut debouncer = Debouncer::new(window);

    let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
    let mut watcher = recommended_watcher(move |res: notify::Result<Event>| {
        let _ = tx.send(res);
    })
    .map_err(|e| watch_error(&discovery.root, e))?;

    let targets = watch_targets(&discovery, &args.paths);
    for target in &targets {
        let mode = if target.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(target, mode)
            .map_err(|e| watch_error(target, e))?;
    }

    printer.info(
        "Watching",
        &format!(
            "{} ({} loaded, Ctrl-C to stop)",
            plural(targets.len(), "path", "paths"),
            plural(session.registry.len(), "token", "tokens")
        ),
    );

    for res in rx {
        let event = match res {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "watch error");
                continue;
            }
        };

        if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
            continue;
        }

        for path in event.paths {
            if !is_watched(&discovery, &path) || !path.is_file() {
                continue;
            }
            if !debouncer.accept(&path, Instant::now()) {
                tracing::debug!(path = %path.display(), "debounced");
                continue;
            }

            printer.info("Changed", &display_path(&path));
            if let Err(e) = load_file(session.env, &path, printer) {
                printer.error("Rejected", &format!("{}: {}", display_path(&path), e));
            }
        }
    }

    Ok(())
}

/// Directories and files handed to the watcher.
fn watch_targets(discovery: &Discovery, paths: &[PathBuf]) -> Vec<PathBuf> {
    let targets: Vec<PathBuf> = if paths.is_empty() {
        discovery
            .config
            .effective_sources()
            .iter()
            .map(|source| discovery.root.join(source))
            .collect()
    } else {
        paths.to_vec()
    };

    targets.into_iter().filter(|p| p.exists()).collect()
}

fn is_watched(discovery: &Discovery, path: &Path) -> bool {
    if discovery.files.iter().any(|f| same_file(f, path)) {
        return true;
    }
    if !is_bundle_file(path) {
        return false;
    }
    let root = discovery
        .root
        .canonicalize()
        .unwrap_or_else(|_| discovery.root.clone());
    let relative = path.strip_prefix(&root).unwrap_or(path);
    !discovery.config.is_excluded(relative)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn watch_error(path: &Path, e: notify::Error) -> AngoraError {
    AngoraError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to watch: {}", e),
    }
}
