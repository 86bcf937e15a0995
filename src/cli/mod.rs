pub mod completions;
pub mod contract;
pub mod get;
pub mod init;
pub mod load;
pub mod sample;
pub mod validate;
pub mod watch;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::discovery::Discovery;
use crate::environment::Environment;
use crate::error::Result;
use crate::loader::{initialize, load_bundle};
use crate::output::{display_path, plural, Printer};
use crate::parser::parse_bundle_file;
use crate::publish::{JsonFileSink, Publisher};
use crate::registry::PaletteRegistry;

/// angora - shared colour palette registry
#[derive(Parser, Debug)]
#[command(name = "angora")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Emit debug logs (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load bundles and print the merged palette
    Load(load::LoadArgs),

    /// Print the value of one token after loading bundles
    Get(get::GetArgs),

    /// Validate bundles without publishing
    Validate(validate::ValidateArgs),

    /// Load bundles, then reload and republish whenever one changes
    Watch(watch::WatchArgs),

    /// Seed a bundle from the most common colours of a PNG
    Sample(sample::SampleArgs),

    /// Generate an angora.yaml config from discovered bundles
    Init(init::InitArgs),

    /// Print the reserved binding names as JSON
    Contract,

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// The shared state a CLI command works against.
pub struct Session {
    pub env: &'static Environment,
    pub registry: PaletteRegistry,
    pub publisher: Publisher,
}

/// Install the global environment, attach the JSON sink (if any) and load
/// every discovered bundle file in order.
///
/// When nothing is found the empty registry is still published.
pub fn start_session(
    discovery: &Discovery,
    json: Option<PathBuf>,
    printer: &Printer,
) -> Result<Session> {
    let env = Environment::install();
    let (registry, publisher) = initialize(env)?;

    if let Some(path) = json.or_else(|| discovery.json_output()) {
        printer.info("Publishing", &display_path(&path));
        publisher.subscribe(JsonFileSink::new(path));
    }

    if discovery.files.is_empty() {
        printer.warning("Empty", "no bundle files found");
        publisher.push_colors(&registry);
    }

    for file in &discovery.files {
        load_file(env, file, printer)?;
    }

    Ok(Session {
        env,
        registry,
        publisher,
    })
}

/// Parse and load one bundle file, printing a status line per bundle.
pub fn load_file(env: &Environment, file: &Path, printer: &Printer) -> Result<usize> {
    let bundles = parse_bundle_file(file)?;
    for bundle in &bundles {
        let report = load_bundle(env, bundle)?;
        let mut detail = vec![
            format!("{} new", report.merge.inserted),
            format!("{} overwritten", report.merge.overwritten),
        ];
        if !report.exports.is_empty() {
            detail.push(plural(report.exports.len(), "export", "exports"));
        }
        printer.status(
            "Loaded",
            &format!(
                "{} {}",
                report.bundle,
                printer.dim(&format!("({})", detail.join(", ")))
            ),
        );
    }
    Ok(bundles.len())
}
