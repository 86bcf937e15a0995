//! Log setup for the CLI.
//!
//! Library code emits `tracing` events; the binary installs a fmt
//! subscriber on stderr filtered by `RUST_LOG`. `--verbose` raises the
//! default level from `warn` to `debug`.

use tracing_subscriber::{fmt, EnvFilter};

pub fn init(verbose: bool) {
    let default = if verbose { "angora=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
