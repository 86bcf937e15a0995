//! angora - a process-wide colour palette registry
//!
//! Bundles contribute default colour tokens to a single registry bound
//! under the reserved name `colors`, then publish it through `pushColors`.
//! Loads are additive: later bundles add or overwrite tokens, nothing is
//! ever reset.

pub mod cli;
pub mod contract;
pub mod discovery;
pub mod environment;
pub mod error;
pub mod loader;
pub mod logging;
pub mod output;
pub mod parser;
pub mod publish;
pub mod registry;
pub mod types;
pub mod validation;

pub use contract::BindingContract;
pub use discovery::{discover, discover_paths, Config, Discovery};
pub use environment::{Binding, Environment};
pub use error::{AngoraError, Result};
pub use loader::{initialize, load_bundle, load_bundles, load_files, load_global, startup, LoadReport};
pub use parser::{parse_bundle_file, parse_bundles, Bundle};
pub use publish::{JsonFileSink, PublishEvent, Publisher, Subscriber};
pub use registry::PaletteRegistry;
pub use types::{Colour, ColourExpr, ColourFn, MergeSummary, Palette, PaletteBuilder};
pub use validation::{validate_bundles, Diagnostic, Severity, ValidationResult};
