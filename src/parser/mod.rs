//! Parsers for angora definition files.
//!
//! # Usage
//!
//! ```ignore
//! use angora::parser::parse_bundle_file;
//!
//! for bundle in parse_bundle_file(Path::new("palettes/base.bundle.yaml"))? {
//!     println!("Found: {}", bundle.label());
//! }
//! ```

pub mod bundle;

pub use bundle::{parse_bundle_file, parse_bundles, Bundle};
