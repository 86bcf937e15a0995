//! The public binding contract.
//!
//! Hosts and other copies of the library find the palette by name, not by
//! reference, so these names are fixed for a given contract version. A
//! packaging step that renames or mangles identifiers must exclude every
//! name in [`RESERVED_NAMES`].

use serde::Serialize;

/// Library name bundles are published under.
pub const LIBRARY: &str = "angora";

/// Global binding that holds the shared palette registry.
pub const COLORS: &str = "colors";

/// Global binding that holds the publisher.
pub const PUSH_COLORS: &str = "pushColors";

/// Names no bundle export may claim.
pub const RESERVED_NAMES: &[&str] = &[COLORS, PUSH_COLORS];

/// Bumped whenever a reserved name or its meaning changes.
pub const CONTRACT_VERSION: u32 = 1;

pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

/// Serializable description of the contract, for packaging tools.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BindingContract {
    pub library: &'static str,
    pub version: u32,
    pub registry: &'static str,
    pub publisher: &'static str,
    pub reserved: Vec<&'static str>,
}

impl BindingContract {
    pub fn current() -> Self {
        Self {
            library: LIBRARY,
            version: CONTRACT_VERSION,
            registry: COLORS,
            publisher: PUSH_COLORS,
            reserved: RESERVED_NAMES.to_vec(),
        }
    }
}
