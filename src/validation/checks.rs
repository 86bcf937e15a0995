//! Validation checks over a list of bundles in load order.

use std::collections::{HashMap, HashSet};

use crate::contract;
use crate::environment::Environment;
use crate::error::AngoraError;
use crate::loader::load_bundle;
use crate::parser::Bundle;

use super::warning::{Diagnostic, ValidationResult};

pub const INVALID_TOKEN_NAME: &str = "angora::validate::invalid-token-name";
pub const RESERVED_EXPORT: &str = "angora::validate::reserved-export";
pub const UNRESOLVED_COLOR: &str = "angora::validate::unresolved-color";
pub const DUPLICATE_BUNDLE: &str = "angora::validate::duplicate-bundle";
pub const OVERRIDDEN_TOKEN: &str = "angora::validate::overridden-token";
pub const EMPTY_BUNDLE: &str = "angora::validate::empty-bundle";

/// Token names must be identifier-like so every consumer can address them.
pub fn is_valid_token_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

pub fn check_token_names(bundles: &[Bundle]) -> ValidationResult {
    let mut result = ValidationResult::new();

    for bundle in bundles {
        for name in bundle.colors.keys() {
            if !is_valid_token_name(name) {
                result.push(
                    Diagnostic::error(
                        INVALID_TOKEN_NAME,
                        format!("Bundle '{}' defines invalid token name '{}'", bundle.name, name),
                    )
                    .with_help("Use letters, digits, '_', '-' or '.', starting with a letter or '_'"),
                );
            }
        }
    }

    result
}

pub fn check_reserved_exports(bundles: &[Bundle]) -> ValidationResult {
    let mut result = ValidationResult::new();

    for bundle in bundles {
        for name in bundle.exports.keys().filter(|n| contract::is_reserved(n)) {
            result.push(
                Diagnostic::error(
                    RESERVED_EXPORT,
                    format!("Bundle '{}' exports reserved name '{}'", bundle.name, name),
                )
                .with_help(format!(
                    "Reserved names: {}",
                    contract::RESERVED_NAMES.join(", ")
                )),
            );
        }
    }

    result
}

/// Load every bundle, in order, into a scratch environment and report the
/// definitions that fail to resolve.
///
/// Bundles with reserved exports are loaded without their exports so their
/// colours are still checked.
pub fn check_resolution(bundles: &[Bundle]) -> ValidationResult {
    let mut result = ValidationResult::new();
    let env = Environment::new();

    for bundle in bundles {
        let mut candidate = bundle.clone();
        candidate.exports.retain(|name, _| !contract::is_reserved(name));

        match load_bundle(&env, &candidate) {
            Ok(_) => {}
            Err(AngoraError::Parse { message, help }) => {
                let mut diagnostic = Diagnostic::error(UNRESOLVED_COLOR, message);
                if let Some(help) = help {
                    diagnostic = diagnostic.with_help(help);
                }
                result.push(diagnostic);
            }
            Err(other) => {
                result.push(Diagnostic::error(UNRESOLVED_COLOR, other.to_string()));
            }
        }
    }

    result
}

pub fn check_duplicate_bundles(bundles: &[Bundle]) -> ValidationResult {
    let mut result = ValidationResult::new();
    let mut seen = HashSet::new();

    for bundle in bundles {
        if !seen.insert(bundle.name.as_str()) {
            result.push(
                Diagnostic::warning(
                    DUPLICATE_BUNDLE,
                    format!("Bundle '{}' is loaded more than once", bundle.name),
                )
                .with_help("Later loads overwrite the tokens of earlier ones"),
            );
        }
    }

    result
}

/// Tokens defined by more than one bundle; the last one wins.
pub fn check_overridden_tokens(bundles: &[Bundle]) -> ValidationResult {
    let mut result = ValidationResult::new();
    let mut owner: HashMap<&str, &str> = HashMap::new();

    for bundle in bundles {
        for name in bundle.colors.keys() {
            if let Some(previous) = owner.insert(name.as_str(), bundle.name.as_str()) {
                if previous != bundle.name {
                    result.push(Diagnostic::warning(
                        OVERRIDDEN_TOKEN,
                        format!(
                            "Token '{}' from bundle '{}' is overridden by bundle '{}'",
                            name, previous, bundle.name
                        ),
                    ));
                }
            }
        }
    }

    result
}

pub fn check_empty_bundles(bundles: &[Bundle]) -> ValidationResult {
    let mut result = ValidationResult::new();

    for bundle in bundles {
        if bundle.colors.is_empty() && bundle.exports.is_empty() {
            result.push(
                Diagnostic::warning(
                    EMPTY_BUNDLE,
                    format!("Bundle '{}' defines no colors and no exports", bundle.name),
                )
                .with_help("Add a `colors` or `exports` section, or remove the bundle"),
            );
        }
    }

    result
}
