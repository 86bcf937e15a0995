//! Validation for bundles.
//!
//! Runs a suite of checks over bundles in load order and reports errors and
//! warnings. Used by `angora validate`.

mod checks;
mod warning;

pub use checks::{
    is_valid_token_name, DUPLICATE_BUNDLE, EMPTY_BUNDLE, INVALID_TOKEN_NAME, OVERRIDDEN_TOKEN,
    RESERVED_EXPORT, UNRESOLVED_COLOR,
};
pub use warning::{Diagnostic, Severity, ValidationResult};

use crate::output::Printer;
use crate::parser::Bundle;

/// Run all validation checks against bundles in load order.
pub fn validate_bundles(bundles: &[Bundle]) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.merge(checks::check_token_names(bundles));
    result.merge(checks::check_reserved_exports(bundles));
    result.merge(checks::check_resolution(bundles));
    result.merge(checks::check_duplicate_bundles(bundles));
    result.merge(checks::check_overridden_tokens(bundles));
    result.merge(checks::check_empty_bundles(bundles));

    result
}

/// Print diagnostics and a summary line to stderr.
pub fn print_diagnostics(result: &ValidationResult, printer: &Printer) {
    for d in result.iter() {
        let label = printer.severity(&d.severity.to_string(), d.severity == Severity::Error);
        eprintln!("{}[{}]: {}", label, d.code, d.message);
        if let Some(help) = &d.help {
            eprintln!("  {} {}", printer.dim("help:"), help);
        }
    }

    let errors = result.error_count();
    let warnings = result.warning_count();

    if errors > 0 {
        printer.error(
            "Failed",
            &format!("{} error(s), {} warning(s)", errors, warnings),
        );
    } else if warnings > 0 {
        printer.warning("Finished", &format!("{} warning(s)", warnings));
    } else {
        printer.success("Finished", "no problems found");
    }
}
