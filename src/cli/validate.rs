use std::path::PathBuf;

use clap::Args;

use crate::discovery::discover_args;
use crate::error::{AngoraError, Result};
use crate::output::{display_path, plural, Printer};
use crate::parser::parse_bundle_file;
use crate::validation::{print_diagnostics, validate_bundles};

/// Validate bundles without publishing
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Bundle files or directories, in load order (default: angora.yaml or current directory)
    pub paths: Vec<PathBuf>,
}

pub fn run(args: ValidateArgs, printer: &Printer) -> Result<()> {
    let discovery = discover_args(&args.paths)?;

    let mut bundles = Vec::new();
    for file in &discovery.files {
        let parsed = parse_bundle_file(file)?;
        tracing::debug!(file = %display_path(file), bundles = parsed.len(), "parsed");
        bundles.extend(parsed);
    }

    printer.status(
        "Checking",
        &format!(
            "{} in {}",
            plural(bundles.len(), "bundle", "bundles"),
            plural(discovery.files.len(), "file", "files")
        ),
    );

    let result = validate_bundles(&bundles);
    print_diagnostics(&result, printer);

    if result.has_errors() {
        return Err(AngoraError::Validation {
            message: format!(
                "validation failed with {}",
                plural(result.error_count(), "error", "errors")
            ),
            help: None,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_validate_clean_directory() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("base.bundle.yaml"),
            "name: base\ncolors:\n  ink: \"#000\"\n",
        )
        .unwrap();

        let args = ValidateArgs {
            paths: vec![dir.path().to_path_buf()],
        };
        assert!(run(args, &Printer::with_color(false)).is_ok());
    }

    #[test]
    fn test_validate_reports_errors() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("bad.bundle.yaml"),
            "name: bad\ncolors:\n  edge: \"$missing\"\n",
        )
        .unwrap();

        let args = ValidateArgs {
            paths: vec![dir.path().to_path_buf()],
        };
        let err = run(args, &Printer::with_color(false)).unwrap_err();
        assert!(matches!(err, AngoraError::Validation { .. }));
    }
}
