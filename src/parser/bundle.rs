//! Bundle manifest parser.
//!
//! Parses `.bundle.yaml` files. A file may hold several bundles separated by
//! `---`; they load in file order.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AngoraError, Result};
use crate::types::PaletteBuilder;

/// One loadable unit: default colour tokens plus exported values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bundle {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Token name -> colour definition (hex, `$reference`, or expression).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub colors: BTreeMap<String, String>,

    /// Values copied onto the environment under their own names.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub exports: BTreeMap<String, serde_json::Value>,
}

impl Bundle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_color(mut self, name: impl Into<String>, definition: impl Into<String>) -> Self {
        self.colors.insert(name.into(), definition.into());
        self
    }

    pub fn with_export(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.exports.insert(name.into(), value);
        self
    }

    /// A builder holding this bundle's colour definitions.
    pub fn palette_builder(&self) -> PaletteBuilder {
        let mut builder = PaletteBuilder::new();
        for (name, definition) in &self.colors {
            builder.define(name.as_str(), definition.as_str());
        }
        builder
    }

    /// Display label: `name@version` or just `name`.
    pub fn label(&self) -> String {
        match &self.version {
            Some(version) => format!("{}@{}", self.name, version),
            None => self.name.clone(),
        }
    }
}

/// Parse every bundle in a YAML source.
pub fn parse_bundles(source: &str) -> Result<Vec<Bundle>> {
    let mut bundles = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_str(source).enumerate() {
        let value = serde_yaml::Value::deserialize(document).map_err(|e| AngoraError::Parse {
            message: format!("Invalid bundle YAML: {}", e),
            help: None,
        })?;

        // Blank documents (e.g. a trailing `---`) are skipped.
        if value.is_null() {
            continue;
        }

        let bundle: Bundle = serde_yaml::from_value(value).map_err(|e| AngoraError::Parse {
            message: format!("Invalid bundle #{}: {}", index + 1, e),
            help: Some(
                "Bundles take `name`, `version`, `colors` and `exports`; quote hex values like \"#1a1a2e\""
                    .to_string(),
            ),
        })?;

        if bundle.name.trim().is_empty() {
            return Err(AngoraError::Parse {
                message: format!("Bundle #{} has an empty name", index + 1),
                help: None,
            });
        }

        bundles.push(bundle);
    }

    Ok(bundles)
}

/// Read and parse a bundle file.
pub fn parse_bundle_file(path: &Path) -> Result<Vec<Bundle>> {
    let source = fs::read_to_string(path).map_err(|e| AngoraError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read bundle: {}", e),
    })?;

    parse_bundles(&source).map_err(|e| match e {
        AngoraError::Parse { message, help } => AngoraError::Parse {
            message: format!("{}: {}", path.display(), message),
            help,
        },
        other => other,
    })
}
