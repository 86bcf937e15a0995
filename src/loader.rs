//! Bundle loading.
//!
//! Every load runs the same ordered steps against an environment:
//!
//! 1. make sure `colors` and `pushColors` exist (never resetting them, and
//!    binding neither unless both can be bound)
//! 2. resolve the bundle's colour definitions against the current registry
//! 3. merge the resolved tokens into the registry
//! 4. copy the bundle's exports onto the environment
//! 5. publish the merged registry
//!
//! Anything that can fail (bad definitions, reserved export names) is
//! checked before step 3, so a rejected bundle changes nothing and
//! publishes nothing.

use std::path::PathBuf;

use serde::Serialize;

use crate::contract;
use crate::environment::{Binding, Environment};
use crate::error::{AngoraError, Result};
use crate::parser::{parse_bundle_file, Bundle};
use crate::publish::{PublishEvent, Publisher};
use crate::registry::PaletteRegistry;
use crate::types::MergeSummary;

/// What one load did.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub bundle: String,
    pub merge: MergeSummary,
    pub exports: Vec<String>,
    pub event: PublishEvent,
}

/// Bind `colors` and `pushColors` in `env`, reusing whatever is already
/// there.
///
/// Both bindings are checked before either is written, so a conflict on
/// one leaves the other (including a host-seeded `colors` value) as it was.
pub fn initialize(env: &Environment) -> Result<(PaletteRegistry, Publisher)> {
    let mut bindings = env.lock();
    let registry = PaletteRegistry::from_binding(bindings.get(contract::COLORS))?;
    let publisher = Publisher::from_binding(bindings.get(contract::PUSH_COLORS))?;

    bindings.insert(contract::COLORS.to_string(), Binding::Colors(registry.clone()));
    bindings.insert(
        contract::PUSH_COLORS.to_string(),
        Binding::PushColors(publisher.clone()),
    );
    Ok((registry, publisher))
}

/// Load one bundle into `env`.
pub fn load_bundle(env: &Environment, bundle: &Bundle) -> Result<LoadReport> {
    let (registry, publisher) = initialize(env)?;

    if let Some(name) = bundle.exports.keys().find(|name| contract::is_reserved(name)) {
        return Err(AngoraError::ReservedBinding {
            name: name.clone(),
            bundle: bundle.name.clone(),
        });
    }

    let defaults = bundle
        .palette_builder()
        .build(&registry.snapshot())
        .map_err(|e| match e {
            AngoraError::Parse { message, help } => AngoraError::Parse {
                message: format!("bundle `{}`: {}", bundle.name, message),
                help,
            },
            other => other,
        })?;

    let merge = registry.merge(defaults);

    {
        let mut bindings = env.lock();
        for (name, value) in &bundle.exports {
            bindings.insert(name.clone(), Binding::Value(value.clone()));
        }
    }

    let event = publisher.push_colors(&registry);

    tracing::info!(
        bundle = %bundle.label(),
        inserted = merge.inserted,
        overwritten = merge.overwritten,
        exports = bundle.exports.len(),
        sequence = event.sequence,
        "loaded bundle"
    );

    Ok(LoadReport {
        bundle: bundle.label(),
        merge,
        exports: bundle.exports.keys().cloned().collect(),
        event,
    })
}

/// Load bundles in order, stopping at the first failure.
pub fn load_bundles<'a>(
    env: &Environment,
    bundles: impl IntoIterator<Item = &'a Bundle>,
) -> Result<Vec<LoadReport>> {
    bundles
        .into_iter()
        .map(|bundle| load_bundle(env, bundle))
        .collect()
}

/// Parse and load bundle files in order.
pub fn load_files(env: &Environment, files: &[PathBuf]) -> Result<Vec<LoadReport>> {
    let mut reports = Vec::new();
    for file in files {
        let bundles = parse_bundle_file(file)?;
        reports.extend(load_bundles(env, &bundles)?);
    }
    Ok(reports)
}

/// Load a bundle into the process-wide environment.
///
/// Fails with `EnvironmentUnavailable` unless [`startup`] (or
/// [`Environment::install`]) ran first.
pub fn load_global(bundle: &Bundle) -> Result<LoadReport> {
    load_bundle(Environment::global()?, bundle)
}

/// Install the process-wide environment and load `bundles` into it.
pub fn startup<'a>(
    bundles: impl IntoIterator<Item = &'a Bundle>,
) -> Result<(&'static Environment, Vec<LoadReport>)> {
    let env = Environment::install();
    let reports = load_bundles(env, bundles)?;
    Ok((env, reports))
}
