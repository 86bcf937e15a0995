//! The shared global scope.
//!
//! An [`Environment`] is the name-to-binding table every bundle loaded into
//! one host shares. The process-wide instance is created exactly once by
//! [`Environment::install`] during startup and found afterwards through
//! [`Environment::global`]; code that needs the palette receives the
//! environment explicitly instead of reaching for ambient state.
//!
//! Hosts that simulate several pages (tests, embedders) construct
//! independent environments with [`Environment::new`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use crate::contract;
use crate::error::{AngoraError, Result};
use crate::publish::Publisher;
use crate::registry::PaletteRegistry;

static GLOBAL: OnceLock<Environment> = OnceLock::new();

/// A value bound to a name in the environment.
#[derive(Debug, Clone)]
pub enum Binding {
    /// The shared palette registry (`colors`).
    Colors(PaletteRegistry),
    /// The publisher (`pushColors`).
    PushColors(Publisher),
    /// Any other exported value.
    Value(serde_json::Value),
}

impl Binding {
    pub fn kind(&self) -> &'static str {
        match self {
            Binding::Colors(_) => "palette registry",
            Binding::PushColors(_) => "publisher",
            Binding::Value(_) => "value",
        }
    }

    pub fn as_value(&self) -> Option<&serde_json::Value> {
        match self {
            Binding::Value(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Default)]
pub struct Environment {
    bindings: Mutex<BTreeMap<String, Binding>>,
}

impl Environment {
    /// Create an isolated environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the process-wide environment. Later calls return the same one.
    pub fn install() -> &'static Environment {
        GLOBAL.get_or_init(|| {
            tracing::debug!("installed global environment");
            Environment::new()
        })
    }

    /// Look up the process-wide environment.
    ///
    /// Fails with `EnvironmentUnavailable` if startup never installed it.
    pub fn global() -> Result<&'static Environment> {
        GLOBAL.get().ok_or_else(|| AngoraError::EnvironmentUnavailable {
            message: "no global environment has been installed".to_string(),
        })
    }

    pub fn lookup(&self, name: &str) -> Option<Binding> {
        self.lock().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    /// Bind a plain value, returning the previous binding.
    ///
    /// A reserved name may be pre-seeded with a value before the library
    /// initializes (it is adopted later), but once it holds the registry or
    /// publisher it can no longer be rebound.
    pub fn define(&self, name: impl Into<String>, value: serde_json::Value) -> Result<Option<Binding>> {
        let name = name.into();
        let mut bindings = self.lock();
        if contract::is_reserved(&name) {
            if let Some(existing @ (Binding::Colors(_) | Binding::PushColors(_))) = bindings.get(&name) {
                return Err(AngoraError::BindingConflict {
                    message: format!("`{}` already holds the {} and cannot be replaced", name, existing.kind()),
                    name,
                });
            }
        }
        Ok(bindings.insert(name, Binding::Value(value)))
    }

    /// Names of every binding, sorted.
    pub fn names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Lock the binding table. Each mutation is a single insert, so a
    /// poisoned lock still guards a consistent map.
    pub(crate) fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Binding>> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("bindings", &self.names())
            .finish()
    }
}
