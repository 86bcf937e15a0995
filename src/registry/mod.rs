//! The shared palette registry.
//!
//! One registry lives in each [`Environment`], bound under
//! [`contract::COLORS`]. It is created lazily by the first load, merged into
//! by every later one, and never replaced.
//!
//! # Example
//!
//! ```
//! use angora::{Colour, Environment, PaletteRegistry};
//!
//! let env = Environment::new();
//! let registry = PaletteRegistry::ensure_exists(&env)?;
//! registry.merge([("primary", Colour::rgb(0x11, 0x11, 0x11))]);
//!
//! // A second lookup sees the same tokens.
//! let again = PaletteRegistry::ensure_exists(&env)?;
//! assert_eq!(again.get("primary"), Some(Colour::rgb(0x11, 0x11, 0x11)));
//! # Ok::<(), angora::AngoraError>(())
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::contract;
use crate::environment::{Binding, Environment};
use crate::error::{AngoraError, Result};
use crate::types::{Colour, MergeSummary, Palette};

/// Handle to a shared token map. Clones refer to the same registry.
#[derive(Clone)]
pub struct PaletteRegistry {
    inner: Arc<Mutex<RegistryState>>,
}

#[derive(Debug, Default)]
struct RegistryState {
    tokens: Palette,
    /// Bumped by every merge that changes a token.
    generation: u64,
}

impl PaletteRegistry {
    fn with_tokens(tokens: Palette) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryState {
                tokens,
                generation: 0,
            })),
        }
    }

    /// Return the environment's registry, creating an empty one if absent.
    ///
    /// Calling this again never resets tokens. If the host bound `colors` to
    /// a plain `{ name: "#hex" }` object before the library initialized,
    /// those entries become the registry's initial tokens.
    pub fn ensure_exists(env: &Environment) -> Result<Self> {
        let mut bindings = env.lock();
        let registry = Self::from_binding(bindings.get(contract::COLORS))?;
        bindings.insert(contract::COLORS.to_string(), Binding::Colors(registry.clone()));
        Ok(registry)
    }

    /// The registry that `colors` should hold, given its current binding.
    /// Nothing is bound here.
    pub(crate) fn from_binding(binding: Option<&Binding>) -> Result<Self> {
        match binding {
            Some(Binding::Colors(registry)) => Ok(registry.clone()),
            Some(Binding::Value(value)) => {
                let adopted = adopt(value)?;
                tracing::info!(tokens = adopted.len(), "adopting host-defined colors");
                Ok(Self::with_tokens(adopted))
            }
            Some(other) => Err(AngoraError::BindingConflict {
                name: contract::COLORS.to_string(),
                message: format!("expected a palette registry, found a {}", other.kind()),
            }),
            None => {
                tracing::debug!("created empty palette registry");
                Ok(Self::with_tokens(Palette::new()))
            }
        }
    }

    /// Insert or overwrite each entry of `update`. Entries absent from
    /// `update` are left alone.
    pub fn merge<I, K>(&self, update: I) -> MergeSummary
    where
        I: IntoIterator<Item = (K, Colour)>,
        K: Into<String>,
    {
        let mut state = self.lock();
        let summary = state.tokens.merge(update);
        if summary.changed() {
            state.generation += 1;
        }
        tracing::debug!(
            inserted = summary.inserted,
            overwritten = summary.overwritten,
            unchanged = summary.unchanged,
            generation = state.generation,
            "merged palette update"
        );
        summary
    }

    /// Current value of a token, if set. A leading `$` is ignored.
    pub fn get(&self, name: &str) -> Option<Colour> {
        self.lock().tokens.get(name)
    }

    /// Copy of the current tokens.
    pub fn snapshot(&self) -> Palette {
        self.lock().tokens.clone()
    }

    /// Copy of the current tokens together with their generation.
    pub fn versioned_snapshot(&self) -> (u64, Palette) {
        let state = self.lock();
        (state.generation, state.tokens.clone())
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn names(&self) -> Vec<String> {
        self.lock().tokens.names().map(str::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().tokens.is_empty()
    }

    /// True when both handles refer to the same registry.
    pub fn same_as(&self, other: &PaletteRegistry) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for PaletteRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("PaletteRegistry")
            .field("generation", &state.generation)
            .field("tokens", &state.tokens)
            .finish()
    }
}

/// Turn a host-defined `colors` value into tokens.
fn adopt(value: &serde_json::Value) -> Result<Palette> {
    let conflict = |message: String| AngoraError::BindingConflict {
        name: contract::COLORS.to_string(),
        message,
    };

    let object = value
        .as_object()
        .ok_or_else(|| conflict(format!("cannot adopt a non-object value: {}", value)))?;

    let mut palette = Palette::new();
    for (name, entry) in object {
        let hex = entry
            .as_str()
            .ok_or_else(|| conflict(format!("token `{}` is not a colour string", name)))?;
        let colour = Colour::from_hex(hex)
            .map_err(|e| conflict(format!("token `{}`: {}", name, e)))?;
        palette.insert(name.clone(), colour);
    }
    Ok(palette)
}
