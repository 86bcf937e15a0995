//! Token maps and their resolution from colour definitions.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{AngoraError, Result};

use super::expr::ColourExpr;
use super::Colour;

/// A mapping from token name to colour.
///
/// Keys are kept sorted so snapshots serialize identically across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    tokens: BTreeMap<String, Colour>,
}

/// Counts describing what a merge changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub inserted: usize,
    pub overwritten: usize,
    pub unchanged: usize,
}

impl MergeSummary {
    /// True when the merge altered at least one token.
    pub fn changed(&self) -> bool {
        self.inserted + self.overwritten > 0
    }
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a token. A leading `$` is ignored.
    pub fn get(&self, name: &str) -> Option<Colour> {
        self.tokens.get(normalize(name)).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tokens.contains_key(normalize(name))
    }

    /// Insert or overwrite a single token, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, colour: Colour) -> Option<Colour> {
        let name = name.into();
        let name = match name.strip_prefix('$') {
            Some(stripped) => stripped.to_string(),
            None => name,
        };
        self.tokens.insert(name, colour)
    }

    /// Upsert every entry of `update`. Tokens missing from `update` are kept.
    pub fn merge<I, K>(&mut self, update: I) -> MergeSummary
    where
        I: IntoIterator<Item = (K, Colour)>,
        K: Into<String>,
    {
        let mut summary = MergeSummary::default();
        for (name, colour) in update {
            match self.insert(name, colour) {
                None => summary.inserted += 1,
                Some(previous) if previous == colour => summary.unchanged += 1,
                Some(_) => summary.overwritten += 1,
            }
        }
        summary
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tokens.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Colour)> {
        self.tokens.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Colour)> for Palette {
    fn from_iter<T: IntoIterator<Item = (K, Colour)>>(iter: T) -> Self {
        let mut palette = Palette::new();
        palette.merge(iter);
        palette
    }
}

impl IntoIterator for Palette {
    type Item = (String, Colour);
    type IntoIter = std::collections::btree_map::IntoIter<String, Colour>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

fn normalize(name: &str) -> &str {
    name.strip_prefix('$').unwrap_or(name)
}

/// Resolves colour definitions (hex, `$references`, expressions) into a palette.
///
/// References may point at tokens defined in the same builder or, failing
/// that, at tokens of a base palette such as the current registry snapshot.
#[derive(Debug, Default)]
pub struct PaletteBuilder {
    definitions: Vec<(String, String)>,
}

impl PaletteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition. Redefining a name replaces the earlier definition.
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let name = normalize(&name).to_string();
        let value = value.into();
        match self.definitions.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.definitions.push((name, value)),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Resolve every definition. Only the builder's own tokens are returned;
    /// `base` is consulted for references but not copied.
    pub fn build(&self, base: &Palette) -> Result<Palette> {
        let parsed = self
            .definitions
            .iter()
            .map(|(name, value)| {
                ColourExpr::parse(value)
                    .map(|expr| (name.as_str(), expr))
                    .map_err(|e| with_token_context(name, e))
            })
            .collect::<Result<HashMap<&str, ColourExpr>>>()?;

        let mut resolver = Resolver {
            parsed: &parsed,
            base,
            resolved: HashMap::new(),
            resolving: HashSet::new(),
        };

        let mut out = Palette::new();
        for (name, _) in &self.definitions {
            let colour = resolver.resolve(name)?;
            out.insert(name.clone(), colour);
        }
        Ok(out)
    }
}

struct Resolver<'a> {
    parsed: &'a HashMap<&'a str, ColourExpr>,
    base: &'a Palette,
    resolved: HashMap<String, Colour>,
    resolving: HashSet<String>,
}

impl Resolver<'_> {
    fn resolve(&mut self, name: &str) -> Result<Colour> {
        if let Some(&colour) = self.resolved.get(name) {
            return Ok(colour);
        }

        let parsed = self.parsed;
        let Some(expr) = parsed.get(name) else {
            return self.base.get(name).ok_or_else(|| AngoraError::Parse {
                message: format!("Undefined colour: ${}", name),
                help: Some("Define the token in this bundle or load a bundle that does".to_string()),
            });
        };

        if !self.resolving.insert(name.to_string()) {
            return Err(AngoraError::Parse {
                message: format!("Circular colour reference: ${}", name),
                help: Some("Check your colour definitions for circular references".to_string()),
            });
        }

        let colour = expr
            .eval(&mut |reference: &str| self.resolve(reference))
            .map_err(|e| with_token_context(name, e))?;

        self.resolving.remove(name);
        self.resolved.insert(name.to_string(), colour);
        Ok(colour)
    }
}

fn with_token_context(name: &str, err: AngoraError) -> AngoraError {
    match err {
        AngoraError::Parse { message, help } if !message.starts_with("In $") => AngoraError::Parse {
            message: format!("In ${}: {}", name, message),
            help,
        },
        other => other,
    }
}
