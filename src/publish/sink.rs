//! File-backed subscribers.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AngoraError, Result};

use super::{PublishEvent, Subscriber};

/// Writes each published palette to a JSON file, replacing the previous one.
///
/// The file holds the palette only (`{ "name": "#RRGGBB", ... }`), so it can
/// be consumed directly by tools that know nothing about publish events.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
    label: String,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = format!("json:{}", path.display());
        Self { path, label }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Subscriber for JsonFileSink {
    fn notify(&self, event: &PublishEvent) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| AngoraError::Io {
                path: parent.to_path_buf(),
                message: format!("Failed to create output directory: {}", e),
            })?;
        }

        let mut json = serde_json::to_string_pretty(&event.colors).map_err(|e| AngoraError::Io {
            path: self.path.clone(),
            message: format!("Failed to serialize palette: {}", e),
        })?;
        json.push('\n');

        // Write beside the target and rename so readers never see a partial file.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json).map_err(|e| AngoraError::Io {
            path: staging.clone(),
            message: format!("Failed to write palette: {}", e),
        })?;
        fs::rename(&staging, &self.path).map_err(|e| AngoraError::Io {
            path: self.path.clone(),
            message: format!("Failed to replace palette: {}", e),
        })?;

        tracing::debug!(path = %self.path.display(), sequence = event.sequence, "wrote palette json");
        Ok(())
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Colour, Palette};
    use tempfile::tempdir;

    fn event(colors: Palette) -> PublishEvent {
        PublishEvent {
            sequence: 1,
            generation: 1,
            colors,
        }
    }

    #[test]
    fn test_writes_palette_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("colors.json");
        let sink = JsonFileSink::new(&path);

        sink.notify(&event(Palette::from_iter([("primary", Colour::BLACK)])))
            .unwrap();

        let written: Palette =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.get("primary"), Some(Colour::BLACK));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_replaces_previous_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("colors.json");
        let sink = JsonFileSink::new(&path);

        sink.notify(&event(Palette::from_iter([("a", Colour::BLACK)])))
            .unwrap();
        sink.notify(&event(Palette::new())).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "{}");
    }
}
