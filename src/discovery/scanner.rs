//! File system scanner for bundle files.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::config::Config;

/// File suffixes recognized as bundles.
pub const BUNDLE_SUFFIXES: &[&str] = &[".bundle.yaml", ".bundle.yml"];

pub fn is_bundle_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| BUNDLE_SUFFIXES.iter().any(|s| name.ends_with(s)))
}

/// Recursively collect bundle files under `root`, sorted by path.
pub fn scan_directory(root: &Path, config: &Config) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| is_bundle_file(path))
        .filter(|path| {
            let relative = path.strip_prefix(root).unwrap_or(path);
            !config.is_excluded(relative)
        })
        .collect();

    found.sort();
    found
}

/// Scan each source in turn. Sources keep their configured order; files
/// within a directory are sorted.
pub fn scan_sources(sources: &[String], base: &Path, config: &Config) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for source in sources {
        let path = if Path::new(source).is_absolute() {
            PathBuf::from(source)
        } else {
            base.join(source)
        };

        if path.is_file() {
            if !files.contains(&path) {
                files.push(path);
            }
            continue;
        }

        for file in scan_directory(&path, config) {
            if !files.contains(&file) {
                files.push(file);
            }
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_is_bundle_file() {
        assert!(is_bundle_file(Path::new("base.bundle.yaml")));
        assert!(is_bundle_file(Path::new("dir/theme.bundle.yml")));
        assert!(!is_bundle_file(Path::new("angora.yaml")));
        assert!(!is_bundle_file(Path::new("base.bundle.yaml.bak")));
    }

    #[test]
    fn test_scan_directory_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested/drafts")).unwrap();
        fs::write(dir.path().join("b.bundle.yaml"), "name: b").unwrap();
        fs::write(dir.path().join("a.bundle.yaml"), "name: a").unwrap();
        fs::write(dir.path().join("nested/c.bundle.yml"), "name: c").unwrap();
        fs::write(dir.path().join("nested/drafts/d.bundle.yaml"), "name: d").unwrap();
        fs::write(dir.path().join("notes.md"), "").unwrap();

        let config = Config {
            excludes: vec!["**/drafts/*".to_string()],
            ..Default::default()
        };
        let files = scan_directory(dir.path(), &config);
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(names, vec!["a.bundle.yaml", "b.bundle.yaml", "nested/c.bundle.yml"]);
    }

    #[test]
    fn test_scan_sources_keeps_source_order() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("late")).unwrap();
        fs::write(dir.path().join("late/a.bundle.yaml"), "name: a").unwrap();
        fs::write(dir.path().join("z.bundle.yaml"), "name: z").unwrap();

        let sources = vec!["z.bundle.yaml".to_string(), "late".to_string()];
        let files = scan_sources(&sources, dir.path(), &Config::default());

        assert_eq!(
            files,
            vec![dir.path().join("z.bundle.yaml"), dir.path().join("late/a.bundle.yaml")]
        );
    }

    #[test]
    fn test_missing_source_is_empty() {
        let dir = tempdir().unwrap();
        assert!(scan_directory(&dir.path().join("nope"), &Config::default()).is_empty());
    }
}
