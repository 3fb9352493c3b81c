//! Workspace scanner. Walks a project tree and harvests the candidate
//! files handed to the smart context selector.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

use crate::files::{is_likely_binary, read_workspace_file};

/// Directory names never worth scanning for context.
const SKIPPED_DIRS: &[&str] = &["node_modules", "target", "dist", "build", "out", ".git"];

/// A single candidate file from the workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodebaseFile {
    /// Workspace-relative path with `/` separators.
    pub path: String,
    /// UTF-8 file content.
    pub content: String,
    /// Always-include flag set by the scanner (e.g. the currently open file).
    pub force: bool,
}

/// Options controlling a workspace scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Workspace-relative path prefixes to exclude.
    pub exclude_paths: BTreeSet<String>,
    /// Workspace-relative paths marked `force` on their `CodebaseFile`.
    pub force_paths: BTreeSet<String>,
    /// Per-file size cap in bytes. Zero means the crate default.
    pub max_file_size: u64,
}

/// Scan a workspace root into candidate files.
///
/// Skips hidden entries, vendored/build directories, binary files, and
/// files over the size cap. Output is sorted by path so repeated scans of
/// an unchanged tree are identical.
pub fn scan_workspace(root: &Path, options: &ScanOptions) -> Result<Vec<CodebaseFile>> {
    let mut files = Vec::new();
    walk(root, root, options, &mut files)?;
    files.sort_by(|a, b| a.path.cmp(&b.path));
    debug!("Scanned {} files under {}", files.len(), root.display());
    Ok(files)
}

fn walk(
    root: &Path,
    dir: &Path,
    options: &ScanOptions,
    out: &mut Vec<CodebaseFile>,
) -> Result<()> {
    let entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .collect();

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();

        // Skip hidden files/directories.
        if name.starts_with('.') {
            continue;
        }

        let rel = relative_path(root, &path);
        if is_excluded(&rel, options) {
            continue;
        }

        if path.is_dir() {
            if SKIPPED_DIRS.contains(&name.as_str()) {
                continue;
            }
            walk(root, &path, options, out)?;
        } else if path.is_file() {
            if is_likely_binary(&path) {
                continue;
            }
            let cap = if options.max_file_size > 0 {
                options.max_file_size
            } else {
                crate::files::MAX_READ_SIZE
            };
            if std::fs::metadata(&path).map(|m| m.len() > cap).unwrap_or(true) {
                continue;
            }
            let Ok(content) = read_workspace_file(&path) else {
                continue;
            };
            let force = options.force_paths.contains(&rel);
            out.push(CodebaseFile {
                path: rel,
                content,
                force,
            });
        }
    }

    Ok(())
}

/// Workspace-relative path with forward slashes.
fn relative_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn is_excluded(rel: &str, options: &ScanOptions) -> bool {
    options
        .exclude_paths
        .iter()
        .any(|prefix| rel == prefix || rel.starts_with(&format!("{prefix}/")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn scan_collects_text_files_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "src/b.rs", "fn b() {}");
        write(tmp.path(), "src/a.rs", "fn a() {}");
        write(tmp.path(), "README.md", "# readme");

        let files = scan_workspace(tmp.path(), &ScanOptions::default()).unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["README.md", "src/a.rs", "src/b.rs"]);
    }

    #[test]
    fn scan_skips_hidden_and_vendored() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), ".env", "SECRET=1");
        write(tmp.path(), ".git/config", "[core]");
        write(tmp.path(), "node_modules/pkg/index.js", "module.exports = {}");
        write(tmp.path(), "src/main.ts", "export {}");

        let files = scan_workspace(tmp.path(), &ScanOptions::default()).unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["src/main.ts"]);
    }

    #[test]
    fn scan_skips_binary_files() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "src/a.ts", "export {}");
        fs::write(tmp.path().join("logo.png"), b"\x89PNG\0\0").unwrap();

        let files = scan_workspace(tmp.path(), &ScanOptions::default()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "src/a.ts");
    }

    #[test]
    fn scan_applies_exclude_prefixes() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "src/keep.ts", "export {}");
        write(tmp.path(), "generated/schema.ts", "export {}");

        let mut options = ScanOptions::default();
        options.exclude_paths.insert("generated".into());

        let files = scan_workspace(tmp.path(), &options).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "src/keep.ts");
    }

    #[test]
    fn scan_marks_force_paths() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "src/open.ts", "export {}");
        write(tmp.path(), "src/other.ts", "export {}");

        let mut options = ScanOptions::default();
        options.force_paths.insert("src/open.ts".into());

        let files = scan_workspace(tmp.path(), &options).unwrap();
        let open = files.iter().find(|f| f.path == "src/open.ts").unwrap();
        let other = files.iter().find(|f| f.path == "src/other.ts").unwrap();
        assert!(open.force);
        assert!(!other.force);
    }

    #[test]
    fn scan_respects_size_cap() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "small.txt", "ok");
        write(tmp.path(), "big.txt", &"x".repeat(4096));

        let options = ScanOptions {
            max_file_size: 1024,
            ..Default::default()
        };
        let files = scan_workspace(tmp.path(), &options).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "small.txt");
    }

    #[test]
    fn codebase_file_serializes() {
        let file = CodebaseFile {
            path: "src/a.ts".into(),
            content: "export {}".into(),
            force: true,
        };
        let json = serde_json::to_string(&file).unwrap();
        let back: CodebaseFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back.path, "src/a.ts");
        assert!(back.force);
    }
}
