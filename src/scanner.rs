//! Workspace file discovery for tree mode.
//!
//! `.gitignore`/`.ignore` are always respected; on top of that a fixed
//! override list drops the usual high-noise artifacts (lockfiles, images,
//! build output) plus any operator-supplied directory names.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ignore::overrides::{Override, OverrideBuilder};
use ignore::WalkBuilder;

#[derive(Debug, Clone)]
pub struct FileEntry {
    pub abs_path: PathBuf,
    pub rel_path: PathBuf,
    pub bytes: u64,
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub root: PathBuf,
    pub max_file_bytes: u64,
    /// Directory names to skip anywhere in the tree, on top of the defaults.
    pub exclude_dir_names: Vec<String>,
}

fn noise_overrides(root: &Path, exclude_dir_names: &[String]) -> Result<Override> {
    let mut ob = OverrideBuilder::new(root);

    // Lockfiles
    ob.add("!**/*.lock")?;
    ob.add("!**/package-lock.json")?;
    ob.add("!**/pnpm-lock.yaml")?;
    ob.add("!**/yarn.lock")?;

    // Sourcemaps + images/icons
    for ext in ["map", "svg", "png", "ico", "jpg", "jpeg", "gif", "woff", "woff2"] {
        ob.add(&format!("!**/*.{ext}"))?;
    }

    // Build outputs / heavy dirs
    for d in [
        ".git",
        "node_modules",
        "target",
        "dist",
        "build",
        "coverage",
        ".next",
        ".nuxt",
        "out",
        "__pycache__",
        ".venv",
        "vendor",
    ] {
        ob.add(&format!("!**/{d}"))?;
        ob.add(&format!("!**/{d}/**"))?;
    }

    for d in exclude_dir_names {
        let d = d.trim().trim_matches('/');
        if d.is_empty() {
            continue;
        }
        ob.add(&format!("!**/{d}"))?;
        ob.add(&format!("!**/{d}/**"))?;
    }

    Ok(ob.build()?)
}

/// Walk the tree under `opts.root`, returning candidate files sorted by
/// relative path so downstream output is order-stable.
pub fn scan_tree(opts: &ScanOptions) -> Result<Vec<FileEntry>> {
    std::fs::metadata(&opts.root)
        .with_context(|| format!("Scan root does not exist: {}", opts.root.display()))?;

    let overrides = noise_overrides(&opts.root, &opts.exclude_dir_names)?;
    let walker = WalkBuilder::new(&opts.root)
        .standard_filters(true)
        .overrides(overrides)
        .build();

    let mut entries = Vec::new();
    for item in walker {
        let Ok(dent) = item else { continue };
        if !dent.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }

        let abs_path = dent.into_path();
        let Ok(bytes) = std::fs::metadata(&abs_path).map(|m| m.len()) else {
            continue;
        };
        if bytes == 0 || bytes > opts.max_file_bytes {
            continue;
        }

        let rel_path = abs_path
            .strip_prefix(&opts.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| abs_path.clone());

        entries.push(FileEntry {
            abs_path,
            rel_path,
            bytes,
        });
    }

    entries.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn scan_skips_noise_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "src/main.rs", "fn main() {}\n");
        write(root, "src/lib.rs", "pub fn lib() {}\n");
        write(root, "Cargo.lock", "[[package]]\n");
        write(root, "node_modules/x/index.js", "module.exports = 1;\n");
        write(root, "logo.png", "not really a png\n");
        write(root, "empty.rs", "");

        let entries = scan_tree(&ScanOptions {
            root: root.to_path_buf(),
            max_file_bytes: 1024 * 1024,
            exclude_dir_names: vec![],
        })
        .unwrap();

        let rels: Vec<String> = entries
            .iter()
            .map(|e| e.rel_path.to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(rels, vec!["src/lib.rs", "src/main.rs"]);
    }

    #[test]
    fn scan_honors_extra_excluded_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "src/main.rs", "fn main() {}\n");
        write(root, "generated/schema.rs", "pub struct S;\n");

        let entries = scan_tree(&ScanOptions {
            root: root.to_path_buf(),
            max_file_bytes: 1024 * 1024,
            exclude_dir_names: vec!["generated".into()],
        })
        .unwrap();

        assert_eq!(entries.len(), 1);
        assert!(entries[0].rel_path.ends_with("main.rs"));
    }

    #[test]
    fn oversized_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "big.rs", &"x".repeat(2048));
        write(root, "small.rs", "fn s() {}\n");

        let entries = scan_tree(&ScanOptions {
            root: root.to_path_buf(),
            max_file_bytes: 1024,
            exclude_dir_names: vec![],
        })
        .unwrap();

        assert_eq!(entries.len(), 1);
        assert!(entries[0].rel_path.ends_with("small.rs"));
    }
}
