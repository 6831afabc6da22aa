//! Barrel (index) file generation.
//!
//! A barrel re-exports every sibling module in its directory: one line per
//! sibling source file (excluding the index itself and non-matching
//! extensions) and one per sibling sub-directory that has its own index.

use std::path::Path;

use crate::{GenerateError, Result};

/// Render barrel content from module stems (file stems and sub-directory
/// names). Stems are sorted and deduplicated.
pub fn barrel_content(stems: &[String]) -> String {
    let mut stems: Vec<&String> = stems.iter().collect();
    stems.sort();
    stems.dedup();

    let mut content = String::new();
    for stem in stems {
        content.push_str(&format!("export * from \"./{stem}\";\n"));
    }
    content
}

/// Scan a directory for barrel-exportable module stems.
pub fn scan_dir(dir: &Path, extension: &str, index_file: &str) -> Result<Vec<String>> {
    let mut stems = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|e| GenerateError::Scan {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| GenerateError::Scan {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if path.is_dir() {
            if path.join(index_file).is_file() {
                stems.push(name.to_string());
            }
        } else if name != index_file
            && path.extension().and_then(|e| e.to_str()) == Some(extension)
        {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                stems.push(stem.to_string());
            }
        }
    }
    Ok(stems)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_barrel_content_is_sorted() {
        let stems = vec!["order-line".to_string(), "order".to_string()];
        insta::assert_snapshot!(barrel_content(&stems), @r###"
        export * from "./order";
        export * from "./order-line";
        "###);
    }

    #[test]
    fn test_scan_skips_index_and_foreign_files() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("order.ts"), "").unwrap();
        std::fs::write(temp.path().join("index.ts"), "").unwrap();
        std::fs::write(temp.path().join("notes.md"), "").unwrap();

        let mut stems = scan_dir(temp.path(), "ts", "index.ts").unwrap();
        stems.sort();
        assert_eq!(stems, vec!["order"]);
    }

    #[test]
    fn test_scan_includes_subdirs_with_index() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("nested")).unwrap();
        std::fs::write(temp.path().join("nested").join("index.ts"), "").unwrap();
        std::fs::create_dir(temp.path().join("empty")).unwrap();

        let stems = scan_dir(temp.path(), "ts", "index.ts").unwrap();
        assert_eq!(stems, vec!["nested"]);
    }
}
