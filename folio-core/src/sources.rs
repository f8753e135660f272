//! Source path handling: wildcard expansion and reference resolution
//!
//! Content items may name several documents with a shell-style pattern
//! (`chapters/*.xhtml`). Matches are returned in lexicographic order so the
//! package is identical however the filesystem enumerates directories.

use crate::error::AssemblyError;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Whether a path component contains wildcard characters
fn has_wildcard(component: &str) -> bool {
    component.contains(['*', '?'])
}

/// Translate one wildcard path component into an anchored regex
fn component_regex(component: &str) -> Result<Regex, AssemblyError> {
    let mut pattern = String::from("^");
    for c in component.chars() {
        match c {
            '*' => pattern.push_str("[^/]*"),
            '?' => pattern.push_str("[^/]"),
            other => pattern.push_str(&regex::escape(&other.to_string())),
        }
    }
    pattern.push('$');
    Regex::new(&pattern).map_err(|_| AssemblyError::InvalidPattern(component.to_string()))
}

/// Expand a wildcard pattern relative to `base`.
///
/// Returns `/`-separated paths relative to `base`, sorted. A pattern that
/// matches nothing yields an empty list.
pub fn expand_pattern(base: &Path, pattern: &str) -> Result<Vec<String>, AssemblyError> {
    let components: Vec<&str> = pattern.split('/').filter(|c| !c.is_empty()).collect();
    if components.is_empty() {
        return Err(AssemblyError::InvalidPattern(pattern.to_string()));
    }

    // (relative path, absolute path) pairs still being walked
    let mut candidates: Vec<(String, PathBuf)> = vec![(String::new(), base.to_path_buf())];

    for (i, component) in components.iter().enumerate() {
        let last = i + 1 == components.len();
        let mut next = Vec::new();

        for (relative, absolute) in &candidates {
            if has_wildcard(component) {
                let matcher = component_regex(component)?;
                let Ok(entries) = fs::read_dir(absolute) else {
                    continue;
                };
                for entry in entries.filter_map(|e| e.ok()) {
                    let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                        continue;
                    };
                    if name.starts_with('.') && !component.starts_with('.') {
                        continue;
                    }
                    if !matcher.is_match(&name) {
                        continue;
                    }
                    let path = entry.path();
                    if (last && path.is_file()) || (!last && path.is_dir()) {
                        next.push((join(relative, &name), path));
                    }
                }
            } else {
                let path = absolute.join(component);
                if (last && path.is_file()) || (!last && path.is_dir()) {
                    next.push((join(relative, component), path));
                }
            }
        }
        candidates = next;
    }

    let mut matches: Vec<String> = candidates.into_iter().map(|(rel, _)| rel).collect();
    matches.sort();
    matches.dedup();
    Ok(matches)
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Resolve a reference found inside `document` to a package-relative path.
///
/// Query strings and fragments are dropped; `.` and `..` segments are folded.
/// A reference that climbs above the package root is rejected.
pub fn resolve_reference(document: &str, reference: &str) -> Result<String, AssemblyError> {
    let target = reference
        .split(['#', '?'])
        .next()
        .unwrap_or(reference);

    let mut segments: Vec<&str> = if target.starts_with('/') {
        Vec::new()
    } else {
        let mut dir: Vec<&str> = document.split('/').collect();
        dir.pop();
        dir
    };

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(AssemblyError::OutsidePackage(reference.to_string()));
                }
            }
            other => segments.push(other),
        }
    }
    segments.retain(|s| !s.is_empty());
    Ok(segments.join("/"))
}

/// Check that a manifest-declared path stays inside the package directory
pub fn check_package_path(path: &str) -> Result<(), AssemblyError> {
    if path.starts_with('/') || path.split(['/', '\\']).any(|c| c == "..") {
        return Err(AssemblyError::OutsidePackage(path.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, path: &str) {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, "x").unwrap();
    }

    #[test]
    fn test_expand_sorted_matches() {
        let dir = TempDir::new().unwrap();
        for name in ["chapters/c.xhtml", "chapters/a.xhtml", "chapters/b.xhtml", "chapters/notes.txt"] {
            touch(&dir, name);
        }

        let found = expand_pattern(dir.path(), "chapters/*.xhtml").unwrap();
        assert_eq!(
            found,
            vec!["chapters/a.xhtml", "chapters/b.xhtml", "chapters/c.xhtml"]
        );
    }

    #[test]
    fn test_expand_wildcard_directories() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "part2/one.xhtml");
        touch(&dir, "part1/one.xhtml");
        touch(&dir, "part1/two.xhtml");

        let found = expand_pattern(dir.path(), "part?/*.xhtml").unwrap();
        assert_eq!(
            found,
            vec!["part1/one.xhtml", "part1/two.xhtml", "part2/one.xhtml"]
        );
    }

    #[test]
    fn test_expand_no_matches() {
        let dir = TempDir::new().unwrap();
        assert!(expand_pattern(dir.path(), "missing/*.xhtml").unwrap().is_empty());
    }

    #[test]
    fn test_expand_skips_hidden_files() {
        let dir = TempDir::new().unwrap();
        touch(&dir, ".draft.xhtml");
        touch(&dir, "final.xhtml");
        assert_eq!(expand_pattern(dir.path(), "*.xhtml").unwrap(), vec!["final.xhtml"]);
    }

    #[test]
    fn test_resolve_reference() {
        let resolve = |doc: &str, reference: &str| resolve_reference(doc, reference).unwrap();
        assert_eq!(resolve("page.xhtml", "images/a.png"), "images/a.png");
        assert_eq!(resolve("chapters/one.xhtml", "../images/a.png"), "images/a.png");
        assert_eq!(resolve("chapters/one.xhtml", "fig.png#part"), "chapters/fig.png");
        assert_eq!(resolve("chapters/one.xhtml", "/images/a.png"), "images/a.png");
        assert_eq!(resolve("a.xhtml", "./b/../c.png"), "c.png");
    }

    #[test]
    fn test_reference_above_root_rejected() {
        for (doc, reference) in [
            ("page.xhtml", "../outside.png"),
            ("chapters/one.xhtml", "../../outside.png"),
            ("page.xhtml", "/../outside.png"),
        ] {
            let err = resolve_reference(doc, reference).unwrap_err();
            assert!(matches!(err, AssemblyError::OutsidePackage(ref r) if r == reference));
        }
    }

    #[test]
    fn test_check_package_path() {
        assert!(check_package_path("chapters/one.xhtml").is_ok());
        assert!(check_package_path("a..b.xhtml").is_ok());
        assert!(matches!(
            check_package_path("../one.xhtml"),
            Err(AssemblyError::OutsidePackage(_))
        ));
        assert!(check_package_path("chapters/../../one.xhtml").is_err());
        assert!(check_package_path("/etc/one.xhtml").is_err());
    }
}
