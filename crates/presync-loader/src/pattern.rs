//! Export patterns: a static base directory plus a `**`-aware remainder

use glob::{MatchOptions, Pattern};
use presync_common::is_dir_exists;
use presync_types::{PresyncError, Result};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Extension of canonical source files
pub const SOURCE_EXTENSION: &str = "md";

const GLOB_META: [char; 4] = ['*', '?', '[', '{'];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A compiled export pattern such as `rules/**/*.md`.
///
/// `{a,b}` alternatives are expanded up front; a path matches when any
/// expansion does.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    raw: String,
    base: PathBuf,
    matchers: Vec<Pattern>,
}

impl GlobPattern {
    /// Split `pattern` at its first segment containing a wildcard and
    /// compile the remainder.
    ///
    /// Absolute patterns and patterns climbing out of the package root with
    /// `..` are rejected, as are bases whose last directory has an extension
    /// (`rules/v1.0/*.md`): item URIs are computed relative to the base,
    /// which must read as a directory.
    pub fn parse(pattern: &str) -> Result<Self> {
        let invalid = |reason: &str| PresyncError::Glob {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        let normalized = pattern.trim().replace('\\', "/");
        if normalized.is_empty() {
            return Err(invalid("empty pattern"));
        }
        if Path::new(&normalized)
            .components()
            .any(|c| matches!(c, Component::RootDir | Component::Prefix(_) | Component::ParentDir))
        {
            return Err(invalid("pattern must stay inside the package root"));
        }

        let segments: Vec<&str> = normalized
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        let split_at = segments
            .iter()
            .position(|s| s.contains(GLOB_META))
            .unwrap_or(segments.len().saturating_sub(1));

        let base: PathBuf = segments[..split_at].iter().collect();
        if base.extension().is_some() {
            return Err(invalid(
                "base directory must not have an extension; match it with a wildcard instead",
            ));
        }

        let rest = segments[split_at..].join("/");
        let matchers = expand_braces(&rest)
            .map_err(invalid)?
            .iter()
            .map(|expanded| Pattern::new(expanded).map_err(|e| invalid(e.msg)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            raw: pattern.to_string(),
            base,
            matchers,
        })
    }

    /// The pattern as written in the manifest
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Static directory prefix, relative to the package root
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// `true` if `relative` (forward slashes, relative to the base) matches
    #[must_use]
    pub fn matches(&self, relative: &str) -> bool {
        self.matchers
            .iter()
            .any(|m| m.matches_with(relative, MATCH_OPTIONS))
    }

    /// Regular `.md` files under `root/base` matching the pattern, sorted by
    /// path. A missing base directory matches nothing.
    pub fn walk(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let base_dir = root.join(&self.base);
        if !is_dir_exists(&base_dir) {
            debug!("Pattern base {:?} does not exist", base_dir);
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();
        for entry in WalkDir::new(&base_dir).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&base_dir).to_path_buf();
                PresyncError::io(path, io::Error::from(e))
            })?;

            if !entry.file_type().is_file()
                || entry.path().extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION)
            {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&base_dir) else {
                continue;
            };
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            if self.matches(&relative) {
                matches.push(entry.into_path());
            }
        }

        Ok(matches)
    }
}

/// Expand `{a,b}` alternatives, innermost groups included, into plain glob
/// patterns. Braces inside a `[...]` class are literal.
fn expand_braces(pattern: &str) -> std::result::Result<Vec<String>, &'static str> {
    let Some(open) = find_group_start(pattern) else {
        return Ok(vec![pattern.to_string()]);
    };

    let mut depth = 0;
    let mut start = open + 1;
    let mut alternatives = Vec::new();
    let mut close = None;
    for (i, c) in pattern.char_indices().skip_while(|(i, _)| *i <= open) {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => {
                alternatives.push(&pattern[start..i]);
                close = Some(i);
                break;
            }
            '}' => depth -= 1,
            ',' if depth == 0 => {
                alternatives.push(&pattern[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    let close = close.ok_or("unbalanced '{'")?;

    let (prefix, suffix) = (&pattern[..open], &pattern[close + 1..]);
    let mut expanded = Vec::new();
    for alternative in alternatives {
        expanded.extend(expand_braces(&format!("{prefix}{alternative}{suffix}"))?);
    }
    Ok(expanded)
}

fn find_group_start(pattern: &str) -> Option<usize> {
    let mut in_class = false;
    for (i, c) in pattern.char_indices() {
        match c {
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '{' if !in_class => return Some(i),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_split_static_base() {
        let pattern = GlobPattern::parse("rules/**/*.md").unwrap();
        assert_eq!(pattern.base(), Path::new("rules"));
        assert!(pattern.matches("project.md"));
        assert!(pattern.matches("go-style/project.md"));
        assert!(!pattern.matches("go-style/project.txt"));

        let pattern = GlobPattern::parse("./rules/go/*.md").unwrap();
        assert_eq!(pattern.base(), Path::new("rules/go"));
        assert!(pattern.matches("a.md"));
        assert!(!pattern.matches("nested/a.md"));
    }

    #[test]
    fn test_pattern_without_base() {
        let pattern = GlobPattern::parse("**/*.md").unwrap();
        assert_eq!(pattern.base(), Path::new(""));
        assert!(pattern.matches("rules/a.md"));
    }

    #[test]
    fn test_literal_file_pattern() {
        let pattern = GlobPattern::parse("rules/go/style.md").unwrap();
        assert_eq!(pattern.base(), Path::new("rules/go"));
        assert!(pattern.matches("style.md"));
        assert!(!pattern.matches("other.md"));
    }

    #[test]
    fn test_rejects_escaping_patterns() {
        assert!(matches!(
            GlobPattern::parse("../outside/*.md"),
            Err(PresyncError::Glob { .. })
        ));
        assert!(matches!(
            GlobPattern::parse("/etc/*.md"),
            Err(PresyncError::Glob { .. })
        ));
        assert!(matches!(GlobPattern::parse("  "), Err(PresyncError::Glob { .. })));
    }

    #[test]
    fn test_rejects_invalid_glob() {
        assert!(matches!(
            GlobPattern::parse("rules/[*.md"),
            Err(PresyncError::Glob { .. })
        ));
    }

    #[test]
    fn test_brace_alternatives() {
        let pattern = GlobPattern::parse("rules/{go,rust}/*.md").unwrap();
        assert_eq!(pattern.base(), Path::new("rules"));
        assert!(pattern.matches("go/a.md"));
        assert!(pattern.matches("rust/a.md"));
        assert!(!pattern.matches("python/a.md"));

        let pattern = GlobPattern::parse("rules/**/*.{md,mdx}").unwrap();
        assert!(pattern.matches("a/b.md"));
        assert!(pattern.matches("b.mdx"));
    }

    #[test]
    fn test_expand_nested_braces() {
        assert_eq!(
            expand_braces("{a,b{1,2}}/*.md").unwrap(),
            vec!["a/*.md", "b1/*.md", "b2/*.md"]
        );
        assert_eq!(expand_braces("[{]x").unwrap(), vec!["[{]x"]);
        assert!(expand_braces("{a,b").is_err());
        assert!(matches!(
            GlobPattern::parse("rules/{go,rust/*.md"),
            Err(PresyncError::Glob { .. })
        ));
    }

    #[test]
    fn test_rejects_dotted_base() {
        let err = GlobPattern::parse("rules/v1.0/*.md").unwrap_err();
        assert!(err.to_string().contains("must not have an extension"));
        assert!(GlobPattern::parse("rules/v1*/*.md").is_ok());
    }

    #[test]
    fn test_walk_filters_extension_and_sorts() {
        let dir = TempDir::new().unwrap();
        let rules = dir.path().join("rules");
        fs::create_dir_all(rules.join("b")).unwrap();
        fs::write(rules.join("b").join("two.md"), "x").unwrap();
        fs::write(rules.join("a.md"), "x").unwrap();
        fs::write(rules.join("notes.txt"), "x").unwrap();
        fs::create_dir_all(rules.join("dir.md")).unwrap();

        let pattern = GlobPattern::parse("rules/**/*.md").unwrap();
        let found = pattern.walk(dir.path()).unwrap();
        assert_eq!(found, vec![rules.join("a.md"), rules.join("b").join("two.md")]);
    }

    #[test]
    fn test_walk_missing_base_is_empty() {
        let dir = TempDir::new().unwrap();
        let pattern = GlobPattern::parse("prompts/**/*.md").unwrap();
        assert!(pattern.walk(dir.path()).unwrap().is_empty());
    }
}
