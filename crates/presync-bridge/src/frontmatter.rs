//! Frontmatter splitting and parsing shared by the bridges and the loader

use presync_types::{PresyncError, Result};
use regex::Regex;
use serde::de::DeserializeOwned;
use std::path::Path;

/// A markdown document split at its frontmatter block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document<'a> {
    /// Raw YAML between the `---` delimiters, `None` when the text has no
    /// frontmatter block
    pub frontmatter: Option<&'a str>,
    /// Everything after the closing delimiter's line break
    pub body: &'a str,
}

/// Split `text` into frontmatter and body
pub fn split(text: &str) -> Result<Document<'_>> {
    let frontmatter_re =
        Regex::new(r"(?s)\A---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n(.*)|\z)")
            .map_err(|e| PresyncError::frontmatter("<regex>", e))?;

    Ok(match frontmatter_re.captures(text) {
        Some(captures) => Document {
            frontmatter: Some(captures.get(1).map_or("", |m| m.as_str())),
            body: captures.get(2).map_or("", |m| m.as_str()),
        },
        None => Document {
            frontmatter: None,
            body: text,
        },
    })
}

/// Parse YAML frontmatter into `T`; an empty block yields `T::default()`
pub fn parse<T>(yaml: &str, path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if yaml.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str(yaml).map_err(|e| PresyncError::frontmatter(path, e))
}

/// Split a source file and parse its mandatory frontmatter
pub fn parse_required<T>(text: &str, path: &Path) -> Result<(T, String)>
where
    T: DeserializeOwned + Default,
{
    let document = split(text)?;
    let yaml = document
        .frontmatter
        .ok_or_else(|| PresyncError::frontmatter(path, "no frontmatter block found"))?;
    let metadata = parse(yaml, path)?;
    Ok((metadata, document.body.to_string()))
}

/// `true` for values YAML reads as a quoted scalar or a block scalar header
fn is_verbatim(value: &str) -> bool {
    value.starts_with(['"', '\'', '|', '>'])
}

fn double_quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Wrap the raw scalar value of each `key:` line in double quotes.
///
/// Agent files store globs and descriptions unquoted, and values such as
/// `*.ts` or `a: b` are not valid plain YAML scalars. Quoted values and
/// block scalars (`|`, `>`) are left as written.
pub fn requote(yaml: &str, keys: &[&str]) -> String {
    yaml.lines()
        .map(|line| {
            for key in keys {
                let Some(rest) = line.strip_prefix(key).and_then(|r| r.strip_prefix(':')) else {
                    continue;
                };
                let value = rest.trim();
                if value.is_empty() || is_verbatim(value) {
                    return line.to_string();
                }
                return format!("{key}: {}", double_quote(value));
            }
            line.to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render `value` for an unquoted `key: value` line that [`requote`] reads
/// back unchanged
pub fn raw_value(value: &str) -> String {
    if is_verbatim(value) {
        double_quote(value)
    } else {
        value.to_string()
    }
}

/// Collapse trailing line breaks to exactly one; empty content stays empty
pub fn normalize_content(content: &str) -> String {
    let trimmed = content.trim_end_matches(['\n', '\r']);
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}

/// Replace line breaks so a value fits on one frontmatter line
pub fn single_line(value: &str) -> String {
    value
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join(" ")
}
