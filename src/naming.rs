//! Filename derivation for processed images.
//!
//! Every artifact is named `prefix + base_name`, where the prefix records how
//! the image was produced:
//!
//! | Spec | quality < 100 | quality = 100 |
//! |---|---|---|
//! | scale `s` | `{q}-cmp-{s}-` | `{s}-` |
//! | box `w,h` | `{q}-cmp-{w},{h}-` | `{w},{h}-` |
//! | original | `{q}-cmp` | *(empty)* |
//!
//! The original-size prefix has no trailing dash: `50-cmpcat.jpg`. Existing
//! links depend on that spelling.
//!
//! Base names come from untrusted input (uploaded file names, URLs), so they
//! pass through [`sanitize_filename`] first.

use crate::imaging::{Quality, SizeSpec};

/// Fallback used when nothing survives sanitizing.
pub const DEFAULT_BASE_NAME: &str = "image";

/// Prefix recording the transform and compression applied to an artifact.
pub fn artifact_prefix(spec: &SizeSpec, quality: Quality) -> String {
    let compressed = quality.is_lossy();
    match spec {
        SizeSpec::Scale(factor) if compressed => format!("{quality}-cmp-{factor}-"),
        SizeSpec::Scale(factor) => format!("{factor}-"),
        SizeSpec::Dimensions(target) if compressed => {
            format!("{quality}-cmp-{},{}-", target.width(), target.height())
        }
        SizeSpec::Dimensions(target) => format!("{},{}-", target.width(), target.height()),
        SizeSpec::Original if compressed => format!("{quality}-cmp"),
        SizeSpec::Original => String::new(),
    }
}

/// Full artifact name: the derived prefix followed by `base_name`.
///
/// # Examples
/// ```
/// # use thumbgen::imaging::{Quality, SizeSpec};
/// # use thumbgen::naming::artifact_name;
/// let spec = SizeSpec::scale(2.0).unwrap();
/// assert_eq!(artifact_name(&spec, Quality::new(50).unwrap(), "cat.jpg"), "50-cmp-2.0-cat.jpg");
/// ```
pub fn artifact_name(spec: &SizeSpec, quality: Quality, base_name: &str) -> String {
    format!("{}{}", artifact_prefix(spec, quality), base_name)
}

/// Reduce an untrusted name to a safe ASCII file name.
///
/// - Path separators and whitespace become `_`
/// - Only `A-Z a-z 0-9 . _ -` survive
/// - Leading dots and underscores are stripped (no hidden files, no `..`)
/// - An empty result falls back to [`DEFAULT_BASE_NAME`]
pub fn sanitize_filename(name: &str) -> String {
    let mapped: String = name
        .chars()
        .filter_map(|c| match c {
            '/' | '\\' => Some('_'),
            c if c.is_whitespace() => Some('_'),
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') => Some(c),
            _ => None,
        })
        .collect();

    // Collapse runs of underscores left behind by separators and spaces
    let mut collapsed = String::with_capacity(mapped.len());
    for c in mapped.chars() {
        if c == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(c);
    }

    let trimmed = collapsed.trim_start_matches(['.', '_']).trim_end_matches('_');
    if trimmed.is_empty() {
        DEFAULT_BASE_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Base name for an image fetched from `url`: the last non-empty path
/// segment, without query or fragment, sanitized.
///
/// The URL is parsed the same way the HTTP client parses it, so the name
/// always matches the path actually requested.
pub fn name_from_url(url: &str) -> String {
    let segment = reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()?
                .rfind(|s| !s.is_empty())
                .map(str::to_owned)
        })
        .unwrap_or_default();
    sanitize_filename(&segment)
}
