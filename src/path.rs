use crate::error::PatternError;

/// Checks that `path` is a well formed route path.
///
/// A route path starts with a forward slash, contains neither whitespace,
/// backslashes nor empty segments, and has no trailing slash. The root path
/// `/` is the only exception to the last rule.
pub(crate) fn validate(path: &str) -> Result<(), PatternError> {
    let reason = if path == "/" {
        return Ok(());
    } else if path.is_empty() {
        "path must not be empty"
    } else if !path.starts_with('/') {
        "path must start with a forward slash"
    } else if path.chars().any(char::is_whitespace) {
        "path must not contain whitespace"
    } else if path.contains('\\') {
        "path must not contain backslashes"
    } else if path.contains("//") {
        "path must not contain extra forward slashes"
    } else if path.ends_with('/') {
        "path must be specified without a trailing slash"
    } else {
        return Ok(());
    };

    Err(PatternError::MalformedPath {
        path: path.into(),
        reason,
    })
}

// Collapses repeated slashes and removes the trailing slash, so that removing
// a segment from a valid path yields a valid path again.
//
// An empty result becomes "/".
pub(crate) fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(segment);
    }

    if out.is_empty() {
        out.push('/');
    }

    out
}

/// Returns the number of `/` separated segments in `path`.
///
/// The leading slash is ignored and the root path has zero segments. Empty
/// segments are counted, so `/users/` has two.
pub(crate) fn segment_count(path: &str) -> usize {
    let trimmed = path.strip_prefix('/').unwrap_or(path);

    if trimmed.is_empty() {
        0
    } else {
        trimmed.split('/').count()
    }
}
