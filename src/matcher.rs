use crate::error::PatternError;
use crate::expand::RouteVariant;
use crate::wildcard::WildcardSpec;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub(crate) static MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([0-9]+)\}").unwrap());

static GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\?P<__slot[0-9]+>").unwrap());

/// The anchored regular expression that matches one route variant.
///
/// Each captured wildcard becomes a named group, so groups nested inside
/// user constraints never shift argument positions.
#[derive(Clone, Debug)]
pub struct Matcher {
    regex: Regex,
    // capture group index for each captured slot, in capture order
    groups: Vec<usize>,
    // the expression with wildcard group names erased
    shape: String,
}

impl Matcher {
    /// Synthesizes the expression for `variant`.
    ///
    /// Literal text is escaped. A wildcard without an explicit constraint uses
    /// `default_pattern`.
    pub fn compile(
        variant: &RouteVariant,
        wildcards: &[WildcardSpec],
        default_pattern: &str,
    ) -> Result<Matcher, PatternError> {
        let path = variant.path();
        let mut source = String::with_capacity(path.len() * 2);
        let mut last = 0;

        source.push('^');
        for caps in MARKER.captures_iter(path) {
            let Some(marker) = caps.get(0) else { continue };
            source.push_str(&regex::escape(&path[last..marker.start()]));

            let constraint = caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|slot| wildcards.get(slot).map(|w| (slot, w)));

            let (slot, wildcard) = match constraint {
                Some(found) => found,
                None => {
                    return Err(PatternError::InvalidRegexPattern {
                        regex: path.into(),
                        message: format!("no wildcard for slot marker `{}`", marker.as_str()),
                    })
                }
            };

            let pattern = wildcard.constraint().unwrap_or(default_pattern);
            source.push_str(&format!("(?P<{}>{})", group_name(slot), pattern));
            last = marker.end();
        }
        source.push_str(&regex::escape(&path[last..]));
        source.push('$');

        Matcher::from_source(&source, variant.captures())
    }

    /// Compiles a previously synthesized expression.
    pub(crate) fn from_source(source: &str, captures: &[usize]) -> Result<Matcher, PatternError> {
        let regex = Regex::new(source).map_err(|err| PatternError::InvalidRegexPattern {
            regex: source.into(),
            message: err.to_string(),
        })?;

        let mut groups = Vec::with_capacity(captures.len());
        for &slot in captures {
            let name = group_name(slot);
            let group = regex
                .capture_names()
                .position(|n| n == Some(name.as_str()))
                .ok_or_else(|| PatternError::InvalidRegexPattern {
                    regex: source.into(),
                    message: format!("missing capture group for slot {slot}"),
                })?;
            groups.push(group);
        }

        let shape = GROUP.replace_all(source, "(").into_owned();
        Ok(Matcher {
            regex,
            groups,
            shape,
        })
    }

    /// The synthesized expression.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// The expression without slot numbers. Two variants with the same
    /// shape match exactly the same paths.
    pub(crate) fn shape(&self) -> &str {
        &self.shape
    }

    /// Returns whether `path` matches.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    pub(crate) fn captures<'p>(&self, path: &'p str) -> Option<Captures<'p>> {
        self.regex.captures(path)
    }

    // Capture group indices, one per captured slot.
    pub(crate) fn groups(&self) -> &[usize] {
        &self.groups
    }
}

fn group_name(slot: usize) -> String {
    format!("__slot{slot}")
}
