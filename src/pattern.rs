use crate::error::PatternError;
use crate::path;
use crate::wildcard::{validate_name, WildcardSpec};

use once_cell::sync::Lazy;
use regex::Regex;

// Anything between a pair of braces. Token contents are validated separately
// so that bad names produce a precise error instead of silently staying literal.
static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}]*)\}").unwrap());

/// A parsed route path.
///
/// Wildcards are numbered by their position in the path and replaced with
/// `{0}`, `{1}`, ... to form the *slot form*, which identifies the route
/// independently of how its wildcards are named:
///
/// ```
/// use slotmatch::RoutePattern;
///
/// let pattern = RoutePattern::compile("/blog/{year}/{month?}")?;
/// assert_eq!(pattern.slot_form(), "/blog/{0}/{1}");
/// assert_eq!(pattern.optional_slots(), &[1]);
/// # Ok::<_, slotmatch::PatternError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    slot_form: String,
    wildcards: Vec<WildcardSpec>,
    optional: Vec<usize>,
}

impl RoutePattern {
    /// Parses a route path.
    pub fn compile(raw: impl Into<String>) -> Result<Self, PatternError> {
        let raw = raw.into();
        path::validate(&raw)?;

        let mut slot_form = String::with_capacity(raw.len());
        let mut wildcards: Vec<WildcardSpec> = Vec::new();
        let mut optional = Vec::new();
        let mut last = 0;

        for caps in TOKEN.captures_iter(&raw) {
            let Some(token) = caps.get(0) else { continue };
            let inner = &caps[1];

            let (name, is_optional) = match inner.strip_suffix('?') {
                Some(name) => (name, true),
                None => (inner, false),
            };

            if !name.is_empty() && name.bytes().all(|c| c.is_ascii_digit()) {
                return Err(PatternError::ReservedWildcard {
                    token: token.as_str().into(),
                    path: raw.clone(),
                });
            }

            validate_name(name)?;

            if wildcards.iter().any(|w| w.name() == name) {
                return Err(PatternError::DuplicateWildcard {
                    name: name.into(),
                    path: raw.clone(),
                });
            }

            let slot = wildcards.len();
            if is_optional {
                optional.push(slot);
            }

            slot_form.push_str(&raw[last..token.start()]);
            slot_form.push_str(&slot_marker(slot));
            last = token.end();

            wildcards.push(WildcardSpec::new(name, is_optional)?);
        }

        slot_form.push_str(&raw[last..]);

        // braces left over in the literal text were never closed or opened
        let stray = TOKEN.replace_all(&raw, "");
        if stray.contains(|c: char| c == '{' || c == '}') {
            return Err(PatternError::MalformedPath {
                path: raw,
                reason: "path contains unbalanced braces",
            });
        }

        Ok(RoutePattern {
            raw,
            slot_form,
            wildcards,
            optional,
        })
    }

    /// The path as it was declared.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The path with every wildcard replaced by its slot marker.
    pub fn slot_form(&self) -> &str {
        &self.slot_form
    }

    /// The wildcards in declaration order. A wildcard's index is its slot.
    pub fn wildcards(&self) -> &[WildcardSpec] {
        &self.wildcards
    }

    /// The slots of the optional wildcards, ascending.
    pub fn optional_slots(&self) -> &[usize] {
        &self.optional
    }

    /// Returns the slot of the wildcard with the given name.
    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.wildcards.iter().position(|w| w.name() == name)
    }

    /// Whether the path has no wildcards at all.
    pub fn is_static(&self) -> bool {
        self.wildcards.is_empty()
    }

    // Attaches a regex constraint to the named wildcard.
    pub(crate) fn constrain(&mut self, name: &str, regex: &str) -> Result<(), PatternError> {
        let slot = self
            .slot_of(name)
            .ok_or_else(|| PatternError::UnknownWildcard {
                name: name.into(),
                path: self.raw.clone(),
            })?;

        let spec = self.wildcards[slot].clone().with_constraint(regex)?;
        self.wildcards[slot] = spec;
        Ok(())
    }
}

/// Returns the marker that stands in for wildcard `slot` in a slot form.
pub(crate) fn slot_marker(slot: usize) -> String {
    format!("{{{slot}}}")
}
