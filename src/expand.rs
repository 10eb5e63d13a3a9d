use crate::error::PatternError;
use crate::path;
use crate::pattern::{slot_marker, RoutePattern};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use std::collections::HashSet;

static MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[0-9]+\}").unwrap());

/// Upper bound on optional wildcards per route. Expansion produces `2^k`
/// variants for `k` optional wildcards.
pub const MAX_OPTIONAL_WILDCARDS: usize = 16;

/// The kind of a route variant, in resolution priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// No wildcards.
    Static,
    /// Literal text and at least one wildcard.
    Mixed,
    /// Wildcards only.
    Dynamic,
}

impl Classification {
    /// Every classification, highest priority first.
    pub const PRIORITY: [Classification; 3] = [
        Classification::Static,
        Classification::Mixed,
        Classification::Dynamic,
    ];

    fn of(path: &str, captures: &[usize]) -> Classification {
        if captures.is_empty() {
            return Classification::Static;
        }

        let literal = MARKER.replace_all(path, "");
        if literal.bytes().any(|c| c != b'/') {
            Classification::Mixed
        } else {
            Classification::Dynamic
        }
    }
}

/// One concrete shape of a route.
///
/// A route without optional wildcards has a single variant. Otherwise every
/// combination of present and absent optional wildcards yields one variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteVariant {
    path: String,
    captures: Vec<usize>,
    class: Classification,
}

impl RouteVariant {
    pub(crate) fn from_parts(
        path: String,
        captures: Vec<usize>,
        class: Classification,
    ) -> RouteVariant {
        RouteVariant {
            path,
            captures,
            class,
        }
    }

    /// The concrete path, with slot markers for the captured wildcards.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The captured slots, in the order their groups appear in the path.
    pub fn captures(&self) -> &[usize] {
        &self.captures
    }

    /// The classification of this variant.
    pub fn classification(&self) -> Classification {
        self.class
    }

    /// The number of path segments this variant matches.
    pub fn segments(&self) -> usize {
        path::segment_count(&self.path)
    }
}

/// Expands a pattern into its variants.
///
/// ```
/// use slotmatch::{expand, Classification, RoutePattern};
///
/// let pattern = RoutePattern::compile("/blog/{year}/{month?}")?;
/// let variants = expand(&pattern)?;
///
/// assert_eq!(variants.len(), 2);
/// assert_eq!(variants[0].path(), "/blog/{0}");
/// assert_eq!(variants[1].path(), "/blog/{0}/{1}");
/// assert_eq!(variants[1].captures(), &[0, 1]);
/// assert_eq!(variants[1].classification(), Classification::Mixed);
/// # Ok::<_, slotmatch::PatternError>(())
/// ```
pub fn expand(pattern: &RoutePattern) -> Result<Vec<RouteVariant>, PatternError> {
    let optional = pattern.optional_slots();
    let all = (0..pattern.wildcards().len()).collect::<Vec<_>>();

    if optional.is_empty() {
        let path = pattern.slot_form().to_owned();
        let class = Classification::of(&path, &all);
        return Ok(vec![RouteVariant {
            path,
            captures: all,
            class,
        }]);
    }

    if optional.len() > MAX_OPTIONAL_WILDCARDS {
        return Err(PatternError::TooManyOptionals {
            path: pattern.raw().into(),
            count: optional.len(),
            max: MAX_OPTIONAL_WILDCARDS,
        });
    }

    let mut variants: Vec<RouteVariant> = Vec::with_capacity(1 << optional.len());
    let mut seen = HashSet::with_capacity(1 << optional.len());

    // bit `i` of `set` includes the optional wildcard `optional[i]`
    for set in 0..(1usize << optional.len()) {
        let mut path = pattern.slot_form().to_owned();

        for (i, &slot) in optional.iter().enumerate() {
            if set & (1 << i) == 0 {
                path = path.replacen(&slot_marker(slot), "", 1);
            }
        }

        let path = path::normalize(&path);

        if !seen.insert(path.clone()) {
            tracing::trace!(path = %pattern.raw(), variant = %path, "dropping duplicate variant");
            continue;
        }

        let captures = all
            .iter()
            .copied()
            .filter(|slot| match optional.iter().position(|o| o == slot) {
                Some(i) => set & (1 << i) != 0,
                None => true,
            })
            .collect::<Vec<_>>();

        let class = Classification::of(&path, &captures);
        variants.push(RouteVariant {
            path,
            captures,
            class,
        });
    }

    Ok(variants)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(path: &str) -> Vec<(String, Vec<usize>, Classification)> {
        let pattern = RoutePattern::compile(path).unwrap();
        expand(&pattern)
            .unwrap()
            .into_iter()
            .map(|v| (v.path, v.captures, v.class))
            .collect()
    }

    fn v(path: &str, captures: &[usize], class: Classification) -> (String, Vec<usize>, Classification) {
        (path.to_owned(), captures.to_vec(), class)
    }

    use Classification::*;

    #[test]
    fn single_variant() {
        assert_eq!(expand_str("/"), vec![v("/", &[], Static)]);
        assert_eq!(expand_str("/about"), vec![v("/about", &[], Static)]);
        assert_eq!(
            expand_str("/users/{id}"),
            vec![v("/users/{0}", &[0], Mixed)]
        );
        assert_eq!(
            expand_str("/{a}/{b}"),
            vec![v("/{0}/{1}", &[0, 1], Dynamic)]
        );
        assert_eq!(expand_str("/user-{id}"), vec![v("/user-{0}", &[0], Mixed)]);
    }

    #[test]
    fn power_set() {
        assert_eq!(
            expand_str("/blog/{year}/{month?}/{day?}"),
            vec![
                v("/blog/{0}", &[0], Mixed),
                v("/blog/{0}/{1}", &[0, 1], Mixed),
                v("/blog/{0}/{2}", &[0, 2], Mixed),
                v("/blog/{0}/{1}/{2}", &[0, 1, 2], Mixed),
            ]
        );
    }

    #[test]
    fn optional_only() {
        assert_eq!(
            expand_str("/{page?}"),
            vec![v("/", &[], Static), v("/{0}", &[0], Dynamic)]
        );
        assert_eq!(
            expand_str("/{a?}/x/{b}"),
            vec![v("/x/{1}", &[1], Mixed), v("/{0}/x/{1}", &[0, 1], Mixed)]
        );
    }

    #[test]
    fn captures_keep_declaration_order() {
        for variant in expand(&RoutePattern::compile("/{a?}/{b}/{c?}/{d?}").unwrap()).unwrap() {
            let mut sorted = variant.captures().to_vec();
            sorted.sort_unstable();
            assert_eq!(variant.captures(), sorted.as_slice());
            assert!(variant.captures().contains(&1));
        }
    }

    #[test]
    fn well_formed_variants() {
        let pattern = RoutePattern::compile("/{a?}/{b?}/{c?}/d/{e?}").unwrap();
        let variants = expand(&pattern).unwrap();
        assert_eq!(variants.len(), 16);

        for variant in &variants {
            let path = variant.path();
            assert!(path.starts_with('/'), "{path}");
            assert!(!path.contains("//"), "{path}");
            assert!(path == "/" || !path.ends_with('/'), "{path}");
        }
    }

    #[test]
    fn many_optionals() {
        let path = (0..12).map(|i| format!("/{{w{i}?}}")).collect::<String>();
        let variants = expand_str(&path);
        assert_eq!(variants.len(), 1 << 12);

        let paths = variants.iter().map(|(p, ..)| p).collect::<HashSet<_>>();
        assert_eq!(paths.len(), variants.len());
        assert_eq!(variants[0].0, "/");
        assert_eq!(variants[0].2, Classification::Static);
    }

    #[test]
    fn too_many_optionals() {
        let path = (0..=MAX_OPTIONAL_WILDCARDS)
            .map(|i| format!("/{{w{i}?}}"))
            .collect::<String>();
        let pattern = RoutePattern::compile(path.as_str()).unwrap();

        assert_eq!(
            expand(&pattern),
            Err(PatternError::TooManyOptionals {
                path,
                count: MAX_OPTIONAL_WILDCARDS + 1,
                max: MAX_OPTIONAL_WILDCARDS,
            })
        );
    }
}
