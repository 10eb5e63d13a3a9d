use crate::error::{MatchError, UrlError};
use crate::expand::Classification;
use crate::matcher::MARKER;
use crate::params::Params;
use crate::path;
use crate::route::Route;
use crate::table::{GroupKey, Router};

use http::Method;
use regex::Captures;

/// A successful match, consisting of the matched route and the captured
/// arguments.
#[derive(Debug)]
pub struct Match<'r, 'p, T> {
    /// The matched route.
    pub route: &'r Route<T>,

    /// The arguments captured from the path.
    pub params: Params<'r, 'p>,

    /// The priority tier the match was found in.
    pub classification: Classification,
}

impl<'r, 'p, T> Match<'r, 'p, T> {
    /// The handler the matched route binds to `method`.
    pub fn handler(&self, method: &Method) -> Option<&'r T> {
        self.route.handler(method)
    }
}

impl<T> Router<T> {
    /// Resolves a request path.
    ///
    /// Tiers are tried in priority order, [`Static`](Classification::Static)
    /// first, then [`Mixed`](Classification::Mixed), then
    /// [`Dynamic`](Classification::Dynamic). Within a tier only expressions
    /// with the same number of segments as `path` are tried, in the order
    /// they were registered.
    ///
    /// `path` is expected to be percent-decoded at the segment level and to
    /// carry no query string or fragment.
    ///
    /// ```rust
    /// use slotmatch::{Registry, Route};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut registry = Registry::new();
    /// registry.register(Route::new("user", "/users/{id}")?.get("A user")?)?;
    /// let router = registry.freeze();
    ///
    /// let matched = router.at("/users/42")?;
    /// assert_eq!(matched.route.name(), "user");
    /// assert_eq!(matched.params.get("id"), Some("42"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn at<'r, 'p>(&'r self, path: &'p str) -> Result<Match<'r, 'p, T>, MatchError> {
        let segments = path::segment_count(path);

        for class in Classification::PRIORITY {
            if class == Classification::Static {
                if let Some(&(route, _)) = self.table.statics.get(path) {
                    tracing::trace!(path, route, "resolved static route");
                    return Ok(Match {
                        route: &self.table.routes[route],
                        params: Params::new(),
                        classification: class,
                    });
                }
                continue;
            }

            let entries = match self.table.groups.get(&GroupKey { segments, class }) {
                Some(entries) => entries,
                None => continue,
            };

            for entry in entries {
                let caps = match entry.matcher.captures(path) {
                    Some(caps) => caps,
                    None => continue,
                };

                let route = &self.table.routes[entry.route];
                let wildcards = route.pattern().wildcards();
                let variant = &route.variants()[entry.variant];

                let mut params = Params::new();
                for (&slot, &group) in variant.captures().iter().zip(entry.matcher.groups()) {
                    if let Some(value) = caps.get(group) {
                        params.push(wildcards[slot].name(), value.as_str());
                    }
                }

                tracing::trace!(path, route = entry.route, ?class, "resolved route");
                return Ok(Match {
                    route,
                    params,
                    classification: class,
                });
            }
        }

        tracing::trace!(path, "no route matched");
        Err(MatchError::NotFound)
    }

    /// Builds a path for the named route from wildcard values.
    ///
    /// Optional wildcards without a value are left out. Every value must
    /// satisfy its wildcard's constraint, so the result resolves back to the
    /// same route with the same arguments unless a higher priority route
    /// claims it first.
    ///
    /// ```rust
    /// use slotmatch::{Registry, Route};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut registry = Registry::<()>::new();
    /// registry.register(Route::new("blog", "/blog/{year}/{month?}")?)?;
    /// let router = registry.freeze();
    ///
    /// assert_eq!(router.url_for("blog", &[("year", "2024")])?, "/blog/2024");
    /// assert_eq!(
    ///     router.url_for("blog", &[("year", "2024"), ("month", "05")])?,
    ///     "/blog/2024/05"
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn url_for(&self, name: &str, values: &[(&str, &str)]) -> Result<String, UrlError> {
        let route = self
            .route_by_name(name)
            .ok_or_else(|| UrlError::UnknownRoute { name: name.into() })?;
        let wildcards = route.pattern().wildcards();

        let value_of = |wildcard: &str| {
            values
                .iter()
                .find(|(key, _)| *key == wildcard)
                .map(|(_, value)| *value)
        };

        let mut captures = Vec::with_capacity(wildcards.len());
        for (slot, wildcard) in wildcards.iter().enumerate() {
            match value_of(wildcard.name()) {
                Some(_) => captures.push(slot),
                None if wildcard.is_optional() => {}
                None => {
                    return Err(UrlError::MissingValue {
                        route: name.into(),
                        wildcard: wildcard.name().into(),
                    })
                }
            }
        }

        let (index, variant) = route
            .variants()
            .iter()
            .enumerate()
            .find(|(_, variant)| variant.captures() == captures.as_slice())
            .ok_or_else(|| UrlError::UnknownRoute { name: name.into() })?;

        // one pass, so marker text inside a value is never substituted again
        let url = MARKER
            .replace_all(variant.path(), |caps: &Captures<'_>| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|slot| wildcards.get(slot))
                    .and_then(|wildcard| value_of(wildcard.name()))
                    .unwrap_or_default()
                    .to_owned()
            })
            .into_owned();

        let key = GroupKey {
            segments: variant.segments(),
            class: variant.classification(),
        };
        let id = route.id();
        let accepted = self
            .table
            .groups
            .get(&key)
            .and_then(|entries| {
                entries
                    .iter()
                    .find(|e| Some(e.route) == id && e.variant == index)
            })
            .map_or(false, |entry| entry.matcher.is_match(&url));

        if accepted {
            Ok(url)
        } else {
            Err(UrlError::InvalidValue {
                route: name.into(),
                url,
            })
        }
    }
}
