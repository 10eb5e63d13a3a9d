//! Deterministic snapshots of a frozen [`Router`].
//!
//! A snapshot holds the routes and the grouped expression tables exactly as
//! the router resolves them. Restoring a snapshot recompiles the stored
//! expressions instead of re-registering routes, and yields a router that
//! resolves every path the same way as the one it was taken from.

use crate::config::Config;
use crate::error::SnapshotError;
use crate::expand::{Classification, RouteVariant};
use crate::matcher::Matcher;
use crate::route::{Location, Route};
use crate::table::{Entry, GroupKey, Router, Table};

use std::collections::HashSet;

use http::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The snapshot schema version written by this crate.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A serializable image of a [`Router`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot<T> {
    pub version: u32,
    pub config: Config,
    /// Routes, ordered by id.
    pub routes: Vec<RouteRecord<T>>,
    /// Groups, ordered by segment count then classification.
    pub groups: Vec<GroupRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord<T> {
    pub id: usize,
    pub name: String,
    pub path: String,
    /// Explicit constraints, in wildcard order.
    pub constraints: Vec<ConstraintRecord>,
    /// Bound handlers, in the order they were bound.
    pub methods: Vec<MethodRecord<T>>,
    pub location: Location,
    pub variants: Vec<VariantRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintRecord {
    pub wildcard: String,
    pub regex: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRecord<T> {
    pub method: String,
    pub handler: T,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub path: String,
    pub captures: Vec<usize>,
    pub classification: Classification,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub segments: usize,
    pub classification: Classification,
    /// Entries in resolution order.
    pub entries: Vec<EntryRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub regex: String,
    pub route: usize,
    pub variant: usize,
}

impl<T> Router<T> {
    fn records<'a, H>(&'a self, handler: impl Fn(&'a T) -> H) -> Snapshot<H> {
        let table = &self.table;

        let routes = table
            .routes
            .iter()
            .enumerate()
            .map(|(id, route)| RouteRecord {
                id,
                name: route.name().to_owned(),
                path: route.path().to_owned(),
                constraints: route
                    .pattern()
                    .wildcards()
                    .iter()
                    .filter_map(|w| {
                        w.constraint().map(|regex| ConstraintRecord {
                            wildcard: w.name().to_owned(),
                            regex: regex.to_owned(),
                        })
                    })
                    .collect(),
                methods: route
                    .methods()
                    .map(|(method, h)| MethodRecord {
                        method: method.as_str().to_owned(),
                        handler: handler(h),
                    })
                    .collect(),
                location: route.location().clone(),
                variants: route
                    .variants()
                    .iter()
                    .map(|v| VariantRecord {
                        path: v.path().to_owned(),
                        captures: v.captures().to_vec(),
                        classification: v.classification(),
                    })
                    .collect(),
            })
            .collect();

        let groups = table
            .groups
            .iter()
            .map(|(key, entries)| GroupRecord {
                segments: key.segments,
                classification: key.class,
                entries: entries
                    .iter()
                    .map(|e| EntryRecord {
                        regex: e.matcher.as_str().to_owned(),
                        route: e.route,
                        variant: e.variant,
                    })
                    .collect(),
            })
            .collect();

        Snapshot {
            version: SNAPSHOT_VERSION,
            config: table.config.clone(),
            routes,
            groups,
        }
    }

    /// Restores a router from a snapshot.
    pub fn from_snapshot(snapshot: Snapshot<T>) -> Result<Router<T>, SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        snapshot.config.validate()?;
        let mut table = Table::new(snapshot.config);

        for (index, record) in snapshot.routes.into_iter().enumerate() {
            if record.id != index {
                return Err(corrupt(format!(
                    "route {} stored at position {index}",
                    record.id
                )));
            }

            let mut route = Route::declared_at(record.name, record.path, record.location)?;
            for constraint in record.constraints {
                route = route.constraint(&constraint.wildcard, &constraint.regex)?;
            }
            for bound in record.methods {
                let method = Method::from_bytes(bound.method.as_bytes())
                    .map_err(|_| corrupt(format!("invalid method `{}`", bound.method)))?;
                route = route.method(method, bound.handler)?;
            }

            let variants = record
                .variants
                .into_iter()
                .map(|v| RouteVariant::from_parts(v.path, v.captures, v.classification))
                .collect::<Vec<_>>();
            if variants.as_slice() != route.variants() {
                return Err(corrupt(format!(
                    "variants of route `{}` do not match its path",
                    route.name()
                )));
            }

            route.assign_id(index);

            let unique = table.paths.insert(route.path().to_owned(), index).is_none()
                && table
                    .keys
                    .insert(route.pattern().slot_form().to_owned(), index)
                    .is_none()
                && table.names.insert(route.name().to_owned(), index).is_none();
            if !unique {
                return Err(corrupt(format!(
                    "route `{}` duplicates an earlier route",
                    route.name()
                )));
            }

            table.routes.push(route);
        }

        let mut seen = HashSet::new();
        for group in snapshot.groups {
            let key = GroupKey {
                segments: group.segments,
                class: group.classification,
            };
            if table.groups.contains_key(&key) {
                return Err(corrupt(format!("group {key:?} stored twice")));
            }

            for entry in group.entries {
                let matcher = {
                    let variant = table
                        .routes
                        .get(entry.route)
                        .and_then(|route| route.variants().get(entry.variant))
                        .ok_or_else(|| {
                            corrupt(format!(
                                "entry refers to missing variant {} of route {}",
                                entry.variant, entry.route
                            ))
                        })?;

                    if variant.segments() != key.segments || variant.classification() != key.class {
                        return Err(corrupt(format!(
                            "variant `{}` stored in group {key:?}",
                            variant.path()
                        )));
                    }

                    Matcher::from_source(&entry.regex, variant.captures())?
                };

                if !seen.insert((entry.route, entry.variant))
                    || table.expressions.contains_key(matcher.shape())
                {
                    return Err(corrupt(format!("expression `{}` stored twice", entry.regex)));
                }

                table.insert_entry(
                    key,
                    Entry {
                        matcher,
                        route: entry.route,
                        variant: entry.variant,
                    },
                );
            }
        }

        let variants = table.routes.iter().map(|r| r.variants().len()).sum::<usize>();
        if seen.len() != variants {
            return Err(corrupt(format!(
                "{} of {variants} route variants have no entry",
                variants - seen.len()
            )));
        }

        tracing::debug!(
            routes = table.routes.len(),
            groups = table.groups.len(),
            "routing table restored from snapshot"
        );

        Ok(Router { table })
    }

    /// Restores a router from a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Router<T>, SnapshotError>
    where
        T: DeserializeOwned,
    {
        let snapshot = serde_json::from_str(json)?;
        Router::from_snapshot(snapshot)
    }

    /// Encodes the router as a JSON snapshot.
    pub fn to_json(&self) -> Result<String, SnapshotError>
    where
        T: Serialize,
    {
        Ok(serde_json::to_string(&self.records(|h| h))?)
    }
}

impl<T: Clone> Router<T> {
    /// Takes a snapshot of the router.
    pub fn snapshot(&self) -> Snapshot<T> {
        self.records(T::clone)
    }
}

fn corrupt(reason: String) -> SnapshotError {
    SnapshotError::Corrupt(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Registry;

    fn router() -> Router<String> {
        let mut registry = Registry::new();
        let location = Location::new("routes.rs", 3, 5);

        for (name, path) in [
            ("home", "/"),
            ("user", "/users/{id}"),
            ("blog", "/blog/{year}/{month?}/{day?}"),
            ("any", "/{a}/{b}"),
        ] {
            let route = Route::declared_at(name, path, location.clone())
                .unwrap()
                .get(name.to_uppercase())
                .unwrap();
            registry.register(route).unwrap();
        }

        registry.freeze()
    }

    #[test]
    fn shape() {
        let snapshot = router().snapshot();
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.routes.len(), 4);
        assert_eq!(snapshot.routes[2].variants.len(), 4);
        assert_eq!(snapshot.routes[1].methods[0].handler, "USER");

        let keys = snapshot
            .groups
            .iter()
            .map(|g| (g.segments, g.classification))
            .collect::<Vec<_>>();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn restore() {
        let router = router();
        let restored = Router::from_snapshot(router.snapshot()).unwrap();

        assert_eq!(restored.snapshot(), router.snapshot());
        assert_eq!(restored.route_by_name("user").unwrap().id(), Some(1));
    }

    #[test]
    fn wrong_version() {
        let mut snapshot = router().snapshot();
        snapshot.version = 7;

        assert!(matches!(
            Router::from_snapshot(snapshot),
            Err(SnapshotError::Version {
                found: 7,
                expected: SNAPSHOT_VERSION
            })
        ));
    }

    #[test]
    fn missing_entry() {
        let mut snapshot = router().snapshot();
        snapshot.groups.pop();

        assert!(matches!(
            Router::from_snapshot(snapshot),
            Err(SnapshotError::Corrupt(_))
        ));
    }

    #[test]
    fn dangling_entry() {
        let mut snapshot = router().snapshot();
        snapshot.groups[0].entries[0].route = 99;

        assert!(matches!(
            Router::from_snapshot(snapshot),
            Err(SnapshotError::Corrupt(_))
        ));
    }

    #[test]
    fn tampered_variants() {
        let mut snapshot = router().snapshot();
        snapshot.routes[1].variants[0].path = "/people/{0}".into();

        assert!(matches!(
            Router::from_snapshot(snapshot),
            Err(SnapshotError::Corrupt(_))
        ));
    }

    #[test]
    fn invalid_expression() {
        let mut snapshot = router().snapshot();
        let entry = snapshot
            .groups
            .iter_mut()
            .flat_map(|g| g.entries.iter_mut())
            .find(|e| e.route == 1)
            .unwrap();
        entry.regex = "^/users/([0-9]+$".into();

        assert!(matches!(
            Router::from_snapshot(snapshot),
            Err(SnapshotError::Pattern(_))
        ));
    }
}
