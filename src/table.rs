use crate::config::Config;
use crate::error::{ConfigError, InsertError, PatternError};
use crate::expand::Classification;
use crate::matcher::Matcher;
use crate::route::Route;

use std::collections::{BTreeMap, HashMap};

/// Identifies a group of expressions tried together during resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct GroupKey {
    pub(crate) segments: usize,
    pub(crate) class: Classification,
}

/// One variant of one route, as stored in a group.
#[derive(Clone, Debug)]
pub(crate) struct Entry {
    pub(crate) matcher: Matcher,
    pub(crate) route: usize,
    pub(crate) variant: usize,
}

// The state shared by the registration and the frozen phase.
#[derive(Clone, Debug)]
pub(crate) struct Table<T> {
    pub(crate) config: Config,
    pub(crate) routes: Vec<Route<T>>,
    // declared path -> route
    pub(crate) paths: HashMap<String, usize>,
    // slot form -> route
    pub(crate) keys: HashMap<String, usize>,
    // route name -> route
    pub(crate) names: HashMap<String, usize>,
    // concrete path of a static variant -> (route, variant)
    pub(crate) statics: HashMap<String, (usize, usize)>,
    // expression shape, without slot numbers -> route
    pub(crate) expressions: HashMap<String, usize>,
    // expressions in insertion order
    pub(crate) groups: BTreeMap<GroupKey, Vec<Entry>>,
}

impl<T> Table<T> {
    pub(crate) fn new(config: Config) -> Self {
        Table {
            config,
            routes: Vec::new(),
            paths: HashMap::new(),
            keys: HashMap::new(),
            names: HashMap::new(),
            statics: HashMap::new(),
            expressions: HashMap::new(),
            groups: BTreeMap::new(),
        }
    }

    // Records an entry. The caller has already checked for conflicts.
    pub(crate) fn insert_entry(&mut self, key: GroupKey, entry: Entry) {
        if key.class == Classification::Static {
            let path = &self.routes[entry.route].variants()[entry.variant];
            self.statics
                .insert(path.path().to_owned(), (entry.route, entry.variant));
        }

        self.expressions
            .insert(entry.matcher.shape().to_owned(), entry.route);
        self.groups.entry(key).or_default().push(entry);
    }
}

/// Accumulates routes into a routing table.
///
/// Every registration either fully succeeds or leaves the registry untouched.
/// Once all routes are declared, [`freeze`](Registry::freeze) the registry
/// into a [`Router`] to resolve paths.
///
/// ```rust
/// use slotmatch::{InsertError, Registry, Route};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut registry = Registry::new();
/// registry.register(Route::new("home", "/")?.get("home")?)?;
/// registry.register(Route::new("user", "/users/{id}")?.get("user")?)?;
///
/// let err = registry.register(Route::new("other", "/users/{name}")?.get("other")?);
/// assert!(matches!(err, Err(InsertError::KeyConflict { .. })));
///
/// let router = registry.freeze();
/// assert_eq!(router.len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Registry<T> {
    table: Table<T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            table: Table::new(Config::default()),
        }
    }
}

impl<T> Registry<T> {
    /// Creates an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry, validating `config` first.
    pub fn with_config(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            table: Table::new(config),
        })
    }

    /// Registers a route, returning its id.
    ///
    /// Ids are assigned sequentially from zero. A failed registration does
    /// not consume an id.
    pub fn register(&mut self, mut route: Route<T>) -> Result<usize, InsertError> {
        let result = self.check(&route);

        let matchers = match result {
            Ok(matchers) => matchers,
            Err(err) => {
                tracing::debug!(
                    name = route.name(),
                    path = route.path(),
                    error = %err,
                    "route registration rejected"
                );
                return Err(err);
            }
        };

        let id = self.table.routes.len();
        route.assign_id(id);

        self.table.paths.insert(route.path().to_owned(), id);
        self.table
            .keys
            .insert(route.pattern().slot_form().to_owned(), id);
        self.table.names.insert(route.name().to_owned(), id);

        let keys = route
            .variants()
            .iter()
            .map(|variant| GroupKey {
                segments: variant.segments(),
                class: variant.classification(),
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            id,
            name = route.name(),
            path = route.path(),
            variants = route.variants().len(),
            "route registered"
        );

        self.table.routes.push(route);
        for (variant, (key, matcher)) in keys.into_iter().zip(matchers).enumerate() {
            self.table.insert_entry(
                key,
                Entry {
                    matcher,
                    route: id,
                    variant,
                },
            );
        }

        Ok(id)
    }

    // Compiles the route and checks it against the table, without mutating anything.
    fn check(&self, route: &Route<T>) -> Result<Vec<Matcher>, InsertError> {
        let table = &self.table;
        let pattern = route.pattern();

        if let Some(&known) = table.paths.get(route.path()) {
            return Err(InsertError::PathExists {
                path: route.path().into(),
                declared: route.location().clone(),
                registered: table.routes[known].location().clone(),
            });
        }

        if let Some(&known) = table.keys.get(pattern.slot_form()) {
            return Err(self.key_conflict(route, pattern.slot_form(), known));
        }

        if let Some(&known) = table.names.get(route.name()) {
            let registered = &table.routes[known];
            return Err(InsertError::NameConflict {
                name: route.name().into(),
                path: route.path().into(),
                declared: route.location().clone(),
                registered_path: registered.path().into(),
                registered: registered.location().clone(),
            });
        }

        let optionals = pattern.optional_slots().len();
        if optionals > table.config.max_optional_wildcards {
            return Err(PatternError::TooManyOptionals {
                path: route.path().into(),
                count: optionals,
                max: table.config.max_optional_wildcards,
            }
            .into());
        }

        let matchers = route
            .variants()
            .iter()
            .map(|variant| {
                Matcher::compile(variant, pattern.wildcards(), &table.config.default_pattern)
            })
            .collect::<Result<Vec<_>, _>>()?;

        // distinct keys can still share a concrete variant, e.g. `/blog` and
        // the bare variant of `/blog/{page?}`
        for (variant, matcher) in route.variants().iter().zip(&matchers) {
            if let Some(&known) = table.expressions.get(matcher.shape()) {
                return Err(self.key_conflict(route, variant.path(), known));
            }
        }

        Ok(matchers)
    }

    fn key_conflict(&self, route: &Route<T>, key: &str, known: usize) -> InsertError {
        InsertError::KeyConflict {
            path: route.path().into(),
            key: key.into(),
            declared: route.location().clone(),
            registered: self.table.routes[known].location().clone(),
        }
    }

    /// The number of registered routes.
    pub fn len(&self) -> usize {
        self.table.routes.len()
    }

    /// Returns `true` if no route was registered.
    pub fn is_empty(&self) -> bool {
        self.table.routes.is_empty()
    }

    /// The configuration routes are registered under.
    pub fn config(&self) -> &Config {
        &self.table.config
    }

    /// Ends the registration phase.
    pub fn freeze(self) -> Router<T> {
        tracing::debug!(
            routes = self.table.routes.len(),
            groups = self.table.groups.len(),
            "routing table frozen"
        );

        Router { table: self.table }
    }
}

/// A frozen routing table.
///
/// A router is read-only: resolving never mutates it, so it can be shared
/// across threads (e.g. in an `Arc`) without locking.
#[derive(Clone, Debug)]
pub struct Router<T> {
    pub(crate) table: Table<T>,
}

impl<T> Router<T> {
    /// Returns the route with the given id.
    pub fn route(&self, id: usize) -> Option<&Route<T>> {
        self.table.routes.get(id)
    }

    /// Returns the route with the given name.
    pub fn route_by_name(&self, name: &str) -> Option<&Route<T>> {
        self.table
            .names
            .get(name)
            .map(|&id| &self.table.routes[id])
    }

    /// All routes, ordered by id.
    pub fn routes(&self) -> &[Route<T>] {
        &self.table.routes
    }

    /// The number of routes.
    pub fn len(&self) -> usize {
        self.table.routes.len()
    }

    /// Returns `true` if the router has no routes.
    pub fn is_empty(&self) -> bool {
        self.table.routes.is_empty()
    }

    /// The configuration the router was frozen with.
    pub fn config(&self) -> &Config {
        &self.table.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::Location;

    fn route(name: &str, path: &str) -> Route<()> {
        Route::declared_at(name, path, Location::new("routes.rs", 1, 1)).unwrap()
    }

    #[test]
    fn sequential_ids() {
        let mut registry = Registry::new();
        assert_eq!(registry.register(route("a", "/a")), Ok(0));
        assert!(registry.register(route("b", "/a")).is_err());
        assert_eq!(registry.register(route("c", "/c")), Ok(1));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn failed_registration_leaves_table_untouched() {
        let mut registry = Registry::new();
        registry.register(route("blog", "/blog")).unwrap();

        let before = (
            registry.table.paths.len(),
            registry.table.keys.len(),
            registry.table.names.len(),
            registry.table.expressions.len(),
        );

        // passes the path, key and name checks but collides on a variant
        let err = registry.register(route("pages", "/blog/{page?}")).unwrap_err();
        assert!(matches!(err, InsertError::KeyConflict { ref key, .. } if key == "/blog"));

        let after = (
            registry.table.paths.len(),
            registry.table.keys.len(),
            registry.table.names.len(),
            registry.table.expressions.len(),
        );
        assert_eq!(before, after);
        assert!(registry.table.names.get("pages").is_none());
    }

    #[test]
    fn groups() {
        let mut registry = Registry::new();
        registry.register(route("home", "/")).unwrap();
        registry.register(route("user", "/users/{id}")).unwrap();
        registry.register(route("any", "/{a}/{b}")).unwrap();
        registry.register(route("blog", "/blog/{year}/{month?}")).unwrap();

        let keys = registry
            .table
            .groups
            .iter()
            .map(|(key, entries)| (key.segments, key.class, entries.len()))
            .collect::<Vec<_>>();

        assert_eq!(
            keys,
            vec![
                (0, Classification::Static, 1),
                (2, Classification::Mixed, 2),
                (2, Classification::Dynamic, 1),
                (3, Classification::Mixed, 1),
            ]
        );

        assert_eq!(registry.table.statics.get("/"), Some(&(0, 0)));
    }

    #[test]
    fn optional_limit() {
        let config = Config {
            max_optional_wildcards: 1,
            ..Config::default()
        };
        let mut registry = Registry::with_config(config).unwrap();

        assert!(registry.register(route("one", "/x/{a?}")).is_ok());
        assert_eq!(
            registry.register(route("two", "/y/{a?}/{b?}")),
            Err(InsertError::Pattern(PatternError::TooManyOptionals {
                path: "/y/{a?}/{b?}".into(),
                count: 2,
                max: 1,
            }))
        );
    }

    #[test]
    fn invalid_default_pattern() {
        let config = Config {
            default_pattern: "(".into(),
            ..Config::default()
        };
        assert!(matches!(
            Registry::<()>::with_config(config),
            Err(ConfigError::DefaultPattern { .. })
        ));
    }
}
