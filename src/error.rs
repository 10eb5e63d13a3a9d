use crate::route::Location;

use thiserror::Error;

/// Represents errors in a route declaration.
///
/// These are raised while a [`Route`](crate::Route) is being built or compiled,
/// before it ever reaches a routing table.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum PatternError {
    /// The path does not have the shape of a route path.
    #[error("malformed route path `{path}`: {reason}")]
    MalformedPath {
        /// The offending path.
        path: String,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// The same wildcard name was used twice in one path.
    #[error("duplicated wildcard `{{{name}}}` in route path `{path}`, every wildcard must be unique")]
    DuplicateWildcard {
        /// The repeated wildcard name.
        name: String,
        /// The route path.
        path: String,
    },
    /// Wildcard names must be alphanumeric or underscore and must not start with a digit.
    #[error("invalid wildcard name `{name}`, expecting alphanumeric or underscore characters not starting with a digit")]
    InvalidWildcardName {
        /// The rejected name.
        name: String,
    },
    /// A wildcard constraint is not a valid regular expression.
    #[error("invalid regex constraint `{regex}` for wildcard `{{{name}}}`: {message}")]
    InvalidWildcardRegex {
        /// The wildcard the constraint was declared for.
        name: String,
        /// The rejected expression.
        regex: String,
        /// The regex compiler's message.
        message: String,
    },
    /// The expression assembled for a route variant failed to compile.
    #[error("invalid route regex `{regex}`: {message}")]
    InvalidRegexPattern {
        /// The assembled expression.
        regex: String,
        /// The regex compiler's message.
        message: String,
    },
    /// Tokens of the form `{n}` are used for slot markers.
    #[error("wildcards in the form of `{token}` are reserved, found in route path `{path}`")]
    ReservedWildcard {
        /// The reserved token.
        token: String,
        /// The route path.
        path: String,
    },
    /// A constraint was declared for a wildcard that the path doesn't contain.
    #[error("wildcard `{{{name}}}` doesn't exist in route path `{path}`")]
    UnknownWildcard {
        /// The wildcard name.
        name: String,
        /// The route path.
        path: String,
    },
    /// A second constraint was declared for the same wildcard.
    #[error("constraint for wildcard `{{{name}}}` has already been declared")]
    DuplicateConstraint {
        /// The wildcard name.
        name: String,
    },
    /// Route names must be made of word characters, hyphens or dots.
    #[error("invalid route name `{name}`, expecting at least one alphanumeric, underscore, hyphen or dot character")]
    InvalidRouteName {
        /// The rejected name.
        name: String,
    },
    /// Handlers can only be bound to known HTTP methods.
    #[error("unknown HTTP method `{method}`")]
    UnknownMethod {
        /// The rejected method.
        method: String,
    },
    /// A handler was already bound for this method.
    #[error("a handler for HTTP method `{method}` has already been bound")]
    DuplicateMethod {
        /// The repeated method.
        method: String,
    },
    /// The route declares more optional wildcards than allowed.
    #[error("route path `{path}` declares {count} optional wildcards, at most {max} are allowed")]
    TooManyOptionals {
        /// The route path.
        path: String,
        /// Optional wildcards found.
        count: usize,
        /// The configured limit.
        max: usize,
    },
}

/// Represents errors that can occur when registering a new route.
///
/// Conflict errors carry the declaration site of both the rejected route and
/// the route that already occupies the slot.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum InsertError {
    /// The exact route path is already registered.
    #[error("unable to register route path `{path}` at {declared} (path already registered at {registered})")]
    PathExists {
        /// The route path.
        path: String,
        /// Where the rejected route was declared.
        declared: Location,
        /// Where the existing route was declared.
        registered: Location,
    },
    /// The canonical key of the route is already reserved by another route.
    #[error("router conflict detected for path `{path}` at {declared} (internal key `{key}` is already reserved by {registered})")]
    KeyConflict {
        /// The route path.
        path: String,
        /// The colliding key.
        key: String,
        /// Where the rejected route was declared.
        declared: Location,
        /// Where the existing route was declared.
        registered: Location,
    },
    /// The route name is already taken.
    #[error("unable to assign route name `{name}` for path `{path}` at {declared} (name assigned to `{registered_path}` at {registered})")]
    NameConflict {
        /// The route name.
        name: String,
        /// The rejected route's path.
        path: String,
        /// Where the rejected route was declared.
        declared: Location,
        /// The path of the route owning the name.
        registered_path: String,
        /// Where the existing route was declared.
        registered: Location,
    },
    /// The route failed to compile.
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// A failed match attempt.
///
/// ```
/// use slotmatch::{MatchError, Registry, Route};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut registry = Registry::<&str>::new();
/// registry.register(Route::new("home", "/home")?)?;
/// let router = registry.freeze();
///
/// // no routes match
/// if let Err(err) = router.at("/foobar") {
///     assert_eq!(err, MatchError::NotFound);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
pub enum MatchError {
    /// No matching route was found.
    #[error("matching route not found")]
    NotFound,
}

/// Errors raised while building a path with [`Router::url_for`](crate::Router::url_for).
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UrlError {
    /// No route has this name.
    #[error("no route named `{name}`")]
    UnknownRoute {
        /// The requested name.
        name: String,
    },
    /// A mandatory wildcard has no value.
    #[error("missing value for wildcard `{{{wildcard}}}` of route `{route}`")]
    MissingValue {
        /// The route name.
        route: String,
        /// The wildcard without a value.
        wildcard: String,
    },
    /// The values don't satisfy the route's wildcard patterns.
    #[error("`{url}` does not match route `{route}`")]
    InvalidValue {
        /// The route name.
        route: String,
        /// The rejected path.
        url: String,
    },
}

/// Errors raised while loading a [`Config`](crate::Config).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("failed to parse router config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The default wildcard pattern does not compile.
    #[error("invalid default wildcard pattern `{pattern}`: {message}")]
    DefaultPattern {
        /// The rejected pattern.
        pattern: String,
        /// The regex compiler's message.
        message: String,
    },
    /// The optional wildcard limit is out of range.
    #[error("max_optional_wildcards must be at most {max}, got {value}")]
    OptionalLimit {
        /// The configured value.
        value: usize,
        /// The hard limit.
        max: usize,
    },
}

/// Errors raised while restoring a router from a [`Snapshot`](crate::Snapshot).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot could not be encoded or decoded.
    #[error("snapshot encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    /// The snapshot was written by an incompatible schema version.
    #[error("unsupported snapshot version {found}, expected {expected}")]
    Version {
        /// The version found in the snapshot.
        found: u32,
        /// The version this build reads.
        expected: u32,
    },
    /// The stored configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A stored route or expression failed to compile.
    #[error(transparent)]
    Pattern(#[from] PatternError),
    /// The snapshot is internally inconsistent.
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),
}
