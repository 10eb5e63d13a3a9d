//! A route compiler and resolver with optional wildcards and per-wildcard
//! regex constraints.
//!
//! Routes are declared with a name and a path such as
//! `/blog/{year}/{month?}`. Every route is expanded into one concrete
//! variant per combination of its optional wildcards, each variant is
//! compiled into an anchored regular expression, and the expressions are
//! grouped by segment count and priority tier.
//!
//! ```rust
//! use slotmatch::{Classification, Registry, Route};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut registry = Registry::new();
//! registry.register(Route::new("home", "/")?.get("Welcome!")?)?;
//! registry.register(
//!     Route::new("archive", "/blog/{year}/{month?}")?
//!         .constraint("year", "[0-9]{4}")?
//!         .get("An archive")?,
//! )?;
//! registry.register(Route::new("page", "/{page}")?.get("A page")?)?;
//!
//! let router = registry.freeze();
//!
//! let matched = router.at("/blog/2024")?;
//! assert_eq!(matched.route.name(), "archive");
//! assert_eq!(matched.params.get("year"), Some("2024"));
//! assert_eq!(matched.params.get("month"), None);
//! assert_eq!(matched.classification, Classification::Mixed);
//!
//! let matched = router.at("/blog/2024/05")?;
//! assert_eq!(matched.params.get("month"), Some("05"));
//!
//! let matched = router.at("/about")?;
//! assert_eq!(matched.route.name(), "page");
//! assert_eq!(matched.handler(&http::Method::GET), Some(&"A page"));
//! # Ok(())
//! # }
//! ```
//!
//! # Wildcards
//!
//! A wildcard `{name}` captures one path segment. Without an explicit
//! [`constraint`](Route::constraint) it uses the configured
//! [`default_pattern`](Config::default_pattern), which never matches a `/`.
//! A trailing `?` makes the wildcard optional: the route then also matches
//! the path with that segment removed.
//!
//! ```text
//! Pattern: /blog/{year}/{month?}
//!
//! /blog/2024       match: year = "2024"
//! /blog/2024/05    match: year = "2024", month = "05"
//! /blog            no match
//! /blog/2024/05/1  no match
//! ```
//!
//! Tokens made only of digits, such as `{0}`, are reserved.
//!
//! # Priority
//!
//! Variants are classified by what their concrete path contains:
//!
//! - [`Static`](Classification::Static): no wildcards, e.g. `/about`.
//! - [`Mixed`](Classification::Mixed): literal text and wildcards, e.g. `/users/{id}`.
//! - [`Dynamic`](Classification::Dynamic): only wildcards, e.g. `/{a}/{b}`.
//!
//! A path is tried against static variants first, then mixed, then dynamic.
//! Within a tier, only variants with the same number of segments as the path
//! are tried, in registration order.
//!
//! # Conflicts
//!
//! Two routes conflict if they have the same path, the same wildcard
//! structure (`/users/{id}` and `/users/{name}`), the same name, or share a
//! concrete variant (`/blog` and `/blog/{page?}`). Conflicting registrations
//! are rejected with an [`InsertError`] carrying the declaration site of both
//! routes.
//!
//! # Snapshots
//!
//! A frozen [`Router`] can be written to JSON with [`Router::to_json`] and
//! restored with [`Router::from_json`] without recompiling routes from their
//! declarations.

#![deny(clippy::all)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod expand;
mod matcher;
mod params;
mod path;
mod pattern;
mod resolve;
mod route;
mod snapshot;
mod table;
mod wildcard;

pub use config::{Config, DEFAULT_PATTERN};
pub use error::{ConfigError, InsertError, MatchError, PatternError, SnapshotError, UrlError};
pub use expand::{expand, Classification, RouteVariant, MAX_OPTIONAL_WILDCARDS};
pub use matcher::Matcher;
pub use params::{Params, ParamsIter};
pub use pattern::RoutePattern;
pub use resolve::Match;
pub use route::{Location, Route, KNOWN_METHODS};
pub use snapshot::{
    ConstraintRecord, EntryRecord, GroupRecord, MethodRecord, RouteRecord, Snapshot,
    VariantRecord, SNAPSHOT_VERSION,
};
pub use table::{Registry, Router};
pub use wildcard::WildcardSpec;
