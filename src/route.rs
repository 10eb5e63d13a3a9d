use crate::error::PatternError;
use crate::expand::{expand, RouteVariant};
use crate::pattern::RoutePattern;

use std::fmt;

use http::Method;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\-.]+$").unwrap());

/// The methods a handler can be bound to.
pub const KNOWN_METHODS: [&str; 17] = [
    "GET", "POST", "PUT", "PATCH", "DELETE", "COPY", "HEAD", "OPTIONS", "LINK", "UNLINK", "PURGE",
    "LOCK", "UNLOCK", "PROPFIND", "VIEW", "TRACE", "CONNECT",
];

/// The source location a route was declared at.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    file: String,
    line: u32,
    column: u32,
}

impl Location {
    /// Creates a location from a file name and a 1-based line and column.
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Location {
        Location {
            file: file.into(),
            line,
            column,
        }
    }

    /// The location of the caller.
    #[track_caller]
    pub fn caller() -> Location {
        let caller = std::panic::Location::caller();
        Location::new(caller.file(), caller.line(), caller.column())
    }

    /// The source file.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// The 1-based line.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// The 1-based column.
    pub fn column(&self) -> u32 {
        self.column
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A route declaration.
///
/// Routes are built by value: every builder method consumes the route and
/// returns the updated one, so a route can't change once it has been handed
/// to a [`Registry`](crate::Registry).
///
/// ```rust
/// use slotmatch::Route;
/// use http::Method;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let route = Route::new("user", "/users/{id}")?
///     .constraint("id", r"[0-9]+")?
///     .get("show user")?
///     .method(Method::DELETE, "delete user")?;
///
/// assert_eq!(route.handler(&Method::GET), Some(&"show user"));
/// assert_eq!(route.handler(&Method::POST), None);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Route<T> {
    id: Option<usize>,
    name: String,
    pattern: RoutePattern,
    variants: Vec<RouteVariant>,
    methods: Vec<(Method, T)>,
    location: Location,
}

impl<T> Route<T> {
    /// Declares a route, recording the caller's location.
    #[track_caller]
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Result<Route<T>, PatternError> {
        let location = Location::caller();
        Route::declared_at(name, path, location)
    }

    /// Declares a route with an explicit declaration site.
    ///
    /// Useful for loaders that read declarations from another source.
    pub fn declared_at(
        name: impl Into<String>,
        path: impl Into<String>,
        location: Location,
    ) -> Result<Route<T>, PatternError> {
        let name = name.into();
        if !NAME.is_match(&name) {
            return Err(PatternError::InvalidRouteName { name });
        }

        let pattern = RoutePattern::compile(path)?;
        let variants = expand(&pattern)?;

        Ok(Route {
            id: None,
            name,
            pattern,
            variants,
            methods: Vec::new(),
            location,
        })
    }

    /// Constrains a wildcard to a regular expression.
    pub fn constraint(mut self, wildcard: &str, regex: &str) -> Result<Route<T>, PatternError> {
        self.pattern.constrain(wildcard, regex)?;
        Ok(self)
    }

    /// Binds a handler to an HTTP method.
    pub fn method(mut self, method: Method, handler: T) -> Result<Route<T>, PatternError> {
        if !KNOWN_METHODS.contains(&method.as_str()) {
            return Err(PatternError::UnknownMethod {
                method: method.to_string(),
            });
        }

        if self.methods.iter().any(|(m, _)| *m == method) {
            return Err(PatternError::DuplicateMethod {
                method: method.to_string(),
            });
        }

        self.methods.push((method, handler));
        Ok(self)
    }

    /// Binds a handler for GET requests.
    pub fn get(self, handler: T) -> Result<Route<T>, PatternError> {
        self.method(Method::GET, handler)
    }

    /// Binds a handler for POST requests.
    pub fn post(self, handler: T) -> Result<Route<T>, PatternError> {
        self.method(Method::POST, handler)
    }

    /// Binds a handler for PUT requests.
    pub fn put(self, handler: T) -> Result<Route<T>, PatternError> {
        self.method(Method::PUT, handler)
    }

    /// Binds a handler for PATCH requests.
    pub fn patch(self, handler: T) -> Result<Route<T>, PatternError> {
        self.method(Method::PATCH, handler)
    }

    /// Binds a handler for DELETE requests.
    pub fn delete(self, handler: T) -> Result<Route<T>, PatternError> {
        self.method(Method::DELETE, handler)
    }

    /// The id assigned at registration.
    pub fn id(&self) -> Option<usize> {
        self.id
    }

    /// The route's unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared path.
    pub fn path(&self) -> &str {
        self.pattern.raw()
    }

    /// The compiled path, with its wildcards in declaration order.
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Every concrete shape of this route.
    pub fn variants(&self) -> &[RouteVariant] {
        &self.variants
    }

    /// The handler bound to `method`.
    pub fn handler(&self, method: &Method) -> Option<&T> {
        self.methods
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, handler)| handler)
    }

    /// The bound methods and handlers, in the order they were bound.
    pub fn methods(&self) -> impl ExactSizeIterator<Item = (&Method, &T)> {
        self.methods.iter().map(|(m, h)| (m, h))
    }

    /// Where the route was declared.
    pub fn location(&self) -> &Location {
        &self.location
    }

    pub(crate) fn assign_id(&mut self, id: usize) {
        self.id = Some(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        for name in ["home", "user.show", "api-v1", "a_b"] {
            assert!(Route::<()>::new(name, "/").is_ok(), "{name}");
        }

        for name in ["", "user show", "user/show", "user:show", "ñame", "user.naïve", "名前"] {
            assert_eq!(
                Route::<()>::new(name, "/").unwrap_err(),
                PatternError::InvalidRouteName { name: name.into() },
                "{name}"
            );
        }
    }

    #[test]
    fn location() {
        let line = line!() + 1;
        let route = Route::<()>::new("home", "/").unwrap();
        assert_eq!(route.location().file(), file!());
        assert_eq!(route.location().line(), line);
    }

    #[test]
    fn methods() {
        let route = Route::new("items", "/items")
            .unwrap()
            .get(1)
            .unwrap()
            .post(2)
            .unwrap();

        assert_eq!(route.handler(&Method::GET), Some(&1));
        assert_eq!(route.handler(&Method::POST), Some(&2));
        assert_eq!(route.handler(&Method::PUT), None);
        assert_eq!(
            route.methods().map(|(m, _)| m.as_str()).collect::<Vec<_>>(),
            vec!["GET", "POST"]
        );

        assert_eq!(
            route.clone().get(3).unwrap_err(),
            PatternError::DuplicateMethod {
                method: "GET".into()
            }
        );

        let brew = Method::from_bytes(b"BREW").unwrap();
        assert_eq!(
            route.method(brew, 4).unwrap_err(),
            PatternError::UnknownMethod {
                method: "BREW".into()
            }
        );
    }

    #[test]
    fn variants() {
        let route = Route::<()>::new("blog", "/blog/{year}/{month?}/{day?}").unwrap();
        assert_eq!(route.variants().len(), 4);
        assert_eq!(route.id(), None);
    }

    #[test]
    fn constraints() {
        let route = Route::<()>::new("user", "/users/{id}")
            .unwrap()
            .constraint("id", "[0-9]+")
            .unwrap();
        assert_eq!(route.pattern().wildcards()[0].constraint(), Some("[0-9]+"));

        assert!(matches!(
            route.clone().constraint("id", "[a-z]+"),
            Err(PatternError::DuplicateConstraint { .. })
        ));
        assert!(matches!(
            route.clone().constraint("name", "[a-z]+"),
            Err(PatternError::UnknownWildcard { .. })
        ));
        assert!(matches!(
            Route::<()>::new("user", "/users/{id}")
                .unwrap()
                .constraint("id", "[0-9"),
            Err(PatternError::InvalidWildcardRegex { .. })
        ));
    }
}
