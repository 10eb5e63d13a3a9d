use crate::error::PatternError;

use regex::Regex;

/// A single `{name}` or `{name?}` wildcard of a route pattern.
///
/// A wildcard without an explicit constraint matches the router's default
/// token pattern (see [`Config`](crate::Config)).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WildcardSpec {
    name: String,
    optional: bool,
    constraint: Option<String>,
}

impl WildcardSpec {
    /// Creates an unconstrained wildcard, validating its name.
    pub fn new(name: impl Into<String>, optional: bool) -> Result<Self, PatternError> {
        let name = name.into();
        validate_name(&name)?;

        Ok(WildcardSpec {
            name,
            optional,
            constraint: None,
        })
    }

    /// Validates a wildcard name and an optional regex constraint.
    ///
    /// ```
    /// use slotmatch::{PatternError, WildcardSpec};
    ///
    /// assert!(WildcardSpec::validate("id", Some(r"\d+")).is_ok());
    /// assert!(matches!(
    ///     WildcardSpec::validate("123abc", None),
    ///     Err(PatternError::InvalidWildcardName { .. })
    /// ));
    /// ```
    pub fn validate(name: &str, constraint: Option<&str>) -> Result<(), PatternError> {
        validate_name(name)?;

        if let Some(regex) = constraint {
            validate_constraint(name, regex)?;
        }

        Ok(())
    }

    /// Returns this wildcard with the given constraint attached.
    pub(crate) fn with_constraint(mut self, regex: &str) -> Result<Self, PatternError> {
        if self.constraint.is_some() {
            return Err(PatternError::DuplicateConstraint {
                name: self.name.clone(),
            });
        }

        validate_constraint(&self.name, regex)?;
        self.constraint = Some(regex.to_owned());
        Ok(self)
    }

    /// The wildcard name, without braces or `?`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the wildcard may be omitted from a matched path.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// The explicit constraint, if one was declared.
    pub fn constraint(&self) -> Option<&str> {
        self.constraint.as_deref()
    }
}

pub(crate) fn validate_name(name: &str) -> Result<(), PatternError> {
    let valid = match name.as_bytes().first() {
        Some(first) if !first.is_ascii_digit() => name
            .bytes()
            .all(|c| c.is_ascii_alphanumeric() || c == b'_'),
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(PatternError::InvalidWildcardName { name: name.into() })
    }
}

fn validate_constraint(name: &str, regex: &str) -> Result<(), PatternError> {
    match Regex::new(regex) {
        Ok(_) => Ok(()),
        Err(err) => Err(PatternError::InvalidWildcardRegex {
            name: name.into(),
            regex: regex.into(),
            message: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        for name in ["id", "_id", "user_id", "ID2", "_"] {
            assert!(validate_name(name).is_ok(), "{name}");
        }

        for name in ["", "123abc", "1", "user-id", "a b", "ñ", "id?"] {
            assert_eq!(
                validate_name(name),
                Err(PatternError::InvalidWildcardName { name: name.into() }),
                "{name}"
            );
        }
    }

    #[test]
    fn constraints() {
        assert!(WildcardSpec::validate("id", Some("[0-9]+")).is_ok());
        assert!(WildcardSpec::validate("slug", Some("(foo|bar)")).is_ok());

        match WildcardSpec::validate("id", Some("[0-9")) {
            Err(PatternError::InvalidWildcardRegex { name, regex, .. }) => {
                assert_eq!(name, "id");
                assert_eq!(regex, "[0-9");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn constraint_declared_once() {
        let spec = WildcardSpec::new("id", false)
            .unwrap()
            .with_constraint(r"\d+")
            .unwrap();
        assert_eq!(spec.constraint(), Some(r"\d+"));

        assert_eq!(
            spec.with_constraint("[a-z]+"),
            Err(PatternError::DuplicateConstraint { name: "id".into() })
        );
    }
}
