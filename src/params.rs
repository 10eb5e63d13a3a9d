use std::collections::HashMap;
use std::{fmt, iter, mem, slice};

/// A captured wildcard: its name and the matched text.
#[derive(PartialEq, Eq, Ord, PartialOrd, Default, Copy, Clone)]
struct Param<'k, 'v> {
    key: &'k str,
    value: &'v str,
}

/// The arguments captured by a route match.
///
/// Keys borrow from the router and values borrow from the matched path.
///
/// ```rust
/// # use slotmatch::{Registry, Route};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let mut registry = Registry::<()>::new();
/// # registry.register(Route::new("post", "/posts/{year}/{slug}")?)?;
/// # let router = registry.freeze();
/// let matched = router.at("/posts/2024/hello")?;
///
/// // Iterate through the keys and values, in path order.
/// for (key, value) in matched.params.iter() {
///     println!("key: {}, value: {}", key, value);
/// }
///
/// // Get a specific value by name.
/// assert_eq!(matched.params.get("slug"), Some("hello"));
/// # Ok(())
/// # }
/// ```
#[derive(PartialEq, Eq, Ord, PartialOrd, Clone)]
pub struct Params<'k, 'v> {
    kind: ParamsKind<'k, 'v>,
}

// Few routes capture more than a handful of wildcards.
const SMALL: usize = 4;

#[derive(PartialEq, Eq, Ord, PartialOrd, Clone)]
enum ParamsKind<'k, 'v> {
    Small([Param<'k, 'v>; SMALL], usize),
    Large(Vec<Param<'k, 'v>>),
}

impl<'k, 'v> Params<'k, 'v> {
    pub(crate) fn new() -> Self {
        Self {
            kind: ParamsKind::Small(Default::default(), 0),
        }
    }

    fn as_slice(&self) -> &[Param<'k, 'v>] {
        match &self.kind {
            ParamsKind::Small(arr, len) => &arr[..*len],
            ParamsKind::Large(vec) => vec,
        }
    }

    /// Returns the number of captured wildcards.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns `true` if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the value captured for the given wildcard name.
    pub fn get(&self, key: impl AsRef<str>) -> Option<&'v str> {
        let key = key.as_ref();
        self.as_slice()
            .iter()
            .find(|param| param.key == key)
            .map(|param| param.value)
    }

    /// Returns an iterator over the names and values.
    pub fn iter(&self) -> ParamsIter<'_, 'k, 'v> {
        ParamsIter {
            inner: self.as_slice().iter(),
        }
    }

    /// Copies the arguments into an owned map keyed by wildcard name.
    pub fn to_map(&self) -> HashMap<String, String> {
        self.iter()
            .map(|(key, value)| (key.to_owned(), value.to_owned()))
            .collect()
    }

    pub(crate) fn push(&mut self, key: &'k str, value: &'v str) {
        #[cold]
        fn spill<'k, 'v>(
            arr: &mut [Param<'k, 'v>; SMALL],
            param: Param<'k, 'v>,
        ) -> Vec<Param<'k, 'v>> {
            let mut vec = Vec::with_capacity(SMALL * 2);
            vec.extend(arr.iter_mut().map(mem::take));
            vec.push(param);
            vec
        }

        let param = Param { key, value };
        match &mut self.kind {
            ParamsKind::Small(arr, len) if *len == SMALL => {
                self.kind = ParamsKind::Large(spill(arr, param));
            }
            ParamsKind::Small(arr, len) => {
                arr[*len] = param;
                *len += 1;
            }
            ParamsKind::Large(vec) => vec.push(param),
        }
    }
}

impl fmt::Debug for Params<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// An iterator over the names and values of captured [`Params`].
pub struct ParamsIter<'ps, 'k, 'v> {
    inner: slice::Iter<'ps, Param<'k, 'v>>,
}

impl<'ps, 'k, 'v> Iterator for ParamsIter<'ps, 'k, 'v> {
    type Item = (&'k str, &'v str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|p| (p.key, p.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for ParamsIter<'_, '_, '_> {}

impl iter::FusedIterator for ParamsIter<'_, '_, '_> {}
