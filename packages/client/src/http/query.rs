//! Query parameters and their URL encoding

use url::form_urlencoded;

/// Value of a single query parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Encoded once as `key=value`
    Scalar(String),
    /// Encoded as one `key=item` pair per element
    List(Vec<String>),
    /// Skipped entirely
    Null,
}

macro_rules! scalar_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for QueryValue {
                fn from(value: $ty) -> Self {
                    QueryValue::Scalar(value.to_string())
                }
            }
        )*
    };
}

scalar_from!(&str, String, &String, bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: ToString> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        QueryValue::List(values.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString> From<&[T]> for QueryValue {
    fn from(values: &[T]) -> Self {
        QueryValue::List(values.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString, const N: usize> From<[T; N]> for QueryValue {
    fn from(values: [T; N]) -> Self {
        QueryValue::List(values.iter().map(ToString::to_string).collect())
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(QueryValue::Null, Into::into)
    }
}

/// Ordered set of query parameters
///
/// Keys keep their insertion order; setting an existing key replaces its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, QueryValue)>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Query::set`].
    ///
    /// # Examples
    /// ```
    /// use fetchkit_client::http::{Query, encode_query};
    ///
    /// let query = Query::new().with("a", 1).with("b", [2, 3]);
    /// assert_eq!(encode_query("https://api.example/x", &query), "https://api.example/x?a=1&b=2&b=3");
    /// ```
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Set `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.pairs.push((key, value)),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.pairs
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Remove `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<QueryValue> {
        let index = self.pairs.iter().position(|(existing, _)| existing == key)?;
        Some(self.pairs.remove(index).1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.pairs.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Query::new();
        for (key, value) in iter {
            query.set(key, value);
        }
        query
    }
}

/// Append `query` to `base` as `application/x-www-form-urlencoded` pairs.
///
/// List values repeat their key once per element and `Null` values are
/// skipped. When nothing remains to encode, `base` is returned unchanged.
/// If `base` already carries a `?`, the pairs are joined with `&`. A
/// `#fragment` stays at the end, after the query.
#[must_use]
pub fn encode_query(base: &str, query: &Query) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in query.iter() {
        match value {
            QueryValue::Scalar(value) => {
                serializer.append_pair(key, value);
            }
            QueryValue::List(values) => {
                for value in values {
                    serializer.append_pair(key, value);
                }
            }
            QueryValue::Null => {}
        }
    }

    let encoded = serializer.finish();
    if encoded.is_empty() {
        return base.to_string();
    }

    let (path, fragment) = match base.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (base, None),
    };
    let separator = if path.contains('?') { '&' } else { '?' };
    match fragment {
        Some(fragment) => format!("{path}{separator}{encoded}#{fragment}"),
        None => format!("{path}{separator}{encoded}"),
    }
}
