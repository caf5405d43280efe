//! Search queries as sent by the host
//!
//! A query comes in one of three shapes: a free-text string, a list of
//! strings, or a mapping from field name (`"any"`, `"uri"`, `"artist"`, ...)
//! to one or several values. The mapping keeps its insertion order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Value of a single query field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    One(String),
    Many(Vec<String>),
}

impl FieldValue {
    /// Values of the field, in order
    pub fn values(&self) -> &[String] {
        match self {
            FieldValue::One(v) => std::slice::from_ref(v),
            FieldValue::Many(v) => v,
        }
    }

    /// All values concatenated without separator
    pub fn concat(&self) -> String {
        self.values().concat()
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::One(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::One(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        FieldValue::Many(values)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        FieldValue::Many(values.into_iter().map(String::from).collect())
    }
}

/// A search query
///
/// Deserializes from `"text"`, `["a", "b"]` or `{"field": "v" | ["v", ...]}`.
/// Any other shape (nested mappings, numbers...) is a deserialization error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Query {
    Text(String),
    List(Vec<String>),
    Fields(IndexMap<String, FieldValue>),
}

impl Query {
    /// Build a field query from `(field, value)` pairs, keeping their order
    pub fn fields<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Query::Fields(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// True when the query carries nothing to search for
    pub fn is_empty(&self) -> bool {
        match self {
            Query::Text(text) => text.is_empty(),
            Query::List(items) => items.is_empty(),
            Query::Fields(fields) => fields.is_empty(),
        }
    }

    /// Value of a field, for field queries
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        match self {
            Query::Fields(fields) => fields.get(name),
            _ => None,
        }
    }
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Query::Text(text.to_string())
    }
}

impl From<String> for Query {
    fn from(text: String) -> Self {
        Query::Text(text)
    }
}

impl From<Vec<String>> for Query {
    fn from(items: Vec<String>) -> Self {
        Query::List(items)
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Query::Text(text) => write!(f, "{:?}", text),
            Query::List(items) => write!(f, "{:?}", items),
            Query::Fields(fields) => {
                write!(f, "{{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {:?}", key, value.values())?;
                }
                write!(f, "}}")
            }
        }
    }
}
