// ABOUTME: Tagged tree model for JSON-like case data with object, array and scalar cases.
// ABOUTME: Converts to and from serde_json::Value and keeps object keys in insertion order.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// A leaf value in a [`Tree`].
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

/// A JSON-like tree. Objects are ordered key/value lists with unique keys.
#[derive(Debug, Clone, PartialEq)]
pub enum Tree {
    Object(Vec<(String, Tree)>),
    Array(Vec<Tree>),
    Scalar(Scalar),
}

impl Tree {
    /// Creates a string scalar.
    pub fn string(s: impl Into<String>) -> Self {
        Tree::Scalar(Scalar::String(s.into()))
    }

    /// Creates an empty object.
    pub fn object() -> Self {
        Tree::Object(Vec::new())
    }

    /// Returns the string value if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tree::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Looks up a key if this is an object.
    pub fn get(&self, key: &str) -> Option<&Tree> {
        match self {
            Tree::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Returns the elements if this is an array.
    pub fn as_array(&self) -> Option<&[Tree]> {
        match self {
            Tree::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Inserts an entry into an object. An existing key keeps its position and takes the new value.
    /// Has no effect on arrays and scalars.
    pub fn insert(&mut self, key: impl Into<String>, value: Tree) {
        if let Tree::Object(entries) = self {
            insert_entry(entries, key.into(), value);
        }
    }
}

/// Inserts into an ordered entry list, replacing the value of a duplicate key in place.
pub(crate) fn insert_entry(entries: &mut Vec<(String, Tree)>, key: String, value: Tree) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = value,
        None => entries.push((key, value)),
    }
}

impl From<Value> for Tree {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Tree::Scalar(Scalar::Null),
            Value::Bool(b) => Tree::Scalar(Scalar::Bool(b)),
            Value::Number(n) => Tree::Scalar(Scalar::Number(n)),
            Value::String(s) => Tree::Scalar(Scalar::String(s)),
            Value::Array(items) => Tree::Array(items.into_iter().map(Tree::from).collect()),
            Value::Object(map) => {
                Tree::Object(map.into_iter().map(|(k, v)| (k, Tree::from(v))).collect())
            }
        }
    }
}

impl From<Tree> for Value {
    fn from(tree: Tree) -> Self {
        match tree {
            Tree::Scalar(Scalar::Null) => Value::Null,
            Tree::Scalar(Scalar::Bool(b)) => Value::Bool(b),
            Tree::Scalar(Scalar::Number(n)) => Value::Number(n),
            Tree::Scalar(Scalar::String(s)) => Value::String(s),
            Tree::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Tree::Object(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (k, v) in entries {
                    map.insert(k, Value::from(v));
                }
                Value::Object(map)
            }
        }
    }
}

impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Tree::Scalar(Scalar::Null) => serializer.serialize_unit(),
            Tree::Scalar(Scalar::Bool(b)) => serializer.serialize_bool(*b),
            Tree::Scalar(Scalar::Number(n)) => n.serialize(serializer),
            Tree::Scalar(Scalar::String(s)) => serializer.serialize_str(s),
            Tree::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Tree::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Tree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Tree::from)
    }
}
