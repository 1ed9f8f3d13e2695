//! Fully-qualified ids.
//!
//! The new data model references objects across collections with strings of
//! the form `"<collection>/<id>"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A reference to one object of one collection, e.g. `motion/4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fqid {
    pub collection: String,
    pub id: i64,
}

/// Returned when a string is not of the form `"<collection>/<id>"`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid fqid: {0}")]
pub struct FqidParseError(pub String);

impl Fqid {
    pub fn new(collection: impl Into<String>, id: i64) -> Self {
        Self {
            collection: collection.into(),
            id,
        }
    }
}

impl fmt::Display for Fqid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

impl FromStr for Fqid {
    type Err = FqidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (collection, id) = s
            .split_once('/')
            .ok_or_else(|| FqidParseError(s.to_string()))?;
        if collection.is_empty() || collection.contains('/') {
            return Err(FqidParseError(s.to_string()));
        }
        let id = id.parse().map_err(|_| FqidParseError(s.to_string()))?;
        Ok(Self::new(collection, id))
    }
}

impl From<Fqid> for serde_json::Value {
    fn from(fqid: Fqid) -> Self {
        serde_json::Value::String(fqid.to_string())
    }
}

impl Serialize for Fqid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fqid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
