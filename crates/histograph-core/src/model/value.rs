//! Property value model.
//!
//! Values are captured by the live graph builder into these owned, comparable
//! forms. References to other tracked objects are always resolved to their
//! [`GlobalId`], never to a live handle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

use super::global_id::GlobalId;

/// A primitive property value
///
/// Floats compare by total order (`f64::total_cmp`), so `NaN == NaN` and
/// `-0.0 != 0.0`. This keeps equality, ordering and hashing consistent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(#[serde(with = "float_bits")] f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl ScalarValue {
    fn rank(&self) -> u8 {
        match self {
            ScalarValue::Null => 0,
            ScalarValue::Bool(_) => 1,
            ScalarValue::Int(_) => 2,
            ScalarValue::Float(_) => 3,
            ScalarValue::Text(_) => 4,
            ScalarValue::Timestamp(_) => 5,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }
}

impl Ord for ScalarValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ScalarValue::Null, ScalarValue::Null) => Ordering::Equal,
            (ScalarValue::Bool(a), ScalarValue::Bool(b)) => a.cmp(b),
            (ScalarValue::Int(a), ScalarValue::Int(b)) => a.cmp(b),
            (ScalarValue::Float(a), ScalarValue::Float(b)) => a.total_cmp(b),
            (ScalarValue::Text(a), ScalarValue::Text(b)) => a.cmp(b),
            (ScalarValue::Timestamp(a), ScalarValue::Timestamp(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for ScalarValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScalarValue {}

impl Hash for ScalarValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            ScalarValue::Null => {}
            ScalarValue::Bool(b) => b.hash(state),
            ScalarValue::Int(i) => i.hash(state),
            ScalarValue::Float(f) => f.to_bits().hash(state),
            ScalarValue::Text(s) => s.hash(state),
            ScalarValue::Timestamp(t) => t.hash(state),
        }
    }
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarValue::Null => write!(f, "null"),
            ScalarValue::Bool(b) => write!(f, "{}", b),
            ScalarValue::Int(i) => write!(f, "{}", i),
            ScalarValue::Float(x) => write!(f, "{}", x),
            ScalarValue::Text(s) => write!(f, "'{}'", s),
            ScalarValue::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::Text(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        ScalarValue::Text(s)
    }
}

impl From<i64> for ScalarValue {
    fn from(i: i64) -> Self {
        ScalarValue::Int(i)
    }
}

impl From<i32> for ScalarValue {
    fn from(i: i32) -> Self {
        ScalarValue::Int(i64::from(i))
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        ScalarValue::Bool(b)
    }
}

impl From<f64> for ScalarValue {
    fn from(x: f64) -> Self {
        ScalarValue::Float(x)
    }
}

impl From<DateTime<Utc>> for ScalarValue {
    fn from(t: DateTime<Utc>) -> Self {
        ScalarValue::Timestamp(t)
    }
}

/// Member of a container value (list, array, set, map key or map value)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    Scalar(ScalarValue),
    Reference(GlobalId),
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Scalar(s) => write!(f, "{}", s),
            Element::Reference(id) => write!(f, "{}", id),
        }
    }
}

impl From<GlobalId> for Element {
    fn from(id: GlobalId) -> Self {
        Element::Reference(id)
    }
}

macro_rules! scalar_conversions {
    ($target:ident: $($source:ty),*) => {
        $(
            impl From<$source> for $target {
                fn from(value: $source) -> Self {
                    $target::Scalar(ScalarValue::from(value))
                }
            }
        )*
    };
}

scalar_conversions!(Element: &str, String, i64, i32, bool, f64, DateTime<Utc>);

impl From<ScalarValue> for Element {
    fn from(value: ScalarValue) -> Self {
        Element::Scalar(value)
    }
}

/// Value category, the closed dispatch tag of the diff engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueCategory {
    Scalar,
    Reference,
    List,
    Array,
    Set,
    Map,
}

/// The captured value of one property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyValue {
    Scalar(ScalarValue),
    /// Reference to another tracked object; `None` when unset
    Reference(Option<GlobalId>),
    /// Ordered, index-addressed collection
    List(Vec<Element>),
    /// Fixed-size, index-addressed collection
    Array(Vec<Element>),
    Set(BTreeSet<Element>),
    Map(#[serde(with = "map_entries")] BTreeMap<Element, Element>),
}

impl PropertyValue {
    pub fn category(&self) -> ValueCategory {
        match self {
            PropertyValue::Scalar(_) => ValueCategory::Scalar,
            PropertyValue::Reference(_) => ValueCategory::Reference,
            PropertyValue::List(_) => ValueCategory::List,
            PropertyValue::Array(_) => ValueCategory::Array,
            PropertyValue::Set(_) => ValueCategory::Set,
            PropertyValue::Map(_) => ValueCategory::Map,
        }
    }

    /// Global ids this value points at, in value order
    pub fn references(&self) -> Vec<&GlobalId> {
        fn element_ref(e: &Element) -> Option<&GlobalId> {
            match e {
                Element::Reference(id) => Some(id),
                Element::Scalar(_) => None,
            }
        }

        match self {
            PropertyValue::Scalar(_) => Vec::new(),
            PropertyValue::Reference(id) => id.iter().collect(),
            PropertyValue::List(items) | PropertyValue::Array(items) => {
                items.iter().filter_map(element_ref).collect()
            }
            PropertyValue::Set(items) => items.iter().filter_map(element_ref).collect(),
            PropertyValue::Map(entries) => entries
                .iter()
                .flat_map(|(k, v)| [element_ref(k), element_ref(v)])
                .flatten()
                .collect(),
        }
    }
}

scalar_conversions!(PropertyValue: &str, String, i64, i32, bool, f64, DateTime<Utc>);

impl From<ScalarValue> for PropertyValue {
    fn from(value: ScalarValue) -> Self {
        PropertyValue::Scalar(value)
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn join<'a>(items: impl Iterator<Item = &'a Element>) -> String {
            items.map(|e| e.to_string()).collect::<Vec<_>>().join(", ")
        }

        match self {
            PropertyValue::Scalar(s) => write!(f, "{}", s),
            PropertyValue::Reference(Some(id)) => write!(f, "{}", id),
            PropertyValue::Reference(None) => write!(f, "null"),
            PropertyValue::List(items) | PropertyValue::Array(items) => {
                write!(f, "[{}]", join(items.iter()))
            }
            PropertyValue::Set(items) => write!(f, "{{{}}}", join(items.iter())),
            PropertyValue::Map(entries) => {
                let rendered: Vec<String> =
                    entries.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", rendered.join(", "))
            }
        }
    }
}

/// Maps with non-string keys are encoded as a sequence of `[key, value]` pairs.
mod map_entries {
    use super::Element;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S>(map: &BTreeMap<Element, Element>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<Element, Element>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Vec::<(Element, Element)>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

/// Finite floats are plain JSON numbers. Non-finite floats have no JSON
/// number form, so they are written as their IEEE-754 bit pattern in hex
/// (`"0x7ff8000000000000"`) and restored bit for bit.
mod float_bits {
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    const PREFIX: &str = "0x";

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_str(&format!("{}{:016x}", PREFIX, value.to_bits()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(FloatVisitor)
    }

    struct FloatVisitor;

    impl<'de> Visitor<'de> for FloatVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "a float or a {}-prefixed hex bit pattern", PREFIX)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            let bits = v
                .strip_prefix(PREFIX)
                .and_then(|hex| u64::from_str_radix(hex, 16).ok())
                .ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))?;
            Ok(f64::from_bits(bits))
        }
    }
}
