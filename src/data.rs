//! Data fields attached to mesh elements, and the attribute values
//! carried alongside them.
//!
//! A [`DataField`] holds a named array of values defined on exactly one
//! element class (node, edge, or face) together with the free-form
//! attributes (units, provenance, ...) that travel with it through the
//! file format.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Mesh element class a data field is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Location {
    Node,
    Edge,
    Face,
}

impl Location {
    /// The UGRID string form of this location ("node", "edge", "face").
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Location::Node => "node",
            Location::Edge => "edge",
            Location::Face => "face",
        }
    }

    /// Parse the UGRID string form; anything else is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "node" => Some(Location::Node),
            "edge" => Some(Location::Edge),
            "face" => Some(Location::Face),
            _ => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute value carried between a dataset variable and the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Text(String),
    Int(i64),
    Float(f64),
}

impl AttrValue {
    /// Text payload, if this is a text attribute.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer payload, coercing integral floats and numeric text.
    ///
    /// File conventions are loose about attribute types (a
    /// `topology_dimension` of `2`, `2.0`, or `"2"` all occur in the
    /// wild), so lookups that need an integer coerce here.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            AttrValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            AttrValue::Float(_) => None,
            AttrValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Int(i)
    }
}

impl From<f64> for AttrValue {
    fn from(f: f64) -> Self {
        AttrValue::Float(f)
    }
}

/// Attribute map keyed by attribute name, iterated deterministically.
pub type Attributes = BTreeMap<String, AttrValue>;

/// A named array of values attached to one class of mesh element.
///
/// The owning [`Mesh`](crate::mesh::Mesh) enforces that `values.len()`
/// matches the element count of `location` when the field is added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataField {
    /// Field name; the key in the mesh's field collection.
    pub name: String,
    /// Element class the values are defined on.
    pub location: Location,
    /// One value per element of `location`.
    pub values: Vec<f64>,
    /// Attributes carried through from (and back to) the file.
    pub attributes: Attributes,
}

impl DataField {
    /// Create a field with no attributes.
    pub fn new(name: impl Into<String>, location: Location, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            location,
            values,
            attributes: Attributes::new(),
        }
    }

    /// Attach an attribute map, replacing any present.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Attach a single attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_string_round_trip() {
        for loc in [Location::Node, Location::Edge, Location::Face] {
            assert_eq!(Location::parse(loc.as_str()), Some(loc));
        }
        assert_eq!(Location::parse("volume"), None);
    }

    #[test]
    fn attr_int_coercion() {
        assert_eq!(AttrValue::Int(2).as_int(), Some(2));
        assert_eq!(AttrValue::Float(2.0).as_int(), Some(2));
        assert_eq!(AttrValue::Float(2.5).as_int(), None);
        assert_eq!(AttrValue::Text(" 2 ".into()).as_int(), Some(2));
        assert_eq!(AttrValue::Text("two".into()).as_int(), None);
    }
}
