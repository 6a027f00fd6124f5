//! Dataset boundary for UGRID marshalling.
//!
//! The core never performs byte-level I/O itself: everything it needs
//! from a netCDF-style dataset is expressed through the [`Dataset`]
//! trait — named-variable read and write plus dimension declaration.
//! A concrete backend (a netCDF binding, an OPeNDAP client, ...) sits
//! behind this trait; [`memory::MemoryDataset`] is the in-memory
//! implementation used by tests and staging.

pub mod memory;
pub mod ugrid;

use crate::data::{AttrValue, Attributes};
use crate::mesh_error::UgridError;
use serde::{Deserialize, Serialize};

/// Typed array payload of a dataset variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Array {
    /// 1-D float data: coordinates and attached fields.
    Float(Vec<f64>),
    /// 2-D integer data, row-major: connectivity.
    Int2 {
        /// (rows, columns).
        shape: [usize; 2],
        values: Vec<i64>,
    },
    /// Zero-sized payload for marker variables.
    Empty,
}

impl Default for Array {
    fn default() -> Self {
        Array::Empty
    }
}

impl Array {
    /// A 2-D integer array from row-major values.
    pub fn int2(shape: [usize; 2], values: Vec<i64>) -> Self {
        debug_assert_eq!(shape[0] * shape[1], values.len());
        Array::Int2 { shape, values }
    }

    /// The float payload, if this is a 1-D float array.
    pub fn as_float(&self) -> Option<&[f64]> {
        match self {
            Array::Float(values) => Some(values),
            _ => None,
        }
    }

    /// Shape and row-major values, if this is a 2-D integer array.
    pub fn as_int2(&self) -> Option<([usize; 2], &[i64])> {
        match self {
            Array::Int2 { shape, values } => Some((*shape, values)),
            _ => None,
        }
    }
}

/// A named dataset variable: array payload, attributes, dimensions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// The array payload.
    pub data: Array,
    /// Attribute map (what netCDF calls variable attributes).
    pub attributes: Attributes,
    /// Names of the dimensions this variable is laid out over.
    pub dimensions: Vec<String>,
}

impl Variable {
    /// A variable with no attributes or dimensions.
    pub fn new(data: Array) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Attach an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Attach dimension names.
    pub fn with_dimensions(mut self, dimensions: &[&str]) -> Self {
        self.dimensions = dimensions.iter().map(|d| d.to_string()).collect();
        self
    }

    /// Look up an attribute by name.
    #[inline]
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Text attribute value, if present and textual.
    #[inline]
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(AttrValue::as_str)
    }

    /// Integer attribute value, with the coercions of [`AttrValue::as_int`].
    #[inline]
    pub fn attr_int(&self, name: &str) -> Option<i64> {
        self.attr(name).and_then(AttrValue::as_int)
    }
}

/// Named-variable access to an open dataset.
///
/// All calls are synchronous and blocking; failures from the backend
/// are propagated unmodified as [`UgridError::Io`] — the core performs
/// no retries.
pub trait Dataset {
    /// Variable names, in dataset order.
    fn variable_names(&self) -> Vec<String>;

    /// Look up a variable by name.
    fn variable(&self, name: &str) -> Option<&Variable>;

    /// Declare a dimension.
    ///
    /// # Errors
    /// [`UgridError::DimensionMismatch`] if `name` was already declared
    /// with a different length.
    fn add_dimension(&mut self, name: &str, len: usize) -> Result<(), UgridError>;

    /// Write (or replace) a named variable.
    fn put_variable(&mut self, name: &str, variable: Variable) -> Result<(), UgridError>;
}
