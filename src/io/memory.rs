//! In-memory [`Dataset`] backend.
//!
//! Used by tests to stand in for a file-backed dataset, and as the
//! staging target for [`UgridWriter`](crate::io::ugrid::UgridWriter).
//! Variable insertion order is preserved so resolution and iteration
//! behave like a real dataset.

use super::{Dataset, Variable};
use crate::mesh_error::UgridError;
use std::collections::BTreeMap;

/// A dataset held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDataset {
    variables: BTreeMap<String, Variable>,
    /// Insertion order of variable names.
    order: Vec<String>,
    dimensions: BTreeMap<String, usize>,
}

impl MemoryDataset {
    /// An empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declared length of a dimension, if any.
    pub fn dimension(&self, name: &str) -> Option<usize> {
        self.dimensions.get(name).copied()
    }
}

impl Dataset for MemoryDataset {
    fn variable_names(&self) -> Vec<String> {
        self.order.clone()
    }

    fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    fn add_dimension(&mut self, name: &str, len: usize) -> Result<(), UgridError> {
        if let Some(&existing) = self.dimensions.get(name) {
            if existing != len {
                return Err(UgridError::DimensionMismatch {
                    name: name.to_string(),
                    existing,
                    requested: len,
                });
            }
            return Ok(());
        }
        self.dimensions.insert(name.to_string(), len);
        Ok(())
    }

    fn put_variable(&mut self, name: &str, variable: Variable) -> Result<(), UgridError> {
        if !self.variables.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.variables.insert(name.to_string(), variable);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::Array;

    #[test]
    fn preserves_insertion_order() {
        let mut ds = MemoryDataset::new();
        ds.put_variable("zeta", Variable::new(Array::Empty)).unwrap();
        ds.put_variable("alpha", Variable::new(Array::Empty)).unwrap();
        assert_eq!(ds.variable_names(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn dimension_redeclaration_must_agree() {
        let mut ds = MemoryDataset::new();
        ds.add_dimension("num_nodes", 4).unwrap();
        ds.add_dimension("num_nodes", 4).unwrap();
        let err = ds.add_dimension("num_nodes", 5).unwrap_err();
        assert!(matches!(
            err,
            UgridError::DimensionMismatch {
                existing: 4,
                requested: 5,
                ..
            }
        ));
    }
}
