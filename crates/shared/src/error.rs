use std::fmt;

use thiserror::Error;

use crate::domain::RequiredField;

/// A submission was attempted with required fields left blank.
///
/// Raised locally before any request is built; it never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    pub missing: Vec<RequiredField>,
}

impl ValidationError {
    pub fn new(missing: Vec<RequiredField>) -> Self {
        Self { missing }
    }

    pub fn is_missing(&self, field: RequiredField) -> bool {
        self.missing.contains(&field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = self
            .missing
            .iter()
            .map(|field| field.label())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "Please fill in the required fields: {labels}")
    }
}
