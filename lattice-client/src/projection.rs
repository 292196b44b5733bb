//! Projection capability: raw wire entity -> client entity.

use crate::context::ClientContext;
use lattice_core::{BoxError, EntityKind};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Implemented by every client entity kind.
///
/// `project` runs synchronously on a runtime worker right after the fetch
/// completes; it builds the entity's references but resolves none of them.
pub trait Projectable: Clone + Send + Sync + 'static {
    /// Wire representation decoded from the fetched JSON.
    type Raw: DeserializeOwned + Send + 'static;

    const KIND: EntityKind;

    fn project(ctx: &ClientContext, raw: Self::Raw) -> Result<Self, BoxError>;
}

/// Raw values a projection refuses to turn into an entity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: i32 },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}

/// Reject negative values of `field`.
pub(crate) fn non_negative(field: &'static str, value: i32) -> Result<i32, ProjectionError> {
    if value < 0 {
        Err(ProjectionError::Negative { field, value })
    } else {
        Ok(value)
    }
}

/// Reject empty strings in `field`.
pub(crate) fn non_empty(field: &'static str, value: String) -> Result<String, ProjectionError> {
    if value.trim().is_empty() {
        Err(ProjectionError::Empty { field })
    } else {
        Ok(value)
    }
}
