//! Error types for canvas operations.

use crate::elements::ElementId;
use thiserror::Error;

/// Errors raised by element store and canvas operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CanvasError {
    /// The referenced element is not (or no longer) in the store.
    #[error("element not found: {0}")]
    NotFound(ElementId),
    /// A create/update would leave an element with a non-positive size.
    #[error("invalid element size {width}x{height}")]
    InvalidGeometry { width: f64, height: f64 },
}

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;
