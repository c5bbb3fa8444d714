//! Error types for coordinate parsing.

use thiserror::Error;

/// Errors produced while reading a homogeneous coordinate string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// The string was empty or only whitespace.
    #[error("coordinate string is empty")]
    Empty,

    /// The number of `:`-separated components is not accepted for the point kind.
    #[error("expected {expected} components, found {found}")]
    ComponentCount {
        /// Human-readable description of the accepted counts.
        expected: &'static str,
        /// Number of components actually present.
        found: usize,
    },

    /// A component is not a floating-point number.
    #[error("component {index} is not a number: {text:?}")]
    NotANumber {
        /// Zero-based component index.
        index: usize,
        /// The offending text.
        text: String,
    },
}

/// Result type for coordinate operations.
pub type Result<T> = std::result::Result<T, CoordError>;
