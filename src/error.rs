// Copyright 2025 Lars Brubaker
// License: MIT
//
// Errors for configuration that cannot be repaired.
//
// Degenerate geometry (collinear tests, zero-length edges, a boundary that
// misses the origin) is never an error: it is logged and resolved to a
// best-effort value where it happens. Only inputs that make a computation
// meaningless end up here.

use thiserror::Error;

/// Invalid input detected before any geometry is computed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SweepError {
    /// A coordinate or radius is NaN or infinite.
    #[error("non-finite {what}: {value}")]
    NonFinite {
        /// Which input was rejected.
        what: &'static str,
        /// The offending value.
        value: f64,
    },

    /// Sector angles must lie in (0, 360] degrees.
    #[error("sector angle must be in (0, 360] degrees, got {0}")]
    InvalidAngle(f64),

    /// A circle needs at least three points to approximate it.
    #[error("circle density must be at least 3 points, got {0}")]
    InvalidDensity(usize),

    /// Flat coordinate arrays must hold (x, y) pairs.
    #[error("flat coordinate array has odd length {0}")]
    OddCoordinateCount(usize),

    /// A projection could not be built for the given light.
    #[error("cannot build light projection: {0}")]
    Projection(String),
}

/// Result alias for fallible kernel setup.
pub type SweepResult<T> = Result<T, SweepError>;

/// Reject NaN and infinities with a labelled error.
pub(crate) fn ensure_finite(what: &'static str, value: f64) -> SweepResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SweepError::NonFinite { what, value })
    }
}
