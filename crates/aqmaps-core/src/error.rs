//! Error types for the planning core.

use thiserror::Error;

/// Errors raised while building planner inputs.
///
/// Geometric degeneracies during planning are never errors; they are handled
/// by explicit branches in the spatial kernel and the avoidance fallbacks.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("invalid heading {0}: must be a multiple of 10 in [0, 350]")]
    InvalidHeading(i32),

    #[error("invalid polygon for building {building}: {reason}")]
    InvalidPolygon { building: usize, reason: String },

    #[error("invalid coordinate ({lon}, {lat}): values must be finite")]
    InvalidCoordinate { lon: f64, lat: f64 },

    #[error("invalid flight rules: {0}")]
    InvalidRules(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
