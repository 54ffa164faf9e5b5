//! Unified error handling for corridor extraction.
//!
//! Clustering and fitting failures are corridor-scoped, optimization failures
//! are point-scoped, and a missing airport is fatal only for that airport.

use thiserror::Error;

use crate::ClusterLabel;

/// Errors produced by the corridor engine and its thin I/O helpers.
#[derive(Debug, Error)]
pub enum CorridorError {
    /// A track set or corridor is too small for the requested operation.
    #[error("insufficient data for {context}: {point_count} points (minimum {minimum_required})")]
    InsufficientData {
        context: String,
        point_count: usize,
        minimum_required: usize,
    },

    /// Too few usable points remain after density filtering to support the fit.
    #[error(
        "fit underdetermined for corridor {label}: {retained} usable points, {required} required"
    )]
    FitUnderdetermined {
        label: ClusterLabel,
        retained: usize,
        required: usize,
    },

    /// The bounded minimizer did not report success.
    #[error(
        "optimization did not converge after {iterations} iterations (residual {residual}, x {x})"
    )]
    OptimizationDidNotConverge {
        iterations: usize,
        residual: f64,
        x: f64,
    },

    /// The airport code is absent from the reference table.
    #[error("airport '{code}' not found in reference table")]
    ExternalLookupMissing { code: String },

    /// A tunable is non-finite or out of range.
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CorridorError>;

/// Convenience conversions from `Option` into corridor errors.
pub trait OptionExt<T> {
    fn ok_or_insufficient_data(
        self,
        context: &str,
        point_count: usize,
        minimum_required: usize,
    ) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_insufficient_data(
        self,
        context: &str,
        point_count: usize,
        minimum_required: usize,
    ) -> Result<T> {
        self.ok_or_else(|| CorridorError::InsufficientData {
            context: context.to_string(),
            point_count,
            minimum_required,
        })
    }
}

/// Reject non-finite or non-positive tunables.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CorridorError::InvalidParameter { name, value })
    }
}
