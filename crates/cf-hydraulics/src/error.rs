//! Error types for the linearization core.

use cf_core::error::CfError;
use thiserror::Error;

/// Errors raised while deriving linearization coefficients.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HydraulicsError {
    /// An input lies outside the mathematical domain of a formula.
    #[error("Domain error: {quantity} = {value}")]
    Domain { quantity: &'static str, value: f64 },

    /// A formula hit one of its singular points (critical flow, zero damping, ...).
    #[error("Singular point: {what}")]
    Singular { what: &'static str },

    #[error("Non-finite value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type HydraulicsResult<T> = Result<T, HydraulicsError>;

impl From<CfError> for HydraulicsError {
    fn from(e: CfError) -> Self {
        match e {
            CfError::NonFinite { what, value } => HydraulicsError::NonFinite { what, value },
        }
    }
}
