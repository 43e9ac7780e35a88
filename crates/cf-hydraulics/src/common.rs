//! Common checks shared by the linearization modules.

use crate::config::SingularityPolicy;
use crate::error::{HydraulicsError, HydraulicsResult};
use cf_core::numeric::{Tolerances, ensure_finite, nearly_equal, nearly_zero};

/// Ensure a value is finite, returning a `NonFinite` error if not.
pub fn check_finite(value: f64, what: &'static str) -> HydraulicsResult<f64> {
    Ok(ensure_finite(value, what)?)
}

/// Under the strict policy, fail with `Singular` when `value` is (nearly) zero.
pub fn guard_nonzero(
    policy: SingularityPolicy,
    value: f64,
    what: &'static str,
) -> HydraulicsResult<()> {
    if policy.is_strict() && (value == 0.0 || nearly_zero(value, Tolerances::default())) {
        return Err(HydraulicsError::Singular { what });
    }
    Ok(())
}

/// Under the strict policy, fail with `Singular` when the Froude number is
/// critical (1) or zero.
pub fn guard_froude(policy: SingularityPolicy, fr: f64) -> HydraulicsResult<()> {
    if !policy.is_strict() {
        return Ok(());
    }
    if nearly_zero(fr, Tolerances::default()) {
        return Err(HydraulicsError::Singular {
            what: "Froude number is zero (still water)",
        });
    }
    if nearly_equal(fr.abs(), 1.0, Tolerances::default()) {
        return Err(HydraulicsError::Singular {
            what: "critical flow (Froude number = 1)",
        });
    }
    Ok(())
}

/// Under the strict policy, every named output must be finite.
pub fn check_outputs(
    policy: SingularityPolicy,
    values: &[(&'static str, f64)],
) -> HydraulicsResult<()> {
    if policy.is_strict() {
        for &(what, value) in values {
            check_finite(value, what)?;
        }
    }
    Ok(())
}
