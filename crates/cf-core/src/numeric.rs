use crate::{CfError, CfResult};

/// Floating point type used throughout the workspace
pub type Real = f64;

/// Absolute/relative tolerance pair used for singularity and equality checks.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

/// True when `v` is within the absolute tolerance of zero.
pub fn nearly_zero(v: Real, tol: Tolerances) -> bool {
    v.abs() <= tol.abs
}

pub fn ensure_finite(v: Real, what: &'static str) -> CfResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CfError::NonFinite { what, value: v })
    }
}

/// `n` evenly spaced values from `start` to `end`, both ends included.
///
/// Matches the usual `linspace` contract: `n == 1` yields `[start]`, `n == 0`
/// yields an empty vector.
pub fn linspace(start: Real, end: Real, n: usize) -> Vec<Real> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as Real;
            (0..n)
                .map(|i| {
                    if i == n - 1 {
                        end
                    } else {
                        start + step * i as Real
                    }
                })
                .collect()
        }
    }
}
