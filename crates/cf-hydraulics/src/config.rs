//! Tunables for the linearization algorithms.

use cf_core::units::constants::{G_IDZ_MPS2, G0_MPS2};

/// Fixed iteration count of the normal-depth bisection.
///
/// Calibrated models depend on the exact midpoint this produces; changing it
/// changes every downstream coefficient.
pub const NORMAL_DEPTH_ITERATIONS: usize = 25;

/// Bed-slope floor substituted for flat or adverse reaches.
pub const DEFAULT_MIN_BED_SLOPE: f64 = 1e-6;

/// What to do when a formula reaches one of its singular points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SingularityPolicy {
    /// Raise [`HydraulicsError::Singular`](crate::HydraulicsError::Singular) at
    /// critical flow, still water, zero damping or zero combiner denominators,
    /// and reject non-finite results.
    #[default]
    Strict,
    /// Evaluate the raw formulas and return whatever IEEE values fall out.
    /// Meant for regression runs against reference coefficient tables.
    Permissive,
}

impl SingularityPolicy {
    pub fn is_strict(self) -> bool {
        matches!(self, SingularityPolicy::Strict)
    }
}

/// Configuration of the IDZ derivation chain.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinearizationConfig {
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
    /// Bed slopes at or below this value are replaced by it
    pub min_bed_slope: f64,
    /// Bisection steps of the normal-depth solver
    pub normal_depth_iterations: usize,
    pub singularity_policy: SingularityPolicy,
}

impl Default for LinearizationConfig {
    fn default() -> Self {
        Self {
            gravity: G_IDZ_MPS2,
            min_bed_slope: DEFAULT_MIN_BED_SLOPE,
            normal_depth_iterations: NORMAL_DEPTH_ITERATIONS,
            singularity_policy: SingularityPolicy::Strict,
        }
    }
}

impl LinearizationConfig {
    /// Same configuration with the raw, unguarded formulas.
    pub fn permissive() -> Self {
        Self {
            singularity_policy: SingularityPolicy::Permissive,
            ..Self::default()
        }
    }
}

/// Configuration of the node-grid (LinearSV) linearization.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridConfig {
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
    pub singularity_policy: SingularityPolicy,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            gravity: G0_MPS2,
            singularity_policy: SingularityPolicy::Strict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_component_gravity() {
        assert_eq!(LinearizationConfig::default().gravity, 9.81);
        assert_eq!(GridConfig::default().gravity, 9.806_65);
    }

    #[test]
    fn default_bisection_is_fixed_25() {
        assert_eq!(LinearizationConfig::default().normal_depth_iterations, 25);
    }

    #[test]
    fn permissive_only_changes_policy() {
        let p = LinearizationConfig::permissive();
        assert!(!p.singularity_policy.is_strict());
        assert_eq!(p.gravity, LinearizationConfig::default().gravity);
        assert_eq!(p.min_bed_slope, DEFAULT_MIN_BED_SLOPE);
    }
}
