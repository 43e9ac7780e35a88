//! Backwater split of a reach into a near-uniform upstream region and a
//! backwater-influenced downstream region.
//!
//! The water surface near the downstream control is approximated by a
//! straight line with the gradually-varied-flow slope evaluated at the
//! reference depth:
//!
//! ```text
//! sxx = (sb - Sf(y_ref)) / (1 - Fr(y_ref)²)
//! ```
//!
//! Upstream of `x1` the profile is taken to have converged to normal depth.

use crate::common::{check_outputs, guard_nonzero};
use crate::config::SingularityPolicy;
use crate::error::HydraulicsResult;
use crate::friction::{friction_slope, froude_number};
use crate::normal_depth::normal_depth;
use crate::section::CrossSection;

/// Reach-level inputs of the split.
#[derive(Clone, Copy, Debug)]
pub struct BackwaterInput<'a> {
    pub section: &'a CrossSection,
    pub discharge: f64,
    pub friction_coefficient: f64,
    pub bed_slope: f64,
    /// Depth at the downstream end
    pub reference_depth: f64,
    pub length: f64,
    pub gravity: f64,
    pub normal_depth_iterations: usize,
    pub policy: SingularityPolicy,
}

/// Where the reach splits and which depths represent each region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackwaterSplit {
    /// Transition point measured from the upstream end, `0 ≤ x1 ≤ L`
    pub x1: f64,
    /// Midpoint of the downstream region
    pub x2: f64,
    /// Representative depth of the upstream region; `None` when `x1 == 0`
    pub y1: Option<f64>,
    /// Representative depth of the downstream region
    pub y2: f64,
    pub yn: f64,
    /// Linearized water-surface slope relative to the bed
    pub surface_slope: f64,
}

impl BackwaterSplit {
    /// The whole reach is backwater-dominated.
    pub fn backwater_only(&self) -> bool {
        self.x1 == 0.0
    }
}

/// Locate the transition point, given the reach length `l`, the downstream
/// depth, the normal depth and the surface slope.
///
/// A zero slope never reaches normal depth, so the whole reach counts as
/// uniform (`x1 = l`).
pub fn transition_point(l: f64, reference_depth: f64, yn: f64, sxx: f64) -> f64 {
    if sxx == 0.0 {
        return l;
    }
    (l - (reference_depth - yn) / sxx).clamp(0.0, l)
}

pub fn split_reach(input: &BackwaterInput<'_>) -> HydraulicsResult<BackwaterSplit> {
    let q = input.discharge;
    let n = input.friction_coefficient;
    let sb = input.bed_slope;
    let yx = input.reference_depth;
    let l = input.length;

    let yn = normal_depth(
        input.section,
        q,
        n,
        sb,
        yx,
        input.normal_depth_iterations,
    )?;

    let sf_ref = friction_slope(input.section, yx, q, n)?;
    let fr_ref = froude_number(input.section, yx, q, input.gravity)?;
    let critical = 1.0 - fr_ref * fr_ref;
    guard_nonzero(
        input.policy,
        critical,
        "critical flow at the downstream reference depth",
    )?;
    let sxx = (sb - sf_ref) / critical;
    check_outputs(input.policy, &[("backwater surface slope", sxx)])?;

    let x1 = transition_point(l, yx, yn, sxx);

    let split = if x1 == 0.0 {
        let x2 = l / 2.0;
        BackwaterSplit {
            x1,
            x2,
            y1: None,
            y2: yx - sxx * (l - x2),
            yn,
            surface_slope: sxx,
        }
    } else {
        let x2 = (l + x1) / 2.0;
        BackwaterSplit {
            x1,
            x2,
            y1: Some(yn),
            y2: yn + (x2 - x1) * sxx,
            yn,
            surface_slope: sxx,
        }
    };
    Ok(split)
}
