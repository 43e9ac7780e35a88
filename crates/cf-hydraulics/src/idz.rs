//! Integrator-Delay-Zero coefficients of a channel reach.
//!
//! Pipeline: normal depth → backwater split → one linearization per region
//! present → cascade into whole-reach coefficients.

use crate::backwater::{BackwaterInput, BackwaterSplit, split_reach};
use crate::combine::{IdzParameters, ReachRegions, combine_regions};
use crate::config::LinearizationConfig;
use crate::error::{HydraulicsError, HydraulicsResult};
use crate::section::CrossSection;
use crate::segment::{SegmentInput, linearize_segment};
use cf_core::units::{Discharge, Length};

/// One reach with its nominal operating point.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelReach {
    pub length: Length,
    pub bed_level_up: Length,
    pub bed_level_down: Length,
    pub discharge: Discharge,
    /// Manning coefficient
    pub friction_coefficient: f64,
    pub section: CrossSection,
    /// Nominal depth at the downstream end
    pub reference_depth: Length,
}

impl ChannelReach {
    pub fn validate(&self) -> HydraulicsResult<()> {
        let l = self.length.value;
        if !l.is_finite() || l <= 0.0 {
            return Err(HydraulicsError::InvalidArg {
                what: "reach length must be positive",
            });
        }
        if !self.friction_coefficient.is_finite() || self.friction_coefficient <= 0.0 {
            return Err(HydraulicsError::InvalidArg {
                what: "friction coefficient must be positive",
            });
        }
        if !self.reference_depth.value.is_finite() || self.reference_depth.value <= 0.0 {
            return Err(HydraulicsError::InvalidArg {
                what: "reference depth must be positive",
            });
        }
        if !self.discharge.value.is_finite() {
            return Err(HydraulicsError::InvalidArg {
                what: "discharge must be finite",
            });
        }
        self.section.validate()
    }

    /// Bed slope as given by the bed levels.
    pub fn raw_bed_slope(&self) -> f64 {
        (self.bed_level_up.value - self.bed_level_down.value) / self.length.value
    }

    /// Bed slope with `min_bed_slope` substituted for flat or adverse beds.
    pub fn bed_slope(&self, min_bed_slope: f64) -> f64 {
        let sb = self.raw_bed_slope();
        if sb <= min_bed_slope { min_bed_slope } else { sb }
    }
}

/// Backwater split of `reach` under `config`.
pub fn backwater_split(
    reach: &ChannelReach,
    config: &LinearizationConfig,
) -> HydraulicsResult<BackwaterSplit> {
    reach.validate()?;
    split_reach(&BackwaterInput {
        section: &reach.section,
        discharge: reach.discharge.value,
        friction_coefficient: reach.friction_coefficient,
        bed_slope: reach.bed_slope(config.min_bed_slope),
        reference_depth: reach.reference_depth.value,
        length: reach.length.value,
        gravity: config.gravity,
        normal_depth_iterations: config.normal_depth_iterations,
        policy: config.singularity_policy,
    })
}

/// Linearize each region of the split.
pub fn reach_regions(
    reach: &ChannelReach,
    split: &BackwaterSplit,
    config: &LinearizationConfig,
) -> HydraulicsResult<ReachRegions> {
    let l = reach.length.value;
    let q = reach.discharge.value;
    let sb = reach.bed_slope(config.min_bed_slope);
    let g = config.gravity;
    let policy = config.singularity_policy;

    let upstream = match split.y1 {
        Some(y1) if split.x1 > 0.0 => Some(linearize_segment(
            &reach.section,
            &SegmentInput {
                depth: y1,
                discharge: q,
                bed_slope: sb,
                surface_slope: 0.0,
                length: split.x1,
            },
            g,
            policy,
        )?),
        _ => None,
    };

    let downstream = if split.x1 < l {
        Some(linearize_segment(
            &reach.section,
            &SegmentInput {
                depth: split.y2,
                discharge: q,
                bed_slope: sb,
                surface_slope: split.surface_slope,
                length: l - split.x1,
            },
            g,
            policy,
        )?)
    } else {
        None
    };

    match (upstream, downstream) {
        (Some(upstream), Some(downstream)) => Ok(ReachRegions::Both {
            upstream,
            downstream,
        }),
        (None, Some(downstream)) => Ok(ReachRegions::BackwaterOnly(downstream)),
        (Some(upstream), None) => Ok(ReachRegions::UniformOnly(upstream)),
        (None, None) => Err(HydraulicsError::InvalidArg {
            what: "reach split produced no region",
        }),
    }
}

/// IDZ coefficients of `reach`.
pub fn derive_idz(
    reach: &ChannelReach,
    config: &LinearizationConfig,
) -> HydraulicsResult<IdzParameters> {
    let split = backwater_split(reach, config)?;
    let regions = reach_regions(reach, &split, config)?;
    combine_regions(&regions, split.yn, split.x2, config.singularity_policy)
}
