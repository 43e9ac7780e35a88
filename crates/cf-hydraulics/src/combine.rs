//! Combination of region coefficients into whole-reach IDZ coefficients.
//!
//! Two regions in series are combined as a cascade with a reflection
//! correction. With `D = p11_d + p22_d` (downstream region):
//!
//! ```text
//! td = td_u + td_d               tu = tu_u + tu_d
//! ad = ad_d·(1 + ad_u/au_d)      au = au_u·(1 + au_d/ad_u)
//! p11 = p11_u + p12_u·p21_u/D    p12 = p12_u·p12_d/D
//! p21 = p21_u·p21_d/D            p22 = p22_d + p12_d·p21_d/D
//! ```

use crate::common::guard_nonzero;
use crate::config::SingularityPolicy;
use crate::error::HydraulicsResult;
use crate::segment::RegionCoefficients;
use cf_core::units::{Time, s};

/// Regions a reach was split into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReachRegions {
    /// `x1 = 0`: the backwater influence spans the whole reach.
    BackwaterOnly(RegionCoefficients),
    /// `x1 = L`: flat water surface, the reach is at normal depth throughout.
    UniformOnly(RegionCoefficients),
    Both {
        upstream: RegionCoefficients,
        downstream: RegionCoefficients,
    },
}

/// Whole-reach IDZ coefficients.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdzParameters {
    pub p11: f64,
    pub p12: f64,
    pub p21: f64,
    pub p22: f64,
    pub au: f64,
    pub ad: f64,
    pub tu: f64,
    pub td: f64,
    /// Normal depth of the reach
    pub yn: f64,
    /// Midpoint of the downstream region
    pub x2: f64,
}

impl IdzParameters {
    pub fn from_region(region: &RegionCoefficients, yn: f64, x2: f64) -> Self {
        Self {
            p11: region.p11,
            p12: region.p12,
            p21: region.p21,
            p22: region.p22,
            au: region.au,
            ad: region.ad,
            tu: region.tu,
            td: region.td,
            yn,
            x2,
        }
    }

    /// Region-shaped view of the coefficients.
    pub fn coefficients(&self) -> RegionCoefficients {
        RegionCoefficients {
            p11: self.p11,
            p12: self.p12,
            p21: self.p21,
            p22: self.p22,
            au: self.au,
            ad: self.ad,
            tu: self.tu,
            td: self.td,
        }
    }

    /// Mean of the two travel times, in seconds.
    ///
    /// This is the value published under the `Delay_in_hour` key.
    pub fn mean_delay(&self) -> f64 {
        (self.tu + self.td) / 2.0
    }

    pub fn delay(&self) -> Time {
        s(self.mean_delay())
    }
}

/// Cascade an upstream region into a downstream region.
///
/// # Errors
/// Under the strict policy, `Singular` when the downstream `p11 + p22`, the
/// downstream `au` or the upstream `ad` is zero.
pub fn cascade(
    upstream: &RegionCoefficients,
    downstream: &RegionCoefficients,
    policy: SingularityPolicy,
) -> HydraulicsResult<RegionCoefficients> {
    let u = upstream;
    let d = downstream;
    let den = d.p11 + d.p22;
    guard_nonzero(policy, den, "downstream p11 + p22")?;
    guard_nonzero(policy, d.au, "downstream storage area au")?;
    guard_nonzero(policy, u.ad, "upstream storage area ad")?;

    let combined = RegionCoefficients {
        td: u.td + d.td,
        tu: u.tu + d.tu,
        ad: d.ad * (1.0 + u.ad / d.au),
        au: u.au * (1.0 + d.au / u.ad),
        p11: u.p11 + (u.p12 * u.p21) / den,
        p12: (u.p12 * d.p12) / den,
        p21: (u.p21 * d.p21) / den,
        p22: d.p22 + (d.p12 * d.p21) / den,
    };
    combined.check(policy)?;
    Ok(combined)
}

/// Reduce the regions of a reach to one coefficient set, carrying `yn`, `x2`.
pub fn combine_regions(
    regions: &ReachRegions,
    yn: f64,
    x2: f64,
    policy: SingularityPolicy,
) -> HydraulicsResult<IdzParameters> {
    let region = match regions {
        ReachRegions::BackwaterOnly(d) => *d,
        ReachRegions::UniformOnly(u) => *u,
        ReachRegions::Both {
            upstream,
            downstream,
        } => cascade(upstream, downstream, policy)?,
    };
    Ok(IdzParameters::from_region(&region, yn, x2))
}
