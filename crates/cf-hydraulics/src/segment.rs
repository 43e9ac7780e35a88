//! Linearized Saint-Venant coefficients of one reach region.
//!
//! A region is represented by a single depth. Around that depth the
//! linearized Saint-Venant transfer function gives two asymptotes:
//!
//! - low frequency: travel times of the downstream/upstream waves (`td`,
//!   `tu`) and the storage (wedge) areas `ad`, `au` of the integrator terms;
//! - high frequency: the transfer-matrix gains `p11 … p22` at infinite
//!   frequency.
//!
//! Shape factors:
//!
//! ```text
//! kappa = 7/3 - 4A/(3·W·P) · 2·√(1+m²)
//! alpha = W/(A·F·(1-F²)) · ((2+(kappa-1)F²)·sb - (2+(kappa-1)F² - (A/T²·dT/dy + kappa-2)·F⁴)·sx)
//! gamma = V²·dT/dy·sx + g·W·((1+kappa)·sb - (1+kappa - F²(kappa-2))·sx)
//! ```
//!
//! `W` is the shape's width term (see [`SectionProperties::width_term`]).
//! The storage areas use the gravity part of `gamma` only; the convective
//! `V²·dT/dy·sx` part enters the transfer envelope of `p12`/`p21`.

use crate::common::{check_outputs, guard_froude, guard_nonzero};
use crate::config::SingularityPolicy;
use crate::error::HydraulicsResult;
use crate::section::{CrossSection, SectionProperties, velocity};

/// Local state a region is linearized around.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentInput {
    /// Representative depth
    pub depth: f64,
    pub discharge: f64,
    pub bed_slope: f64,
    /// Water-surface slope relative to the bed; zero at normal depth
    pub surface_slope: f64,
    /// Distance spanned by the region
    pub length: f64,
}

/// Coefficients of one region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionCoefficients {
    pub p11: f64,
    pub p12: f64,
    pub p21: f64,
    pub p22: f64,
    /// Upstream storage area
    pub au: f64,
    /// Downstream storage area
    pub ad: f64,
    /// Upstream-propagating travel time (s)
    pub tu: f64,
    /// Downstream-propagating travel time (s)
    pub td: f64,
}

impl RegionCoefficients {
    fn named(&self) -> [(&'static str, f64); 8] {
        [
            ("p11", self.p11),
            ("p12", self.p12),
            ("p21", self.p21),
            ("p22", self.p22),
            ("au", self.au),
            ("ad", self.ad),
            ("tu", self.tu),
            ("td", self.td),
        ]
    }

    pub(crate) fn check(&self, policy: SingularityPolicy) -> HydraulicsResult<()> {
        check_outputs(policy, &self.named())
    }
}

/// Dimensionless shape factor `kappa`.
pub fn kappa(props: &SectionProperties, wall_factor: f64) -> f64 {
    7.0 / 3.0 - 4.0 * props.area / (3.0 * props.width_term * props.perimeter) * 2.0 * wall_factor
}

/// Linearize one region of `section` around `input`.
///
/// # Errors
/// Geometry errors propagate. Under [`SingularityPolicy::Strict`] also
/// `Singular` at still water, critical flow or vanishing damping, and
/// `NonFinite` for overflowing results.
pub fn linearize_segment(
    section: &CrossSection,
    input: &SegmentInput,
    g: f64,
    policy: SingularityPolicy,
) -> HydraulicsResult<RegionCoefficients> {
    let props = section.properties(input.depth)?;
    let sb = input.bed_slope;
    let sx = input.surface_slope;
    let x = input.length;

    let a = props.area;
    let t = props.top_width;
    let w = props.width_term;
    let c = props.celerity(g);
    let v = velocity(input.discharge, a)?;
    let fr = v / c;
    guard_froude(policy, fr)?;

    let fr2 = fr * fr;
    let kappa = kappa(&props, section.wall_factor());
    let shape = 2.0 + (kappa - 1.0) * fr2;

    let backwater_alpha = if sx == 0.0 {
        0.0
    } else {
        (shape - (a / (t * t) * props.top_width_slope + kappa - 2.0) * fr2 * fr2) * sx
    };
    let alpha = w / (a * fr * (1.0 - fr2)) * (shape * sb - backwater_alpha);

    let gamma_storage = g * w * ((1.0 + kappa) * sb - (1.0 + kappa - fr2 * (kappa - 2.0)) * sx);
    let gamma = if sx == 0.0 {
        gamma_storage
    } else {
        v * v * props.top_width_slope * sx + gamma_storage
    };
    guard_nonzero(policy, gamma_storage, "gamma (zero damping)")?;

    let c2v2 = c * c - v * v;
    guard_nonzero(policy, c2v2, "c² - v² (critical flow)")?;

    // Low frequencies
    let td = x / (c + v);
    let tu = x / (c - v);
    let storage = t * t * c2v2 / gamma_storage;
    let ad = storage * (1.0 - (-gamma_storage / (t * c2v2) * x).exp());
    let au = storage * ((gamma_storage / (t * c2v2) * x).exp() - 1.0);

    // High frequencies
    let e_ax = (alpha * x).exp();
    let envelope = (1.0 + e_ax).sqrt();
    let decay = gamma / (2.0 * t * c2v2) * x;
    let down_ratio = (1.0 - fr) / (1.0 + fr);
    let up_ratio = (1.0 + fr) / (1.0 - fr);

    let p11 = 1.0 / (t * c * (1.0 - fr))
        * ((1.0 + down_ratio * down_ratio * e_ax) / (1.0 + e_ax)).sqrt();
    let p12 = 2.0 / (t * c * (1.0 - fr2)) * ((-decay).exp() / envelope);
    let p21 = 2.0 / (t * c * (1.0 - fr2)) * (decay.exp() / envelope);
    let p22 = 1.0 / (t * c * (1.0 + fr))
        * ((1.0 + up_ratio * up_ratio * e_ax) / (1.0 + e_ax)).sqrt();

    let coeffs = RegionCoefficients {
        p11,
        p12,
        p21,
        p22,
        au,
        ad,
        tu,
        td,
    };
    coeffs.check(policy)?;
    Ok(coeffs)
}
