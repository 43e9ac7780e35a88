//! Manning friction slope and Froude number.

use crate::error::HydraulicsResult;
use crate::section::{CrossSection, SectionProperties, velocity};

/// Manning friction slope from area and hydraulic radius:
/// `q²·n² / (A²·R_h^(4/3))`.
pub fn manning_slope(q: f64, n: f64, area: f64, hydraulic_radius: f64) -> f64 {
    (q * q * n * n) / (area * area * hydraulic_radius.powf(4.0 / 3.0))
}

/// Flow at one depth through one section. Every hydraulic quantity is derived
/// on demand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HydraulicState {
    pub depth: f64,
    pub discharge: f64,
    pub section: CrossSection,
}

impl HydraulicState {
    pub fn new(section: CrossSection, depth: f64, discharge: f64) -> Self {
        Self {
            depth,
            discharge,
            section,
        }
    }

    pub fn properties(&self) -> HydraulicsResult<SectionProperties> {
        self.section.properties(self.depth)
    }

    pub fn velocity(&self) -> HydraulicsResult<f64> {
        velocity(self.discharge, self.properties()?.area)
    }

    pub fn celerity(&self, g: f64) -> HydraulicsResult<f64> {
        Ok(self.properties()?.celerity(g))
    }

    pub fn froude(&self, g: f64) -> HydraulicsResult<f64> {
        let props = self.properties()?;
        let v = velocity(self.discharge, props.area)?;
        Ok(v / props.celerity(g))
    }

    pub fn friction_slope(&self, n: f64) -> HydraulicsResult<f64> {
        let props = self.properties()?;
        Ok(manning_slope(
            self.discharge,
            n,
            props.area,
            props.hydraulic_radius,
        ))
    }
}

/// Manning friction slope of `section` at depth `y` carrying `q`.
pub fn friction_slope(section: &CrossSection, y: f64, q: f64, n: f64) -> HydraulicsResult<f64> {
    HydraulicState::new(*section, y, q).friction_slope(n)
}

/// Froude number `v/c` of `section` at depth `y` carrying `q`.
pub fn froude_number(section: &CrossSection, y: f64, q: f64, g: f64) -> HydraulicsResult<f64> {
    HydraulicState::new(*section, y, q).froude(g)
}
