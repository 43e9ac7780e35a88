//! Cross-section geometry for trapezoidal and circular channels.
//!
//! The free functions are the raw closed-form relations; [`CrossSection`]
//! wraps them behind one shape-dispatched entry point that validates depth
//! and returns every property the linearizers need in one
//! [`SectionProperties`] value.

use crate::error::{HydraulicsError, HydraulicsResult};
use cf_core::units::Length;

/// Area, wetted perimeter and top width of a trapezoid at depth `y`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrapezoidGeometry {
    pub area: f64,
    pub perimeter: f64,
    pub top_width: f64,
}

/// Trapezoid with bottom width `b0` and side slope `m` (horizontal per vertical).
pub fn trapezoid_properties(y: f64, b0: f64, m: f64) -> TrapezoidGeometry {
    TrapezoidGeometry {
        area: b0 * y + m * y * y,
        perimeter: b0 + 2.0 * y * (1.0 + m * m).sqrt(),
        top_width: b0 + 2.0 * m * y,
    }
}

/// Partially filled circle: half the wetted central angle, area, wetted
/// perimeter and hydraulic radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleGeometry {
    pub alpha: f64,
    pub area: f64,
    pub perimeter: f64,
    pub hydraulic_radius: f64,
}

/// Circle of radius `r` filled to depth `y`.
///
/// # Errors
/// `Domain` unless `0 ≤ y ≤ 2r`.
pub fn circle_properties(y: f64, r: f64) -> HydraulicsResult<CircleGeometry> {
    let ratio = y / r;
    if !(0.0..=2.0).contains(&ratio) {
        return Err(HydraulicsError::Domain {
            quantity: "circular depth ratio y/r",
            value: ratio,
        });
    }
    let diameter = 2.0 * r;
    let alpha = (1.0 - ratio).acos();
    let sin_2a = (2.0 * alpha).sin();
    let area = diameter * diameter / 4.0 * (alpha - sin_2a / 2.0);
    let perimeter = alpha * diameter;
    let hydraulic_radius = if alpha == 0.0 {
        0.0
    } else {
        diameter / 4.0 * (1.0 - sin_2a / (2.0 * alpha))
    };
    Ok(CircleGeometry {
        alpha,
        area,
        perimeter,
        hydraulic_radius,
    })
}

/// Mean velocity `q / area`.
///
/// # Errors
/// `Domain` when the area is zero (dry section).
pub fn velocity(q: f64, area: f64) -> HydraulicsResult<f64> {
    if area == 0.0 {
        return Err(HydraulicsError::Domain {
            quantity: "wetted area",
            value: area,
        });
    }
    Ok(q / area)
}

/// Channel cross-section shape.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum CrossSection {
    /// Trapezoid; a rectangle when `side_slope == 0`.
    Trapezoidal {
        bottom_width: Length,
        side_slope: f64,
    },
    /// Circular conduit flowing partially full.
    Circular { radius: Length },
}

impl CrossSection {
    pub fn trapezoidal(bottom_width: Length, side_slope: f64) -> Self {
        CrossSection::Trapezoidal {
            bottom_width,
            side_slope,
        }
    }

    pub fn rectangular(width: Length) -> Self {
        Self::trapezoidal(width, 0.0)
    }

    pub fn circular(radius: Length) -> Self {
        CrossSection::Circular { radius }
    }

    /// Reject shapes that cannot carry water.
    pub fn validate(&self) -> HydraulicsResult<()> {
        match *self {
            CrossSection::Trapezoidal {
                bottom_width,
                side_slope,
            } => {
                let b0 = bottom_width.value;
                if !b0.is_finite() || b0 < 0.0 {
                    return Err(HydraulicsError::InvalidArg {
                        what: "bottom width must be finite and non-negative",
                    });
                }
                if !side_slope.is_finite() || side_slope < 0.0 {
                    return Err(HydraulicsError::InvalidArg {
                        what: "side slope must be finite and non-negative",
                    });
                }
                if b0 == 0.0 && side_slope == 0.0 {
                    return Err(HydraulicsError::InvalidArg {
                        what: "trapezoid with zero bottom width needs sloped sides",
                    });
                }
            }
            CrossSection::Circular { radius } => {
                if !radius.value.is_finite() || radius.value <= 0.0 {
                    return Err(HydraulicsError::InvalidArg {
                        what: "radius must be finite and positive",
                    });
                }
            }
        }
        Ok(())
    }

    /// Side slope `m`; circles have none.
    pub fn side_slope(&self) -> f64 {
        match *self {
            CrossSection::Trapezoidal { side_slope, .. } => side_slope,
            CrossSection::Circular { .. } => 0.0,
        }
    }

    /// `√(1+m²)`: wetted-perimeter growth per unit depth along one wall.
    pub fn wall_factor(&self) -> f64 {
        let m = self.side_slope();
        (1.0 + m * m).sqrt()
    }

    /// Depth at which the section is full, if it has one.
    pub fn max_depth(&self) -> Option<f64> {
        match *self {
            CrossSection::Trapezoidal { .. } => None,
            CrossSection::Circular { radius } => Some(2.0 * radius.value),
        }
    }

    /// All geometric properties at depth `y`.
    ///
    /// # Errors
    /// `Domain` for negative depth, or for circular depths above `2r`.
    pub fn properties(&self, y: f64) -> HydraulicsResult<SectionProperties> {
        if !y.is_finite() || y < 0.0 {
            return Err(HydraulicsError::Domain {
                quantity: "flow depth",
                value: y,
            });
        }
        match *self {
            CrossSection::Trapezoidal {
                bottom_width,
                side_slope,
            } => {
                let g = trapezoid_properties(y, bottom_width.value, side_slope);
                let hydraulic_radius = g.area / g.perimeter;
                Ok(SectionProperties {
                    depth: y,
                    area: g.area,
                    perimeter: g.perimeter,
                    top_width: g.top_width,
                    hydraulic_radius,
                    top_width_slope: 2.0 * side_slope,
                    wave_depth: g.area / g.top_width,
                    width_term: g.top_width,
                })
            }
            CrossSection::Circular { radius } => {
                let g = circle_properties(y, radius.value)?;
                let diameter = 2.0 * radius.value;
                let (sin_a, cos_a) = g.alpha.sin_cos();
                Ok(SectionProperties {
                    depth: y,
                    area: g.area,
                    perimeter: g.perimeter,
                    top_width: diameter * sin_a,
                    hydraulic_radius: g.hydraulic_radius,
                    top_width_slope: 2.0 * cos_a / sin_a,
                    wave_depth: g.hydraulic_radius,
                    width_term: g.hydraulic_radius,
                })
            }
        }
    }
}

/// Geometry of a section at one depth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionProperties {
    pub depth: f64,
    pub area: f64,
    pub perimeter: f64,
    pub top_width: f64,
    pub hydraulic_radius: f64,
    /// dT/dy
    pub top_width_slope: f64,
    /// Depth entering the celerity: A/T for trapezoids, R_h for circles.
    pub wave_depth: f64,
    /// Width factor of the shape/decay coefficients: T for trapezoids,
    /// R_h for circles.
    pub width_term: f64,
}

impl SectionProperties {
    /// Celerity of small gravity waves, `√(g·wave_depth)`.
    pub fn celerity(&self, g: f64) -> f64 {
        (g * self.wave_depth).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_core::units::m;
    use proptest::prelude::*;

    #[test]
    fn rectangle_matches_hand_calc() {
        let g = trapezoid_properties(3.0, 30.0, 0.0);
        assert_eq!(g.area, 90.0);
        assert_eq!(g.perimeter, 36.0);
        assert_eq!(g.top_width, 30.0);
    }

    #[test]
    fn trapezoid_side_slopes_add_area() {
        let g = trapezoid_properties(2.0, 10.0, 1.5);
        assert!((g.area - 26.0).abs() < 1e-12);
        assert!((g.top_width - 16.0).abs() < 1e-12);
        assert!((g.perimeter - (10.0 + 4.0 * 3.25_f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn half_full_circle() {
        let g = circle_properties(1.0, 1.0).unwrap();
        assert!((g.alpha - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((g.area - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((g.perimeter - std::f64::consts::PI).abs() < 1e-12);
        assert!((g.hydraulic_radius - 0.5).abs() < 1e-12);
    }

    #[test]
    fn near_full_circle_is_finite() {
        let r = 0.8;
        let section = CrossSection::circular(m(r));
        for ratio in [1.9, 1.99, 1.999_999, 2.0 - 1e-12] {
            let p = section.properties(ratio * r).unwrap();
            assert!(p.area.is_finite() && p.area > 0.0);
            assert!(p.perimeter.is_finite() && p.perimeter > 0.0);
            assert!(p.hydraulic_radius.is_finite() && p.hydraulic_radius > 0.0);
            assert!(p.top_width.is_finite() && p.top_width >= 0.0);
            assert!(p.celerity(9.81).is_finite());
        }
        let full = circle_properties(2.0 * r, r).unwrap();
        assert!((full.alpha - std::f64::consts::PI).abs() < 1e-12);
        assert!((full.area - std::f64::consts::PI * r * r).abs() < 1e-9);
    }

    #[test]
    fn overfull_circle_is_domain_error() {
        let err = circle_properties(2.01, 1.0).unwrap_err();
        assert!(matches!(err, HydraulicsError::Domain { .. }));
        let section = CrossSection::circular(m(1.0));
        assert!(section.properties(2.5).is_err());
        assert!(circle_properties(-0.1, 1.0).is_err());
    }

    #[test]
    fn negative_depth_rejected() {
        let section = CrossSection::rectangular(m(5.0));
        assert!(matches!(
            section.properties(-1.0),
            Err(HydraulicsError::Domain { .. })
        ));
    }

    #[test]
    fn velocity_rejects_dry_section() {
        assert!(velocity(10.0, 0.0).is_err());
        assert_eq!(velocity(10.0, 4.0).unwrap(), 2.5);
    }

    #[test]
    fn shape_validation() {
        assert!(CrossSection::rectangular(m(10.0)).validate().is_ok());
        assert!(CrossSection::trapezoidal(m(0.0), 1.0).validate().is_ok());
        assert!(CrossSection::trapezoidal(m(0.0), 0.0).validate().is_err());
        assert!(CrossSection::trapezoidal(m(-1.0), 1.0).validate().is_err());
        assert!(CrossSection::circular(m(0.0)).validate().is_err());
    }

    #[test]
    fn trapezoid_celerity_uses_hydraulic_depth() {
        let p = CrossSection::rectangular(m(30.0)).properties(3.0).unwrap();
        assert!((p.celerity(9.81) - (9.81_f64 * 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(p.width_term, 30.0);
        assert_eq!(p.top_width_slope, 0.0);
    }

    proptest! {
        #[test]
        fn trapezoid_area_positive_and_increasing(
            b0 in 0.1_f64..100.0,
            m_side in 0.0_f64..4.0,
            y in 1e-3_f64..20.0,
            dy in 1e-3_f64..5.0,
        ) {
            let a1 = trapezoid_properties(y, b0, m_side).area;
            let a2 = trapezoid_properties(y + dy, b0, m_side).area;
            prop_assert!(a1 > 0.0);
            prop_assert!(a2 > a1);
        }
    }
}
