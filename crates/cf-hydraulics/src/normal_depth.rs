//! Normal (uniform-flow) depth by fixed-step bisection.

use crate::error::{HydraulicsError, HydraulicsResult};
use crate::friction::friction_slope;
use crate::section::CrossSection;

/// Depth at which the Manning friction slope equals the bed slope `sb`.
///
/// Bisects `[0, 5·y_ref]` (capped at the full depth of closed sections) for
/// exactly `iterations` steps and returns the last midpoint. There is no
/// convergence test: if the root lies outside the bracket the result settles
/// next to the nearest bracket end.
///
/// # Errors
/// `InvalidArg` for a non-positive `y_ref` or zero iterations; geometry
/// errors propagate.
pub fn normal_depth(
    section: &CrossSection,
    q: f64,
    n: f64,
    sb: f64,
    y_ref: f64,
    iterations: usize,
) -> HydraulicsResult<f64> {
    if !(y_ref > 0.0) {
        return Err(HydraulicsError::InvalidArg {
            what: "reference depth must be positive",
        });
    }
    if iterations == 0 {
        return Err(HydraulicsError::InvalidArg {
            what: "normal depth bisection needs at least one iteration",
        });
    }

    let mut lo = 0.0;
    let mut hi = 5.0 * y_ref;
    if let Some(full) = section.max_depth() {
        hi = hi.min(full);
    }

    let mut y = 0.5 * (lo + hi);
    for _ in 0..iterations {
        y = 0.5 * (lo + hi);
        let dif = friction_slope(section, y, q, n)? - sb;
        if dif < 0.0 {
            hi = y;
        } else {
            lo = y;
        }
    }
    Ok(y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NORMAL_DEPTH_ITERATIONS;
    use cf_core::units::m;
    use proptest::prelude::*;

    #[test]
    fn rectangle_reference_reach() {
        let section = CrossSection::rectangular(m(30.0));
        let yn = normal_depth(&section, 100.0, 0.02, 0.0002, 3.0, NORMAL_DEPTH_ITERATIONS).unwrap();
        assert!(yn > 0.0 && yn < 3.0, "yn = {yn}");
        let sf = friction_slope(&section, yn, 100.0, 0.02).unwrap();
        assert!((sf - 0.0002).abs() < 1e-8);
    }

    #[test]
    fn repeated_calls_are_bit_identical() {
        let section = CrossSection::trapezoidal(m(8.0), 1.5);
        let a = normal_depth(&section, 25.0, 0.025, 5e-4, 2.0, 25).unwrap();
        let b = normal_depth(&section, 25.0, 0.025, 5e-4, 2.0, 25).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn root_outside_bracket_sticks_to_upper_end() {
        // Tiny reference depth: the true normal depth is far above 5·y_ref.
        let section = CrossSection::rectangular(m(30.0));
        let yn = normal_depth(&section, 100.0, 0.02, 0.0002, 0.1, 25).unwrap();
        assert!((0.5 - yn) < 0.5 / (1 << 24) as f64);
    }

    #[test]
    fn circular_bracket_stays_inside_pipe() {
        let section = CrossSection::circular(m(1.0));
        // 5·y_ref = 7.5 > 2r: midpoints must stay inside the pipe.
        let yn = normal_depth(&section, 1.0, 0.013, 1e-3, 1.5, 25).unwrap();
        assert!(yn > 0.0 && yn <= 2.0);
    }

    #[test]
    fn rejects_non_positive_reference_depth() {
        let section = CrossSection::rectangular(m(30.0));
        assert!(normal_depth(&section, 100.0, 0.02, 0.0002, 0.0, 25).is_err());
        assert!(normal_depth(&section, 100.0, 0.02, 0.0002, f64::NAN, 25).is_err());
    }

    proptest! {
        #[test]
        fn root_within_bracket_tolerance(
            q in 5.0_f64..200.0,
            n in 0.01_f64..0.05,
            b0 in 10.0_f64..50.0,
            m_side in 0.0_f64..2.0,
            sb in 1e-4_f64..1e-3,
        ) {
            let section = CrossSection::trapezoidal(m(b0), m_side);
            let y_ref = 10.0;
            let yn = normal_depth(&section, q, n, sb, y_ref, NORMAL_DEPTH_ITERATIONS).unwrap();
            let width = 5.0 * y_ref / (1u64 << NORMAL_DEPTH_ITERATIONS) as f64;
            prop_assert!(yn > 0.0 && yn < 5.0 * y_ref);
            // Sf falls with depth, so the root is bracketed by yn ± 2·width.
            let above = friction_slope(&section, yn - 2.0 * width, q, n).unwrap();
            let below = friction_slope(&section, yn + 2.0 * width, q, n).unwrap();
            prop_assert!(above >= sb, "Sf(yn-) = {} < sb = {}", above, sb);
            prop_assert!(below <= sb, "Sf(yn+) = {} > sb = {}", below, sb);
        }
    }
}
