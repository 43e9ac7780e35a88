//! Node-grid linearization of the Saint-Venant equations (LinearSV).
//!
//! A rectangular reach is discretized into `N` level (H) nodes. Discharge and
//! velocity live on `2N-1` interleaved points:
//!
//! ```text
//! index:  0    1    2    3    4   ...  2N-3  2N-2
//! point:  Qb   Q    H    Q    H   ...   Q     Qb
//! node:   0   0|1   1   1|2   2   ...  N-2|N-1 N-1
//! ```
//!
//! The end points (`Qb`) take their area from the single adjacent node,
//! interior Q points average the two flanking nodes, H points use their own
//! node. Celerities live on the `N+1` discharge faces.

use crate::common::{check_outputs, guard_nonzero};
use crate::config::GridConfig;
use crate::error::{HydraulicsError, HydraulicsResult};
use crate::friction::manning_slope;
use cf_core::numeric::linspace;
use cf_core::units::{Discharge, Length};

/// Nominal state of a rectangular LinearSV reach.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearSvReach {
    pub n_level_nodes: usize,
    pub length: Length,
    pub h_b_up: Length,
    pub h_b_down: Length,
    pub q_nominal: Discharge,
    pub width: Length,
    /// Nominal depth at the upstream end
    pub y_nominal: Length,
    /// Nominal depth at the downstream end
    pub y_nominal_down: Length,
    /// Manning coefficient
    pub friction_coefficient: f64,
}

impl LinearSvReach {
    pub fn validate(&self) -> HydraulicsResult<()> {
        if self.n_level_nodes < 2 {
            return Err(HydraulicsError::InvalidArg {
                what: "LinearSV needs at least two level nodes",
            });
        }
        if !self.length.value.is_finite() || self.length.value <= 0.0 {
            return Err(HydraulicsError::InvalidArg {
                what: "reach length must be positive",
            });
        }
        if !self.width.value.is_finite() || self.width.value <= 0.0 {
            return Err(HydraulicsError::InvalidArg {
                what: "channel width must be positive",
            });
        }
        for (what, depth) in [
            ("upstream nominal depth", self.y_nominal.value),
            ("downstream nominal depth", self.y_nominal_down.value),
        ] {
            if !depth.is_finite() || depth <= 0.0 {
                return Err(HydraulicsError::Domain {
                    quantity: what,
                    value: depth,
                });
            }
        }
        Ok(())
    }

    pub fn bed_slope(&self) -> f64 {
        (self.h_b_up.value - self.h_b_down.value) / self.length.value
    }

    /// Node spacing `L/(N-1)`.
    pub fn dx(&self) -> f64 {
        self.length.value / (self.n_level_nodes - 1) as f64
    }
}

/// Arrays of one LinearSV linearization.
///
/// `t0`, `v0`, `delta`, `gamma` and `c0` are what the model consumes; the
/// rest are kept for inspection.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridLinearization {
    /// Top width per node (N)
    pub t0: Vec<f64>,
    /// Depth per node (N), downstream nominal first
    pub y0: Vec<f64>,
    /// Area per node (N)
    pub a0: Vec<f64>,
    /// Velocity per point (2N-1)
    pub v0: Vec<f64>,
    /// Wetted perimeter per node (N)
    pub p0: Vec<f64>,
    /// Hydraulic radius per node (N)
    pub r: Vec<f64>,
    /// Friction slope per point (2N-1)
    pub sf: Vec<f64>,
    /// Celerity per face (N+1)
    pub c0: Vec<f64>,
    /// Froude number per point (2N-1)
    pub f0: Vec<f64>,
    /// Backwater slope per point (2N-1)
    pub dydx: Vec<f64>,
    /// Per face (N+1)
    pub delta: Vec<f64>,
    /// Per node (N)
    pub kappa: Vec<f64>,
    /// Per node (N)
    pub f2: Vec<f64>,
    /// Per node (N)
    pub gamma: Vec<f64>,
}

/// Linearize `reach` on its node grid.
pub fn linearize_grid(
    reach: &LinearSvReach,
    config: &GridConfig,
) -> HydraulicsResult<GridLinearization> {
    reach.validate()?;
    let policy = config.singularity_policy;
    let g = config.gravity;
    let n = reach.n_level_nodes;
    let last = 2 * n - 2;
    let sb = reach.bed_slope();
    let dx = reach.dx();
    let nf = reach.friction_coefficient;

    let q0 = vec![reach.q_nominal.value; n + 1];
    let t0 = vec![reach.width.value; n];
    let y0 = linspace(reach.y_nominal_down.value, reach.y_nominal.value, n);
    let a0: Vec<f64> = t0.iter().zip(&y0).map(|(t, y)| t * y).collect();
    let p0: Vec<f64> = t0.iter().zip(&y0).map(|(t, y)| t + 2.0 * y).collect();
    let r: Vec<f64> = a0.iter().zip(&p0).map(|(a, p)| a / p).collect();

    let mut v0 = vec![0.0; 2 * n - 1];
    let mut sf = vec![0.0; 2 * n - 1];
    v0[0] = q0[0] / a0[0];
    sf[0] = manning_slope(q0[0], nf, a0[0], r[0]);
    for node in 1..n {
        let a_edge = (a0[node - 1] + a0[node]) / 2.0;
        let r_edge = (r[node - 1] + r[node]) / 2.0;
        v0[2 * node - 1] = q0[node] / a_edge;
        sf[2 * node - 1] = manning_slope(q0[node], nf, a_edge, r_edge);
    }
    for node in 1..n - 1 {
        let q_mid = (q0[node + 1] + q0[node]) / 2.0;
        v0[2 * node] = q_mid / a0[node];
        sf[2 * node] = manning_slope(q_mid, nf, a0[node], r[node]);
    }
    v0[last] = q0[n] / a0[n - 1];
    sf[last] = manning_slope(q0[n], nf, a0[n - 1], r[n - 1]);

    let mut c0 = vec![0.0; n + 1];
    c0[0] = (g * y0[0]).sqrt();
    for node in 1..n {
        c0[node] = (g * (y0[node - 1] + y0[node]) / 2.0).sqrt();
    }
    c0[n] = (g * y0[n - 1]).sqrt();

    // H points divide the upstream Q-point velocity by the mean face celerity.
    let mut f0 = vec![0.0; 2 * n - 1];
    f0[0] = v0[0] / c0[0];
    for node in 1..n {
        f0[2 * node - 1] = v0[2 * node - 1] / c0[node];
    }
    for node in 1..n - 1 {
        f0[2 * node] = v0[2 * node - 1] / ((c0[node + 1] + c0[node]) / 2.0);
    }
    f0[last] = v0[last] / c0[n];

    let mut dydx = Vec::with_capacity(2 * n - 1);
    for (&s, &f) in sf.iter().zip(&f0) {
        let den = 1.0 - f * f;
        guard_nonzero(policy, den, "critical flow (Froude number = 1) on LinearSV grid")?;
        dydx.push((sb - s) / den);
    }

    // Faces map to points 0, 1, 3, ..., 2N-3, 2N-2.
    let face_point = |face: usize| -> usize {
        if face == 0 {
            0
        } else if face == n {
            last
        } else {
            2 * face - 1
        }
    };
    let mut delta = vec![0.0; n + 1];
    for (face, d) in delta.iter_mut().enumerate() {
        let k = face_point(face);
        guard_nonzero(policy, v0[k], "zero nominal velocity on LinearSV grid")?;
        *d = (2.0 * g / v0[k]) * (sb - dydx[k]);
    }

    // The 2 is dP/dy of a rectangle.
    let kappa: Vec<f64> = (0..n)
        .map(|i| 7.0 / 3.0 - ((4.0 * a0[i]) / (3.0 * t0[i] * p0[i])) * 2.0)
        .collect();
    let f2: Vec<f64> = (0..n)
        .map(|i| v0[2 * i].powi(2) * t0[i] / (g * a0[i]))
        .collect();

    let backwater = |i: usize| -> f64 {
        g * t0[i]
            * ((1.0 + kappa[i]) * sb - (1.0 + kappa[i] - (kappa[i] - 2.0) * f2[i]) * dydx[2 * i])
    };
    let mut gamma = vec![0.0; n];
    gamma[0] = v0[0].powi(2) * ((t0[1] - t0[0]) / dx) + backwater(0);
    for node in 1..n - 1 {
        gamma[node] =
            v0[2 * node].powi(2) * ((t0[node + 1] - t0[node - 1]) / (2.0 * dx)) + backwater(node);
    }
    gamma[n - 1] = v0[last].powi(2) * ((t0[n - 1] - t0[n - 2]) / dx) + backwater(n - 1);

    let grid = GridLinearization {
        t0,
        y0,
        a0,
        v0,
        p0,
        r,
        sf,
        c0,
        f0,
        dydx,
        delta,
        kappa,
        f2,
        gamma,
    };
    grid.check(config)?;
    Ok(grid)
}

impl GridLinearization {
    pub fn n_level_nodes(&self) -> usize {
        self.t0.len()
    }

    fn check(&self, config: &GridConfig) -> HydraulicsResult<()> {
        for (what, values) in [
            ("T0", &self.t0),
            ("V0", &self.v0),
            ("Delta", &self.delta),
            ("Gamma", &self.gamma),
            ("C0", &self.c0),
        ] {
            let named: Vec<(&'static str, f64)> = values.iter().map(|&v| (what, v)).collect();
            check_outputs(config.singularity_policy, &named)?;
        }
        Ok(())
    }
}
