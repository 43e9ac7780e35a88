//! cf-hydraulics: linearization coefficients for open-channel flow models.
//!
//! Two reduced-order models are parameterized around a nominal steady state:
//! - IDZ (Integrator-Delay-Zero): whole-reach storage areas, travel times and
//!   high-frequency transfer gains, from a backwater split of the reach;
//! - LinearSV: per-node arrays of a finite-difference linearized Saint-Venant
//!   model on a uniform grid.
//!
//! Everything here is a pure function of its inputs. No flow is simulated.
//!
//! # Example
//!
//! ```no_run
//! use cf_core::units::{m, m3ps};
//! use cf_hydraulics::{ChannelReach, CrossSection, LinearizationConfig, derive_idz};
//!
//! let reach = ChannelReach {
//!     length: m(10_000.0),
//!     bed_level_up: m(2.0),
//!     bed_level_down: m(0.0),
//!     discharge: m3ps(100.0),
//!     friction_coefficient: 0.02,
//!     section: CrossSection::rectangular(m(30.0)),
//!     reference_depth: m(3.0),
//! };
//!
//! let idz = derive_idz(&reach, &LinearizationConfig::default()).unwrap();
//! println!("delay: {:.0} s, Au: {:.0} m²", idz.mean_delay(), idz.au);
//! ```

pub mod backwater;
pub mod combine;
pub mod common;
pub mod config;
pub mod error;
pub mod friction;
pub mod idz;
pub mod linear_sv;
pub mod normal_depth;
pub mod section;
pub mod segment;

// Re-exports
pub use backwater::{BackwaterSplit, split_reach};
pub use combine::{IdzParameters, ReachRegions, combine_regions};
pub use config::{GridConfig, LinearizationConfig, NORMAL_DEPTH_ITERATIONS, SingularityPolicy};
pub use error::{HydraulicsError, HydraulicsResult};
pub use friction::{HydraulicState, friction_slope, froude_number};
pub use idz::{ChannelReach, derive_idz};
pub use linear_sv::{GridLinearization, LinearSvReach, linearize_grid};
pub use normal_depth::normal_depth;
pub use section::{CrossSection, SectionProperties};
pub use segment::{RegionCoefficients, SegmentInput, linearize_segment};
