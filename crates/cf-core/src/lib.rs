//! cf-core: shared foundation for the channel-flow crates.
//!
//! Contains:
//! - units (uom SI types, constructors and gravity constants)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error type)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{CfError, CfResult};
pub use numeric::*;
pub use units::*;
