// cf-core/src/units.rs

use uom::si::f64::{Length as UomLength, Time as UomTime, VolumeRate as UomVolumeRate};

// Public canonical unit types (SI, f64)
pub type Length = UomLength;
pub type Time = UomTime;
pub type Discharge = UomVolumeRate;

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn m3ps(v: f64) -> Discharge {
    use uom::si::volume_rate::cubic_meter_per_second;
    Discharge::new::<cubic_meter_per_second>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

pub mod constants {
    /// Standard gravity, used by the node-grid (LinearSV) linearization.
    pub const G0_MPS2: f64 = 9.806_65;

    /// Rounded gravity used throughout the IDZ derivation.
    ///
    /// Calibrated IDZ models were produced with this value; keep it separate
    /// from [`G0_MPS2`].
    pub const G_IDZ_MPS2: f64 = 9.81;
}
