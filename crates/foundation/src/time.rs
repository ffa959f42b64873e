use serde::Serialize;

/// Monotonic timestamp in milliseconds since the animation clock started.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd, Serialize)]
pub struct Time(pub f64);

impl Time {
    pub const ZERO: Time = Time(0.0);
}
