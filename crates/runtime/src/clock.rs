use foundation::time::Time;

/// A monotonic time source in milliseconds.
pub trait FrameClock: Send + 'static {
    fn now(&self) -> Time;
}

/// Wall-independent clock anchored at construction.
///
/// Built on `tokio::time::Instant` so paused-time tests can drive it.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: tokio::time::Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for MonotonicClock {
    fn now(&self) -> Time {
        Time(self.origin.elapsed().as_secs_f64() * 1000.0)
    }
}

/// Repeating ramp in `[0, 1)`: `(t / cycle + offset) mod 1`.
///
/// A non-positive or non-finite cycle yields `0.0`.
pub fn cycle_phase(time: Time, cycle_ms: f64, offset: f64) -> f64 {
    if !(cycle_ms.is_finite() && cycle_ms > 0.0) {
        return 0.0;
    }
    let phase = (time.0 / cycle_ms + offset).rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs.
    if phase >= 1.0 { 0.0 } else { phase }
}

/// Parameters of a train of expanding rings that fade as they grow.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PulseTrain {
    pub cycle_ms: f64,
    pub rings: u32,
    pub base_radius: f64,
    pub max_expansion: f64,
    pub max_opacity: f64,
}

impl Default for PulseTrain {
    fn default() -> Self {
        Self {
            cycle_ms: 2000.0,
            rings: 3,
            base_radius: 20.0,
            max_expansion: 60.0,
            max_opacity: 180.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PulseRing {
    pub phase: f64,
    pub radius: f64,
    /// Alpha in `0..=255`.
    pub opacity: u8,
}

impl PulseTrain {
    /// Ring `i` is offset by `i / rings` so the wave renews continuously.
    pub fn ring(&self, time: Time, index: u32) -> PulseRing {
        let offset = if self.rings == 0 {
            0.0
        } else {
            f64::from(index) / f64::from(self.rings)
        };
        let phase = cycle_phase(time, self.cycle_ms, offset);
        let opacity = (self.max_opacity * (1.0 - phase)).floor().clamp(0.0, 255.0) as u8;
        PulseRing {
            phase,
            radius: self.base_radius + phase * self.max_expansion,
            opacity,
        }
    }

    pub fn rings_at(&self, time: Time) -> impl Iterator<Item = PulseRing> + '_ {
        (0..self.rings).map(move |i| self.ring(time, i))
    }
}
