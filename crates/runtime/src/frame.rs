use foundation::time::Time;

/// One sample of the animation clock.
///
/// A frame is the unit the host composes against: camera pose, selection and
/// this timestamp are read together so every layer in a frame agrees on time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Clock reading at the start of the frame.
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, time: Time) -> Self {
        Self { index, time }
    }

    /// Next frame at `time`. Timestamps never run backwards, even if the
    /// clock source hiccups.
    pub fn next(self, time: Time) -> Self {
        let time = if time.0 < self.time.0 { self.time } else { time };
        Self::new(self.index + 1, time)
    }
}
