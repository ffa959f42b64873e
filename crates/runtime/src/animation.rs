use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::clock::FrameClock;
use crate::frame::Frame;

pub const DEFAULT_FRAME_RATE_HZ: f64 = 60.0;

/// Recurring per-frame clock sampler.
///
/// `start` spawns a task on the current Tokio runtime that samples the clock
/// once per tick and publishes the latest [`Frame`]. Frames are coalesced:
/// a slow consumer only ever sees the most recent sample.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AnimationLoop {
    period: Duration,
}

impl AnimationLoop {
    pub fn new(frame_rate_hz: f64) -> Self {
        let hz = if frame_rate_hz.is_finite() && frame_rate_hz > 0.0 {
            frame_rate_hz
        } else {
            DEFAULT_FRAME_RATE_HZ
        };
        Self {
            period: Duration::from_secs_f64(1.0 / hz),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Starts the loop. Must be called from within a Tokio runtime.
    pub fn start<C: FrameClock>(self, clock: C) -> (AnimationHandle, watch::Receiver<Frame>) {
        let first = Frame::new(0, clock.now());
        let (tx, rx) = watch::channel(first);
        let period = self.period;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; frame 0 is already published.
            ticker.tick().await;

            let mut frame = first;
            loop {
                ticker.tick().await;
                frame = frame.next(clock.now());
                if tx.send(frame).is_err() {
                    debug!("animation loop: all receivers dropped, exiting");
                    break;
                }
            }
        });

        (AnimationHandle { task: Some(task) }, rx)
    }
}

impl Default for AnimationLoop {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_RATE_HZ)
    }
}

/// Owner of a running [`AnimationLoop`].
///
/// Stopping cancels the recurring task; dropping the handle does the same, so
/// no frame is published after the view that owns the handle is gone.
#[derive(Debug)]
pub struct AnimationHandle {
    task: Option<JoinHandle<()>>,
}

impl AnimationHandle {
    /// Cancels the loop and waits for the task to wind down.
    pub async fn stop(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            // A cancelled JoinError is the expected outcome here.
            let _ = task.await;
        }
    }
}

impl Drop for AnimationHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
