// Frame pacing for the overlay loop.
// Like a game-loop clock: each tick sleeps until one interval has passed
// since the previous tick, so positioning cost doesn't change the cadence
// as long as it fits inside the interval.

use std::thread;
use std::time::{Duration, Instant};


pub struct FrameClock {
    interval: Duration,
    last: Instant,
}

impl FrameClock {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: Instant::now() }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Block until one interval after the previous tick; returns the time
    /// actually elapsed since that tick. Never sleeps when already late.
    pub fn tick(&mut self) -> Duration {
        let deadline = self.last + self.interval;
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        }
        let now = Instant::now();
        let elapsed = now - self.last;
        self.last = now;
        elapsed
    }
}

/// Counts presented frames and reports the measured rate about once a second.
pub struct FpsMeter {
    window_start: Instant,
    frames: u32,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self { window_start: Instant::now(), frames: 0 }
    }

    /// Record one frame; returns Some(fps) when a full second has passed.
    pub fn frame(&mut self) -> Option<f32> {
        self.frames += 1;
        let secs = self.window_start.elapsed();
        if secs < Duration::from_secs(1) {
            return None;
        }
        let fps = self.frames as f32 / secs.as_secs_f32();
        self.frames = 0;
        self.window_start = Instant::now();
        Some(fps)
    }
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new()
    }
}
