//! Frame timing for host loops.
//!
//! The pool does not measure time itself; the host passes `dt` into every
//! [`tick`](crate::ParticlePool::tick). [`FrameClock`] is a small helper for
//! hosts that want that `dt` from the wall clock.
//!
//! # Example
//!
//! ```ignore
//! let mut clock = FrameClock::new().with_max_delta(0.1);
//! loop {
//!     let dt = clock.update();
//!     pool.tick(dt);
//!     render(&pool);
//! }
//! ```

use std::time::{Duration, Instant};

/// Measures the time between consecutive frames.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    delta_secs: f32,
    frame_count: u64,
    /// Use this instead of measured time (deterministic replays, tests).
    fixed_delta: Option<f32>,
    /// Upper bound on reported delta, so a stall doesn't fling particles.
    max_delta: Option<f32>,
    paused: bool,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta_secs: 0.0,
            frame_count: 0,
            fixed_delta: None,
            max_delta: None,
            paused: false,
        }
    }

    /// Always report `delta` seconds per frame.
    pub fn with_fixed_delta(mut self, delta: f32) -> Self {
        self.fixed_delta = Some(delta);
        self
    }

    /// Clamp measured deltas to at most `max` seconds.
    pub fn with_max_delta(mut self, max: f32) -> Self {
        self.max_delta = Some(max);
        self
    }

    /// Mark a new frame and return its delta in seconds.
    ///
    /// Returns 0 while paused.
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();
        let raw = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        if self.paused {
            self.delta_secs = 0.0;
            return 0.0;
        }

        let mut delta = self.fixed_delta.unwrap_or(raw);
        if let Some(max) = self.max_delta {
            delta = delta.min(max);
        }
        self.delta_secs = delta;
        self.frame_count += 1;
        delta
    }

    /// Delta reported by the last [`update`](Self::update).
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Frames counted since creation, excluding paused ones.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Wall-clock time since the clock was created.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume without reporting the paused interval as one huge delta.
    pub fn resume(&mut self) {
        if self.paused {
            self.last_frame = Instant::now();
            self.paused = false;
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_measures_real_time() {
        let mut clock = FrameClock::new();
        thread::sleep(Duration::from_millis(10));
        let dt = clock.update();
        assert!(dt >= 0.009);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_fixed_delta() {
        let mut clock = FrameClock::new().with_fixed_delta(1.0 / 60.0);
        thread::sleep(Duration::from_millis(20));
        assert!((clock.update() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_max_delta_clamps_stalls() {
        let mut clock = FrameClock::new().with_max_delta(0.005);
        thread::sleep(Duration::from_millis(20));
        assert_eq!(clock.update(), 0.005);
    }

    #[test]
    fn test_pause_reports_zero() {
        let mut clock = FrameClock::new();
        clock.pause();
        thread::sleep(Duration::from_millis(5));
        assert_eq!(clock.update(), 0.0);
        assert_eq!(clock.frame(), 0);

        clock.resume();
        assert!(!clock.is_paused());
        assert!(clock.update() < 0.005);
    }
}
