//! Platform-agnostic time utilities
//!
//! Provides a unified way to get elapsed time in seconds since app start,
//! plus the [`Clock`] the frame driver samples once per tick.

#[cfg(target_arch = "wasm32")]
pub fn now_seconds() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now() / 1000.0)
        .unwrap_or(0.0)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_seconds() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64()
}

/// Anything that can report seconds elapsed since the scene started.
pub trait TimeSource {
    fn elapsed(&self) -> f64;
}

/// Monotonic elapsed-time accumulator. Reset only by constructing a new one.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: f64,
}

impl Clock {
    pub fn new() -> Self {
        Self::starting_at(now_seconds())
    }

    pub fn starting_at(start: f64) -> Self {
        Self { start }
    }

    /// Elapsed seconds at an explicit `now`, never negative.
    pub fn elapsed_at(&self, now: f64) -> f64 {
        (now - self.start).max(0.0)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for Clock {
    fn elapsed(&self) -> f64 {
        self.elapsed_at(now_seconds())
    }
}
