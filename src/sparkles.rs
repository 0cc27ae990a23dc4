//! Transient sparkle particles
//!
//! - Sparkle: one short-lived point with a birth time and lifetime
//! - SparklePool: fixed-capacity ring buffer; the oldest sparkle is
//!   recycled when a new one arrives at capacity

use std::collections::VecDeque;

use glam::Vec3;
use rand::Rng;

use crate::galaxy::sample_coordinate;

pub const DEFAULT_CAPACITY: usize = 4096;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sparkle {
    pub position: [f32; 3],
    /// Birth time (scene-relative seconds)
    pub birth_time: f32,
    /// Seconds until the sparkle is retired
    pub lifetime: f32,
}

impl Sparkle {
    pub fn new(position: Vec3, birth_time: f32, lifetime: f32) -> Self {
        Self {
            position: position.to_array(),
            birth_time,
            lifetime,
        }
    }

    #[inline]
    pub fn is_alive(&self, now: f32) -> bool {
        let age = now - self.birth_time;
        age >= 0.0 && age < self.lifetime
    }

    #[inline]
    pub fn is_expired(&self, now: f32) -> bool {
        now - self.birth_time >= self.lifetime
    }

    /// 1.0 at birth, falling linearly to 0.0 at end of life.
    pub fn fade(&self, now: f32) -> f32 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        (1.0 - (now - self.birth_time) / self.lifetime).clamp(0.0, 1.0)
    }
}

/// Ring buffer of sparkles. Never grows past `capacity`.
#[derive(Debug)]
pub struct SparklePool {
    sparkles: VecDeque<Sparkle>,
    capacity: usize,
    /// Monotonic counter: total sparkles ever spawned
    total_spawned: u64,
    /// Fractional spawn carried to the next tick
    carry: f32,
}

impl Default for SparklePool {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl SparklePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            sparkles: VecDeque::with_capacity(capacity),
            capacity,
            total_spawned: 0,
            carry: 0.0,
        }
    }

    /// Push a sparkle, recycling the oldest if at capacity
    #[inline]
    pub fn push(&mut self, sparkle: Sparkle) {
        if self.capacity == 0 {
            return;
        }
        if self.sparkles.len() >= self.capacity {
            self.sparkles.pop_front();
        }
        self.sparkles.push_back(sparkle);
        self.total_spawned += 1;
    }

    /// Emit `rate * dt` sparkles at random positions inside the galaxy cube.
    /// Returns how many were spawned this call.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        now: f32,
        dt: f32,
        rate: f32,
        lifetime: f32,
        rng: &mut R,
    ) -> usize {
        let wanted = rate.max(0.0) * dt.max(0.0) + self.carry;
        let whole = wanted.floor();
        self.carry = wanted - whole;
        // A long stall (hidden tab) would otherwise spawn far past capacity
        let n = (whole as usize).min(self.capacity);
        for _ in 0..n {
            let position = Vec3::new(
                sample_coordinate(rng),
                sample_coordinate(rng),
                sample_coordinate(rng),
            );
            self.push(Sparkle::new(position, now, lifetime));
        }
        n
    }

    /// Drop expired sparkles. Lifetimes can shrink mid-run, so expiry is not
    /// ordered by age. Returns how many were retired.
    pub fn retire(&mut self, now: f32) -> usize {
        let before = self.sparkles.len();
        self.sparkles.retain(|s| !s.is_expired(now));
        before - self.sparkles.len()
    }

    pub fn active(&self, now: f32) -> impl Iterator<Item = &Sparkle> + '_ {
        self.sparkles.iter().filter(move |s| s.is_alive(now))
    }

    pub fn len(&self) -> usize {
        self.sparkles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sparkles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total_spawned(&self) -> u64 {
        self.total_spawned
    }

    pub fn clear(&mut self) {
        self.sparkles.clear();
        self.carry = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn push_past_capacity_recycles_oldest() {
        let mut pool = SparklePool::new(3);
        for i in 0..4 {
            pool.push(Sparkle::new(Vec3::ZERO, i as f32, 10.0));
        }
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.total_spawned(), 4);
        let births: Vec<f32> = pool.active(3.5).map(|s| s.birth_time).collect();
        assert_eq!(births, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn spawn_carries_fractional_rate() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut pool = SparklePool::new(100);
        // 10/s at 60 fps: 1/6 per frame
        let mut total = 0;
        for frame in 0..60 {
            total += pool.spawn(frame as f32 / 60.0, 1.0 / 60.0, 10.0, 5.0, &mut rng);
        }
        assert!((9..=10).contains(&total), "spawned {total}");
    }

    #[test]
    fn spawn_is_bounded_by_capacity() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut pool = SparklePool::new(16);
        let n = pool.spawn(0.0, 3600.0, 500.0, 1.0, &mut rng);
        assert_eq!(n, 16);
        assert_eq!(pool.len(), 16);
    }

    #[test]
    fn spawned_sparkles_stay_in_cube() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut pool = SparklePool::new(512);
        pool.spawn(0.0, 1.0, 512.0, 1.0, &mut rng);
        for s in pool.active(0.5) {
            for c in s.position {
                assert!((-1.5..=1.5).contains(&c));
            }
        }
    }

    #[test]
    fn retire_drops_expired_behind_long_lived() {
        let mut pool = SparklePool::new(10);
        pool.push(Sparkle::new(Vec3::ZERO, 0.0, 5.0));
        pool.push(Sparkle::new(Vec3::ZERO, 1.0, 0.2));
        pool.push(Sparkle::new(Vec3::ZERO, 1.1, 0.2));
        assert_eq!(pool.retire(2.0), 2);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.active(2.0).count(), 1);
    }

    #[test]
    fn retire_drops_expired_front() {
        let mut pool = SparklePool::new(10);
        pool.push(Sparkle::new(Vec3::ZERO, 0.0, 1.0));
        pool.push(Sparkle::new(Vec3::ZERO, 0.5, 1.0));
        pool.push(Sparkle::new(Vec3::ZERO, 2.0, 1.0));
        assert_eq!(pool.retire(1.6), 2);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.active(2.5).count(), 1);
    }

    #[test]
    fn fade_runs_from_one_to_zero() {
        let s = Sparkle::new(Vec3::ZERO, 1.0, 2.0);
        assert_eq!(s.fade(1.0), 1.0);
        assert_eq!(s.fade(2.0), 0.5);
        assert_eq!(s.fade(5.0), 0.0);
        assert!(!s.is_alive(3.0));
        assert!(!s.is_alive(0.5));
    }

    #[test]
    fn zero_capacity_pool_stays_empty() {
        let mut pool = SparklePool::new(0);
        pool.push(Sparkle::default());
        assert!(pool.is_empty());
    }
}
