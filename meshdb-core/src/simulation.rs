//! Simulation seams: latency, randomness and wall-clock time
//!
//! Every coordinator that models latency awaits a [`Delay`] exactly once,
//! every random outcome is drawn from a [`Chance`], and every timestamp comes
//! from a [`Clock`]. Production code uses [`TokioDelay`], [`ThreadChance`] or
//! [`SeededChance`], and [`SystemClock`]; tests swap in [`InstantDelay`],
//! [`FixedChance`] and [`FixedClock`].

use crate::config::SimulationConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Source of simulated latency
#[async_trait]
pub trait Delay: Send + Sync {
    /// Suspend the calling operation for `duration`
    async fn pause(&self, duration: Duration);
}

/// Real timer backed by `tokio::time::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Delay that returns immediately and records what was requested
#[derive(Debug, Default)]
pub struct InstantDelay {
    requested: Mutex<Vec<Duration>>,
}

impl InstantDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Durations requested so far, in call order
    pub fn requested(&self) -> Vec<Duration> {
        self.requested.lock().clone()
    }

    /// Number of suspensions so far
    pub fn count(&self) -> usize {
        self.requested.lock().len()
    }
}

#[async_trait]
impl Delay for InstantDelay {
    async fn pause(&self, duration: Duration) {
        self.requested.lock().push(duration);
        tokio::task::yield_now().await;
    }
}

/// Source of uniform random draws
pub trait Chance: Send + Sync {
    /// Uniform draw in `[0, 1)`
    fn draw(&self) -> f64;

    /// Uniform draw in `[low, high)`
    fn between(&self, low: f64, high: f64) -> f64 {
        low + self.draw() * (high - low)
    }

    /// Uniform integer in `low..=high`
    fn int_inclusive(&self, low: u32, high: u32) -> u32 {
        let span = (high - low + 1) as f64;
        low + ((self.draw() * span).floor() as u32).min(high - low)
    }
}

/// Unseeded draws from the thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadChance;

impl Chance for ThreadChance {
    fn draw(&self) -> f64 {
        rand::thread_rng().gen_range(0.0..1.0)
    }
}

/// Reproducible draws from a seeded generator
pub struct SeededChance {
    rng: Mutex<StdRng>,
}

impl SeededChance {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Chance for SeededChance {
    fn draw(&self) -> f64 {
        self.rng.lock().gen_range(0.0..1.0)
    }
}

impl fmt::Debug for SeededChance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededChance").finish_non_exhaustive()
    }
}

/// Always returns the same draw, clamped into `[0, 1)`
#[derive(Debug, Clone, Copy)]
pub struct FixedChance(f64);

impl FixedChance {
    pub fn new(value: f64) -> Self {
        Self(value.clamp(0.0, 1.0 - f64::EPSILON))
    }
}

impl Chance for FixedChance {
    fn draw(&self) -> f64 {
        self.0
    }
}

/// Source of wall-clock timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Calls [`Utc::now`]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Frozen clock
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// The bundle of seams handed to every coordinator
#[derive(Clone)]
pub struct Runtime {
    pub delay: Arc<dyn Delay>,
    pub chance: Arc<dyn Chance>,
    pub clock: Arc<dyn Clock>,
}

impl Runtime {
    /// Real timers, system clock, and a seeded or thread RNG depending on
    /// `config.seed`
    pub fn from_config(config: &SimulationConfig) -> Self {
        let chance: Arc<dyn Chance> = match config.seed {
            Some(seed) => Arc::new(SeededChance::new(seed)),
            None => Arc::new(ThreadChance),
        };
        Self {
            delay: Arc::new(TokioDelay),
            chance,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_chance(mut self, chance: Arc<dyn Chance>) -> Self {
        self.chance = chance;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime").finish_non_exhaustive()
    }
}
