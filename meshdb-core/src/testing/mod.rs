//! Test helpers for MeshDB
//!
//! Engines here run on an in-memory store with delays recorded rather than
//! slept, so tests stay fast and deterministic.
//!
//! # Usage
//!
//! ```rust
//! use meshdb_core::testing::test_engine;
//!
//! # fn main() -> Result<(), meshdb_core::Error> {
//! let harness = test_engine()?;
//! assert!(harness.engine.nodes().list_nodes()?.is_empty());
//! assert_eq!(harness.delay.count(), 0);
//! # Ok(())
//! # }
//! ```

mod context;
mod gate;

pub use context::TestContext;
pub use gate::GatedDelay;

use crate::config::SimulationConfig;
use crate::engine::Engine;
use crate::simulation::{Chance, Delay, FixedChance, InstantDelay, Runtime, SystemClock};
use crate::store::{FileStore, Store};
use crate::Result;
use std::sync::Arc;

/// An engine plus the delay it records into
pub struct TestHarness {
    pub engine: Engine,
    pub delay: Arc<InstantDelay>,
}

fn runtime(delay: Arc<dyn Delay>, chance: Arc<dyn Chance>) -> Runtime {
    Runtime {
        delay,
        chance,
        clock: Arc::new(SystemClock),
    }
}

/// In-memory engine whose random draws are always `draw`
///
/// With the default commit probability a draw below 0.9 commits every
/// transaction and anything from 0.9 up rolls it back.
pub fn test_engine_with_draw(draw: f64) -> Result<TestHarness> {
    let delay = Arc::new(InstantDelay::new());
    let runtime = runtime(delay.clone(), Arc::new(FixedChance::new(draw)));
    let engine = Engine::with_runtime(Store::memory(), SimulationConfig::default(), runtime)?;
    Ok(TestHarness { engine, delay })
}

/// In-memory engine that commits every transaction
pub fn test_engine() -> Result<TestHarness> {
    test_engine_with_draw(0.0)
}

/// In-memory engine whose every suspension blocks on `gate`
pub fn gated_engine(gate: Arc<GatedDelay>) -> Result<Engine> {
    Engine::with_runtime(
        Store::memory(),
        SimulationConfig::default(),
        runtime(gate, Arc::new(FixedChance::new(0.0))),
    )
}

/// File-backed engine in a fresh temporary directory
///
/// Keep the returned context alive for as long as the engine is used.
pub fn setup_file_engine() -> Result<(Engine, TestContext)> {
    let ctx = TestContext::new()?;
    let store = FileStore::open(ctx.path())?;
    let runtime = runtime(Arc::new(InstantDelay::new()), Arc::new(FixedChance::new(0.0)));
    let engine = Engine::with_runtime(Store::new(store), SimulationConfig::default(), runtime)?;
    Ok((engine, ctx))
}
