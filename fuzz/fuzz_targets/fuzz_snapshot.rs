#![no_main]

//! Snapshot document fuzzer.
//!
//! Arbitrary bytes parsed as a snapshot must either fail cleanly or yield a
//! grid that passes the invariant checks and survives a tick.

use cellchain::world::check_invariants;
use cellchain::{EngineConfig, GridSnapshot, ScriptedRandom, SimulationEngine};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(snapshot) = serde_json::from_slice::<GridSnapshot>(data) else {
        return;
    };
    // Keep the grid small enough to tick quickly.
    if usize::from(snapshot.width) * usize::from(snapshot.height) > 4096 {
        return;
    }
    let Ok(grid) = snapshot.into_grid() else {
        return;
    };
    assert!(check_invariants(&grid, false).is_empty());

    let mut engine =
        SimulationEngine::new(grid, EngineConfig::default(), ScriptedRandom::default()).unwrap();
    engine.step();
    assert!(check_invariants(engine.grid(), false).is_empty());
});
