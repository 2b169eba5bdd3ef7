//! The simulation thread.
//!
//! One dedicated thread owns the tick cadence. It is the only code that
//! mutates the world; snapshot builders share the same coarse lock and
//! take it only for the duration of a read-and-serialise step.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use warren_core::World;

/// Configuration for the simulation loop.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 10.0,
            max_ticks: 0,
        }
    }
}

/// Run the fixed-timestep simulation loop. Blocks the calling thread.
pub fn run(world: Arc<Mutex<World>>, config: SimConfig) {
    let tick_duration = Duration::from_secs_f64(1.0 / config.tick_rate);
    let mut ticks = 0u64;
    info!(
        tick_rate = config.tick_rate,
        max_ticks = config.max_ticks,
        "simulation starting"
    );

    loop {
        let start = Instant::now();
        {
            let mut world = world.lock().expect("world lock poisoned");
            world.tick();
        }
        ticks += 1;
        if config.max_ticks > 0 && ticks >= config.max_ticks {
            info!(ticks, "simulation complete");
            break;
        }

        let elapsed = start.elapsed();
        if elapsed < tick_duration {
            std::thread::sleep(tick_duration - elapsed);
        } else {
            warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = tick_duration.as_millis() as u64,
                "tick exceeded time budget"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_limited_ticks_advances_clock() {
        let world = Arc::new(Mutex::new(World::new(0)));
        let config = SimConfig {
            tick_rate: 1000.0, // fast for testing
            max_ticks: 5,
        };
        run(world.clone(), config);
        // The clock starts at 1, so five ticks land on 6.
        assert_eq!(world.lock().unwrap().time(), 6);
    }
}
