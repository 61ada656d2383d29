//! Shared test fixtures for integration tests.

use flex_sim::carbon::{CarbonSlot, IntensityReading, SlotIndex};
use flex_sim::population::{self, PopulationParams};
use flex_sim::sim::engine::{self, EngineParams};
use flex_sim::sim::report::SimulationReport;

use rand::{SeedableRng, rngs::StdRng};

/// Builds a synthetic multi-day half-hourly carbon series.
///
/// Each day has a morning low, a high-carbon evening ramp, and a midday
/// dip, so every day contains both curtailment and reallocation targets.
pub fn synthetic_week(n_days: usize) -> Vec<CarbonSlot> {
    let mut slots = Vec::with_capacity(n_days * 48);
    for day in 0..n_days {
        for slot in 0..48 {
            let hour = slot / 2;
            let intensity = match hour {
                0..=5 => 80.0,
                6..=9 => 140.0,
                10..=13 => 60.0,
                14..=16 => 130.0,
                17..=20 => 230.0,
                _ => 110.0,
            };
            let from = format!("2026-01-{:02}T{:02}:{:02}Z", 5 + day, hour, (slot % 2) * 30);
            let to = if slot == 47 {
                format!("2026-01-{:02}T00:00Z", 6 + day)
            } else {
                let next = slot + 1;
                format!(
                    "2026-01-{:02}T{:02}:{:02}Z",
                    5 + day,
                    next / 2,
                    (next % 2) * 30
                )
            };
            slots.push(CarbonSlot {
                from,
                to,
                intensity: IntensityReading {
                    forecast: Some(intensity),
                    actual: Some(intensity),
                },
            });
        }
    }
    slots
}

/// Runs a full simulation over the synthetic week and returns the report.
pub fn run_synthetic(n_days: usize, n_households: usize, seed: u64) -> SimulationReport {
    let slots = synthetic_week(n_days);
    let index = SlotIndex::build(&slots).expect("synthetic index should build");

    let mut rng = StdRng::seed_from_u64(seed);
    let params = PopulationParams::default();
    let households = population::generate(n_households, &params, &mut rng);

    let engine_params = EngineParams::default();
    let series = engine::run(&households, &index, &engine_params, &mut rng);

    SimulationReport::build(households, series, &index, engine_params.high_threshold)
}
