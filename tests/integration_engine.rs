//! Integration tests for the full population run over a synthetic week.

mod common;

use flex_sim::carbon::SlotIndex;
use flex_sim::population::{self, PopulationParams};
use flex_sim::sim::engine::{self, EngineParams};
use flex_sim::sim::types::{DEMAND_FLOOR_KW, SLOT_HOURS};

use rand::{SeedableRng, rngs::StdRng};

#[test]
fn full_run_produces_aligned_series() {
    let report = common::run_synthetic(7, 25, 42);
    assert_eq!(report.timestamps.len(), 7 * 48);
    assert_eq!(report.households.len(), 25);
    assert_eq!(report.series.len(), 25);
    for ts in &report.series {
        assert_eq!(ts.baseline_kw.len(), 7 * 48);
        assert_eq!(ts.shifted_kw.len(), 7 * 48);
        assert_eq!(ts.shift_amount_kw.len(), 7 * 48);
    }
}

#[test]
fn daily_energy_is_conserved_per_household() {
    let report = common::run_synthetic(7, 25, 42);
    for ts in &report.series {
        for day in 0..7 {
            let start = day * 48;
            let end = start + 48;
            let base_kwh: f32 = ts.baseline_kw[start..end].iter().sum::<f32>() * SLOT_HOURS;
            let shifted_kwh: f32 = ts.shifted_kw[start..end].iter().sum::<f32>() * SLOT_HOURS;
            assert!(
                (base_kwh - shifted_kwh).abs() < 1e-3,
                "day {day} energy not conserved: baseline={base_kwh} shifted={shifted_kwh}"
            );
        }
    }
}

#[test]
fn curtailment_only_occurs_at_high_carbon_slots() {
    let report = common::run_synthetic(7, 25, 42);
    for ts in &report.series {
        for (t, &sk) in ts.shift_amount_kw.iter().enumerate() {
            if sk > 0.0 {
                assert!(
                    report.intensities[t] >= report.high_threshold,
                    "curtailment at low-carbon slot {t} ({} gCO2)",
                    report.intensities[t]
                );
            }
        }
    }
}

#[test]
fn shifted_demand_respects_floor_everywhere() {
    let report = common::run_synthetic(7, 25, 42);
    for ts in &report.series {
        for &kw in &ts.shifted_kw {
            assert!(kw >= DEMAND_FLOOR_KW - 1e-6, "demand below floor: {kw}");
        }
        for &kw in &ts.baseline_kw {
            assert!(kw >= DEMAND_FLOOR_KW - 1e-6);
        }
    }
}

#[test]
fn identical_seeds_produce_identical_runs() {
    let a = common::run_synthetic(7, 25, 99);
    let b = common::run_synthetic(7, 25, 99);
    assert_eq!(a.series, b.series);
    assert_eq!(a.summary.total_tokens_issued, b.summary.total_tokens_issued);
    assert_eq!(a.households.len(), b.households.len());
    for (ha, hb) in a.households.iter().zip(&b.households) {
        assert_eq!(ha.id, hb.id);
        assert_eq!(ha.peak_demand_kw, hb.peak_demand_kw);
        assert_eq!(ha.p_respond, hb.p_respond);
        assert_eq!(ha.flex_assets, hb.flex_assets);
    }
}

#[test]
fn different_seeds_produce_different_populations() {
    let a = common::run_synthetic(2, 10, 1);
    let b = common::run_synthetic(2, 10, 2);
    let any_diff = a
        .households
        .iter()
        .zip(&b.households)
        .any(|(ha, hb)| ha.peak_demand_kw != hb.peak_demand_kw);
    assert!(any_diff);
}

#[test]
fn zero_high_carbon_week_is_a_no_op() {
    // Clamp every slot below the threshold; nothing should move.
    let mut slots = common::synthetic_week(3);
    for slot in &mut slots {
        slot.intensity.actual = Some(90.0);
        slot.intensity.forecast = Some(90.0);
    }
    let index = SlotIndex::build(&slots).expect("index should build");

    let mut rng = StdRng::seed_from_u64(42);
    let households = population::generate(10, &PopulationParams::default(), &mut rng);
    let series = engine::run(&households, &index, &EngineParams::default(), &mut rng);

    for ts in &series {
        assert!(ts.shift_amount_kw.iter().all(|&s| s == 0.0));
        assert_eq!(ts.shifted_kw, ts.baseline_kw);
    }
}

#[test]
fn daily_budget_bounds_total_curtailment() {
    let report = common::run_synthetic(7, 25, 42);
    for (hh, ts) in report.households.iter().zip(&report.series) {
        let baseline_sum: f32 = ts.baseline_kw.iter().sum();
        let daily_budget_kwh = hh.max_shift_fraction * baseline_sum / 7.0;
        for day in 0..7 {
            let start = day * 48;
            let spent_kwh: f32 =
                ts.shift_amount_kw[start..start + 48].iter().sum::<f32>() * SLOT_HOURS;
            // One slot may overshoot the remaining budget; allow a single
            // slot's worth of flexible energy on top.
            let max_slot_kwh = ts.baseline_kw[start..start + 48]
                .iter()
                .copied()
                .fold(0.0_f32, f32::max)
                * SLOT_HOURS;
            assert!(
                spent_kwh <= daily_budget_kwh + max_slot_kwh + 1e-4,
                "{}: day {day} spent {spent_kwh} kWh over budget {daily_budget_kwh}",
                hh.id
            );
        }
    }
}
