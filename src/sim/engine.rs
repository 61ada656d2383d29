//! Comfort-constrained curtailment and same-day reallocation engine.
//!
//! Each household is simulated independently in two passes over the slot
//! series. Pass 1 curtails flexible load during high-carbon slots, limited
//! by the household's daily energy budget, daily shifted-hours cap, and a
//! once-per-day participation draw. Pass 2 redistributes each day's
//! curtailed energy into that day's low-carbon slots so daily energy is
//! conserved whenever at least one target slot exists.

use std::collections::HashMap;

use rand::{Rng, rngs::StdRng};

use crate::carbon::SlotIndex;
use crate::population::Household;
use crate::profile;

use super::types::{
    DEMAND_FLOOR_KW, HouseholdTimeSeries, MIN_PEAK_KW_FOR_HOURS, SLOT_HOURS, gaussian_noise,
};

/// Tuning knobs for the curtailment engine.
#[derive(Debug, Clone, Copy)]
pub struct EngineParams {
    /// Intensity at or above which a slot is curtailed (gCO2/kWh).
    pub high_threshold: f32,
    /// Standard deviation of the per-slot multiplicative baseline noise.
    pub baseline_noise_std: f32,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            high_threshold: super::types::DEFAULT_HIGH_THRESHOLD,
            baseline_noise_std: 0.05,
        }
    }
}

/// Simulates every household against the slot index.
///
/// The RNG is consumed in household order; within a household, the baseline
/// noise draws come first, then the per-day participation draws in slot
/// order. Identical seed and input reproduce identical output.
pub fn run(
    households: &[Household],
    index: &SlotIndex,
    params: &EngineParams,
    rng: &mut StdRng,
) -> Vec<HouseholdTimeSeries> {
    households
        .iter()
        .map(|hh| simulate_household(hh, index, params, rng))
        .collect()
}

/// Runs both passes for a single household and returns its demand series.
pub fn simulate_household(
    household: &Household,
    index: &SlotIndex,
    params: &EngineParams,
    rng: &mut StdRng,
) -> HouseholdTimeSeries {
    let n_slots = index.len();
    let peak = household.peak_demand_kw;

    // Baseline = duck curve * peak, with small per-slot noise.
    let mut baseline_kw = Vec::with_capacity(n_slots);
    for t in 0..n_slots {
        let shape = profile::baseline_multiplier(index.half_hour_of_day[t]);
        let noise = 1.0 + gaussian_noise(rng, params.baseline_noise_std);
        baseline_kw.push((shape * peak * noise).max(DEMAND_FLOOR_KW));
    }

    let flex_available_kw: Vec<f32> = (0..n_slots)
        .map(|t| baseline_kw[t] * profile::flexible_fraction(index.half_hour_of_day[t]))
        .collect();

    let mut shifted_kw = baseline_kw.clone();
    let mut shift_amount_kw = vec![0.0_f32; n_slots];

    if index.n_days == 0 {
        return HouseholdTimeSeries {
            baseline_kw,
            shifted_kw,
            shift_amount_kw,
        };
    }

    // The daily budget is a fraction of the whole run's baseline divided by
    // the day count, applied uniformly to every day. Note this is a raw
    // kW-sum, not a kWh figure.
    let baseline_sum: f32 = baseline_kw.iter().sum();
    let max_daily_shift_energy =
        household.max_shift_fraction * baseline_sum / index.n_days as f32;

    // Pass 1: curtail flexible load during high-carbon slots.
    let mut responded_today: HashMap<usize, bool> = HashMap::new();
    let mut energy_shifted_today: HashMap<usize, f32> = HashMap::new();

    for t in 0..n_slots {
        if index.intensity[t] < params.high_threshold {
            continue;
        }
        let day = index.day_of_slot[t];

        // Participation is decided once per day, on the first high-carbon
        // slot encountered.
        let responds = *responded_today
            .entry(day)
            .or_insert_with(|| rng.random::<f32>() < household.p_respond);
        if !responds {
            continue;
        }

        let spent_kwh = energy_shifted_today.entry(day).or_insert(0.0);
        let hours_so_far = *spent_kwh / peak.max(MIN_PEAK_KW_FOR_HOURS);
        if hours_so_far >= household.max_shift_hours {
            continue;
        }
        if *spent_kwh >= max_daily_shift_energy {
            continue;
        }

        let remaining_kwh = max_daily_shift_energy - *spent_kwh;
        let curtail_kw = flex_available_kw[t].min(remaining_kwh / SLOT_HOURS);

        shifted_kw[t] = (shifted_kw[t] - curtail_kw).max(DEMAND_FLOOR_KW);
        // The demand floor can reduce the applied curtailment below the
        // requested amount; record what actually happened.
        let applied_kw = baseline_kw[t] - shifted_kw[t];
        shift_amount_kw[t] = applied_kw;
        *spent_kwh += applied_kw * SLOT_HOURS;
    }

    // Pass 2: re-add each day's curtailed energy to its low-carbon slots.
    for day in 0..index.n_days {
        let day_slots = index.slots_of_day(day);
        if day_slots.is_empty() {
            continue;
        }

        let curtailed_kwh: f32 =
            day_slots.iter().map(|&t| shift_amount_kw[t]).sum::<f32>() * SLOT_HOURS;
        if curtailed_kwh <= 0.0 {
            continue;
        }

        let targets = reallocation_targets(index, &day_slots);
        if targets.is_empty() {
            continue;
        }

        let add_per_slot_kw = curtailed_kwh / (targets.len() as f32 * SLOT_HOURS);
        for t in targets {
            shifted_kw[t] += add_per_slot_kw;
        }
    }

    HouseholdTimeSeries {
        baseline_kw,
        shifted_kw,
        shift_amount_kw,
    }
}

/// Picks the day's reallocation target slots.
///
/// Preference order: below-median slots inside the preferred windows
/// (00:00–06:00, 10:00–14:00), then any below-median slot, then the day's
/// first six slots. The last fallback is not necessarily low-carbon; it
/// keeps energy accounted for on days with flat intensity.
fn reallocation_targets(index: &SlotIndex, day_slots: &[usize]) -> Vec<usize> {
    let day_intensities: Vec<f32> = day_slots.iter().map(|&t| index.intensity[t]).collect();
    let median = median(&day_intensities);

    let below_median: Vec<usize> = day_slots
        .iter()
        .copied()
        .filter(|&t| index.intensity[t] < median)
        .collect();

    let preferred: Vec<usize> = below_median
        .iter()
        .copied()
        .filter(|&t| {
            let h = index.half_hour_of_day[t] as f32 / 2.0;
            h < 6.0 || (10.0..14.0).contains(&h)
        })
        .collect();

    if !preferred.is_empty() {
        preferred
    } else if !below_median.is_empty() {
        below_median
    } else {
        day_slots[..day_slots.len().min(6)].to_vec()
    }
}

/// Median with even-length averaging; 0.0 for an empty slice.
fn median(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f32::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
