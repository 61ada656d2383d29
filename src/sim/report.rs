//! Reward computation and community aggregation.
//!
//! Everything downstream of the engine is derived here, once, into a single
//! [`SimulationReport`]; the three persisted artifacts are independent
//! renderings of this model and never recompute anything.

use std::fmt;

use serde::Serialize;

use crate::carbon::SlotIndex;
use crate::population::Household;

use super::types::{HouseholdTimeSeries, PARTICIPANT_THRESHOLD_KW, SLOT_HOURS, round_dp};

/// One household's contribution to a high-carbon slot event.
#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    /// Household identifier.
    pub id: String,
    /// Curtailment at this slot (kW, 3 dp).
    pub shifted_kw: f32,
}

/// Per-slot event record for the structured result artifact.
#[derive(Debug, Clone, Serialize)]
pub struct SlotEvent {
    /// Slot start timestamp.
    pub from: String,
    /// Slot end timestamp.
    pub to: String,
    /// Integer effective intensity (gCO2/kWh).
    pub intensity_actual: i64,
    /// Whether flexibility was requested (high-carbon slot).
    pub flex_requested: bool,
    /// Households that curtailed more than the noise threshold here.
    pub participants: Vec<Participant>,
    /// Community curtailment at this slot (kW, 3 dp).
    pub aggregate_shifted_kw: f32,
}

/// Scalar aggregates over the whole run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Number of simulated households.
    pub n_households: usize,
    /// Number of slots in the carbon series.
    pub total_slots: usize,
    /// Number of high-carbon slots.
    pub high_carbon_slots: usize,
    /// Community energy shifted out of high-carbon slots (kWh).
    pub total_shifted_kwh: f32,
    /// Mean participant count over high-carbon events.
    pub avg_participants_per_event: f32,
    /// Peak demand reduction from baseline to shifted (%).
    pub peak_demand_reduction_pct: f32,
    /// Total carbon avoided (gCO2, whole grams).
    #[serde(rename = "total_carbon_avoided_gCO2")]
    pub total_carbon_avoided_g: f32,
    /// Total reward tokens issued (1 token = 1 kg CO2 avoided).
    pub total_tokens_issued: f32,
    /// Peak community baseline demand (kW).
    pub peak_baseline_kw: f32,
    /// Peak community shifted demand (kW).
    pub peak_shifted_kw: f32,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Flexibility Run Summary ---")?;
        writeln!(f, "Households             : {}", self.n_households)?;
        writeln!(f, "Total slots            : {}", self.total_slots)?;
        writeln!(f, "High-carbon slots      : {}", self.high_carbon_slots)?;
        writeln!(f, "Total shifted (kWh)    : {:.2}", self.total_shifted_kwh)?;
        writeln!(
            f,
            "Avg participants/event : {:.1}",
            self.avg_participants_per_event
        )?;
        writeln!(f, "Peak demand baseline   : {:.1} kW", self.peak_baseline_kw)?;
        writeln!(f, "Peak demand shifted    : {:.1} kW", self.peak_shifted_kw)?;
        writeln!(
            f,
            "Peak reduction         : {:.1}%",
            self.peak_demand_reduction_pct
        )?;
        writeln!(
            f,
            "Carbon avoided         : {:.0} gCO2",
            self.total_carbon_avoided_g
        )?;
        write!(f, "Tokens issued          : {:.1}", self.total_tokens_issued)
    }
}

/// Per-household reward totals, rounded to their publication precision.
#[derive(Debug, Clone, Serialize)]
pub struct HouseholdTotals {
    /// Energy this household shifted out of high-carbon slots (kWh, 2 dp).
    pub total_shifted_kwh: f32,
    /// Carbon avoided (gCO2, whole grams).
    #[serde(rename = "carbon_avoided_gCO2")]
    pub carbon_avoided_g: f32,
    /// Tokens earned (1 dp).
    pub tokens_earned: f32,
    /// Share of the household's total demand that was shifted (%, 1 dp).
    pub pct_demand_shifted: f32,
}

/// Canonical in-memory result of one simulation run.
///
/// Derived once from the engine output and the slot index; never mutated
/// afterwards. Sole input to the output adapter.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// High-carbon threshold the run was classified with (gCO2/kWh).
    pub high_threshold: f32,
    /// Slot start timestamps, in input order.
    pub timestamps: Vec<String>,
    /// Effective per-slot intensity (gCO2/kWh).
    pub intensities: Vec<f32>,
    /// Static household parameters, in generation order.
    pub households: Vec<Household>,
    /// Per-household demand series, aligned with `households`.
    pub series: Vec<HouseholdTimeSeries>,
    /// Per-household reward totals, aligned with `households`.
    pub totals: Vec<HouseholdTotals>,
    /// Per-slot event records.
    pub events: Vec<SlotEvent>,
    /// Community baseline demand per slot (kW).
    pub aggregate_baseline_kw: Vec<f32>,
    /// Community shifted demand per slot (kW).
    pub aggregate_shifted_kw: Vec<f32>,
    /// Community curtailment per slot (kW).
    pub aggregate_curtailed_kw: Vec<f32>,
    /// Scalar summary aggregates.
    pub summary: Summary,
}

impl SimulationReport {
    /// Derives the full report from the engine output.
    ///
    /// `households` and `series` must be aligned (same order and length);
    /// each series must span the index's slot count.
    pub fn build(
        households: Vec<Household>,
        series: Vec<HouseholdTimeSeries>,
        index: &SlotIndex,
        high_threshold: f32,
    ) -> Self {
        let n_slots = index.len();
        let n_households = households.len();

        // Community per-slot sums.
        let mut aggregate_baseline_kw = vec![0.0_f32; n_slots];
        let mut aggregate_shifted_kw = vec![0.0_f32; n_slots];
        let mut aggregate_curtailed_kw = vec![0.0_f32; n_slots];
        for ts in &series {
            for t in 0..n_slots {
                aggregate_baseline_kw[t] += ts.baseline_kw[t];
                aggregate_shifted_kw[t] += ts.shifted_kw[t];
                aggregate_curtailed_kw[t] += ts.shift_amount_kw[t];
            }
        }

        // Rewards: per day, the benefit of shifting is the gap between a
        // high-carbon slot and that day's cleanest slot.
        let mut shifted_kwh_raw = vec![0.0_f32; n_households];
        let mut carbon_avoided_raw = vec![0.0_f32; n_households];
        let mut tokens_raw = vec![0.0_f32; n_households];

        for day in 0..index.n_days {
            let day_slots = index.slots_of_day(day);
            let day_low = day_slots
                .iter()
                .map(|&t| index.intensity[t])
                .fold(f32::INFINITY, f32::min);
            if !day_low.is_finite() {
                continue;
            }

            for &t in &day_slots {
                if index.intensity[t] < high_threshold {
                    continue;
                }
                let delta = index.intensity[t] - day_low;
                for (hi, ts) in series.iter().enumerate() {
                    let shifted_kw = ts.shift_amount_kw[t];
                    if shifted_kw > 0.0 {
                        let shifted_kwh = shifted_kw * SLOT_HOURS;
                        shifted_kwh_raw[hi] += shifted_kwh;
                        carbon_avoided_raw[hi] += shifted_kwh * delta;
                        tokens_raw[hi] += shifted_kwh * delta / 1000.0;
                    }
                }
            }
        }

        // Per-slot events with the publication rounding applied.
        let mut events = Vec::with_capacity(n_slots);
        let mut total_shifted_kwh = 0.0_f32;
        for t in 0..n_slots {
            let intensity_actual = index.intensity[t] as i64;
            let flex_requested = intensity_actual as f32 >= high_threshold;

            let mut participants = Vec::new();
            let mut aggregate_kw = 0.0_f32;
            if flex_requested {
                for (hi, ts) in series.iter().enumerate() {
                    let sk = ts.shift_amount_kw[t];
                    if sk > PARTICIPANT_THRESHOLD_KW {
                        participants.push(Participant {
                            id: households[hi].id.clone(),
                            shifted_kw: round_dp(sk, 3),
                        });
                        aggregate_kw += sk;
                    }
                }
                aggregate_kw = round_dp(aggregate_kw, 3);
                total_shifted_kwh += aggregate_kw * SLOT_HOURS;
            }

            events.push(SlotEvent {
                from: index.from[t].clone(),
                to: index.to[t].clone(),
                intensity_actual,
                flex_requested,
                participants,
                aggregate_shifted_kw: aggregate_kw,
            });
        }

        let totals: Vec<HouseholdTotals> = (0..n_households)
            .map(|hi| {
                let baseline_kwh: f32 = series[hi].baseline_kw.iter().sum::<f32>() * SLOT_HOURS;
                let pct = if baseline_kwh > 0.0 {
                    shifted_kwh_raw[hi] / baseline_kwh * 100.0
                } else {
                    0.0
                };
                HouseholdTotals {
                    total_shifted_kwh: round_dp(shifted_kwh_raw[hi], 2),
                    carbon_avoided_g: round_dp(carbon_avoided_raw[hi], 0),
                    tokens_earned: round_dp(tokens_raw[hi], 1),
                    pct_demand_shifted: round_dp(pct, 1),
                }
            })
            .collect();

        let peak_baseline_kw = aggregate_baseline_kw.iter().copied().fold(0.0, f32::max);
        let peak_shifted_kw = aggregate_shifted_kw.iter().copied().fold(0.0, f32::max);
        let peak_demand_reduction_pct = if peak_baseline_kw > 0.0 {
            round_dp((1.0 - peak_shifted_kw / peak_baseline_kw) * 100.0, 1)
        } else {
            0.0
        };

        let high_events: Vec<&SlotEvent> = events.iter().filter(|e| e.flex_requested).collect();
        let avg_participants = if high_events.is_empty() {
            0.0
        } else {
            high_events.iter().map(|e| e.participants.len() as f32).sum::<f32>()
                / high_events.len() as f32
        };

        let summary = Summary {
            n_households,
            total_slots: n_slots,
            high_carbon_slots: high_events.len(),
            total_shifted_kwh: round_dp(total_shifted_kwh, 2),
            avg_participants_per_event: round_dp(avg_participants, 1),
            peak_demand_reduction_pct,
            total_carbon_avoided_g: round_dp(carbon_avoided_raw.iter().sum(), 0),
            total_tokens_issued: round_dp(tokens_raw.iter().sum(), 1),
            peak_baseline_kw: round_dp(peak_baseline_kw, 1),
            peak_shifted_kw: round_dp(peak_shifted_kw, 1),
        };

        Self {
            high_threshold,
            timestamps: index.from.clone(),
            intensities: index.intensity.clone(),
            households,
            series,
            totals,
            events,
            aggregate_baseline_kw,
            aggregate_shifted_kw,
            aggregate_curtailed_kw,
            summary,
        }
    }
}
