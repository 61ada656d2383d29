//! Core per-household series types, model constants, and shared numeric helpers.

use rand::{Rng, rngs::StdRng};

/// Duration of one slot in hours (half-hourly grid data).
pub const SLOT_HOURS: f32 = 0.5;

/// Minimum demand a household can be curtailed down to (kW).
pub const DEMAND_FLOOR_KW: f32 = 0.05;

/// Default carbon-intensity threshold above which a slot counts as
/// high-carbon (gCO2/kWh).
pub const DEFAULT_HIGH_THRESHOLD: f32 = 150.0;

/// Peak demand floor used when converting shifted energy to shifted hours,
/// guarding the division for degenerate households.
pub const MIN_PEAK_KW_FOR_HOURS: f32 = 0.1;

/// Minimum per-slot curtailment for a household to count as an event
/// participant (kW). Filters floating-point noise, not real participation.
pub const PARTICIPANT_THRESHOLD_KW: f32 = 0.001;

/// Per-household demand series produced by the curtailment engine.
///
/// All three vectors have one entry per carbon slot. `shift_amount` is the
/// actually-applied curtailment (>= 0, zero outside curtailed slots), so for
/// any day with at least one reallocation target the shifted series
/// conserves the baseline's daily energy.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdTimeSeries {
    /// Unmodified demand (kW per slot).
    pub baseline_kw: Vec<f32>,
    /// Demand after curtailment and reallocation (kW per slot).
    pub shifted_kw: Vec<f32>,
    /// Curtailment applied at each slot (kW, >= 0).
    pub shift_amount_kw: Vec<f32>,
}

impl HouseholdTimeSeries {
    /// Number of slots covered by the series.
    pub fn len(&self) -> usize {
        self.baseline_kw.len()
    }

    /// Returns `true` if the series covers no slots.
    pub fn is_empty(&self) -> bool {
        self.baseline_kw.is_empty()
    }
}

/// Gaussian noise via the Box-Muller transform.
///
/// Returns a sample from N(0, std_dev^2), or 0.0 when `std_dev <= 0`.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f32) -> f32 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f32 = rng.random::<f32>().clamp(1e-6, 1.0);
    let u2: f32 = rng.random::<f32>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
    z0 * std_dev
}

/// Rounds to the given number of decimal places.
///
/// Boundary artifacts carry 0–3 decimal places per field; this keeps the
/// convention in one place.
pub fn round_dp(value: f32, decimals: u32) -> f32 {
    let factor = 10_f32.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn gaussian_noise_zero_std_is_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(gaussian_noise(&mut rng, 0.0), 0.0);
        assert_eq!(gaussian_noise(&mut rng, -1.0), 0.0);
    }

    #[test]
    fn gaussian_noise_is_deterministic_per_seed() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..16 {
            assert_eq!(gaussian_noise(&mut a, 0.5), gaussian_noise(&mut b, 0.5));
        }
    }

    #[test]
    fn round_dp_conventions() {
        assert_eq!(round_dp(1.2345, 2), 1.23);
        assert_eq!(round_dp(1.235, 1), 1.2);
        assert_eq!(round_dp(1234.6, 0), 1235.0);
        assert_eq!(round_dp(0.0004, 3), 0.0);
    }

    #[test]
    fn series_len_matches_baseline() {
        let ts = HouseholdTimeSeries {
            baseline_kw: vec![1.0; 4],
            shifted_kw: vec![1.0; 4],
            shift_amount_kw: vec![0.0; 4],
        };
        assert_eq!(ts.len(), 4);
        assert!(!ts.is_empty());
    }
}
