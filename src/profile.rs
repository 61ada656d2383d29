//! Static residential demand-shape functions shared by every household.
//!
//! Both curves are indexed by half-hour-of-day (0–47) and are pure: the
//! only per-household variation comes from peak demand scaling and
//! multiplicative noise applied by the engine.

/// Number of half-hour slots in one day.
pub const HALF_HOURS_PER_DAY: usize = 48;

/// Baseline demand multiplier for a half-hour-of-day index.
///
/// A typical UK winter residential "duck curve": overnight trough, morning
/// ramp, late-morning dip, midday plateau, evening ramp to peak, taper,
/// wind-down, late-night trough. Piecewise-linear with breakpoints at
/// 6h, 8h, 12h, 16h, 18h, 21h, and 23h.
pub fn baseline_multiplier(half_hour_of_day: usize) -> f32 {
    let h = (half_hour_of_day % HALF_HOURS_PER_DAY) as f32 / 2.0;
    if h < 6.0 {
        0.3
    } else if h < 8.0 {
        0.3 + 0.7 * (h - 6.0) / 2.0
    } else if h < 12.0 {
        0.85 - 0.15 * (h - 8.0) / 4.0
    } else if h < 16.0 {
        0.7
    } else if h < 18.0 {
        0.7 + 0.6 * (h - 16.0) / 2.0
    } else if h < 21.0 {
        1.3 - 0.1 * (h - 18.0) / 3.0
    } else if h < 23.0 {
        1.0 - 0.5 * (h - 21.0) / 2.0
    } else {
        0.35
    }
}

/// Fraction of baseline demand that is flexible at a half-hour-of-day index.
///
/// High overnight (EV charging, batteries), moderate during the day
/// (dishwasher, laundry), low during the evening peak where cooking and
/// lighting dominate.
pub fn flexible_fraction(half_hour_of_day: usize) -> f32 {
    let h = (half_hour_of_day % HALF_HOURS_PER_DAY) as f32 / 2.0;
    if h < 6.0 {
        0.7
    } else if h < 9.0 {
        0.4
    } else if h < 16.0 {
        0.5
    } else if h < 20.0 {
        0.15
    } else {
        0.6
    }
}
