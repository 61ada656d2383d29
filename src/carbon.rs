//! Carbon-intensity input records and the aligned slot index.
//!
//! The upstream collaborator supplies an ordered sequence of half-hourly
//! records shaped like the UK National Grid intensity API payload. This
//! module turns them into the aligned arrays the engine iterates over:
//! timestamps, half-hour-of-day index, day index, and effective intensity.

use std::fmt;

use serde::Deserialize;

/// Forecast/actual intensity pair for one slot (gCO2/kWh).
///
/// Either side may be null upstream; [`IntensityReading::effective`] applies
/// the actual-preferred fallback chain.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct IntensityReading {
    /// Forecast intensity, if published.
    #[serde(default)]
    pub forecast: Option<f32>,
    /// Metered intensity, if available (preferred).
    #[serde(default)]
    pub actual: Option<f32>,
}

impl IntensityReading {
    /// Effective intensity: `actual` if present, else `forecast`, else 0.
    ///
    /// A slot missing both readings is modeled as zero-carbon: it will never
    /// be curtailed and may attract reallocated energy.
    pub fn effective(&self) -> f32 {
        self.actual.or(self.forecast).unwrap_or(0.0)
    }
}

/// One half-hour carbon-intensity record as received from the collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct CarbonSlot {
    /// Slot start, ISO-8601 UTC, half-hour aligned (e.g. `2026-01-31T14:30Z`).
    pub from: String,
    /// Slot end.
    pub to: String,
    /// Intensity readings for the slot.
    pub intensity: IntensityReading,
}

/// Errors raised while building the slot index.
#[derive(Debug)]
pub enum InputError {
    /// The carbon series is empty; the simulation has no time base.
    EmptySeries,
    /// A `from` timestamp could not be parsed.
    MalformedTimestamp {
        /// Index of the offending slot.
        index: usize,
        /// The raw timestamp value.
        value: String,
    },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySeries => write!(f, "carbon input error: empty slot series"),
            Self::MalformedTimestamp { index, value } => write!(
                f,
                "carbon input error: malformed timestamp \"{value}\" at slot {index}"
            ),
        }
    }
}

/// Aligned per-slot arrays derived from the carbon series.
///
/// Read-only input to the engine. The slot count and the set of calendar
/// days are whatever the timestamps imply; a nominal week is 336 slots over
/// 7 days but nothing here assumes that.
#[derive(Debug, Clone)]
pub struct SlotIndex {
    /// Slot start timestamps, in input order.
    pub from: Vec<String>,
    /// Slot end timestamps.
    pub to: Vec<String>,
    /// Half-hour-of-day index per slot (0–47).
    pub half_hour_of_day: Vec<usize>,
    /// Day index per slot (position of the slot's calendar day in the
    /// sorted set of distinct days).
    pub day_of_slot: Vec<usize>,
    /// Effective intensity per slot (gCO2/kWh).
    pub intensity: Vec<f32>,
    /// Number of distinct calendar days in the series.
    pub n_days: usize,
}

impl SlotIndex {
    /// Builds the index from the raw slot records.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::EmptySeries`] for empty input and
    /// [`InputError::MalformedTimestamp`] when a `from` timestamp cannot be
    /// parsed.
    pub fn build(slots: &[CarbonSlot]) -> Result<Self, InputError> {
        if slots.is_empty() {
            return Err(InputError::EmptySeries);
        }

        let mut from = Vec::with_capacity(slots.len());
        let mut to = Vec::with_capacity(slots.len());
        let mut half_hour_of_day = Vec::with_capacity(slots.len());
        let mut intensity = Vec::with_capacity(slots.len());
        let mut day_keys: Vec<&str> = Vec::with_capacity(slots.len());

        for (i, slot) in slots.iter().enumerate() {
            let (day, hod) =
                parse_from_timestamp(&slot.from).ok_or_else(|| InputError::MalformedTimestamp {
                    index: i,
                    value: slot.from.clone(),
                })?;
            from.push(slot.from.clone());
            to.push(slot.to.clone());
            half_hour_of_day.push(hod);
            intensity.push(slot.intensity.effective());
            day_keys.push(day);
        }

        let mut unique_days: Vec<&str> = day_keys.clone();
        unique_days.sort_unstable();
        unique_days.dedup();

        let day_of_slot = day_keys
            .iter()
            .map(|d| unique_days.binary_search(d).unwrap_or(0))
            .collect();

        Ok(Self {
            from,
            to,
            half_hour_of_day,
            day_of_slot,
            intensity,
            n_days: unique_days.len(),
        })
    }

    /// Number of slots in the index.
    pub fn len(&self) -> usize {
        self.intensity.len()
    }

    /// Returns `true` if the index has no slots (never the case for a
    /// successfully built index).
    pub fn is_empty(&self) -> bool {
        self.intensity.is_empty()
    }

    /// Slot positions belonging to the given day, in chronological order.
    pub fn slots_of_day(&self, day: usize) -> Vec<usize> {
        (0..self.len())
            .filter(|&t| self.day_of_slot[t] == day)
            .collect()
    }
}

/// Parses `YYYY-MM-DDTHH:MM[..]` into the calendar-day prefix and the
/// half-hour-of-day index. Returns `None` for anything that does not fit.
fn parse_from_timestamp(ts: &str) -> Option<(&str, usize)> {
    if ts.len() < 16 || ts.as_bytes().get(10) != Some(&b'T') {
        return None;
    }
    let hour: usize = ts.get(11..13)?.parse().ok()?;
    let minute: usize = ts.get(14..16)?.parse().ok()?;
    if hour >= 24 || minute >= 60 {
        return None;
    }
    let hod = hour * 2 + usize::from(minute >= 30);
    Some((&ts[..10], hod))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(from: &str, actual: Option<f32>, forecast: Option<f32>) -> CarbonSlot {
        CarbonSlot {
            from: from.to_string(),
            to: from.to_string(),
            intensity: IntensityReading { forecast, actual },
        }
    }

    #[test]
    fn half_hour_index_from_timestamp() {
        assert_eq!(parse_from_timestamp("2026-01-31T14:30Z"), Some(("2026-01-31", 29)));
        assert_eq!(parse_from_timestamp("2026-01-31T00:00Z"), Some(("2026-01-31", 0)));
        assert_eq!(parse_from_timestamp("2026-01-31T23:30Z"), Some(("2026-01-31", 47)));
        // seconds suffix is tolerated
        assert_eq!(
            parse_from_timestamp("2026-01-31T06:00:00Z"),
            Some(("2026-01-31", 12))
        );
    }

    #[test]
    fn malformed_timestamps_rejected() {
        assert_eq!(parse_from_timestamp("2026-01-31 14:30"), None);
        assert_eq!(parse_from_timestamp("garbage"), None);
        assert_eq!(parse_from_timestamp("2026-01-31T25:00Z"), None);
        assert_eq!(parse_from_timestamp("2026-01-31T14:71Z"), None);
    }

    #[test]
    fn actual_preferred_over_forecast() {
        assert_eq!(
            IntensityReading {
                actual: Some(210.0),
                forecast: Some(190.0)
            }
            .effective(),
            210.0
        );
        assert_eq!(
            IntensityReading {
                actual: None,
                forecast: Some(190.0)
            }
            .effective(),
            190.0
        );
        assert_eq!(IntensityReading::default().effective(), 0.0);
    }

    #[test]
    fn empty_series_is_fatal() {
        assert!(matches!(
            SlotIndex::build(&[]),
            Err(InputError::EmptySeries)
        ));
    }

    #[test]
    fn day_indices_follow_sorted_distinct_days() {
        let slots = vec![
            slot("2026-01-06T00:00Z", Some(100.0), None),
            slot("2026-01-06T00:30Z", Some(120.0), None),
            slot("2026-01-07T00:00Z", Some(140.0), None),
            slot("2026-01-05T23:30Z", Some(90.0), None),
        ];
        let index = SlotIndex::build(&slots).expect("index should build");
        assert_eq!(index.n_days, 3);
        assert_eq!(index.day_of_slot, vec![1, 1, 2, 0]);
        assert_eq!(index.half_hour_of_day, vec![0, 1, 0, 47]);
        assert_eq!(index.slots_of_day(1), vec![0, 1]);
        assert_eq!(index.slots_of_day(0), vec![3]);
    }

    #[test]
    fn malformed_slot_reports_position() {
        let slots = vec![
            slot("2026-01-06T00:00Z", Some(100.0), None),
            slot("not-a-timestamp", Some(100.0), None),
        ];
        match SlotIndex::build(&slots) {
            Err(InputError::MalformedTimestamp { index, value }) => {
                assert_eq!(index, 1);
                assert_eq!(value, "not-a-timestamp");
            }
            other => panic!("expected MalformedTimestamp, got {other:?}"),
        }
    }

    #[test]
    fn deserializes_api_shaped_json() {
        let json = r#"[
            {"from": "2026-01-31T14:00Z", "to": "2026-01-31T14:30Z",
             "intensity": {"forecast": 180, "actual": 195}},
            {"from": "2026-01-31T14:30Z", "to": "2026-01-31T15:00Z",
             "intensity": {"forecast": 175, "actual": null}}
        ]"#;
        let slots: Vec<CarbonSlot> = serde_json::from_str(json).expect("json should parse");
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].intensity.effective(), 195.0);
        assert_eq!(slots[1].intensity.effective(), 175.0);
    }
}
