//! Renders the three persisted artifacts from one simulation report.
//!
//! All three are views over the same [`SimulationReport`]; nothing is
//! recomputed here beyond formatting and the per-field rounding the
//! downstream consumers expect.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::sim::report::{SimulationReport, SlotEvent, Summary};
use crate::sim::types::round_dp;

/// Column header for the community aggregates CSV.
const AGGREGATES_HEADER: &str =
    "timestamp,intensity_gCO2,baseline_kw,shifted_kw,curtailed_kw,is_high_carbon";

/// Structured result document (`flex_responses.json`).
#[derive(Serialize)]
struct FlexResponsesDoc<'a> {
    summary: &'a Summary,
    households: Vec<HouseholdRecord<'a>>,
    events: &'a [SlotEvent],
}

/// Static household parameters plus reward totals.
#[derive(Serialize)]
struct HouseholdRecord<'a> {
    id: &'a str,
    peak_demand_kw: f32,
    max_shift_fraction: f32,
    max_shift_hours: f32,
    p_respond: f32,
    flex_assets: &'a str,
    total_shifted_kwh: f32,
    #[serde(rename = "carbon_avoided_gCO2")]
    carbon_avoided_g: f32,
    tokens_earned: f32,
}

/// Time-series document (`households.json`).
#[derive(Serialize)]
struct HouseholdSeriesDoc<'a> {
    timestamps: &'a [String],
    intensities: Vec<i64>,
    high_threshold: i64,
    households: Vec<HouseholdSeriesRecord<'a>>,
    aggregate_baseline_kw: Vec<f32>,
    aggregate_shifted_kw: Vec<f32>,
}

/// One household's parameters, totals, and full demand series.
#[derive(Serialize)]
struct HouseholdSeriesRecord<'a> {
    id: &'a str,
    peak_demand_kw: f32,
    flex_assets: &'a str,
    max_shift_fraction: f32,
    max_shift_hours: f32,
    total_shifted_kwh: f32,
    #[serde(rename = "carbon_avoided_gCO2")]
    carbon_avoided_g: f32,
    tokens_earned: f32,
    pct_demand_shifted: f32,
    baseline_kw: Vec<f32>,
    shifted_kw: Vec<f32>,
}

/// Writes the structured result JSON (pretty-printed) to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if serialization or writing fails.
pub fn write_flex_responses(report: &SimulationReport, writer: impl Write) -> io::Result<()> {
    let households = report
        .households
        .iter()
        .zip(&report.totals)
        .map(|(hh, totals)| HouseholdRecord {
            id: &hh.id,
            peak_demand_kw: hh.peak_demand_kw,
            max_shift_fraction: hh.max_shift_fraction,
            max_shift_hours: hh.max_shift_hours,
            p_respond: hh.p_respond,
            flex_assets: &hh.flex_assets,
            total_shifted_kwh: totals.total_shifted_kwh,
            carbon_avoided_g: totals.carbon_avoided_g,
            tokens_earned: totals.tokens_earned,
        })
        .collect();

    let doc = FlexResponsesDoc {
        summary: &report.summary,
        households,
        events: &report.events,
    };
    serde_json::to_writer_pretty(writer, &doc).map_err(io::Error::other)
}

/// Writes the per-household time-series JSON (compact; this file is large).
///
/// # Errors
///
/// Returns an `io::Error` if serialization or writing fails.
pub fn write_household_series(report: &SimulationReport, writer: impl Write) -> io::Result<()> {
    let households = report
        .households
        .iter()
        .zip(&report.series)
        .zip(&report.totals)
        .map(|((hh, series), totals)| HouseholdSeriesRecord {
            id: &hh.id,
            peak_demand_kw: hh.peak_demand_kw,
            flex_assets: &hh.flex_assets,
            max_shift_fraction: hh.max_shift_fraction,
            max_shift_hours: hh.max_shift_hours,
            total_shifted_kwh: totals.total_shifted_kwh,
            carbon_avoided_g: totals.carbon_avoided_g,
            tokens_earned: totals.tokens_earned,
            pct_demand_shifted: totals.pct_demand_shifted,
            baseline_kw: series.baseline_kw.iter().map(|&x| round_dp(x, 3)).collect(),
            shifted_kw: series.shifted_kw.iter().map(|&x| round_dp(x, 3)).collect(),
        })
        .collect();

    let doc = HouseholdSeriesDoc {
        timestamps: &report.timestamps,
        intensities: report.intensities.iter().map(|&x| x as i64).collect(),
        high_threshold: report.high_threshold as i64,
        households,
        aggregate_baseline_kw: report
            .aggregate_baseline_kw
            .iter()
            .map(|&x| round_dp(x, 2))
            .collect(),
        aggregate_shifted_kw: report
            .aggregate_shifted_kw
            .iter()
            .map(|&x| round_dp(x, 2))
            .collect(),
    };
    serde_json::to_writer(writer, &doc).map_err(io::Error::other)
}

/// Writes the community aggregates CSV (one row per slot) to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_aggregates_csv(report: &SimulationReport, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(AGGREGATES_HEADER.split(','))?;

    for t in 0..report.timestamps.len() {
        let is_high = report.intensities[t] >= report.high_threshold;
        wtr.write_record(&[
            report.timestamps[t].clone(),
            (report.intensities[t] as i64).to_string(),
            format!("{:.2}", report.aggregate_baseline_kw[t]),
            format!("{:.2}", report.aggregate_shifted_kw[t]),
            format!("{:.2}", report.aggregate_curtailed_kw[t]),
            if is_high { "1" } else { "0" }.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports one artifact to a file path using the given writer function.
fn export_to_path(
    path: &Path,
    write_fn: impl FnOnce(io::BufWriter<File>) -> io::Result<()>,
) -> io::Result<()> {
    let file = File::create(path)?;
    write_fn(io::BufWriter::new(file))
}

/// Exports the structured result JSON to a file.
///
/// # Errors
///
/// Returns an `io::Error` if file creation, serialization, or writing fails.
pub fn export_flex_responses(report: &SimulationReport, path: &Path) -> io::Result<()> {
    export_to_path(path, |w| write_flex_responses(report, w))
}

/// Exports the per-household time-series JSON to a file.
///
/// # Errors
///
/// Returns an `io::Error` if file creation, serialization, or writing fails.
pub fn export_household_series(report: &SimulationReport, path: &Path) -> io::Result<()> {
    export_to_path(path, |w| write_household_series(report, w))
}

/// Exports the community aggregates CSV to a file.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_aggregates_csv(report: &SimulationReport, path: &Path) -> io::Result<()> {
    export_to_path(path, |w| write_aggregates_csv(report, w))
}
