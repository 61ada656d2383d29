//! Simulator entry point — CLI wiring, input loading, and artifact export.

use std::path::{Path, PathBuf};
use std::process;

use rand::{SeedableRng, rngs::StdRng};

use flex_sim::carbon::SlotIndex;
use flex_sim::config::ScenarioConfig;
use flex_sim::io::export::{export_aggregates_csv, export_flex_responses, export_household_series};
use flex_sim::io::input::{CarbonSource, load_with_fallback};
use flex_sim::population;
use flex_sim::sim::engine::{self, EngineParams};
use flex_sim::sim::report::SimulationReport;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    input_override: Option<String>,
    out_dir_override: Option<String>,
}

fn print_help() {
    eprintln!("flex-sim — community demand-flexibility and carbon-shifting simulator");
    eprintln!();
    eprintln!("Usage: flex-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>   Load scenario from TOML config file");
    eprintln!("  --preset <name>     Use a built-in preset (baseline, large_community,");
    eprintln!("                      eager_responders)");
    eprintln!("  --seed <u64>        Override random seed");
    eprintln!("  --input <path>      Override carbon input JSON path");
    eprintln!("  --out-dir <path>    Override artifact output directory");
    eprintln!("  --help              Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        input_override: None,
        out_dir_override: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--input" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --input requires a path argument");
                    process::exit(1);
                }
                cli.input_override = Some(args[i].clone());
            }
            "--out-dir" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --out-dir requires a path argument");
                    process::exit(1);
                }
                cli.out_dir_override = Some(args[i].clone());
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Prints the console run report: summary, top earner, sample event.
fn print_run_report(report: &SimulationReport) {
    println!("{}", report.summary);

    // Top earner breakdown.
    let top = report
        .totals
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.tokens_earned.total_cmp(&b.tokens_earned));
    if let Some((hi, totals)) = top {
        let hh = &report.households[hi];
        println!();
        println!("Top earner: {}", hh.id);
        println!("  Assets          : {}", hh.flex_assets);
        println!("  Max shift frac  : {:.0}%", hh.max_shift_fraction * 100.0);
        println!("  Shifted (kWh)   : {:.2}", totals.total_shifted_kwh);
        println!("  Carbon avoided  : {:.0} gCO2", totals.carbon_avoided_g);
        println!("  Tokens earned   : {:.1}", totals.tokens_earned);
    }

    // Sample high-carbon event.
    if let Some(event) = report.events.iter().find(|e| e.flex_requested) {
        println!();
        println!("Sample high-carbon event:");
        println!("  Slot     : {} -> {}", event.from, event.to);
        println!("  Intensity: {} gCO2/kWh", event.intensity_actual);
        println!("  Shifted  : {} kW", event.aggregate_shifted_kw);
        println!(
            "  Responded: {} / {}",
            event.participants.len(),
            report.summary.n_households
        );
    }
}

fn main() {
    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then baseline default
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    // Apply CLI overrides
    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(input) = cli.input_override {
        scenario.input.carbon_path = input;
    }
    if let Some(out_dir) = cli.out_dir_override {
        scenario.output.out_dir = out_dir;
    }

    // Validate
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Load the carbon series (pre-fetched by the upstream collaborator)
    let primary = PathBuf::from(&scenario.input.carbon_path);
    let fallback = scenario.input.fallback_path.as_ref().map(PathBuf::from);
    let (slots, source) = match load_with_fallback(&primary, fallback.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    if source == CarbonSource::Fallback {
        eprintln!(
            "warning: \"{}\" unavailable, using fallback carbon data",
            primary.display()
        );
    }

    let index = match SlotIndex::build(&slots) {
        Ok(index) => index,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    // Run: population first, then per-household simulation, single RNG stream
    let mut rng = StdRng::seed_from_u64(scenario.simulation.seed);
    let params = scenario.population.params();
    let households = population::generate(scenario.simulation.households, &params, &mut rng);

    let engine_params = EngineParams {
        high_threshold: scenario.simulation.high_threshold_gco2,
        baseline_noise_std: scenario.population.baseline_noise_std,
    };
    let series = engine::run(&households, &index, &engine_params, &mut rng);

    let report = SimulationReport::build(
        households,
        series,
        &index,
        scenario.simulation.high_threshold_gco2,
    );

    print_run_report(&report);

    // Export the three artifacts
    let out_dir = PathBuf::from(&scenario.output.out_dir);
    let flex_path = out_dir.join(&scenario.output.flex_responses);
    let series_path = out_dir.join(&scenario.output.household_series);
    let csv_path = out_dir.join(&scenario.output.aggregates);

    finish_export(export_flex_responses(&report, &flex_path), &flex_path);
    finish_export(export_household_series(&report, &series_path), &series_path);
    finish_export(export_aggregates_csv(&report, &csv_path), &csv_path);
}

/// Reports one artifact export, exiting on failure.
fn finish_export(result: std::io::Result<()>, path: &Path) {
    match result {
        Ok(()) => println!("Wrote {}", path.display()),
        Err(e) => {
            eprintln!("error: failed to write \"{}\": {e}", path.display());
            process::exit(1);
        }
    }
}
