//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::population::PopulationParams;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the baseline scenario. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation-wide parameters.
    pub simulation: SimulationConfig,
    /// Household synthesis parameters.
    pub population: PopulationConfig,
    /// Carbon input file locations.
    pub input: InputConfig,
    /// Artifact file names.
    pub output: OutputConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self::baseline()
    }
}

/// Simulation-wide parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of households to synthesize (must be > 0).
    pub households: usize,
    /// Master random seed.
    pub seed: u64,
    /// High-carbon classification threshold (gCO2/kWh, must be > 0).
    pub high_threshold_gco2: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            households: 25,
            seed: 42,
            high_threshold_gco2: 150.0,
        }
    }
}

/// Household synthesis parameters.
///
/// Defaults reproduce the baseline population; overriding them lets a
/// scenario explore different comfort envelopes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PopulationConfig {
    /// Mean peak demand (kW).
    pub peak_demand_mean_kw: f32,
    /// Peak demand standard deviation (kW).
    pub peak_demand_std_kw: f32,
    /// Lower clamp on peak demand (kW, must be > 0).
    pub peak_demand_floor_kw: f32,
    /// Per-slot multiplicative baseline noise standard deviation.
    pub baseline_noise_std: f32,
    /// Uniform range for the flexible fraction of daily energy.
    pub shift_fraction_min: f32,
    /// Upper bound of the shift-fraction range.
    pub shift_fraction_max: f32,
    /// Uniform range for daily shiftable hours.
    pub shift_hours_min: f32,
    /// Upper bound of the shift-hours range.
    pub shift_hours_max: f32,
    /// Uniform range for daily response probability.
    pub p_respond_min: f32,
    /// Upper bound of the response-probability range.
    pub p_respond_max: f32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        let p = PopulationParams::default();
        Self {
            peak_demand_mean_kw: p.peak_demand_mean_kw,
            peak_demand_std_kw: p.peak_demand_std_kw,
            peak_demand_floor_kw: p.peak_demand_floor_kw,
            baseline_noise_std: 0.05,
            shift_fraction_min: p.shift_fraction_min,
            shift_fraction_max: p.shift_fraction_max,
            shift_hours_min: p.shift_hours_min,
            shift_hours_max: p.shift_hours_max,
            p_respond_min: p.p_respond_min,
            p_respond_max: p.p_respond_max,
        }
    }
}

impl PopulationConfig {
    /// Converts the config section into generator parameters.
    pub fn params(&self) -> PopulationParams {
        PopulationParams {
            peak_demand_mean_kw: self.peak_demand_mean_kw,
            peak_demand_std_kw: self.peak_demand_std_kw,
            peak_demand_floor_kw: self.peak_demand_floor_kw,
            shift_fraction_min: self.shift_fraction_min,
            shift_fraction_max: self.shift_fraction_max,
            shift_hours_min: self.shift_hours_min,
            shift_hours_max: self.shift_hours_max,
            p_respond_min: self.p_respond_min,
            p_respond_max: self.p_respond_max,
        }
    }
}

/// Carbon input file locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Primary carbon series file (JSON array of slot records).
    pub carbon_path: String,
    /// Offline fallback file tried when the primary is unreadable.
    pub fallback_path: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            carbon_path: "data/carbon_week.json".to_string(),
            fallback_path: Some("data/carbon_week_fallback.json".to_string()),
        }
    }
}

/// Artifact file names, resolved against the output directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Output directory for all artifacts.
    pub out_dir: String,
    /// Structured result JSON file name.
    pub flex_responses: String,
    /// Per-household time-series JSON file name.
    pub household_series: String,
    /// Community aggregates CSV file name.
    pub aggregates: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            out_dir: "data".to_string(),
            flex_responses: "flex_responses.json".to_string(),
            household_series: "households.json".to_string(),
            aggregates: "aggregates.csv".to_string(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.households"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Returns the baseline scenario: 25 households, seed 42, 150 g
    /// threshold, default comfort ranges.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            population: PopulationConfig::default(),
            input: InputConfig::default(),
            output: OutputConfig::default(),
        }
    }

    /// Returns the large-community preset: 100 households, otherwise baseline.
    pub fn large_community() -> Self {
        Self {
            simulation: SimulationConfig {
                households: 100,
                ..SimulationConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Returns the eager-responders preset: households almost always
    /// participate and tolerate longer shifts.
    pub fn eager_responders() -> Self {
        Self {
            population: PopulationConfig {
                p_respond_min: 0.85,
                p_respond_max: 1.0,
                shift_hours_min: 3.0,
                shift_hours_max: 5.0,
                ..PopulationConfig::default()
            },
            ..Self::baseline()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "large_community", "eager_responders"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "large_community" => Ok(Self::large_community()),
            "eager_responders" => Ok(Self::eager_responders()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let s = &self.simulation;
        if s.households == 0 {
            errors.push(ConfigError {
                field: "simulation.households".into(),
                message: "must be > 0".into(),
            });
        }
        if !(s.high_threshold_gco2 > 0.0 && s.high_threshold_gco2.is_finite()) {
            errors.push(ConfigError {
                field: "simulation.high_threshold_gco2".into(),
                message: "must be a positive finite number".into(),
            });
        }

        let p = &self.population;
        if p.peak_demand_floor_kw <= 0.0 {
            errors.push(ConfigError {
                field: "population.peak_demand_floor_kw".into(),
                message: "must be > 0".into(),
            });
        }
        if p.peak_demand_std_kw < 0.0 {
            errors.push(ConfigError {
                field: "population.peak_demand_std_kw".into(),
                message: "must be >= 0".into(),
            });
        }
        if p.baseline_noise_std < 0.0 {
            errors.push(ConfigError {
                field: "population.baseline_noise_std".into(),
                message: "must be >= 0".into(),
            });
        }
        if p.shift_fraction_min > p.shift_fraction_max {
            errors.push(ConfigError {
                field: "population.shift_fraction_min".into(),
                message: "must be <= population.shift_fraction_max".into(),
            });
        }
        if !(0.0..=1.0).contains(&p.shift_fraction_min)
            || !(0.0..=1.0).contains(&p.shift_fraction_max)
        {
            errors.push(ConfigError {
                field: "population.shift_fraction_max".into(),
                message: "shift fractions must be in [0.0, 1.0]".into(),
            });
        }
        if p.shift_hours_min > p.shift_hours_max {
            errors.push(ConfigError {
                field: "population.shift_hours_min".into(),
                message: "must be <= population.shift_hours_max".into(),
            });
        }
        if p.p_respond_min > p.p_respond_max {
            errors.push(ConfigError {
                field: "population.p_respond_min".into(),
                message: "must be <= population.p_respond_max".into(),
            });
        }
        if !(0.0..=1.0).contains(&p.p_respond_min) || !(0.0..=1.0).contains(&p.p_respond_max) {
            errors.push(ConfigError {
                field: "population.p_respond_max".into(),
                message: "response probabilities must be in [0.0, 1.0]".into(),
            });
        }

        if self.input.carbon_path.is_empty() {
            errors.push(ConfigError {
                field: "input.carbon_path".into(),
                message: "must not be empty".into(),
            });
        }
        if self.output.out_dir.is_empty() {
            errors.push(ConfigError {
                field: "output.out_dir".into(),
                message: "must not be empty".into(),
            });
        }

        errors
    }
}
