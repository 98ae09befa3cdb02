//! Configuration loading and typed config structures for the Demeter simulation.
//!
//! The canonical configuration lives in `demeter-config.yaml` at the project
//! root. Every field has a default, so an empty file (or no file at all)
//! yields the standard game: a 6x6 farm, 1000 money, 500 water, and gauges
//! starting at 50.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `demeter-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Session-level settings (seed, termination, probabilities).
    #[serde(default)]
    pub simulation: SessionConfig,

    /// Farm layout.
    #[serde(default)]
    pub farm: FarmConfig,

    /// Starting balances and action prices.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Gauge starting values and per-action deltas.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Environmental data settings.
    #[serde(default)]
    pub environment: EnvironmentConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `DEMETER_SEED` overrides `simulation.seed`
    /// - `DEMETER_MAX_CYCLES` overrides `simulation.max_cycles`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, applying environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML and
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.simulation.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| {
            Err(ConfigError::Invalid {
                reason: reason.to_owned(),
            })
        };
        for (name, p) in [
            ("simulation.event_chance", self.simulation.event_chance),
            ("simulation.drying_chance", self.simulation.drying_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid {
                    reason: format!("{name} must be within [0, 1], got {p}"),
                });
            }
        }
        if self.farm.rows == 0 || self.farm.cols == 0 {
            return invalid("farm.rows and farm.cols must be at least 1");
        }
        if self.simulation.max_cycles == Some(0) {
            return invalid("simulation.max_cycles must be at least 1 when set");
        }
        if self.economy.research_divisor <= Decimal::ZERO {
            return invalid("economy.research_divisor must be positive");
        }
        if self.economy.fertilizer_multiplier <= Decimal::ZERO {
            return invalid("economy.fertilizer_multiplier must be positive");
        }
        for (name, amount) in [
            ("economy.starting_money", self.economy.starting_money),
            ("economy.starting_water", self.economy.starting_water),
            ("economy.starting_research", self.economy.starting_research),
        ] {
            if amount < Decimal::ZERO {
                return Err(ConfigError::Invalid {
                    reason: format!("{name} must not be negative, got {amount}"),
                });
            }
        }
        let costs = [
            self.economy.seed_cost,
            self.economy.irrigation_cost,
            self.economy.fertilizer_cost,
            self.economy.pesticide_cost,
        ];
        if costs.iter().any(Decimal::is_sign_negative) {
            return invalid("economy action costs must not be negative");
        }
        Ok(())
    }
}

/// Session-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Cycle after which the game ends. `None` means open-ended.
    #[serde(default)]
    pub max_cycles: Option<u64>,

    /// Advisory session length used to scale environmental drift.
    #[serde(default = "default_advisory_horizon")]
    pub advisory_horizon: u64,

    /// Probability that a random event fires after a cycle.
    #[serde(default = "default_event_chance")]
    pub event_chance: f64,

    /// Probability that an unirrigated plot dries out during a cycle.
    #[serde(default = "default_drying_chance")]
    pub drying_chance: f64,

    /// Whether the welcome event is pending when the game starts.
    #[serde(default = "default_true")]
    pub intro_event: bool,
}

impl SessionConfig {
    /// Apply environment variable overrides. Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(seed) = std::env::var("DEMETER_SEED").ok().and_then(|v| v.parse().ok()) {
            self.seed = seed;
        }
        if let Ok(val) = std::env::var("DEMETER_MAX_CYCLES") {
            let val = val.trim();
            if val.is_empty() || val.eq_ignore_ascii_case("none") {
                self.max_cycles = None;
            } else if let Ok(max) = val.parse() {
                self.max_cycles = Some(max);
            }
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            max_cycles: None,
            advisory_horizon: default_advisory_horizon(),
            event_chance: default_event_chance(),
            drying_chance: default_drying_chance(),
            intro_event: true,
        }
    }
}

/// Farm layout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FarmConfig {
    /// Grid rows.
    #[serde(default = "default_grid_side")]
    pub rows: usize,

    /// Grid columns.
    #[serde(default = "default_grid_side")]
    pub cols: usize,

    /// Location selected at start.
    #[serde(default = "default_location")]
    pub location: String,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            rows: default_grid_side(),
            cols: default_grid_side(),
            location: default_location(),
        }
    }
}

/// Economy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EconomyConfig {
    /// Opening money balance.
    #[serde(default = "default_starting_money")]
    pub starting_money: Decimal,

    /// Opening water balance.
    #[serde(default = "default_starting_water")]
    pub starting_water: Decimal,

    /// Opening research balance.
    #[serde(default)]
    pub starting_research: Decimal,

    /// Money per planting.
    #[serde(default = "default_seed_cost")]
    pub seed_cost: Decimal,

    /// Water per irrigation.
    #[serde(default = "default_irrigation_cost")]
    pub irrigation_cost: Decimal,

    /// Money per fertilizer application.
    #[serde(default = "default_fertilizer_cost")]
    pub fertilizer_cost: Decimal,

    /// Money per pesticide application.
    #[serde(default = "default_pesticide_cost")]
    pub pesticide_cost: Decimal,

    /// Harvest payout multiplier for fertilized plots.
    #[serde(default = "default_fertilizer_multiplier")]
    pub fertilizer_multiplier: Decimal,

    /// Research points per harvest are `floor(payout / research_divisor)`.
    #[serde(default = "default_research_divisor")]
    pub research_divisor: Decimal,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_money: default_starting_money(),
            starting_water: default_starting_water(),
            starting_research: Decimal::ZERO,
            seed_cost: default_seed_cost(),
            irrigation_cost: default_irrigation_cost(),
            fertilizer_cost: default_fertilizer_cost(),
            pesticide_cost: default_pesticide_cost(),
            fertilizer_multiplier: default_fertilizer_multiplier(),
            research_divisor: default_research_divisor(),
        }
    }
}

/// Gauge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScoringConfig {
    /// Starting productivity.
    #[serde(default = "default_gauge")]
    pub initial_productivity: Decimal,

    /// Starting sustainability.
    #[serde(default = "default_gauge")]
    pub initial_sustainability: Decimal,

    /// Sustainability change per irrigation.
    #[serde(default = "default_irrigation_sustainability")]
    pub irrigation_sustainability: Decimal,

    /// Sustainability change per fertilizer application.
    #[serde(default = "default_fertilizer_sustainability")]
    pub fertilizer_sustainability: Decimal,

    /// Sustainability change per pesticide application.
    #[serde(default = "default_pesticide_sustainability")]
    pub pesticide_sustainability: Decimal,

    /// Productivity change per harvest.
    #[serde(default = "default_harvest_productivity")]
    pub harvest_productivity: Decimal,

    /// Productivity change per drone deployment.
    #[serde(default = "default_drone_productivity")]
    pub drone_productivity: Decimal,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            initial_productivity: default_gauge(),
            initial_sustainability: default_gauge(),
            irrigation_sustainability: default_irrigation_sustainability(),
            fertilizer_sustainability: default_fertilizer_sustainability(),
            pesticide_sustainability: default_pesticide_sustainability(),
            harvest_productivity: default_harvest_productivity(),
            drone_productivity: default_drone_productivity(),
        }
    }
}

/// Environmental data configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvironmentConfig {
    /// Whether the simulated tables drift every cycle.
    #[serde(default = "default_true")]
    pub drift: bool,

    /// File holding the saved location preference. `None` keeps it in
    /// memory only.
    #[serde(default)]
    pub preference_path: Option<PathBuf>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            drift: true,
            preference_path: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_advisory_horizon() -> u64 {
    365
}

const fn default_event_chance() -> f64 {
    0.25
}

const fn default_drying_chance() -> f64 {
    0.7
}

const fn default_true() -> bool {
    true
}

const fn default_grid_side() -> usize {
    6
}

fn default_location() -> String {
    demeter_world::environment::DEFAULT_LOCATION.to_owned()
}

const fn default_starting_money() -> Decimal {
    Decimal::from_parts(1000, 0, 0, false, 0)
}

const fn default_starting_water() -> Decimal {
    Decimal::from_parts(500, 0, 0, false, 0)
}

const fn default_seed_cost() -> Decimal {
    Decimal::TEN
}

const fn default_irrigation_cost() -> Decimal {
    Decimal::TEN
}

const fn default_fertilizer_cost() -> Decimal {
    Decimal::from_parts(15, 0, 0, false, 0)
}

const fn default_pesticide_cost() -> Decimal {
    Decimal::from_parts(20, 0, 0, false, 0)
}

const fn default_fertilizer_multiplier() -> Decimal {
    Decimal::from_parts(15, 0, 0, false, 1)
}

const fn default_research_divisor() -> Decimal {
    Decimal::TEN
}

const fn default_gauge() -> Decimal {
    Decimal::from_parts(50, 0, 0, false, 0)
}

const fn default_irrigation_sustainability() -> Decimal {
    Decimal::from_parts(5, 0, 0, false, 0)
}

const fn default_fertilizer_sustainability() -> Decimal {
    Decimal::from_parts(10, 0, 0, true, 0)
}

const fn default_pesticide_sustainability() -> Decimal {
    Decimal::from_parts(15, 0, 0, true, 0)
}

const fn default_harvest_productivity() -> Decimal {
    Decimal::TEN
}

const fn default_drone_productivity() -> Decimal {
    Decimal::from_parts(5, 0, 0, false, 0)
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_log_format() -> String {
    "pretty".to_owned()
}
