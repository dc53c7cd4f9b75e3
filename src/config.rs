//! Configuration types for trade-journal

use crate::fees::{AdValoremFees, PerContractFees, PerShareFees};
use crate::telemetry::LogFormat;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
///
/// Every section is optional; a missing file section falls back to the
/// defaults the journal has always used.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub fees: FeeConfig,
    #[serde(default)]
    pub discipline: DisciplineConfig,
    #[serde(default)]
    pub sizing: SizingConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Broker fee schedules
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FeeConfig {
    /// US listed options
    #[serde(default)]
    pub option: PerContractFees,
    /// US cash equities
    #[serde(default)]
    pub equity: PerShareFees,
    /// HK warrants/CBBCs and HK cash equities
    #[serde(default)]
    pub hk: AdValoremFees,
}

/// How fees are charged against partial exits
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeeBasis {
    /// Each exit pays the round-trip fee of its own slice
    #[default]
    Slice,
    /// The planned round-trip fee is spread pro-rata over the exits
    Position,
}

/// Which executions extend the consecutive-loss streak
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LossStreakPolicy {
    /// Any losing execution extends the streak, any non-negative one resets it
    #[default]
    AnyExit,
    /// Only losing stop-outs extend the streak
    StopOnly,
}

/// Trading discipline rules
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisciplineConfig {
    /// Realized daily loss (positive amount) that locks new openings
    #[serde(default = "default_daily_loss_limit")]
    pub daily_loss_limit: Decimal,

    /// Losing streak length that triggers the cooldown warning
    #[serde(default = "default_consecutive_loss_limit")]
    pub consecutive_loss_limit: u32,

    /// Hard cap on principal committed to a single trade
    #[serde(default)]
    pub max_principal_per_trade: Option<Decimal>,

    /// Projected stop-out loss above which a plan is flagged
    #[serde(default = "default_max_loss_per_trade")]
    pub max_loss_per_trade: Option<Decimal>,

    /// Risk/reward below which a plan is flagged
    #[serde(default = "default_min_risk_reward")]
    pub min_risk_reward: Decimal,

    /// Minimum entry rationale length (0 = not required)
    #[serde(default)]
    pub min_rationale_len: usize,

    #[serde(default)]
    pub fee_basis: FeeBasis,

    #[serde(default)]
    pub loss_streak: LossStreakPolicy,
}

fn default_daily_loss_limit() -> Decimal {
    Decimal::new(2000, 0)
}
fn default_consecutive_loss_limit() -> u32 {
    3
}
fn default_max_loss_per_trade() -> Option<Decimal> {
    Some(Decimal::new(500, 0))
}
fn default_min_risk_reward() -> Decimal {
    Decimal::new(15, 1) // 1.5
}

impl Default for DisciplineConfig {
    fn default() -> Self {
        Self {
            daily_loss_limit: default_daily_loss_limit(),
            consecutive_loss_limit: default_consecutive_loss_limit(),
            max_principal_per_trade: None,
            max_loss_per_trade: default_max_loss_per_trade(),
            min_risk_reward: default_min_risk_reward(),
            min_rationale_len: 0,
            fee_basis: FeeBasis::default(),
            loss_streak: LossStreakPolicy::default(),
        }
    }
}

/// Position sizing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SizingConfig {
    /// Account capital used for risk-based sizing; sizing checks are skipped when unset
    #[serde(default)]
    pub capital: Option<Decimal>,

    /// Percentage of capital risked per trade (1.0 = 1%)
    #[serde(default = "default_risk_pct")]
    pub risk_pct: Decimal,

    /// Suggested stop distance below entry, in percent
    #[serde(default = "default_stop_pct")]
    pub default_stop_pct: Decimal,
}

fn default_risk_pct() -> Decimal {
    Decimal::ONE
}
fn default_stop_pct() -> Decimal {
    Decimal::new(20, 0)
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            capital: None,
            risk_pct: default_risk_pct(),
            default_stop_pct: default_stop_pct(),
        }
    }
}

/// Where the journal keeps its CSV files
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./journal")
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
