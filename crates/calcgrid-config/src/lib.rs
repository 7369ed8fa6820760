//! # Calcgrid Config
//!
//! Unified single-file configuration for the Calcgrid binaries.
//! A single `calcgrid.yaml` configures the server listen address, the
//! per-operator artificial compute times, agent concurrency, dispatch
//! redelivery, and observability settings. Every field has a default, and a
//! handful of environment variables override the file for deployment
//! tweaks without editing it.

mod loader;

pub use loader::{load_config, load_config_or_default, ConfigError};

use serde::Deserialize;

/// Top-level configuration schema for Calcgrid.
#[derive(Debug, Clone, Deserialize)]
pub struct CalcgridConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub operations: OperationsConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for CalcgridConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            operations: OperationsConfig::default(),
            agent: AgentConfig::default(),
            dispatch: DispatchConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address the orchestrator listens on.
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

/// Artificial compute-cost hints per operator, in milliseconds.
/// Handed to agents unchanged on every task.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OperationsConfig {
    #[serde(default = "default_add_sub_ms")]
    pub addition_ms: u64,
    #[serde(default = "default_add_sub_ms")]
    pub subtraction_ms: u64,
    #[serde(default = "default_mul_div_ms")]
    pub multiplication_ms: u64,
    #[serde(default = "default_mul_div_ms")]
    pub division_ms: u64,
}

impl Default for OperationsConfig {
    fn default() -> Self {
        Self {
            addition_ms: default_add_sub_ms(),
            subtraction_ms: default_add_sub_ms(),
            multiplication_ms: default_mul_div_ms(),
            division_ms: default_mul_div_ms(),
        }
    }
}

fn default_add_sub_ms() -> u64 {
    1000
}

fn default_mul_div_ms() -> u64 {
    2000
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Number of concurrent worker loops one agent process runs.
    #[serde(default = "default_computing_power")]
    pub computing_power: usize,
    /// Base URL of the orchestrator the agent pulls tasks from.
    #[serde(default = "default_orchestrator_url")]
    pub orchestrator_url: String,
    /// How long a worker sleeps when no task is available.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            computing_power: default_computing_power(),
            orchestrator_url: default_orchestrator_url(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_computing_power() -> usize {
    4
}

fn default_orchestrator_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DispatchConfig {
    /// When set, a claimed task whose result has not arrived within this
    /// many milliseconds is returned to the pending queue for redelivery.
    /// Unset disables reclaiming.
    #[serde(default)]
    pub claim_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
