//! Configuration model loaded from `config/*.yaml` and `APP_*` variables.

use std::env;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

fn default_event_buffer() -> usize {
    1024
}

fn default_invitation_ttl_hours() -> i64 {
    168
}

fn default_low_balance_threshold() -> i64 {
    10_000
}

fn default_overdue_sweep_interval_secs() -> u64 {
    3600
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub database_url: String,
    /// HS256 key for session tokens and the identity cookie.
    pub secret: String,
    pub auth_service_url: String,
    /// Capacity of the change-event broadcast channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    #[serde(default = "default_invitation_ttl_hours")]
    pub invitation_ttl_hours: i64,
    /// Wallets below this many cents show up as low balance.
    #[serde(default = "default_low_balance_threshold")]
    pub low_balance_threshold: i64,
    /// Pause between two runs of the overdue invoice sweeper.
    #[serde(default = "default_overdue_sweep_interval_secs")]
    pub overdue_sweep_interval_secs: u64,
}

impl ServerConfig {
    /// Reads `config/default.yaml`, the optional `config/{APP_ENV}.yaml`
    /// profile (defaults to `local`) and `APP_*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

        Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(Environment::with_prefix("APP"))
            .build()?
            .try_deserialize()
    }
}
