use std::collections::HashMap;
use std::env;
use std::time::Duration;

use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use crate::clients::RemoteEndpoint;
use crate::utils::{CircuitBreakerConfig, RetryConfig};

// ============================================================================
// Settings
// ============================================================================
//
// Layered, later sources win:
//   built-in defaults
//   config/default.toml        (optional)
//   config/{RUN_MODE}.toml     (optional, RUN_MODE defaults to "development")
//   config/local.toml          (optional, not checked in)
//   ORCH__* environment, "__" between path segments
//                              e.g. ORCH__INVENTORY_SERVICE__TIMEOUT_MS=500
//
// ============================================================================

const ENV_PREFIX: &str = "ORCH";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub log: LogSettings,
    pub customer_service: RemoteServiceSettings,
    pub inventory_service: RemoteServiceSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    /// `EnvFilter` directives used when `RUST_LOG` is not set.
    pub filter: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RemoteServiceSettings {
    pub base_url: String,
    pub timeout_ms: u64,
    pub retry: RetrySettings,
    pub circuit_breaker: CircuitBreakerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CircuitBreakerSettings {
    pub failure_threshold: u32,
    pub reset_timeout_ms: u64,
    pub success_threshold: u32,
}

impl Settings {
    /// Load from `config/` relative to the working directory and the
    /// process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        Self::with_defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Self::environment(None))
            .build()?
            .try_deserialize()
    }

    /// Defaults plus the given environment map only; no files, no process env.
    pub fn from_env_map(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::with_defaults()?
            .add_source(Self::environment(Some(vars)))
            .build()?
            .try_deserialize()
    }

    fn environment(vars: Option<HashMap<String, String>>) -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(vars)
    }

    fn with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8081)?
            .set_default("log.filter", "info,order_orchestrator=debug")?;

        for (service, url) in [
            ("customer_service", "http://localhost:8083"),
            ("inventory_service", "http://localhost:8082"),
        ] {
            builder = builder
                .set_default(format!("{service}.base_url"), url)?
                .set_default(format!("{service}.timeout_ms"), 2000)?
                .set_default(format!("{service}.retry.max_attempts"), 1)?
                .set_default(format!("{service}.retry.initial_delay_ms"), 100)?
                .set_default(format!("{service}.retry.max_delay_ms"), 2000)?
                .set_default(format!("{service}.retry.multiplier"), 2.0)?
                .set_default(format!("{service}.circuit_breaker.failure_threshold"), 5)?
                .set_default(format!("{service}.circuit_breaker.reset_timeout_ms"), 30_000)?
                .set_default(format!("{service}.circuit_breaker.success_threshold"), 1)?;
        }

        Ok(builder)
    }
}

impl RemoteServiceSettings {
    pub fn endpoint(&self) -> RemoteEndpoint {
        RemoteEndpoint::new(self.base_url.clone())
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_retry(RetryConfig::from(&self.retry))
            .with_breaker(CircuitBreakerConfig::from(&self.circuit_breaker))
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            multiplier: settings.multiplier,
        }
    }
}

impl From<&CircuitBreakerSettings> for CircuitBreakerConfig {
    fn from(settings: &CircuitBreakerSettings) -> Self {
        Self {
            failure_threshold: settings.failure_threshold,
            reset_timeout: Duration::from_millis(settings.reset_timeout_ms),
            success_threshold: settings.success_threshold,
        }
    }
}
