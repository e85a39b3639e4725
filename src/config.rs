use anyhow::{bail, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ledger::GatewayLimits;
use crate::query::QueryLimits;
use crate::service::RetryPolicy;
use crate::workflow::AuthorityPolicy;

pub const DEFAULT_CONFIG_FILE: &str = "land-registry.toml";
pub const ENV_PREFIX: &str = "LAND_REGISTRY";

/// Main configuration structure for the land registry
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LandRegistryConfig {
    pub ledger: LedgerConfig,
    pub queue: QueueConfig,
    pub workflow: WorkflowConfig,
    pub authority: AuthorityConfig,
    pub query: QueryConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    Memory,
    File,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LedgerConfig {
    /// World state implementation
    pub backend: LedgerBackend,
    /// Ledger file for the `file` backend
    pub path: PathBuf,
    /// Sustained submit rate
    pub submit_rate_per_second: u32,
    /// Submits allowed in a burst above the sustained rate
    pub submit_burst: u32,
    /// Lifetime of the cached wholesale evaluate result
    pub evaluate_cache_ttl_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QueueConfig {
    /// Jobs the queue buffers before `enqueue` waits
    pub capacity: usize,
    /// How long shutdown waits for accepted jobs to land
    pub drain_timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WorkflowConfig {
    pub conflict_retry: ConflictRetryConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConflictRetryConfig {
    /// Total attempts including the first
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Randomize each delay between zero and its computed value
    pub jitter: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AuthorityConfig {
    /// Identities allowed to resolve deeds; empty means anyone
    #[serde(default)]
    pub deed_registrars: Vec<String>,
    /// Identities allowed to resolve incumbrances; empty means anyone
    #[serde(default)]
    pub incumbrance_registrars: Vec<String>,
    /// Identity used when `--identity` is not given
    pub default_identity: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QueryConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// Emit logs as JSON lines instead of plain text
    pub json_logs: bool,
}

impl Default for LandRegistryConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig {
                backend: LedgerBackend::File,
                path: PathBuf::from(".land-registry/ledger.json"),
                submit_rate_per_second: 50,
                submit_burst: 100,
                evaluate_cache_ttl_ms: 500,
            },
            queue: QueueConfig {
                capacity: 256,
                drain_timeout_seconds: 30,
            },
            workflow: WorkflowConfig {
                conflict_retry: ConflictRetryConfig {
                    max_attempts: 5,
                    base_delay_ms: 20,
                    max_delay_ms: 1000,
                    jitter: true,
                },
            },
            authority: AuthorityConfig {
                deed_registrars: Vec::new(),
                incumbrance_registrars: Vec::new(),
                default_identity: "Org1MSP".to_string(),
            },
            query: QueryConfig {
                default_limit: 20,
                max_limit: 100,
            },
            observability: ObservabilityConfig {
                log_level: "warn".to_string(),
                json_logs: false,
            },
        }
    }
}

impl LandRegistryConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. `land-registry.toml` in the working directory, or `explicit` when given
    /// 3. Environment variables (`LAND_REGISTRY_LEDGER__PATH=...`)
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        match explicit {
            Some(path) => {
                if !path.exists() {
                    bail!("configuration file {} does not exist", path.display());
                }
                builder = builder.add_source(File::from(path));
            }
            None => {
                if Path::new(DEFAULT_CONFIG_FILE).exists() {
                    builder = builder.add_source(File::from(Path::new(DEFAULT_CONFIG_FILE)));
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("authority.deed_registrars")
                .with_list_parse_key("authority.incumbrance_registrars")
                .try_parsing(true),
        );

        let config: LandRegistryConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workflow.conflict_retry.max_attempts == 0 {
            bail!("workflow.conflict_retry.max_attempts must be at least 1");
        }
        if self.query.max_limit == 0 {
            bail!("query.max_limit must be at least 1");
        }
        if self.queue.capacity == 0 {
            bail!("queue.capacity must be at least 1");
        }
        if self.ledger.submit_rate_per_second == 0 {
            bail!("ledger.submit_rate_per_second must be at least 1");
        }
        if self.authority.default_identity.trim().is_empty() {
            bail!("authority.default_identity must not be empty");
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::debug!("Loaded environment variables from .env file");
        }
        Ok(())
    }

    pub fn gateway_limits(&self) -> GatewayLimits {
        GatewayLimits {
            submit_rate_per_second: self.ledger.submit_rate_per_second,
            submit_burst: self.ledger.submit_burst,
            evaluate_cache_ttl: Duration::from_millis(self.ledger.evaluate_cache_ttl_ms),
        }
    }

    pub fn authority_policy(&self) -> AuthorityPolicy {
        AuthorityPolicy::new(
            self.authority.deed_registrars.clone(),
            self.authority.incumbrance_registrars.clone(),
        )
    }

    pub fn query_limits(&self) -> QueryLimits {
        QueryLimits {
            default_limit: self.query.default_limit,
            max_limit: self.query.max_limit,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let retry = &self.workflow.conflict_retry;
        RetryPolicy {
            max_attempts: retry.max_attempts,
            base_delay: Duration::from_millis(retry.base_delay_ms),
            max_delay: Duration::from_millis(retry.max_delay_ms),
            jitter: retry.jitter,
        }
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.queue.drain_timeout_seconds)
    }
}
