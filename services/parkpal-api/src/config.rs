//! Service configuration.
//!
//! Every setting can come from a flag or the matching environment variable;
//! `.env` is loaded before parsing.

use std::path::PathBuf;
use std::time::Duration;

use parkpal_common::{ParkPalError, ParkPalResult};
use storage::CacheTtls;
use upstream::UpstreamConfig;

/// Cache, upstream and registry settings.
#[derive(clap::Args, Debug, Clone)]
pub struct ServiceConfig {
    /// Redis URL for the durable cache tier (in-memory when unset)
    #[arg(long, env = "REDIS_URL")]
    pub redis_url: Option<String>,

    /// OpenWeatherMap API key
    #[arg(long, env = "OWM_API_KEY", default_value = "", hide_env_values = true)]
    pub owm_api_key: String,

    /// Weather endpoint
    #[arg(long, env = "OWM_BASE_URL", default_value = upstream::weather::DEFAULT_BASE_URL)]
    pub weather_base_url: String,

    /// Per-call upstream timeout in milliseconds
    #[arg(long, env = "PREFETCH_TIMEOUT_MS", default_value_t = 4000)]
    pub prefetch_timeout_ms: u64,

    /// Freshness window for ride+weather summaries
    #[arg(long, env = "PARKPAL_SUMMARY_TTL_SECS", default_value_t = 1800)]
    pub summary_ttl_secs: u64,

    /// Freshness window for ride catalogs
    #[arg(long, env = "PARKPAL_CATALOG_TTL_SECS", default_value_t = 86_400)]
    pub catalog_ttl_secs: u64,

    /// Version segment of every cache key
    #[arg(long, env = "PARKPAL_CACHE_VERSION", default_value = "v1")]
    pub cache_version: String,

    /// Hot tier capacity in entries
    #[arg(long, env = "PARKPAL_HOT_CACHE_ENTRIES", default_value_t = 1024)]
    pub hot_cache_entries: usize,

    /// Write total-failure payloads to the cache
    #[arg(
        long,
        env = "PARKPAL_CACHE_TOTAL_FAILURES",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub cache_total_failures: bool,

    /// YAML park registry replacing the built-in destinations
    #[arg(long, env = "PARKPAL_REGISTRY")]
    pub registry: Option<PathBuf>,

    /// User-Agent sent to upstream providers
    #[arg(long, env = "PARKPAL_USER_AGENT", default_value = "ParkPal/1.0")]
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            owm_api_key: String::new(),
            weather_base_url: upstream::weather::DEFAULT_BASE_URL.to_string(),
            prefetch_timeout_ms: 4000,
            summary_ttl_secs: 1800,
            catalog_ttl_secs: 86_400,
            cache_version: "v1".to_string(),
            hot_cache_entries: 1024,
            cache_total_failures: true,
            registry: None,
            user_agent: "ParkPal/1.0".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Reject values that would disable caching or upstream calls outright.
    pub fn validate(&self) -> ParkPalResult<()> {
        if self.prefetch_timeout_ms == 0 {
            return Err(ParkPalError::Config("prefetch timeout must be positive".to_string()));
        }
        if self.summary_ttl_secs == 0 || self.catalog_ttl_secs == 0 {
            return Err(ParkPalError::Config("cache TTLs must be positive".to_string()));
        }
        if self.hot_cache_entries == 0 {
            return Err(ParkPalError::Config("hot cache capacity must be positive".to_string()));
        }
        if self.cache_version.trim().is_empty() || self.cache_version.contains(':') {
            return Err(ParkPalError::Config(format!(
                "invalid cache version: {:?}",
                self.cache_version
            )));
        }
        Ok(())
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.prefetch_timeout_ms)
    }

    pub fn upstream_config(&self) -> UpstreamConfig {
        UpstreamConfig {
            timeout: self.upstream_timeout(),
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn cache_ttls(&self) -> CacheTtls {
        CacheTtls {
            summary: chrono::Duration::seconds(self.summary_ttl_secs as i64),
            catalog: chrono::Duration::seconds(self.catalog_ttl_secs as i64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        config: ServiceConfig,
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_ttls(), CacheTtls::default());
        assert_eq!(config.upstream_config().timeout, Duration::from_secs(4));
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "parkpal-api",
            "--summary-ttl-secs",
            "60",
            "--cache-total-failures",
            "false",
            "--cache-version",
            "v2",
        ])
        .unwrap();

        assert_eq!(cli.config.summary_ttl_secs, 60);
        assert!(!cli.config.cache_total_failures);
        assert_eq!(cli.config.cache_version, "v2");
        assert_eq!(cli.config.cache_ttls().summary, chrono::Duration::seconds(60));
    }

    #[test]
    fn test_zero_values_rejected() {
        let config = ServiceConfig {
            prefetch_timeout_ms: 0,
            ..ServiceConfig::default()
        };
        assert!(matches!(config.validate(), Err(ParkPalError::Config(_))));

        let config = ServiceConfig {
            catalog_ttl_secs: 0,
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServiceConfig {
            hot_cache_entries: 0,
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServiceConfig {
            cache_version: "v1:x".to_string(),
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
