use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub campus: CampusSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    #[serde(default)]
    pub recommendation: RecommendationSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CampusSettings {
    pub base_url: String,
    pub service_token: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub redis_url: String,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

fn default_true() -> bool { true }

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RecommendationSettings {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl RecommendationSettings {
    /// Requested limit, defaulted and capped
    pub fn effective_limit(&self, requested: Option<u16>) -> usize {
        requested
            .map(|l| l as usize)
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }
}

fn default_limit() -> usize { 20 }
fn default_max_limit() -> usize { 100 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_category_base")]
    pub category_base: f64,
    #[serde(default = "default_skill_multiplier")]
    pub skill_multiplier: f64,
    #[serde(default = "default_time_match")]
    pub time_match: f64,
    #[serde(default = "default_location_match")]
    pub location_match: f64,
    #[serde(default = "default_recency_bonus")]
    pub recency_bonus: f64,
    #[serde(default = "default_recency_window_days")]
    pub recency_window_days: i64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            category_base: default_category_base(),
            skill_multiplier: default_skill_multiplier(),
            time_match: default_time_match(),
            location_match: default_location_match(),
            recency_bonus: default_recency_bonus(),
            recency_window_days: default_recency_window_days(),
        }
    }
}

impl WeightsConfig {
    /// Convert to scoring weights; negative values are clamped to zero
    pub fn to_weights(&self) -> ScoringWeights {
        ScoringWeights {
            category_base: self.category_base.max(0.0),
            skill_multiplier: self.skill_multiplier.max(0.0),
            time_match: self.time_match.max(0.0),
            location_match: self.location_match.max(0.0),
            recency_bonus: self.recency_bonus.max(0.0),
            recency_window_days: self.recency_window_days.max(0),
        }
    }
}

fn default_category_base() -> f64 { 10.0 }
fn default_skill_multiplier() -> f64 { 2.0 }
fn default_time_match() -> f64 { 5.0 }
fn default_location_match() -> f64 { 5.0 }
fn default_recency_bonus() -> f64 { 3.0 }
fn default_recency_window_days() -> i64 { 7 }

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with VIDYA__)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., VIDYA__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("VIDYA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("VIDYA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply well-known unprefixed environment variables on top of the loaded config
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(redis_url) = env::var("REDIS_URL") {
        builder = builder.set_override("cache.redis_url", redis_url)?;
    }
    if let Ok(secret) = env::var("JWT_SECRET") {
        builder = builder.set_override("auth.jwt_secret", secret)?;
    }
    if let Ok(base_url) = env::var("CAMPUS_API_URL") {
        builder = builder.set_override("campus.base_url", base_url)?;
    }

    builder.build()
}
