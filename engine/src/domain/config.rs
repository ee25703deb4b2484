// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0

// Engine Configuration Types
//
// Defines the configuration schema for a MindEase engine node:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Embedding provider and storage backend selection
// - Search, alerting and crisis thresholds
// - Identity salt for the second anonymization stage
// - Network and observability settings
//
// The crisis threshold must be the highest threshold in the system; this is
// checked by `validate()` at load time.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::entry::MAX_PREVIEW_CHARS;
use crate::domain::error::EngineError;

pub const API_VERSION: &str = "mindease.io/v1";
pub const KIND: &str = "EngineConfig";

/// Top-level Kubernetes-style engine configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfigManifest {
    /// API version (must be "mindease.io/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "EngineConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    #[serde(default)]
    pub spec: EngineSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable deployment name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSpec {
    /// Characters of user text kept as preview (1..=50)
    #[serde(default = "default_preview_max_chars")]
    pub preview_max_chars: usize,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub thresholds: ThresholdConfig,

    #[serde(default)]
    pub alerting: AlertingConfig,

    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// Offline deterministic feature hashing (development, demos, tests)
    Hashing,
    /// Ollama `/api/embeddings`
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider_kind")]
    pub provider: EmbeddingProviderKind,

    /// Provider endpoint (Ollama only)
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,

    /// Model identifier (Ollama only)
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector dimension. Required for the hashing provider; when set for a
    /// remote provider, anchors are checked against it at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<usize>,

    /// Per-call timeout; a timeout surfaces as EmbeddingUnavailable
    #[serde(default = "default_embedding_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackendKind {
    InMemory,
    Sled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_backend")]
    pub backend: StorageBackendKind,

    /// Database directory (sled only)
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Minimum crisis-anchor similarity for de-masking
    #[serde(default = "default_crisis_threshold")]
    pub crisis: f64,

    /// Default threshold for emotion/phrase search
    #[serde(default = "default_search_threshold")]
    pub search_default: f64,

    /// Default result limit for emotion/phrase search
    #[serde(default = "default_search_top_k")]
    pub search_top_k: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertingConfig {
    /// Weight of crisis/burnout/anxiety/overwhelm
    #[serde(default = "default_elevated_weight")]
    pub elevated_weight: f64,

    /// Weight of anger/sadness/loneliness
    #[serde(default = "default_baseline_weight")]
    pub baseline_weight: f64,

    /// Number of top anchors averaged into the severity score
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default = "default_urgent")]
    pub urgent: f64,

    #[serde(default = "default_warning")]
    pub warning: f64,

    #[serde(default = "default_monitor")]
    pub monitor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Prefix stored with every hash so salts can be rotated
    #[serde(default = "default_salt_version")]
    pub salt_version: String,

    /// Ingestion-stage salt (supports "env:VAR_NAME")
    #[serde(default = "default_salt")]
    pub salt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_api_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format ("json" or "text")
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Prometheus scrape port
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default value functions
fn default_preview_max_chars() -> usize {
    MAX_PREVIEW_CHARS
}

fn default_provider_kind() -> EmbeddingProviderKind {
    EmbeddingProviderKind::Hashing
}

fn default_embedding_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_embedding_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_storage_backend() -> StorageBackendKind {
    StorageBackendKind::InMemory
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./mindease-data")
}

fn default_crisis_threshold() -> f64 {
    0.9
}

fn default_search_threshold() -> f64 {
    0.8
}

fn default_search_top_k() -> usize {
    10
}

fn default_elevated_weight() -> f64 {
    1.5
}

fn default_baseline_weight() -> f64 {
    1.0
}

fn default_top_n() -> usize {
    3
}

fn default_urgent() -> f64 {
    0.85
}

fn default_warning() -> f64 {
    0.70
}

fn default_monitor() -> f64 {
    0.55
}

fn default_salt_version() -> String {
    "v1".to_string()
}

fn default_salt() -> String {
    "mindease/ingest/v1".to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider_kind(),
            endpoint: default_embedding_endpoint(),
            model: default_embedding_model(),
            dimension: Some(256),
            timeout: default_embedding_timeout(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            path: default_storage_path(),
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            crisis: default_crisis_threshold(),
            search_default: default_search_threshold(),
            search_top_k: default_search_top_k(),
        }
    }
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            elevated_weight: default_elevated_weight(),
            baseline_weight: default_baseline_weight(),
            top_n: default_top_n(),
            urgent: default_urgent(),
            warning: default_warning(),
            monitor: default_monitor(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            salt_version: default_salt_version(),
            salt: default_salt(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_api_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

impl Default for EngineSpec {
    fn default() -> Self {
        Self {
            preview_max_chars: default_preview_max_chars(),
            embedding: EmbeddingConfig::default(),
            storage: StorageConfig::default(),
            thresholds: ThresholdConfig::default(),
            alerting: AlertingConfig::default(),
            identity: IdentityConfig::default(),
            network: NetworkConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Default for EngineConfigManifest {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: "mindease-engine".to_string(),
                version: Some("1.0.0".to_string()),
            },
            spec: EngineSpec::default(),
        }
    }
}

impl EngineSpec {
    /// Check every threshold and sizing rule.
    ///
    /// Fails with `InvalidCrisisThreshold` when the crisis threshold is not
    /// in (0, 1] or is lower than any search or alerting threshold.
    pub fn validate(&self) -> Result<(), EngineError> {
        let crisis = self.thresholds.crisis;
        if !(crisis > 0.0 && crisis <= 1.0) {
            return Err(EngineError::invalid_crisis_threshold(crisis, "must be in (0, 1]"));
        }

        let competing = [
            ("thresholds.search_default", self.thresholds.search_default),
            ("alerting.urgent", self.alerting.urgent),
            ("alerting.warning", self.alerting.warning),
            ("alerting.monitor", self.alerting.monitor),
        ];
        for (field, value) in competing {
            if !value.is_finite() {
                return Err(EngineError::InvalidInput(format!("{} must be a finite number", field)));
            }
            if value > crisis {
                return Err(EngineError::invalid_crisis_threshold(
                    crisis,
                    format!("lower than {} ({})", field, value),
                ));
            }
        }

        if !(0.0..=1.0).contains(&self.thresholds.search_default) {
            return Err(EngineError::InvalidInput(
                "thresholds.search_default must be in [0, 1]".to_string(),
            ));
        }
        if self.thresholds.search_top_k == 0 {
            return Err(EngineError::InvalidInput(
                "thresholds.search_top_k must be greater than 0".to_string(),
            ));
        }
        if !(self.alerting.monitor <= self.alerting.warning
            && self.alerting.warning <= self.alerting.urgent)
        {
            return Err(EngineError::InvalidInput(
                "alerting thresholds must satisfy monitor <= warning <= urgent".to_string(),
            ));
        }
        if !(self.alerting.elevated_weight > 0.0 && self.alerting.baseline_weight > 0.0) {
            return Err(EngineError::InvalidInput("alerting weights must be positive".to_string()));
        }
        if self.alerting.top_n == 0 {
            return Err(EngineError::InvalidInput("alerting.top_n must be greater than 0".to_string()));
        }

        if self.preview_max_chars == 0 || self.preview_max_chars > MAX_PREVIEW_CHARS {
            return Err(EngineError::InvalidInput(format!(
                "preview_max_chars must be in 1..={}",
                MAX_PREVIEW_CHARS
            )));
        }

        if self.embedding.provider == EmbeddingProviderKind::Hashing
            && self.embedding.dimension.unwrap_or(0) == 0
        {
            return Err(EngineError::InvalidInput(
                "embedding.dimension is required for the hashing provider".to_string(),
            ));
        }
        if self.embedding.timeout.is_zero() {
            return Err(EngineError::InvalidInput("embedding.timeout must be non-zero".to_string()));
        }

        if self.identity.salt.is_empty() || self.identity.salt_version.is_empty() {
            return Err(EngineError::InvalidInput(
                "identity.salt and identity.salt_version cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl EngineConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. MINDEASE_CONFIG_PATH environment variable
    /// 2. ./mindease-config.yaml (working directory)
    /// 3. ~/.mindease/config.yaml (user home)
    /// 4. /etc/mindease/config.yaml (system, Unix)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("MINDEASE_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./mindease-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".mindease").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        {
            let system_config = PathBuf::from("/etc/mindease/config.yaml");
            if system_config.exists() {
                return Some(system_config);
            }
        }

        None
    }

    /// Load configuration with discovery, fall back to defaults, then validate.
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?
        } else if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            Self::from_yaml_file(config_path)?
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            Self::default()
        };

        config.apply_env_overrides();
        config.resolve_secrets()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MINDEASE_CRISIS_THRESHOLD") {
            match val.parse::<f64>() {
                Ok(threshold) => {
                    tracing::info!("Environment override: MINDEASE_CRISIS_THRESHOLD={}", threshold);
                    self.spec.thresholds.crisis = threshold;
                }
                Err(_) => {
                    tracing::warn!(
                        "Invalid value for MINDEASE_CRISIS_THRESHOLD: '{}'. Expected a number. Ignoring.",
                        val
                    );
                }
            }
        }

        if let Ok(endpoint) = std::env::var("MINDEASE_EMBEDDING_ENDPOINT") {
            tracing::info!("Environment override: MINDEASE_EMBEDDING_ENDPOINT={}", endpoint);
            self.spec.embedding.endpoint = endpoint;
        }

        if let Ok(salt) = std::env::var("MINDEASE_IDENTITY_SALT") {
            tracing::info!("Environment override: MINDEASE_IDENTITY_SALT=<redacted>");
            self.spec.identity.salt = salt;
        }
    }

    /// Resolve "env:VAR_NAME" references in secret fields
    pub fn resolve_secrets(&mut self) -> anyhow::Result<()> {
        if let Some(var) = self.spec.identity.salt.strip_prefix("env:") {
            self.spec.identity.salt = std::env::var(var)
                .map_err(|_| anyhow::anyhow!("identity.salt references unset variable {}", var))?;
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.api_version != API_VERSION {
            return Err(EngineError::InvalidInput(format!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version, API_VERSION
            )));
        }

        if self.kind != KIND {
            return Err(EngineError::InvalidInput(format!(
                "Invalid kind: '{}'. Must be '{}'",
                self.kind, KIND
            )));
        }

        if self.metadata.name.is_empty() {
            return Err(EngineError::InvalidInput("metadata.name cannot be empty".to_string()));
        }

        self.spec.validate()
    }
}
