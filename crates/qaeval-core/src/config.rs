//! Judge run configuration and credentials.
//!
//! # Environment Variables
//!
//! | Variable | Mode | Description |
//! |----------|------|-------------|
//! | `OPENAI_API_KEY` | direct | API key sent as a bearer token |
//! | `AZURE_OPENAI_KEY` | alternate | API key sent as `api-key` header |
//! | `AZURE_OPENAI_ENDPOINT` | alternate | Endpoint URL when `endpoint.base_url` is unset |

use crate::errors::ConfigError;
use crate::judge::ClassifierProfile;
use crate::providers::llm::retry::RetryPolicy;
use crate::providers::llm::SamplingParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const ALTERNATE_API_KEY_VAR: &str = "AZURE_OPENAI_KEY";
pub const ALTERNATE_ENDPOINT_VAR: &str = "AZURE_OPENAI_ENDPOINT";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JudgeConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_model")]
    pub model: String,

    /// Names the cache file together with `model`.
    #[serde(default = "default_experiment")]
    pub experiment: String,

    #[serde(default)]
    pub prompt_file: Option<PathBuf>,

    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Truncate the cache file instead of loading it.
    #[serde(default)]
    pub overwrite_cache: bool,

    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default)]
    pub retry: RetrySettings,

    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Extra model ids served with the chat request shape.
    #[serde(default)]
    pub chat_models: Vec<String>,

    #[serde(default)]
    pub classifier: ClassifierProfile,
}

fn default_version() -> u32 {
    SUPPORTED_CONFIG_VERSION
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_experiment() -> String {
    "test".to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".qaeval/cache")
}

fn default_max_new_tokens() -> u32 {
    100
}

fn default_top_p() -> f32 {
    1.0
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            model: default_model(),
            experiment: default_experiment(),
            prompt_file: None,
            cache_dir: default_cache_dir(),
            overwrite_cache: false,
            max_new_tokens: default_max_new_tokens(),
            temperature: 0.0,
            top_p: default_top_p(),
            retry: RetrySettings::default(),
            endpoint: EndpointConfig::default(),
            chat_models: Vec::new(),
            classifier: ClassifierProfile::default(),
        }
    }
}

impl JudgeConfig {
    pub fn sampling(&self) -> SamplingParams {
        SamplingParams {
            max_new_tokens: self.max_new_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != SUPPORTED_CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: self.version,
                supported: SUPPORTED_CONFIG_VERSION,
            });
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".into()));
        }
        if self.experiment.trim().is_empty() {
            return Err(ConfigError::Invalid("experiment must not be empty".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        for (name, secs) in [
            ("retry.base_sleep_secs", self.retry.base_sleep_secs),
            ("retry.sleep_step_secs", self.retry.sleep_step_secs),
        ] {
            if !(0.0..=MAX_SLEEP_SECS).contains(&secs) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within [0, {}], got {}",
                    name, MAX_SLEEP_SECS, secs
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(ConfigError::Invalid(format!(
                "top_p must be within [0, 1], got {}",
                self.top_p
            )));
        }
        Ok(())
    }
}

/// Upper bound for either backoff setting.
pub const MAX_SLEEP_SECS: f64 = 3600.0;

/// Linear backoff settings: sleep `base_sleep_secs + sleep_step_secs * attempt`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_sleep_secs")]
    pub base_sleep_secs: f64,
    #[serde(default = "default_sleep_step_secs")]
    pub sleep_step_secs: f64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_sleep_secs() -> f64 {
    10.0
}

fn default_sleep_step_secs() -> f64 {
    5.0
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_sleep_secs: default_base_sleep_secs(),
            sleep_step_secs: default_sleep_step_secs(),
        }
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(s: &RetrySettings) -> Self {
        RetryPolicy {
            max_attempts: s.max_attempts,
            base_sleep: secs_to_duration(s.base_sleep_secs),
            step: secs_to_duration(s.sleep_step_secs),
        }
    }
}

// Negative and NaN clamp to zero, overflow to `Duration::MAX`.
fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointMode {
    /// Public API, bearer-token auth.
    #[default]
    Direct,
    /// Deployment-routed endpoint with `api-key` auth and an API version.
    Alternate,
}

impl EndpointMode {
    fn label(self) -> &'static str {
        match self {
            EndpointMode::Direct => "direct",
            EndpointMode::Alternate => "alternate",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    #[serde(default)]
    pub mode: EndpointMode,
    /// Overrides the public API URL (direct) or `AZURE_OPENAI_ENDPOINT` (alternate).
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Only used in alternate mode.
    #[serde(default = "default_deployment")]
    pub deployment: String,
}

fn default_api_version() -> String {
    "2023-09-01-preview".to_string()
}

fn default_deployment() -> String {
    "gpt4all".to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            mode: EndpointMode::default(),
            base_url: None,
            api_version: default_api_version(),
            deployment: default_deployment(),
        }
    }
}

/// Authentication and routing for the completion service, held by the client.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    ApiKey {
        key: String,
        base_url: String,
    },
    AlternateEndpoint {
        key: String,
        endpoint: String,
        api_version: String,
        deployment: String,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::ApiKey { base_url, .. } => f
                .debug_struct("ApiKey")
                .field("key", &"[REDACTED]")
                .field("base_url", base_url)
                .finish(),
            Credentials::AlternateEndpoint {
                endpoint,
                api_version,
                deployment,
                ..
            } => f
                .debug_struct("AlternateEndpoint")
                .field("key", &"[REDACTED]")
                .field("endpoint", endpoint)
                .field("api_version", api_version)
                .field("deployment", deployment)
                .finish(),
        }
    }
}

impl Credentials {
    /// Resolve credentials for `endpoint.mode` from the process environment.
    pub fn resolve(endpoint: &EndpointConfig) -> Result<Self, ConfigError> {
        Self::resolve_with(endpoint, |var| std::env::var(var).ok())
    }

    pub fn resolve_with<F>(endpoint: &EndpointConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = endpoint.mode.label();
        let non_empty = |var: &'static str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingCredential { var, mode })
        };

        match endpoint.mode {
            EndpointMode::Direct => Ok(Credentials::ApiKey {
                key: non_empty(OPENAI_API_KEY_VAR)?,
                base_url: endpoint
                    .base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            }),
            EndpointMode::Alternate => {
                let key = non_empty(ALTERNATE_API_KEY_VAR)?;
                let endpoint_url = match &endpoint.base_url {
                    Some(url) => url.clone(),
                    None => non_empty(ALTERNATE_ENDPOINT_VAR)?,
                };
                Ok(Credentials::AlternateEndpoint {
                    key,
                    endpoint: endpoint_url,
                    api_version: endpoint.api_version.clone(),
                    deployment: endpoint.deployment.clone(),
                })
            }
        }
    }
}

pub fn load_config(path: &Path) -> Result<JudgeConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: JudgeConfig = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    cfg.validate()?;
    Ok(cfg)
}
