//! Error types for the judge pipeline.
//!
//! Per-candidate classification problems are not errors (see
//! [`crate::model::Verdict::Unparseable`]). Everything here either aborts a
//! batch or prevents startup.

use std::path::PathBuf;

/// Failure of a single attempt against the completion service.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Rate limit exceeded (HTTP 429).
    #[error("rate limited: {message}")]
    RateLimited { message: String },

    /// Service temporarily unavailable (HTTP 5xx).
    #[error("service unavailable (status {status}): {message}")]
    Unavailable { status: u16, message: String },

    /// Connection, DNS or timeout failure, including a body cut off mid-read.
    #[error("connection error: {message}")]
    Connection { message: String },

    /// Credential rejected (HTTP 401/403).
    #[error("unauthorized (status {status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Request rejected as malformed (HTTP 400/404/422).
    #[error("invalid request (status {status}): {message}")]
    InvalidRequest { status: u16, message: String },

    /// A 2xx response whose body lacks the generated text.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Whether the failure is expected to resolve on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Unavailable { .. } | Self::Connection { .. }
        )
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
            Self::Connection {
                message: err.to_string(),
            }
        } else if err.is_decode() {
            Self::InvalidResponse {
                message: err.to_string(),
            }
        } else {
            Self::Other(err.to_string())
        }
    }
}

/// Failure of the persisted response cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed cache record at {path}:{line}: {source}")]
    Malformed {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode cache record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Terminal failure of a judge batch.
#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    /// Every attempt failed with a transient error.
    #[error("completion call failed after {attempts} attempts: {last}")]
    ExhaustedRetries {
        attempts: u32,
        #[source]
        last: ProviderError,
    },

    /// Non-transient provider failure; never retried.
    #[error("completion call failed: {0}")]
    Provider(#[source] ProviderError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The per-judgment sink passed to `judge_batch_with` failed.
    #[error("failed to record judgment: {0}")]
    Sink(#[source] std::io::Error),
}

impl JudgeError {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::ExhaustedRetries { .. })
    }
}

/// Startup failure: config, template or credentials.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unsupported config version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("prompt template {path} could not be read: {source}")]
    PromptTemplate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing credential: {var} must be set for {mode} endpoint mode")]
    MissingCredential { var: &'static str, mode: &'static str },
}

/// Failure reading the candidate input file.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to read input {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed candidate record at {path}:{line}: {source}")]
    Malformed {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
