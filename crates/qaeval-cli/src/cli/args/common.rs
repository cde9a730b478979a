//! Shared argument types used across multiple commands.

use clap::ValueEnum;
use qaeval_core::config::{EndpointMode, JudgeConfig};
use qaeval_core::judge::ClassifierProfile;
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Provider {
    #[default]
    Openai,
    Fake,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClassifierArg {
    #[default]
    Standard,
    Extended,
}

impl From<ClassifierArg> for ClassifierProfile {
    fn from(arg: ClassifierArg) -> Self {
        match arg {
            ClassifierArg::Standard => ClassifierProfile::Standard,
            ClassifierArg::Extended => ClassifierProfile::Extended,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointArg {
    Direct,
    Alternate,
}

/// Overrides for values of the config file. Unset flags keep the file value.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct ModelArgs {
    /// YAML config (version: 1). Defaults apply when omitted
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Judge model identifier
    /// Example: gpt-3.5-turbo
    #[arg(long, env = "QAEVAL_MODEL")]
    pub model: Option<String>,

    /// Experiment name; together with the model it names the cache file
    #[arg(long, env = "QAEVAL_EXPERIMENT")]
    pub experiment: Option<String>,

    /// Judgment prompt template with {q}, {answers}, {candidate_answer}
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,

    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Discard cached responses for this model and experiment
    #[arg(long)]
    pub overwrite_cache: bool,

    #[arg(long)]
    pub max_new_tokens: Option<u32>,

    #[arg(long)]
    pub temperature: Option<f32>,

    #[arg(long)]
    pub top_p: Option<f32>,

    /// Total attempts per completion call on transient failures
    #[arg(long)]
    pub max_attempts: Option<u32>,

    #[arg(long, value_enum)]
    pub endpoint: Option<EndpointArg>,

    /// Deployment id for the alternate endpoint
    #[arg(long)]
    pub deployment: Option<String>,

    #[arg(long, value_enum)]
    pub classifier: Option<ClassifierArg>,
}

impl ModelArgs {
    pub fn apply(&self, cfg: &mut JudgeConfig) {
        if let Some(model) = &self.model {
            cfg.model = model.clone();
        }
        if let Some(experiment) = &self.experiment {
            cfg.experiment = experiment.clone();
        }
        if let Some(prompt_file) = &self.prompt_file {
            cfg.prompt_file = Some(prompt_file.clone());
        }
        if let Some(cache_dir) = &self.cache_dir {
            cfg.cache_dir = cache_dir.clone();
        }
        if self.overwrite_cache {
            cfg.overwrite_cache = true;
        }
        if let Some(n) = self.max_new_tokens {
            cfg.max_new_tokens = n;
        }
        if let Some(t) = self.temperature {
            cfg.temperature = t;
        }
        if let Some(p) = self.top_p {
            cfg.top_p = p;
        }
        if let Some(n) = self.max_attempts {
            cfg.retry.max_attempts = n;
        }
        if let Some(endpoint) = self.endpoint {
            cfg.endpoint.mode = match endpoint {
                EndpointArg::Direct => EndpointMode::Direct,
                EndpointArg::Alternate => EndpointMode::Alternate,
            };
        }
        if let Some(deployment) = &self.deployment {
            cfg.endpoint.deployment = deployment.clone();
        }
        if let Some(classifier) = self.classifier {
            cfg.classifier = classifier.into();
        }
    }
}
