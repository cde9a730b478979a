//! LLM-as-judge evaluation of open-domain QA answers.
//!
//! A batch of (question, gold answers, candidate answer) triples is rendered
//! into judgment prompts, resolved through a persistent response cache or a
//! remote completion service, and the free-form responses are classified into
//! a [`Verdict`].
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use qaeval_core::cache::ResponseCache;
//! use qaeval_core::config::{Credentials, JudgeConfig};
//! use qaeval_core::judge::{JudgeService, PromptTemplate, ResponseClassifier};
//! use qaeval_core::providers::llm::openai::OpenAIClient;
//! use qaeval_core::providers::llm::retry::{CompletionClient, RetryPolicy};
//!
//! # async fn example(candidates: Vec<qaeval_core::model::Candidate>) -> anyhow::Result<()> {
//! let cfg = JudgeConfig::default();
//! let credentials = Credentials::resolve(&cfg.endpoint)?;
//! let backend = Arc::new(OpenAIClient::new(cfg.model.clone(), credentials)?);
//! let mut client = CompletionClient::new(backend, RetryPolicy::from(&cfg.retry));
//! let mut cache = ResponseCache::open(&cfg.cache_dir, &cfg.model, &cfg.experiment, false)?;
//!
//! let template = PromptTemplate::load(Path::new("prompts/judge.txt"))?;
//! let judge = JudgeService::new(template, ResponseClassifier::default(), cfg.sampling());
//! let _judgments = judge.judge_batch(&candidates, &mut client, &mut cache).await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod errors;
pub mod input;
pub mod judge;
pub mod model;
pub mod providers;
pub mod report;
pub mod stats;

pub use errors::{CacheError, ConfigError, InputError, JudgeError, ProviderError};
pub use model::{Candidate, LlmResponse, Question, Verdict};
