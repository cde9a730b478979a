use super::super::args::{JudgeArgs, Provider};
use anyhow::Context;
use qaeval_core::config::{Credentials, JudgeConfig};
use qaeval_core::providers::llm::fake::FakeClient;
use qaeval_core::providers::llm::openai::OpenAIClient;
use qaeval_core::providers::llm::retry::{CompletionClient, RetryPolicy};
use qaeval_core::providers::llm::{LlmClient, ShapeTable};
use std::sync::Arc;

/// Completion client for the selected provider. Credentials are only
/// required for live calls.
pub(crate) fn build_client(cfg: &JudgeConfig, args: &JudgeArgs) -> anyhow::Result<CompletionClient> {
    let backend: Arc<dyn LlmClient> = match args.provider {
        Provider::Fake => {
            Arc::new(FakeClient::new(cfg.model.clone()).with_response(args.fake_response.clone()))
        }
        Provider::Openai => {
            let credentials = Credentials::resolve(&cfg.endpoint)
                .context("judge provider 'openai' needs credentials")?;
            Arc::new(OpenAIClient::new(cfg.model.clone(), credentials)?)
        }
    };

    let shapes = ShapeTable::default().with_chat_models(cfg.chat_models.iter().cloned());
    Ok(CompletionClient::new(backend, RetryPolicy::from(&cfg.retry)).with_shapes(shapes))
}
