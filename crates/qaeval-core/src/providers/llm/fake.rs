use super::{LlmClient, RequestPayload, SamplingParams};
use crate::errors::ProviderError;
use crate::model::LlmResponse;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted backend for tests and dry runs.
///
/// Scripted results are returned in order; once the script is exhausted every
/// call returns the fixed response.
#[derive(Debug)]
pub struct FakeClient {
    model: String,
    fixed_response: String,
    tokens_per_call: Option<u64>,
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    payloads: Mutex<Vec<RequestPayload>>,
}

impl FakeClient {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            fixed_response: "yes".to_string(),
            tokens_per_call: None,
            script: Mutex::new(VecDeque::new()),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.fixed_response = response.into();
        self
    }

    pub fn with_script(self, script: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..self
        }
    }

    pub fn with_tokens(mut self, tokens: u64) -> Self {
        self.tokens_per_call = Some(tokens);
        self
    }

    pub fn call_count(&self) -> usize {
        self.payloads.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Every payload received, in call order.
    pub fn payloads(&self) -> Vec<RequestPayload> {
        self.payloads.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(
        &self,
        payload: &RequestPayload,
        _params: &SamplingParams,
    ) -> Result<LlmResponse, ProviderError> {
        self.payloads
            .lock()
            .map_err(|_| ProviderError::Other("fake client state poisoned".into()))?
            .push(payload.clone());

        let next = self
            .script
            .lock()
            .map_err(|_| ProviderError::Other("fake client state poisoned".into()))?
            .pop_front();
        let text = match next {
            Some(result) => result?,
            None => self.fixed_response.clone(),
        };

        Ok(LlmResponse {
            text: text.trim().to_string(),
            provider: "fake".to_string(),
            model: self.model.clone(),
            total_tokens: self.tokens_per_call,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
