use super::{LlmClient, RequestPayload, SamplingParams};
use crate::config::Credentials;
use crate::errors::ProviderError;
use crate::model::LlmResponse;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Completion service client over HTTPS.
///
/// Routing and authentication come from [`Credentials`]: the public API with a
/// bearer token, or a deployment-routed endpoint with an `api-key` header.
pub struct OpenAIClient {
    model: String,
    credentials: Credentials,
    client: reqwest::Client,
}

impl OpenAIClient {
    pub fn new(
        model: impl Into<String>,
        credentials: Credentials,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Other(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_http_client(model, credentials, client))
    }

    pub fn with_http_client(
        model: impl Into<String>,
        credentials: Credentials,
        client: reqwest::Client,
    ) -> Self {
        Self {
            model: model.into(),
            credentials,
            client,
        }
    }

    /// Target URL for a payload.
    pub fn endpoint_url(&self, payload: &RequestPayload) -> String {
        let route = match payload {
            RequestPayload::Chat { .. } => "chat/completions",
            RequestPayload::Completion { .. } => "completions",
        };
        match &self.credentials {
            Credentials::ApiKey { base_url, .. } => {
                format!("{}/v1/{}", base_url.trim_end_matches('/'), route)
            }
            Credentials::AlternateEndpoint {
                endpoint,
                api_version,
                deployment,
                ..
            } => format!(
                "{}/openai/deployments/{}/{}?api-version={}",
                endpoint.trim_end_matches('/'),
                deployment,
                route,
                api_version
            ),
        }
    }

    /// JSON body. The model id is only sent to the public API; deployments
    /// are addressed by URL.
    pub fn request_body(&self, payload: &RequestPayload, params: &SamplingParams) -> Value {
        let mut body = json!({
            "max_tokens": params.max_new_tokens,
            "temperature": params.temperature,
            "top_p": params.top_p,
        });
        match payload {
            RequestPayload::Chat { messages } => body["messages"] = json!(messages),
            RequestPayload::Completion { prompt } => body["prompt"] = json!(prompt),
        }
        if matches!(self.credentials, Credentials::ApiKey { .. }) {
            body["model"] = json!(self.model);
        }
        body
    }
}

/// Maps a non-success HTTP status to a provider error.
pub fn status_error(status: u16, body: String) -> ProviderError {
    match status {
        429 => ProviderError::RateLimited { message: body },
        500 | 502 | 503 | 504 => ProviderError::Unavailable {
            status,
            message: body,
        },
        401 | 403 => ProviderError::Unauthorized {
            status,
            message: body,
        },
        400 | 404 | 422 => ProviderError::InvalidRequest {
            status,
            message: body,
        },
        _ => ProviderError::Other(format!("unexpected status {}: {}", status, body)),
    }
}

/// Generated text (trimmed) and total token usage from a response body.
pub fn parse_completion(json: &Value) -> Result<(String, Option<u64>), ProviderError> {
    let text = json
        .pointer("/choices/0/message/content")
        .or_else(|| json.pointer("/choices/0/text"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| ProviderError::InvalidResponse {
            message: "response missing choices[0] text".to_string(),
        })?;
    let tokens = json.pointer("/usage/total_tokens").and_then(|v| v.as_u64());
    Ok((text.trim().to_string(), tokens))
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(
        &self,
        payload: &RequestPayload,
        params: &SamplingParams,
    ) -> Result<LlmResponse, ProviderError> {
        let url = self.endpoint_url(payload);
        let body = self.request_body(payload, params);

        let request = self.client.post(&url).json(&body);
        let request = match &self.credentials {
            Credentials::ApiKey { key, .. } => request.bearer_auth(key),
            Credentials::AlternateEndpoint { key, .. } => request.header("api-key", key),
        };

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), error_text));
        }

        // A failed read is a transport error; only a complete but
        // malformed body is an invalid response.
        let bytes = resp.bytes().await?;
        let json: Value =
            serde_json::from_slice(&bytes).map_err(|e| ProviderError::InvalidResponse {
                message: format!("response body is not JSON: {}", e),
            })?;
        let (text, total_tokens) = parse_completion(&json)?;

        Ok(LlmResponse {
            text,
            provider: "openai".to_string(),
            model: self.model.clone(),
            total_tokens,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
