pub mod fake;
pub mod openai;
pub mod retry;

use crate::errors::ProviderError;
use crate::model::LlmResponse;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;

/// Model ids that take the chat request shape out of the box.
pub const BUILTIN_CHAT_MODELS: &[&str] = &["gpt-4", "gpt-3.5-turbo", "gpt-4-1106-preview"];

/// Wire shape of a completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    /// Single raw text prompt.
    Completion,
    /// Role-tagged message list.
    Chat,
}

/// Model id to request shape lookup. Unknown models use the fallback shape.
#[derive(Debug, Clone)]
pub struct ShapeTable {
    shapes: HashMap<String, RequestShape>,
    fallback: RequestShape,
}

impl Default for ShapeTable {
    fn default() -> Self {
        Self::empty(RequestShape::Completion).with_chat_models(BUILTIN_CHAT_MODELS.iter().copied())
    }
}

impl ShapeTable {
    pub fn empty(fallback: RequestShape) -> Self {
        Self {
            shapes: HashMap::new(),
            fallback,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>, shape: RequestShape) -> Self {
        self.shapes.insert(model.into(), shape);
        self
    }

    pub fn with_chat_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for model in models {
            self.shapes.insert(model.into(), RequestShape::Chat);
        }
        self
    }

    pub fn shape_for(&self, model: &str) -> RequestShape {
        self.shapes.get(model).copied().unwrap_or(self.fallback)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Shape-specific request body, independent of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPayload {
    Completion { prompt: String },
    Chat { messages: Vec<ChatMessage> },
}

impl RequestPayload {
    /// Chat puts the instruction in a leading system message; completion
    /// prepends it to the prompt separated by a blank line.
    pub fn build(shape: RequestShape, text: &str, instruction: Option<&str>) -> Self {
        match shape {
            RequestShape::Completion => RequestPayload::Completion {
                prompt: match instruction {
                    Some(instruction) => format!("{}\n\n{}", instruction, text),
                    None => text.to_string(),
                },
            },
            RequestShape::Chat => {
                let mut messages = Vec::with_capacity(2);
                if let Some(instruction) = instruction {
                    messages.push(ChatMessage {
                        role: Role::System,
                        content: instruction.to_string(),
                    });
                }
                messages.push(ChatMessage {
                    role: Role::User,
                    content: text.to_string(),
                });
                RequestPayload::Chat { messages }
            }
        }
    }

    pub fn shape(&self) -> RequestShape {
        match self {
            RequestPayload::Completion { .. } => RequestShape::Completion,
            RequestPayload::Chat { .. } => RequestShape::Chat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 100,
            temperature: 0.0,
            top_p: 1.0,
        }
    }
}

/// One attempt against a completion service. Retries live in
/// [`retry::CompletionClient`].
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        payload: &RequestPayload,
        params: &SamplingParams,
    ) -> Result<LlmResponse, ProviderError>;

    fn model(&self) -> &str;

    fn provider_name(&self) -> &'static str;
}
