use async_trait::async_trait;
use serde_json::Value;
use triage_core::Intent;

use crate::{MlError, ReplyGenerator};

const MAX_TOKENS: u32 = 200;
const TEMPERATURE: f32 = 0.7;

/// Help-desk reply generator backed by the OpenAI Chat Completions API.
#[derive(Debug, Clone)]
pub struct OpenAiReplyGenerator {
    http_client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl OpenAiReplyGenerator {
    pub fn new(http_client: reqwest::Client, base_url: &str, model: &str, api_key: String) -> Self {
        Self {
            http_client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.to_string(),
            api_key,
        }
    }
}

pub fn build_reply_prompt(email_text: &str, primary_intent: Intent) -> String {
    format!(
        "O usuário enviou a seguinte mensagem: '{}'. \
         A intenção principal é: '{}'. \
         Gere uma resposta clara, educada e objetiva, ideal para um help desk. \
         A resposta deve ser em português.",
        email_text,
        primary_intent.label()
    )
}

#[async_trait]
impl ReplyGenerator for OpenAiReplyGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, email_text: &str, primary_intent: Intent) -> Result<String, MlError> {
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": build_reply_prompt(email_text, primary_intent) }
            ],
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE
        });

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.as_str())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MlError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        extract_completion_text(&body)
    }
}

fn extract_completion_text(payload: &Value) -> Result<String, MlError> {
    let content = payload
        .get("choices")
        .and_then(|choices| choices.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .ok_or_else(|| MlError::MalformedResponse("completion has no message content".to_string()))?;

    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(MlError::EmptyOutput);
    }
    Ok(trimmed.to_string())
}
