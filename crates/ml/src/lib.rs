mod error;
mod fallback;
mod hosted;
mod openai;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde::Serialize;
use triage_core::{Intent, IntentScore, Sentiment};

pub use error::MlError;
pub use fallback::{KeywordIntentClassifier, LexiconSentimentClassifier};
pub use hosted::{HostedSentimentClassifier, HostedZeroShotClassifier};
pub use openai::{build_reply_prompt, OpenAiReplyGenerator};

pub const DEFAULT_HF_BASE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_SENTIMENT_MODEL: &str = "pysentimiento/bertweet-pt-sentiment";
pub const DEFAULT_INTENT_MODEL: &str = "facebook/bart-large-mnli";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    fn model_name(&self) -> &str;

    async fn classify(&self, text: &str) -> Result<Sentiment, MlError>;
}

/// Multi-label scorer: every candidate label gets an independent score.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    fn model_name(&self) -> &str;

    async fn score(&self, text: &str, labels: &[Intent]) -> Result<Vec<IntentScore>, MlError>;
}

#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    fn model_name(&self) -> &str;

    async fn generate(&self, email_text: &str, primary_intent: Intent) -> Result<String, MlError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MlBackend {
    Hosted,
    Rules,
}

impl MlBackend {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "hosted" | "remote" | "huggingface" | "hf" => Some(Self::Hosted),
            "rules" | "local" | "offline" => Some(Self::Rules),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MlConfig {
    pub backend: MlBackend,
    pub hf_api_token: Option<String>,
    pub hf_base_url: String,
    pub sentiment_model: String,
    pub intent_model: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
}

impl Default for MlConfig {
    fn default() -> Self {
        Self {
            backend: MlBackend::Hosted,
            hf_api_token: None,
            hf_base_url: DEFAULT_HF_BASE_URL.to_string(),
            sentiment_model: DEFAULT_SENTIMENT_MODEL.to_string(),
            intent_model: DEFAULT_INTENT_MODEL.to_string(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
        }
    }
}

impl MlConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            backend: env::var("TRIAGE_ML_BACKEND")
                .ok()
                .and_then(|value| MlBackend::parse(&value))
                .unwrap_or(defaults.backend),
            hf_api_token: non_empty_env("TRIAGE_HF_API_TOKEN"),
            hf_base_url: non_empty_env("TRIAGE_HF_BASE_URL").unwrap_or(defaults.hf_base_url),
            sentiment_model: non_empty_env("TRIAGE_SENTIMENT_MODEL")
                .unwrap_or(defaults.sentiment_model),
            intent_model: non_empty_env("TRIAGE_INTENT_MODEL").unwrap_or(defaults.intent_model),
            openai_api_key: non_empty_env("TRIAGE_OPENAI_API_KEY"),
            openai_base_url: non_empty_env("TRIAGE_OPENAI_BASE_URL")
                .unwrap_or(defaults.openai_base_url),
            openai_model: non_empty_env("TRIAGE_OPENAI_MODEL").unwrap_or(defaults.openai_model),
        }
    }

    pub fn rules_only() -> Self {
        Self {
            backend: MlBackend::Rules,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MlCapabilities {
    pub backend: MlBackend,
    pub sentiment_model: String,
    pub intent_model: String,
    pub generative_model: Option<String>,
}

/// Model handles shared by every request.
///
/// Each handle is created on first use and kept for the process lifetime.
/// A failed load is not cached, so the next request retries it.
pub struct MlStack {
    config: MlConfig,
    http_client: reqwest::Client,
    sentiment: OnceCell<Arc<dyn SentimentClassifier>>,
    intent: OnceCell<Arc<dyn IntentClassifier>>,
    generator: OnceCell<Option<Arc<dyn ReplyGenerator>>>,
}

impl MlStack {
    pub fn new(config: MlConfig) -> Result<Self, MlError> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(6))
            .timeout(Duration::from_secs(20))
            .build()?;

        Ok(Self {
            config,
            http_client,
            sentiment: OnceCell::new(),
            intent: OnceCell::new(),
            generator: OnceCell::new(),
        })
    }

    pub fn load_default() -> Result<Self, MlError> {
        Self::new(MlConfig::from_env())
    }

    /// Builds a stack around already-constructed handles.
    pub fn from_parts(
        sentiment: Arc<dyn SentimentClassifier>,
        intent: Arc<dyn IntentClassifier>,
        generator: Option<Arc<dyn ReplyGenerator>>,
    ) -> Self {
        Self {
            config: MlConfig::rules_only(),
            http_client: reqwest::Client::new(),
            sentiment: OnceCell::with_value(sentiment),
            intent: OnceCell::with_value(intent),
            generator: OnceCell::with_value(generator),
        }
    }

    pub fn config(&self) -> &MlConfig {
        &self.config
    }

    pub fn sentiment(&self) -> Result<Arc<dyn SentimentClassifier>, MlError> {
        self.sentiment
            .get_or_try_init(|| {
                let handle: Arc<dyn SentimentClassifier> = match self.config.backend {
                    MlBackend::Rules => Arc::new(LexiconSentimentClassifier::default()),
                    MlBackend::Hosted => Arc::new(HostedSentimentClassifier::new(
                        self.http_client.clone(),
                        &self.config.hf_base_url,
                        &self.config.sentiment_model,
                        self.hf_token()?,
                    )),
                };
                tracing::info!(model = handle.model_name(), "sentiment model loaded");
                Ok(handle)
            })
            .cloned()
    }

    pub fn intent(&self) -> Result<Arc<dyn IntentClassifier>, MlError> {
        self.intent
            .get_or_try_init(|| {
                let handle: Arc<dyn IntentClassifier> = match self.config.backend {
                    MlBackend::Rules => Arc::new(KeywordIntentClassifier::default()),
                    MlBackend::Hosted => Arc::new(HostedZeroShotClassifier::new(
                        self.http_client.clone(),
                        &self.config.hf_base_url,
                        &self.config.intent_model,
                        self.hf_token()?,
                    )),
                };
                tracing::info!(model = handle.model_name(), "intent model loaded");
                Ok(handle)
            })
            .cloned()
    }

    /// `None` when no generative backend is configured.
    pub fn generator(&self) -> Option<Arc<dyn ReplyGenerator>> {
        self.generator
            .get_or_init(|| {
                let api_key = self.config.openai_api_key.clone()?;
                let handle: Arc<dyn ReplyGenerator> = Arc::new(OpenAiReplyGenerator::new(
                    self.http_client.clone(),
                    &self.config.openai_base_url,
                    &self.config.openai_model,
                    api_key,
                ));
                Some(handle)
            })
            .clone()
    }

    pub fn capabilities(&self) -> MlCapabilities {
        let loaded_sentiment = self.sentiment.get().map(|handle| handle.model_name().to_string());
        let loaded_intent = self.intent.get().map(|handle| handle.model_name().to_string());
        let generative_model = match self.generator.get() {
            Some(loaded) => loaded.as_ref().map(|handle| handle.model_name().to_string()),
            None => self
                .config
                .openai_api_key
                .as_ref()
                .map(|_| self.config.openai_model.clone()),
        };

        MlCapabilities {
            backend: self.config.backend,
            sentiment_model: loaded_sentiment.unwrap_or_else(|| self.configured_sentiment_model()),
            intent_model: loaded_intent.unwrap_or_else(|| self.configured_intent_model()),
            generative_model,
        }
    }

    fn configured_sentiment_model(&self) -> String {
        match self.config.backend {
            MlBackend::Rules => fallback::LEXICON_SENTIMENT_MODEL.to_string(),
            MlBackend::Hosted => self.config.sentiment_model.clone(),
        }
    }

    fn configured_intent_model(&self) -> String {
        match self.config.backend {
            MlBackend::Rules => fallback::KEYWORD_INTENT_MODEL.to_string(),
            MlBackend::Hosted => self.config.intent_model.clone(),
        }
    }

    fn hf_token(&self) -> Result<String, MlError> {
        self.config.hf_api_token.clone().ok_or_else(|| {
            MlError::Unavailable("TRIAGE_HF_API_TOKEN is not set for the hosted backend".to_string())
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
