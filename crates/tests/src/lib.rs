//! Shared fixtures for the HTTP integration tests.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use triage_core::{Intent, IntentScore, Sentiment};
use triage_ml::{IntentClassifier, MlConfig, MlError, MlStack, SentimentClassifier};

pub struct StubSentiment(pub Sentiment);

#[async_trait]
impl SentimentClassifier for StubSentiment {
    fn model_name(&self) -> &str {
        "stub-sentiment"
    }

    async fn classify(&self, _text: &str) -> Result<Sentiment, MlError> {
        Ok(self.0)
    }
}

pub struct StubIntents(pub Vec<IntentScore>);

#[async_trait]
impl IntentClassifier for StubIntents {
    fn model_name(&self) -> &str {
        "stub-intents"
    }

    async fn score(&self, _text: &str, _labels: &[Intent]) -> Result<Vec<IntentScore>, MlError> {
        Ok(self.0.clone())
    }
}

pub struct BrokenIntents;

#[async_trait]
impl IntentClassifier for BrokenIntents {
    fn model_name(&self) -> &str {
        "broken-intents"
    }

    async fn score(&self, _text: &str, _labels: &[Intent]) -> Result<Vec<IntentScore>, MlError> {
        Err(MlError::MalformedResponse("labels missing".to_string()))
    }
}

pub fn origins() -> Vec<String> {
    vec!["http://localhost:5000".to_string()]
}

pub fn stub_app(sentiment: Sentiment, intents: Vec<IntentScore>) -> Router {
    triage_api::build_app_with_stack(
        MlStack::from_parts(
            Arc::new(StubSentiment(sentiment)),
            Arc::new(StubIntents(intents)),
            None,
        ),
        origins(),
    )
}

pub fn app_with_intents(intents: Arc<dyn IntentClassifier>) -> Router {
    triage_api::build_app_with_stack(
        MlStack::from_parts(Arc::new(StubSentiment(Sentiment::Positive)), intents, None),
        origins(),
    )
}

pub fn rules_app() -> Router {
    let stack = MlStack::new(MlConfig::rules_only()).expect("rules stack should build");
    triage_api::build_app_with_stack(stack, origins())
}

/// Hosted backend with no credentials: model handles can never load.
pub fn unconfigured_app() -> Router {
    let stack = MlStack::new(MlConfig::default()).expect("client should build");
    triage_api::build_app_with_stack(stack, origins())
}
