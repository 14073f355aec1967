use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{info, instrument, warn};
use triage_core::{
    compose_template_reply, normalize_email, primary_intent, select_relevant_intents,
    unproductive_reply, Category, Intent, IntentScore, KeywordFilter, OutcomeReason, ReplySource,
    Sentiment, TriageOutcome, MAX_RELEVANT_INTENTS, RELEVANCE_THRESHOLD,
};
use triage_ml::{IntentClassifier, MlError, MlStack, SentimentClassifier};
use triage_observability::AppMetrics;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("models unavailable: {0}")]
    ModelsUnavailable(#[source] MlError),

    #[error("{0}")]
    Inference(#[source] MlError),
}

#[derive(Clone)]
pub struct TriageAgent {
    ml_stack: Arc<MlStack>,
    filter: KeywordFilter,
    metrics: Arc<AppMetrics>,
}

impl TriageAgent {
    pub fn new(ml_stack: Arc<MlStack>, filter: KeywordFilter, metrics: Arc<AppMetrics>) -> Self {
        Self {
            ml_stack,
            filter,
            metrics,
        }
    }

    pub fn ml_stack(&self) -> &MlStack {
        &self.ml_stack
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.metrics
    }

    #[instrument(skip(self, email_text), fields(message_id = %Uuid::new_v4()))]
    pub async fn handle_email(&self, email_text: &str) -> Result<TriageOutcome, PipelineError> {
        let started = Instant::now();
        self.metrics.inc_request();

        let (sentiment_model, intent_model) = self.load_models()?;
        let result = self
            .classify(email_text, sentiment_model.as_ref(), intent_model.as_ref())
            .await;
        self.metrics.observe_latency(started.elapsed());

        let outcome = result?;
        match outcome.category {
            Category::Productive => self.metrics.inc_productive(),
            Category::Unproductive => self.metrics.inc_unproductive(),
        }

        info!(
            category = outcome.category.as_label(),
            reason = ?outcome.reason,
            sentiment = outcome.sentiment.map(Sentiment::as_code),
            intents = ?outcome.intents.iter().map(|entry| entry.intent.label()).collect::<Vec<_>>(),
            reply_source = ?outcome.reply_source,
            latency_ms = started.elapsed().as_millis() as u64,
            "email triaged"
        );

        Ok(outcome)
    }

    fn load_models(
        &self,
    ) -> Result<(Arc<dyn SentimentClassifier>, Arc<dyn IntentClassifier>), PipelineError> {
        let sentiment = self
            .ml_stack
            .sentiment()
            .map_err(PipelineError::ModelsUnavailable)?;
        let intent = self
            .ml_stack
            .intent()
            .map_err(PipelineError::ModelsUnavailable)?;
        Ok((sentiment, intent))
    }

    async fn classify(
        &self,
        email_text: &str,
        sentiment_model: &dyn SentimentClassifier,
        intent_model: &dyn IntentClassifier,
    ) -> Result<TriageOutcome, PipelineError> {
        let cleaned = normalize_email(email_text);

        if let Some(reason) = self.filter.evaluate(&cleaned).rejection_reason() {
            self.metrics.inc_filtered();
            return Ok(TriageOutcome::unproductive(reason, unproductive_reply()));
        }

        self.metrics.inc_ml_inference();
        let sentiment = sentiment_model
            .classify(&cleaned)
            .await
            .map_err(PipelineError::Inference)?;

        if sentiment == Sentiment::Negative {
            let mut outcome =
                TriageOutcome::unproductive(OutcomeReason::NegativeSentiment, unproductive_reply());
            outcome.sentiment = Some(sentiment);
            return Ok(outcome);
        }

        self.metrics.inc_ml_inference();
        let scores = intent_model
            .score(&cleaned, &Intent::ALL)
            .await
            .map_err(PipelineError::Inference)?;
        let relevant = select_relevant_intents(&scores, RELEVANCE_THRESHOLD, MAX_RELEVANT_INTENTS);

        let (reply, reply_source) = self.compose_reply(email_text, &relevant).await;

        Ok(TriageOutcome {
            category: Category::Productive,
            reply,
            reason: OutcomeReason::Classified,
            sentiment: Some(sentiment),
            intents: relevant,
            reply_source,
        })
    }

    /// Generated text wins when available; every generator failure falls
    /// back to the template composition.
    async fn compose_reply(
        &self,
        email_text: &str,
        relevant: &[IntentScore],
    ) -> (String, ReplySource) {
        if let Some(generator) = self.ml_stack.generator() {
            match generator.generate(email_text, primary_intent(relevant)).await {
                Ok(reply) if !reply.trim().is_empty() => {
                    self.metrics.inc_generative();
                    return (reply.trim().to_string(), ReplySource::Generative);
                }
                Ok(_) => {
                    warn!(model = generator.model_name(), "generative reply was empty, using templates");
                    self.metrics.inc_fallback();
                }
                Err(error) => {
                    warn!(model = generator.model_name(), error = %error, "generative reply failed, using templates");
                    self.metrics.inc_fallback();
                }
            }
        }

        (compose_template_reply(relevant), ReplySource::Template)
    }
}
