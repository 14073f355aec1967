use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use triage_core::{Intent, IntentScore, Sentiment};

use crate::{IntentClassifier, MlError, SentimentClassifier};

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct ZeroShotOutput {
    labels: Vec<String>,
    scores: Vec<f32>,
}

/// Text-classification model served by the Hugging Face Inference API.
#[derive(Debug, Clone)]
pub struct HostedSentimentClassifier {
    http_client: reqwest::Client,
    endpoint: String,
    model: String,
    api_token: String,
}

impl HostedSentimentClassifier {
    pub fn new(http_client: reqwest::Client, base_url: &str, model: &str, api_token: String) -> Self {
        Self {
            http_client,
            endpoint: model_endpoint(base_url, model),
            model: model.to_string(),
            api_token,
        }
    }
}

#[async_trait]
impl SentimentClassifier for HostedSentimentClassifier {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn classify(&self, text: &str) -> Result<Sentiment, MlError> {
        let payload = serde_json::json!({ "inputs": text });
        let body = post_json(&self.http_client, &self.endpoint, &self.api_token, &payload).await?;
        parse_sentiment_output(&body)
    }
}

/// Zero-shot NLI model served by the Hugging Face Inference API, queried in
/// multi-label mode.
#[derive(Debug, Clone)]
pub struct HostedZeroShotClassifier {
    http_client: reqwest::Client,
    endpoint: String,
    model: String,
    api_token: String,
}

impl HostedZeroShotClassifier {
    pub fn new(http_client: reqwest::Client, base_url: &str, model: &str, api_token: String) -> Self {
        Self {
            http_client,
            endpoint: model_endpoint(base_url, model),
            model: model.to_string(),
            api_token,
        }
    }
}

#[async_trait]
impl IntentClassifier for HostedZeroShotClassifier {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn score(&self, text: &str, labels: &[Intent]) -> Result<Vec<IntentScore>, MlError> {
        let candidate_labels = labels.iter().map(|intent| intent.label()).collect::<Vec<_>>();
        let payload = serde_json::json!({
            "inputs": text,
            "parameters": {
                "candidate_labels": candidate_labels,
                "multi_label": true
            }
        });
        let body = post_json(&self.http_client, &self.endpoint, &self.api_token, &payload).await?;
        parse_zero_shot_output(&body)
    }
}

fn model_endpoint(base_url: &str, model: &str) -> String {
    format!("{}/models/{}", base_url.trim_end_matches('/'), model)
}

async fn post_json(
    http_client: &reqwest::Client,
    endpoint: &str,
    api_token: &str,
    payload: &Value,
) -> Result<Value, MlError> {
    let response = http_client
        .post(endpoint)
        .bearer_auth(api_token)
        .json(payload)
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

    Ok(response.json::<Value>().await?)
}

/// Accepts both `[{label, score}]` and the batched `[[{label, score}]]` shape.
fn parse_sentiment_output(body: &Value) -> Result<Sentiment, MlError> {
    let rows = match body.as_array().and_then(|outer| outer.first()) {
        Some(Value::Array(inner)) => inner.clone(),
        Some(_) => body.as_array().cloned().unwrap_or_default(),
        None => Vec::new(),
    };

    let scored = rows
        .into_iter()
        .map(serde_json::from_value::<LabelScore>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| MlError::MalformedResponse(error.to_string()))?;

    let best = scored
        .iter()
        .max_by(|lhs, rhs| {
            lhs.score
                .partial_cmp(&rhs.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .ok_or_else(|| MlError::MalformedResponse("sentiment output has no labels".to_string()))?;

    Sentiment::parse(&best.label).ok_or_else(|| {
        MlError::MalformedResponse(format!("unknown sentiment label `{}`", best.label))
    })
}

/// Accepts the classic `{labels, scores}` object and the `[{label, score}]` list.
fn parse_zero_shot_output(body: &Value) -> Result<Vec<IntentScore>, MlError> {
    let pairs = if body.is_array() {
        serde_json::from_value::<Vec<LabelScore>>(body.clone())
            .map_err(|error| MlError::MalformedResponse(error.to_string()))?
            .into_iter()
            .map(|entry| (entry.label, entry.score))
            .collect::<Vec<_>>()
    } else {
        let output = serde_json::from_value::<ZeroShotOutput>(body.clone())
            .map_err(|error| MlError::MalformedResponse(error.to_string()))?;
        if output.labels.len() != output.scores.len() {
            return Err(MlError::MalformedResponse(
                "zero-shot labels and scores differ in length".to_string(),
            ));
        }
        output.labels.into_iter().zip(output.scores).collect()
    };

    let mut scores = pairs
        .into_iter()
        .filter_map(|(label, score)| {
            Intent::from_label(&label).map(|intent| IntentScore::new(intent, score))
        })
        .collect::<Vec<_>>();
    scores.sort_by(|lhs, rhs| {
        rhs.score
            .partial_cmp(&lhs.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(scores)
}
