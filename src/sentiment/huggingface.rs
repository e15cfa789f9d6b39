//! Text classification through the Hugging Face Inference API.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;

use crate::config::SentimentConfig;
use crate::sentiment::classifier::{
    ClassifierError, RawPrediction, TextClassifier, TokenizerOptions,
};

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a [String],
    parameters: &'a TokenizerOptions,
    options: InferenceOptions,
}

#[derive(Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

/// Blocking client for a hosted text-classification model.
pub struct HuggingFaceClassifier {
    client: Client,
    url: String,
    model: String,
}

impl HuggingFaceClassifier {
    /// Builds a client for `config.model`.
    ///
    /// The API token is read from `HF_API_TOKEN`; public models also work
    /// without one at a lower rate limit.
    pub fn new(config: &SentimentConfig) -> Result<Self, ClassifierError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        match std::env::var("HF_API_TOKEN") {
            Ok(token) if !token.trim().is_empty() => {
                let value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                    .map_err(|_| ClassifierError::Config("invalid HF_API_TOKEN".to_string()))?;
                headers.insert(AUTHORIZATION, value);
            }
            _ => log::warn!("HF_API_TOKEN is missing; using anonymous inference"),
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            url: format!(
                "{}/models/{}",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
            model: config.model.clone(),
        })
    }
}

impl TextClassifier for HuggingFaceClassifier {
    fn classify(
        &self,
        texts: &[String],
        options: &TokenizerOptions,
    ) -> Result<Vec<RawPrediction>, ClassifierError> {
        let request = InferenceRequest {
            inputs: texts,
            parameters: options,
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        let resp = self.client.post(&self.url).json(&request).send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = resp.json()?;
        parse_predictions(&payload)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Accepts `[{label, score}, ..]` (one top label per input) and
/// `[[{label, score}, ..], ..]` (all labels per input; the best one wins).
fn parse_predictions(payload: &Value) -> Result<Vec<RawPrediction>, ClassifierError> {
    let items = payload
        .as_array()
        .ok_or_else(|| ClassifierError::Malformed(format!("expected an array, got {payload}")))?;

    items
        .iter()
        .map(|item| match item {
            Value::Array(candidates) => candidates
                .iter()
                .map(parse_prediction)
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .max_by(|a, b| a.score.total_cmp(&b.score))
                .ok_or_else(|| ClassifierError::Malformed("empty prediction list".to_string())),
            other => parse_prediction(other),
        })
        .collect()
}

fn parse_prediction(value: &Value) -> Result<RawPrediction, ClassifierError> {
    serde_json::from_value(value.clone())
        .map_err(|e| ClassifierError::Malformed(format!("bad prediction {value}: {e}")))
}
