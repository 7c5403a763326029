//! Google Cloud Speech client.
//!
//! Speaks the v1beta1 REST surface: `speech:syncrecognize` for blocking
//! calls, `speech:asyncrecognize` plus `operations/{id}` for long-running
//! jobs. Authentication is an API key passed as a query parameter.

use super::Recognizer;
use crate::error::Result;
use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

const DEFAULT_ENDPOINT: &str = "https://speech.googleapis.com/v1beta1";

/// Google Cloud Speech recognizer.
pub struct GoogleRecognizer {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    language_code: String,
    sample_rate: u32,
}

impl GoogleRecognizer {
    pub fn new(api_key: String, language_code: String, sample_rate: u32) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key,
            language_code,
            sample_rate,
        }
    }

    /// Point the client at a different endpoint (for testing).
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    fn config(&self) -> RecognitionConfig<'_> {
        RecognitionConfig {
            language_code: &self.language_code,
            encoding: "LINEAR16",
            sample_rate: self.sample_rate,
        }
    }
}

#[async_trait]
impl Recognizer for GoogleRecognizer {
    async fn recognize(&self, audio: &[u8]) -> Result<Vec<String>> {
        let request = RecognizeRequest {
            audio: RecognitionAudio {
                content: Some(base64::engine::general_purpose::STANDARD.encode(audio)),
                uri: None,
            },
            config: self.config(),
        };

        let url = format!("{}/speech:syncrecognize?key={}", self.endpoint, self.api_key);
        let response: RecognizeResponse = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.transcripts())
    }

    async fn start_async(&self, uri: &str) -> Result<String> {
        let request = RecognizeRequest {
            audio: RecognitionAudio {
                content: None,
                uri: Some(uri.to_string()),
            },
            config: self.config(),
        };

        let url = format!("{}/speech:asyncrecognize?key={}", self.endpoint, self.api_key);
        let handle: OperationHandle = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(handle.name)
    }

    async fn poll(&self, operation_id: &str) -> Result<Option<Vec<String>>> {
        let url = format!(
            "{}/operations/{}?key={}",
            self.endpoint, operation_id, self.api_key
        );
        let operation: Operation = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !operation.done {
            return Ok(None);
        }
        Ok(Some(
            operation
                .response
                .map(|r| r.transcripts())
                .unwrap_or_default(),
        ))
    }
}

#[derive(Serialize)]
struct RecognizeRequest<'a> {
    audio: RecognitionAudio,
    config: RecognitionConfig<'a>,
}

#[derive(Serialize)]
struct RecognitionAudio {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uri: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    language_code: &'a str,
    encoding: &'static str,
    sample_rate: u32,
}

/// A missing `results` key means nothing was recognized, not an error.
#[derive(Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<SpeechResult>,
}

impl RecognizeResponse {
    /// Best transcript of each result, in order.
    fn transcripts(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|r| r.alternatives.first())
            .map(|a| a.transcript.clone())
            .collect()
    }
}

#[derive(Deserialize)]
struct SpeechResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
}

#[derive(Deserialize)]
struct OperationHandle {
    name: String,
}

#[derive(Deserialize)]
struct Operation {
    #[serde(default)]
    done: bool,
    response: Option<RecognizeResponse>,
}
