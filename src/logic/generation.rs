// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Client glue for the remote image-generation service.
//!
//! The service receives the current image, optional reference images and an
//! instruction, and answers with a new image or an explanation of why it did
//! not produce one. [`ImageGenerator`] is the seam the MVU kernel talks to;
//! [`GeminiClient`] is the HTTP implementation.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use thiserror::Error;

use crate::config::AppConfig;
use crate::logic::prompts::EditKind;
use crate::models::artifact::{Artifact, extension_for_mime};
use crate::models::credential::Credential;

/// Everything the service needs for one edit.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    pub source: Artifact,
    pub kind: EditKind,
    pub references: Vec<Artifact>,
}

/// Failures surfaced to the user after a generation attempt.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Could not reach the generation service: {0}")]
    Transport(String),
    #[error("Generation service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Request was blocked. Reason: {reason}. {message}")]
    Blocked { reason: String, message: String },
    #[error("Image generation stopped unexpectedly. Reason: {reason}. This often relates to safety settings.")]
    Stopped { reason: String },
    #[error("{}", no_image_message(.text.as_deref()))]
    NoImage { text: Option<String> },
    #[error("The service response could not be read: {0}")]
    Malformed(String),
}

fn no_image_message(text: Option<&str>) -> String {
    match text {
        Some(text) => format!(
            "The AI model did not return an image. The model responded with text: \"{text}\""
        ),
        None => "The AI model did not return an image. This can happen due to safety filters or \
if the request is too complex. Please try rephrasing your prompt to be more direct."
            .to_string(),
    }
}

/// Anything that can turn a request into a new image.
pub trait ImageGenerator: Send + Sync {
    fn generate(
        &self,
        credential: &Credential,
        request: &GenerationRequest,
    ) -> Result<Artifact, GenerationError>;
}

/// `generateContent` client for Gemini image models.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    /// Base URL without trailing slash.
    base_url: String,
    /// Model identifier, e.g. `gemini-2.5-flash-image-preview`.
    model: String,
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    /// Create with explicit settings.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            model: model.into(),
            client,
        })
    }

    /// Build from application configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, GenerationError> {
        Self::new(
            config.api_base_url.clone(),
            config.model.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl ImageGenerator for GeminiClient {
    fn generate(
        &self,
        credential: &Credential,
        request: &GenerationRequest,
    ) -> Result<Artifact, GenerationError> {
        let body = build_request_body(request);
        log::info!(
            "requesting {} from {} ({} reference image(s))",
            request.kind.label(),
            self.model,
            request.references.len()
        );

        let res = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", credential.expose())
            .json(&body)
            .send()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().unwrap_or_default();
            log::warn!("generation failed with HTTP {status}");
            return Err(GenerationError::Http { status, body });
        }

        let json: Value = res
            .json()
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;
        parse_response(&request.kind, &json)
    }
}

/// JSON body for a `generateContent` call: source image, references, prompt.
pub fn build_request_body(request: &GenerationRequest) -> Value {
    let mut parts = Vec::with_capacity(request.references.len() + 2);
    parts.push(inline_part(&request.source));
    parts.extend(request.references.iter().map(inline_part));
    parts.push(json!({ "text": request.kind.prompt(request.references.len()) }));
    json!({ "contents": [{ "parts": parts }] })
}

fn inline_part(artifact: &Artifact) -> Value {
    json!({
        "inlineData": {
            "mimeType": artifact.mime(),
            "data": artifact.to_base64(),
        }
    })
}

/// Interpret a `generateContent` response.
///
/// Block reasons win over everything, then the first inline image, then a
/// non-`STOP` finish reason, then any text the model answered with.
pub fn parse_response(kind: &EditKind, response: &Value) -> Result<Artifact, GenerationError> {
    if let Some(reason) = response
        .pointer("/promptFeedback/blockReason")
        .and_then(Value::as_str)
    {
        let message = response
            .pointer("/promptFeedback/blockReasonMessage")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(GenerationError::Blocked {
            reason: reason.to_string(),
            message,
        });
    }

    let candidate = response.pointer("/candidates/0");
    let parts = candidate
        .and_then(|c| c.pointer("/content/parts"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    if let Some(inline) = parts.iter().find_map(|p| p.get("inlineData")) {
        let mime = inline
            .get("mimeType")
            .and_then(Value::as_str)
            .unwrap_or("image/png");
        let data = inline
            .get("data")
            .and_then(Value::as_str)
            .ok_or_else(|| GenerationError::Malformed("inline image has no data".into()))?;
        let bytes = STANDARD
            .decode(data)
            .map_err(|e| GenerationError::Malformed(format!("invalid base64 image: {e}")))?;
        let name = format!(
            "{}-{}.{}",
            kind.label(),
            crate::logic::unix_millis(),
            extension_for_mime(mime)
        );
        let artifact = Artifact::new(name, mime, bytes);
        log::info!("received {} ({} bytes)", artifact.name(), artifact.bytes().len());
        return Ok(artifact);
    }

    if let Some(reason) = candidate
        .and_then(|c| c.get("finishReason"))
        .and_then(Value::as_str)
        .filter(|r| *r != "STOP")
    {
        return Err(GenerationError::Stopped {
            reason: reason.to_string(),
        });
    }

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join(" ");
    let text = text.trim();
    Err(GenerationError::NoImage {
        text: (!text.is_empty()).then(|| text.to_string()),
    })
}
