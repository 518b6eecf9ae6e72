//! Single-attempt client for the fal.ai image edit endpoint.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde_json::{Value as JsonValue, json};

use super::request::GenerationRequest;
use crate::error::DispatchError;

/// Body of a `nano-banana-pro/edit` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FalEditRequest {
    pub prompt: String,
    /// Reference first when present; the edit model treats the first image as primary.
    pub image_urls: Vec<String>,
    pub num_images: u8,
    pub aspect_ratio: &'static str,
    pub output_format: &'static str,
    pub safety_tolerance: String,
    pub resolution: &'static str,
}

impl FalEditRequest {
    pub fn new(prompt: String, asset_url: &str, request: &GenerationRequest) -> Self {
        Self {
            prompt,
            image_urls: image_urls(request.reference_image_url.as_deref(), asset_url),
            num_images: 1,
            aspect_ratio: request.aspect_ratio.as_str(),
            output_format: request.output_format.as_str(),
            safety_tolerance: request.safety_tolerance.to_string(),
            resolution: request.resolution.as_str(),
        }
    }
}

/// Ordered image list: reference (if any), then the product asset.
pub fn image_urls(reference: Option<&str>, asset_url: &str) -> Vec<String> {
    reference
        .into_iter()
        .chain(std::iter::once(asset_url))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamImageResult {
    pub url: String,
    pub raw: JsonValue,
}

pub struct FalClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl FalClient {
    pub fn new(endpoint: String, api_key: Option<String>, timeout: Duration) -> Self {
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            timeout,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sends one edit request. No retries.
    pub async fn dispatch(
        &self,
        body: &FalEditRequest,
    ) -> Result<UpstreamImageResult, DispatchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(DispatchError::MissingCredential)?;

        tracing::debug!(
            endpoint = %self.endpoint,
            images = body.image_urls.len(),
            aspect_ratio = body.aspect_ratio,
            resolution = body.resolution,
            "dispatching fal edit request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Key {api_key}"))
            .timeout(self.timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let details = parse_payload(&text);

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "fal returned an error status");
            return Err(DispatchError::Upstream {
                status: status.as_u16(),
                details,
            });
        }

        match extract_image_url(&details) {
            Some(url) => Ok(UpstreamImageResult { url, raw: details }),
            None => {
                tracing::warn!("fal response carried no image url");
                Err(DispatchError::NoImageReturned { details })
            }
        }
    }
}

/// Decodes the body as JSON, keeping unparsable text under `raw`.
pub fn parse_payload(text: &str) -> JsonValue {
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }))
}

/// `images[0].url`, falling back to `image.url`.
pub fn extract_image_url(payload: &JsonValue) -> Option<String> {
    payload
        .pointer("/images/0/url")
        .or_else(|| payload.pointer("/image/url"))
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}
