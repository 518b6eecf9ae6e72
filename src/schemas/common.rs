use poem_openapi::Object;
use serde_json::Value as JsonValue;

/// JSON error envelope shared by every JSON endpoint.
#[derive(Object, Debug)]
pub struct ErrorResponse {
    /// Always `false`
    pub ok: bool,

    /// Stable machine-readable tag, e.g. `missing_fal_key`, `fal_error`
    pub error: String,

    /// Human-readable message, never a stack trace
    #[oai(skip_serializing_if_is_none)]
    pub message: Option<String>,

    /// Upstream HTTP status, when the failure came from fal
    #[oai(skip_serializing_if_is_none)]
    pub status: Option<u16>,

    /// Upstream payload, or `{"raw": text}` when it was not JSON
    #[oai(skip_serializing_if_is_none)]
    pub details: Option<JsonValue>,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        tracing::error!("error: {} message: {}", error, message);
        Self {
            ok: false,
            error: error.to_string(),
            message: Some(message.to_string()),
            status: None,
            details: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_details(mut self, details: JsonValue) -> Self {
        self.details = Some(details);
        self
    }
}

#[derive(Object, Debug)]
pub struct HealthResponse {
    pub status: String,

    /// Whether a fal credential is configured
    pub fal_key_configured: bool,

    /// Width the thumb relay downscales to, if transcoding is enabled
    pub thumb_max_width: Option<u32>,
}
