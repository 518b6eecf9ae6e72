use poem::http::StatusCode;
use poem_openapi::{ApiResponse, Object, payload::Json};

use super::common::ErrorResponse;
use crate::core::sanitize::Adjustment;

#[derive(Object, Debug, Clone)]
pub struct AdjustmentItem {
    /// Request field that was normalized
    pub field: String,

    /// `unrecognized`, `truncated` or `forced`
    pub reason: String,
}

impl From<&Adjustment> for AdjustmentItem {
    fn from(adjustment: &Adjustment) -> Self {
        Self {
            field: adjustment.field.to_string(),
            reason: adjustment.reason.as_str().to_string(),
        }
    }
}

#[derive(Object, Debug)]
pub struct EditResult {
    pub ok: bool,

    /// Image URL as returned by fal
    pub image_url: String,

    /// Same-origin relay URL for `image_url`
    pub image_proxy_url: String,

    /// Markdown embedding the relayed image
    pub render_markdown: String,

    /// Markdown link to the original image
    pub download_markdown: String,

    pub mode: String,
    pub sku: String,

    /// Whether the bottle has its cap; always `true` for 335ml
    pub tapa: bool,

    pub aspect_ratio: String,
    pub resolution: String,
    pub output_format: String,
    pub has_reference: bool,

    #[oai(skip_serializing_if_is_none)]
    pub reference_image_url: Option<String>,

    /// Inputs that were replaced by defaults or otherwise normalized
    pub adjustments: Vec<AdjustmentItem>,
}

#[derive(ApiResponse)]
pub enum EditResponse {
    #[oai(status = 200)]
    Ok(Json<EditResult>),

    #[oai(status = 500)]
    InternalServerError(Json<ErrorResponse>),

    #[oai(status = 502)]
    BadGateway(Json<ErrorResponse>),

    /// fal error status passed through unchanged
    Upstream(StatusCode, Json<ErrorResponse>),
}

#[derive(ApiResponse)]
pub enum PreflightResponse {
    #[oai(status = 204)]
    NoContent,
}
