use poem_openapi::{
    ApiResponse,
    payload::{Attachment, AttachmentType, PlainText},
};

use crate::core::relay::{CACHE_CONTROL, RelayedImage};
use crate::error::RelayError;

#[derive(ApiResponse)]
pub enum ThumbResponse {
    /// Image bytes with the content type reported upstream (or `image/jpeg`
    /// when transcoded)
    #[oai(status = 200)]
    Image(
        Attachment<Vec<u8>>,
        #[oai(header = "Content-Type")] String,
        #[oai(header = "Cache-Control")] String,
    ),

    #[oai(status = 400)]
    BadRequest(PlainText<String>),

    #[oai(status = 403)]
    Forbidden(PlainText<String>),

    #[oai(status = 502)]
    BadGateway(PlainText<String>),

    #[oai(status = 500)]
    InternalServerError(PlainText<String>),
}

impl ThumbResponse {
    pub fn image(image: RelayedImage) -> Self {
        let body = Attachment::new(image.bytes).attachment_type(AttachmentType::Inline);
        ThumbResponse::Image(body, image.content_type, CACHE_CONTROL.to_string())
    }
}

impl From<RelayError> for ThumbResponse {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::MissingSource | RelayError::InvalidSource => {
                ThumbResponse::BadRequest(PlainText(err.to_string()))
            }
            RelayError::ForbiddenHost(host) => {
                tracing::warn!(host, "relay refused host");
                ThumbResponse::Forbidden(PlainText("Host not allowed".to_string()))
            }
            RelayError::UpstreamStatus(_)
            | RelayError::UpstreamFetch(_)
            | RelayError::TooLarge(_) => {
                tracing::warn!("relay fetch failed: {}", err);
                ThumbResponse::BadGateway(PlainText("Upstream failed".to_string()))
            }
            RelayError::Task(e) => {
                tracing::error!("relay task failed: {}", e);
                ThumbResponse::InternalServerError(PlainText("Server error".to_string()))
            }
        }
    }
}
