use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{OpenApi, param::Query};

use super::ApiTags;
use crate::{AppState, schemas::thumb::ThumbResponse};

pub struct ApiThumb;

#[OpenApi]
impl ApiThumb {
    /// Image relay
    ///
    /// Fetch a generated image from an allow-listed host and stream it back
    /// from this origin. When transcoding is enabled the image is downscaled
    /// and re-encoded as JPEG.
    #[oai(path = "/agape/thumb", method = "get", tag = "ApiTags::Agape")]
    async fn thumb(&self, src: Query<Option<String>>, state: Data<&Arc<AppState>>) -> ThumbResponse {
        match state.relay.relay(src.0.as_deref()).await {
            Ok(image) => {
                tracing::debug!(
                    bytes = image.bytes.len(),
                    content_type = %image.content_type,
                    "relayed image"
                );
                ThumbResponse::image(image)
            }
            Err(e) => ThumbResponse::from(e),
        }
    }
}
