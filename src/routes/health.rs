use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{OpenApi, payload::Json};

use super::ApiTags;
use crate::{AppState, schemas::common::HealthResponse};

pub struct ApiHealth;

#[OpenApi]
impl ApiHealth {
    #[oai(path = "/health", method = "get", tag = "ApiTags::Health")]
    async fn health(&self, state: Data<&Arc<AppState>>) -> Json<HealthResponse> {
        Json(HealthResponse {
            status: "healthy".to_string(),
            fal_key_configured: state.fal.has_credential(),
            thumb_max_width: state.relay.max_width(),
        })
    }
}
