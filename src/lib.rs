use std::any::Any;
use std::sync::Arc;

use poem::{
    Endpoint, EndpointExt, Response, Route,
    http::{StatusCode, header},
    middleware::{AddData, CatchPanic, SetHeader, Tracing},
};
use poem_openapi::OpenApiService;

use crate::core::{fal::FalClient, relay::ImageRelay};
use crate::routes::{edit::ApiEdit, health::ApiHealth, thumb::ApiThumb};
use crate::settings::Config;

pub mod core;
pub mod error;
pub mod routes;
pub mod schemas;
pub mod settings;

pub struct AppState {
    pub config: Config,
    pub fal: FalClient,
    pub relay: ImageRelay,
}

impl AppState {
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let fal = FalClient::new(
            config.fal_endpoint.clone(),
            config.fal_key().map(str::to_string),
            config.fal_timeout(),
        );
        let relay = ImageRelay::with_default_hosts(config.thumb_max_width)?
            .with_timeout(config.thumb_timeout())
            .with_max_bytes(config.thumb_max_bytes);
        Ok(Self { config, fal, relay })
    }
}

pub fn init_openapi_route(app_state: Arc<AppState>) -> impl Endpoint {
    let prefix = app_state.config.prefix();
    let mount = if prefix.is_empty() {
        "/".to_string()
    } else {
        prefix
    };

    let openapi_route = OpenApiService::new((ApiEdit, ApiThumb, ApiHealth), "Agape Proxy API", "1.0")
        .server(mount.clone());

    let openapi_json_endpoint = openapi_route.spec_endpoint();
    let ui = openapi_route.swagger_ui();
    Route::new()
        .nest(mount, openapi_route)
        .nest("/docs", ui)
        .at("openapi.json", openapi_json_endpoint)
        .catch_all_error(error_envelope)
        .with(AddData::new(app_state))
        .with(cors_headers())
        .with(Tracing)
        .with(CatchPanic::new().with_handler(panic_response))
}

fn cors_headers() -> SetHeader {
    SetHeader::new()
        .overriding(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .overriding(header::ACCESS_CONTROL_ALLOW_METHODS, "GET,POST,OPTIONS")
        .overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            "Content-Type,Authorization",
        )
}

fn json_error(status: StatusCode, error: &str) -> Response {
    Response::builder()
        .status(status)
        .content_type("application/json")
        .body(serde_json::json!({ "ok": false, "error": error }).to_string())
}

/// Routing and extraction errors get the same `ok:false` body as handler
/// errors; the underlying message is logged, not returned.
async fn error_envelope(err: poem::Error) -> Response {
    let status = err.status();
    let tag = match status {
        StatusCode::METHOD_NOT_ALLOWED => "method_not_allowed",
        StatusCode::NOT_FOUND => "not_found",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "unsupported_media_type",
        status if status.is_client_error() => "bad_request",
        _ => "server_error",
    };
    if status.is_server_error() {
        tracing::error!(status = status.as_u16(), "request failed: {}", err);
    } else {
        tracing::debug!(status = status.as_u16(), "request rejected: {}", err);
    }
    json_error(status, tag)
}

fn panic_response(_: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("handler panicked");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "server_error")
}
