use std::sync::Arc;

use poem::{Request, http::StatusCode, web::Data};
use poem_openapi::{OpenApi, payload::Json};

use super::ApiTags;
use crate::{
    AppState,
    core::{
        assets,
        fal::FalEditRequest,
        links::{self, ForwardedOrigin},
        prompt,
        sanitize::{Sanitized, decode_body, sanitize},
    },
    error::DispatchError,
    schemas::{
        common::ErrorResponse,
        edit::{AdjustmentItem, EditResponse, EditResult, PreflightResponse},
    },
};

pub struct ApiEdit;

#[OpenApi]
impl ApiEdit {
    /// Generate
    ///
    /// Compose a product-photography prompt for the requested bottle and
    /// send it to the fal edit model together with the bottle asset
    /// (and the reference image, when one is given).
    ///
    /// The body is read as JSON whatever its declared content type: an
    /// object, or a JSON-encoded string holding one. Every field is optional
    /// and unknown values fall back to defaults; an empty or unparsable body
    /// is treated as `{}`.
    ///
    /// # Example Request
    /// ```json
    /// {
    ///   "mode": "caribe",
    ///   "scene": "bottle on wet sand at sunrise",
    ///   "sku": "600ml",
    ///   "tapa": false,
    ///   "aspect_ratio": "4:5",
    ///   "resolution": "2K",
    ///   "reference_image_url": "https://example.com/framing.jpg"
    /// }
    /// ```
    #[oai(path = "/agape/edit", method = "post", tag = "ApiTags::Agape")]
    async fn edit(
        &self,
        body: Vec<u8>,
        req: &Request,
        state: Data<&Arc<AppState>>,
    ) -> EditResponse {
        if !state.fal.has_credential() {
            return dispatch_failure(DispatchError::MissingCredential);
        }

        let Sanitized {
            request,
            adjustments,
        } = sanitize(decode_body(&body));

        tracing::info!(
            mode = request.mode.as_str(),
            sku = request.sku.as_str(),
            tapa = request.has_cap,
            aspect_ratio = request.aspect_ratio.as_str(),
            resolution = request.resolution.as_str(),
            reference = request.has_reference(),
            "edit request"
        );
        if !adjustments.is_empty() {
            tracing::debug!(?adjustments, "request normalized");
        }

        let asset_url = assets::resolve(request.sku, request.has_cap);
        let prompt = prompt::compose(&request);
        let fal_request = FalEditRequest::new(prompt, asset_url, &request);

        let result = match state.fal.dispatch(&fal_request).await {
            Ok(result) => result,
            Err(e) => return dispatch_failure(e),
        };

        let origin = ForwardedOrigin::from_headers(
            req.header("x-forwarded-proto"),
            req.header("x-forwarded-host"),
            req.header("host"),
        );
        let image_proxy_url = links::proxy_url(&origin, &state.config.prefix(), &result.url);

        tracing::info!(image_url = %result.url, "edit completed");

        EditResponse::Ok(Json(EditResult {
            ok: true,
            render_markdown: links::render_markdown(&image_proxy_url),
            download_markdown: links::download_markdown(&result.url),
            image_url: result.url,
            image_proxy_url,
            mode: request.mode.as_str().to_string(),
            sku: request.sku.as_str().to_string(),
            tapa: request.has_cap,
            aspect_ratio: request.aspect_ratio.as_str().to_string(),
            resolution: request.resolution.as_str().to_string(),
            output_format: request.output_format.as_str().to_string(),
            has_reference: request.has_reference(),
            reference_image_url: request.reference_image_url,
            adjustments: adjustments.iter().map(AdjustmentItem::from).collect(),
        }))
    }

    /// CORS preflight for the generate endpoint.
    #[oai(path = "/agape/edit", method = "options", tag = "ApiTags::Agape")]
    async fn edit_preflight(&self) -> PreflightResponse {
        PreflightResponse::NoContent
    }
}

fn dispatch_failure(err: DispatchError) -> EditResponse {
    let tag = err.tag();
    match err {
        DispatchError::MissingCredential => EditResponse::InternalServerError(Json(
            ErrorResponse::new(tag, "Missing FAL_KEY in server environment"),
        )),
        DispatchError::Timeout => EditResponse::BadGateway(Json(ErrorResponse::new(
            tag,
            "Image generation timed out",
        ))),
        DispatchError::Network(e) => {
            EditResponse::BadGateway(Json(ErrorResponse::new(tag, &e.to_string())))
        }
        DispatchError::Upstream { status, details } => {
            let body = ErrorResponse::new(tag, "Image generation failed")
                .with_status(status)
                .with_details(details);
            match StatusCode::from_u16(status) {
                Ok(code) => EditResponse::Upstream(code, Json(body)),
                Err(_) => EditResponse::BadGateway(Json(body)),
            }
        }
        DispatchError::NoImageReturned { details } => EditResponse::BadGateway(Json(
            ErrorResponse::new(tag, "Image generation returned no image").with_details(details),
        )),
    }
}
