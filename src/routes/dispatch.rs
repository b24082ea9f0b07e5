use actix_web::{error::ResponseError, http::StatusCode, web, HttpResponse, Responder};
use crate::core::{find_preset, format_response, to_html, PRESETS};
use crate::models::{DispatchResponse, ErrorResponse, FormatRequest, FormatResponse, HealthResponse, PresetsResponse};
use crate::services::{DispatchError, Dispatcher};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub max_body_bytes: usize,
}

impl ResponseError for DispatchError {
    fn status_code(&self) -> StatusCode {
        match self {
            DispatchError::MissingCredential => StatusCode::SERVICE_UNAVAILABLE,
            DispatchError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            DispatchError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            DispatchError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            DispatchError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            details: self.details(),
        })
    }
}

/// Configure the AI dispatch routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("", web::post().to(dispatch))
        .route("/presets", web::get().to(list_presets))
        .route("/presets/{id}", web::get().to(get_preset))
        .route("/format", web::post().to(format_text));
}

/// Health check endpoint
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let ai_configured = state.dispatcher.is_configured();
    let status = if ai_configured { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ai_configured,
        timestamp: chrono::Utc::now(),
    })
}

/// AI dispatch endpoint
///
/// POST /api/ai-dispatch
///
/// Request body:
/// ```json
/// {
///   "userQuery": "string",
///   "context": { "drivers": [], "vehicles": [], "trips": [] }
/// }
/// ```
///
/// The body is streamed rather than extracted, so the credential check runs
/// before it is read and an oversized body still gets a JSON error.
async fn dispatch(
    state: web::Data<AppState>,
    payload: web::Payload,
) -> Result<HttpResponse, DispatchError> {
    state.dispatcher.ensure_configured()?;

    let body = match payload.to_bytes_limited(state.max_body_bytes).await {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => {
            return Err(DispatchError::InvalidRequest(format!("Failed to read body: {}", e)));
        }
        Err(_) => {
            tracing::info!("Dispatch body exceeded {} bytes", state.max_body_bytes);
            return Err(DispatchError::PayloadTooLarge { limit: state.max_body_bytes });
        }
    };

    let result = state.dispatcher.relay(&body).await?;
    Ok(HttpResponse::Ok().json(DispatchResponse { result }))
}

/// GET /api/ai-dispatch/presets
async fn list_presets() -> impl Responder {
    HttpResponse::Ok().json(PresetsResponse { presets: PRESETS })
}

/// GET /api/ai-dispatch/presets/{id}
async fn get_preset(path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    match find_preset(&id) {
        Some(preset) => HttpResponse::Ok().json(preset),
        None => HttpResponse::NotFound().json(ErrorResponse {
            error: "Preset non trovato".to_string(),
            details: Some(format!("Nessun preset con id '{}'", id)),
        }),
    }
}

/// Format a model answer into display blocks plus escaped HTML
///
/// POST /api/ai-dispatch/format
async fn format_text(req: web::Json<FormatRequest>) -> impl Responder {
    let blocks = format_response(&req.text);
    let html = to_html(&blocks);
    HttpResponse::Ok().json(FormatResponse { blocks, html })
}
