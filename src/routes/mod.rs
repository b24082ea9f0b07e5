// Route exports
pub mod dispatch;

use actix_web::{error, web, HttpRequest, HttpResponse};
use crate::models::ErrorResponse;

pub use dispatch::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
        .route("/health", web::get().to(dispatch::health_check))
        .service(
            web::scope("/api/ai-dispatch")
                .configure(dispatch::configure),
        );
}

/// Turn JSON extractor failures into the shared error body
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    let body = ErrorResponse {
        error: "Richiesta non valida".to_string(),
        details: Some(format!("Invalid JSON: {}", err)),
    };
    error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}
