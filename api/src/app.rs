//! Route table and extractor configuration

use actix_web::{error::InternalError, web, HttpResponse};

use ns_shared::types::ErrorResponse;

use crate::routes::{health, notify, otp, worker};

/// Largest JSON body accepted by the API
const JSON_LIMIT_BYTES: usize = 64 * 1024;

/// Register every route of the service
///
/// Expects `web::Data<AppState>` to be registered on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/healthz", web::get().to(health::health_check))
        .service(
            web::scope("/api/v1")
                .route("/notify", web::post().to(notify::send_notification))
                .service(
                    web::scope("/otp")
                        .route("/generate", web::post().to(otp::generate_otp))
                        .route("/verify", web::post().to(otp::verify_otp)),
                )
                .route("/worker/process", web::post().to(worker::process_push)),
        )
        .default_service(web::route().to(not_found));
}

/// JSON extractor config that answers malformed bodies with an [`ErrorResponse`]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(|err, _req| {
            let response = HttpResponse::BadRequest()
                .json(ErrorResponse::new("invalid_request", err.to_string()));
            InternalError::from_response(err, response).into()
        })
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        "not_found",
        "The requested resource was not found",
    ))
}
