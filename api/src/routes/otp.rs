use actix_web::{web, HttpResponse};
use validator::Validate;

use ns_core::errors::DomainError;
use ns_core::services::otp_notification;
use ns_shared::masking::mask_identifier;
use ns_shared::types::ApiResponse;

use crate::dto::{GenerateOtpRequest, GenerateOtpResponse, VerifyOtpRequest, VerifyOtpResponse};
use crate::handlers::error::invalid_otp;
use crate::handlers::{handle_domain_error, handle_validation_errors};
use crate::state::AppState;

/// Handler for POST /api/v1/otp/generate
///
/// Issues a fresh passcode for the identifier, replacing any earlier one.
/// The code is never returned; with `channel` set it is dispatched to the
/// identifier through the notification queue.
///
/// # Responses
/// - 200: `{"status": "success", "data": {"identifier": "..."}}`
/// - 400: malformed identifier, or identifier unusable on the channel
/// - 500: the delivery could not be queued
/// - 503: OTP store unavailable
pub async fn generate_otp(
    state: web::Data<AppState>,
    request: web::Json<GenerateOtpRequest>,
) -> HttpResponse {
    let request = request.into_inner();
    if let Err(errors) = request.validate() {
        return handle_validation_errors(&errors);
    }
    if let Err(e) = request.validate_channel() {
        return handle_domain_error(DomainError::Validation(e));
    }

    let issued = match state.otp_service.issue(&request.identifier).await {
        Ok(issued) => issued,
        Err(e) => return handle_domain_error(e),
    };

    let mut message_id = None;
    if let Some(kind) = request.channel {
        let notification = otp_notification(
            kind,
            &request.identifier,
            &issued.code,
            state.otp_service.config().ttl,
        );
        match state.dispatch.notify(notification).await {
            Ok(id) => message_id = Some(id),
            Err(e) => {
                tracing::error!(
                    identifier = %mask_identifier(&request.identifier),
                    error = %e,
                    event = "otp_delivery_queue_failed",
                    "OTP stored but delivery could not be queued"
                );
                return handle_domain_error(e);
            }
        }
    }

    HttpResponse::Ok().json(ApiResponse::success(
        "OTP generated and stored",
        GenerateOtpResponse {
            identifier: request.identifier,
            message_id,
        },
    ))
}

/// Handler for POST /api/v1/otp/verify
///
/// Verifies and consumes a passcode. Every way a code can fail to verify
/// (unknown, wrong, expired, already used) gets the same 400 response.
///
/// # Responses
/// - 200: `{"status": "success", "data": {"verified": true}}`
/// - 400: "Invalid or expired OTP", or a malformed request
/// - 429: too many attempts for this identifier
/// - 503: OTP store unavailable
pub async fn verify_otp(
    state: web::Data<AppState>,
    request: web::Json<VerifyOtpRequest>,
) -> HttpResponse {
    let request = request.into_inner();
    if let Err(errors) = request.validate() {
        return handle_validation_errors(&errors);
    }

    match state.otp_service.verify(&request.identifier, &request.otp).await {
        Ok(true) => HttpResponse::Ok().json(ApiResponse::success(
            "OTP verified successfully",
            VerifyOtpResponse { verified: true },
        )),
        Ok(false) => invalid_otp(),
        Err(e) => handle_domain_error(e),
    }
}
