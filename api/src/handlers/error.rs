//! Conversion of domain errors into HTTP responses
//!
//! | Error | Status |
//! |---|---|
//! | `Validation` | 400 |
//! | `RateLimitExceeded` | 429 with `Retry-After` |
//! | `QueueUnavailable` | 500 |
//! | `StoreUnavailable` | 503 |
//! | `Internal` | 500 |

use actix_web::{http::header, HttpResponse};
use validator::ValidationErrors;

use ns_core::errors::DomainError;
use ns_shared::types::ErrorResponse;

/// Message returned when a passcode does not verify
pub const INVALID_OTP_MESSAGE: &str = "Invalid or expired OTP";

/// Handle domain errors and convert them to appropriate HTTP responses
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    match &error {
        DomainError::Validation(e) => {
            tracing::debug!(error = %e, "Request rejected by validation");
            HttpResponse::BadRequest().json(ErrorResponse::new("validation_error", e.to_string()))
        }
        DomainError::RateLimitExceeded { retry_after_seconds } => {
            tracing::warn!(retry_after_seconds = retry_after_seconds, "Rate limit exceeded");
            HttpResponse::TooManyRequests()
                .insert_header((header::RETRY_AFTER, retry_after_seconds.to_string()))
                .json(ErrorResponse::new("rate_limit_exceeded", error.to_string()))
        }
        DomainError::QueueUnavailable { message } => {
            tracing::error!(error = %message, "Queue unavailable");
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "queue_unavailable",
                "Failed to queue notification",
            ))
        }
        DomainError::StoreUnavailable { message } => {
            tracing::error!(error = %message, "OTP store unavailable");
            HttpResponse::ServiceUnavailable().json(ErrorResponse::new(
                "store_unavailable",
                "OTP service is temporarily unavailable",
            ))
        }
        DomainError::Internal { message } => {
            tracing::error!(error = %message, "Internal error");
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "internal_error",
                "An internal error occurred",
            ))
        }
    }
}

/// Respond 400 for a DTO that failed `validator` checks
pub fn handle_validation_errors(errors: &ValidationErrors) -> HttpResponse {
    let mut fields: Vec<&str> = errors.field_errors().into_keys().collect();
    fields.sort_unstable();

    HttpResponse::BadRequest().json(ErrorResponse::new(
        "validation_error",
        format!("Invalid request fields: {}", fields.join(", ")),
    ))
}

/// Respond 400 for a passcode that did not verify
pub fn invalid_otp() -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse::new("invalid_otp", INVALID_OTP_MESSAGE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use ns_core::errors::ValidationError;

    #[test]
    fn test_status_mapping() {
        let cases = vec![
            (
                DomainError::Validation(ValidationError::required("recipient")),
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::RateLimitExceeded { retry_after_seconds: 30 },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                DomainError::QueueUnavailable { message: "down".to_string() },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                DomainError::StoreUnavailable { message: "down".to_string() },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                DomainError::Internal { message: "bug".to_string() },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(handle_domain_error(error).status(), expected);
        }
    }

    #[test]
    fn test_rate_limit_sets_retry_after() {
        let response = handle_domain_error(DomainError::RateLimitExceeded { retry_after_seconds: 42 });
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            "42"
        );
    }
}
