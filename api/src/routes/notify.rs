use actix_web::{web, HttpResponse};
use validator::Validate;

use ns_core::domain::NotificationRequest;
use ns_shared::types::ApiResponse;

use crate::dto::{NotifyRequest, NotifyResponse};
use crate::handlers::{handle_domain_error, handle_validation_errors};
use crate::state::AppState;

/// Handler for POST /api/v1/notify
///
/// Queues the notification and returns without waiting for delivery.
///
/// # Request Body
///
/// ```json
/// {
///     "type": "email",
///     "recipient": "user@example.com",
///     "message": "Your order has shipped",
///     "metadata": {"subject": "Order update"}
/// }
/// ```
///
/// # Responses
/// - 200: `{"status": "success", "data": {"message_id": "..."}}`
/// - 400: invalid type, recipient or message
/// - 500: the queue rejected the message
pub async fn send_notification(
    state: web::Data<AppState>,
    request: web::Json<NotifyRequest>,
) -> HttpResponse {
    let request = request.into_inner();
    if let Err(errors) = request.validate() {
        return handle_validation_errors(&errors);
    }

    match state.dispatch.notify(NotificationRequest::from(request)).await {
        Ok(message_id) => HttpResponse::Ok().json(ApiResponse::success(
            "Notification queued successfully",
            NotifyResponse { message_id },
        )),
        Err(e) => handle_domain_error(e),
    }
}
