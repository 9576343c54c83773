use actix_web::{web, HttpResponse};

use ns_core::services::{decode_push_payload, WorkerAck};

use crate::dto::{PushEnvelope, WorkerResponse};
use crate::state::AppState;

/// Handler for POST /api/v1/worker/process
///
/// Push-subscription endpoint. The body is parsed by hand so that every
/// outcome, including a malformed body, is acknowledged with 200 and never
/// redelivered.
///
/// # Request Body
///
/// ```json
/// {
///     "message": {"data": "<base64 JSON>", "messageId": "123"},
///     "subscription": "projects/p/subscriptions/s"
/// }
/// ```
pub async fn process_push(state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    let envelope: PushEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::error!(error = %e, event = "worker_error", "Malformed push body");
            return HttpResponse::Ok().json(WorkerResponse::error(e.to_string()));
        }
    };

    let mut message = match decode_push_payload(&envelope.message.data) {
        Ok(message) => message,
        Err(e) => {
            tracing::error!(
                push_message_id = ?envelope.message.message_id,
                error = %e,
                event = "worker_error",
                "Failed to decode push message"
            );
            return HttpResponse::Ok().json(WorkerResponse::error(e.to_string()));
        }
    };
    if message.id.is_none() {
        message.id = envelope.message.message_id;
    }

    let response = match state.worker.process_push(message).await {
        WorkerAck::Processed(_) => WorkerResponse::processed(),
        WorkerAck::Unsupported { .. } => WorkerResponse::unsupported_type(),
    };
    HttpResponse::Ok().json(response)
}
