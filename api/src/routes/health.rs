use actix_web::{web, HttpResponse};

use ns_shared::types::HealthResponse;

use crate::state::AppState;

/// Handler for GET /healthz
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse::healthy(state.service_name.clone()))
}
