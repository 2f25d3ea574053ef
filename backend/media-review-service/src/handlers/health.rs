use actix_web::{web, HttpResponse};

use crate::state::AppState;

/// Service status
pub async fn server_status(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.health.status())
}
