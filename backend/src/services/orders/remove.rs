use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::db::{OrderStore, StoreError};
use crate::sessions::require_auth;
use crate::state::AppState;

pub(crate) async fn process(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> impl Responder {
    if let Err(resp) = require_auth(&req, state.sessions.as_ref()) {
        return resp;
    }
    let id = path.into_inner();
    let result =
        OrderStore::open(&state.config.database_path).and_then(|store| store.delete(id));
    match result {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(StoreError::NotFound) => HttpResponse::NotFound().body("Order not found"),
        Err(e) => HttpResponse::InternalServerError().body(format!("Error deleting order: {}", e)),
    }
}
