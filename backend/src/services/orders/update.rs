use actix_web::{web, HttpRequest, HttpResponse, Responder};
use common::requests::OrderPatch;

use crate::db::{OrderStore, StoreError};
use crate::sessions::require_auth;
use crate::state::AppState;

pub(crate) async fn process(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    payload: web::Json<OrderPatch>,
) -> impl Responder {
    if let Err(resp) = require_auth(&req, state.sessions.as_ref()) {
        return resp;
    }
    let id = path.into_inner();
    let result = OrderStore::open(&state.config.database_path)
        .and_then(|store| store.update(id, &payload));
    match result {
        Ok(order) => HttpResponse::Ok().json(order),
        Err(StoreError::NotFound) => HttpResponse::NotFound().body("Order not found"),
        Err(StoreError::DuplicateTrackingCode) => {
            HttpResponse::BadRequest().body("Tracking code already exists")
        }
        Err(e) => HttpResponse::InternalServerError().body(format!("Error updating order: {}", e)),
    }
}
