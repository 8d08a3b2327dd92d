use actix_web::{web, HttpRequest, HttpResponse, Responder};
use common::requests::OrderQuery;

use crate::db::OrderStore;
use crate::sessions::require_auth;
use crate::state::AppState;

pub(crate) async fn process(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<OrderQuery>,
) -> impl Responder {
    if let Err(resp) = require_auth(&req, state.sessions.as_ref()) {
        return resp;
    }
    let result = OrderStore::open(&state.config.database_path)
        .and_then(|store| store.daily_stats(&query));
    match result {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => {
            HttpResponse::InternalServerError().body(format!("Error querying daily stats: {}", e))
        }
    }
}
