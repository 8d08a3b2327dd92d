use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::db::OrderStore;
use crate::sessions::require_auth;
use crate::state::AppState;

pub(crate) async fn process(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    if let Err(resp) = require_auth(&req, state.sessions.as_ref()) {
        return resp;
    }
    let result =
        OrderStore::open(&state.config.database_path).and_then(|store| store.summary_stats());
    match result {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => {
            HttpResponse::InternalServerError().body(format!("Error querying stats: {}", e))
        }
    }
}
