use actix_web::{web, HttpRequest, HttpResponse, Responder};
use common::model::order::Order;
use common::requests::OrderQuery;

use crate::db::{OrderStore, StoreError};
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
    match list_orders(&state, &query) {
        Ok(orders) => HttpResponse::Ok().json(orders),
        Err(e) => HttpResponse::InternalServerError().body(format!("Error listing orders: {}", e)),
    }
}

fn list_orders(state: &AppState, query: &OrderQuery) -> Result<Vec<Order>, StoreError> {
    let store = OrderStore::open(&state.config.database_path)?;
    store.list(query)
}
