use actix_web::{web, HttpRequest, HttpResponse, Responder};
use common::model::order::Order;
use common::requests::NewOrderRequest;

use crate::db::{NewOrder, OrderStore, StoreError};
use crate::services::import::normalize::amount_value;
use crate::sessions::require_auth;
use crate::state::AppState;

pub(crate) async fn process(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<NewOrderRequest>,
) -> impl Responder {
    if let Err(resp) = require_auth(&req, state.sessions.as_ref()) {
        return resp;
    }
    let body = payload.into_inner();
    if body.tracking_code.trim().is_empty() {
        return HttpResponse::BadRequest().body("Missing tracking code");
    }
    match create_order(&state, body) {
        Ok(order) => HttpResponse::Ok().json(order),
        Err(StoreError::DuplicateTrackingCode) => {
            HttpResponse::BadRequest().body("Tracking code already exists")
        }
        Err(e) => HttpResponse::InternalServerError().body(format!("Error creating order: {}", e)),
    }
}

fn create_order(state: &AppState, body: NewOrderRequest) -> Result<Order, StoreError> {
    let non_blank = |value: Option<String>| value.filter(|s| !s.trim().is_empty());
    let new = NewOrder {
        tracking_code: body.tracking_code.trim().to_string(),
        product_name: non_blank(body.product_name),
        original_amount: body.original_amount.as_ref().and_then(amount_value),
        discounted_amount: body.discounted_amount.as_ref().and_then(amount_value),
        address_code: non_blank(body.address_code),
        order_date: body.order_date,
        received_date: body.received_date,
        status: body.status.unwrap_or_default(),
        note: non_blank(body.note),
        shop_name: non_blank(body.shop_name),
    };
    let store = OrderStore::open(&state.config.database_path)?;
    store.create(&new)
}
