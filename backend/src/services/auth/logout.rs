use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::sessions::bearer_token;
use crate::state::AppState;

pub(crate) async fn process(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    match bearer_token(&req) {
        Some(token) => {
            state.sessions.revoke(token);
            HttpResponse::Ok().json(serde_json::json!({ "success": true }))
        }
        None => HttpResponse::BadRequest().body("Missing bearer token"),
    }
}
