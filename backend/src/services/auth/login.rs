use actix_web::{web, HttpResponse, Responder};
use common::requests::{LoginRequest, LoginResponse};
use log::{info, warn};
use uuid::Uuid;

use crate::state::AppState;

pub(crate) async fn process(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> impl Responder {
    let req = payload.into_inner();
    if req.username.is_empty() || req.password.is_empty() {
        return HttpResponse::BadRequest().body("Missing username or password");
    }
    if req.username != state.config.admin_username || req.password != state.config.admin_password
    {
        warn!("rejected login attempt for user {}", req.username);
        return HttpResponse::Unauthorized().body("Invalid username or password");
    }

    let token = Uuid::new_v4().to_string();
    state.sessions.add(token.clone());
    info!("operator {} logged in", req.username);
    HttpResponse::Ok().json(LoginResponse { token })
}
