//! Operator authentication endpoints.
//!
//! - `POST /api/auth/login`: checks the submitted credentials against the
//!   configured admin account and answers with a fresh bearer token that the
//!   session store will recognize from then on.
//! - `POST /api/auth/logout`: revokes the presented bearer token.

use actix_web::web::{post, scope};
use actix_web::Scope;

mod login;
mod logout;

const API_PATH: &str = "/api/auth";

/// Configures and returns the Actix scope for the auth routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/login", post().to(login::process))
        .route("/logout", post().to(logout::process))
}
