//! Order record management.
//!
//! All routes require a valid session token. Registered under `/api/orders`:
//!
//! - **`GET`**: lists records, newest order date first, with the optional
//!   filters `q` (substring of product name or tracking code), `status`
//!   (`ALL` or absent = no filter) and `from_date`/`to_date` (inclusive
//!   bounds on the order date).
//! - **`POST`**: manual creation through the edit form. The tracking code is
//!   required; amounts may arrive as numbers or as formatted strings and go
//!   through the same cleanup as imported cells. A duplicate tracking code
//!   answers 400 with a distinct message.
//! - **`PUT /{id}`**: partial update. Only fields present in the body are
//!   written; `null` clears a field. Manual edits are the one way to set
//!   `note` and `shop_name` (the next import resets them).
//! - **`DELETE /{id}`**: removes the record.

use actix_web::web;
use actix_web::Scope;

mod create;
mod list;
mod remove;
mod update;

const API_PATH: &str = "/api/orders";

/// Configures and returns the Actix scope for the order routes.
pub fn configure_routes() -> Scope {
    web::scope(API_PATH)
        .route("", web::get().to(list::process))
        .route("", web::post().to(create::process))
        .route("/{id}", web::put().to(update::process))
        .route("/{id}", web::delete().to(remove::process))
}
