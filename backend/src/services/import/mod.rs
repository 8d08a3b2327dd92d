//! Workbook import: the ingestion and reconciliation pipeline.
//!
//! The operator uploads the marketplace Excel export through
//! `POST /api/import` (multipart, `file` field). The pipeline then runs in
//! three steps:
//!
//! 1. `workbook` opens the spreadsheet, picks the data sheet (the one named
//!    for the current year, else the first) and hands back the raw rows
//!    below the header. Structural problems end the import here with a 400.
//! 2. `normalize` turns each raw row into a canonical order record, parsing
//!    the date, amount and status cells, which arrive in several
//!    loosely-formatted shapes; a row whose tracking code cell is blank
//!    becomes a skip.
//! 3. `reconcile` upserts each record against the store, keyed on the
//!    tracking code, and tallies `{inserted, updated, skipped}`. Row-level
//!    failures are counted and logged, never fatal.
//!
//! The route answers with the final counters as JSON.

use actix_web::web::{post, scope};
use actix_web::Scope;

pub mod normalize;
pub mod reconcile;
mod upload;
pub mod workbook;

const API_PATH: &str = "/api/import";

/// Configures and returns the Actix scope for the import route.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", post().to(upload::process))
}
