//! Revenue statistics over the order records.
//!
//! Plain aggregations the dashboard charts read, all behind the session
//! guard and all honoring the same filters as the order listing:
//!
//! - `GET /api/stats/daily`: per order date, the order count, summed original
//!   and discounted amounts, and the profit (original minus discounted).
//! - `GET /api/stats/monthly`: the same aggregates per `YYYY-MM` month.
//! - `GET /api/stats/summary`: whole-table totals plus per-status counts.
//!
//! Records without an order date stay out of the daily and monthly
//! breakdowns; the summary counts everything.

use actix_web::web::{get, scope};
use actix_web::Scope;

mod daily;
mod monthly;
mod summary;

const API_PATH: &str = "/api/stats";

/// Configures and returns the Actix scope for the statistics routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/daily", get().to(daily::process))
        .route("/monthly", get().to(monthly::process))
        .route("/summary", get().to(summary::process))
}
