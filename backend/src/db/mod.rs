//! SQLite persistence for order records.
//!
//! `OrderStore` wraps one `rusqlite` connection and owns every statement the
//! rest of the backend runs against the `orders` table. The table carries a
//! UNIQUE constraint on `tracking_code`, the business key the import
//! reconciliation matches on; the surrogate `id` exists only for the manual
//! edit and delete endpoints.
//!
//! Two write paths matter:
//! - `upsert_imported` is the reconciliation write. It decides insert vs.
//!   update with an explicit existence check and reports the outcome as
//!   `UpsertOutcome::{Created, Replaced}`, so the import counters never have
//!   to guess from the shape of an upsert result. Every import write also
//!   resets `note` and `shop_name`.
//! - `create`/`update` are the manual-edit writes. A violated tracking-code
//!   constraint surfaces as the distinct `StoreError::DuplicateTrackingCode`
//!   so handlers can answer with a precise message instead of a generic 500.

use chrono::NaiveDate;
use common::model::order::{Order, OrderStatus};
use common::requests::{DailyStat, MonthlyStat, OrderQuery, StatusCount, SummaryStats};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;

use crate::services::import::normalize::{amount_value, NormalizedOrder};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("tracking code already exists")]
    DuplicateTrackingCode,
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// Outcome of a reconciliation write, reported explicitly instead of being
/// inferred from the returned row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Replaced,
}

/// Field values for a manual order creation, after the handler has parsed
/// amounts and emptied blank strings.
#[derive(Debug, Default)]
pub struct NewOrder {
    pub tracking_code: String,
    pub product_name: Option<String>,
    pub original_amount: Option<f64>,
    pub discounted_amount: Option<f64>,
    pub address_code: Option<String>,
    pub order_date: Option<NaiveDate>,
    pub received_date: Option<NaiveDate>,
    pub status: OrderStatus,
    pub note: Option<String>,
    pub shop_name: Option<String>,
}

const ORDER_COLUMNS: &str = "id, tracking_code, product_name, original_amount, discounted_amount, \
     address_code, order_date, received_date, status, note, shop_name";

pub struct OrderStore {
    conn: Connection,
}

impl OrderStore {
    /// Opens the database file and makes sure the schema exists.
    pub fn open(path: &Path) -> Result<OrderStore, StoreError> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        Ok(OrderStore { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<OrderStore, StoreError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(OrderStore { conn })
    }

    pub fn find_by_tracking_code(&self, code: &str) -> Result<Option<Order>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {ORDER_COLUMNS} FROM orders WHERE tracking_code = ?1"
            ))?;
        Ok(stmt.query_row(params![code], read_order).optional()?)
    }

    pub fn get(&self, id: i64) -> Result<Order, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"))?;
        stmt.query_row(params![id], read_order)
            .optional()?
            .ok_or(StoreError::NotFound)
    }

    /// Reconciliation write for one normalized import row.
    ///
    /// An existing record with the same tracking code is overwritten on every
    /// import-derived field, and `note`/`shop_name` are reset to empty:
    /// import always wins over prior manual edits of those two fields. The
    /// existence check and the write run on the same connection, so duplicate
    /// codes inside one batch resolve to `Replaced` instead of tripping the
    /// UNIQUE constraint.
    pub fn upsert_imported(&self, rec: &NormalizedOrder) -> Result<UpsertOutcome, StoreError> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM orders WHERE tracking_code = ?1",
                params![rec.tracking_code],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(id) => {
                self.conn.execute(
                    "UPDATE orders SET product_name = ?1, original_amount = ?2, \
                     discounted_amount = ?3, address_code = ?4, order_date = ?5, \
                     received_date = ?6, status = ?7, note = NULL, shop_name = NULL \
                     WHERE id = ?8",
                    params![
                        rec.product_name,
                        rec.original_amount,
                        rec.discounted_amount,
                        rec.address_code,
                        rec.order_date,
                        rec.received_date,
                        rec.status.as_str(),
                        id
                    ],
                )?;
                Ok(UpsertOutcome::Replaced)
            }
            None => {
                self.conn
                    .execute(
                        "INSERT INTO orders (tracking_code, product_name, original_amount, \
                         discounted_amount, address_code, order_date, received_date, status, \
                         note, shop_name) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, NULL)",
                        params![
                            rec.tracking_code,
                            rec.product_name,
                            rec.original_amount,
                            rec.discounted_amount,
                            rec.address_code,
                            rec.order_date,
                            rec.received_date,
                            rec.status.as_str()
                        ],
                    )
                    .map_err(map_constraint)?;
                Ok(UpsertOutcome::Created)
            }
        }
    }

    /// Manual creation through the edit form.
    pub fn create(&self, new: &NewOrder) -> Result<Order, StoreError> {
        // A record may only carry a received date while it is RECEIVED.
        let received_date = if new.status == OrderStatus::Received {
            new.received_date
        } else {
            None
        };
        self.conn
            .execute(
                "INSERT INTO orders (tracking_code, product_name, original_amount, \
                 discounted_amount, address_code, order_date, received_date, status, note, \
                 shop_name) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    new.tracking_code,
                    new.product_name,
                    new.original_amount,
                    new.discounted_amount,
                    new.address_code,
                    new.order_date,
                    received_date,
                    new.status.as_str(),
                    new.note,
                    new.shop_name
                ],
            )
            .map_err(map_constraint)?;
        self.get(self.conn.last_insert_rowid())
    }

    /// Partial manual edit: only fields present in the patch are changed, a
    /// field set to `null` is cleared. The record is read, patched in memory
    /// and written back whole, which also lets the status/received-date
    /// invariant be re-established in one place.
    pub fn update(&self, id: i64, patch: &common::requests::OrderPatch) -> Result<Order, StoreError> {
        let mut order = self.get(id)?;

        if let Some(code) = &patch.tracking_code {
            let trimmed = code.trim();
            if !trimmed.is_empty() {
                order.tracking_code = trimmed.to_string();
            }
        }
        if let Some(v) = &patch.product_name {
            order.product_name = v.clone();
        }
        if let Some(v) = &patch.original_amount {
            order.original_amount = v.as_ref().and_then(amount_value);
        }
        if let Some(v) = &patch.discounted_amount {
            order.discounted_amount = v.as_ref().and_then(amount_value);
        }
        if let Some(v) = &patch.address_code {
            order.address_code = v.clone();
        }
        if let Some(v) = &patch.order_date {
            order.order_date = *v;
        }
        if let Some(v) = &patch.received_date {
            order.received_date = *v;
        }
        if let Some(status) = patch.status {
            order.status = status;
        }
        if let Some(v) = &patch.note {
            order.note = v.clone();
        }
        if let Some(v) = &patch.shop_name {
            order.shop_name = v.clone();
        }
        if order.status != OrderStatus::Received {
            order.received_date = None;
        }

        self.conn
            .execute(
                "UPDATE orders SET tracking_code = ?1, product_name = ?2, original_amount = ?3, \
                 discounted_amount = ?4, address_code = ?5, order_date = ?6, received_date = ?7, \
                 status = ?8, note = ?9, shop_name = ?10 WHERE id = ?11",
                params![
                    order.tracking_code,
                    order.product_name,
                    order.original_amount,
                    order.discounted_amount,
                    order.address_code,
                    order.order_date,
                    order.received_date,
                    order.status.as_str(),
                    order.note,
                    order.shop_name,
                    id
                ],
            )
            .map_err(map_constraint)?;
        self.get(id)
    }

    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM orders WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    pub fn list(&self, query: &OrderQuery) -> Result<Vec<Order>, StoreError> {
        let (where_sql, values) = filter_clauses(query, false);
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders{where_sql} ORDER BY order_date DESC, id DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(values.iter()), read_order)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn daily_stats(&self, query: &OrderQuery) -> Result<Vec<DailyStat>, StoreError> {
        let (where_sql, values) = filter_clauses(query, true);
        let sql = format!(
            "SELECT order_date, COUNT(id), COALESCE(SUM(original_amount), 0), \
             COALESCE(SUM(discounted_amount), 0) FROM orders{where_sql} \
             GROUP BY order_date ORDER BY order_date ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(values.iter()), |row| {
            let total_original: f64 = row.get(2)?;
            let total_discounted: f64 = row.get(3)?;
            Ok(DailyStat {
                order_date: row.get(0)?,
                total_orders: row.get(1)?,
                total_original,
                total_discounted,
                total_profit: total_original - total_discounted,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn monthly_stats(&self, query: &OrderQuery) -> Result<Vec<MonthlyStat>, StoreError> {
        let (where_sql, values) = filter_clauses(query, true);
        let sql = format!(
            "SELECT substr(order_date, 1, 7) AS month, COUNT(id), \
             COALESCE(SUM(original_amount), 0), COALESCE(SUM(discounted_amount), 0) \
             FROM orders{where_sql} GROUP BY month ORDER BY month ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(values.iter()), |row| {
            let total_original: f64 = row.get(2)?;
            let total_discounted: f64 = row.get(3)?;
            Ok(MonthlyStat {
                month: row.get(0)?,
                total_orders: row.get(1)?,
                total_original,
                total_discounted,
                total_profit: total_original - total_discounted,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn summary_stats(&self) -> Result<SummaryStats, StoreError> {
        let (total_orders, total_original, total_discounted): (i64, f64, f64) =
            self.conn.query_row(
                "SELECT COUNT(id), COALESCE(SUM(original_amount), 0), \
                 COALESCE(SUM(discounted_amount), 0) FROM orders",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;

        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(id) FROM orders GROUP BY status")?;
        let counts = stmt.query_map([], |row| {
            let status: String = row.get(0)?;
            Ok(StatusCount {
                status: OrderStatus::parse(&status).unwrap_or_default(),
                count: row.get(1)?,
            })
        })?;
        let status_counts = counts.collect::<Result<Vec<_>, _>>()?;

        Ok(SummaryStats {
            total_orders,
            total_original,
            total_discounted,
            total_profit: total_original - total_discounted,
            status_counts,
        })
    }
}

fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS orders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tracking_code TEXT NOT NULL UNIQUE,
            product_name TEXT,
            original_amount REAL,
            discounted_amount REAL,
            address_code TEXT,
            order_date TEXT,
            received_date TEXT,
            status TEXT NOT NULL DEFAULT 'NOT_RECEIVED',
            note TEXT,
            shop_name TEXT
        )",
        [],
    )?;
    Ok(())
}

fn read_order(row: &Row<'_>) -> rusqlite::Result<Order> {
    let status: String = row.get("status")?;
    Ok(Order {
        id: row.get("id")?,
        tracking_code: row.get("tracking_code")?,
        product_name: row.get("product_name")?,
        original_amount: row.get("original_amount")?,
        discounted_amount: row.get("discounted_amount")?,
        address_code: row.get("address_code")?,
        order_date: row.get("order_date")?,
        received_date: row.get("received_date")?,
        status: OrderStatus::parse(&status).unwrap_or_default(),
        note: row.get("note")?,
        shop_name: row.get("shop_name")?,
    })
}

fn map_constraint(e: rusqlite::Error) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StoreError::DuplicateTrackingCode
        }
        _ => StoreError::Sqlite(e),
    }
}

/// Builds the WHERE fragment shared by the listing and statistics queries.
/// All filter values bind as text; `order_date` comparisons work because the
/// column stores ISO dates, which sort lexicographically.
fn filter_clauses(query: &OrderQuery, require_order_date: bool) -> (String, Vec<String>) {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<String> = Vec::new();

    if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        clauses.push("(product_name LIKE ? OR tracking_code LIKE ?)");
        values.push(format!("%{q}%"));
        values.push(format!("%{q}%"));
    }
    if let Some(status) = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty() && *s != "ALL")
    {
        clauses.push("status = ?");
        values.push(status.to_string());
    }
    if let Some(from) = query.from_date {
        clauses.push("order_date >= ?");
        values.push(from.to_string());
    }
    if let Some(to) = query.to_date {
        clauses.push("order_date <= ?");
        values.push(to.to_string());
    }
    if require_order_date {
        clauses.push("order_date IS NOT NULL");
    }

    if clauses.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::import::normalize::NormalizedOrder;
    use common::requests::{Amount, OrderPatch};

    fn store() -> OrderStore {
        OrderStore::open_in_memory().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn imported(code: &str) -> NormalizedOrder {
        NormalizedOrder {
            tracking_code: code.to_string(),
            product_name: Some("Keyboard".to_string()),
            original_amount: Some(250_000.0),
            discounted_amount: Some(200_000.0),
            address_code: Some("HN-12".to_string()),
            order_date: Some(date(2025, 3, 1)),
            received_date: None,
            status: OrderStatus::NotReceived,
        }
    }

    #[test]
    fn upsert_reports_created_then_replaced() {
        let store = store();
        assert_eq!(
            store.upsert_imported(&imported("VN123")).unwrap(),
            UpsertOutcome::Created
        );
        let mut again = imported("VN123");
        again.product_name = Some("Mouse".to_string());
        assert_eq!(
            store.upsert_imported(&again).unwrap(),
            UpsertOutcome::Replaced
        );

        let saved = store.find_by_tracking_code("VN123").unwrap().unwrap();
        assert_eq!(saved.product_name.as_deref(), Some("Mouse"));
    }

    #[test]
    fn import_resets_note_and_shop_name() {
        let store = store();
        let created = store
            .create(&NewOrder {
                tracking_code: "VN200".to_string(),
                note: Some("VIP".to_string()),
                shop_name: Some("Gadget Hub".to_string()),
                ..NewOrder::default()
            })
            .unwrap();
        assert_eq!(created.note.as_deref(), Some("VIP"));

        store.upsert_imported(&imported("VN200")).unwrap();
        let after = store.find_by_tracking_code("VN200").unwrap().unwrap();
        assert_eq!(after.note, None);
        assert_eq!(after.shop_name, None);
        assert_eq!(after.product_name.as_deref(), Some("Keyboard"));
    }

    #[test]
    fn create_rejects_duplicate_tracking_code() {
        let store = store();
        let new = NewOrder {
            tracking_code: "VN300".to_string(),
            ..NewOrder::default()
        };
        store.create(&new).unwrap();
        let err = store.create(&new).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateTrackingCode));
    }

    #[test]
    fn patch_touches_only_present_fields() {
        let store = store();
        let created = store
            .create(&NewOrder {
                tracking_code: "VN400".to_string(),
                product_name: Some("Lamp".to_string()),
                original_amount: Some(90_000.0),
                ..NewOrder::default()
            })
            .unwrap();

        let patch = OrderPatch {
            note: Some(Some("call before delivery".to_string())),
            original_amount: Some(Some(Amount::Text("1.234,5".to_string()))),
            product_name: Some(None),
            ..OrderPatch::default()
        };
        let updated = store.update(created.id, &patch).unwrap();
        assert_eq!(updated.note.as_deref(), Some("call before delivery"));
        assert_eq!(updated.original_amount, Some(1234.5));
        assert_eq!(updated.product_name, None);
        assert_eq!(updated.tracking_code, "VN400");
    }

    #[test]
    fn leaving_received_clears_received_date() {
        let store = store();
        let created = store
            .create(&NewOrder {
                tracking_code: "VN500".to_string(),
                status: OrderStatus::Received,
                received_date: Some(date(2025, 4, 2)),
                ..NewOrder::default()
            })
            .unwrap();
        assert_eq!(created.received_date, Some(date(2025, 4, 2)));

        let patch = OrderPatch {
            status: Some(OrderStatus::Returned),
            ..OrderPatch::default()
        };
        let updated = store.update(created.id, &patch).unwrap();
        assert_eq!(updated.status, OrderStatus::Returned);
        assert_eq!(updated.received_date, None);
    }

    #[test]
    fn list_applies_keyword_status_and_date_filters() {
        let store = store();
        for (code, name, day, status) in [
            ("VN1", "Blue kettle", 1, OrderStatus::Received),
            ("VN2", "Red kettle", 5, OrderStatus::NotReceived),
            ("VN3", "Desk fan", 9, OrderStatus::NotReceived),
        ] {
            store
                .create(&NewOrder {
                    tracking_code: code.to_string(),
                    product_name: Some(name.to_string()),
                    order_date: Some(date(2025, 2, day)),
                    status,
                    ..NewOrder::default()
                })
                .unwrap();
        }

        let kettles = store
            .list(&OrderQuery {
                q: Some("kettle".to_string()),
                ..OrderQuery::default()
            })
            .unwrap();
        assert_eq!(kettles.len(), 2);
        // Newest order date first.
        assert_eq!(kettles[0].tracking_code, "VN2");

        let pending = store
            .list(&OrderQuery {
                status: Some("NOT_RECEIVED".to_string()),
                from_date: Some(date(2025, 2, 6)),
                ..OrderQuery::default()
            })
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].tracking_code, "VN3");

        let all = store.list(&OrderQuery::default()).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn stats_aggregate_per_day_month_and_overall() {
        let store = store();
        for (code, day, original, discounted) in [
            ("VN1", 1, 100.0, 80.0),
            ("VN2", 1, 50.0, 40.0),
            ("VN3", 2, 30.0, 10.0),
        ] {
            store
                .create(&NewOrder {
                    tracking_code: code.to_string(),
                    order_date: Some(date(2025, 6, day)),
                    original_amount: Some(original),
                    discounted_amount: Some(discounted),
                    ..NewOrder::default()
                })
                .unwrap();
        }
        // No order date: excluded from the daily/monthly breakdowns.
        store
            .create(&NewOrder {
                tracking_code: "VN4".to_string(),
                original_amount: Some(5.0),
                ..NewOrder::default()
            })
            .unwrap();

        let daily = store.daily_stats(&OrderQuery::default()).unwrap();
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].order_date, date(2025, 6, 1));
        assert_eq!(daily[0].total_orders, 2);
        assert_eq!(daily[0].total_original, 150.0);
        assert_eq!(daily[0].total_profit, 30.0);

        let monthly = store.monthly_stats(&OrderQuery::default()).unwrap();
        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].month, "2025-06");
        assert_eq!(monthly[0].total_orders, 3);

        let summary = store.summary_stats().unwrap();
        assert_eq!(summary.total_orders, 4);
        assert_eq!(summary.total_original, 185.0);
        let not_received = summary
            .status_counts
            .iter()
            .find(|c| c.status == OrderStatus::NotReceived)
            .unwrap();
        assert_eq!(not_received.count, 4);
    }

    #[test]
    fn delete_unknown_id_is_not_found() {
        let store = store();
        assert!(matches!(store.delete(99).unwrap_err(), StoreError::NotFound));
    }
}
