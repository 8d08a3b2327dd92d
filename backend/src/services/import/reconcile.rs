//! Reconciler: decides insert/update/skip for every normalized row of an
//! import batch.
//!
//! Normalization is pure per-row work and runs data-parallel. The write
//! phase is strictly sequential over the store's single connection: that is
//! the conservative way to honor the at-most-one-record-per-tracking-code
//! rule, and it makes a duplicate code inside one batch land as an update of
//! the earlier row rather than a constraint violation. A failed write is
//! demoted to a skip so one bad row never cancels the rest of the batch.

use calamine::Data;
use common::model::order::ImportReport;
use log::warn;
use rayon::prelude::*;

use super::normalize::{normalize_row, NormalizedOrder};
use crate::db::{OrderStore, UpsertOutcome};

/// Runs one batch. Every data row ends up in exactly one of the three
/// counters, so `inserted + updated + skipped == rows.len()` always holds.
pub fn reconcile_batch(store: &OrderStore, rows: &[Vec<Data>]) -> ImportReport {
    let normalized: Vec<Option<NormalizedOrder>> =
        rows.par_iter().map(|row| normalize_row(row)).collect();

    let mut report = ImportReport::default();
    for record in normalized {
        let Some(record) = record else {
            report.skipped += 1;
            continue;
        };
        match store.upsert_imported(&record) {
            Ok(UpsertOutcome::Created) => report.inserted += 1,
            Ok(UpsertOutcome::Replaced) => report.updated += 1,
            Err(e) => {
                warn!(
                    "import row with tracking code {} skipped: {}",
                    record.tracking_code, e
                );
                report.skipped += 1;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::order::OrderStatus;

    fn row(name: &str, amount: &str, code: &str, received: &str) -> Vec<Data> {
        let as_cell = |s: &str| {
            if s.is_empty() {
                Data::Empty
            } else {
                Data::String(s.to_string())
            }
        };
        vec![
            Data::Empty,
            as_cell(name),
            as_cell(amount),
            Data::Empty,
            Data::Empty,
            as_cell("1/3/2025"),
            as_cell(code),
            as_cell(received),
        ]
    }

    fn store() -> OrderStore {
        OrderStore::open_in_memory().unwrap()
    }

    #[test]
    fn counters_cover_every_row() {
        let store = store();
        let rows = vec![
            row("Kettle", "120.000", "VN1", ""),
            row("Mug", "35.000", "VN2", "5/3/2025"),
            row("No code", "10.000", "", ""),
            vec![Data::Empty; 8],
        ];
        let report = reconcile_batch(&store, &rows);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.updated, 0);
        assert_eq!(report.skipped, 2);
        assert_eq!(
            report.inserted + report.updated + report.skipped,
            rows.len()
        );
    }

    #[test]
    fn reimporting_the_same_batch_is_idempotent() {
        let store = store();
        let rows = vec![
            row("Kettle", "120.000", "VN1", ""),
            row("Mug", "35.000", "VN2", "Đã hoàn"),
            row("No code", "", "", ""),
        ];
        let first = reconcile_batch(&store, &rows);
        assert_eq!(first.inserted, 2);
        assert_eq!(first.skipped, 1);

        let second = reconcile_batch(&store, &rows);
        assert_eq!(second.inserted, 0);
        assert_eq!(second.updated, 2);
        assert_eq!(second.skipped, 1);
    }

    #[test]
    fn duplicate_codes_in_one_batch_keep_the_last_row() {
        let store = store();
        let rows = vec![
            row("First pass", "100", "VN9", ""),
            row("Second pass", "200", "VN9", ""),
        ];
        let report = reconcile_batch(&store, &rows);
        assert_eq!(report.inserted, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(report.skipped, 0);

        let saved = store.find_by_tracking_code("VN9").unwrap().unwrap();
        assert_eq!(saved.product_name.as_deref(), Some("Second pass"));
        assert_eq!(saved.original_amount, Some(200.0));
    }

    #[test]
    fn import_overwrites_manual_note() {
        let store = store();
        reconcile_batch(&store, &[row("Kettle", "100", "VN5", "")]);

        let saved = store.find_by_tracking_code("VN5").unwrap().unwrap();
        let patch = common::requests::OrderPatch {
            note: Some(Some("VIP".to_string())),
            ..common::requests::OrderPatch::default()
        };
        store.update(saved.id, &patch).unwrap();

        reconcile_batch(&store, &[row("Kettle", "100", "VN5", "7/3/2025")]);
        let after = store.find_by_tracking_code("VN5").unwrap().unwrap();
        assert_eq!(after.note, None);
        assert_eq!(after.status, OrderStatus::Received);
    }
}
