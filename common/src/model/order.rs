use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Delivery status of an order, derived during import from the received
/// cell and never typed by the operator on the import path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Received,
    NotReceived,
    Returned,
}

impl OrderStatus {
    /// Stable string form, also used as the database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Received => "RECEIVED",
            OrderStatus::NotReceived => "NOT_RECEIVED",
            OrderStatus::Returned => "RETURNED",
        }
    }

    pub fn parse(s: &str) -> Option<OrderStatus> {
        match s {
            "RECEIVED" => Some(OrderStatus::Received),
            "NOT_RECEIVED" => Some(OrderStatus::NotReceived),
            "RETURNED" => Some(OrderStatus::Returned),
            _ => None,
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::NotReceived
    }
}

/// A persisted order record.
///
/// `tracking_code` is the business key: import reconciliation matches on it
/// exclusively and the store enforces its uniqueness. The surrogate `id` only
/// exists for the manual edit/delete endpoints. `received_date` is populated
/// only while `status` is `Received`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
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

/// Outcome counters of one import batch. Every data row below the header
/// lands in exactly one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
}
