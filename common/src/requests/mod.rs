use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::order::OrderStatus;

#[derive(Debug, Deserialize)]
/// Credentials for the login endpoint.
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
/// Session token minted on successful login. Presented back as a bearer
/// token on every other API call.
pub struct LoginResponse {
    pub token: String,
}

/// Filters shared by the order listing and the statistics endpoints.
/// `status` accepts the literal `ALL` (or absence) to mean no filter.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct OrderQuery {
    pub q: Option<String>,
    pub status: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

/// An amount as submitted by the operator form: either a plain number or a
/// formatted string like `"1.234.567,50"`, which goes through the same
/// cleanup as imported amount cells.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

/// Payload for manual order creation. Only `tracking_code` is required.
#[derive(Debug, Deserialize)]
pub struct NewOrderRequest {
    pub tracking_code: String,
    pub product_name: Option<String>,
    pub original_amount: Option<Amount>,
    pub discounted_amount: Option<Amount>,
    pub address_code: Option<String>,
    pub order_date: Option<NaiveDate>,
    pub received_date: Option<NaiveDate>,
    pub status: Option<OrderStatus>,
    pub note: Option<String>,
    pub shop_name: Option<String>,
}

/// Partial update payload for manual edits.
///
/// The double `Option` distinguishes a field that was omitted (left
/// untouched) from one explicitly set to `null` (cleared).
#[derive(Debug, Default, Deserialize)]
pub struct OrderPatch {
    pub tracking_code: Option<String>,
    #[serde(default, with = "double_option")]
    pub product_name: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub original_amount: Option<Option<Amount>>,
    #[serde(default, with = "double_option")]
    pub discounted_amount: Option<Option<Amount>>,
    #[serde(default, with = "double_option")]
    pub address_code: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub order_date: Option<Option<NaiveDate>>,
    #[serde(default, with = "double_option")]
    pub received_date: Option<Option<NaiveDate>>,
    pub status: Option<OrderStatus>,
    #[serde(default, with = "double_option")]
    pub note: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    pub shop_name: Option<Option<String>>,
}

/// Serde helper keeping `null` distinct from "absent" in patch payloads.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

/// One row of the per-day revenue statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct DailyStat {
    pub order_date: NaiveDate,
    pub total_orders: i64,
    pub total_original: f64,
    pub total_discounted: f64,
    pub total_profit: f64,
}

/// One row of the per-month revenue statistics, keyed by `YYYY-MM`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MonthlyStat {
    pub month: String,
    pub total_orders: i64,
    pub total_original: f64,
    pub total_discounted: f64,
    pub total_profit: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

/// Whole-table totals plus per-status record counts.
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_orders: i64,
    pub total_original: f64,
    pub total_discounted: f64,
    pub total_profit: f64,
    pub status_counts: Vec<StatusCount>,
}
