//! Row normalizer for the marketplace export.
//!
//! Turns one raw spreadsheet row (cells addressed by fixed column position)
//! into a canonical order record, or a skip decision when the row carries no
//! tracking code. The normalizer is pure and stateless: identical cell inputs
//! always produce identical output, independent of any other row.
//!
//! The export is loosely formatted, so each cell kind gets its own salvage
//! path: dates arrive as native date cells, raw spreadsheet serials or
//! `D/M/Y` strings; amounts as numbers or strings like `"1.234.567,50"`
//! (`.` thousands, `,` decimal); the received cell doubles as a status
//! marker and a date. Anything unparseable becomes an absent field, never an
//! error.

use calamine::Data;
use chrono::{DateTime, NaiveDate};
use common::model::order::OrderStatus;
use common::requests::Amount;

/// Fixed column layout of the export sheet. Column 0 is the row label the
/// operator's spreadsheet keeps for itself.
mod cols {
    pub const PRODUCT_NAME: usize = 1;
    pub const ORIGINAL_AMOUNT: usize = 2;
    pub const DISCOUNTED_AMOUNT: usize = 3;
    pub const ADDRESS_CODE: usize = 4;
    pub const ORDER_DATE: usize = 5;
    pub const TRACKING_CODE: usize = 6;
    pub const RECEIVED: usize = 7;
}

/// Days between the spreadsheet epoch (1899-12-30) and the Unix epoch.
const EPOCH_OFFSET_DAYS: f64 = 25569.0;

/// One import row after normalization, ready for reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOrder {
    pub tracking_code: String,
    pub product_name: Option<String>,
    pub original_amount: Option<f64>,
    pub discounted_amount: Option<f64>,
    pub address_code: Option<String>,
    pub order_date: Option<NaiveDate>,
    pub received_date: Option<NaiveDate>,
    pub status: OrderStatus,
}

static EMPTY_CELL: Data = Data::Empty;

fn cell<'a>(row: &'a [Data], idx: usize) -> &'a Data {
    row.get(idx).unwrap_or(&EMPTY_CELL)
}

/// Normalizes one data row. `None` means the row has no tracking code after
/// trimming and must be skipped (counted apart from insert/update outcomes).
pub fn normalize_row(row: &[Data]) -> Option<NormalizedOrder> {
    let tracking_code = cell_text(cell(row, cols::TRACKING_CODE))?;

    let received_cell = cell(row, cols::RECEIVED);
    let status = derive_status(received_cell);
    // Only a RECEIVED marker doubles as the received date.
    let received_date = if status == OrderStatus::Received {
        parse_date(received_cell)
    } else {
        None
    };

    Some(NormalizedOrder {
        tracking_code,
        product_name: cell_text(cell(row, cols::PRODUCT_NAME)),
        original_amount: parse_amount(cell(row, cols::ORIGINAL_AMOUNT)),
        discounted_amount: parse_amount(cell(row, cols::DISCOUNTED_AMOUNT)),
        address_code: cell_text(cell(row, cols::ADDRESS_CODE)),
        order_date: parse_date(cell(row, cols::ORDER_DATE)),
        received_date,
        status,
    })
}

/// Trimmed text content of a cell; numeric cells render the way the export
/// displays them. `None` for empty, date and error cells.
fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Date from any of the cell forms the export produces.
pub fn parse_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) => serial_to_date(dt.as_f64()),
        Data::DateTimeIso(s) => NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), "%Y-%m-%d").ok(),
        Data::Float(f) => serial_to_date(*f),
        Data::Int(i) => serial_to_date(*i as f64),
        Data::String(s) => parse_date_str(s),
        _ => None,
    }
}

/// Converts a spreadsheet date serial (days since 1899-12-30, fractional
/// part = time of day) to the calendar date the spreadsheet displays.
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    let secs = ((serial - EPOCH_OFFSET_DAYS) * 86400.0).round() as i64;
    DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}

/// String dates: `D/M/Y` or `D-M-Y` token order first (two-digit years < 50
/// are 20xx, the rest 19xx), then a plain ISO date as the generic fallback.
pub fn parse_date_str(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parts: Vec<&str> = if trimmed.contains('/') {
        trimmed.split('/').collect()
    } else {
        trimmed.split('-').collect()
    };
    if parts.len() == 3 {
        if let (Ok(d), Ok(m), Ok(y)) = (
            parts[0].trim().parse::<u32>(),
            parts[1].trim().parse::<u32>(),
            parts[2].trim().parse::<i32>(),
        ) {
            let year = if parts[2].trim().len() == 2 {
                if y < 50 {
                    2000 + y
                } else {
                    1900 + y
                }
            } else {
                y
            };
            if let Some(date) = NaiveDate::from_ymd_opt(year, m, d) {
                return Some(date);
            }
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

/// Amount from a numeric cell, or from a formatted string.
pub fn parse_amount(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => parse_amount_str(s),
        _ => None,
    }
}

/// Keeps digits, commas and periods, then reads the result as a
/// `.`-thousands / `,`-decimal number: `"₫1.234.567,50"` → `1234567.5`.
pub fn parse_amount_str(raw: &str) -> Option<f64> {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let normalized = kept.replace('.', "").replace(',', ".");
    normalized.parse::<f64>().ok()
}

/// Amount as submitted through the manual edit form.
pub fn amount_value(amount: &Amount) -> Option<f64> {
    match amount {
        Amount::Number(n) => Some(*n),
        Amount::Text(s) => parse_amount_str(s),
    }
}

/// Status from the received cell. Empty means the parcel is still on its
/// way; the marker word for returned goods ("hoàn") is matched with case
/// and diacritics folded away; any other content means the parcel arrived.
pub fn derive_status(cell: &Data) -> OrderStatus {
    let text = match cell {
        Data::Empty | Data::Error(_) => return OrderStatus::NotReceived,
        Data::String(s) => s.trim().to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
    };
    if text.is_empty() {
        return OrderStatus::NotReceived;
    }
    let folded: String = text.to_lowercase().chars().map(fold_diacritics).collect();
    if folded.contains("hoan") {
        OrderStatus::Returned
    } else {
        OrderStatus::Received
    }
}

/// Folds Vietnamese accented letters to their ASCII base letter, so the
/// returned-goods marker matches however the operator typed it.
fn fold_diacritics(c: char) -> char {
    match c {
        'à' | 'á' | 'ả' | 'ã' | 'ạ' | 'ă' | 'ằ' | 'ắ' | 'ẳ' | 'ẵ' | 'ặ' | 'â' | 'ầ' | 'ấ'
        | 'ẩ' | 'ẫ' | 'ậ' => 'a',
        'è' | 'é' | 'ẻ' | 'ẽ' | 'ẹ' | 'ê' | 'ề' | 'ế' | 'ể' | 'ễ' | 'ệ' => 'e',
        'ì' | 'í' | 'ỉ' | 'ĩ' | 'ị' => 'i',
        'ò' | 'ó' | 'ỏ' | 'õ' | 'ọ' | 'ô' | 'ồ' | 'ố' | 'ổ' | 'ỗ' | 'ộ' | 'ơ' | 'ờ' | 'ớ'
        | 'ở' | 'ỡ' | 'ợ' => 'o',
        'ù' | 'ú' | 'ủ' | 'ũ' | 'ụ' | 'ư' | 'ừ' | 'ứ' | 'ử' | 'ữ' | 'ự' => 'u',
        'ỳ' | 'ý' | 'ỷ' | 'ỹ' | 'ỵ' => 'y',
        'đ' => 'd',
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn serial_and_string_forms_agree() {
        // Serial 45092 is how the spreadsheet stores 2023-06-15.
        assert_eq!(
            parse_date(&Data::Float(45092.0)),
            Some(date(2023, 6, 15))
        );
        assert_eq!(parse_date_str("15/6/2023"), Some(date(2023, 6, 15)));
        assert_eq!(parse_date_str("15-6-2023"), Some(date(2023, 6, 15)));
    }

    #[test]
    fn serial_conversion_matches_spreadsheet_epoch() {
        assert_eq!(parse_date(&Data::Float(45000.0)), Some(date(2023, 3, 15)));
        // Serial 1 is the day after the epoch.
        assert_eq!(parse_date(&Data::Int(1)), Some(date(1899, 12, 31)));
        // A fractional part is a time of day on the same calendar date.
        assert_eq!(
            parse_date(&Data::Float(45092.75)),
            Some(date(2023, 6, 15))
        );
    }

    #[test]
    fn two_digit_years_split_at_fifty() {
        assert_eq!(parse_date_str("1/2/24"), Some(date(2024, 2, 1)));
        assert_eq!(parse_date_str("1/2/99"), Some(date(1999, 2, 1)));
    }

    #[test]
    fn unparseable_dates_are_absent() {
        assert_eq!(parse_date_str(""), None);
        assert_eq!(parse_date_str("soon"), None);
        // Three tokens but not a real date, and not ISO either.
        assert_eq!(parse_date_str("31/2/2023"), None);
        assert_eq!(parse_date(&Data::Empty), None);
    }

    #[test]
    fn iso_strings_fall_through_the_generic_path() {
        // Splits on '-' as D-M-Y first, which fails, then parses as ISO.
        assert_eq!(parse_date_str("2023-06-15"), Some(date(2023, 6, 15)));
    }

    #[test]
    fn amounts_use_period_thousands_comma_decimal() {
        assert_eq!(parse_amount_str("1.234.567,50"), Some(1_234_567.5));
        assert_eq!(parse_amount_str("₫ 99.000"), Some(99_000.0));
        assert_eq!(parse_amount_str("abc"), None);
        assert_eq!(parse_amount(&Data::Float(120.5)), Some(120.5));
        assert_eq!(parse_amount(&Data::String("45,5".to_string())), Some(45.5));
        assert_eq!(parse_amount(&Data::Empty), None);
    }

    #[test]
    fn status_marker_matches_through_diacritics() {
        assert_eq!(
            derive_status(&Data::String("Đã hoàn hàng".to_string())),
            OrderStatus::Returned
        );
        assert_eq!(
            derive_status(&Data::String("HOÀN".to_string())),
            OrderStatus::Returned
        );
        assert_eq!(derive_status(&Data::Empty), OrderStatus::NotReceived);
        assert_eq!(
            derive_status(&Data::String("   ".to_string())),
            OrderStatus::NotReceived
        );
        assert_eq!(
            derive_status(&Data::String("15/6/2023".to_string())),
            OrderStatus::Received
        );
    }

    #[test]
    fn received_date_only_for_received_rows() {
        let mut row = vec![Data::Empty; 8];
        row[cols::TRACKING_CODE] = Data::String("VN1".to_string());
        row[cols::RECEIVED] = Data::String("15/6/2023".to_string());
        let rec = normalize_row(&row).unwrap();
        assert_eq!(rec.status, OrderStatus::Received);
        assert_eq!(rec.received_date, Some(date(2023, 6, 15)));

        row[cols::RECEIVED] = Data::String("Hoàn 15/6/2023".to_string());
        let rec = normalize_row(&row).unwrap();
        assert_eq!(rec.status, OrderStatus::Returned);
        assert_eq!(rec.received_date, None);

        row[cols::RECEIVED] = Data::Empty;
        let rec = normalize_row(&row).unwrap();
        assert_eq!(rec.status, OrderStatus::NotReceived);
        assert_eq!(rec.received_date, None);
    }

    #[test]
    fn rows_without_tracking_code_are_skipped() {
        let mut row = vec![Data::Empty; 8];
        row[cols::PRODUCT_NAME] = Data::String("Kettle".to_string());
        assert_eq!(normalize_row(&row), None);

        row[cols::TRACKING_CODE] = Data::String("   ".to_string());
        assert_eq!(normalize_row(&row), None);

        // Short rows read as all-empty cells past their end.
        assert_eq!(normalize_row(&[]), None);
    }

    #[test]
    fn full_row_normalizes_every_column() {
        let row = vec![
            Data::Int(7),
            Data::String("  Ceramic mug  ".to_string()),
            Data::String("120.000".to_string()),
            Data::Float(95_000.0),
            Data::Int(70000),
            Data::String("3/1/25".to_string()),
            Data::String(" VN777 ".to_string()),
            Data::Empty,
        ];
        let rec = normalize_row(&row).unwrap();
        assert_eq!(rec.tracking_code, "VN777");
        assert_eq!(rec.product_name.as_deref(), Some("Ceramic mug"));
        assert_eq!(rec.original_amount, Some(120_000.0));
        assert_eq!(rec.discounted_amount, Some(95_000.0));
        assert_eq!(rec.address_code.as_deref(), Some("70000"));
        assert_eq!(rec.order_date, Some(date(2025, 1, 3)));
        assert_eq!(rec.status, OrderStatus::NotReceived);
        assert_eq!(rec.received_date, None);
    }
}
