//! The normalized dispatch record and the raw-row-to-record conversion.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::columns::ColumnIndex;
use crate::fields::Field;
use crate::parse;

/// Typed representation of one data row, ready for validation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRecord {
    pub company_name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub invoice_no: String,
    pub consignment_no: String,
    pub booking_date: DateTime<Utc>,
    pub item_category: String,
    pub item_description: String,
    pub qty: i64,
    pub weight: f64,
    pub rate: f64,
    pub amount: f64,
    pub city: String,
    pub district: String,
    pub state: String,
    pub country: String,
    pub paid_or_to_pay: String,
    pub booking_type: String,
    pub remarks: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Build a candidate record from one raw row using the sheet's column map.
///
/// Pulls every field through the text extractor at its resolved position,
/// coerces dates and numerics, and applies the field fallbacks: district
/// falls back to city, and state/country/payment/booking-type get their
/// domain defaults. The only side effect is reading the clock.
pub fn normalize_row(row: &[String], columns: &ColumnIndex, actor: &str) -> DispatchRecord {
    let text = |field: Field| parse::cell_text(row, columns.get(field));

    let city = text(Field::City);
    let district = {
        let d = text(Field::District);
        if d.is_empty() {
            city.clone()
        } else {
            d
        }
    };
    let now = Utc::now();

    DispatchRecord {
        company_name: text(Field::CompanyName),
        contact_person: text(Field::ContactPerson),
        email: text(Field::Email),
        phone: text(Field::Phone),
        invoice_no: text(Field::InvoiceNo),
        consignment_no: text(Field::ConsignmentNo),
        booking_date: parse::parse_date(&text(Field::BookingDate)),
        item_category: text(Field::ItemCategory),
        item_description: text(Field::ItemDescription),
        qty: parse::parse_qty(&text(Field::Qty)),
        weight: parse::parse_amount(&text(Field::Weight)),
        rate: parse::parse_amount(&text(Field::Rate)),
        amount: parse::parse_amount(&text(Field::Amount)),
        city,
        district,
        state: non_empty_or(text(Field::State), "Unknown"),
        country: non_empty_or(text(Field::Country), "India"),
        paid_or_to_pay: non_empty_or(text(Field::PaidOrToPay), "Paid"),
        booking_type: non_empty_or(text(Field::BookingType), "Standard"),
        remarks: text(Field::Remarks),
        created_by: actor.to_string(),
        created_at: now,
        updated_at: now,
    }
}

fn non_empty_or(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::resolve_columns;
    use crate::fields::COLUMN_SYNONYMS;
    use chrono::Datelike;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn normalize(headers: &[&str], cells: &[&str]) -> DispatchRecord {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let columns = resolve_columns(&headers, COLUMN_SYNONYMS);
        normalize_row(&row(cells), &columns, "tester")
    }

    #[test]
    fn test_fields_pulled_by_resolved_position() {
        let record = normalize(
            &["Invoice No", "Company Name", "Amount"],
            &["INV-42", "Acme Logistics", "₹1,200"],
        );
        assert_eq!(record.company_name, "Acme Logistics");
        assert_eq!(record.invoice_no, "INV-42");
        assert_eq!(record.amount, 1200.0);
    }

    #[test]
    fn test_district_falls_back_to_city() {
        let record = normalize(&["Company Name", "City"], &["Acme", "Pune"]);
        assert_eq!(record.city, "Pune");
        assert_eq!(record.district, "Pune");
    }

    #[test]
    fn test_district_kept_when_present() {
        let record = normalize(
            &["Company Name", "City", "District"],
            &["Acme", "Pune", "Haveli"],
        );
        assert_eq!(record.district, "Haveli");
    }

    #[test]
    fn test_domain_defaults() {
        let record = normalize(&["Company Name"], &["Acme"]);
        assert_eq!(record.state, "Unknown");
        assert_eq!(record.country, "India");
        assert_eq!(record.paid_or_to_pay, "Paid");
        assert_eq!(record.booking_type, "Standard");
        assert_eq!(record.amount, 0.0);
        assert_eq!(record.qty, 0);
    }

    #[test]
    fn test_booking_date_coerced() {
        let record = normalize(
            &["Company Name", "Booking Date"],
            &["Acme", "15.8.2024"],
        );
        assert_eq!(record.booking_date.year(), 2024);
        assert_eq!(record.booking_date.month(), 8);
        assert_eq!(record.booking_date.day(), 15);
    }

    #[test]
    fn test_actor_and_timestamps_attached() {
        let record = normalize(&["Company Name"], &["Acme"]);
        assert_eq!(record.created_by, "tester");
        assert_eq!(record.created_at, record.updated_at);
    }
}
