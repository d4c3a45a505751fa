//! Row validation: required-field presence and email shape.
//!
//! The two upload modes require different field sets; everything else about
//! a candidate is already coerced to a usable value by the normalizer.

use std::sync::OnceLock;

use regex::Regex;

use crate::fields::Field;
use crate::ingest::IngestMode;
use crate::record::DispatchRecord;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"))
}

/// Reasons a candidate record is rejected; an empty list means accepted.
pub fn validate(record: &DispatchRecord, mode: IngestMode) -> Vec<String> {
    let mut reasons = Vec::new();

    let required: Vec<(Field, &str)> = match mode {
        IngestMode::Strict => vec![
            (Field::CompanyName, record.company_name.as_str()),
            (Field::ItemCategory, record.item_category.as_str()),
        ],
        IngestMode::Smart => vec![
            (Field::CompanyName, record.company_name.as_str()),
            (Field::ContactPerson, record.contact_person.as_str()),
            (Field::InvoiceNo, record.invoice_no.as_str()),
        ],
    };

    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field.label())
        .collect();
    if !missing.is_empty() {
        reasons.push(format!("missing required field(s): {}", missing.join(", ")));
    }

    if !record.email.is_empty() && !email_regex().is_match(&record.email) {
        reasons.push(format!("invalid email '{}'", record.email));
    }

    reasons
}

// =============================================================================
// TESTS
// =============================================================================
