//! Canonical dispatch-record fields and the static header configuration.
//!
//! Source spreadsheets spell their columns inconsistently ("Company Name",
//! "Campany Name", "Firm Name", ...), so every field carries an ordered list
//! of accepted header spellings. The tables here are plain static data passed
//! into the column mapper and sheet gatekeeper by value, which keeps both
//! testable against alternative configurations.

/// Internal name for one attribute of a dispatch record, independent of how
/// any particular source header spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    CompanyName,
    ContactPerson,
    Email,
    Phone,
    InvoiceNo,
    ConsignmentNo,
    BookingDate,
    ItemCategory,
    ItemDescription,
    Qty,
    Weight,
    Rate,
    Amount,
    City,
    District,
    State,
    Country,
    PaidOrToPay,
    BookingType,
    Remarks,
}

impl Field {
    /// Every canonical field, in template column order. The strict upload
    /// mode requires at least this many header columns.
    pub const ALL: [Field; 20] = [
        Field::CompanyName,
        Field::ContactPerson,
        Field::Email,
        Field::Phone,
        Field::InvoiceNo,
        Field::ConsignmentNo,
        Field::BookingDate,
        Field::ItemCategory,
        Field::ItemDescription,
        Field::Qty,
        Field::Weight,
        Field::Rate,
        Field::Amount,
        Field::City,
        Field::District,
        Field::State,
        Field::Country,
        Field::PaidOrToPay,
        Field::BookingType,
        Field::Remarks,
    ];

    /// Label used in user-facing validation messages.
    pub fn label(self) -> &'static str {
        match self {
            Field::CompanyName => "company name",
            Field::ContactPerson => "contact person",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::InvoiceNo => "invoice no",
            Field::ConsignmentNo => "consignment no",
            Field::BookingDate => "booking date",
            Field::ItemCategory => "item category",
            Field::ItemDescription => "item description",
            Field::Qty => "qty",
            Field::Weight => "weight",
            Field::Rate => "rate",
            Field::Amount => "amount",
            Field::City => "city",
            Field::District => "district",
            Field::State => "state",
            Field::Country => "country",
            Field::PaidOrToPay => "paid or to pay",
            Field::BookingType => "booking type",
            Field::Remarks => "remarks",
        }
    }
}

/// Accepted header spellings per field, lower-cased and trimmed, in match
/// priority order. The first spelling that equals a header cell wins.
pub const COLUMN_SYNONYMS: &[(Field, &[&str])] = &[
    (
        Field::CompanyName,
        &["company name", "campany name", "company", "firm name", "client name"],
    ),
    (
        Field::ContactPerson,
        &["contact person", "person name", "contact", "person"],
    ),
    (Field::Email, &["email", "e-mail", "email id", "mail"]),
    (
        Field::Phone,
        &["phone", "phone no", "mobile", "mobile no", "contact no"],
    ),
    (
        Field::InvoiceNo,
        &["invoice no", "invoice number", "invoice", "inv no", "bill no"],
    ),
    (
        Field::ConsignmentNo,
        &["consignment no", "consignment number", "gr no", "docket no", "lr no"],
    ),
    (
        Field::BookingDate,
        &["booking date", "date", "dispatch date", "invoice date"],
    ),
    (
        Field::ItemCategory,
        &["item category", "category", "item type", "goods type"],
    ),
    (
        Field::ItemDescription,
        &["item description", "description", "goods description", "item"],
    ),
    (
        Field::Qty,
        &["qty", "quantity", "no of articles", "articles", "pcs"],
    ),
    (
        Field::Weight,
        &["weight", "weight kg", "actual weight", "charged weight"],
    ),
    (Field::Rate, &["rate", "rate per kg", "freight rate"]),
    (
        Field::Amount,
        &["amount", "total amount", "freight", "freight amount", "total"],
    ),
    (
        Field::City,
        &["city", "to city", "destination city", "destination"],
    ),
    (Field::District, &["district", "dist"]),
    (Field::State, &["state", "to state", "destination state"]),
    (Field::Country, &["country"]),
    (
        Field::PaidOrToPay,
        &["paid or to pay", "paid/to pay", "payment mode", "paid to pay"],
    ),
    (Field::BookingType, &["booking type", "service type", "mode"]),
    (Field::Remarks, &["remarks", "remark", "notes", "comment"]),
];

/// A column concept a sheet must carry to be worth processing, with the
/// spellings that count as a hit. Matching is by substring, looser than the
/// exact synonym match used for column resolution.
pub struct ArchetypeGroup {
    pub label: &'static str,
    pub variants: &'static [&'static str],
}

/// Minimum column concepts the smart upload requires per sheet.
pub const REQUIRED_ARCHETYPES: &[ArchetypeGroup] = &[
    ArchetypeGroup { label: "company", variants: &["company", "campany"] },
    ArchetypeGroup { label: "contact person", variants: &["contact person", "person"] },
    ArchetypeGroup { label: "email", variants: &["email", "e-mail"] },
    ArchetypeGroup { label: "invoice", variants: &["invoice", "inv"] },
];
