//! Pure derivations shared by the translators: names, addresses, phones,
//! gender and date conversion.

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{Address, Gender, Phone, PhoneType, Status};
use crate::source::{LegacyAddress, TextOrCode};

pub const MAP_URL_PREFIX: &str = "https://www.google.com/maps/place/";

/// Placeholder for a full address that has no postal code.
pub const NO_POSTAL_CODE: &str = "-";

pub fn text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

pub fn full_name(first: &str, last: &str) -> String {
    format!("{} {}", first.trim(), last.trim()).trim().to_string()
}

/// `"LAST, FIRST"` with the separators left by empty parts removed.
pub fn lexical_name(first: &str, last: &str) -> String {
    collapse_lexical(&format!("{}, {}", last.trim(), first.trim()))
}

/// Remove `", ,"`, doubled spaces and `", , "` until none remain, then trim
/// stray separators from both ends.
pub fn collapse_lexical(value: &str) -> String {
    let mut current = value.to_string();
    loop {
        let next = current
            .replace(", ,", ",")
            .replace("  ", " ")
            .replace(", , ", ", ");
        if next == current {
            break;
        }
        current = next;
    }
    current
        .trim_matches(|c: char| c == ',' || c.is_whitespace())
        .to_string()
}

pub fn address(legacy: &LegacyAddress) -> Address {
    let street_address = text(&legacy.street_address);
    let street_address_extra = text(&legacy.street_address_extra);
    let locality = text(&legacy.locality);
    let region = text(&legacy.region);
    let country = text(&legacy.country);
    let postal_code = text(&legacy.postal_code);

    let without = [
        street_address.as_str(),
        street_address_extra.as_str(),
        locality.as_str(),
        region.as_str(),
        country.as_str(),
    ]
    .iter()
    .filter(|part| !part.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(", ");

    let with = if postal_code.is_empty() {
        NO_POSTAL_CODE.to_string()
    } else if without.is_empty() {
        postal_code.clone()
    } else {
        format!("{}, {}", without, postal_code)
    };

    let url = if with == NO_POSTAL_CODE {
        format!("{}{}", MAP_URL_PREFIX, without)
    } else {
        format!("{}{}", MAP_URL_PREFIX, with)
    };

    Address {
        country,
        region,
        locality,
        postal_code,
        street_address,
        street_address_extra,
        post_office_box_number: text(&legacy.post_office_box_number),
        elevation: legacy.elevation,
        latitude: legacy.latitude,
        longitude: legacy.longitude,
        full_address_without_postal_code: without,
        full_address_with_postal_code: with,
        full_address_url: url,
    }
}

/// `None` when there is no number.
pub fn phone(number: &Option<String>, type_code: Option<i64>, extension: &Option<String>) -> Option<Phone> {
    let number = text(number);
    if number.is_empty() {
        return None;
    }
    let type_of = match type_code {
        Some(1) => Some(PhoneType::Landline),
        Some(2) => Some(PhoneType::Mobile),
        Some(3) => Some(PhoneType::Work),
        _ => None,
    };
    Some(Phone {
        number,
        type_of,
        extension: text(extension),
    })
}

/// Legacy gender is free text in some tables and a code in others.
pub fn gender(value: &Option<TextOrCode>) -> Option<Gender> {
    match value.as_ref()? {
        TextOrCode::Code(0) => None,
        TextOrCode::Code(1) => Some(Gender::Man),
        TextOrCode::Code(2) => Some(Gender::Woman),
        TextOrCode::Code(3) => Some(Gender::PreferNotToSay),
        TextOrCode::Code(other) => Some(Gender::Other(other.to_string())),
        TextOrCode::Text(raw) => {
            let trimmed = raw.trim();
            match trimmed.to_ascii_lowercase().as_str() {
                "" => None,
                "m" | "male" | "man" => Some(Gender::Man),
                "f" | "female" | "woman" => Some(Gender::Woman),
                "prefer not to say" | "prefer_not_to_say" | "prefer-not-to-say" => {
                    Some(Gender::PreferNotToSay)
                }
                _ => Some(Gender::Other(trimmed.to_string())),
            }
        }
    }
}

/// Principal lifecycle: archived rows and inactive states become `Archived`.
pub fn principal_status(is_archived: bool, state: &Option<String>) -> Status {
    let inactive = matches!(
        state.as_deref().map(str::trim),
        Some("inactive") | Some("archived")
    );
    Status::from_archived(is_archived || inactive)
}

pub fn datetime(value: Option<DateTime<Utc>>) -> Option<bson::DateTime> {
    value.map(bson::DateTime::from_chrono)
}

/// Dates are stored as midnight UTC.
pub fn date(value: Option<NaiveDate>) -> Option<bson::DateTime> {
    value
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| bson::DateTime::from_chrono(naive.and_utc()))
}
