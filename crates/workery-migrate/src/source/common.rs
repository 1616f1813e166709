//! Column groups shared by several legacy tables.
//!
//! Legacy tables name their audit columns inconsistently (`created` versus
//! `created_at`). Every projection aliases them to the names read here.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::Result;

use super::row::{RowReader, TextOrCode};

/// Audit projection for tables using `created` / `last_modified`.
pub const AUDIT_COLUMNS: &str = "created AS created_at, created_by_id, created_from, \
     last_modified AS last_modified_at, last_modified_by_id, last_modified_from";

/// Audit projection for tables already using `created_at` / `last_modified_at`.
pub const AUDIT_AT_COLUMNS: &str = "created_at, created_by_id, created_from, \
     last_modified_at, last_modified_by_id, last_modified_from";

/// Audit projection for tables without `created_from` / `last_modified_from`.
pub const AUDIT_NO_IP_COLUMNS: &str = "created_at, created_by_id, NULL::text AS created_from, \
     last_modified_at, last_modified_by_id, NULL::text AS last_modified_from";

/// Audit columns in projection order: alias, accepted source names, null type.
const AUDIT_FIELDS: [(&str, &[&str], &str); 6] = [
    ("created_at", &["created_at", "created"], "timestamptz"),
    ("created_by_id", &["created_by_id"], "bigint"),
    ("created_from", &["created_from"], "text"),
    ("last_modified_at", &["last_modified_at", "last_modified"], "timestamptz"),
    ("last_modified_by_id", &["last_modified_by_id"], "bigint"),
    ("last_modified_from", &["last_modified_from"], "text"),
];

/// Audit projection for a table whose audit columns are only known at run
/// time. Absent columns are projected as typed NULLs.
pub fn audit_projection(columns: &[String]) -> String {
    AUDIT_FIELDS
        .iter()
        .map(|&(alias, names, null_type)| {
            let found = names
                .iter()
                .copied()
                .find(|name| columns.iter().any(|c| c.as_str() == *name));
            match found {
                Some(name) if name == alias => name.to_string(),
                Some(name) => format!("{} AS {}", name, alias),
                None => format!("NULL::{} AS {}", null_type, alias),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub const ADDRESS_COLUMNS: &str = "address_country, address_region, address_locality, \
     postal_code, street_address, street_address_extra, post_office_box_number, \
     elevation::float8 AS elevation, latitude::float8 AS latitude, longitude::float8 AS longitude";

/// Contact, identity and lifecycle columns common to customers, associates
/// and staff.
pub const PERSON_COLUMNS: &str = "given_name, last_name, email, \
     telephone, telephone_type_of, telephone_extension, \
     other_telephone, other_telephone_type_of, other_telephone_extension, \
     gender, birthdate, join_date, nationality, tax_id, description, \
     how_hear_id, how_hear_other, state, is_archived";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyAudit {
    pub created_at: Option<DateTime<Utc>>,
    pub created_by_id: Option<i64>,
    pub created_from: Option<String>,
    pub last_modified_at: Option<DateTime<Utc>>,
    pub last_modified_by_id: Option<i64>,
    pub last_modified_from: Option<String>,
}

impl LegacyAudit {
    pub fn read(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            created_at: r.opt_timestamp("created_at")?,
            created_by_id: r.opt_i64("created_by_id")?,
            created_from: r.opt_string("created_from")?,
            last_modified_at: r.opt_timestamp("last_modified_at")?,
            last_modified_by_id: r.opt_i64("last_modified_by_id")?,
            last_modified_from: r.opt_string("last_modified_from")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyAddress {
    pub country: Option<String>,
    pub region: Option<String>,
    pub locality: Option<String>,
    pub postal_code: Option<String>,
    pub street_address: Option<String>,
    pub street_address_extra: Option<String>,
    pub post_office_box_number: Option<String>,
    pub elevation: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LegacyAddress {
    pub fn read(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            country: r.opt_string("address_country")?,
            region: r.opt_string("address_region")?,
            locality: r.opt_string("address_locality")?,
            postal_code: r.opt_string("postal_code")?,
            street_address: r.opt_string("street_address")?,
            street_address_extra: r.opt_string("street_address_extra")?,
            post_office_box_number: r.opt_string("post_office_box_number")?,
            elevation: r.opt_f64("elevation")?,
            latitude: r.opt_f64("latitude")?,
            longitude: r.opt_f64("longitude")?,
        })
    }
}

/// Identity and contact block of a legacy customer, associate or staff row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyPerson {
    pub given_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub telephone_type_of: Option<i64>,
    pub telephone_extension: Option<String>,
    pub other_telephone: Option<String>,
    pub other_telephone_type_of: Option<i64>,
    pub other_telephone_extension: Option<String>,
    pub gender: Option<TextOrCode>,
    pub birthdate: Option<NaiveDate>,
    pub join_date: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub tax_id: Option<String>,
    pub description: Option<String>,
    pub how_hear_id: Option<i64>,
    pub how_hear_other: Option<String>,
    pub state: Option<String>,
    pub is_archived: bool,
    pub address: LegacyAddress,
    pub audit: LegacyAudit,
}

impl LegacyPerson {
    pub fn read(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            given_name: r.opt_string("given_name")?,
            last_name: r.opt_string("last_name")?,
            email: r.opt_string("email")?,
            telephone: r.opt_string("telephone")?,
            telephone_type_of: r.opt_i64("telephone_type_of")?,
            telephone_extension: r.opt_string("telephone_extension")?,
            other_telephone: r.opt_string("other_telephone")?,
            other_telephone_type_of: r.opt_i64("other_telephone_type_of")?,
            other_telephone_extension: r.opt_string("other_telephone_extension")?,
            gender: r.text_or_code("gender")?,
            birthdate: r.opt_date("birthdate")?,
            join_date: r.opt_date("join_date")?,
            nationality: r.opt_string("nationality")?,
            tax_id: r.opt_string("tax_id")?,
            description: r.opt_string("description")?,
            how_hear_id: r.opt_i64("how_hear_id")?,
            how_hear_other: r.opt_string("how_hear_other")?,
            state: r.opt_string("state")?,
            is_archived: r.bool_or_false("is_archived")?,
            address: LegacyAddress::read(r)?,
            audit: LegacyAudit::read(r)?,
        })
    }
}

/// Two-column association row of a legacy many-to-many table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyLink {
    pub id: i64,
    pub owner_id: i64,
    pub member_id: i64,
}

impl LegacyLink {
    /// Projections alias the two foreign keys to `owner_id` and `member_id`.
    pub fn read(r: &RowReader<'_>) -> Result<Self> {
        Ok(Self {
            id: r.id("id")?,
            owner_id: r.id("owner_id")?,
            member_id: r.id("member_id")?,
        })
    }
}

/// Declare a newtype over [`LegacyLink`] bound to one legacy join table.
macro_rules! link_table {
    ($(#[$meta:meta])* $name:ident, $table:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(pub $crate::source::common::LegacyLink);

        impl $crate::source::row::FromLegacyRow for $name {
            const TABLE: &'static str = $table;

            fn from_row(row: &tokio_postgres::Row) -> $crate::error::Result<Self> {
                let r = $crate::source::row::RowReader::new(row, $table);
                $crate::source::common::LegacyLink::read(&r).map($name)
            }
        }
    };
}

pub(crate) use link_table;

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_audit_projection_without_audit_columns() {
        let projection = audit_projection(&columns(&["id", "text", "is_archived"]));
        assert_eq!(
            projection,
            "NULL::timestamptz AS created_at, NULL::bigint AS created_by_id, \
             NULL::text AS created_from, NULL::timestamptz AS last_modified_at, \
             NULL::bigint AS last_modified_by_id, NULL::text AS last_modified_from"
        );
    }

    #[test]
    fn test_audit_projection_aliases_short_names() {
        let projection = audit_projection(&columns(&[
            "id",
            "created",
            "created_by_id",
            "last_modified",
            "last_modified_by_id",
        ]));
        assert!(projection
            .starts_with("created AS created_at, created_by_id, NULL::text AS created_from"));
        assert!(projection.contains("last_modified AS last_modified_at, last_modified_by_id"));
    }

    #[test]
    fn test_audit_projection_with_full_columns() {
        let projection = audit_projection(&columns(&[
            "created_at",
            "created_by_id",
            "created_from",
            "last_modified_at",
            "last_modified_by_id",
            "last_modified_from",
        ]));
        assert_eq!(projection, AUDIT_AT_COLUMNS);
    }
}
