//! Export of attachment records to CSV for manual review.

use std::path::Path;

use bson::doc;
use bson::oid::ObjectId;
use tracing::info;

use crate::error::Result;
use crate::model::{is_nil, Attachment, Tenant};
use crate::store::{DocumentStore, Repository};

pub const CSV_HEADER: &str = "id,customer_id,customer_name,associate_id,associate_name,\
order_id,staff_id,staff_name,title,description,created_at,object_key";

/// Quote a field when it contains a separator, quote or line break.
pub fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r')
    {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn hex(id: &ObjectId) -> String {
    if is_nil(id) {
        String::new()
    } else {
        id.to_hex()
    }
}

fn csv_row(a: &Attachment) -> String {
    let created_at = a
        .audit
        .created_at
        .map(|t| t.to_chrono().format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default();
    [
        hex(&a.id),
        hex(&a.customer_id),
        a.customer_name.clone(),
        hex(&a.associate_id),
        a.associate_name.clone(),
        hex(&a.order_id),
        hex(&a.staff_id),
        a.staff_name.clone(),
        a.title.clone(),
        a.description.clone(),
        created_at,
        a.object_key.clone(),
    ]
    .iter()
    .map(|field| csv_escape(field))
    .collect::<Vec<_>>()
    .join(",")
}

/// Header line plus one line per attachment, newline terminated.
pub fn attachments_csv(attachments: &[Attachment]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for attachment in attachments {
        out.push_str(&csv_row(attachment));
        out.push('\n');
    }
    out
}

pub async fn export_attachments(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    path: &Path,
) -> Result<usize> {
    info!("Beginning exporting attachments to {}", path.display());
    let attachments = Repository::<Attachment>::new(store)
        .find(doc! { "tenant_id": tenant.id })
        .await?;
    tokio::fs::write(path, attachments_csv(&attachments)).await?;
    info!("Finished exporting {} attachments", attachments.len());
    Ok(attachments.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{nil_id, AttachmentType, Audit, Status};

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_header_has_twelve_columns() {
        assert_eq!(CSV_HEADER.split(',').count(), 12);
    }

    #[test]
    fn test_csv_row() {
        let created = chrono::DateTime::parse_from_rfc3339("2021-03-04T05:06:07Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let order = ObjectId::new();
        let attachment = Attachment {
            id: ObjectId::new(),
            tenant_id: ObjectId::new(),
            public_id: 2,
            type_of: AttachmentType::Order,
            customer_id: nil_id(),
            customer_name: String::new(),
            associate_id: nil_id(),
            associate_name: String::new(),
            order_id: order,
            staff_id: nil_id(),
            staff_name: String::new(),
            object_key: "tenant/x/private/uploads/q.pdf".into(),
            filename: "q.pdf".into(),
            title: "Quote, final".into(),
            description: String::new(),
            status: Status::Active,
            audit: Audit {
                created_at: Some(bson::DateTime::from_chrono(created)),
                ..Audit::default()
            },
        };
        let csv = attachments_csv(&[attachment.clone()]);
        let line = csv.lines().nth(1).unwrap();
        assert_eq!(
            line,
            format!(
                "{},,,,,{},,,\"Quote, final\",,2021-03-04 05:06:07,tenant/x/private/uploads/q.pdf",
                attachment.id.to_hex(),
                order.to_hex()
            )
        );
    }
}
