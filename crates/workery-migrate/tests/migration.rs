//! End-to-end migration tests against the in-memory document and object stores.

use bson::doc;
use bson::oid::ObjectId;
use chrono::{TimeZone, Utc};
use workery_migrate::hotfix;
use workery_migrate::model::{
    is_nil, nil_id, ActivitySheet, ActivitySheetStatus, Associate, Attachment, AttachmentType,
    Audit, Comment, Customer, Order, OrderStatus, PartySnapshot, SkillSet, Status, Tag, TaskItem,
    Tenant, User,
};
use workery_migrate::source::{
    LegacyActivitySheet, LegacyAddress, LegacyAssociate, LegacyAudit, LegacyComment,
    LegacyCustomer, LegacyCustomerComment, LegacyCustomerTag, LegacyInsuranceRequirement,
    LegacyLink, LegacyLookup, LegacyOrder, LegacyPerson, LegacyPrivateFile, LegacyServiceFee,
    LegacySkillSet, LegacySkillSetInsuranceRequirement, LegacyTag, LegacyTaskItem, LegacyTenant,
    LegacyUser,
};
use workery_migrate::translate::{self, attachment, order, principal, reference, tenant};
use workery_migrate::{DocumentStore, MemoryObjectStore, MemoryStore, Repository};

// =============================================================================
// Fixtures
// =============================================================================

fn legacy_tenant() -> LegacyTenant {
    LegacyTenant {
        id: 2,
        schema_name: "london".into(),
        name: Some("London".into()),
        ..Default::default()
    }
}

fn legacy_user() -> LegacyUser {
    LegacyUser {
        id: 7,
        email: Some("ann@example.com".into()),
        first_name: Some("Ann".into()),
        last_name: Some("Lee".into()),
        is_active: true,
        date_joined: Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
        ..Default::default()
    }
}

fn created_by(user_id: i64) -> LegacyAudit {
    LegacyAudit {
        created_at: Some(Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap()),
        created_by_id: Some(user_id),
        ..Default::default()
    }
}

fn legacy_customer() -> LegacyCustomer {
    LegacyCustomer {
        id: 33,
        person: LegacyPerson {
            given_name: Some("Bo".into()),
            last_name: Some("Park".into()),
            email: Some("bo@example.com".into()),
            state: Some("active".into()),
            address: LegacyAddress {
                street_address: Some("1 King St".into()),
                locality: Some("London".into()),
                postal_code: Some("M5V".into()),
                ..Default::default()
            },
            audit: created_by(7),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn legacy_associate(service_fee_id: Option<i64>) -> LegacyAssociate {
    LegacyAssociate {
        id: 44,
        person: LegacyPerson {
            given_name: Some("Cy".into()),
            last_name: Some("Diaz".into()),
            email: Some("cy@example.com".into()),
            state: Some("active".into()),
            audit: created_by(7),
            ..Default::default()
        },
        service_fee_id,
        ..Default::default()
    }
}

fn legacy_order(id: i64, state: &str) -> LegacyOrder {
    LegacyOrder {
        id,
        customer_id: Some(33),
        state: Some(state.into()),
        audit: created_by(7),
        ..Default::default()
    }
}

/// Load tenant, user and customer; return the tenant.
async fn seed_chain(store: &MemoryStore) -> Tenant {
    tenant::import_tenants(store, &[legacy_tenant()]).await.unwrap();
    let t = translate::resolve_tenant(store, "london").await.unwrap();
    tenant::import_users(store, &t, &[legacy_user()]).await.unwrap();
    principal::import_customers(store, &t, &[legacy_customer()])
        .await
        .unwrap();
    t
}

async fn only<T: workery_migrate::model::Entity>(store: &dyn DocumentStore) -> T {
    let mut all = Repository::<T>::new(store).all().await.unwrap();
    assert_eq!(all.len(), 1, "expected exactly one {}", T::KIND);
    all.remove(0)
}

fn customer_attachment(t: &Tenant, customer: &Customer, object_key: &str) -> Attachment {
    Attachment {
        id: ObjectId::new(),
        tenant_id: t.id,
        public_id: 1,
        type_of: AttachmentType::Customer,
        customer_id: customer.id,
        customer_name: customer.name.clone(),
        associate_id: nil_id(),
        associate_name: String::new(),
        order_id: nil_id(),
        staff_id: nil_id(),
        staff_name: String::new(),
        object_key: object_key.to_string(),
        filename: "xyz.pdf".into(),
        title: String::new(),
        description: String::new(),
        status: Status::Active,
        audit: Audit::default(),
    }
}

// =============================================================================
// Bulk load
// =============================================================================

#[tokio::test]
async fn test_tenant_user_customer_chain() {
    let store = MemoryStore::new();
    seed_chain(&store).await;

    assert_eq!(store.count("tenants"), 1);

    let user: User = only(&store).await;
    assert_eq!(user.lexical_name, "Lee, Ann");
    assert_eq!(user.name, "Ann Lee");
    assert_eq!(user.public_id, 7);

    let customer: Customer = only(&store).await;
    assert_eq!(customer.status, Status::Active);
    assert_eq!(customer.public_id, 33);
    assert_eq!(customer.audit.created_by_user_name, "Ann Lee");
    assert_eq!(customer.audit.created_by_user_id, user.id);
    assert!(customer.address.full_address_with_postal_code.ends_with(", M5V"));
    assert_eq!(customer.lexical_name, "Park, Bo");
    assert!(customer.tags.is_empty());
    assert!(customer.comments.is_empty());
}

#[tokio::test]
async fn test_order_with_unknown_state() {
    let store = MemoryStore::new();
    let t = seed_chain(&store).await;
    order::import_orders(&store, &t, &[legacy_order(100, "frobnicated")])
        .await
        .unwrap();

    let customer: Customer = only(&store).await;
    let order: Order = only(&store).await;
    assert_eq!(order.public_id, 100);
    assert_eq!(order.status, OrderStatus::Archived);
    assert_eq!(order.customer_id, customer.id);
    assert_eq!(order.customer, PartySnapshot::from(&customer));
    assert_eq!(
        order.customer.full_address,
        customer.address.full_address_without_postal_code
    );
    assert!(order.associate.is_none());
    assert!(is_nil(&order.invoice_service_fee_id));
    assert!(order.invoice_service_fee_name.is_empty());
}

#[tokio::test]
async fn test_order_with_missing_customer_is_fatal() {
    let store = MemoryStore::new();
    let t = seed_chain(&store).await;
    let mut row = legacy_order(101, "new");
    row.customer_id = Some(404);

    let err = order::import_orders(&store, &t, &[row]).await.unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert_eq!(store.count("orders"), 0);
}

#[tokio::test]
async fn test_order_with_missing_associate_is_fatal() {
    let store = MemoryStore::new();
    let t = seed_chain(&store).await;
    let mut row = legacy_order(102, "new");
    row.associate_id = Some(404);

    let err = order::import_orders(&store, &t, &[row]).await.unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert!(err.to_string().contains("404"));
    assert_eq!(store.count("orders"), 0);
}

#[tokio::test]
async fn test_order_with_zero_associate_has_none() {
    let store = MemoryStore::new();
    let t = seed_chain(&store).await;
    let mut row = legacy_order(103, "new");
    row.associate_id = Some(0);
    order::import_orders(&store, &t, &[row]).await.unwrap();

    let order: Order = only(&store).await;
    assert!(order.associate.is_none());
}

#[tokio::test]
async fn test_activity_sheet_with_missing_associate_is_fatal() {
    let store = MemoryStore::new();
    let t = seed_chain(&store).await;
    order::import_orders(&store, &t, &[legacy_order(100, "new")])
        .await
        .unwrap();
    let sheet = LegacyActivitySheet {
        id: 12,
        job_id: Some(100),
        associate_id: Some(404),
        ..Default::default()
    };

    let err = order::import_activity_sheets(&store, &t, &[sheet])
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 3);
    assert_eq!(store.count("activity_sheets"), 0);
}

#[tokio::test]
async fn test_reference_rows_resolve_their_audit_users() {
    let store = MemoryStore::new();
    let t = seed_chain(&store).await;
    reference::import_tags(
        &store,
        &t,
        &[LegacyTag(LegacyLookup {
            id: 9,
            text: Some("VIP".into()),
            audit: created_by(7),
            ..Default::default()
        })],
    )
    .await
    .unwrap();
    reference::import_skill_sets(
        &store,
        &t,
        &[LegacySkillSet {
            id: 3,
            category: Some("Carpentry".into()),
            audit: created_by(9999),
            ..Default::default()
        }],
    )
    .await
    .unwrap();

    let user: User = only(&store).await;
    let tag: Tag = only(&store).await;
    assert_eq!(tag.audit.created_by_user_id, user.id);
    assert_eq!(tag.audit.created_by_user_name, "Ann Lee");
    assert!(tag.audit.created_at.is_some());

    let skill_set: SkillSet = only(&store).await;
    assert!(is_nil(&skill_set.audit.created_by_user_id));
    assert!(skill_set.audit.created_by_user_name.is_empty());
}

#[tokio::test]
async fn test_skill_set_link_to_missing_requirement_is_skipped() {
    let store = MemoryStore::new();
    let t = seed_chain(&store).await;
    reference::import_skill_sets(
        &store,
        &t,
        &[LegacySkillSet {
            id: 9,
            category: Some("Carpentry".into()),
            ..Default::default()
        }],
    )
    .await
    .unwrap();
    reference::import_insurance_requirements(
        &store,
        &t,
        &[LegacyInsuranceRequirement(LegacyLookup {
            id: 5,
            text: Some("Liability".into()),
            ..Default::default()
        })],
    )
    .await
    .unwrap();

    let link = |id, member_id| {
        LegacySkillSetInsuranceRequirement(LegacyLink {
            id,
            owner_id: 9,
            member_id,
        })
    };
    reference::import_skill_set_insurance_requirements(&store, &t, &[link(1, 777), link(2, 5)])
        .await
        .unwrap();

    let skill_set: SkillSet = only(&store).await;
    assert_eq!(skill_set.insurance_requirements.len(), 1);
    assert_eq!(skill_set.insurance_requirements[0].name, "Liability");
}

#[tokio::test]
async fn test_comment_with_missing_audit_user() {
    let store = MemoryStore::new();
    let t = seed_chain(&store).await;
    let row = LegacyComment {
        id: 5,
        text: Some("Called twice".into()),
        audit: created_by(9999),
        ..Default::default()
    };
    reference::import_comments(&store, &t, &[row]).await.unwrap();

    let comment: Comment = only(&store).await;
    assert_eq!(comment.text, "Called twice");
    assert!(is_nil(&comment.audit.created_by_user_id));
    assert!(comment.audit.created_by_user_name.is_empty());
}

#[tokio::test]
async fn test_customer_comments_and_tags_are_embedded() {
    let store = MemoryStore::new();
    let t = seed_chain(&store).await;
    reference::import_comments(
        &store,
        &t,
        &[LegacyComment {
            id: 5,
            text: Some("Prefers mornings".into()),
            audit: created_by(7),
            ..Default::default()
        }],
    )
    .await
    .unwrap();
    reference::import_tags(
        &store,
        &t,
        &[LegacyTag(LegacyLookup {
            id: 9,
            text: Some("VIP".into()),
            ..Default::default()
        })],
    )
    .await
    .unwrap();

    let link = |id, member_id| LegacyLink {
        id,
        owner_id: 33,
        member_id,
    };
    principal::import_customer_comments(
        &store,
        &t,
        &[LegacyCustomerComment(link(1, 5)), LegacyCustomerComment(link(2, 404))],
    )
    .await
    .unwrap();
    principal::import_customer_tags(&store, &t, &[LegacyCustomerTag(link(1, 9))])
        .await
        .unwrap();

    let customer: Customer = only(&store).await;
    assert_eq!(customer.comments.len(), 1);
    assert_eq!(customer.comments[0].text, "Prefers mornings");
    assert_eq!(customer.comments[0].customer_id, customer.id);
    assert_eq!(customer.tags.len(), 1);
    assert_eq!(customer.tags[0].text, "VIP");

    let comment: Comment = only(&store).await;
    assert_eq!(comment.customer_id, customer.id);
}

#[tokio::test]
async fn test_task_items_and_activity_sheets_follow_their_order() {
    let store = MemoryStore::new();
    let t = seed_chain(&store).await;
    principal::import_associates(&store, &t, &[legacy_associate(None)])
        .await
        .unwrap();
    let mut row = legacy_order(100, "in_progress");
    row.associate_id = Some(44);
    order::import_orders(&store, &t, &[row]).await.unwrap();

    let task = LegacyTaskItem {
        id: 8,
        job_id: Some(100),
        title: Some("Follow up".into()),
        is_closed: false,
        audit: created_by(7),
        ..Default::default()
    };
    order::import_task_items(&store, &t, &[task]).await.unwrap();

    let sheet = LegacyActivitySheet {
        id: 12,
        job_id: Some(100),
        associate_id: Some(44),
        state: Some("accepted".into()),
        audit: created_by(7),
        ..Default::default()
    };
    order::import_activity_sheets(&store, &t, &[sheet]).await.unwrap();

    let associate: Associate = only(&store).await;
    let order: Order = only(&store).await;
    let task: TaskItem = only(&store).await;
    let sheet: ActivitySheet = only(&store).await;

    assert_eq!(task.order_id, order.id);
    assert_eq!(task.status, Status::Active);
    assert_eq!(task.customer, order.customer);
    assert_eq!(order.latest_pending_task_id, task.id);
    assert_eq!(order.latest_pending_task_title, "Follow up");

    assert_eq!(sheet.order_id, order.id);
    assert_eq!(sheet.associate_id, associate.id);
    assert_eq!(sheet.associate_name, "Cy Diaz");
    assert_eq!(sheet.status, ActivitySheetStatus::Accepted);
}

// =============================================================================
// Attachments
// =============================================================================

#[tokio::test]
async fn test_attachment_download_then_upload() {
    let store = MemoryStore::new();
    let t = seed_chain(&store).await;
    let staging = tempfile::tempdir().unwrap();
    let legacy = MemoryObjectStore::new("legacy")
        .with_object("media/u/abc/xyz.pdf", b"%PDF".to_vec())
        .with_object("media/u/abc/other.pdf", b"other".to_vec());
    let target = MemoryObjectStore::new("workery");
    let row = LegacyPrivateFile {
        id: 3,
        data_file: Some("/var/foo/xyz.pdf".into()),
        title: Some("Quote".into()),
        customer_id: Some(33),
        audit: created_by(7),
        ..Default::default()
    };

    let downloaded = attachment::download_attachments(&store, &t, &legacy, &[row], staging.path())
        .await
        .unwrap();
    assert_eq!(downloaded, 1);
    assert_eq!(std::fs::read(staging.path().join("xyz.pdf")).unwrap(), b"%PDF");

    let uploaded = attachment::upload_attachments(&store, &t, &target).await.unwrap();
    assert_eq!(uploaded, 1);

    let attachment: Attachment = only(&store).await;
    let expected = format!("tenant/{}/private/uploads/xyz.pdf", t.id.to_hex());
    assert_eq!(attachment.object_key, expected);
    assert_eq!(attachment.type_of, AttachmentType::Customer);
    assert_eq!(attachment.customer_name, "Bo Park");
    assert!(target.contains(&expected));
    assert!(legacy.contains("media/u/abc/xyz.pdf"));
    assert_eq!(legacy.len(), 2);

    // A second upload run leaves already uploaded attachments alone.
    let again = attachment::upload_attachments(&store, &t, &target).await.unwrap();
    assert_eq!(again, 0);
}

#[tokio::test]
async fn test_unbound_private_file_is_skipped() {
    let store = MemoryStore::new();
    let t = seed_chain(&store).await;
    let staging = tempfile::tempdir().unwrap();
    let legacy = MemoryObjectStore::new("legacy").with_object("media/xyz.pdf", b"x".to_vec());
    let row = LegacyPrivateFile {
        id: 3,
        data_file: Some("/var/foo/xyz.pdf".into()),
        customer_id: Some(404),
        ..Default::default()
    };

    let downloaded = attachment::download_attachments(&store, &t, &legacy, &[row], staging.path())
        .await
        .unwrap();
    assert_eq!(downloaded, 0);
    assert_eq!(store.count("attachments"), 0);
}

// =============================================================================
// Hotfix passes
// =============================================================================

#[tokio::test]
async fn test_dedupe_keeps_one_attachment() {
    let store = MemoryStore::new();
    let t = seed_chain(&store).await;
    let customer: Customer = only(&store).await;
    let legacy = MemoryObjectStore::new("legacy").with_object("media/u/abc/xyz.pdf", b"x".to_vec());

    let repo = Repository::<Attachment>::new(&store);
    for _ in 0..3 {
        repo.insert(&customer_attachment(&t, &customer, "media/u/abc/xyz.pdf"))
            .await
            .unwrap();
    }
    repo.insert(&customer_attachment(&t, &customer, "media/u/abc/other.pdf"))
        .await
        .unwrap();

    let deleted = hotfix::dedupe_attachments(&store, &t).await.unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(store.count("attachments"), 2);
    let remaining = repo
        .find(doc! { "object_key": "media/u/abc/xyz.pdf" })
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert!(legacy.contains("media/u/abc/xyz.pdf"));
    assert_eq!(legacy.len(), 1);
}

#[tokio::test]
async fn test_service_fee_cascade() {
    let store = MemoryStore::new();
    let t = seed_chain(&store).await;
    reference::import_service_fees(
        &store,
        &t,
        &[LegacyServiceFee {
            id: 1,
            title: Some("Standard".into()),
            percentage: Some(30.0),
            ..Default::default()
        }],
    )
    .await
    .unwrap();
    principal::import_associates(&store, &t, &[legacy_associate(Some(1))])
        .await
        .unwrap();

    let rows: Vec<LegacyOrder> = [100, 101]
        .into_iter()
        .map(|id| {
            let mut row = legacy_order(id, "in_progress");
            row.associate_id = Some(44);
            row
        })
        .collect();
    order::import_orders(&store, &t, &rows).await.unwrap();
    order::import_task_items(
        &store,
        &t,
        &[LegacyTaskItem {
            id: 8,
            job_id: Some(101),
            title: Some("Visit".into()),
            ..Default::default()
        }],
    )
    .await
    .unwrap();

    let updated = hotfix::cascade_service_fees(&store, &t).await.unwrap();
    assert_eq!(updated, 3);

    let associate: Associate = only(&store).await;
    assert_eq!(associate.service_fee_percentage, 30.0);
    let orders = Repository::<Order>::new(&store).all().await.unwrap();
    assert_eq!(orders.len(), 2);
    for order in &orders {
        assert_eq!(order.invoice_service_fee_percentage, 30.0);
        assert_eq!(order.invoice_service_fee_name, associate.service_fee_name);
        assert_eq!(order.invoice_service_fee_id, associate.service_fee_id);
    }
    let task: TaskItem = only(&store).await;
    assert_eq!(task.invoice_service_fee_percentage, 30.0);
    assert_eq!(task.invoice_service_fee_name, associate.service_fee_name);
}

#[tokio::test]
async fn test_export_attachments_csv() {
    let store = MemoryStore::new();
    let t = seed_chain(&store).await;
    let customer: Customer = only(&store).await;
    Repository::<Attachment>::new(&store)
        .insert(&customer_attachment(&t, &customer, "media/u/abc/xyz.pdf"))
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("attachments.csv");
    let written = hotfix::export_attachments(&store, &t, &path).await.unwrap();
    assert_eq!(written, 1);

    let csv = std::fs::read_to_string(&path).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some(hotfix::CSV_HEADER));
    let row = lines.next().unwrap();
    assert!(row.contains(&customer.id.to_hex()));
    assert!(row.contains("Bo Park"));
    assert!(row.ends_with("media/u/abc/xyz.pdf"));
    assert!(lines.next().is_none());
}

#[tokio::test]
async fn test_fix_principals_restores_public_id() {
    let store = MemoryStore::new();
    let t = seed_chain(&store).await;
    let identity = hotfix::LegacyIdentity {
        legacy_id: 3300,
        email: "bo@example.com".into(),
        last_modified_by_id: Some(7),
    };

    let fixed = hotfix::fix_principals::<Customer>(&store, &t, &[identity])
        .await
        .unwrap();
    assert_eq!(fixed, 1);

    let customer: Customer = only(&store).await;
    let user: User = only(&store).await;
    assert_eq!(customer.public_id, 3300);
    assert_eq!(customer.audit.modified_by_user_id, user.id);
    assert_eq!(customer.audit.modified_by_user_name, "Ann Lee");
}
