//! Reference tables: how-heard items, tags, vehicle types, insurance
//! requirements, skill sets, service fees, bulletins and comments.

use bson::oid::ObjectId;
use tracing::{info, warn};

use crate::error::Result;
use crate::model::{
    Audit, Bulletin, Comment, Entity, HowHearAboutUsItem, InsuranceRequirement, ServiceFee,
    SkillSet, Status, Tag, Tenant, VehicleType,
};
use crate::resolver::Resolver;
use crate::source::{
    LegacyAudit, LegacyBulletin, LegacyComment, LegacyHowHear, LegacyInsuranceRequirement,
    LegacyServiceFee, LegacySkillSet, LegacySkillSetInsuranceRequirement, LegacyTag,
    LegacyVehicleType,
};
use crate::store::{DocumentStore, Repository};

use super::compose::text;
use super::resolve_audit;

pub fn how_hear_from_legacy(
    row: &LegacyHowHear,
    tenant_id: ObjectId,
    audit: Audit,
) -> HowHearAboutUsItem {
    HowHearAboutUsItem {
        id: ObjectId::new(),
        tenant_id,
        public_id: row.id,
        text: text(&row.text),
        sort_number: row.sort_number.unwrap_or_default(),
        is_for_associate: row.is_for_associate,
        is_for_customer: row.is_for_customer,
        is_for_staff: row.is_for_staff,
        is_for_partner: row.is_for_partner,
        status: Status::from_archived(row.is_archived),
        audit,
    }
}

pub fn tag_from_legacy(row: &LegacyTag, tenant_id: ObjectId, audit: Audit) -> Tag {
    let LegacyTag(row) = row;
    Tag {
        id: ObjectId::new(),
        tenant_id,
        public_id: row.id,
        text: text(&row.text),
        description: text(&row.description),
        status: Status::from_archived(row.is_archived),
        audit,
    }
}

pub fn vehicle_type_from_legacy(
    row: &LegacyVehicleType,
    tenant_id: ObjectId,
    audit: Audit,
) -> VehicleType {
    let LegacyVehicleType(row) = row;
    VehicleType {
        id: ObjectId::new(),
        tenant_id,
        public_id: row.id,
        name: text(&row.text),
        description: text(&row.description),
        status: Status::from_archived(row.is_archived),
        audit,
    }
}

pub fn insurance_requirement_from_legacy(
    row: &LegacyInsuranceRequirement,
    tenant_id: ObjectId,
    audit: Audit,
) -> InsuranceRequirement {
    let LegacyInsuranceRequirement(row) = row;
    InsuranceRequirement {
        id: ObjectId::new(),
        tenant_id,
        public_id: row.id,
        name: text(&row.text),
        description: text(&row.description),
        status: Status::from_archived(row.is_archived),
        audit,
    }
}

pub fn skill_set_from_legacy(row: &LegacySkillSet, tenant_id: ObjectId, audit: Audit) -> SkillSet {
    SkillSet {
        id: ObjectId::new(),
        tenant_id,
        public_id: row.id,
        category: text(&row.category),
        sub_category: text(&row.sub_category),
        description: text(&row.description),
        status: Status::from_archived(row.is_archived),
        insurance_requirements: Vec::new(),
        audit,
    }
}

/// Insert one document per row, built by a synchronous translator once the
/// row's audit users are resolved.
async fn import_simple<R, T, F>(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    rows: &[R],
    label: &str,
    audit_of: impl Fn(&R) -> &LegacyAudit,
    translate: F,
) -> Result<usize>
where
    T: Entity,
    F: Fn(&R, ObjectId, Audit) -> T,
{
    info!("Beginning importing {}", label);
    let resolver = Resolver::for_tenant(store, tenant.id);
    let repo = Repository::<T>::new(store);
    for row in rows {
        let audit = resolve_audit(&resolver, audit_of(row)).await?;
        let entity = translate(row, tenant.id, audit);
        repo.insert(&entity).await?;
        info!("Imported {} ID# {}", T::KIND, entity.id());
    }
    info!("Finished importing {}", label);
    Ok(rows.len())
}

pub async fn import_how_hear_items(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    rows: &[LegacyHowHear],
) -> Result<usize> {
    import_simple(
        store,
        tenant,
        rows,
        "how hear about us items",
        |r| &r.audit,
        how_hear_from_legacy,
    )
    .await
}

pub async fn import_tags(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    rows: &[LegacyTag],
) -> Result<usize> {
    import_simple(store, tenant, rows, "tags", |r| &r.0.audit, tag_from_legacy).await
}

pub async fn import_vehicle_types(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    rows: &[LegacyVehicleType],
) -> Result<usize> {
    import_simple(
        store,
        tenant,
        rows,
        "vehicle types",
        |r| &r.0.audit,
        vehicle_type_from_legacy,
    )
    .await
}

pub async fn import_insurance_requirements(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    rows: &[LegacyInsuranceRequirement],
) -> Result<usize> {
    import_simple(
        store,
        tenant,
        rows,
        "insurance requirements",
        |r| &r.0.audit,
        insurance_requirement_from_legacy,
    )
    .await
}

pub async fn import_skill_sets(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    rows: &[LegacySkillSet],
) -> Result<usize> {
    import_simple(store, tenant, rows, "skill sets", |r| &r.audit, skill_set_from_legacy).await
}

/// Append each insurance requirement to its skill set.
pub async fn import_skill_set_insurance_requirements(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    links: &[LegacySkillSetInsuranceRequirement],
) -> Result<usize> {
    super::import_links(
        store,
        tenant,
        links,
        "skill set insurance requirements",
        |l| l.0,
        |s: &mut SkillSet, r: InsuranceRequirement| s.insurance_requirements.push(r),
    )
    .await
}

pub fn service_fee_from_legacy(row: &LegacyServiceFee, tenant_id: ObjectId, audit: Audit) -> ServiceFee {
    ServiceFee {
        id: ObjectId::new(),
        tenant_id,
        public_id: row.id,
        name: text(&row.title),
        description: text(&row.description),
        percentage: row.percentage.unwrap_or_default(),
        status: Status::from_archived(row.is_archived),
        audit,
    }
}

pub async fn import_service_fees(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    rows: &[LegacyServiceFee],
) -> Result<usize> {
    info!("Beginning importing service fees");
    let resolver = Resolver::for_tenant(store, tenant.id);
    let repo = Repository::<ServiceFee>::new(store);
    for row in rows {
        let audit = resolve_audit(&resolver, &row.audit).await?;
        let fee = service_fee_from_legacy(row, tenant.id, audit);
        repo.insert(&fee).await?;
        info!("Imported Service Fee ID# {}", fee.id);
    }
    info!("Finished importing service fees");
    Ok(rows.len())
}

pub fn bulletin_from_legacy(row: &LegacyBulletin, tenant_id: ObjectId, audit: Audit) -> Bulletin {
    Bulletin {
        id: ObjectId::new(),
        tenant_id,
        public_id: row.id,
        text: text(&row.text),
        status: Status::from_archived(row.is_archived),
        audit,
    }
}

pub async fn import_bulletins(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    rows: &[LegacyBulletin],
) -> Result<usize> {
    info!("Beginning importing bulletins");
    let resolver = Resolver::for_tenant(store, tenant.id);
    let repo = Repository::<Bulletin>::new(store);
    for row in rows {
        let audit = resolve_audit(&resolver, &row.audit).await?;
        let bulletin = bulletin_from_legacy(row, tenant.id, audit);
        repo.insert(&bulletin).await?;
        info!("Imported Bulletin ID# {}", bulletin.id);
    }
    info!("Finished importing bulletins");
    Ok(rows.len())
}

/// Comments start unassigned; the comment join tables claim them later.
pub fn comment_from_legacy(row: &LegacyComment, tenant_id: ObjectId, audit: Audit) -> Comment {
    let mut comment = Comment::unassigned(tenant_id, row.id, text(&row.text));
    comment.status = Status::from_archived(row.is_archived);
    comment.audit = audit;
    comment
}

pub async fn import_comments(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    rows: &[LegacyComment],
) -> Result<usize> {
    info!("Beginning importing comments");
    let resolver = Resolver::for_tenant(store, tenant.id);
    let repo = Repository::<Comment>::new(store);
    for row in rows {
        let audit = resolve_audit(&resolver, &row.audit).await?;
        let comment = comment_from_legacy(row, tenant.id, audit);
        repo.insert(&comment).await?;
        info!("Imported Comment ID# {}", comment.id);
    }
    info!("Finished importing comments");
    Ok(rows.len())
}

/// Load a comment claimed by a join row. A missing comment is skipped.
pub(crate) async fn claim_comment(
    resolver: &Resolver<'_>,
    legacy_id: i64,
    owner: &str,
) -> Result<Option<Comment>> {
    let comment = resolver.legacy::<Comment>(Some(legacy_id)).await?;
    if comment.is_none() {
        warn!(
            "Skipping {} comment: comment with legacy ID# {} not found",
            owner, legacy_id
        );
    }
    Ok(comment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{nil_id, CommentBelongsTo};
    use crate::source::LegacyLookup;

    #[test]
    fn test_lookup_translators_copy_text() {
        let tenant = ObjectId::new();
        let lookup = LegacyLookup {
            id: 4,
            text: Some(" Truck ".into()),
            description: None,
            is_archived: true,
            ..Default::default()
        };
        let vt = vehicle_type_from_legacy(&LegacyVehicleType(lookup.clone()), tenant, Audit::default());
        assert_eq!(vt.name, "Truck");
        assert_eq!(vt.status, Status::Archived);
        assert_eq!(vt.public_id, 4);

        let tag = tag_from_legacy(&LegacyTag(lookup), tenant, Audit::default());
        assert_eq!(tag.text, "Truck");
        assert_eq!(tag.tenant_id, tenant);
    }

    #[test]
    fn test_skill_set_starts_without_requirements() {
        let row = LegacySkillSet {
            id: 9,
            category: Some("Carpentry".into()),
            sub_category: Some("Decks".into()),
            ..Default::default()
        };
        let skill_set = skill_set_from_legacy(&row, ObjectId::new(), Audit::default());
        assert!(skill_set.insurance_requirements.is_empty());
        assert_eq!(skill_set.category, "Carpentry");
    }

    #[test]
    fn test_comment_starts_unassigned() {
        let row = LegacyComment {
            id: 12,
            text: Some("Called twice".into()),
            ..Default::default()
        };
        let comment = comment_from_legacy(&row, ObjectId::new(), Audit::default());
        assert_eq!(comment.belongs_to, CommentBelongsTo::Unassigned);
        assert_eq!(comment.customer_id, nil_id());
        assert_eq!(comment.public_id, 12);
    }
}
