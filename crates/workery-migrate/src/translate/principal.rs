//! Customers, associates, staff and their join tables.
//!
//! The three principals share the person block. Their translators copy the
//! creator into the modifier fields; `hotfix01` restores the real modifier.

use bson::oid::ObjectId;
use tracing::{info, warn};

use crate::error::{MigrateError, Result};
use crate::model::{
    Address, Associate, Audit, AwayLog, Comment, CommentBelongsTo, Customer, CustomerType, Entity,
    Gender, InsuranceRequirement, Phone, ServiceFee, SkillSet, Staff, Status, Tag, Tenant,
    UntilFurtherNotice, VehicleType,
};
use crate::resolver::Resolver;
use crate::source::{
    LegacyAssociate, LegacyAssociateComment, LegacyAssociateInsuranceRequirement,
    LegacyAssociateSkillSet, LegacyAssociateStatus, LegacyAssociateTag,
    LegacyAssociateVehicleType, LegacyAwayLog, LegacyCustomer, LegacyCustomerComment,
    LegacyCustomerTag, LegacyLink, LegacyPerson, LegacyStaff, LegacyStaffComment,
};
use crate::store::{DocumentStore, Repository};

use super::compose::{self, text};
use super::reference::claim_comment;
use super::{
    import_links, resolve_audit, resolve_how_hear, resolve_user, HowHearRef, UserRef,
};

/// References a principal row needs resolved before translation.
#[derive(Debug, Clone, PartialEq)]
pub struct PrincipalRefs {
    pub audit: Audit,
    pub how_hear: HowHearRef,
    pub owner: UserRef,
}

pub async fn resolve_principal_refs(
    resolver: &Resolver<'_>,
    person: &LegacyPerson,
    owner_id: Option<i64>,
) -> Result<PrincipalRefs> {
    Ok(PrincipalRefs {
        audit: resolve_audit(resolver, &person.audit).await?,
        how_hear: resolve_how_hear(resolver, person.how_hear_id, &person.how_hear_other).await?,
        owner: resolve_user(resolver, owner_id).await?,
    })
}

/// Fields shared by every principal, derived from the legacy person block.
struct Person {
    first_name: String,
    last_name: String,
    name: String,
    lexical_name: String,
    email: String,
    phone: Option<Phone>,
    other_phone: Option<Phone>,
    gender: Option<Gender>,
    birthdate: Option<bson::DateTime>,
    join_date: Option<bson::DateTime>,
    nationality: String,
    tax_id: String,
    description: String,
    status: Status,
    address: Address,
}

impl Person {
    fn from_legacy(p: &LegacyPerson) -> Self {
        let first_name = text(&p.given_name);
        let last_name = text(&p.last_name);
        Self {
            name: compose::full_name(&first_name, &last_name),
            lexical_name: compose::lexical_name(&first_name, &last_name),
            first_name,
            last_name,
            email: text(&p.email),
            phone: compose::phone(&p.telephone, p.telephone_type_of, &p.telephone_extension),
            other_phone: compose::phone(
                &p.other_telephone,
                p.other_telephone_type_of,
                &p.other_telephone_extension,
            ),
            gender: compose::gender(&p.gender),
            birthdate: compose::date(p.birthdate),
            join_date: compose::date(p.join_date),
            nationality: text(&p.nationality),
            tax_id: text(&p.tax_id),
            description: text(&p.description),
            status: compose::principal_status(p.is_archived, &p.state),
            address: compose::address(&p.address),
        }
    }
}

/// Principal translators record the creator as the last modifier too.
fn creator_as_modifier(mut audit: Audit) -> Audit {
    audit.modified_by_user_id = audit.created_by_user_id;
    audit.modified_by_user_name = audit.created_by_user_name.clone();
    audit
}

pub fn customer_from_legacy(row: &LegacyCustomer, tenant_id: ObjectId, refs: PrincipalRefs) -> Customer {
    let p = Person::from_legacy(&row.person);
    Customer {
        id: ObjectId::new(),
        tenant_id,
        public_id: row.id,
        type_of: CustomerType::from_code(row.type_of),
        organization_name: text(&row.organization_name),
        first_name: p.first_name,
        last_name: p.last_name,
        name: p.name,
        lexical_name: p.lexical_name,
        email: p.email,
        is_ok_to_email: row.is_ok_to_email,
        is_ok_to_text: row.is_ok_to_text,
        phone: p.phone,
        other_phone: p.other_phone,
        gender: p.gender,
        birthdate: p.birthdate,
        join_date: p.join_date,
        nationality: p.nationality,
        tax_id: p.tax_id,
        description: p.description,
        status: p.status,
        how_hear_id: refs.how_hear.id,
        how_hear_text: refs.how_hear.text,
        is_how_hear_other: refs.how_hear.is_other,
        address: p.address,
        audit: creator_as_modifier(refs.audit),
        tags: Vec::new(),
        comments: Vec::new(),
        skill_sets: Vec::new(),
        insurance_requirements: Vec::new(),
        vehicle_types: Vec::new(),
        away_logs: Vec::new(),
    }
}

pub async fn import_customers(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    rows: &[LegacyCustomer],
) -> Result<usize> {
    info!("Beginning importing customers");
    let resolver = Resolver::for_tenant(store, tenant.id);
    let repo = Repository::<Customer>::new(store);
    for row in rows {
        let refs = resolve_principal_refs(&resolver, &row.person, None).await?;
        let customer = customer_from_legacy(row, tenant.id, refs);
        repo.insert(&customer).await?;
        info!("Imported Customer ID# {}", customer.id);
    }
    info!("Finished importing customers");
    Ok(rows.len())
}

/// Service fee copied onto an associate.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeRef {
    pub id: ObjectId,
    pub name: String,
    pub percentage: f64,
}

impl FeeRef {
    pub fn none() -> Self {
        Self {
            id: crate::model::nil_id(),
            name: String::new(),
            percentage: 0.0,
        }
    }
}

impl From<&ServiceFee> for FeeRef {
    fn from(fee: &ServiceFee) -> Self {
        Self {
            id: fee.id,
            name: fee.name.clone(),
            percentage: fee.percentage,
        }
    }
}

pub fn associate_from_legacy(
    row: &LegacyAssociate,
    tenant_id: ObjectId,
    refs: PrincipalRefs,
    fee: FeeRef,
) -> Associate {
    let p = Person::from_legacy(&row.person);
    Associate {
        id: ObjectId::new(),
        tenant_id,
        public_id: row.id,
        owner_user_id: refs.owner.id,
        first_name: p.first_name,
        last_name: p.last_name,
        name: p.name,
        lexical_name: p.lexical_name,
        email: p.email,
        phone: p.phone,
        other_phone: p.other_phone,
        gender: p.gender,
        birthdate: p.birthdate,
        join_date: p.join_date,
        nationality: p.nationality,
        tax_id: p.tax_id,
        description: p.description,
        status: p.status,
        how_hear_id: refs.how_hear.id,
        how_hear_text: refs.how_hear.text,
        is_how_hear_other: refs.how_hear.is_other,
        hourly_salary_desired: row.hourly_salary_desired.unwrap_or_default(),
        service_fee_id: fee.id,
        service_fee_name: fee.name,
        service_fee_percentage: fee.percentage,
        wsib_number: text(&row.wsib_number),
        police_check: compose::date(row.police_check),
        driver_license_class: text(&row.drivers_license_class),
        emergency_contact_name: text(&row.emergency_contact_name),
        emergency_contact_telephone: text(&row.emergency_contact_telephone),
        address: p.address,
        audit: creator_as_modifier(refs.audit),
        tags: Vec::new(),
        comments: Vec::new(),
        skill_sets: Vec::new(),
        insurance_requirements: Vec::new(),
        vehicle_types: Vec::new(),
        away_logs: Vec::new(),
    }
}

pub async fn import_associates(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    rows: &[LegacyAssociate],
) -> Result<usize> {
    info!("Beginning importing associates");
    let resolver = Resolver::for_tenant(store, tenant.id);
    let repo = Repository::<Associate>::new(store);
    for row in rows {
        let refs = resolve_principal_refs(&resolver, &row.person, row.owner_id).await?;
        let fee = match resolver.legacy::<ServiceFee>(row.service_fee_id).await? {
            Some(fee) => FeeRef::from(&fee),
            None => FeeRef::none(),
        };
        let associate = associate_from_legacy(row, tenant.id, refs, fee);
        repo.insert(&associate).await?;
        info!("Imported Associate ID# {}", associate.id);
    }
    info!("Finished importing associates");
    Ok(rows.len())
}

pub fn staff_from_legacy(row: &LegacyStaff, tenant_id: ObjectId, refs: PrincipalRefs) -> Staff {
    let p = Person::from_legacy(&row.person);
    Staff {
        id: ObjectId::new(),
        tenant_id,
        public_id: row.id,
        owner_user_id: refs.owner.id,
        first_name: p.first_name,
        last_name: p.last_name,
        name: p.name,
        lexical_name: p.lexical_name,
        email: p.email,
        personal_email: text(&row.personal_email),
        phone: p.phone,
        other_phone: p.other_phone,
        gender: p.gender,
        birthdate: p.birthdate,
        join_date: p.join_date,
        nationality: p.nationality,
        tax_id: p.tax_id,
        description: p.description,
        status: p.status,
        how_hear_id: refs.how_hear.id,
        how_hear_text: refs.how_hear.text,
        is_how_hear_other: refs.how_hear.is_other,
        police_check: compose::date(row.police_check),
        emergency_contact_name: text(&row.emergency_contact_name),
        emergency_contact_telephone: text(&row.emergency_contact_telephone),
        address: p.address,
        audit: creator_as_modifier(refs.audit),
        tags: Vec::new(),
        comments: Vec::new(),
        skill_sets: Vec::new(),
        insurance_requirements: Vec::new(),
        vehicle_types: Vec::new(),
        away_logs: Vec::new(),
    }
}

pub async fn import_staff(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    rows: &[LegacyStaff],
) -> Result<usize> {
    info!("Beginning importing staff");
    let resolver = Resolver::for_tenant(store, tenant.id);
    let repo = Repository::<Staff>::new(store);
    for row in rows {
        let refs = resolve_principal_refs(&resolver, &row.person, row.owner_id).await?;
        let staff = staff_from_legacy(row, tenant.id, refs);
        repo.insert(&staff).await?;
        info!("Imported Staff ID# {}", staff.id);
    }
    info!("Finished importing staff");
    Ok(rows.len())
}

/// A principal that can own comments.
pub trait CommentOwner: Entity {
    const BELONGS_TO: CommentBelongsTo;

    /// Mark the comment as owned by `self`.
    fn claim(&self, comment: &mut Comment);

    fn comments_mut(&mut self) -> &mut Vec<Comment>;
}

impl CommentOwner for Customer {
    const BELONGS_TO: CommentBelongsTo = CommentBelongsTo::Customer;

    fn claim(&self, comment: &mut Comment) {
        comment.customer_id = self.id;
        comment.customer_name = self.name.clone();
    }

    fn comments_mut(&mut self) -> &mut Vec<Comment> {
        &mut self.comments
    }
}

impl CommentOwner for Associate {
    const BELONGS_TO: CommentBelongsTo = CommentBelongsTo::Associate;

    fn claim(&self, comment: &mut Comment) {
        comment.associate_id = self.id;
        comment.associate_name = self.name.clone();
    }

    fn comments_mut(&mut self) -> &mut Vec<Comment> {
        &mut self.comments
    }
}

impl CommentOwner for Staff {
    const BELONGS_TO: CommentBelongsTo = CommentBelongsTo::Staff;

    fn claim(&self, comment: &mut Comment) {
        comment.staff_id = self.id;
        comment.staff_name = self.name.clone();
    }

    fn comments_mut(&mut self) -> &mut Vec<Comment> {
        &mut self.comments
    }
}

/// Assign comments to their owner: the comment records who owns it and the
/// owner embeds the updated comment.
pub async fn import_owned_comments<L, P: CommentOwner>(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    links: &[L],
    label: &str,
    link_of: impl Fn(&L) -> LegacyLink,
) -> Result<usize> {
    info!("Beginning importing {}", label);
    let resolver = Resolver::for_tenant(store, tenant.id);
    let owners = Repository::<P>::new(store);
    let comments = Repository::<Comment>::new(store);
    let mut claimed = 0;
    for link in links.iter().map(&link_of) {
        let mut owner = resolver
            .legacy::<P>(Some(link.owner_id))
            .await?
            .ok_or_else(|| MigrateError::not_found(P::KIND, link.owner_id))?;
        let Some(mut comment) = claim_comment(&resolver, link.member_id, P::KIND).await? else {
            continue;
        };

        comment.belongs_to = P::BELONGS_TO;
        owner.claim(&mut comment);
        comments.replace(&comment).await?;

        let comment_id = comment.id;
        owner.comments_mut().push(comment);
        owners.replace(&owner).await?;
        claimed += 1;
        info!(
            "Imported {} Comment ID# {} for {} ID# {}",
            P::KIND,
            comment_id,
            P::KIND,
            owner.id()
        );
    }
    info!("Finished importing {}", label);
    Ok(claimed)
}

pub async fn import_customer_comments(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    links: &[LegacyCustomerComment],
) -> Result<usize> {
    import_owned_comments::<_, Customer>(store, tenant, links, "customer comments", |l| l.0).await
}

pub async fn import_associate_comments(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    links: &[LegacyAssociateComment],
) -> Result<usize> {
    import_owned_comments::<_, Associate>(store, tenant, links, "associate comments", |l| l.0)
        .await
}

pub async fn import_staff_comments(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    links: &[LegacyStaffComment],
) -> Result<usize> {
    import_owned_comments::<_, Staff>(store, tenant, links, "staff comments", |l| l.0).await
}

pub async fn import_customer_tags(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    links: &[LegacyCustomerTag],
) -> Result<usize> {
    import_links(store, tenant, links, "customer tags", |l| l.0, |c: &mut Customer, t: Tag| {
        c.tags.push(t)
    })
    .await
}

pub async fn import_associate_tags(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    links: &[LegacyAssociateTag],
) -> Result<usize> {
    import_links(store, tenant, links, "associate tags", |l| l.0, |a: &mut Associate, t: Tag| {
        a.tags.push(t)
    })
    .await
}

pub async fn import_associate_skill_sets(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    links: &[LegacyAssociateSkillSet],
) -> Result<usize> {
    import_links(
        store,
        tenant,
        links,
        "associate skill sets",
        |l| l.0,
        |a: &mut Associate, s: SkillSet| a.skill_sets.push(s),
    )
    .await
}

pub async fn import_associate_vehicle_types(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    links: &[LegacyAssociateVehicleType],
) -> Result<usize> {
    import_links(
        store,
        tenant,
        links,
        "associate vehicle types",
        |l| l.0,
        |a: &mut Associate, v: VehicleType| a.vehicle_types.push(v),
    )
    .await
}

pub async fn import_associate_insurance_requirements(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    links: &[LegacyAssociateInsuranceRequirement],
) -> Result<usize> {
    import_links(
        store,
        tenant,
        links,
        "associate insurance requirements",
        |l| l.0,
        |a: &mut Associate, r: InsuranceRequirement| a.insurance_requirements.push(r),
    )
    .await
}

pub fn away_log_from_legacy(row: &LegacyAwayLog, audit: Audit) -> AwayLog {
    AwayLog {
        id: ObjectId::new(),
        public_id: row.id,
        reason: row.reason.unwrap_or_default(),
        reason_other: text(&row.reason_other),
        until_further_notice: UntilFurtherNotice::from(row.until_further_notice),
        until_date: compose::date(row.until_date),
        start_date: compose::date(row.start_date),
        status: Status::from_archived(row.was_deleted),
        audit,
    }
}

pub async fn import_associate_away_logs(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    rows: &[LegacyAwayLog],
) -> Result<usize> {
    info!("Beginning importing associate away logs");
    let resolver = Resolver::for_tenant(store, tenant.id);
    let repo = Repository::<Associate>::new(store);
    let mut imported = 0;
    for row in rows {
        let Some(associate_id) = row.associate_id.filter(|id| *id != 0) else {
            warn!("Skipping away log {} without associate", row.id);
            continue;
        };
        let mut associate = resolver
            .legacy::<Associate>(Some(associate_id))
            .await?
            .ok_or_else(|| MigrateError::not_found(Associate::KIND, associate_id))?;

        let audit = resolve_audit(&resolver, &row.audit).await?;
        let log = away_log_from_legacy(row, audit);
        let log_id = log.id;
        associate.away_logs.push(log);
        repo.replace(&associate).await?;
        imported += 1;
        info!(
            "Imported Away Log ID# {} for Associate ID# {}",
            log_id, associate.id
        );
    }
    info!("Finished importing associate away logs");
    Ok(imported)
}

/// Archived rows and associates whose login was deactivated are archived.
pub fn associate_status(row: &LegacyAssociateStatus) -> Status {
    let owner_inactive = row.owner_is_active == Some(false);
    let state_inactive = compose::principal_status(false, &row.state) == Status::Archived;
    Status::from_archived(row.is_archived || owner_inactive || state_inactive)
}

pub async fn import_associate_statuses(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    rows: &[LegacyAssociateStatus],
) -> Result<usize> {
    info!("Beginning importing associate statuses");
    let resolver = Resolver::for_tenant(store, tenant.id);
    let repo = Repository::<Associate>::new(store);
    let mut updated = 0;
    for row in rows {
        let Some(mut associate) = resolver.legacy::<Associate>(Some(row.id)).await? else {
            warn!("Skipping status of missing associate with legacy ID# {}", row.id);
            continue;
        };
        let status = associate_status(row);
        if associate.status == status {
            continue;
        }
        associate.status = status;
        repo.replace(&associate).await?;
        updated += 1;
        info!("Imported Associate Status {:?} for Associate ID# {}", status, associate.id);
    }
    info!("Finished importing associate statuses");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::nil_id;
    use crate::source::LegacyAddress;

    fn refs(created_by: &str) -> PrincipalRefs {
        let user = ObjectId::new();
        PrincipalRefs {
            audit: Audit {
                created_by_user_id: user,
                created_by_user_name: created_by.to_string(),
                modified_by_user_name: "someone else".to_string(),
                ..Audit::default()
            },
            how_hear: HowHearRef::none(),
            owner: UserRef::none(),
        }
    }

    fn legacy_customer() -> LegacyCustomer {
        LegacyCustomer {
            id: 33,
            person: LegacyPerson {
                given_name: Some("Bo".into()),
                last_name: Some("Park".into()),
                state: Some("active".into()),
                address: LegacyAddress {
                    postal_code: Some("M5V".into()),
                    locality: Some("London".into()),
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_customer_from_legacy() {
        let customer = customer_from_legacy(&legacy_customer(), ObjectId::new(), refs("Ann Lee"));
        assert_eq!(customer.public_id, 33);
        assert_eq!(customer.status, Status::Active);
        assert_eq!(customer.lexical_name, "Park, Bo");
        assert_eq!(customer.name, "Bo Park");
        assert_eq!(customer.audit.created_by_user_name, "Ann Lee");
        assert!(customer
            .address
            .full_address_with_postal_code
            .ends_with(", M5V"));
        assert!(customer.tags.is_empty());
        assert!(customer.away_logs.is_empty());
    }

    #[test]
    fn test_principal_modifier_copies_creator() {
        let customer = customer_from_legacy(&legacy_customer(), ObjectId::new(), refs("Ann Lee"));
        assert_eq!(customer.audit.modified_by_user_name, "Ann Lee");
        assert_eq!(
            customer.audit.modified_by_user_id,
            customer.audit.created_by_user_id
        );
    }

    #[test]
    fn test_associate_without_fee() {
        let row = LegacyAssociate {
            id: 5,
            ..Default::default()
        };
        let associate = associate_from_legacy(&row, ObjectId::new(), refs(""), FeeRef::none());
        assert_eq!(associate.service_fee_id, nil_id());
        assert!(associate.service_fee_name.is_empty());
        assert_eq!(associate.service_fee_percentage, 0.0);
    }

    #[test]
    fn test_away_log_tri_state() {
        let row = LegacyAwayLog {
            id: 1,
            until_further_notice: None,
            was_deleted: true,
            ..Default::default()
        };
        let log = away_log_from_legacy(&row, Audit::default());
        assert_eq!(log.until_further_notice, UntilFurtherNotice::Unspecified);
        assert_eq!(log.status, Status::Archived);
    }

    #[test]
    fn test_associate_status() {
        let mut row = LegacyAssociateStatus {
            id: 1,
            state: Some("active".into()),
            is_archived: false,
            owner_is_active: Some(true),
            owner_last_login: None,
        };
        assert_eq!(associate_status(&row), Status::Active);
        row.owner_is_active = Some(false);
        assert_eq!(associate_status(&row), Status::Archived);
        row.owner_is_active = None;
        assert_eq!(associate_status(&row), Status::Active);
        row.is_archived = true;
        assert_eq!(associate_status(&row), Status::Archived);
    }
}
