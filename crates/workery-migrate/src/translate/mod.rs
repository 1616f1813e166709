//! Entity translators.
//!
//! Each translator pairs a pure `<entity>_from_legacy` function with an
//! async `import_<entity>` loop. The loop resolves references through the
//! [`Resolver`], calls the pure function, persists the result and logs one
//! progress line per row. Rows are processed strictly in the order given.

pub mod attachment;
pub mod compose;
pub mod order;
pub mod principal;
pub mod reference;
pub mod tenant;

use bson::oid::ObjectId;
use tracing::{debug, info, warn};

use crate::error::{MigrateError, Result};
use crate::model::{nil_id, Audit, Entity, HowHearAboutUsItem, Tenant, User};
use crate::resolver::Resolver;
use crate::source::{LegacyAudit, LegacyLink};
use crate::store::{DocumentStore, Repository};

use compose::text;

/// Legacy how-heard id meaning "other, see free text".
pub const HOW_HEAR_OTHER_ID: i64 = 1;

/// Look up the tenant being migrated. Its absence is fatal.
pub async fn resolve_tenant(store: &dyn DocumentStore, schema_name: &str) -> Result<Tenant> {
    Resolver::new(store)
        .tenant_by_schema_name(schema_name)
        .await?
        .ok_or_else(|| MigrateError::TenantNotFound {
            schema_name: schema_name.to_string(),
        })
}

/// A resolved user reference: nil id and empty name when unresolved.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRef {
    pub id: ObjectId,
    pub name: String,
}

impl UserRef {
    pub fn none() -> Self {
        Self {
            id: nil_id(),
            name: String::new(),
        }
    }
}

impl From<&User> for UserRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
        }
    }
}

/// Resolve a legacy user id. A missing user is not an error.
pub async fn resolve_user(resolver: &Resolver<'_>, legacy_id: Option<i64>) -> Result<UserRef> {
    match resolver.legacy::<User>(legacy_id).await? {
        Some(user) => Ok(UserRef::from(&user)),
        None => {
            if let Some(id) = legacy_id.filter(|id| *id != 0) {
                debug!("Audit user with legacy ID# {} not found, leaving empty", id);
            }
            Ok(UserRef::none())
        }
    }
}

/// Build an audit block from explicit user references.
pub fn audit_from_legacy(legacy: &LegacyAudit, created_by: UserRef, modified_by: UserRef) -> Audit {
    Audit {
        created_at: compose::datetime(legacy.created_at),
        created_by_user_id: created_by.id,
        created_by_user_name: created_by.name,
        created_from_ip_address: text(&legacy.created_from),
        modified_at: compose::datetime(legacy.last_modified_at),
        modified_by_user_id: modified_by.id,
        modified_by_user_name: modified_by.name,
        modified_from_ip_address: text(&legacy.last_modified_from),
    }
}

/// Resolve both audit users and build the audit block.
pub async fn resolve_audit(resolver: &Resolver<'_>, legacy: &LegacyAudit) -> Result<Audit> {
    let created_by = resolve_user(resolver, legacy.created_by_id).await?;
    let modified_by = resolve_user(resolver, legacy.last_modified_by_id).await?;
    Ok(audit_from_legacy(legacy, created_by, modified_by))
}

/// Denormalized how-heard reference of a principal.
#[derive(Debug, Clone, PartialEq)]
pub struct HowHearRef {
    pub id: ObjectId,
    pub text: String,
    pub is_other: bool,
}

impl HowHearRef {
    pub fn none() -> Self {
        Self {
            id: nil_id(),
            text: String::new(),
            is_other: false,
        }
    }
}

/// Resolve a principal's how-heard reference.
///
/// The "other" item copies the free text (or `"-"`) and tolerates a missing
/// item; any other nonzero id must resolve.
pub async fn resolve_how_hear(
    resolver: &Resolver<'_>,
    legacy_id: Option<i64>,
    other: &Option<String>,
) -> Result<HowHearRef> {
    let item = resolver.legacy::<HowHearAboutUsItem>(legacy_id).await?;
    match legacy_id {
        None | Some(0) => Ok(HowHearRef::none()),
        Some(HOW_HEAR_OTHER_ID) => {
            let other = text(other);
            Ok(HowHearRef {
                id: item.map_or_else(nil_id, |i| i.id),
                text: if other.is_empty() { "-".to_string() } else { other },
                is_other: true,
            })
        }
        Some(id) => {
            let item = item.ok_or_else(|| MigrateError::not_found(HowHearAboutUsItem::KIND, id))?;
            Ok(HowHearRef {
                id: item.id,
                text: item.text,
                is_other: false,
            })
        }
    }
}

/// Embed join-table members into their parents.
///
/// For each link the parent `P` must exist; a missing member `M` is skipped
/// with a warning. `attach` appends the member to the parent's embedded
/// collection and the parent is replaced in place.
pub async fn import_links<L, P, M>(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    links: &[L],
    label: &str,
    link_of: impl Fn(&L) -> LegacyLink,
    attach: impl Fn(&mut P, M),
) -> Result<usize>
where
    P: Entity,
    M: Entity,
{
    info!("Beginning importing {}", label);
    let resolver = Resolver::for_tenant(store, tenant.id);
    let parents = Repository::<P>::new(store);
    let mut attached = 0;
    for link in links.iter().map(&link_of) {
        let mut parent = resolver
            .legacy::<P>(Some(link.owner_id))
            .await?
            .ok_or_else(|| MigrateError::not_found(P::KIND, link.owner_id))?;
        let Some(member) = resolver.legacy::<M>(Some(link.member_id)).await? else {
            warn!(
                "Skipping {} with legacy ID# {} for {} ID# {}: not found",
                M::KIND,
                link.member_id,
                P::KIND,
                parent.id()
            );
            continue;
        };
        let member_id = member.id();
        attach(&mut parent, member);
        parents.replace(&parent).await?;
        attached += 1;
        info!(
            "Imported {} ID# {} for {} ID# {}",
            M::KIND,
            member_id,
            P::KIND,
            parent.id()
        );
    }
    info!("Finished importing {}", label);
    Ok(attached)
}
