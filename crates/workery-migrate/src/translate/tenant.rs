//! Tenants, users and user roles.

use bson::oid::ObjectId;
use tracing::{info, warn};

use crate::error::Result;
use crate::model::{Audit, Status, Tenant, User, UserRole, UserStatus, DEFAULT_TIMEZONE};
use crate::resolver::Resolver;
use crate::source::{LegacyTenant, LegacyUser, LegacyUserGroup};
use crate::store::{DocumentStore, Repository};

use super::compose::{self, text};

pub fn tenant_from_legacy(row: &LegacyTenant) -> Tenant {
    let timezone = text(&row.timezone_name);
    Tenant {
        id: ObjectId::new(),
        public_id: row.id,
        schema_name: row.schema_name.clone(),
        name: text(&row.name),
        alternate_name: text(&row.alternate_name),
        description: text(&row.description),
        url: text(&row.url),
        timezone: if timezone.is_empty() {
            DEFAULT_TIMEZONE.to_string()
        } else {
            timezone
        },
        status: Status::from_archived(row.is_archived),
        address: compose::address(&row.address),
        audit: Audit {
            created_at: compose::datetime(row.created_at),
            modified_at: compose::datetime(row.last_modified_at),
            ..Audit::default()
        },
    }
}

pub async fn import_tenants(store: &dyn DocumentStore, rows: &[LegacyTenant]) -> Result<usize> {
    info!("Beginning importing tenants");
    let repo = Repository::<Tenant>::new(store);
    for row in rows {
        let tenant = tenant_from_legacy(row);
        repo.insert(&tenant).await?;
        info!("Imported Tenant ID# {}", tenant.id);
    }
    info!("Finished importing tenants");
    Ok(rows.len())
}

pub fn user_from_legacy(row: &LegacyUser, tenant: &Tenant) -> User {
    let first_name = text(&row.first_name);
    let last_name = text(&row.last_name);
    let timezone = text(&row.timezone);
    User {
        id: ObjectId::new(),
        tenant_id: tenant.id,
        public_id: row.id,
        email: text(&row.email),
        name: compose::full_name(&first_name, &last_name),
        lexical_name: compose::lexical_name(&first_name, &last_name),
        first_name,
        last_name,
        role: None,
        status: if row.is_active {
            UserStatus::Active
        } else {
            UserStatus::Inactive
        },
        timezone: if timezone.is_empty() {
            tenant.timezone.clone()
        } else {
            timezone
        },
        joined_at: compose::datetime(row.date_joined),
        last_login_at: compose::datetime(row.last_login),
        was_email_verified: row.was_email_activated,
        password_hash: String::new(),
        audit: Audit {
            created_at: compose::datetime(row.date_joined),
            ..Audit::default()
        },
    }
}

pub async fn import_users(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    rows: &[LegacyUser],
) -> Result<usize> {
    info!("Beginning importing users");
    let repo = Repository::<User>::new(store);
    for row in rows {
        let user = user_from_legacy(row, tenant);
        repo.insert(&user).await?;
        info!("Imported User ID# {}", user.id);
    }
    info!("Finished importing users");
    Ok(rows.len())
}

/// Assign each user the role of its legacy group. Unknown users and groups
/// are skipped.
pub async fn import_user_roles(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    links: &[LegacyUserGroup],
) -> Result<usize> {
    info!("Beginning importing user roles");
    let resolver = Resolver::for_tenant(store, tenant.id);
    let repo = Repository::<User>::new(store);
    let mut applied = 0;
    for LegacyUserGroup(link) in links {
        let Some(mut user) = resolver.legacy::<User>(Some(link.owner_id)).await? else {
            warn!("Skipping role for missing user with legacy ID# {}", link.owner_id);
            continue;
        };
        let Some(role) = UserRole::from_group_id(link.member_id) else {
            warn!(
                "Skipping unknown group {} for User ID# {}",
                link.member_id, user.id
            );
            continue;
        };
        user.role = Some(role);
        repo.replace(&user).await?;
        applied += 1;
        info!("Imported User Role {:?} for User ID# {}", role, user.id);
    }
    info!("Finished importing user roles");
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_tenant() -> LegacyTenant {
        LegacyTenant {
            id: 1,
            schema_name: "london".into(),
            name: Some("Over 55 (London) Inc.".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_tenant_defaults_timezone() {
        let tenant = tenant_from_legacy(&legacy_tenant());
        assert_eq!(tenant.timezone, "America/Toronto");
        assert_eq!(tenant.schema_name, "london");
        assert_eq!(tenant.public_id, 1);
        assert_eq!(tenant.status, Status::Active);
    }

    #[test]
    fn test_archived_tenant() {
        let row = LegacyTenant {
            is_archived: true,
            ..legacy_tenant()
        };
        assert_eq!(tenant_from_legacy(&row).status, Status::Archived);
    }

    #[test]
    fn test_user_names() {
        let tenant = tenant_from_legacy(&legacy_tenant());
        let row = LegacyUser {
            id: 7,
            first_name: Some("Ann".into()),
            last_name: Some("Lee".into()),
            email: Some("ann@example.com".into()),
            is_active: true,
            ..Default::default()
        };
        let user = user_from_legacy(&row, &tenant);
        assert_eq!(user.name, "Ann Lee");
        assert_eq!(user.lexical_name, "Lee, Ann");
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.tenant_id, tenant.id);
        assert_eq!(user.timezone, "America/Toronto");
        assert!(user.password_hash.is_empty());
    }
}
