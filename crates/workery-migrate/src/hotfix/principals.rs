//! Pass 1: restore public ids and modifiers of principals, keyed by email.

use tracing::{info, warn};

use crate::error::Result;
use crate::model::{Associate, Audit, Customer, Entity, Staff, Tenant, User};
use crate::resolver::Resolver;
use crate::source::{LegacyAssociate, LegacyCustomer, LegacyPerson, LegacyStaff};
use crate::store::{DocumentStore, Repository};

use super::in_transaction;

/// What pass 1 needs from a legacy principal row.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyIdentity {
    pub legacy_id: i64,
    pub email: String,
    pub last_modified_by_id: Option<i64>,
}

impl LegacyIdentity {
    fn new(legacy_id: i64, person: &LegacyPerson) -> Self {
        Self {
            legacy_id,
            email: person.email.as_deref().unwrap_or_default().trim().to_string(),
            last_modified_by_id: person.audit.last_modified_by_id,
        }
    }
}

impl From<&LegacyCustomer> for LegacyIdentity {
    fn from(row: &LegacyCustomer) -> Self {
        Self::new(row.id, &row.person)
    }
}

impl From<&LegacyAssociate> for LegacyIdentity {
    fn from(row: &LegacyAssociate) -> Self {
        Self::new(row.id, &row.person)
    }
}

impl From<&LegacyStaff> for LegacyIdentity {
    fn from(row: &LegacyStaff) -> Self {
        Self::new(row.id, &row.person)
    }
}

/// Mutable identity fields shared by customers, associates and staff.
pub trait Principal: Entity {
    fn set_public_id(&mut self, public_id: i64);

    fn audit_mut(&mut self) -> &mut Audit;
}

macro_rules! principal {
    ($($ty:ty),*) => {$(
        impl Principal for $ty {
            fn set_public_id(&mut self, public_id: i64) {
                self.public_id = public_id;
            }

            fn audit_mut(&mut self) -> &mut Audit {
                &mut self.audit
            }
        }
    )*};
}

principal!(Customer, Associate, Staff);

/// Find each principal by email, force its public id to the legacy id and
/// refresh its modifier. Principals or modifiers that cannot be found are
/// skipped.
pub async fn fix_principals<P: Principal>(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    identities: &[LegacyIdentity],
) -> Result<usize> {
    info!("Beginning fixing {} records", P::KIND);
    let resolver = Resolver::for_tenant(store, tenant.id);
    let repo = Repository::<P>::new(store);
    let mut fixed = 0;
    for identity in identities {
        if identity.email.is_empty() {
            warn!(
                "Skipping {} with legacy ID# {}: no email",
                P::KIND,
                identity.legacy_id
            );
            continue;
        }
        let Some(mut principal) = resolver.by_email::<P>(&identity.email).await? else {
            warn!(
                "Skipping {} with legacy ID# {}: not found by email",
                P::KIND,
                identity.legacy_id
            );
            continue;
        };

        in_transaction(store, async {
            principal.set_public_id(identity.legacy_id);
            match resolver.legacy::<User>(identity.last_modified_by_id).await? {
                Some(user) => {
                    let audit = principal.audit_mut();
                    audit.modified_by_user_id = user.id;
                    audit.modified_by_user_name = user.name;
                }
                None => warn!(
                    "No modifier found for {} ID# {}",
                    P::KIND,
                    principal.id()
                ),
            }
            repo.replace(&principal).await
        })
        .await?;

        fixed += 1;
        info!("Fixed {} ID# {}", P::KIND, principal.id());
    }
    info!("Finished fixing {} records", P::KIND);
    Ok(fixed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_trims_email() {
        let row = LegacyCustomer {
            id: 33,
            person: LegacyPerson {
                email: Some(" bo@example.com ".into()),
                audit: crate::source::LegacyAudit {
                    last_modified_by_id: Some(7),
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        };
        let identity = LegacyIdentity::from(&row);
        assert_eq!(identity.email, "bo@example.com");
        assert_eq!(identity.legacy_id, 33);
        assert_eq!(identity.last_modified_by_id, Some(7));
    }
}
