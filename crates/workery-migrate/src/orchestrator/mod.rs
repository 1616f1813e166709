//! Migration orchestrator - connects the stores and runs one step.

mod step;

pub use step::Step;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Config;
use crate::error::{MigrateError, Result};
use crate::hotfix::{self, LegacyIdentity};
use crate::model::{Associate, Customer, Staff, Tenant};
use crate::objects::{ObjectStore, S3ObjectStore};
use crate::password;
use crate::source::{self, LegacyPool};
use crate::store::{DocumentStore, MongoStore};
use crate::translate::{self, attachment, order, principal, reference, tenant};

/// File written by `hotfix03`.
pub const ATTACHMENTS_CSV: &str = "attachments.csv";

/// Migration orchestrator.
pub struct Orchestrator {
    config: Config,
    source: Option<LegacyPool>,
    store: MongoStore,
    legacy_objects: Option<S3ObjectStore>,
    objects: Option<S3ObjectStore>,
}

/// Result of one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// Subcommand name.
    pub step: String,

    /// Records inserted, updated, deleted or written by the step.
    pub records: usize,

    /// When the step started.
    pub started_at: DateTime<Utc>,

    /// When the step completed.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,
}

impl StepResult {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MigrateError::Config(format!("serializing result: {}", e)))
    }
}

impl Orchestrator {
    /// Open the connections `step` needs. The document store is always opened.
    pub async fn new(config: Config, step: Step) -> Result<Self> {
        let source = if step.needs_source() {
            Some(LegacyPool::new(&config.source).await?)
        } else {
            None
        };
        let store = MongoStore::connect(&config.target).await?;
        let legacy_objects = if step.needs_legacy_objects() {
            Some(S3ObjectStore::new(config.require_legacy_objects()?))
        } else {
            None
        };
        let objects = if step.needs_objects() {
            Some(S3ObjectStore::new(config.require_objects()?))
        } else {
            None
        };

        Ok(Self {
            config,
            source,
            store,
            legacy_objects,
            objects,
        })
    }

    /// Connect to the document store only, for utilities like `change_password`.
    pub async fn target_only(config: Config) -> Result<Self> {
        let store = MongoStore::connect(&config.target).await?;
        Ok(Self {
            config,
            source: None,
            store,
            legacy_objects: None,
            objects: None,
        })
    }

    fn source(&self) -> Result<&LegacyPool> {
        self.source
            .as_ref()
            .ok_or_else(|| MigrateError::Config("legacy database is not connected".to_string()))
    }

    fn legacy_objects(&self) -> Result<&dyn ObjectStore> {
        self.legacy_objects
            .as_ref()
            .map(|s| s as &dyn ObjectStore)
            .ok_or_else(|| MigrateError::Config("legacy object store is not configured".to_string()))
    }

    fn objects(&self) -> Result<&dyn ObjectStore> {
        self.objects
            .as_ref()
            .map(|s| s as &dyn ObjectStore)
            .ok_or_else(|| MigrateError::Config("object store is not configured".to_string()))
    }

    /// The tenant every tenant-owned document belongs to.
    async fn tenant(&self) -> Result<Tenant> {
        translate::resolve_tenant(&self.store, &self.config.source.london_schema).await
    }

    /// Run one step to completion.
    pub async fn run(&self, step: Step) -> Result<StepResult> {
        let started_at = Utc::now();
        info!("Starting step: {}", step);

        let records = self.dispatch(step).await?;

        let completed_at = Utc::now();
        let duration_seconds = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;
        info!(
            "Step {} completed: {} records in {:.2}s",
            step, records, duration_seconds
        );

        Ok(StepResult {
            step: step.name().to_string(),
            records,
            started_at,
            completed_at,
            duration_seconds,
        })
    }

    async fn dispatch(&self, step: Step) -> Result<usize> {
        let store: &dyn DocumentStore = &self.store;

        // Steps that never touch the tenant-owned data.
        match step {
            Step::ImportTenant => {
                let pool = self.source()?;
                let rows = source::read_tenants(pool, pool.public_schema()).await?;
                return tenant::import_tenants(store, &rows).await;
            }
            Step::Hotfix04 => {
                return hotfix::mirror_legacy_objects(self.legacy_objects()?, &self.config.staging_dir)
                    .await;
            }
            _ => {}
        }

        let t = self.tenant().await?;
        let t = &t;
        match step {
            Step::ImportTenant | Step::Hotfix04 => Ok(0),
            Step::ImportUser => {
                let pool = self.source()?;
                let rows = source::read_users(pool, pool.public_schema()).await?;
                tenant::import_users(store, t, &rows).await
            }
            Step::ImportUserRole => {
                let pool = self.source()?;
                let rows = source::read_user_groups(pool, pool.public_schema()).await?;
                tenant::import_user_roles(store, t, &rows).await
            }
            Step::ImportHowHearAboutUsItem => {
                let pool = self.source()?;
                let rows = source::read_how_hear_items(pool, pool.london_schema()).await?;
                reference::import_how_hear_items(store, t, &rows).await
            }
            Step::ImportTag => {
                let pool = self.source()?;
                let rows = source::read_tags(pool, pool.london_schema()).await?;
                reference::import_tags(store, t, &rows).await
            }
            Step::ImportVehicleType => {
                let pool = self.source()?;
                let rows = source::read_vehicle_types(pool, pool.london_schema()).await?;
                reference::import_vehicle_types(store, t, &rows).await
            }
            Step::ImportInsuranceRequirement => {
                let pool = self.source()?;
                let rows = source::read_insurance_requirements(pool, pool.london_schema()).await?;
                reference::import_insurance_requirements(store, t, &rows).await
            }
            Step::ImportSkillSet => {
                let pool = self.source()?;
                let rows = source::read_skill_sets(pool, pool.london_schema()).await?;
                reference::import_skill_sets(store, t, &rows).await
            }
            Step::ImportSkillSetInsuranceRequirement => {
                let pool = self.source()?;
                let rows =
                    source::read_skill_set_insurance_requirements(pool, pool.london_schema())
                        .await?;
                reference::import_skill_set_insurance_requirements(store, t, &rows).await
            }
            Step::ImportServiceFee => {
                let pool = self.source()?;
                let rows = source::read_service_fees(pool, pool.london_schema()).await?;
                reference::import_service_fees(store, t, &rows).await
            }
            Step::ImportBulletins => {
                let pool = self.source()?;
                let rows = source::read_bulletins(pool, pool.london_schema()).await?;
                reference::import_bulletins(store, t, &rows).await
            }
            Step::ImportComment => {
                let pool = self.source()?;
                let rows = source::read_comments(pool, pool.london_schema()).await?;
                reference::import_comments(store, t, &rows).await
            }
            Step::ImportCustomer => {
                let pool = self.source()?;
                let rows = source::read_customers(pool, pool.london_schema()).await?;
                principal::import_customers(store, t, &rows).await
            }
            Step::ImportCustomerComment => {
                let pool = self.source()?;
                let rows = source::read_customer_comments(pool, pool.london_schema()).await?;
                principal::import_customer_comments(store, t, &rows).await
            }
            Step::ImportCustomerTag => {
                let pool = self.source()?;
                let rows = source::read_customer_tags(pool, pool.london_schema()).await?;
                principal::import_customer_tags(store, t, &rows).await
            }
            Step::ImportAssociate => {
                let pool = self.source()?;
                let rows = source::read_associates(pool, pool.london_schema()).await?;
                principal::import_associates(store, t, &rows).await
            }
            Step::ImportAssociateComment => {
                let pool = self.source()?;
                let rows = source::read_associate_comments(pool, pool.london_schema()).await?;
                principal::import_associate_comments(store, t, &rows).await
            }
            Step::ImportAssociateTag => {
                let pool = self.source()?;
                let rows = source::read_associate_tags(pool, pool.london_schema()).await?;
                principal::import_associate_tags(store, t, &rows).await
            }
            Step::ImportAssociateSkillSet => {
                let pool = self.source()?;
                let rows = source::read_associate_skill_sets(pool, pool.london_schema()).await?;
                principal::import_associate_skill_sets(store, t, &rows).await
            }
            Step::ImportAssociateVehicleType => {
                let pool = self.source()?;
                let rows = source::read_associate_vehicle_types(pool, pool.london_schema()).await?;
                principal::import_associate_vehicle_types(store, t, &rows).await
            }
            Step::ImportAssociateInsuranceRequirement => {
                let pool = self.source()?;
                let rows =
                    source::read_associate_insurance_requirements(pool, pool.london_schema())
                        .await?;
                principal::import_associate_insurance_requirements(store, t, &rows).await
            }
            Step::ImportAssociateAwayLog => {
                let pool = self.source()?;
                let rows = source::read_away_logs(pool, pool.london_schema()).await?;
                principal::import_associate_away_logs(store, t, &rows).await
            }
            Step::ImportAssociateStatus => {
                let pool = self.source()?;
                let rows = source::read_associate_statuses(
                    pool,
                    pool.london_schema(),
                    pool.public_schema(),
                )
                .await?;
                principal::import_associate_statuses(store, t, &rows).await
            }
            Step::ImportStaff => {
                let pool = self.source()?;
                let rows = source::read_staff(pool, pool.london_schema()).await?;
                principal::import_staff(store, t, &rows).await
            }
            Step::ImportStaffComment => {
                let pool = self.source()?;
                let rows = source::read_staff_comments(pool, pool.london_schema()).await?;
                principal::import_staff_comments(store, t, &rows).await
            }
            Step::ImportOrder => {
                let pool = self.source()?;
                let rows = source::read_orders(pool, pool.london_schema()).await?;
                order::import_orders(store, t, &rows).await
            }
            Step::ImportOrderComment => {
                let pool = self.source()?;
                let rows = source::read_order_comments(pool, pool.london_schema()).await?;
                order::import_order_comments(store, t, &rows).await
            }
            Step::ImportOrderTag => {
                let pool = self.source()?;
                let rows = source::read_order_tags(pool, pool.london_schema()).await?;
                order::import_order_tags(store, t, &rows).await
            }
            Step::ImportOrderSkillSet => {
                let pool = self.source()?;
                let rows = source::read_order_skill_sets(pool, pool.london_schema()).await?;
                order::import_order_skill_sets(store, t, &rows).await
            }
            Step::ImportOrderInvoice => {
                let pool = self.source()?;
                let rows = source::read_order_invoices(pool, pool.london_schema()).await?;
                order::import_order_invoices(store, t, &rows).await
            }
            Step::ImportOrderDeposit => {
                let pool = self.source()?;
                let rows = source::read_order_deposits(pool, pool.london_schema()).await?;
                order::import_order_deposits(store, t, &rows).await
            }
            Step::ImportTaskItem => {
                let pool = self.source()?;
                let rows = source::read_task_items(pool, pool.london_schema()).await?;
                order::import_task_items(store, t, &rows).await
            }
            Step::ImportActivitySheet => {
                let pool = self.source()?;
                let rows = source::read_activity_sheets(pool, pool.london_schema()).await?;
                order::import_activity_sheets(store, t, &rows).await
            }
            Step::ImportAttachmentDownloadToTmpDir => {
                let pool = self.source()?;
                let rows = source::read_private_files(pool, pool.london_schema()).await?;
                attachment::download_attachments(
                    store,
                    t,
                    self.legacy_objects()?,
                    &rows,
                    &self.config.staging_dir,
                )
                .await
            }
            Step::ImportAttachmentUploadFromTmpDir => {
                attachment::upload_attachments(store, t, self.objects()?).await
            }
            Step::Hotfix01 => {
                let pool = self.source()?;
                let schema = pool.london_schema();

                let rows = source::read_customers(pool, schema).await?;
                let ids: Vec<LegacyIdentity> = rows.iter().map(LegacyIdentity::from).collect();
                let mut fixed = hotfix::fix_principals::<Customer>(store, t, &ids).await?;

                let rows = source::read_associates(pool, schema).await?;
                let ids: Vec<LegacyIdentity> = rows.iter().map(LegacyIdentity::from).collect();
                fixed += hotfix::fix_principals::<Associate>(store, t, &ids).await?;

                let rows = source::read_staff(pool, schema).await?;
                let ids: Vec<LegacyIdentity> = rows.iter().map(LegacyIdentity::from).collect();
                fixed += hotfix::fix_principals::<Staff>(store, t, &ids).await?;
                Ok(fixed)
            }
            Step::Hotfix02 => hotfix::dedupe_attachments(store, t).await,
            Step::Hotfix03 => {
                hotfix::export_attachments(store, t, &PathBuf::from(ATTACHMENTS_CSV)).await
            }
            Step::Hotfix05 => hotfix::cascade_service_fees(store, t).await,
        }
    }

    /// Set the password of the user with `email`.
    pub async fn change_password(&self, email: &str, password: &str) -> Result<()> {
        password::change_password(&self.store, email, password).await
    }

    /// Release the legacy connection.
    pub fn close(&self) {
        if let Some(pool) = &self.source {
            pool.close();
        }
    }
}
