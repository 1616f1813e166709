//! Pass 3: cascade each associate's service fee onto its orders and task items.

use bson::doc;
use tracing::{debug, info};

use crate::error::Result;
use crate::model::{is_nil, Associate, Entity, Order, TaskItem, Tenant};
use crate::store::{DocumentStore, Repository};

use super::in_transaction;

/// Documents carrying the denormalized `invoice_service_fee_*` triple.
pub trait FeeHolder: Entity {
    fn copy_fee_from(&mut self, associate: &Associate);
}

impl FeeHolder for Order {
    fn copy_fee_from(&mut self, associate: &Associate) {
        self.invoice_service_fee_id = associate.service_fee_id;
        self.invoice_service_fee_name = associate.service_fee_name.clone();
        self.invoice_service_fee_percentage = associate.service_fee_percentage;
    }
}

impl FeeHolder for TaskItem {
    fn copy_fee_from(&mut self, associate: &Associate) {
        self.invoice_service_fee_id = associate.service_fee_id;
        self.invoice_service_fee_name = associate.service_fee_name.clone();
        self.invoice_service_fee_percentage = associate.service_fee_percentage;
    }
}

async fn cascade<T: FeeHolder>(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    associate: &Associate,
) -> Result<usize> {
    let repo = Repository::<T>::new(store);
    let holders = repo
        .find(doc! { "tenant_id": tenant.id, "associate_id": associate.id })
        .await?;
    let count = holders.len();
    for mut holder in holders {
        holder.copy_fee_from(associate);
        repo.replace(&holder).await?;
        debug!("Updated fee of {} ID# {}", T::KIND, holder.id());
    }
    Ok(count)
}

/// Associates without a service fee are skipped.
pub async fn cascade_service_fees(store: &dyn DocumentStore, tenant: &Tenant) -> Result<usize> {
    info!("Beginning cascading service fees");
    let associates = Repository::<Associate>::new(store)
        .find(doc! { "tenant_id": tenant.id })
        .await?;
    let mut updated = 0;
    for associate in &associates {
        if is_nil(&associate.service_fee_id) {
            continue;
        }
        let (orders, tasks) = in_transaction(store, async {
            let orders = cascade::<Order>(store, tenant, associate).await?;
            let tasks = cascade::<TaskItem>(store, tenant, associate).await?;
            Ok((orders, tasks))
        })
        .await?;
        updated += orders + tasks;
        info!(
            "Cascaded service fee of Associate ID# {} to {} orders and {} task items",
            associate.id, orders, tasks
        );
    }
    info!("Finished cascading service fees");
    Ok(updated)
}
