//! Work orders, their join tables, task items and activity sheets.

use bson::oid::ObjectId;
use tracing::info;

use crate::error::{MigrateError, Result};
use crate::model::{
    nil_id, ActivitySheet, ActivitySheetStatus, Associate, Audit, Comment, CommentBelongsTo,
    Customer, Entity, Order, OrderDeposit, OrderInvoice, OrderStatus, PartySnapshot, ServiceFee,
    SkillSet, Status, Tag, TaskItem, Tenant,
};
use crate::resolver::Resolver;
use crate::source::{
    LegacyActivitySheet, LegacyOrder, LegacyOrderComment, LegacyOrderDeposit, LegacyOrderInvoice,
    LegacyOrderSkillSet, LegacyOrderTag, LegacyTaskItem,
};
use crate::store::{DocumentStore, Repository};

use super::compose::{self, text};
use super::principal::{import_owned_comments, CommentOwner, FeeRef};
use super::resolve_audit;

/// Parties and fee resolved for one legacy order.
#[derive(Debug, Clone)]
pub struct OrderRefs {
    pub customer: Customer,
    pub associate: Option<Associate>,
    pub fee: FeeRef,
    pub audit: Audit,
}

pub fn order_from_legacy(row: &LegacyOrder, tenant_id: ObjectId, refs: OrderRefs) -> Order {
    Order {
        id: ObjectId::new(),
        tenant_id,
        public_id: row.id,
        customer_id: refs.customer.id,
        customer: PartySnapshot::from(&refs.customer),
        associate_id: refs.associate.as_ref().map_or_else(nil_id, |a| a.id),
        associate: refs.associate.as_ref().map(PartySnapshot::from),
        description: text(&row.description),
        assignment_date: compose::date(row.assignment_date),
        is_ongoing: row.is_ongoing,
        is_home_support_service: row.is_home_support_service,
        start_date: compose::date(row.start_date),
        completion_date: compose::date(row.completion_date),
        hours: row.hours.unwrap_or_default(),
        type_of: row.type_of.unwrap_or_default(),
        status: OrderStatus::from_label(row.state.as_deref()),
        closing_reason: row.closing_reason.unwrap_or_default(),
        closing_reason_other: text(&row.closing_reason_other),
        visits: row.visits.unwrap_or_default(),
        invoice_date: compose::date(row.invoice_date),
        invoice_quote_amount: row.invoice_quote_amount.unwrap_or_default(),
        invoice_labour_amount: row.invoice_labour_amount.unwrap_or_default(),
        invoice_material_amount: row.invoice_material_amount.unwrap_or_default(),
        invoice_tax_amount: row.invoice_tax_amount.unwrap_or_default(),
        invoice_total_amount: row.invoice_total_amount.unwrap_or_default(),
        invoice_service_fee_amount: row.invoice_service_fee_amount.unwrap_or_default(),
        invoice_service_fee_payment_date: compose::date(row.invoice_service_fee_payment_date),
        invoice_actual_service_fee_amount_paid: row
            .invoice_actual_service_fee_amount_paid
            .unwrap_or_default(),
        invoice_balance_owing_amount: row.invoice_balance_owing_amount.unwrap_or_default(),
        invoice_service_fee_id: refs.fee.id,
        invoice_service_fee_name: refs.fee.name,
        invoice_service_fee_percentage: refs.fee.percentage,
        latest_pending_task_id: nil_id(),
        latest_pending_task_title: String::new(),
        latest_pending_task_description: String::new(),
        latest_pending_task_due_date: None,
        latest_pending_task_type: 0,
        tags: Vec::new(),
        skill_sets: Vec::new(),
        comments: Vec::new(),
        deposits: Vec::new(),
        invoices: Vec::new(),
        audit: refs.audit,
    }
}

/// Load the order owning a child row. Its absence is fatal.
async fn parent_order(resolver: &Resolver<'_>, legacy_id: Option<i64>) -> Result<Order> {
    resolver
        .legacy::<Order>(legacy_id)
        .await?
        .ok_or_else(|| MigrateError::not_found(Order::KIND, legacy_id.unwrap_or_default()))
}

/// Load an optional associate. A nonzero legacy id declares it present, so
/// its absence is fatal.
async fn declared_associate(
    resolver: &Resolver<'_>,
    legacy_id: Option<i64>,
) -> Result<Option<Associate>> {
    match (resolver.legacy::<Associate>(legacy_id).await?, legacy_id) {
        (Some(associate), _) => Ok(Some(associate)),
        (None, Some(id)) if id != 0 => Err(MigrateError::not_found(Associate::KIND, id)),
        (None, _) => Ok(None),
    }
}

pub async fn import_orders(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    rows: &[LegacyOrder],
) -> Result<usize> {
    info!("Beginning importing orders");
    let resolver = Resolver::for_tenant(store, tenant.id);
    let repo = Repository::<Order>::new(store);
    for row in rows {
        let customer = resolver
            .legacy::<Customer>(row.customer_id)
            .await?
            .ok_or_else(|| {
                MigrateError::not_found(Customer::KIND, row.customer_id.unwrap_or_default())
            })?;
        let associate = declared_associate(&resolver, row.associate_id).await?;
        let fee = match resolver.legacy::<ServiceFee>(row.invoice_service_fee_id).await? {
            Some(fee) => FeeRef::from(&fee),
            None => FeeRef::none(),
        };
        let refs = OrderRefs {
            customer,
            associate,
            fee,
            audit: resolve_audit(&resolver, &row.audit).await?,
        };
        let order = order_from_legacy(row, tenant.id, refs);
        repo.insert(&order).await?;
        info!("Imported Order ID# {}", order.id);
    }
    info!("Finished importing orders");
    Ok(rows.len())
}

impl CommentOwner for Order {
    const BELONGS_TO: CommentBelongsTo = CommentBelongsTo::Order;

    fn claim(&self, comment: &mut Comment) {
        comment.order_id = self.id;
    }

    fn comments_mut(&mut self) -> &mut Vec<Comment> {
        &mut self.comments
    }
}

pub async fn import_order_comments(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    links: &[LegacyOrderComment],
) -> Result<usize> {
    import_owned_comments::<_, Order>(store, tenant, links, "order comments", |l| l.0).await
}

pub async fn import_order_tags(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    links: &[LegacyOrderTag],
) -> Result<usize> {
    super::import_links(store, tenant, links, "order tags", |l| l.0, |o: &mut Order, t: Tag| {
        o.tags.push(t)
    })
    .await
}

pub async fn import_order_skill_sets(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    links: &[LegacyOrderSkillSet],
) -> Result<usize> {
    super::import_links(
        store,
        tenant,
        links,
        "order skill sets",
        |l| l.0,
        |o: &mut Order, s: SkillSet| o.skill_sets.push(s),
    )
    .await
}

pub fn order_invoice_from_legacy(row: &LegacyOrderInvoice, audit: Audit) -> OrderInvoice {
    OrderInvoice {
        id: ObjectId::new(),
        public_id: row.id,
        invoice_id: text(&row.invoice_id),
        invoice_date: compose::date(row.invoice_date),
        associate_name: text(&row.associate_name),
        associate_telephone: text(&row.associate_telephone),
        client_name: text(&row.client_name),
        client_address: text(&row.client_address),
        client_telephone: text(&row.client_telephone),
        client_email: text(&row.client_email),
        sub_total_amount: row.sub_total_amount.unwrap_or_default(),
        tax_amount: row.tax_amount.unwrap_or_default(),
        total_amount: row.total_amount.unwrap_or_default(),
        deposit_amount: row.deposit_amount.unwrap_or_default(),
        amount_due: row.amount_due.unwrap_or_default(),
        payment_amount: row.payment_amount.unwrap_or_default(),
        payment_date: compose::date(row.payment_date),
        is_cash: row.is_cash,
        is_cheque: row.is_cheque,
        is_debit: row.is_debit,
        is_credit: row.is_credit,
        is_other: row.is_other,
        client_signature: text(&row.client_signature),
        associate_sign_date: compose::date(row.associate_sign_date),
        associate_signature: text(&row.associate_signature),
        audit,
    }
}

pub async fn import_order_invoices(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    rows: &[LegacyOrderInvoice],
) -> Result<usize> {
    info!("Beginning importing order invoices");
    let resolver = Resolver::for_tenant(store, tenant.id);
    let repo = Repository::<Order>::new(store);
    for row in rows {
        let mut order = parent_order(&resolver, row.order_id).await?;
        let audit = resolve_audit(&resolver, &row.audit).await?;
        let invoice = order_invoice_from_legacy(row, audit);
        let invoice_id = invoice.id;
        order.invoices.push(invoice);
        repo.replace(&order).await?;
        info!("Imported Order Invoice ID# {} for Order ID# {}", invoice_id, order.id);
    }
    info!("Finished importing order invoices");
    Ok(rows.len())
}

pub fn order_deposit_from_legacy(row: &LegacyOrderDeposit, audit: Audit) -> OrderDeposit {
    OrderDeposit {
        id: ObjectId::new(),
        public_id: row.id,
        paid_at: compose::date(row.paid_at),
        deposit_method: row.deposit_method.unwrap_or_default(),
        paid_to: row.paid_to.unwrap_or_default(),
        paid_for: row.paid_for.unwrap_or_default(),
        amount: row.amount.unwrap_or_default(),
        status: Status::from_archived(row.is_archived),
        audit,
    }
}

pub async fn import_order_deposits(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    rows: &[LegacyOrderDeposit],
) -> Result<usize> {
    info!("Beginning importing order deposits");
    let resolver = Resolver::for_tenant(store, tenant.id);
    let repo = Repository::<Order>::new(store);
    for row in rows {
        let mut order = parent_order(&resolver, row.order_id).await?;
        let audit = resolve_audit(&resolver, &row.audit).await?;
        let deposit = order_deposit_from_legacy(row, audit);
        let deposit_id = deposit.id;
        order.deposits.push(deposit);
        repo.replace(&order).await?;
        info!("Imported Order Deposit ID# {} for Order ID# {}", deposit_id, order.id);
    }
    info!("Finished importing order deposits");
    Ok(rows.len())
}

/// Task items inherit the parties, tags, skill sets and fee of their order.
pub fn task_item_from_legacy(row: &LegacyTaskItem, order: &Order, audit: Audit) -> TaskItem {
    TaskItem {
        id: ObjectId::new(),
        tenant_id: order.tenant_id,
        public_id: row.id,
        order_id: order.id,
        type_of: row.type_of.unwrap_or_default(),
        title: text(&row.title),
        description: text(&row.description),
        due_date: compose::date(row.due_date),
        is_closed: row.is_closed,
        was_postponed: row.was_postponed,
        closing_reason: row.closing_reason.unwrap_or_default(),
        closing_reason_other: text(&row.closing_reason_other),
        status: Status::from_archived(row.is_closed),
        customer_id: order.customer_id,
        customer: order.customer.clone(),
        associate_id: order.associate_id,
        associate: order.associate.clone(),
        order_tags: order.tags.clone(),
        order_skill_sets: order.skill_sets.clone(),
        invoice_service_fee_id: order.invoice_service_fee_id,
        invoice_service_fee_name: order.invoice_service_fee_name.clone(),
        invoice_service_fee_percentage: order.invoice_service_fee_percentage,
        audit,
    }
}

/// Point the order's latest pending task at `task`.
pub fn set_latest_pending_task(order: &mut Order, task: &TaskItem) {
    order.latest_pending_task_id = task.id;
    order.latest_pending_task_title = task.title.clone();
    order.latest_pending_task_description = task.description.clone();
    order.latest_pending_task_due_date = task.due_date;
    order.latest_pending_task_type = task.type_of;
}

pub async fn import_task_items(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    rows: &[LegacyTaskItem],
) -> Result<usize> {
    info!("Beginning importing task items");
    let resolver = Resolver::for_tenant(store, tenant.id);
    let tasks = Repository::<TaskItem>::new(store);
    let orders = Repository::<Order>::new(store);
    for row in rows {
        let mut order = parent_order(&resolver, row.job_id).await?;
        let audit = resolve_audit(&resolver, &row.audit).await?;
        let task = task_item_from_legacy(row, &order, audit);
        tasks.insert(&task).await?;

        if !task.is_closed {
            set_latest_pending_task(&mut order, &task);
            orders.replace(&order).await?;
        }
        info!("Imported TaskItem ID# {} for Order ID# {}", task.id, order.id);
    }
    info!("Finished importing task items");
    Ok(rows.len())
}

pub fn activity_sheet_from_legacy(
    row: &LegacyActivitySheet,
    order: &Order,
    associate: Option<&Associate>,
    audit: Audit,
) -> ActivitySheet {
    ActivitySheet {
        id: ObjectId::new(),
        tenant_id: order.tenant_id,
        public_id: row.id,
        order_id: order.id,
        associate_id: associate.map_or_else(nil_id, |a| a.id),
        associate_name: associate.map(|a| a.name.clone()).unwrap_or_default(),
        comment: text(&row.comment),
        status: ActivitySheetStatus::from_label(row.state.as_deref()),
        audit,
    }
}

pub async fn import_activity_sheets(
    store: &dyn DocumentStore,
    tenant: &Tenant,
    rows: &[LegacyActivitySheet],
) -> Result<usize> {
    info!("Beginning importing activity sheets");
    let resolver = Resolver::for_tenant(store, tenant.id);
    let repo = Repository::<ActivitySheet>::new(store);
    for row in rows {
        let order = parent_order(&resolver, row.job_id).await?;
        let associate = declared_associate(&resolver, row.associate_id).await?;
        let audit = resolve_audit(&resolver, &row.audit).await?;
        let sheet = activity_sheet_from_legacy(row, &order, associate.as_ref(), audit);
        repo.insert(&sheet).await?;
        info!("Imported ActivitySheet ID# {}", sheet.id);
    }
    info!("Finished importing activity sheets");
    Ok(rows.len())
}
