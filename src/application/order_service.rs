use std::sync::Arc;

use uuid::Uuid;

use crate::domain::catalog::ServiceView;
use crate::domain::customer::{normalize_email, CustomerView};
use crate::domain::errors::DomainError;
use crate::domain::order::{
    OrderChanges, OrderFilter, OrderStats, OrderView, PlaceOrder, PlacedOrder, QrPayload,
};
use crate::domain::paging::{ListResult, Page};
use crate::domain::ports::{CatalogRepository, OrderRepository};
use crate::domain::status::{OrderStatus, Transition};

/// Dashboard summary built from the order statistics and service usage.
#[derive(Debug, Clone)]
pub struct Analytics {
    pub stats: OrderStats,
    pub top_services: Vec<ServiceView>,
}

pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

impl OrderService {
    pub const TOP_SERVICES: usize = 5;

    pub fn new(repo: Arc<dyn OrderRepository>, catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { repo, catalog }
    }

    pub fn place_order(&self, mut order: PlaceOrder) -> Result<PlacedOrder, DomainError> {
        order.validate()?;
        order.customer_email = normalize_email(&order.customer_email);
        let placed = self.repo.place(order)?;
        log::info!(
            "Placed order {} for {} ({} items, total {})",
            placed.order.order_number,
            placed.customer.email,
            placed.order.items.len(),
            placed.order.total_amount
        );
        Ok(placed)
    }

    pub fn get_order(&self, id: Uuid) -> Result<OrderView, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound("Order"))
    }

    pub fn list_orders(
        &self,
        filter: &OrderFilter,
        page: Page,
    ) -> Result<ListResult<OrderView>, DomainError> {
        self.repo.list(filter, page)
    }

    pub fn orders_for_email(
        &self,
        email: Option<&str>,
        page: Page,
    ) -> Result<ListResult<OrderView>, DomainError> {
        let email = required_email(email)?;
        self.repo.list(&OrderFilter::for_email(&email), page)
    }

    /// Portal edit of the caller's own order.
    pub fn update_as_customer(
        &self,
        customer: &CustomerView,
        id: Uuid,
        changes: OrderChanges,
    ) -> Result<OrderView, DomainError> {
        changes.validate()?;
        let order = self.get_order(id)?;
        if !order.customer_email.eq_ignore_ascii_case(&customer.email) {
            return Err(DomainError::Forbidden("Unauthorized".to_string()));
        }
        if !changes.is_customer_editable() {
            return Err(DomainError::Forbidden(
                "Customers may only change pickup date, instructions, services and address"
                    .to_string(),
            ));
        }
        self.repo.update(id, changes)
    }

    /// Portal delete, authorised by the email the order was placed with.
    pub fn delete_as_customer(&self, id: Uuid, email: Option<&str>) -> Result<(), DomainError> {
        let email = required_email(email)?;
        let order = self.get_order(id)?;
        if !order.customer_email.eq_ignore_ascii_case(&email) {
            return Err(DomainError::Unauthorized(
                "Unauthorized (email mismatch)".to_string(),
            ));
        }
        self.delete_order(id)
    }

    pub fn update_order(&self, id: Uuid, mut changes: OrderChanges) -> Result<OrderView, DomainError> {
        changes.validate()?;
        changes.customer_email = changes.customer_email.as_deref().map(normalize_email);
        self.repo.update(id, changes)
    }

    /// Back-office edit. A requested status change is checked against the
    /// workflow before any field is written.
    pub fn edit_order(
        &self,
        id: Uuid,
        changes: OrderChanges,
        status: Option<OrderStatus>,
    ) -> Result<OrderView, DomainError> {
        let Some(target) = status else {
            return self.update_order(id, changes);
        };
        check_move(self.get_order(id)?.status, target)?;
        self.update_order(id, changes)?;
        self.set_status(id, target)
    }

    pub fn delete_order(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.repo.delete(id)? {
            return Err(DomainError::NotFound("Order"));
        }
        log::info!("Deleted order {}", id);
        Ok(())
    }

    pub fn transition(&self, id: Uuid, transition: Transition) -> Result<OrderView, DomainError> {
        let order = self.get_order(id)?;
        let target = order.status.apply(transition)?;
        self.move_status(order, target)
    }

    /// Explicit status change: one workflow step either way, or cancellation.
    pub fn set_status(&self, id: Uuid, target: OrderStatus) -> Result<OrderView, DomainError> {
        let order = self.get_order(id)?;
        if order.status == target {
            return Ok(order);
        }
        check_move(order.status, target)?;
        self.move_status(order, target)
    }

    fn move_status(&self, order: OrderView, target: OrderStatus) -> Result<OrderView, DomainError> {
        let updated = self.repo.set_status(order.id, order.status, target)?;
        log::info!(
            "Order {} moved from {} to {}",
            updated.order_number,
            order.status,
            updated.status
        );
        Ok(updated)
    }

    pub fn qr_payload(&self, id: Uuid) -> Result<QrPayload, DomainError> {
        Ok(QrPayload::from(&self.get_order(id)?))
    }

    /// Every order matching `filter`, for exports.
    pub fn export_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderView>, DomainError> {
        let mut page = Page::new(1, Page::MAX_LIMIT);
        let mut orders = Vec::new();
        loop {
            let batch = self.repo.list(filter, page)?;
            let fetched = batch.items.len() as i64;
            orders.extend(batch.items);
            if fetched < page.limit || orders.len() as i64 >= batch.total {
                return Ok(orders);
            }
            page = Page::new(page.page + 1, page.limit);
        }
    }

    pub fn stats(&self) -> Result<OrderStats, DomainError> {
        self.repo.stats()
    }

    pub fn analytics(&self) -> Result<Analytics, DomainError> {
        let stats = self.repo.stats()?;
        let mut top_services = self.catalog.list(false)?;
        top_services.sort_by(|a, b| b.usage_count.cmp(&a.usage_count).then(a.name.cmp(&b.name)));
        top_services.truncate(Self::TOP_SERVICES);
        Ok(Analytics {
            stats,
            top_services,
        })
    }
}

fn check_move(from: OrderStatus, to: OrderStatus) -> Result<(), DomainError> {
    if from == to || from.can_move_to(to) {
        return Ok(());
    }
    Err(DomainError::Conflict(format!(
        "Order cannot move from {} to {}",
        from, to
    )))
}

fn required_email(email: Option<&str>) -> Result<String, DomainError> {
    match email.map(str::trim) {
        Some(email) if !email.is_empty() => Ok(normalize_email(email)),
        _ => Err(DomainError::invalid("Email query param is required")),
    }
}
