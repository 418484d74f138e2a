use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::customer::{validate_email, CustomerView};
use super::errors::DomainError;
use super::status::{OrderStatus, PaymentStatus, Priority};

/// One service line of an order, stored in the `orders.items` JSON column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub service_id: Uuid,
    pub name: String,
    pub price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub priority: Priority,
    pub total_amount: BigDecimal,
    pub items: Vec<OrderItem>,
    pub pickup_date: Option<NaiveDate>,
    pub special_instructions: Option<String>,
    pub shipping_address: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderView {
    pub fn service_names(&self) -> Vec<String> {
        self.items.iter().map(|item| item.name.clone()).collect()
    }
}

/// A customer-portal order request. Services are referenced by id; prices
/// and the total come from the catalog, never from the caller.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub service_ids: Vec<Uuid>,
    pub pickup_date: Option<NaiveDate>,
    pub special_instructions: Option<String>,
    pub shipping_address: Option<Value>,
    pub priority: Priority,
}

impl PlaceOrder {
    pub fn validate(&self) -> Result<(), DomainError> {
        let required = [&self.customer_name, &self.customer_email, &self.customer_phone];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(DomainError::missing_fields());
        }
        if self.service_ids.is_empty() {
            return Err(DomainError::invalid("serviceIds must be a non-empty list"));
        }
        validate_email(&self.customer_email)
    }
}

#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: OrderView,
    pub customer: CustomerView,
}

/// Editable order fields. `service_ids` replaces the items and recomputes
/// the total. Status is not part of this: it moves through the workflow.
#[derive(Debug, Clone, Default)]
pub struct OrderChanges {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub service_ids: Option<Vec<Uuid>>,
    pub pickup_date: Option<NaiveDate>,
    pub special_instructions: Option<String>,
    pub shipping_address: Option<Value>,
    pub payment_status: Option<PaymentStatus>,
    pub priority: Option<Priority>,
}

impl OrderChanges {
    pub fn validate(&self) -> Result<(), DomainError> {
        if matches!(&self.customer_name, Some(name) if name.trim().is_empty()) {
            return Err(DomainError::invalid("customerName must not be empty"));
        }
        if let Some(email) = &self.customer_email {
            validate_email(email)?;
        }
        if matches!(&self.service_ids, Some(ids) if ids.is_empty()) {
            return Err(DomainError::invalid("serviceIds must be a non-empty list"));
        }
        Ok(())
    }

    /// Fields a portal customer may change on their own order.
    pub fn is_customer_editable(&self) -> bool {
        self.customer_name.is_none()
            && self.customer_email.is_none()
            && self.customer_phone.is_none()
            && self.payment_status.is_none()
            && self.priority.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub email: Option<String>,
    pub status: Option<OrderStatus>,
    pub search: Option<String>,
}

impl OrderFilter {
    pub fn for_email(email: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            ..Default::default()
        }
    }

    /// In-process form of the repository filter: email is an exact
    /// case-insensitive match, search looks at number, name and email.
    pub fn matches(&self, order: &OrderView) -> bool {
        if let Some(email) = &self.email {
            if !order.customer_email.eq_ignore_ascii_case(email.trim()) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if order.status != status {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.trim().to_lowercase();
            let hit = [&order.order_number, &order.customer_name, &order.customer_email]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }
}

/// Builds the order lines from the catalog entries matching `service_ids`.
/// Every requested id must resolve exactly once, otherwise the request is
/// rejected.
pub fn price_items(
    service_ids: &[Uuid],
    catalog: &[(Uuid, String, BigDecimal)],
) -> Result<(Vec<OrderItem>, BigDecimal), DomainError> {
    let mut items: Vec<OrderItem> = Vec::with_capacity(service_ids.len());
    for id in service_ids {
        if items.iter().any(|item| item.service_id == *id) {
            return Err(DomainError::invalid("One or more services are invalid"));
        }
        let Some((_, name, price)) = catalog.iter().find(|(sid, _, _)| sid == id) else {
            return Err(DomainError::invalid("One or more services are invalid"));
        };
        items.push(OrderItem {
            service_id: *id,
            name: name.clone(),
            price: price.clone(),
        });
    }
    let total = items
        .iter()
        .fold(BigDecimal::zero(), |acc, item| acc + &item.price);
    Ok((items, total))
}

/// Human facing order number: `ORD-` followed by the first eight hex digits
/// of the id.
pub fn order_number_for(id: &Uuid) -> String {
    let simple = id.simple().to_string();
    format!("ORD-{}", simple[..8].to_ascii_uppercase())
}

/// Content of the QR label printed for an order and scanned by workers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    pub order_id: Uuid,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub services: Vec<String>,
    pub pickup_date: Option<NaiveDate>,
    pub special_instructions: Option<String>,
    pub total: String,
    pub created_at: DateTime<Utc>,
}

impl From<&OrderView> for QrPayload {
    fn from(order: &OrderView) -> Self {
        QrPayload {
            order_id: order.id,
            order_number: order.order_number.clone(),
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.clone(),
            customer_phone: order.customer_phone.clone(),
            services: order.service_names(),
            pickup_date: order.pickup_date,
            special_instructions: order.special_instructions.clone(),
            total: order.total_amount.to_string(),
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderStats {
    pub status_counts: Vec<(OrderStatus, i64)>,
    /// Sum of all non-cancelled order totals.
    pub revenue: BigDecimal,
}

impl OrderStats {
    pub fn total_orders(&self) -> i64 {
        self.status_counts.iter().map(|(_, count)| count).sum()
    }

    pub fn count_of(&self, status: OrderStatus) -> i64 {
        self.status_counts
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// Completed orders as a percentage of all orders, 0 when there are none.
    pub fn completion_rate(&self) -> f64 {
        let total = self.total_orders();
        if total == 0 {
            return 0.0;
        }
        self.count_of(OrderStatus::Completed) as f64 * 100.0 / total as f64
    }
}
