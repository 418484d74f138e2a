use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::auth::{AdminUser, Session};
use crate::domain::catalog::ServiceView;
use crate::domain::customer::CustomerView;
use crate::domain::errors::DomainError;
use crate::domain::inventory::ProductView;
use crate::domain::logistics::{DeliveryView, ShipmentView, TrackView};
use crate::domain::order::OrderView;
use crate::domain::pos::TransactionView;
use crate::schema::{
    customers, deliveries, order_transactions, orders, products, services, sessions,
    shipment_orders, shipments, tracks, users,
};

fn corrupt(what: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::Internal(format!("Stored {} is unreadable: {}", what, e))
}

// ── Customers ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = customers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CustomerRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<Value>,
    pub password_hash: Option<String>,
    pub total_orders: i32,
    pub total_spent: BigDecimal,
    pub last_order: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = customers)]
pub struct NewCustomerRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<Value>,
    pub password_hash: Option<String>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = customers)]
pub struct CustomerChangesRow {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Value>,
    pub updated_at: DateTime<Utc>,
}

impl From<CustomerRow> for CustomerView {
    fn from(row: CustomerRow) -> Self {
        CustomerView {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            total_orders: row.total_orders,
            total_spent: row.total_spent,
            last_order: row.last_order,
            has_password: row.password_hash.is_some(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ── Services ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = services)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ServiceRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub duration: String,
    pub status: String,
    pub usage_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = services)]
pub struct NewServiceRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub duration: String,
    pub status: String,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = services)]
pub struct ServiceChangesRow {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub duration: Option<String>,
    pub status: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ServiceRow> for ServiceView {
    type Error = DomainError;

    fn try_from(row: ServiceRow) -> Result<Self, Self::Error> {
        Ok(ServiceView {
            id: row.id,
            name: row.name,
            category: row.category,
            description: row.description,
            price: row.price,
            duration: row.duration,
            status: row.status.parse().map_err(|e| corrupt("service status", e))?,
            usage_count: row.usage_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub status: String,
    pub payment_status: String,
    pub priority: String,
    pub total_amount: BigDecimal,
    pub items: Value,
    pub pickup_date: Option<NaiveDate>,
    pub special_instructions: Option<String>,
    pub shipping_address: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub status: String,
    pub payment_status: String,
    pub priority: String,
    pub total_amount: BigDecimal,
    pub items: Value,
    pub pickup_date: Option<NaiveDate>,
    pub special_instructions: Option<String>,
    pub shipping_address: Option<Value>,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = orders)]
pub struct OrderChangesRow {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub total_amount: Option<BigDecimal>,
    pub items: Option<Value>,
    pub pickup_date: Option<NaiveDate>,
    pub special_instructions: Option<String>,
    pub shipping_address: Option<Value>,
    pub payment_status: Option<String>,
    pub priority: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for OrderView {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(OrderView {
            id: row.id,
            order_number: row.order_number,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            status: row.status.parse().map_err(|e| corrupt("order status", e))?,
            payment_status: row
                .payment_status
                .parse()
                .map_err(|e| corrupt("payment status", e))?,
            priority: row.priority.parse().map_err(|e| corrupt("priority", e))?,
            total_amount: row.total_amount,
            items: serde_json::from_value(row.items).map_err(|e| corrupt("order items", e))?,
            pickup_date: row.pickup_date,
            special_instructions: row.special_instructions,
            shipping_address: row.shipping_address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ── Deliveries ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = deliveries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DeliveryRow {
    pub id: Uuid,
    pub order_id: Option<Uuid>,
    pub driver_name: String,
    pub vehicle_id: String,
    pub status: String,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub location: Option<Value>,
    pub route: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = deliveries)]
pub struct NewDeliveryRow {
    pub id: Uuid,
    pub order_id: Option<Uuid>,
    pub driver_name: String,
    pub vehicle_id: String,
    pub status: String,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub route: Option<Value>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = deliveries)]
pub struct DeliveryChangesRow {
    pub driver_name: Option<String>,
    pub vehicle_id: Option<String>,
    pub status: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub location: Option<Value>,
    pub route: Option<Value>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DeliveryRow> for DeliveryView {
    type Error = DomainError;

    fn try_from(row: DeliveryRow) -> Result<Self, Self::Error> {
        Ok(DeliveryView {
            id: row.id,
            order_id: row.order_id,
            driver_name: row.driver_name,
            vehicle_id: row.vehicle_id,
            status: row.status.parse().map_err(|e| corrupt("delivery status", e))?,
            estimated_delivery: row.estimated_delivery,
            actual_delivery: row.actual_delivery,
            location: row.location,
            route: row.route,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ── Shipments ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = shipments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ShipmentRow {
    pub id: Uuid,
    pub uti: String,
    pub store_id: String,
    pub staff_name: String,
    pub status: String,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = shipments)]
pub struct NewShipmentRow {
    pub id: Uuid,
    pub uti: String,
    pub store_id: String,
    pub staff_name: String,
    pub status: String,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = shipment_orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ShipmentOrderRow {
    pub shipment_id: Uuid,
    pub order_id: Uuid,
}

impl ShipmentRow {
    pub fn into_view(self, order_ids: Vec<Uuid>) -> Result<ShipmentView, DomainError> {
        Ok(ShipmentView {
            id: self.id,
            uti: self.uti,
            store_id: self.store_id,
            staff_name: self.staff_name,
            status: self.status.parse().map_err(|e| corrupt("shipment status", e))?,
            order_ids,
            estimated_delivery: self.estimated_delivery,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// ── Tracks ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = tracks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TrackRow {
    pub id: Uuid,
    pub worker_name: String,
    pub worker_email: String,
    pub order_ref: String,
    pub order_status: Option<String>,
    pub location: Option<String>,
    pub order_data: String,
    pub scanned_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = tracks)]
pub struct NewTrackRow {
    pub id: Uuid,
    pub worker_name: String,
    pub worker_email: String,
    pub order_ref: String,
    pub order_status: Option<String>,
    pub location: Option<String>,
    pub order_data: String,
}

impl From<TrackRow> for TrackView {
    fn from(row: TrackRow) -> Self {
        TrackView {
            id: row.id,
            worker_name: row.worker_name,
            worker_email: row.worker_email,
            order_ref: row.order_ref,
            order_status: row.order_status,
            location: row.location,
            order_data: row.order_data,
            scanned_at: row.scanned_at,
        }
    }
}

// ── POS transactions ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = order_transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TransactionRow {
    pub id: Uuid,
    pub transaction_number: String,
    pub items: Value,
    pub total_amount: BigDecimal,
    pub payment_method: String,
    pub cashier_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_transactions)]
pub struct NewTransactionRow {
    pub id: Uuid,
    pub transaction_number: String,
    pub items: Value,
    pub total_amount: BigDecimal,
    pub payment_method: String,
    pub cashier_id: Option<String>,
}

impl TryFrom<TransactionRow> for TransactionView {
    type Error = DomainError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(TransactionView {
            id: row.id,
            transaction_number: row.transaction_number,
            items: serde_json::from_value(row.items).map_err(|e| corrupt("transaction items", e))?,
            total_amount: row.total_amount,
            payment_method: row
                .payment_method
                .parse()
                .map_err(|e| corrupt("payment method", e))?,
            cashier_id: row.cashier_id,
            created_at: row.created_at,
        })
    }
}

// ── Products ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock_quantity: i32,
    pub reorder_level: i32,
    pub supplier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock_quantity: i32,
    pub reorder_level: i32,
    pub supplier: Option<String>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductChangesRow {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub stock_quantity: Option<i32>,
    pub reorder_level: Option<i32>,
    pub supplier: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for ProductView {
    fn from(row: ProductRow) -> Self {
        ProductView {
            id: row.id,
            name: row.name,
            sku: row.sku,
            category: row.category,
            description: row.description,
            price: row.price,
            stock_quantity: row.stock_quantity,
            reorder_level: row.reorder_level,
            supplier: row.supplier,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ── Admin users and sessions ─────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
}

impl From<UserRow> for AdminUser {
    fn from(row: UserRow) -> Self {
        AdminUser {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SessionRow {
    pub token: Uuid,
    pub subject_id: Uuid,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<&Session> for SessionRow {
    fn from(session: &Session) -> Self {
        SessionRow {
            token: session.token,
            subject_id: session.subject_id,
            role: session.role.as_str().to_string(),
            created_at: session.created_at,
            expires_at: session.expires_at,
        }
    }
}

impl TryFrom<SessionRow> for Session {
    type Error = DomainError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(Session {
            token: row.token,
            subject_id: row.subject_id,
            role: row.role.parse()?,
            created_at: row.created_at,
            expires_at: row.expires_at,
        })
    }
}
