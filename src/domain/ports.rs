use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::auth::{AdminUser, Session};
use super::catalog::{NewService, ServiceChanges, ServiceView};
use super::customer::{CustomerChanges, CustomerCredentials, CustomerView, NewCustomer};
use super::errors::DomainError;
use super::inventory::{NewProduct, ProductChanges, ProductView};
use super::logistics::{
    DeliveryChanges, DeliveryView, NewDelivery, NewScan, NewShipment, ShipmentView, TrackView,
};
use super::order::{OrderChanges, OrderFilter, OrderStats, OrderView, PlaceOrder, PlacedOrder};
use super::paging::{ListResult, Page};
use super::pos::{NewTransaction, TransactionView};
use super::status::{OrderStatus, ShipmentStatus};

pub trait OrderRepository: Send + Sync + 'static {
    /// Creates the order, finds or creates its customer, bumps service usage
    /// and customer totals, all in one transaction.
    fn place(&self, order: PlaceOrder) -> Result<PlacedOrder, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
    fn list(&self, filter: &OrderFilter, page: Page) -> Result<ListResult<OrderView>, DomainError>;
    fn update(&self, id: Uuid, changes: OrderChanges) -> Result<OrderView, DomainError>;
    /// Compare-and-set: fails with `Conflict` when the stored status is no
    /// longer `from`.
    fn set_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<OrderView, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
    fn stats(&self) -> Result<OrderStats, DomainError>;
}

pub trait CustomerRepository: Send + Sync + 'static {
    fn create(&self, customer: NewCustomer) -> Result<CustomerView, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<CustomerView>, DomainError>;
    fn credentials_by_email(&self, email: &str) -> Result<Option<CustomerCredentials>, DomainError>;
    fn set_password(&self, id: Uuid, password_hash: String) -> Result<CustomerView, DomainError>;
    fn list(&self, page: Page) -> Result<ListResult<CustomerView>, DomainError>;
    fn update(&self, id: Uuid, changes: CustomerChanges) -> Result<CustomerView, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait CatalogRepository: Send + Sync + 'static {
    fn create(&self, service: NewService) -> Result<ServiceView, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceView>, DomainError>;
    fn list(&self, active_only: bool) -> Result<Vec<ServiceView>, DomainError>;
    fn update(&self, id: Uuid, changes: ServiceChanges) -> Result<ServiceView, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait DeliveryRepository: Send + Sync + 'static {
    fn create(&self, delivery: NewDelivery) -> Result<DeliveryView, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<DeliveryView>, DomainError>;
    fn list(&self) -> Result<Vec<DeliveryView>, DomainError>;
    fn update(&self, id: Uuid, changes: DeliveryChanges) -> Result<DeliveryView, DomainError>;
}

pub trait ShipmentRepository: Send + Sync + 'static {
    /// Assigns the next UTI and links the orders; every order id must exist.
    fn create(&self, shipment: NewShipment) -> Result<ShipmentView, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<ShipmentView>, DomainError>;
    fn list(&self) -> Result<Vec<ShipmentView>, DomainError>;
    fn set_status(
        &self,
        id: Uuid,
        from: ShipmentStatus,
        to: ShipmentStatus,
    ) -> Result<ShipmentView, DomainError>;
}

pub trait TrackRepository: Send + Sync + 'static {
    fn record(&self, scan: NewScan) -> Result<TrackView, DomainError>;
    /// Newest first, optionally restricted to one order reference.
    fn list(&self, order_ref: Option<&str>) -> Result<Vec<TrackView>, DomainError>;
}

pub trait TransactionRepository: Send + Sync + 'static {
    fn create(
        &self,
        transaction_number: String,
        transaction: NewTransaction,
    ) -> Result<TransactionView, DomainError>;
    fn list(&self, page: Page) -> Result<ListResult<TransactionView>, DomainError>;
}

pub trait ProductRepository: Send + Sync + 'static {
    fn create(&self, product: NewProduct) -> Result<ProductView, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<ProductView>, DomainError>;
    fn list(&self) -> Result<Vec<ProductView>, DomainError>;
    fn low_stock(&self) -> Result<Vec<ProductView>, DomainError>;
    fn update(&self, id: Uuid, changes: ProductChanges) -> Result<ProductView, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait UserRepository: Send + Sync + 'static {
    fn find_by_username(&self, username: &str) -> Result<Option<AdminUser>, DomainError>;
    /// Inserts the admin if the username is free; never overwrites.
    fn ensure(&self, username: &str, password_hash: String) -> Result<bool, DomainError>;
}

pub trait SessionRepository: Send + Sync + 'static {
    fn create(&self, session: Session) -> Result<(), DomainError>;
    fn find(&self, token: Uuid) -> Result<Option<Session>, DomainError>;
    fn revoke(&self, token: Uuid) -> Result<bool, DomainError>;
    /// Deletes every session that expired before `now`.
    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;
}
