//! In-memory implementations of every repository port, used by the service
//! and handler tests in place of Postgres.

use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

use crate::domain::auth::{AdminUser, Session};
use crate::domain::catalog::{NewService, ServiceChanges, ServiceView};
use crate::domain::customer::{CustomerChanges, CustomerCredentials, CustomerView, NewCustomer};
use crate::domain::errors::DomainError;
use crate::domain::inventory::{NewProduct, ProductChanges, ProductView};
use crate::domain::logistics::{
    format_uti, DeliveryChanges, DeliveryView, NewDelivery, NewScan, NewShipment, ShipmentView,
    TrackView,
};
use crate::domain::order::{
    order_number_for, price_items, OrderChanges, OrderFilter, OrderStats, OrderView, PlaceOrder,
    PlacedOrder,
};
use crate::domain::paging::{ListResult, Page};
use crate::domain::ports::*;
use crate::domain::pos::{NewTransaction, TransactionView};
use crate::domain::status::{
    DeliveryStatus, OrderStatus, PaymentStatus, Priority, ServiceStatus, ShipmentStatus,
};

#[derive(Default)]
struct Tables {
    customers: Vec<(CustomerView, Option<String>)>,
    services: Vec<ServiceView>,
    orders: Vec<OrderView>,
    deliveries: Vec<DeliveryView>,
    shipments: Vec<ShipmentView>,
    tracks: Vec<TrackView>,
    transactions: Vec<TransactionView>,
    products: Vec<ProductView>,
    users: Vec<AdminUser>,
    sessions: Vec<Session>,
}

impl Tables {
    fn catalog(&self) -> Vec<(Uuid, String, BigDecimal)> {
        self.services
            .iter()
            .filter(|s| s.status == ServiceStatus::Active)
            .map(|s| (s.id, s.name.clone(), s.price.clone()))
            .collect()
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

/// Newest first, then paged.
fn page_of<T: Clone>(rows: Vec<&T>, page: Page) -> ListResult<T> {
    let total = rows.len() as i64;
    let items = rows
        .into_iter()
        .rev()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .cloned()
        .collect();
    ListResult { items, total }
}

impl InMemoryStore {
    /// A store holding the three default services, like a fresh database.
    pub fn seeded() -> Arc<Self> {
        let store = Self::default();
        for (name, category, price, duration) in [
            ("Laundry", "Wash", "200.00", "24h"),
            ("Dry Cleaning", "Dry Clean", "300.00", "48h"),
            ("Ironing", "Press", "100.00", "12h"),
        ] {
            CatalogRepository::create(
                &store,
                NewService {
                    name: name.to_string(),
                    category: category.to_string(),
                    description: None,
                    price: BigDecimal::from_str(price).unwrap(),
                    duration: duration.to_string(),
                    status: ServiceStatus::Active,
                },
            )
            .unwrap();
        }
        Arc::new(store)
    }

    /// Ids of the seeded services: Laundry, Dry Cleaning, Ironing.
    pub fn service_ids(&self) -> Vec<Uuid> {
        self.lock().services.iter().map(|s| s.id).collect()
    }

    /// Places an order for a throwaway customer and returns its id.
    pub fn sample_order(&self) -> Uuid {
        let service = self.service_ids()[0];
        self.place(PlaceOrder {
            customer_name: "Sample Customer".to_string(),
            customer_email: format!("{}@example.com", Uuid::new_v4().simple()),
            customer_phone: "9000000000".to_string(),
            service_ids: vec![service],
            pickup_date: None,
            special_instructions: None,
            shipping_address: None,
            priority: Priority::Normal,
        })
        .unwrap()
        .order
        .id
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }
}

impl OrderRepository for InMemoryStore {
    fn place(&self, order: PlaceOrder) -> Result<PlacedOrder, DomainError> {
        let mut t = self.lock();
        let (items, total) = price_items(&order.service_ids, &t.catalog())?;
        let now = Utc::now();

        let index = match t.customers.iter().position(|(c, _)| c.email == order.customer_email) {
            Some(index) => index,
            None => {
                t.customers.push((
                    CustomerView {
                        id: Uuid::new_v4(),
                        name: order.customer_name.clone(),
                        email: order.customer_email.clone(),
                        phone: Some(order.customer_phone.clone()),
                        address: order.shipping_address.clone(),
                        total_orders: 0,
                        total_spent: BigDecimal::zero(),
                        last_order: None,
                        has_password: false,
                        created_at: now,
                        updated_at: now,
                    },
                    None,
                ));
                t.customers.len() - 1
            }
        };
        let customer = {
            let (customer, _) = &mut t.customers[index];
            customer.total_orders += 1;
            customer.total_spent = &customer.total_spent + &total;
            customer.last_order = Some(now);
            customer.clone()
        };
        for id in &order.service_ids {
            if let Some(service) = t.services.iter_mut().find(|s| s.id == *id) {
                service.usage_count += 1;
            }
        }

        let id = Uuid::new_v4();
        let view = OrderView {
            id,
            order_number: order_number_for(&id),
            customer_id: Some(customer.id),
            customer_name: order.customer_name,
            customer_email: order.customer_email,
            customer_phone: Some(order.customer_phone),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            priority: order.priority,
            total_amount: total,
            items,
            pickup_date: order.pickup_date,
            special_instructions: order.special_instructions,
            shipping_address: order.shipping_address,
            created_at: now,
            updated_at: now,
        };
        t.orders.push(view.clone());
        Ok(PlacedOrder {
            order: view,
            customer,
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        Ok(self.lock().orders.iter().find(|o| o.id == id).cloned())
    }

    fn list(&self, filter: &OrderFilter, page: Page) -> Result<ListResult<OrderView>, DomainError> {
        let t = self.lock();
        Ok(page_of(t.orders.iter().filter(|o| filter.matches(o)).collect(), page))
    }

    fn update(&self, id: Uuid, changes: OrderChanges) -> Result<OrderView, DomainError> {
        let mut t = self.lock();
        let priced = match &changes.service_ids {
            Some(ids) => Some(price_items(ids, &t.catalog())?),
            None => None,
        };
        let order = t
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(DomainError::NotFound("Order"))?;
        if let Some((items, total)) = priced {
            order.items = items;
            order.total_amount = total;
        }
        if let Some(v) = changes.customer_name {
            order.customer_name = v;
        }
        if let Some(v) = changes.customer_email {
            order.customer_email = v;
        }
        if let Some(v) = changes.customer_phone {
            order.customer_phone = Some(v);
        }
        if let Some(v) = changes.pickup_date {
            order.pickup_date = Some(v);
        }
        if let Some(v) = changes.special_instructions {
            order.special_instructions = Some(v);
        }
        if let Some(v) = changes.shipping_address {
            order.shipping_address = Some(v);
        }
        if let Some(v) = changes.payment_status {
            order.payment_status = v;
        }
        if let Some(v) = changes.priority {
            order.priority = v;
        }
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    fn set_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<OrderView, DomainError> {
        let mut t = self.lock();
        let order = t
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(DomainError::NotFound("Order"))?;
        if order.status != from {
            return Err(DomainError::Conflict(format!("Order is no longer {}", from)));
        }
        order.status = to;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut t = self.lock();
        let before = t.orders.len();
        t.orders.retain(|o| o.id != id);
        Ok(t.orders.len() < before)
    }

    fn stats(&self) -> Result<OrderStats, DomainError> {
        let t = self.lock();
        let mut stats = OrderStats::default();
        for status in OrderStatus::ALL {
            let count = t.orders.iter().filter(|o| o.status == status).count() as i64;
            if count > 0 {
                stats.status_counts.push((status, count));
            }
        }
        stats.revenue = t
            .orders
            .iter()
            .filter(|o| o.status != OrderStatus::Cancelled)
            .fold(BigDecimal::zero(), |acc, o| acc + &o.total_amount);
        Ok(stats)
    }
}

impl CustomerRepository for InMemoryStore {
    fn create(&self, customer: NewCustomer) -> Result<CustomerView, DomainError> {
        let mut t = self.lock();
        if t.customers.iter().any(|(c, _)| c.email == customer.email) {
            return Err(DomainError::Conflict("Email exists".to_string()));
        }
        let now = Utc::now();
        let view = CustomerView {
            id: Uuid::new_v4(),
            name: customer.name,
            email: customer.email,
            phone: customer.phone,
            address: customer.address,
            total_orders: 0,
            total_spent: BigDecimal::zero(),
            last_order: None,
            has_password: customer.password_hash.is_some(),
            created_at: now,
            updated_at: now,
        };
        t.customers.push((view.clone(), customer.password_hash));
        Ok(view)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<CustomerView>, DomainError> {
        let t = self.lock();
        Ok(t.customers.iter().find(|(c, _)| c.id == id).map(|(c, _)| c.clone()))
    }

    fn credentials_by_email(&self, email: &str) -> Result<Option<CustomerCredentials>, DomainError> {
        let t = self.lock();
        Ok(t
            .customers
            .iter()
            .find(|(c, _)| c.email == email)
            .map(|(c, hash)| CustomerCredentials {
                customer: c.clone(),
                password_hash: hash.clone(),
            }))
    }

    fn set_password(&self, id: Uuid, password_hash: String) -> Result<CustomerView, DomainError> {
        let mut t = self.lock();
        let (customer, hash) = t
            .customers
            .iter_mut()
            .find(|(c, _)| c.id == id)
            .ok_or(DomainError::NotFound("Customer"))?;
        *hash = Some(password_hash);
        customer.has_password = true;
        customer.updated_at = Utc::now();
        Ok(customer.clone())
    }

    fn list(&self, page: Page) -> Result<ListResult<CustomerView>, DomainError> {
        let t = self.lock();
        Ok(page_of(t.customers.iter().map(|(c, _)| c).collect(), page))
    }

    fn update(&self, id: Uuid, changes: CustomerChanges) -> Result<CustomerView, DomainError> {
        let mut t = self.lock();
        if let Some(email) = &changes.email {
            if t.customers.iter().any(|(c, _)| c.id != id && &c.email == email) {
                return Err(DomainError::Conflict("Email exists".to_string()));
            }
        }
        let (customer, _) = t
            .customers
            .iter_mut()
            .find(|(c, _)| c.id == id)
            .ok_or(DomainError::NotFound("Customer"))?;
        if let Some(v) = changes.name {
            customer.name = v;
        }
        if let Some(v) = changes.email {
            customer.email = v;
        }
        if let Some(v) = changes.phone {
            customer.phone = Some(v);
        }
        if let Some(v) = changes.address {
            customer.address = Some(v);
        }
        customer.updated_at = Utc::now();
        Ok(customer.clone())
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut t = self.lock();
        let before = t.customers.len();
        t.customers.retain(|(c, _)| c.id != id);
        let deleted = t.customers.len() < before;
        for order in t.orders.iter_mut().filter(|o| o.customer_id == Some(id)) {
            order.customer_id = None;
        }
        Ok(deleted)
    }
}

impl CatalogRepository for InMemoryStore {
    fn create(&self, service: NewService) -> Result<ServiceView, DomainError> {
        let now = Utc::now();
        let view = ServiceView {
            id: Uuid::new_v4(),
            name: service.name,
            category: service.category,
            description: service.description,
            price: service.price,
            duration: service.duration,
            status: service.status,
            usage_count: 0,
            created_at: now,
            updated_at: now,
        };
        self.lock().services.push(view.clone());
        Ok(view)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<ServiceView>, DomainError> {
        Ok(self.lock().services.iter().find(|s| s.id == id).cloned())
    }

    fn list(&self, active_only: bool) -> Result<Vec<ServiceView>, DomainError> {
        let mut services: Vec<ServiceView> = self
            .lock()
            .services
            .iter()
            .filter(|s| !active_only || s.status == ServiceStatus::Active)
            .cloned()
            .collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    fn update(&self, id: Uuid, changes: ServiceChanges) -> Result<ServiceView, DomainError> {
        let mut t = self.lock();
        let service = t
            .services
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(DomainError::NotFound("Service"))?;
        if let Some(v) = changes.name {
            service.name = v;
        }
        if let Some(v) = changes.category {
            service.category = v;
        }
        if let Some(v) = changes.description {
            service.description = Some(v);
        }
        if let Some(v) = changes.price {
            service.price = v;
        }
        if let Some(v) = changes.duration {
            service.duration = v;
        }
        if let Some(v) = changes.status {
            service.status = v;
        }
        service.updated_at = Utc::now();
        Ok(service.clone())
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut t = self.lock();
        let before = t.services.len();
        t.services.retain(|s| s.id != id);
        Ok(t.services.len() < before)
    }
}

impl DeliveryRepository for InMemoryStore {
    fn create(&self, delivery: NewDelivery) -> Result<DeliveryView, DomainError> {
        let now = Utc::now();
        let view = DeliveryView {
            id: Uuid::new_v4(),
            order_id: delivery.order_id,
            driver_name: delivery.driver_name,
            vehicle_id: delivery.vehicle_id,
            status: DeliveryStatus::Pending,
            estimated_delivery: delivery.estimated_delivery,
            actual_delivery: None,
            location: None,
            route: delivery.route,
            created_at: now,
            updated_at: now,
        };
        self.lock().deliveries.push(view.clone());
        Ok(view)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<DeliveryView>, DomainError> {
        Ok(self.lock().deliveries.iter().find(|d| d.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<DeliveryView>, DomainError> {
        Ok(self.lock().deliveries.iter().rev().cloned().collect())
    }

    fn update(&self, id: Uuid, changes: DeliveryChanges) -> Result<DeliveryView, DomainError> {
        let mut t = self.lock();
        let delivery = t
            .deliveries
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(DomainError::NotFound("Delivery"))?;
        if let Some(v) = changes.driver_name {
            delivery.driver_name = v;
        }
        if let Some(v) = changes.vehicle_id {
            delivery.vehicle_id = v;
        }
        if let Some(v) = changes.status {
            delivery.status = v;
        }
        if let Some(v) = changes.estimated_delivery {
            delivery.estimated_delivery = Some(v);
        }
        if let Some(v) = changes.actual_delivery {
            delivery.actual_delivery = Some(v);
        }
        if let Some(v) = changes.location {
            delivery.location = Some(v);
        }
        if let Some(v) = changes.route {
            delivery.route = Some(v);
        }
        delivery.updated_at = Utc::now();
        Ok(delivery.clone())
    }
}

impl ShipmentRepository for InMemoryStore {
    fn create(&self, shipment: NewShipment) -> Result<ShipmentView, DomainError> {
        let mut t = self.lock();
        let known = shipment
            .order_ids
            .iter()
            .all(|id| t.orders.iter().any(|o| o.id == *id));
        if !known {
            return Err(DomainError::invalid("One or more orders are invalid"));
        }
        let now = Utc::now();
        let view = ShipmentView {
            id: Uuid::new_v4(),
            uti: format_uti(now.year(), t.shipments.len() as i64 + 1),
            store_id: shipment.store_id,
            staff_name: shipment.staff_name,
            status: ShipmentStatus::Created,
            order_ids: shipment.order_ids,
            estimated_delivery: shipment.estimated_delivery,
            created_at: now,
            updated_at: now,
        };
        t.shipments.push(view.clone());
        Ok(view)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<ShipmentView>, DomainError> {
        Ok(self.lock().shipments.iter().find(|s| s.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<ShipmentView>, DomainError> {
        Ok(self.lock().shipments.iter().rev().cloned().collect())
    }

    fn set_status(
        &self,
        id: Uuid,
        from: ShipmentStatus,
        to: ShipmentStatus,
    ) -> Result<ShipmentView, DomainError> {
        let mut t = self.lock();
        let shipment = t
            .shipments
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(DomainError::NotFound("Shipment"))?;
        if shipment.status != from {
            return Err(DomainError::Conflict(format!("Shipment is no longer {}", from)));
        }
        shipment.status = to;
        shipment.updated_at = Utc::now();
        Ok(shipment.clone())
    }
}

impl TrackRepository for InMemoryStore {
    fn record(&self, scan: NewScan) -> Result<TrackView, DomainError> {
        let view = TrackView {
            id: Uuid::new_v4(),
            order_ref: scan.order_ref(),
            worker_name: scan.worker_name,
            worker_email: scan.worker_email,
            order_status: scan.order_status,
            location: scan.location,
            order_data: scan.order_data,
            scanned_at: Utc::now(),
        };
        self.lock().tracks.push(view.clone());
        Ok(view)
    }

    fn list(&self, order_ref: Option<&str>) -> Result<Vec<TrackView>, DomainError> {
        Ok(self
            .lock()
            .tracks
            .iter()
            .rev()
            .filter(|t| order_ref.map_or(true, |r| t.order_ref == r))
            .cloned()
            .collect())
    }
}

impl TransactionRepository for InMemoryStore {
    fn create(
        &self,
        transaction_number: String,
        transaction: NewTransaction,
    ) -> Result<TransactionView, DomainError> {
        let view = TransactionView {
            id: Uuid::new_v4(),
            transaction_number,
            total_amount: transaction.total(),
            items: transaction.items,
            payment_method: transaction.payment_method,
            cashier_id: transaction.cashier_id,
            created_at: Utc::now(),
        };
        self.lock().transactions.push(view.clone());
        Ok(view)
    }

    fn list(&self, page: Page) -> Result<ListResult<TransactionView>, DomainError> {
        let t = self.lock();
        Ok(page_of(t.transactions.iter().collect(), page))
    }
}

impl ProductRepository for InMemoryStore {
    fn create(&self, product: NewProduct) -> Result<ProductView, DomainError> {
        let mut t = self.lock();
        if t.products.iter().any(|p| p.sku == product.sku) {
            return Err(DomainError::Conflict("SKU exists".to_string()));
        }
        let now = Utc::now();
        let view = ProductView {
            id: Uuid::new_v4(),
            name: product.name,
            sku: product.sku,
            category: product.category,
            description: product.description,
            price: product.price,
            stock_quantity: product.stock_quantity,
            reorder_level: product.reorder_level,
            supplier: product.supplier,
            created_at: now,
            updated_at: now,
        };
        t.products.push(view.clone());
        Ok(view)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<ProductView>, DomainError> {
        Ok(self.lock().products.iter().find(|p| p.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<ProductView>, DomainError> {
        let mut products = self.lock().products.clone();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    fn low_stock(&self) -> Result<Vec<ProductView>, DomainError> {
        let mut products: Vec<ProductView> = self
            .lock()
            .products
            .iter()
            .filter(|p| p.needs_reorder())
            .cloned()
            .collect();
        products.sort_by_key(|p| p.stock_quantity);
        Ok(products)
    }

    fn update(&self, id: Uuid, changes: ProductChanges) -> Result<ProductView, DomainError> {
        let mut t = self.lock();
        let product = t
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(DomainError::NotFound("Product"))?;
        if let Some(v) = changes.name {
            product.name = v;
        }
        if let Some(v) = changes.sku {
            product.sku = v;
        }
        if let Some(v) = changes.category {
            product.category = v;
        }
        if let Some(v) = changes.description {
            product.description = Some(v);
        }
        if let Some(v) = changes.price {
            product.price = v;
        }
        if let Some(v) = changes.stock_quantity {
            product.stock_quantity = v;
        }
        if let Some(v) = changes.reorder_level {
            product.reorder_level = v;
        }
        if let Some(v) = changes.supplier {
            product.supplier = Some(v);
        }
        product.updated_at = Utc::now();
        Ok(product.clone())
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut t = self.lock();
        let before = t.products.len();
        t.products.retain(|p| p.id != id);
        Ok(t.products.len() < before)
    }
}

impl UserRepository for InMemoryStore {
    fn find_by_username(&self, username: &str) -> Result<Option<AdminUser>, DomainError> {
        Ok(self.lock().users.iter().find(|u| u.username == username).cloned())
    }

    fn ensure(&self, username: &str, password_hash: String) -> Result<bool, DomainError> {
        let mut t = self.lock();
        if t.users.iter().any(|u| u.username == username) {
            return Ok(false);
        }
        t.users.push(AdminUser {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash,
        });
        Ok(true)
    }
}

impl SessionRepository for InMemoryStore {
    fn create(&self, session: Session) -> Result<(), DomainError> {
        self.lock().sessions.push(session);
        Ok(())
    }

    fn find(&self, token: Uuid) -> Result<Option<Session>, DomainError> {
        Ok(self.lock().sessions.iter().find(|s| s.token == token).cloned())
    }

    fn revoke(&self, token: Uuid) -> Result<bool, DomainError> {
        let mut t = self.lock();
        let before = t.sessions.len();
        t.sessions.retain(|s| s.token != token);
        Ok(t.sessions.len() < before)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut t = self.lock();
        let before = t.sessions.len();
        t.sessions.retain(|s| s.expires_at >= now);
        Ok(before - t.sessions.len())
    }
}
