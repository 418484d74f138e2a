use std::sync::Arc;

use chrono::Duration;

use crate::application::auth_service::AuthService;
use crate::application::catalog_service::CatalogService;
use crate::application::customer_service::CustomerService;
use crate::application::inventory_service::InventoryService;
use crate::application::logistics_service::LogisticsService;
use crate::application::order_service::OrderService;
use crate::application::pos_service::PosService;
use crate::db::DbPool;
use crate::infrastructure::auth_repo::{DieselSessionRepository, DieselUserRepository};
use crate::infrastructure::catalog_repo::DieselCatalogRepository;
use crate::infrastructure::customer_repo::DieselCustomerRepository;
use crate::infrastructure::inventory_repo::DieselProductRepository;
use crate::infrastructure::logistics_repo::{
    DieselDeliveryRepository, DieselShipmentRepository, DieselTrackRepository,
};
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::infrastructure::pos_repo::DieselTransactionRepository;

/// Services shared by every actix worker through `web::Data`.
pub struct AppState {
    pub orders: OrderService,
    pub customers: CustomerService,
    pub catalog: CatalogService,
    pub logistics: LogisticsService,
    pub pos: PosService,
    pub inventory: InventoryService,
    pub auth: AuthService,
}

impl AppState {
    pub fn from_pool(pool: DbPool, session_ttl: Duration, bcrypt_cost: u32) -> Self {
        let catalog = Arc::new(DieselCatalogRepository::new(pool.clone()));
        let customers = Arc::new(DieselCustomerRepository::new(pool.clone()));

        AppState {
            orders: OrderService::new(
                Arc::new(DieselOrderRepository::new(pool.clone())),
                catalog.clone(),
            ),
            customers: CustomerService::new(customers.clone()),
            catalog: CatalogService::new(catalog),
            logistics: LogisticsService::new(
                Arc::new(DieselDeliveryRepository::new(pool.clone())),
                Arc::new(DieselShipmentRepository::new(pool.clone())),
                Arc::new(DieselTrackRepository::new(pool.clone())),
            ),
            pos: PosService::new(Arc::new(DieselTransactionRepository::new(pool.clone()))),
            inventory: InventoryService::new(Arc::new(DieselProductRepository::new(pool.clone()))),
            auth: AuthService::new(
                customers,
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselSessionRepository::new(pool)),
                session_ttl,
                bcrypt_cost,
            ),
        }
    }

    /// Every service backed by one in-memory store.
    #[cfg(test)]
    pub fn in_memory(store: &Arc<crate::testing::InMemoryStore>) -> Self {
        AppState {
            orders: OrderService::new(store.clone(), store.clone()),
            customers: CustomerService::new(store.clone()),
            catalog: CatalogService::new(store.clone()),
            logistics: LogisticsService::new(store.clone(), store.clone(), store.clone()),
            pos: PosService::new(store.clone()),
            inventory: InventoryService::new(store.clone()),
            auth: AuthService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                Duration::hours(1),
                4,
            ),
        }
    }
}
