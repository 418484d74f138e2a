pub mod auth_service;
pub mod catalog_service;
pub mod customer_service;
pub mod inventory_service;
pub mod logistics_service;
pub mod order_service;
pub mod pos_service;
