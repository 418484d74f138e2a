pub mod auth;
pub mod catalog;
pub mod customer;
pub mod errors;
pub mod inventory;
pub mod logistics;
pub mod order;
pub mod paging;
pub mod ports;
pub mod pos;
pub mod presentation;
pub mod status;
