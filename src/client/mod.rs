//! Typed HTTP client for the FabClean API, one method per endpoint.
//!
//! Endpoints that need a login take the caller's [`Session`] explicitly.
//! Failures are returned as-is: no retries and no backoff.

pub mod models;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::status::OrderStatus;
use models::*;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx answer, carrying the server's `error` message when it sent one.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Bearer token obtained from one of the login endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub token: Uuid,
}

impl Session {
    pub fn new(token: Uuid) -> Self {
        Session { token }
    }
}

impl From<&CustomerSession> for Session {
    fn from(s: &CustomerSession) -> Self {
        Session::new(s.token)
    }
}

impl From<&AdminSession> for Session {
    fn from(s: &AdminSession) -> Self {
        Session::new(s.token)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    password: &'a str,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        ApiClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn request(&self, method: Method, path: &str, session: Option<&Session>) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match session {
            Some(session) => builder.bearer_auth(session.token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let url = response.url().path().to_string();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error.or(body.message),
            Err(_) => None,
        }
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

        if status == StatusCode::UNAUTHORIZED {
            log::warn!("Unauthorized response from {}: {}", url, message);
            return Err(ClientError::Unauthorized(message));
        }
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        session: Option<&Session>,
    ) -> Result<T, ClientError> {
        self.send(self.request(Method::GET, path, session)).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        session: Option<&Session>,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(self.request(Method::POST, path, session).json(body))
            .await
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        session: Option<&Session>,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(self.request(Method::PUT, path, session).json(body))
            .await
    }

    async fn delete(&self, path: &str, session: Option<&Session>) -> Result<Message, ClientError> {
        self.send(self.request(Method::DELETE, path, session)).await
    }

    // ── auth ──

    pub async fn signup(&self, request: &SignUp) -> Result<CustomerSession, ClientError> {
        self.post("/auth/signup", None, request).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<CustomerSession, ClientError> {
        let body = Credentials {
            email: Some(email),
            username: None,
            password,
        };
        self.post("/auth/login", None, &body).await
    }

    pub async fn admin_login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AdminSession, ClientError> {
        let body = Credentials {
            email: None,
            username: Some(username),
            password,
        };
        self.post("/admin/login", None, &body).await
    }

    pub async fn logout(&self, session: &Session) -> Result<Message, ClientError> {
        self.send(self.request(Method::POST, "/auth/logout", Some(session)))
            .await
    }

    // ── customer portal ──

    pub async fn active_services(&self) -> Result<Vec<Service>, ClientError> {
        self.get("/api/services", None).await
    }

    pub async fn place_order(&self, order: &NewOrder) -> Result<PlacedOrder, ClientError> {
        self.post("/api/orders", None, order).await
    }

    pub async fn orders_by_email(&self, email: &str) -> Result<Paged<Order>, ClientError> {
        let builder = self
            .request(Method::GET, "/api/orders", None)
            .query(&[("email", email)]);
        self.send(builder).await
    }

    pub async fn update_my_order(
        &self,
        session: &Session,
        id: Uuid,
        edit: &OrderEdit,
    ) -> Result<Order, ClientError> {
        self.put(&format!("/api/orders/{}", id), Some(session), edit)
            .await
    }

    pub async fn delete_my_order(&self, id: Uuid, email: &str) -> Result<Message, ClientError> {
        let builder = self
            .request(Method::DELETE, &format!("/api/orders/{}", id), None)
            .query(&[("email", email)]);
        self.send(builder).await
    }

    /// JSON payload printed as the order's QR label.
    pub async fn order_qr(&self, id: Uuid) -> Result<serde_json::Value, ClientError> {
        self.get(&format!("/api/orders/{}/qr", id), None).await
    }

    // ── back office: orders ──

    pub async fn list_orders(
        &self,
        session: &Session,
        page: i64,
        status: Option<OrderStatus>,
    ) -> Result<Paged<Order>, ClientError> {
        let mut builder = self
            .request(Method::GET, "/admin/api/orders", Some(session))
            .query(&[("page", page)]);
        if let Some(status) = status {
            builder = builder.query(&[("status", status.as_str())]);
        }
        self.send(builder).await
    }

    pub async fn get_order(&self, session: &Session, id: Uuid) -> Result<Order, ClientError> {
        self.get(&format!("/admin/api/orders/{}", id), Some(session))
            .await
    }

    pub async fn update_order(
        &self,
        session: &Session,
        id: Uuid,
        edit: &AdminOrderEdit,
    ) -> Result<Order, ClientError> {
        self.put(&format!("/admin/api/orders/{}", id), Some(session), edit)
            .await
    }

    pub async fn delete_order(&self, session: &Session, id: Uuid) -> Result<Message, ClientError> {
        self.delete(&format!("/admin/api/orders/{}", id), Some(session))
            .await
    }

    pub async fn advance_order(&self, session: &Session, id: Uuid) -> Result<Order, ClientError> {
        self.transition(session, id, "advance").await
    }

    pub async fn revert_order(&self, session: &Session, id: Uuid) -> Result<Order, ClientError> {
        self.transition(session, id, "revert").await
    }

    pub async fn cancel_order(&self, session: &Session, id: Uuid) -> Result<Order, ClientError> {
        self.transition(session, id, "cancel").await
    }

    async fn transition(
        &self,
        session: &Session,
        id: Uuid,
        action: &str,
    ) -> Result<Order, ClientError> {
        let path = format!("/admin/api/orders/{}/{}", id, action);
        self.send(self.request(Method::POST, &path, Some(session)))
            .await
    }

    // ── back office: customers ──

    pub async fn list_customers(
        &self,
        session: &Session,
        page: i64,
    ) -> Result<Paged<Customer>, ClientError> {
        let builder = self
            .request(Method::GET, "/admin/api/customers", Some(session))
            .query(&[("page", page)]);
        self.send(builder).await
    }

    pub async fn create_customer(
        &self,
        session: &Session,
        customer: &CustomerInput,
    ) -> Result<Customer, ClientError> {
        self.post("/admin/api/customers", Some(session), customer)
            .await
    }

    pub async fn update_customer(
        &self,
        session: &Session,
        id: Uuid,
        customer: &CustomerInput,
    ) -> Result<Customer, ClientError> {
        self.put(&format!("/admin/api/customers/{}", id), Some(session), customer)
            .await
    }

    pub async fn delete_customer(
        &self,
        session: &Session,
        id: Uuid,
    ) -> Result<Message, ClientError> {
        self.delete(&format!("/admin/api/customers/{}", id), Some(session))
            .await
    }

    // ── back office: services ──

    pub async fn list_services(&self, session: &Session) -> Result<Vec<Service>, ClientError> {
        self.get("/admin/api/services", Some(session)).await
    }

    pub async fn create_service(
        &self,
        session: &Session,
        service: &ServiceInput,
    ) -> Result<Service, ClientError> {
        self.post("/admin/api/services", Some(session), service).await
    }

    pub async fn update_service(
        &self,
        session: &Session,
        id: Uuid,
        service: &ServiceInput,
    ) -> Result<Service, ClientError> {
        self.put(&format!("/admin/api/services/{}", id), Some(session), service)
            .await
    }

    pub async fn delete_service(&self, session: &Session, id: Uuid) -> Result<Message, ClientError> {
        self.delete(&format!("/admin/api/services/{}", id), Some(session))
            .await
    }

    // ── logistics ──

    pub async fn list_deliveries(&self, session: &Session) -> Result<Vec<Delivery>, ClientError> {
        self.get("/api/deliveries", Some(session)).await
    }

    pub async fn create_delivery(
        &self,
        session: &Session,
        delivery: &NewDelivery,
    ) -> Result<Delivery, ClientError> {
        self.post("/api/deliveries", Some(session), delivery).await
    }

    pub async fn update_delivery(
        &self,
        session: &Session,
        id: Uuid,
        edit: &DeliveryEdit,
    ) -> Result<Delivery, ClientError> {
        self.put(&format!("/api/deliveries/{}", id), Some(session), edit)
            .await
    }

    pub async fn list_shipments(&self, session: &Session) -> Result<Vec<Shipment>, ClientError> {
        self.get("/api/shipments", Some(session)).await
    }

    pub async fn create_shipment(
        &self,
        session: &Session,
        shipment: &NewShipment,
    ) -> Result<Shipment, ClientError> {
        self.post("/api/shipments", Some(session), shipment).await
    }

    /// Worker QR scan. No login needed.
    pub async fn register_scan(&self, scan: &Scan) -> Result<Track, ClientError> {
        self.post("/api/tracks", None, scan).await
    }

    // ── point of sale ──

    pub async fn record_sale(&self, session: &Session, sale: &NewSale) -> Result<Sale, ClientError> {
        self.post("/api/pos/transactions", Some(session), sale).await
    }

    pub async fn list_sales(&self, session: &Session, page: i64) -> Result<Paged<Sale>, ClientError> {
        let builder = self
            .request(Method::GET, "/api/pos/transactions", Some(session))
            .query(&[("page", page)]);
        self.send(builder).await
    }
}
