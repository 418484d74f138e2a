pub mod auth;
pub mod customers;
pub mod deliveries;
pub mod health;
pub mod orders;
pub mod pos;
pub mod products;
pub mod services;
pub mod shipments;
pub mod spa;
pub mod tracks;

use std::str::FromStr;

use actix_web::http::header;
use actix_web::{web, HttpRequest};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::auth::{Role, Session};
use crate::domain::customer::CustomerView;
use crate::domain::errors::DomainError;
use crate::domain::paging::Page;
use crate::errors::AppError;
use crate::state::AppState;

/// Runs synchronous service code on the blocking pool.
pub(crate) async fn blocking<F, T>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)
}

fn unauthorized() -> AppError {
    AppError::Unauthorized("Unauthorized".to_string())
}

/// Token from an `Authorization: Bearer <uuid>` header.
pub(crate) fn bearer_token(req: &HttpRequest) -> Result<Uuid, AppError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(unauthorized)?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .ok_or_else(unauthorized)?;
    Uuid::parse_str(token.trim()).map_err(|_| unauthorized())
}

pub(crate) async fn require_admin(
    state: &web::Data<AppState>,
    req: &HttpRequest,
) -> Result<Session, AppError> {
    let token = bearer_token(req)?;
    let state = state.clone();
    blocking(move || state.auth.authenticate(token, Role::Admin)).await
}

pub(crate) async fn require_customer(
    state: &web::Data<AppState>,
    req: &HttpRequest,
) -> Result<CustomerView, AppError> {
    let token = bearer_token(req)?;
    let state = state.clone();
    blocking(move || state.auth.current_customer(token)).await
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(deny_unknown_fields)]
pub struct PageParams {
    /// Page number (1-based). Defaults to 1.
    pub page: Option<i64>,
    /// Number of items per page. Defaults to 20, maximum 100.
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> Page {
        let default = Page::default();
        Page::new(
            self.page.unwrap_or(default.page),
            self.limit.unwrap_or(default.limit),
        )
    }
}

/// Money travels as a decimal string ("199.50") to avoid float rounding.
pub(crate) fn parse_money(field: &str, raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw.trim())
        .map_err(|_| AppError::BadRequest(format!("Invalid {} '{}'", field, raw)))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Malformed JSON bodies are answered with 400 and the usual error shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}
