use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::customer::{CustomerChanges, CustomerView, NewCustomer};
use crate::errors::AppError;
use crate::export;
use crate::state::AppState;

use super::{blocking, require_admin, ErrorBody, MessageBody, PageParams};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateCustomerRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub address: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub address: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub address: Option<Value>,
    pub total_orders: i32,
    /// Decimal as a string, e.g. "500.00"
    pub total_spent: String,
    pub last_order: Option<DateTime<Utc>>,
    /// Whether the customer can log in to the portal.
    pub has_account: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CustomerView> for CustomerResponse {
    fn from(c: CustomerView) -> Self {
        CustomerResponse {
            id: c.id,
            name: c.name,
            email: c.email,
            phone: c.phone,
            address: c.address,
            total_orders: c.total_orders,
            total_spent: c.total_spent.to_string(),
            last_order: c.last_order,
            has_account: c.has_password,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListCustomersResponse {
    pub items: Vec<CustomerResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/admin/api/customers",
    params(PageParams),
    responses(
        (status = 200, description = "Paginated list of customers", body = ListCustomersResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "customers"
)]
pub async fn list_customers(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<PageParams>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let page = query.page();

    let result = blocking(move || state.customers.list_customers(page)).await?;

    Ok(HttpResponse::Ok().json(ListCustomersResponse {
        items: result.items.into_iter().map(CustomerResponse::from).collect(),
        total: result.total,
        page: page.page,
        limit: page.limit,
    }))
}

#[utoipa::path(
    post,
    path = "/admin/api/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = CustomerResponse),
        (status = 400, description = "Missing fields or invalid email", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "customers"
)]
pub async fn create_customer(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateCustomerRequest>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let body = body.into_inner();
    let customer = NewCustomer {
        name: body.name,
        email: body.email,
        phone: body.phone,
        address: body.address,
        password_hash: None,
    };

    let created = blocking(move || state.customers.create_customer(customer)).await?;

    Ok(HttpResponse::Created().json(CustomerResponse::from(created)))
}

#[utoipa::path(
    get,
    path = "/admin/api/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer UUID")),
    responses(
        (status = 200, description = "Customer found", body = CustomerResponse),
        (status = 404, description = "Customer not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "customers"
)]
pub async fn get_customer(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let id = path.into_inner();

    let customer = blocking(move || state.customers.get_customer(id)).await?;

    Ok(HttpResponse::Ok().json(CustomerResponse::from(customer)))
}

#[utoipa::path(
    put,
    path = "/admin/api/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer UUID")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = CustomerResponse),
        (status = 404, description = "Customer not found", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "customers"
)]
pub async fn update_customer(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCustomerRequest>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let id = path.into_inner();
    let body = body.into_inner();
    let changes = CustomerChanges {
        name: body.name,
        email: body.email,
        phone: body.phone,
        address: body.address,
    };

    let customer = blocking(move || state.customers.update_customer(id, changes)).await?;

    Ok(HttpResponse::Ok().json(CustomerResponse::from(customer)))
}

#[utoipa::path(
    delete,
    path = "/admin/api/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer UUID")),
    responses(
        (status = 200, description = "Customer deleted", body = MessageBody),
        (status = 404, description = "Customer not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "customers"
)]
pub async fn delete_customer(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let id = path.into_inner();

    blocking(move || state.customers.delete_customer(id)).await?;

    Ok(HttpResponse::Ok().json(MessageBody::new("Customer deleted")))
}

/// GET /admin/api/customers/export
///
/// Every customer as a CSV download.
#[utoipa::path(
    get,
    path = "/admin/api/customers/export",
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv"),
    ),
    security(("bearer" = [])),
    tag = "customers"
)]
pub async fn export_customers(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;

    let customers = blocking(move || state.customers.all_customers()).await?;
    let filename = export::download_name("customers", Utc::now().date_naive(), "csv");

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(export::customers_csv(&customers)))
}
