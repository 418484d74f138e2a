use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::order_service::Analytics;
use crate::domain::order::{OrderChanges, OrderFilter, OrderItem, OrderView, PlaceOrder};
use crate::domain::paging::Page;
use crate::domain::presentation::{priority_badge_class, status_badge_class};
use crate::domain::status::{OrderStatus, PaymentStatus, Priority, Transition};
use crate::errors::AppError;
use crate::export;
use crate::state::AppState;

use super::customers::CustomerResponse;
use super::{blocking, require_admin, require_customer, ErrorBody, MessageBody};

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub service_ids: Vec<Uuid>,
    pub pickup_date: Option<NaiveDate>,
    pub special_instructions: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub shipping_address: Option<Value>,
    pub priority: Option<Priority>,
}

impl From<PlaceOrderRequest> for PlaceOrder {
    fn from(r: PlaceOrderRequest) -> Self {
        PlaceOrder {
            customer_name: r.customer_name,
            customer_email: r.customer_email,
            customer_phone: r.customer_phone,
            service_ids: r.service_ids,
            pickup_date: r.pickup_date,
            special_instructions: r.special_instructions,
            shipping_address: r.shipping_address,
            priority: r.priority.unwrap_or_default(),
        }
    }
}

/// What a portal customer may change on their own order.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CustomerOrderUpdateRequest {
    pub pickup_date: Option<NaiveDate>,
    pub special_instructions: Option<String>,
    pub service_ids: Option<Vec<Uuid>>,
    #[schema(value_type = Option<Object>)]
    pub shipping_address: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminOrderUpdateRequest {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub service_ids: Option<Vec<Uuid>>,
    pub pickup_date: Option<NaiveDate>,
    pub special_instructions: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub shipping_address: Option<Value>,
    pub payment_status: Option<PaymentStatus>,
    pub priority: Option<Priority>,
    /// One workflow step forward or back, or `Cancelled`.
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub service_id: Uuid,
    pub name: String,
    pub price: String,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        OrderItemResponse {
            service_id: item.service_id,
            name: item.name,
            price: item.price.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub priority: Priority,
    /// Decimal as a string, e.g. "500.00"
    pub total_amount: String,
    pub items: Vec<OrderItemResponse>,
    pub pickup_date: Option<NaiveDate>,
    pub special_instructions: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub shipping_address: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub badge_class: String,
    pub priority_class: String,
    pub next_status: Option<OrderStatus>,
    pub previous_status: Option<OrderStatus>,
}

impl From<OrderView> for OrderResponse {
    fn from(o: OrderView) -> Self {
        OrderResponse {
            badge_class: status_badge_class(o.status.as_str()).to_string(),
            priority_class: priority_badge_class(o.priority).to_string(),
            next_status: o.status.next(),
            previous_status: o.status.previous(),
            id: o.id,
            order_number: o.order_number,
            customer_id: o.customer_id,
            customer_name: o.customer_name,
            customer_email: o.customer_email,
            customer_phone: o.customer_phone,
            status: o.status,
            payment_status: o.payment_status,
            priority: o.priority,
            total_amount: o.total_amount.to_string(),
            items: o.items.into_iter().map(OrderItemResponse::from).collect(),
            pickup_date: o.pickup_date,
            special_instructions: o.special_instructions,
            shipping_address: o.shipping_address,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlaceOrderResponse {
    pub order: OrderResponse,
    pub customer: CustomerResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl ListOrdersResponse {
    fn new(result: crate::domain::paging::ListResult<OrderView>, page: Page) -> Self {
        ListOrdersResponse {
            items: result.items.into_iter().map(OrderResponse::from).collect(),
            total: result.total,
            page: page.page,
            limit: page.limit,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCountResponse {
    pub status: OrderStatus,
    pub count: i64,
    pub badge_class: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUsageResponse {
    pub id: Uuid,
    pub name: String,
    pub usage_count: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub total_orders: i64,
    /// Revenue of all non-cancelled orders.
    pub total_revenue: String,
    /// Percentage of orders completed.
    pub completion_rate: f64,
    pub status_breakdown: Vec<StatusCountResponse>,
    pub top_services: Vec<ServiceUsageResponse>,
}

impl From<Analytics> for AnalyticsResponse {
    fn from(a: Analytics) -> Self {
        AnalyticsResponse {
            total_orders: a.stats.total_orders(),
            total_revenue: a.stats.revenue.to_string(),
            completion_rate: a.stats.completion_rate(),
            status_breakdown: OrderStatus::ALL
                .iter()
                .map(|status| StatusCountResponse {
                    status: *status,
                    count: a.stats.count_of(*status),
                    badge_class: status_badge_class(status.as_str()).to_string(),
                })
                .collect(),
            top_services: a
                .top_services
                .into_iter()
                .map(|s| ServiceUsageResponse {
                    id: s.id,
                    name: s.name,
                    usage_count: s.usage_count,
                })
                .collect(),
        }
    }
}

// ── Query parameters ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[serde(deny_unknown_fields)]
pub struct EmailParams {
    /// Email the orders were placed with.
    pub email: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(deny_unknown_fields)]
pub struct AdminOrderParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Workflow label ("Quality Check") or stored value ("quality_check").
    pub status: Option<String>,
    /// Matches order number, customer name or email.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Html,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(deny_unknown_fields)]
pub struct ExportParams {
    /// `csv` (default) or `html` for the printable report.
    pub format: Option<ExportFormat>,
    pub status: Option<String>,
    pub search: Option<String>,
}

fn page_of(page: Option<i64>, limit: Option<i64>) -> Page {
    let default = Page::default();
    Page::new(page.unwrap_or(default.page), limit.unwrap_or(default.limit))
}

fn filter_of(status: Option<&str>, search: Option<String>) -> Result<OrderFilter, AppError> {
    let status = match status.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(raw.parse::<OrderStatus>()?),
        None => None,
    };
    Ok(OrderFilter {
        email: None,
        status,
        search: search.filter(|s| !s.trim().is_empty()),
    })
}

// ── Customer portal ──────────────────────────────────────────────────────────

/// POST /api/orders
///
/// Places an order. The customer is found by email or created, prices come
/// from the active service catalog.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = PlaceOrderResponse),
        (status = 400, description = "Missing fields or unknown services", body = ErrorBody),
    ),
    tag = "orders"
)]
pub async fn place_order(
    state: web::Data<AppState>,
    body: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order = PlaceOrder::from(body.into_inner());

    let placed = blocking(move || state.orders.place_order(order)).await?;

    Ok(HttpResponse::Created().json(PlaceOrderResponse {
        order: placed.order.into(),
        customer: placed.customer.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(EmailParams),
    responses(
        (status = 200, description = "Orders placed with this email", body = ListOrdersResponse),
        (status = 400, description = "Email query param is required", body = ErrorBody),
    ),
    tag = "orders"
)]
pub async fn list_customer_orders(
    state: web::Data<AppState>,
    query: web::Query<EmailParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = page_of(params.page, params.limit);

    let result =
        blocking(move || state.orders.orders_for_email(params.email.as_deref(), page)).await?;

    Ok(HttpResponse::Ok().json(ListOrdersResponse::new(result, page)))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = CustomerOrderUpdateRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 401, description = "Not logged in", body = ErrorBody),
        (status = 403, description = "Order belongs to another customer", body = ErrorBody),
        (status = 404, description = "Order not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn update_customer_order(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<CustomerOrderUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let customer = require_customer(&state, &req).await?;
    let id = path.into_inner();
    let body = body.into_inner();
    let changes = OrderChanges {
        pickup_date: body.pickup_date,
        special_instructions: body.special_instructions,
        service_ids: body.service_ids,
        shipping_address: body.shipping_address,
        ..Default::default()
    };

    let order = blocking(move || state.orders.update_as_customer(&customer, id, changes)).await?;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
        ("email" = String, Query, description = "Email the order was placed with"),
    ),
    responses(
        (status = 200, description = "Order deleted", body = MessageBody),
        (status = 400, description = "Email query param is required", body = ErrorBody),
        (status = 401, description = "Email mismatch", body = ErrorBody),
        (status = 404, description = "Order not found", body = ErrorBody),
    ),
    tag = "orders"
)]
pub async fn delete_customer_order(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<EmailParams>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let email = query.into_inner().email;

    blocking(move || state.orders.delete_as_customer(id, email.as_deref())).await?;

    Ok(HttpResponse::Ok().json(MessageBody::new("Order deleted")))
}

/// GET /api/orders/{id}/qr
///
/// The JSON payload printed into the order's QR label.
#[utoipa::path(
    get,
    path = "/api/orders/{id}/qr",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "QR label payload", content_type = "application/json"),
        (status = 404, description = "Order not found", body = ErrorBody),
    ),
    tag = "orders"
)]
pub async fn order_qr(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let payload = blocking(move || state.orders.qr_payload(id)).await?;

    Ok(HttpResponse::Ok().json(payload))
}

// ── Admin back office ────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/admin/api/orders",
    params(AdminOrderParams),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 400, description = "Unknown status filter", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<AdminOrderParams>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let params = query.into_inner();
    let page = page_of(params.page, params.limit);
    let filter = filter_of(params.status.as_deref(), params.search)?;

    let result = blocking(move || state.orders.list_orders(&filter, page)).await?;

    Ok(HttpResponse::Ok().json(ListOrdersResponse::new(result, page)))
}

#[utoipa::path(
    get,
    path = "/admin/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let id = path.into_inner();

    let order = blocking(move || state.orders.get_order(id)).await?;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

#[utoipa::path(
    put,
    path = "/admin/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = AdminOrderUpdateRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 404, description = "Order not found", body = ErrorBody),
        (status = 409, description = "Status change not allowed", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn update_order(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<AdminOrderUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let id = path.into_inner();
    let body = body.into_inner();
    let status = body.status;
    let changes = OrderChanges {
        customer_name: body.customer_name,
        customer_email: body.customer_email,
        customer_phone: body.customer_phone,
        service_ids: body.service_ids,
        pickup_date: body.pickup_date,
        special_instructions: body.special_instructions,
        shipping_address: body.shipping_address,
        payment_status: body.payment_status,
        priority: body.priority,
    };

    let order = blocking(move || state.orders.edit_order(id, changes, status)).await?;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

#[utoipa::path(
    delete,
    path = "/admin/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order deleted", body = MessageBody),
        (status = 404, description = "Order not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn delete_order(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let id = path.into_inner();

    blocking(move || state.orders.delete_order(id)).await?;

    Ok(HttpResponse::Ok().json(MessageBody::new("Order deleted")))
}

async fn apply_transition(
    state: web::Data<AppState>,
    req: HttpRequest,
    id: Uuid,
    transition: Transition,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;

    let order = blocking(move || state.orders.transition(id, transition)).await?;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// POST /admin/api/orders/{id}/advance
///
/// Moves the order one step forward in the workflow.
#[utoipa::path(
    post,
    path = "/admin/api/orders/{id}/advance",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order advanced", body = OrderResponse),
        (status = 409, description = "Order is completed or cancelled", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn advance_order(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    apply_transition(state, req, path.into_inner(), Transition::Advance).await
}

#[utoipa::path(
    post,
    path = "/admin/api/orders/{id}/revert",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order moved back one step", body = OrderResponse),
        (status = 409, description = "Order is pending, completed or cancelled", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn revert_order(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    apply_transition(state, req, path.into_inner(), Transition::Revert).await
}

#[utoipa::path(
    post,
    path = "/admin/api/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order cancelled", body = OrderResponse),
        (status = 409, description = "Order is completed or already cancelled", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn cancel_order(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    apply_transition(state, req, path.into_inner(), Transition::Cancel).await
}

/// GET /admin/api/orders/export
///
/// Every matching order as a CSV download, or as a printable HTML report
/// with `format=html`.
#[utoipa::path(
    get,
    path = "/admin/api/orders/export",
    params(ExportParams),
    responses(
        (status = 200, description = "CSV file or HTML report", content_type = "text/csv"),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn export_orders(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<ExportParams>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let params = query.into_inner();
    let filter = filter_of(params.status.as_deref(), params.search)?;

    let orders = blocking(move || state.orders.export_orders(&filter)).await?;
    let now = Utc::now();

    match params.format.unwrap_or(ExportFormat::Csv) {
        ExportFormat::Csv => Ok(HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}\"",
                    export::download_name("orders", now.date_naive(), "csv")
                ),
            ))
            .body(export::orders_csv(&orders))),
        ExportFormat::Html => Ok(HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(export::orders_report_html(&orders, now))),
    }
}

#[utoipa::path(
    get,
    path = "/admin/api/analytics",
    responses(
        (status = 200, description = "Dashboard summary", body = AnalyticsResponse),
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn analytics(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;

    let analytics = blocking(move || state.orders.analytics()).await?;

    Ok(HttpResponse::Ok().json(AnalyticsResponse::from(analytics)))
}
