use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::logistics::{NewShipment, ShipmentView};
use crate::domain::presentation::status_badge_class;
use crate::domain::status::ShipmentStatus;
use crate::errors::AppError;
use crate::state::AppState;

use super::{blocking, require_admin, ErrorBody};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateShipmentRequest {
    #[serde(default)]
    pub store_id: String,
    #[serde(default)]
    pub staff_name: String,
    #[serde(default)]
    pub order_ids: Vec<Uuid>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentResponse {
    pub id: Uuid,
    /// Unified Tracking ID, e.g. `UTI-2025-001`.
    pub uti: String,
    pub store_id: String,
    pub staff_name: String,
    pub status: ShipmentStatus,
    pub badge_class: String,
    pub order_ids: Vec<Uuid>,
    pub package_count: usize,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ShipmentView> for ShipmentResponse {
    fn from(s: ShipmentView) -> Self {
        ShipmentResponse {
            package_count: s.package_count(),
            badge_class: status_badge_class(s.status.as_str()).to_string(),
            id: s.id,
            uti: s.uti,
            store_id: s.store_id,
            staff_name: s.staff_name,
            status: s.status,
            order_ids: s.order_ids,
            estimated_delivery: s.estimated_delivery,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/shipments",
    responses(
        (status = 200, description = "Shipments, newest first", body = [ShipmentResponse]),
    ),
    security(("bearer" = [])),
    tag = "logistics"
)]
pub async fn list_shipments(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;

    let shipments = blocking(move || state.logistics.list_shipments()).await?;

    let body: Vec<ShipmentResponse> = shipments.into_iter().map(ShipmentResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/shipments
///
/// Groups existing orders under a new UTI.
#[utoipa::path(
    post,
    path = "/api/shipments",
    request_body = CreateShipmentRequest,
    responses(
        (status = 201, description = "Shipment created", body = ShipmentResponse),
        (status = 400, description = "No orders selected or unknown order", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "logistics"
)]
pub async fn create_shipment(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateShipmentRequest>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let body = body.into_inner();
    let shipment = NewShipment {
        store_id: body.store_id,
        staff_name: body.staff_name,
        order_ids: body.order_ids,
        estimated_delivery: body.estimated_delivery,
    };

    let created = blocking(move || state.logistics.create_shipment(shipment)).await?;

    Ok(HttpResponse::Created().json(ShipmentResponse::from(created)))
}

#[utoipa::path(
    get,
    path = "/api/shipments/{id}",
    params(("id" = Uuid, Path, description = "Shipment UUID")),
    responses(
        (status = 200, description = "Shipment found", body = ShipmentResponse),
        (status = 404, description = "Shipment not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "logistics"
)]
pub async fn get_shipment(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let id = path.into_inner();

    let shipment = blocking(move || state.logistics.get_shipment(id)).await?;

    Ok(HttpResponse::Ok().json(ShipmentResponse::from(shipment)))
}

#[utoipa::path(
    post,
    path = "/api/shipments/{id}/advance",
    params(("id" = Uuid, Path, description = "Shipment UUID")),
    responses(
        (status = 200, description = "Shipment moved to its next status", body = ShipmentResponse),
        (status = 409, description = "Shipment already delivered", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "logistics"
)]
pub async fn advance_shipment(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let id = path.into_inner();

    let shipment = blocking(move || state.logistics.advance_shipment(id)).await?;

    Ok(HttpResponse::Ok().json(ShipmentResponse::from(shipment)))
}
