use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::logistics::{DeliveryChanges, DeliveryView, NewDelivery};
use crate::domain::presentation::status_badge_class;
use crate::domain::status::DeliveryStatus;
use crate::errors::AppError;
use crate::state::AppState;

use super::{blocking, require_admin, ErrorBody};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateDeliveryRequest {
    pub order_id: Option<Uuid>,
    #[serde(default)]
    pub driver_name: String,
    #[serde(default)]
    pub vehicle_id: String,
    pub estimated_delivery: Option<DateTime<Utc>>,
    #[schema(value_type = Option<Object>)]
    pub route: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateDeliveryRequest {
    pub driver_name: Option<String>,
    pub vehicle_id: Option<String>,
    pub status: Option<DeliveryStatus>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    /// `{ "lat": number, "lng": number }`
    #[schema(value_type = Option<Object>)]
    pub location: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub route: Option<Value>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResponse {
    pub id: Uuid,
    pub order_id: Option<Uuid>,
    pub driver_name: String,
    pub vehicle_id: String,
    pub status: DeliveryStatus,
    pub badge_class: String,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
    #[schema(value_type = Option<Object>)]
    pub location: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub route: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DeliveryView> for DeliveryResponse {
    fn from(d: DeliveryView) -> Self {
        DeliveryResponse {
            id: d.id,
            order_id: d.order_id,
            driver_name: d.driver_name,
            vehicle_id: d.vehicle_id,
            status: d.status,
            badge_class: status_badge_class(d.status.as_str()).to_string(),
            estimated_delivery: d.estimated_delivery,
            actual_delivery: d.actual_delivery,
            location: d.location,
            route: d.route,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/deliveries",
    responses(
        (status = 200, description = "Deliveries, newest first", body = [DeliveryResponse]),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "logistics"
)]
pub async fn list_deliveries(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;

    let deliveries = blocking(move || state.logistics.list_deliveries()).await?;

    let body: Vec<DeliveryResponse> = deliveries.into_iter().map(DeliveryResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    post,
    path = "/api/deliveries",
    request_body = CreateDeliveryRequest,
    responses(
        (status = 201, description = "Delivery scheduled", body = DeliveryResponse),
        (status = 400, description = "Missing fields or unknown order", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "logistics"
)]
pub async fn create_delivery(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateDeliveryRequest>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let body = body.into_inner();
    let delivery = NewDelivery {
        order_id: body.order_id,
        driver_name: body.driver_name,
        vehicle_id: body.vehicle_id,
        estimated_delivery: body.estimated_delivery,
        route: body.route,
    };

    let created = blocking(move || state.logistics.create_delivery(delivery)).await?;

    Ok(HttpResponse::Created().json(DeliveryResponse::from(created)))
}

#[utoipa::path(
    get,
    path = "/api/deliveries/{id}",
    params(("id" = Uuid, Path, description = "Delivery UUID")),
    responses(
        (status = 200, description = "Delivery found", body = DeliveryResponse),
        (status = 404, description = "Delivery not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "logistics"
)]
pub async fn get_delivery(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let id = path.into_inner();

    let delivery = blocking(move || state.logistics.get_delivery(id)).await?;

    Ok(HttpResponse::Ok().json(DeliveryResponse::from(delivery)))
}

/// PUT /api/deliveries/{id}
///
/// Marking a delivery `delivered` stamps `actualDelivery`.
#[utoipa::path(
    put,
    path = "/api/deliveries/{id}",
    params(("id" = Uuid, Path, description = "Delivery UUID")),
    request_body = UpdateDeliveryRequest,
    responses(
        (status = 200, description = "Delivery updated", body = DeliveryResponse),
        (status = 400, description = "Invalid location", body = ErrorBody),
        (status = 404, description = "Delivery not found", body = ErrorBody),
        (status = 409, description = "Status change not allowed", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "logistics"
)]
pub async fn update_delivery(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<UpdateDeliveryRequest>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let id = path.into_inner();
    let body = body.into_inner();
    let changes = DeliveryChanges {
        driver_name: body.driver_name,
        vehicle_id: body.vehicle_id,
        status: body.status,
        estimated_delivery: body.estimated_delivery,
        actual_delivery: None,
        location: body.location,
        route: body.route,
    };

    let delivery = blocking(move || state.logistics.update_delivery(id, changes)).await?;

    Ok(HttpResponse::Ok().json(DeliveryResponse::from(delivery)))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{json, Value};

    use crate::handlers::test_support::{admin_token, api, state};

    #[actix_web::test]
    async fn delivery_lifecycle() {
        let (state, store) = state();
        let app = api!(state);
        let token = admin_token(&state);

        let req = test::TestRequest::post()
            .uri("/api/deliveries")
            .insert_header(("Authorization", token.clone()))
            .set_json(json!({
                "orderId": store.sample_order(),
                "driverName": "John Doe",
                "vehicleId": "TRK-101"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["status"], "pending");
        let uri = format!("/api/deliveries/{}", created["id"].as_str().unwrap());

        let put = |body: Value| {
            test::TestRequest::put()
                .uri(&uri)
                .insert_header(("Authorization", token.clone()))
                .set_json(body)
                .to_request()
        };

        let resp = test::call_service(&app, put(json!({"location": {"lat": 12.9}}))).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::call_and_read_body_json(
            &app,
            put(json!({"status": "in_transit", "location": {"lat": 12.97, "lng": 77.59}})),
        )
        .await;
        assert_eq!(body["status"], "in_transit");
        assert_eq!(body["actualDelivery"], Value::Null);

        let body: Value =
            test::call_and_read_body_json(&app, put(json!({"status": "delivered"}))).await;
        assert!(body["actualDelivery"].is_string());
        assert_eq!(body["badgeClass"], "bg-green-100 text-green-800");

        let resp = test::call_service(&app, put(json!({"status": "pending"}))).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn missing_driver_is_400() {
        let (state, _store) = state();
        let app = api!(state);

        let req = test::TestRequest::post()
            .uri("/api/deliveries")
            .insert_header(("Authorization", admin_token(&state)))
            .set_json(json!({"vehicleId": "TRK-101"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
