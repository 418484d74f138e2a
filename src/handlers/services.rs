use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::catalog::{NewService, ServiceChanges, ServiceView};
use crate::domain::status::ServiceStatus;
use crate::errors::AppError;
use crate::state::AppState;

use super::{blocking, parse_money, require_admin, ErrorBody, MessageBody};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateServiceRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub description: Option<String>,
    /// Decimal price as a string, e.g. "199.00"
    pub price: String,
    #[serde(default)]
    pub duration: String,
    pub status: Option<ServiceStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub duration: Option<String>,
    pub status: Option<ServiceStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResponse {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price: String,
    pub duration: String,
    pub status: ServiceStatus,
    pub usage_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ServiceView> for ServiceResponse {
    fn from(s: ServiceView) -> Self {
        ServiceResponse {
            id: s.id,
            name: s.name,
            category: s.category,
            description: s.description,
            price: s.price.to_string(),
            duration: s.duration,
            status: s.status,
            usage_count: s.usage_count,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

fn respond(services: Vec<ServiceView>) -> HttpResponse {
    let body: Vec<ServiceResponse> = services.into_iter().map(ServiceResponse::from).collect();
    HttpResponse::Ok().json(body)
}

/// GET /api/services
///
/// The active catalog, as shown on the customer booking page.
#[utoipa::path(
    get,
    path = "/api/services",
    responses(
        (status = 200, description = "Active services", body = [ServiceResponse]),
    ),
    tag = "services"
)]
pub async fn list_active_services(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let services = blocking(move || state.catalog.active_services()).await?;
    Ok(respond(services))
}

#[utoipa::path(
    get,
    path = "/admin/api/services",
    responses(
        (status = 200, description = "Every service, active or not", body = [ServiceResponse]),
    ),
    security(("bearer" = [])),
    tag = "services"
)]
pub async fn list_services(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let services = blocking(move || state.catalog.all_services()).await?;
    Ok(respond(services))
}

#[utoipa::path(
    post,
    path = "/admin/api/services",
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Service created", body = ServiceResponse),
        (status = 400, description = "Missing fields or invalid price", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "services"
)]
pub async fn create_service(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateServiceRequest>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let body = body.into_inner();
    let service = NewService {
        price: parse_money("price", &body.price)?,
        name: body.name,
        category: body.category,
        description: body.description,
        duration: body.duration,
        status: body.status.unwrap_or_default(),
    };

    let created = blocking(move || state.catalog.create_service(service)).await?;

    Ok(HttpResponse::Created().json(ServiceResponse::from(created)))
}

#[utoipa::path(
    get,
    path = "/admin/api/services/{id}",
    params(("id" = Uuid, Path, description = "Service UUID")),
    responses(
        (status = 200, description = "Service found", body = ServiceResponse),
        (status = 404, description = "Service not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "services"
)]
pub async fn get_service(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let id = path.into_inner();

    let service = blocking(move || state.catalog.get_service(id)).await?;

    Ok(HttpResponse::Ok().json(ServiceResponse::from(service)))
}

#[utoipa::path(
    put,
    path = "/admin/api/services/{id}",
    params(("id" = Uuid, Path, description = "Service UUID")),
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Service updated", body = ServiceResponse),
        (status = 404, description = "Service not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "services"
)]
pub async fn update_service(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<UpdateServiceRequest>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let id = path.into_inner();
    let body = body.into_inner();
    let changes = ServiceChanges {
        price: body
            .price
            .as_deref()
            .map(|raw| parse_money("price", raw))
            .transpose()?,
        name: body.name,
        category: body.category,
        description: body.description,
        duration: body.duration,
        status: body.status,
    };

    let service = blocking(move || state.catalog.update_service(id, changes)).await?;

    Ok(HttpResponse::Ok().json(ServiceResponse::from(service)))
}

#[utoipa::path(
    delete,
    path = "/admin/api/services/{id}",
    params(("id" = Uuid, Path, description = "Service UUID")),
    responses(
        (status = 200, description = "Service deleted", body = MessageBody),
        (status = 404, description = "Service not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "services"
)]
pub async fn delete_service(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let id = path.into_inner();

    blocking(move || state.catalog.delete_service(id)).await?;

    Ok(HttpResponse::Ok().json(MessageBody::new("Service deleted")))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{json, Value};

    use crate::handlers::test_support::{admin_token, api, state};

    #[actix_web::test]
    async fn public_catalog_lists_active_services_by_name() {
        let (state, _store) = state();
        let app = api!(state);

        let req = test::TestRequest::get().uri("/api/services").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Dry Cleaning", "Ironing", "Laundry"]);
        assert_eq!(body[0]["price"], "300.00");
    }

    #[actix_web::test]
    async fn deactivated_service_leaves_public_catalog() {
        let (state, store) = state();
        let app = api!(state);
        let token = admin_token(&state);
        let ironing = store.service_ids()[2];

        let req = test::TestRequest::put()
            .uri(&format!("/admin/api/services/{}", ironing))
            .insert_header(("Authorization", token.clone()))
            .set_json(json!({"status": "Inactive", "price": "120.00"}))
            .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["status"], "Inactive");
        assert_eq!(updated["price"], "120.00");

        let req = test::TestRequest::get().uri("/api/services").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let req = test::TestRequest::get()
            .uri("/admin/api/services")
            .insert_header(("Authorization", token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn bad_price_is_rejected() {
        let (state, _store) = state();
        let app = api!(state);

        let req = test::TestRequest::post()
            .uri("/admin/api/services")
            .insert_header(("Authorization", admin_token(&state)))
            .set_json(json!({
                "name": "Steam Press",
                "category": "Press",
                "price": "cheap",
                "duration": "6h"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
