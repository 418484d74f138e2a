use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::inventory::{NewProduct, ProductChanges, ProductView};
use crate::domain::presentation::StockLevel;
use crate::errors::AppError;
use crate::state::AppState;

use super::{blocking, parse_money, require_admin, ErrorBody, MessageBody};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub category: String,
    pub description: Option<String>,
    /// Decimal as a string, e.g. "180.00"
    pub price: String,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default)]
    pub reorder_level: i32,
    pub supplier: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub stock_quantity: Option<i32>,
    pub reorder_level: Option<i32>,
    pub supplier: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub description: Option<String>,
    pub price: String,
    pub stock_quantity: i32,
    pub reorder_level: i32,
    pub supplier: Option<String>,
    pub stock_status: StockLevel,
    pub stock_class: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductView> for ProductResponse {
    fn from(p: ProductView) -> Self {
        let level = p.stock_level();
        ProductResponse {
            id: p.id,
            name: p.name,
            sku: p.sku,
            category: p.category,
            description: p.description,
            price: p.price.to_string(),
            stock_quantity: p.stock_quantity,
            reorder_level: p.reorder_level,
            supplier: p.supplier,
            stock_status: level,
            stock_class: level.css_class().to_string(),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

fn respond(products: Vec<ProductView>) -> HttpResponse {
    let body: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();
    HttpResponse::Ok().json(body)
}

#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "Products by name", body = [ProductResponse]),
    ),
    security(("bearer" = [])),
    tag = "inventory"
)]
pub async fn list_products(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let products = blocking(move || state.inventory.list_products()).await?;
    Ok(respond(products))
}

/// GET /api/products/low-stock
///
/// Products at or below their reorder level, emptiest first.
#[utoipa::path(
    get,
    path = "/api/products/low-stock",
    responses(
        (status = 200, description = "Products to reorder", body = [ProductResponse]),
    ),
    security(("bearer" = [])),
    tag = "inventory"
)]
pub async fn low_stock(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let products = blocking(move || state.inventory.low_stock()).await?;
    Ok(respond(products))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Missing fields or invalid numbers", body = ErrorBody),
        (status = 409, description = "SKU exists", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "inventory"
)]
pub async fn create_product(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let body = body.into_inner();
    let product = NewProduct {
        price: parse_money("price", &body.price)?,
        name: body.name,
        sku: body.sku,
        category: body.category,
        description: body.description,
        stock_quantity: body.stock_quantity,
        reorder_level: body.reorder_level,
        supplier: body.supplier,
    };

    let created = blocking(move || state.inventory.create_product(product)).await?;

    Ok(HttpResponse::Created().json(ProductResponse::from(created)))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "inventory"
)]
pub async fn get_product(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let id = path.into_inner();

    let product = blocking(move || state.inventory.get_product(id)).await?;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 404, description = "Product not found", body = ErrorBody),
        (status = 409, description = "SKU exists", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "inventory"
)]
pub async fn update_product(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let id = path.into_inner();
    let body = body.into_inner();
    let changes = ProductChanges {
        price: body
            .price
            .as_deref()
            .map(|raw| parse_money("price", raw))
            .transpose()?,
        name: body.name,
        sku: body.sku,
        category: body.category,
        description: body.description,
        stock_quantity: body.stock_quantity,
        reorder_level: body.reorder_level,
        supplier: body.supplier,
    };

    let product = blocking(move || state.inventory.update_product(id, changes)).await?;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product deleted", body = MessageBody),
        (status = 404, description = "Product not found", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "inventory"
)]
pub async fn delete_product(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let id = path.into_inner();

    blocking(move || state.inventory.delete_product(id)).await?;

    Ok(HttpResponse::Ok().json(MessageBody::new("Product deleted")))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{json, Value};

    use crate::handlers::test_support::{admin_token, api, state};

    fn product(sku: &str, stock: i32) -> Value {
        json!({
            "name": format!("Detergent {}", sku),
            "sku": sku,
            "category": "Supplies",
            "price": "180.00",
            "stockQuantity": stock,
            "reorderLevel": 10
        })
    }

    #[actix_web::test]
    async fn products_carry_stock_status() {
        let (state, _store) = state();
        let app = api!(state);
        let token = admin_token(&state);

        for (sku, stock) in [("DET-1", 0), ("DET-2", 8), ("DET-3", 50)] {
            let req = test::TestRequest::post()
                .uri("/api/products")
                .insert_header(("Authorization", token.clone()))
                .set_json(product(sku, stock))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::get()
            .uri("/api/products/low-stock")
            .insert_header(("Authorization", token.clone()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[0]["stockStatus"], "Out of Stock");
        assert_eq!(body[0]["stockClass"], "status-error");
        assert_eq!(body[1]["stockStatus"], "Low Stock");

        let req = test::TestRequest::post()
            .uri("/api/products")
            .insert_header(("Authorization", token))
            .set_json(product("DET-1", 5))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "SKU exists");
    }

    #[actix_web::test]
    async fn unknown_product_is_404() {
        let (state, _store) = state();
        let app = api!(state);

        let req = test::TestRequest::get()
            .uri(&format!("/api/products/{}", uuid::Uuid::new_v4()))
            .insert_header(("Authorization", admin_token(&state)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Product not found");
    }
}
