use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::pos::{NewTransaction, TransactionItem, TransactionView};
use crate::domain::status::PaymentMethod;
use crate::errors::AppError;
use crate::state::AppState;

use super::{blocking, parse_money, require_admin, ErrorBody, PageParams};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransactionItemRequest {
    #[serde(default)]
    pub name: String,
    pub quantity: i32,
    /// Decimal as a string, e.g. "40.00"
    pub unit_price: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTransactionRequest {
    #[serde(default)]
    pub items: Vec<TransactionItemRequest>,
    pub payment_method: PaymentMethod,
    pub cashier_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionItemResponse {
    pub name: String,
    pub quantity: i32,
    pub unit_price: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: Uuid,
    /// `TXN-YYYYMMDD-XXXXXX`
    pub transaction_number: String,
    pub items: Vec<TransactionItemResponse>,
    pub total_amount: String,
    pub payment_method: PaymentMethod,
    pub cashier_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<TransactionView> for TransactionResponse {
    fn from(t: TransactionView) -> Self {
        TransactionResponse {
            id: t.id,
            transaction_number: t.transaction_number,
            items: t
                .items
                .into_iter()
                .map(|item| TransactionItemResponse {
                    name: item.name,
                    quantity: item.quantity,
                    unit_price: item.unit_price.to_string(),
                })
                .collect(),
            total_amount: t.total_amount.to_string(),
            payment_method: t.payment_method,
            cashier_id: t.cashier_id,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListTransactionsResponse {
    pub items: Vec<TransactionResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// POST /api/pos/transactions
///
/// Records a counter sale. The total is computed here, never taken from the
/// till.
#[utoipa::path(
    post,
    path = "/api/pos/transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Sale recorded", body = TransactionResponse),
        (status = 400, description = "Empty ticket or invalid line", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "pos"
)]
pub async fn create_transaction(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateTransactionRequest>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let body = body.into_inner();
    let items = body
        .items
        .into_iter()
        .map(|item| {
            Ok(TransactionItem {
                unit_price: parse_money("unitPrice", &item.unit_price)?,
                name: item.name,
                quantity: item.quantity,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;
    let transaction = NewTransaction {
        items,
        payment_method: body.payment_method,
        cashier_id: body.cashier_id,
    };

    let recorded = blocking(move || state.pos.record_sale(transaction)).await?;

    Ok(HttpResponse::Created().json(TransactionResponse::from(recorded)))
}

#[utoipa::path(
    get,
    path = "/api/pos/transactions",
    params(PageParams),
    responses(
        (status = 200, description = "Sales, newest first", body = ListTransactionsResponse),
    ),
    security(("bearer" = [])),
    tag = "pos"
)]
pub async fn list_transactions(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<PageParams>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let page = query.page();

    let result = blocking(move || state.pos.list_sales(page)).await?;

    Ok(HttpResponse::Ok().json(ListTransactionsResponse {
        items: result.items.into_iter().map(TransactionResponse::from).collect(),
        total: result.total,
        page: page.page,
        limit: page.limit,
    }))
}
