use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::logistics::{NewScan, TrackView};
use crate::errors::AppError;
use crate::state::AppState;

use super::{blocking, require_admin, ErrorBody};

/// A worker's scan of an order's QR label.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScanRequest {
    #[serde(default)]
    pub worker_name: String,
    #[serde(default)]
    pub worker_email: String,
    /// Raw text read from the QR code.
    #[serde(default)]
    pub order_data: String,
    pub order_status: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackResponse {
    pub id: Uuid,
    pub worker_name: String,
    pub worker_email: String,
    pub order_ref: String,
    pub order_status: Option<String>,
    pub location: Option<String>,
    pub order_data: String,
    pub scanned_at: DateTime<Utc>,
}

impl From<TrackView> for TrackResponse {
    fn from(t: TrackView) -> Self {
        TrackResponse {
            id: t.id,
            worker_name: t.worker_name,
            worker_email: t.worker_email,
            order_ref: t.order_ref,
            order_status: t.order_status,
            location: t.location,
            order_data: t.order_data,
            scanned_at: t.scanned_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TrackParams {
    /// Restrict to scans of one order id or order number.
    pub order_ref: Option<String>,
}

/// POST /api/tracks (also mounted at POST /worker/scan)
///
/// Records a scan. Open to workers without a login.
#[utoipa::path(
    post,
    path = "/api/tracks",
    request_body = ScanRequest,
    responses(
        (status = 201, description = "Scan recorded", body = TrackResponse),
        (status = 400, description = "Missing required fields", body = ErrorBody),
    ),
    tag = "logistics"
)]
pub async fn record_scan(
    state: web::Data<AppState>,
    body: web::Json<ScanRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let scan = NewScan {
        worker_name: body.worker_name,
        worker_email: body.worker_email,
        order_data: body.order_data,
        order_status: body.order_status,
        location: body.location,
    };

    let track = blocking(move || state.logistics.record_scan(scan)).await?;

    Ok(HttpResponse::Created().json(TrackResponse::from(track)))
}

#[utoipa::path(
    get,
    path = "/api/tracks",
    params(TrackParams),
    responses(
        (status = 200, description = "Scans, newest first", body = [TrackResponse]),
    ),
    security(("bearer" = [])),
    tag = "logistics"
)]
pub async fn list_tracks(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<TrackParams>,
) -> Result<HttpResponse, AppError> {
    require_admin(&state, &req).await?;
    let order_ref = query.into_inner().order_ref;

    let tracks = blocking(move || state.logistics.list_tracks(order_ref.as_deref())).await?;

    let body: Vec<TrackResponse> = tracks.into_iter().map(TrackResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{json, Value};

    use crate::handlers::test_support::{admin_token, api, state};

    fn scan(order_data: &str) -> Value {
        json!({
            "workerName": "Ravi",
            "workerEmail": "ravi@fabclean.in",
            "orderData": order_data,
            "location": "Store 1"
        })
    }

    #[actix_web::test]
    async fn worker_scan_alias_records_json_label() {
        let (state, _store) = state();
        let app = api!(state);

        let req = test::TestRequest::post()
            .uri("/worker/scan")
            .set_json(scan(r#"{"orderId":"abc-123","orderNumber":"ORD-ABC"}"#))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["orderRef"], "abc-123");
    }

    #[actix_web::test]
    async fn tracks_filter_by_order_ref() {
        let (state, _store) = state();
        let app = api!(state);

        for data in ["ORD-1", "ORD-2", "ORD-1"] {
            let req = test::TestRequest::post()
                .uri("/api/tracks")
                .set_json(scan(data))
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::get()
            .uri("/api/tracks?orderRef=ORD-1")
            .insert_header(("Authorization", admin_token(&state)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn scan_without_worker_is_rejected() {
        let (state, _store) = state();
        let app = api!(state);

        let req = test::TestRequest::post()
            .uri("/api/tracks")
            .set_json(json!({"orderData": "ORD-1"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Missing required fields");
    }
}
