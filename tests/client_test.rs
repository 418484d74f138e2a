//! REST client against a mocked FabClean API.

use fabclean_service::client::models::{NewOrder, Scan};
use fabclean_service::client::{ApiClient, ClientError, Session};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn delivery_json(id: Uuid) -> serde_json::Value {
    json!({
        "id": id,
        "orderId": null,
        "driverName": "John Doe",
        "vehicleId": "TRK-101",
        "status": "in_transit",
        "badgeClass": "bg-blue-100 text-blue-800",
        "estimatedDelivery": null,
        "actualDelivery": null,
        "location": {"lat": 12.97, "lng": 77.59},
        "route": null,
        "createdAt": "2025-09-10T08:30:00Z",
        "updatedAt": "2025-09-10T08:30:00Z"
    })
}

#[tokio::test]
async fn session_token_is_sent_as_bearer() {
    let server = MockServer::start().await;
    let session = Session::new(Uuid::new_v4());
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/api/deliveries"))
        .and(header("authorization", format!("Bearer {}", session.token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([delivery_json(id)])))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let deliveries = client.list_deliveries(&session).await.unwrap();

    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].id, id);
    assert_eq!(deliveries[0].driver_name, "John Doe");
}

#[tokio::test]
async fn server_error_message_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "Missing fields"})))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let order = NewOrder {
        customer_name: String::new(),
        customer_email: "jane@example.com".to_string(),
        customer_phone: "555-0100".to_string(),
        service_ids: vec![Uuid::new_v4()],
        pickup_date: None,
        special_instructions: None,
        shipping_address: None,
        priority: None,
    };

    match client.place_order(&order).await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Missing fields");
        }
        other => panic!("expected an API error, got {:?}", other),
    }
}

#[tokio::test]
async fn unauthorized_is_its_own_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/api/services"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Unauthorized"})))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let err = client
        .list_services(&Session::new(Uuid::new_v4()))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized(ref m) if m == "Unauthorized"));
}

#[tokio::test]
async fn non_json_error_falls_back_to_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .and(query_param("email", "jane@example.com"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let err = client.orders_by_email("jane@example.com").await.unwrap_err();

    assert_eq!(err.to_string(), "Request failed with status 502");
}

#[tokio::test]
async fn worker_scan_needs_no_session() {
    let server = MockServer::start().await;
    let track_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/api/tracks"))
        .and(body_json(json!({
            "workerName": "Ravi",
            "workerEmail": "ravi@fabclean.in",
            "orderData": "ORD-1234ABCD"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": track_id,
            "workerName": "Ravi",
            "workerEmail": "ravi@fabclean.in",
            "orderRef": "ORD-1234ABCD",
            "orderStatus": null,
            "location": null,
            "orderData": "ORD-1234ABCD",
            "scannedAt": "2025-09-10T08:30:00Z"
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(format!("{}/", server.uri()));
    let track = client
        .register_scan(&Scan {
            worker_name: "Ravi".to_string(),
            worker_email: "ravi@fabclean.in".to_string(),
            order_data: "ORD-1234ABCD".to_string(),
            order_status: None,
            location: None,
        })
        .await
        .unwrap();

    assert_eq!(track.id, track_id);
    assert_eq!(track.order_ref, "ORD-1234ABCD");
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    // Nothing listens on the discard port.
    let client = ApiClient::new("http://127.0.0.1:9");
    let err = client.active_services().await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
}
