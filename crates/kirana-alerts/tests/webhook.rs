//! Integration tests for `AlertClient` using wiremock HTTP mocks.

use chrono::Utc;
use rust_decimal::Decimal;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kirana_alerts::{AlertClient, AlertError, OrderAlert};
use kirana_core::{GeoPoint, LineItem, Order, OrderStatus, Unit};

fn sample_order() -> Order {
    Order {
        id: 42,
        customer_name: "Asha".to_string(),
        mobile: "9876543210".to_string(),
        address: "12B, Gandhi Nagar".to_string(),
        location: GeoPoint {
            latitude: 10.0,
            longitude: 20.0,
        },
        items: vec![LineItem {
            name: "Tata Salt".to_string(),
            qty: 2,
            price: Decimal::new(20, 0),
            cost_price: None,
            pack_size: Some("1 kg".to_string()),
            unit: Unit::Pkt,
            image_url: String::new(),
        }],
        total: Decimal::new(40, 0),
        payment_method: "COD".to_string(),
        status: OrderStatus::Received,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn send_posts_the_structured_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_partial_json(serde_json::json!({
            "order_id": 42,
            "customer": "Asha",
            "mobile": "9876543210",
            "payment_method": "COD",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = AlertClient::new(&format!("{}/hook", server.uri()), 5)
        .expect("client construction should not fail");
    let alert = OrderAlert::from_order(&sample_order());

    client.send(&alert).await.expect("delivery should succeed");
}

#[tokio::test]
async fn non_2xx_response_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = AlertClient::new(&server.uri(), 5).expect("client construction should not fail");
    let err = client
        .send(&OrderAlert::from_order(&sample_order()))
        .await
        .unwrap_err();

    assert!(matches!(err, AlertError::UnexpectedStatus { status: 500 }));
}

#[tokio::test]
async fn detached_send_swallows_failures() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = AlertClient::new(&server.uri(), 5).expect("client construction should not fail");

    // Must not panic or propagate anything; the spawned task logs and drops
    // the failure.
    client.send_detached(OrderAlert::from_order(&sample_order()));

    // Give the detached task time to run before the mock server asserts
    // its expectation on drop.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
}
