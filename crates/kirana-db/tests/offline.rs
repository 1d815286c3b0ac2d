//! Offline tests for kirana-db row mapping and pool configuration.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::types::Json;

use kirana_core::{AppConfig, Environment, LineItem, OrderStatus, Unit};
use kirana_db::{ChangeBus, OrderRow, OrderStore, PoolConfig, ProductRow, RangeFilter};

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        http_timeout_secs: 10,
        live_orders_limit: 20,
        report_max_rows: 500,
        alert_webhook_url: None,
        payments: None,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn product_row_maps_to_domain() {
    let row = ProductRow {
        id: "tata-salt".to_string(),
        name: "Tata Salt".to_string(),
        price: Decimal::new(25, 0),
        cost_price: Some(Decimal::new(20, 0)),
        category: "Grocery".to_string(),
        pack_size: Some("1 kg".to_string()),
        unit: "pkt".to_string(),
        stock: 12,
        image_url: "https://cdn.example.com/salt.jpg".to_string(),
        created_at: Utc::now(),
    };

    let product = row.try_into_product().expect("row should map");
    assert_eq!(product.id, "tata-salt");
    assert_eq!(product.unit, Unit::Pkt);
    assert_eq!(product.effective_cost(), Decimal::new(20, 0));
}

#[test]
fn product_row_with_unknown_unit_is_an_invalid_row() {
    let row = ProductRow {
        id: "tata-salt".to_string(),
        name: "Tata Salt".to_string(),
        price: Decimal::new(25, 0),
        cost_price: None,
        category: "Grocery".to_string(),
        pack_size: None,
        unit: "dozen".to_string(),
        stock: 0,
        image_url: String::new(),
        created_at: Utc::now(),
    };

    let err = row.try_into_product().unwrap_err();
    assert!(
        matches!(err, kirana_db::DbError::InvalidRow { ref key, .. } if key.contains("tata-salt")),
        "expected InvalidRow naming the product, got: {err:?}"
    );
}

fn order_row(status: &str) -> OrderRow {
    OrderRow {
        id: 7,
        customer_name: "Asha".to_string(),
        mobile: "9876543210".to_string(),
        address: "12B, Gandhi Nagar".to_string(),
        latitude: 10.0,
        longitude: 20.0,
        items: Json(vec![LineItem {
            name: "Tata Salt".to_string(),
            qty: 2,
            price: Decimal::new(20, 0),
            cost_price: None,
            pack_size: None,
            unit: Unit::Pkt,
            image_url: String::new(),
        }]),
        total: Decimal::new(40, 0),
        payment_method: "COD".to_string(),
        status: status.to_string(),
        created_at: Utc::now(),
    }
}

#[test]
fn order_row_maps_to_domain() {
    let order = order_row("Out for Delivery")
        .try_into_order()
        .expect("row should map");

    assert_eq!(order.id, 7);
    assert_eq!(order.status, OrderStatus::OutForDelivery);
    assert_eq!(order.location.latitude, 10.0);
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].qty, 2);
}

#[test]
fn order_row_with_unknown_status_is_an_invalid_row() {
    let err = order_row("Shipped").try_into_order().unwrap_err();
    assert!(
        matches!(err, kirana_db::DbError::InvalidRow { ref key, .. } if key.contains("order 7")),
        "expected InvalidRow naming the order, got: {err:?}"
    );
}

#[tokio::test]
async fn extreme_lastdays_window_is_a_query_error_not_a_panic() {
    // A lazy pool defers connecting, so the window arithmetic runs before
    // any I/O; the unreachable address then fails the query cleanly.
    let pool = sqlx::postgres::PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_millis(200))
        .connect_lazy("postgres://127.0.0.1:1/unreachable")
        .expect("lazy pool construction");
    let orders = OrderStore::new(pool, ChangeBus::new(), 500);

    for days in [i64::MAX, i64::MIN, -1] {
        let result = orders.query_range(RangeFilter::LastDays(days)).await;
        assert!(result.is_err(), "expected a connection error for {days}");
    }
}

#[test]
fn line_items_survive_json_round_trip() {
    let items = vec![LineItem {
        name: "Aashirvaad Atta".to_string(),
        qty: 1,
        price: Decimal::new(260, 0),
        cost_price: Some(Decimal::new(230, 0)),
        pack_size: Some("5".to_string()),
        unit: Unit::Kg,
        image_url: "https://cdn.example.com/atta.jpg".to_string(),
    }];

    let encoded = serde_json::to_string(&items).expect("items serialize");
    let decoded: Vec<LineItem> = serde_json::from_str(&encoded).expect("items deserialize");
    assert_eq!(decoded, items);
}
