//! Domain types and pure logic for the kirana storefront: products, orders,
//! the client-local cart, checkout validation, sales reporting, and
//! application configuration.

mod app_config;
mod cart;
mod checkout;
mod config;
mod order;
mod product;
mod reporting;

pub use app_config::{AppConfig, Environment, PaymentsConfig};
pub use cart::{Cart, CartLine};
pub use checkout::{build_order, compose_address, CheckoutError, CheckoutForm};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use order::{GeoPoint, InvalidStatus, LineItem, NewOrder, Order, OrderStatus};
pub use product::{
    derive_product_id, product_categories, validate_image_url, NewProduct, Product, ProductError,
    Unit,
};
pub use reporting::{summarize_sales, LedgerRow, SalesSummary};
