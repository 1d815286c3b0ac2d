use std::net::SocketAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Payment gateway credentials. Present only when all three
/// `KIRANA_PAYMENTS_*` variables are configured; absence disables the
/// prepaid checkout path.
#[derive(Clone)]
pub struct PaymentsConfig {
    pub base_url: String,
    pub key_id: String,
    pub key_secret: String,
}

impl std::fmt::Debug for PaymentsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentsConfig")
            .field("base_url", &self.base_url)
            .field("key_id", &self.key_id)
            .field("key_secret", &"[redacted]")
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Timeout applied to outbound HTTP (alert webhook, payment gateway).
    pub http_timeout_secs: u64,
    /// Size of the admin console's live most-recent-orders window.
    pub live_orders_limit: i64,
    /// Row cap for "all time" report pulls.
    pub report_max_rows: i64,
    /// Destination of the fire-and-forget order alert; `None` disables it.
    pub alert_webhook_url: Option<String>,
    pub payments: Option<PaymentsConfig>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("live_orders_limit", &self.live_orders_limit)
            .field("report_max_rows", &self.report_max_rows)
            .field("alert_webhook_url", &self.alert_webhook_url)
            .field("payments", &self.payments)
            .finish()
    }
}
