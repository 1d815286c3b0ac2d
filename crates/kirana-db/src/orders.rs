//! Order store: append-only creation, status patching, range queries, the
//! most-recent-N live feed, and the returning-customer lookup.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;

use kirana_core::{GeoPoint, LineItem, NewOrder, Order, OrderStatus};

use crate::live::{spawn_feed, ChangeBus, Collection, LiveFeed};
use crate::DbError;

const ORDER_COLUMNS: &str = "id, customer_name, mobile, address, latitude, longitude, \
     items, total, payment_method, status, created_at";

/// Ceiling on the `LastDays` window, roughly a century. Day counts come in
/// unchecked from query parameters and CLI flags; anything past this is
/// clamped rather than fed into duration arithmetic.
const MAX_WINDOW_DAYS: i64 = 36_500;

fn window_start(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days.clamp(0, MAX_WINDOW_DAYS))
}

/// A row from the `orders` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub customer_name: String,
    pub mobile: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub items: Json<Vec<LineItem>>,
    pub total: Decimal,
    pub payment_method: String,
    /// Stored as text; parsed back into [`OrderStatus`] on read.
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl OrderRow {
    /// Maps the row back to the domain type.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidRow`] if the stored status string is not
    /// part of the order lifecycle.
    pub fn try_into_order(self) -> Result<Order, DbError> {
        let status = self
            .status
            .parse::<OrderStatus>()
            .map_err(|e| DbError::InvalidRow {
                key: format!("order {}", self.id),
                reason: e.to_string(),
            })?;
        Ok(Order {
            id: self.id,
            customer_name: self.customer_name,
            mobile: self.mobile,
            address: self.address,
            location: GeoPoint {
                latitude: self.latitude,
                longitude: self.longitude,
            },
            items: self.items.0,
            total: self.total,
            payment_method: self.payment_method,
            status,
            created_at: self.created_at,
        })
    }
}

/// One-shot query window for historical loads. Kept separate from the live
/// subscription: the default console view wants freshness on a small set,
/// report pulls want arbitrary history without live overhead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeFilter {
    /// Orders created within the last `n` days. Negative values mean "now";
    /// oversized values are clamped to a sane ceiling.
    LastDays(i64),
    /// Explicit inclusive window.
    Between {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Everything, bounded by the store's configured row cap.
    AllTime,
}

/// Fetches the most recent `limit` orders, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::InvalidRow`]
/// for an unmappable row.
pub async fn list_recent_orders(pool: &PgPool, limit: i64) -> Result<Vec<Order>, DbError> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(OrderRow::try_into_order).collect()
}

/// Handle over the `orders` collection.
#[derive(Debug, Clone)]
pub struct OrderStore {
    pool: PgPool,
    bus: ChangeBus,
    /// Row cap applied to [`RangeFilter::AllTime`] pulls.
    all_time_cap: i64,
}

impl OrderStore {
    #[must_use]
    pub fn new(pool: PgPool, bus: ChangeBus, all_time_cap: i64) -> Self {
        Self {
            pool,
            bus,
            all_time_cap,
        }
    }

    /// Appends a new order with a server-assigned creation timestamp and the
    /// initial `Received` status, returning the assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if the insert fails; nothing is written in
    /// that case.
    pub async fn create(&self, order: &NewOrder) -> Result<i64, DbError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO orders \
                 (customer_name, mobile, address, latitude, longitude, \
                  items, total, payment_method, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id",
        )
        .bind(&order.customer_name)
        .bind(&order.mobile)
        .bind(&order.address)
        .bind(order.location.latitude)
        .bind(order.location.longitude)
        .bind(Json(&order.items))
        .bind(order.total)
        .bind(&order.payment_method)
        .bind(OrderStatus::Received.as_str())
        .fetch_one(&self.pool)
        .await?;

        self.bus.notify(Collection::Orders);
        Ok(id)
    }

    /// Fetches a single order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] for an unknown id, [`DbError::Sqlx`]
    /// if the query fails.
    pub async fn get(&self, id: i64) -> Result<Order, DbError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)?;

        row.try_into_order()
    }

    /// Patches only the status field.
    ///
    /// The store deliberately does not enforce the forward-only progression;
    /// that policy lives in the advance operation, the only status writer.
    /// Last write wins on concurrent updates.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] when the id does not exist (a vanished
    /// order must not look like a success), [`DbError::Sqlx`] on failure.
    pub async fn set_status(&self, id: i64, status: OrderStatus) -> Result<(), DbError> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        self.bus.notify(Collection::Orders);
        Ok(())
    }

    /// One-shot fetch of the most recent `limit` orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if the query fails.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<Order>, DbError> {
        list_recent_orders(&self.pool, limit).await
    }

    /// One-shot historical fetch, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if the query fails.
    pub async fn query_range(&self, filter: RangeFilter) -> Result<Vec<Order>, DbError> {
        let rows = match filter {
            RangeFilter::LastDays(days) => {
                let since = window_start(days);
                sqlx::query_as::<_, OrderRow>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders \
                     WHERE created_at >= $1 \
                     ORDER BY created_at DESC, id DESC"
                ))
                .bind(since)
                .fetch_all(&self.pool)
                .await?
            }
            RangeFilter::Between { start, end } => {
                sqlx::query_as::<_, OrderRow>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders \
                     WHERE created_at >= $1 AND created_at <= $2 \
                     ORDER BY created_at DESC, id DESC"
                ))
                .bind(start)
                .bind(end)
                .fetch_all(&self.pool)
                .await?
            }
            RangeFilter::AllTime => {
                sqlx::query_as::<_, OrderRow>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders \
                     ORDER BY created_at DESC, id DESC LIMIT $1"
                ))
                .bind(self.all_time_cap)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(OrderRow::try_into_order).collect()
    }

    /// The single most recent order exactly matching `mobile`, for
    /// returning-customer prefill.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if the query fails.
    pub async fn find_by_mobile(&self, mobile: &str) -> Result<Option<Order>, DbError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE mobile = $1 \
             ORDER BY created_at DESC, id DESC LIMIT 1"
        ))
        .bind(mobile)
        .fetch_optional(&self.pool)
        .await?;

        row.map(OrderRow::try_into_order).transpose()
    }

    /// Live feed of the most recent `limit` orders: the current set
    /// immediately, then the full updated set after every order write.
    /// Drop the feed to unsubscribe.
    #[must_use]
    pub fn subscribe_recent(&self, limit: i64) -> LiveFeed<Order> {
        let pool = self.pool.clone();
        spawn_feed(self.bus.watch(), Collection::Orders, move || {
            let pool = pool.clone();
            async move { list_recent_orders(&pool, limit).await }
        })
    }
}
