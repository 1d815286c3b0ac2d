//! Catalog store: product persistence keyed by the derived slug, plus a
//! live full-set feed for storefront views.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use kirana_core::{NewProduct, Product, Unit};

use crate::live::{spawn_feed, ChangeBus, Collection, LiveFeed};
use crate::DbError;

const PRODUCT_COLUMNS: &str =
    "id, name, price, cost_price, category, pack_size, unit, stock, image_url, created_at";

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub cost_price: Option<Decimal>,
    pub category: String,
    pub pack_size: Option<String>,
    /// Stored as text; parsed back into [`Unit`] on read.
    pub unit: String,
    pub stock: i32,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl ProductRow {
    /// Maps the row back to the domain type.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidRow`] if the stored unit string is not a
    /// known unit.
    pub fn try_into_product(self) -> Result<Product, DbError> {
        let unit = self.unit.parse::<Unit>().map_err(|e| DbError::InvalidRow {
            key: format!("product {}", self.id),
            reason: e.to_string(),
        })?;
        Ok(Product {
            id: self.id,
            name: self.name,
            price: self.price,
            cost_price: self.cost_price,
            category: self.category,
            pack_size: self.pack_size,
            unit,
            stock: self.stock,
            image_url: self.image_url,
            created_at: self.created_at,
        })
    }
}

/// Fetches every product, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::InvalidRow`]
/// for an unmappable row.
pub async fn list_products(pool: &PgPool) -> Result<Vec<Product>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name"
    ))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ProductRow::try_into_product).collect()
}

/// Handle over the `products` collection. Cloning is cheap and shares the
/// pool and change bus.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    pool: PgPool,
    bus: ChangeBus,
}

impl CatalogStore {
    #[must_use]
    pub fn new(pool: PgPool, bus: ChangeBus) -> Self {
        Self { pool, bus }
    }

    /// Writes a product under its derived key. Saving the same name twice
    /// overwrites the earlier row (idempotent-overwrite contract); the
    /// original creation timestamp is kept.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Validation`] before any write when required
    /// fields are missing or the image link is not a direct link, and
    /// [`DbError::Sqlx`] if the upsert itself fails.
    pub async fn upsert(&self, product: &NewProduct) -> Result<Product, DbError> {
        product.validate()?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products \
                 (id, name, price, cost_price, category, pack_size, unit, stock, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (id) DO UPDATE SET \
                 name       = EXCLUDED.name, \
                 price      = EXCLUDED.price, \
                 cost_price = EXCLUDED.cost_price, \
                 category   = EXCLUDED.category, \
                 pack_size  = EXCLUDED.pack_size, \
                 unit       = EXCLUDED.unit, \
                 stock      = EXCLUDED.stock, \
                 image_url  = EXCLUDED.image_url \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(product.id())
        .bind(&product.name)
        .bind(product.price)
        .bind(product.cost_price)
        .bind(&product.category)
        .bind(&product.pack_size)
        .bind(product.unit.as_str())
        .bind(product.stock)
        .bind(&product.image_url)
        .fetch_one(&self.pool)
        .await?;

        self.bus.notify(Collection::Products);
        row.try_into_product()
    }

    /// Deletes a product. Idempotent: removing an absent id is a no-op and
    /// never disturbs other entries.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if the delete fails.
    pub async fn remove(&self, id: &str) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            self.bus.notify(Collection::Products);
        }
        Ok(())
    }

    /// One-shot fetch of all products, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlx`] if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, DbError> {
        list_products(&self.pool).await
    }

    /// Live feed of the full product set: the current set immediately, then
    /// again after every catalog change. Drop the feed to unsubscribe.
    #[must_use]
    pub fn subscribe(&self) -> LiveFeed<Product> {
        let pool = self.pool.clone();
        spawn_feed(self.bus.watch(), Collection::Products, move || {
            let pool = pool.clone();
            async move { list_products(&pool).await }
        })
    }
}
