//! # Product Repository
//!
//! Load and replace the `products` table.
//!
//! Rows are read back in `position` order, which is the order products
//! were registered in.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use stockbook_core::{Money, Product};

/// One row of the `products` table.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    sku: String,
    name: String,
    initial_quantity: i64,
    remaining_quantity: i64,
    unit_price_cents: i64,
    image_ref: Option<String>,
}

impl ProductRow {
    fn into_product(self) -> StoreResult<Product> {
        Product::restore(
            self.sku,
            self.name,
            self.initial_quantity,
            self.remaining_quantity,
            Money::from_cents(self.unit_price_cents),
            self.image_ref,
        )
        .map_err(|e| StoreError::invalid_row("products", e))
    }
}

/// Repository for the `products` table.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Every product, in registration order.
    pub async fn load_all(&self) -> StoreResult<Vec<Product>> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r#"
            SELECT sku, name, initial_quantity, remaining_quantity,
                   unit_price_cents, image_ref
            FROM products
            ORDER BY position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Loaded products");
        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Table replacement on an existing connection, so callers can group
    /// several tables in one transaction.
    pub(crate) async fn replace_all(conn: &mut SqliteConnection, products: &[Product]) -> StoreResult<()> {
        sqlx::query("DELETE FROM products")
            .execute(&mut *conn)
            .await?;

        for (position, product) in products.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO products (
                    position, sku, name, initial_quantity, remaining_quantity,
                    unit_price_cents, image_ref
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(position as i64)
            .bind(product.sku())
            .bind(product.name())
            .bind(product.initial_quantity())
            .bind(product.remaining_quantity())
            .bind(product.unit_price().cents())
            .bind(product.image_ref())
            .execute(&mut *conn)
            .await?;
        }

        debug!(count = products.len(), "Saved products");
        Ok(())
    }

    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
