//! # Kit Repository
//!
//! Load and replace the `kits` table.
//!
//! ```text
//! kits table (one row per component)        Kit records
//! ──────────────────────────────────        ─────────────────────────
//! K1 │ A1 │ 2 │ k1.png                 ┐
//! K1 │ A2 │ 3 │ k1.png                 ┴──► K1 { A1×2, A2×3 } k1.png
//! K2 │ A1 │ 1 │ NULL                   ───► K2 { A1×1 }
//! ```
//!
//! The kit image is repeated on every component row; the first row wins on
//! load.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use stockbook_core::{Kit, KitComponent};

#[derive(Debug, sqlx::FromRow)]
struct KitRow {
    kit_name: String,
    component_sku: String,
    component_quantity: i64,
    image_ref: Option<String>,
}

/// Repository for the `kits` table.
#[derive(Debug, Clone)]
pub struct KitRepository {
    pool: SqlitePool,
}

impl KitRepository {
    pub fn new(pool: SqlitePool) -> Self {
        KitRepository { pool }
    }

    /// Every kit, in composition order, with components grouped back.
    ///
    /// Component existence is not checked here; the ledger does that when
    /// the catalog is restored.
    pub async fn load_all(&self) -> StoreResult<Vec<Kit>> {
        let rows: Vec<KitRow> = sqlx::query_as(
            r#"
            SELECT kit_name, component_sku, component_quantity, image_ref
            FROM kits
            ORDER BY position
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(rows = rows.len(), "Loaded kit rows");

        let mut grouped: Vec<(String, Vec<KitComponent>, Option<String>)> = Vec::new();
        for row in rows {
            let component = KitComponent::new(row.component_sku, row.component_quantity);
            match grouped.iter_mut().find(|(name, _, _)| *name == row.kit_name) {
                Some((_, components, image_ref)) => {
                    components.push(component);
                    if image_ref.is_none() {
                        *image_ref = row.image_ref;
                    }
                }
                None => grouped.push((row.kit_name, vec![component], row.image_ref)),
            }
        }

        grouped
            .into_iter()
            .map(|(name, components, image_ref)| {
                Kit::restore(name, components, image_ref)
                    .map_err(|e| StoreError::invalid_row("kits", e))
            })
            .collect()
    }

    pub(crate) async fn replace_all(conn: &mut SqliteConnection, kits: &[Kit]) -> StoreResult<()> {
        sqlx::query("DELETE FROM kits").execute(&mut *conn).await?;

        let mut position: i64 = 0;
        for kit in kits {
            for component in kit.components() {
                sqlx::query(
                    r#"
                    INSERT INTO kits (
                        position, kit_name, component_sku, component_quantity, image_ref
                    ) VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                )
                .bind(position)
                .bind(kit.name())
                .bind(&component.sku)
                .bind(component.quantity)
                .bind(kit.image_ref())
                .execute(&mut *conn)
                .await?;
                position += 1;
            }
        }

        debug!(kits = kits.len(), rows = position, "Saved kits");
        Ok(())
    }
}
