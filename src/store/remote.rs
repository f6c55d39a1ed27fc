use async_trait::async_trait;
use futures::FutureExt;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::warn;

use super::{ItemStore, StoreError, StoreResult};
use crate::db::run_in_tx;
use crate::model::{Item, ItemCategory, ItemShape};

/// The production adapter for the authoritative store: sqlx over SQLite,
/// every operation scoped to one owner. This is the only channel to durable
/// shared state; nothing else in the crate touches the `items` table.
#[derive(Clone)]
pub struct SqliteItemStore {
    pool: SqlitePool,
}

impl SqliteItemStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

const ITEM_COLUMNS: &str = "id, owner_id, name, category, shape, colors, price, purchase_price, \
     usage_count, is_sold, selling_price, notes, photo_url, created_at, updated_at";

fn category_from_str(raw: &str) -> ItemCategory {
    match raw {
        "Flap" => ItemCategory::Flap,
        "Body" => ItemCategory::Body,
        "Handle" => ItemCategory::Handle,
        "Accessory" => ItemCategory::Accessory,
        _ => ItemCategory::Combination,
    }
}

fn shape_from_str(raw: &str) -> Option<ItemShape> {
    match raw {
        "Square" => Some(ItemShape::Square),
        "Round" => Some(ItemShape::Round),
        "Mini" => Some(ItemShape::Mini),
        _ => None,
    }
}

fn row_to_item(row: &SqliteRow) -> Result<Item, sqlx::Error> {
    let colors_raw: String = row.try_get("colors")?;
    let colors = serde_json::from_str::<Vec<String>>(&colors_raw).unwrap_or_else(|err| {
        warn!(
            target: "piecekeeper",
            event = "item_colors_decode_failed",
            error = %err
        );
        Vec::new()
    });
    let category: String = row.try_get("category")?;
    let shape: Option<String> = row.try_get("shape")?;
    Ok(Item {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        name: row.try_get("name")?,
        category: category_from_str(&category),
        shape: shape.as_deref().and_then(shape_from_str),
        colors,
        price: row.try_get("price")?,
        purchase_price: row.try_get("purchase_price")?,
        usage_count: row.try_get("usage_count")?,
        is_sold: row.try_get::<i64, _>("is_sold")? != 0,
        selling_price: row.try_get("selling_price")?,
        notes: row.try_get("notes")?,
        photo_url: row.try_get("photo_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn colors_json(item: &Item) -> String {
    serde_json::to_string(&item.colors).unwrap_or_else(|_| "[]".to_string())
}

#[async_trait]
impl ItemStore for SqliteItemStore {
    async fn list(&self, owner_id: &str) -> StoreResult<Vec<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE owner_id = ? ORDER BY name ASC");
        let rows = sqlx::query(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from)?;
        rows.iter()
            .map(|row| row_to_item(row).map_err(StoreError::from))
            .collect()
    }

    async fn bulk_insert(&self, owner_id: &str, items: &[Item]) -> StoreResult<()> {
        let owner_id = owner_id.to_string();
        let items = items.to_vec();
        run_in_tx(&self.pool, move |tx| {
            async move {
                for item in &items {
                    sqlx::query(
                        "INSERT INTO items (id, owner_id, name, category, shape, colors, price, \
                         purchase_price, usage_count, is_sold, selling_price, notes, photo_url, \
                         created_at, updated_at) \
                         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    )
                    .bind(&item.id)
                    .bind(&owner_id)
                    .bind(&item.name)
                    .bind(item.category.as_str())
                    .bind(item.shape.map(|s| s.as_str()))
                    .bind(colors_json(item))
                    .bind(item.price)
                    .bind(item.purchase_price)
                    .bind(item.usage_count)
                    .bind(item.is_sold as i64)
                    .bind(item.selling_price)
                    .bind(&item.notes)
                    .bind(&item.photo_url)
                    .bind(item.created_at)
                    .bind(item.updated_at)
                    .execute(&mut **tx)
                    .await?;
                }
                Ok(())
            }
            .boxed()
        })
        .await
    }

    async fn upsert(&self, owner_id: &str, item: &Item) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO items (id, owner_id, name, category, shape, colors, price, \
             purchase_price, usage_count, is_sold, selling_price, notes, photo_url, \
             created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET \
             name = excluded.name, category = excluded.category, shape = excluded.shape, \
             colors = excluded.colors, price = excluded.price, \
             purchase_price = excluded.purchase_price, usage_count = excluded.usage_count, \
             is_sold = excluded.is_sold, selling_price = excluded.selling_price, \
             notes = excluded.notes, photo_url = excluded.photo_url, \
             updated_at = excluded.updated_at",
        )
        .bind(&item.id)
        .bind(owner_id)
        .bind(&item.name)
        .bind(item.category.as_str())
        .bind(item.shape.map(|s| s.as_str()))
        .bind(colors_json(item))
        .bind(item.price)
        .bind(item.purchase_price)
        .bind(item.usage_count)
        .bind(item.is_sold as i64)
        .bind(item.selling_price)
        .bind(&item.notes)
        .bind(&item.photo_url)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;
        Ok(())
    }

    async fn delete(&self, owner_id: &str, item_id: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM items WHERE owner_id = ? AND id = ?")
            .bind(owner_id)
            .bind(item_id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;
        Ok(())
    }

    async fn delete_all(&self, owner_id: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM items WHERE owner_id = ?")
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;
        Ok(())
    }
}
