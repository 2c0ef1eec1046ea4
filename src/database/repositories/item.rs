use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{ItemRepository, RepositoryError, is_unique_violation};
use crate::database::models::{Item, ItemChanges, ItemListQuery, NewItem};

const ITEM_COLUMNS: &str =
    "id, sku, name, category, quantity, price, is_active, created_at, updated_at";

/// 库存条目存储库实现
#[derive(Clone)]
pub struct PgItemRepository {
    pool: PgPool,
}

impl PgItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn list(&self, query: &ItemListQuery) -> Result<Vec<Item>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM items", ITEM_COLUMNS));

        if let Some(category) = &query.category {
            qb.push(" WHERE category = ").push_bind(category.clone());
        }

        // column names come from SortField, never from the request
        match query.sort {
            Some(sort) => {
                qb.push(" ORDER BY ")
                    .push(sort.field.column())
                    .push(if sort.descending { " DESC" } else { " ASC" })
                    .push(", id ASC");
            }
            None => {
                qb.push(" ORDER BY created_at ASC, id ASC");
            }
        }

        qb.push(" OFFSET ")
            .push_bind(query.skip)
            .push(" LIMIT ")
            .push_bind(query.limit);

        let items = qb.build_query_as::<Item>().fetch_all(&self.pool).await?;
        Ok(items)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Item>, RepositoryError> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "SELECT {} FROM items WHERE id = $1",
            ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn create(&self, item: NewItem) -> Result<Item, RepositoryError> {
        let id = Uuid::new_v4().to_string();

        let result = sqlx::query_as::<_, Item>(&format!(
            r#"
            INSERT INTO items (id, sku, name, category, quantity, price, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE, NOW(), NOW())
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(&id)
        .bind(&item.sku)
        .bind(&item.name)
        .bind(&item.category)
        .bind(item.quantity)
        .bind(item.price)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(created) => {
                tracing::debug!("Created item {} ({})", created.id, created.sku);
                Ok(created)
            }
            Err(e) if is_unique_violation(&e) => Err(RepositoryError::Conflict("Item with this SKU")),
            Err(e) => {
                tracing::error!("Failed to create item: {:?}", e);
                Err(e.into())
            }
        }
    }

    async fn update(&self, id: &str, changes: ItemChanges) -> Result<Option<Item>, RepositoryError> {
        // $7 distinguishes "leave category alone" from "set it to NULL"
        let touch_category = changes.category.is_some();
        let item = sqlx::query_as::<_, Item>(&format!(
            r#"
            UPDATE items
            SET name = COALESCE($2, name),
                category = CASE WHEN $7 THEN $3 ELSE category END,
                quantity = COALESCE($4, quantity),
                price = COALESCE($5, price),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.category.flatten())
        .bind(changes.quantity)
        .bind(changes.price)
        .bind(changes.is_active)
        .bind(touch_category)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn delete(&self, id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
