use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::domain::{Entity, EntityId};

/// Persistence for one entity type.
///
/// `create` assigns the identifier; whatever id the caller put on the entity
/// is ignored. `update` yields `None` when no row carries the entity's id.
/// `delete` is idempotent.
#[async_trait]
pub trait Store<E>: Send + Sync {
    async fn read(&self) -> Result<Vec<E>>;
    async fn read_by_id(&self, id: EntityId) -> Result<Option<E>>;
    async fn create(&self, entity: E) -> Result<E>;
    async fn update(&self, entity: E) -> Result<Option<E>>;
    async fn delete(&self, id: EntityId) -> Result<()>;
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Product {
    const KIND: &'static str = "product";

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, created_at, updated_at";

#[async_trait]
impl Store<Product> for Storage {
    async fn read(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY rowid"
        ))
        .fetch_all(&self.pool)
        .await
        .context("failed to list products")?;
        rows.iter().map(product_from_row).collect()
    }

    async fn read_by_id(&self, id: EntityId) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to load product {id}"))?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn create(&self, product: Product) -> Result<Product> {
        let id = EntityId::new();
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO products ({PRODUCT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.to_string())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert product")?;
        debug!(%id, "product created");
        product_from_row(&row)
    }

    async fn update(&self, product: Product) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "UPDATE products SET name = ?, description = ?, price = ?, updated_at = ?
             WHERE id = ?
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(Utc::now())
        .bind(product.id.to_string())
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to update product {}", product.id))?;
        debug!(id = %product.id, found = row.is_some(), "product updated");
        row.as_ref().map(product_from_row).transpose()
    }

    async fn delete(&self, id: EntityId) -> Result<()> {
        let removed = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete product {id}"))?
            .rows_affected();
        debug!(%id, removed, "product deleted");
        Ok(())
    }
}

fn product_from_row(row: &SqliteRow) -> Result<Product> {
    let raw_id: String = row.try_get("id")?;
    let id = raw_id
        .parse::<EntityId>()
        .with_context(|| format!("product row has malformed id '{raw_id}'"))?;
    Ok(Product {
        id,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
