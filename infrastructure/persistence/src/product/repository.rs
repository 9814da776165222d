use async_trait::async_trait;
use sqlx::{Connection, FromRow, PgConnection, PgPool, Postgres, Transaction};

use business::domain::errors::RepositoryError;
use business::domain::product::model::{Product, ProductRow};
use business::domain::product::repository::{ProductRepository, ProductUpsertTransaction};

use super::entity::{EntityError, PRODUCT_COLUMNS, ProductEntity};

pub struct ProductRepositoryPostgres {
    pool: PgPool,
}

impl ProductRepositoryPostgres {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for ProductRepositoryPostgres {
    async fn get_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM products ORDER BY name ASC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to query products: {}", err);
            RepositoryError::DatabaseError
        })?;

        let products = rows
            .iter()
            .filter_map(|row| {
                match ProductEntity::from_row(row)
                    .map_err(EntityError::from)
                    .and_then(ProductEntity::into_domain)
                {
                    Ok(product) => Some(product),
                    Err(err) => {
                        tracing::warn!("Skipping unreadable product row: {}", err);
                        None
                    }
                }
            })
            .collect();

        Ok(products)
    }

    async fn begin_bulk_upsert(
        &self,
    ) -> Result<Box<dyn ProductUpsertTransaction>, RepositoryError> {
        let tx = self.pool.begin().await.map_err(|err| {
            tracing::error!("Failed to begin transaction: {}", err);
            RepositoryError::Transaction
        })?;

        Ok(Box::new(ProductUpsertTransactionPostgres { tx }))
    }
}

/// Batch transaction. Each row runs under its own savepoint so that a failed statement
/// only discards that row instead of aborting the whole transaction.
pub struct ProductUpsertTransactionPostgres {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ProductUpsertTransaction for ProductUpsertTransactionPostgres {
    async fn upsert_by_name(&mut self, row: &ProductRow) -> Result<Product, RepositoryError> {
        let mut savepoint = Connection::begin(&mut *self.tx).await.map_err(|err| {
            tracing::error!("Failed to open savepoint: {}", err);
            RepositoryError::Transaction
        })?;

        match upsert_and_fetch(&mut savepoint, row).await {
            Ok(product) => {
                savepoint.commit().await.map_err(|err| {
                    tracing::error!("Failed to release savepoint: {}", err);
                    RepositoryError::Transaction
                })?;
                Ok(product)
            }
            Err(err) => {
                if let Err(rollback_err) = savepoint.rollback().await {
                    tracing::error!("Failed to roll back savepoint: {}", rollback_err);
                }
                Err(err)
            }
        }
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.commit().await.map_err(|err| {
            tracing::error!("Failed to commit transaction: {}", err);
            RepositoryError::Transaction
        })
    }
}

async fn upsert_and_fetch(
    conn: &mut PgConnection,
    row: &ProductRow,
) -> Result<Product, RepositoryError> {
    let qty = i32::try_from(row.qty).map_err(|_| RepositoryError::DatabaseError)?;

    // out_of_stock and updated_at are also maintained by the products trigger.
    sqlx::query(
        r#"INSERT INTO products (id, name, image, price, qty)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (name) DO UPDATE SET
            image = EXCLUDED.image,
            price = EXCLUDED.price,
            qty = EXCLUDED.qty,
            updated_at = NOW(),
            out_of_stock = (EXCLUDED.qty = 0)"#,
    )
    .bind(row.id)
    .bind(&row.name)
    .bind(&row.image)
    .bind(row.price.as_decimal().clone())
    .bind(qty)
    .execute(&mut *conn)
    .await
    .map_err(|err| {
        tracing::warn!("Upsert of product {} failed: {}", row.name, err);
        RepositoryError::DatabaseError
    })?;

    let entity = sqlx::query_as::<_, ProductEntity>(&format!(
        "SELECT {} FROM products WHERE name = $1",
        PRODUCT_COLUMNS
    ))
    .bind(&row.name)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|err| {
        tracing::warn!("Re-read of product {} failed: {}", row.name, err);
        RepositoryError::DatabaseError
    })?
    .ok_or(RepositoryError::NotFound)?;

    entity.into_domain().map_err(|err| {
        tracing::warn!("Stored product {} is unreadable: {}", row.name, err);
        RepositoryError::DatabaseError
    })
}
