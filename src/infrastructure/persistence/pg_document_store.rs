//! PostgreSQL implementation of the document store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{error, info};

use crate::config::Config;
use crate::domain::document::{Filter, Page};
use crate::domain::repositories::{DocumentStore, Upserted};
use crate::error::{AppError, map_sqlx_error};

/// Document store backed by a single `documents` table with a JSONB body.
///
/// Rows are keyed by `(collection, id)`; filters compile to `body #> path = value`
/// comparisons, so nested keys (such as a nickname origin) are matched exactly.
pub struct PgDocumentStore {
    pool: Arc<PgPool>,
}

impl PgDocumentStore {
    /// Creates a store over an existing pool. The schema must already be migrated.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Opens a pool from configuration and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the connection or a migration fails.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
            .connect(&config.database_url)
            .await?;
        info!("Connected to database");

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self::new(Arc::new(pool)))
    }

    pub fn pool(&self) -> &PgPool {
        self.pool.as_ref()
    }
}

/// Appends `AND body #> '{path}' = value` for every condition.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    for condition in filter.conditions() {
        qb.push(" AND body #> ")
            .push_bind(condition.path().to_vec())
            .push("::text[] = ")
            .push_bind(Json(condition.value().clone()))
            .push("::jsonb");
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        page: Page,
    ) -> Result<Vec<Value>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT body FROM documents WHERE collection = ");
        qb.push_bind(collection.to_string());
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY seq");

        if let Some(limit) = page.limit {
            qb.push(" LIMIT ").push_bind(limit as i64);
        }
        if page.offset > 0 {
            qb.push(" OFFSET ").push_bind(page.offset as i64);
        }

        let rows: Vec<Json<Value>> = qb
            .build_query_scalar()
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(|Json(body)| body).collect())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, AppError> {
        let mut qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM documents WHERE collection = ");
        qb.push_bind(collection.to_string());
        push_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count as u64)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, AppError> {
        let row: Option<Json<Value>> = sqlx::query_scalar(
            r#"
            SELECT body
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|Json(body)| body))
    }

    async fn upsert(
        &self,
        collection: &str,
        id: &str,
        key_field: &str,
        mut document: Value,
    ) -> Result<Upserted, AppError> {
        match document.as_object_mut() {
            Some(fields) => {
                fields.insert("id".to_string(), Value::String(id.to_string()));
            }
            None => {
                return Err(AppError::internal(
                    "Document must be a JSON object",
                    serde_json::json!({ "collection": collection, "id": id }),
                ));
            }
        }

        // xmax is zero only for a freshly inserted row version.
        // Natural keys are guarded by the unique indexes in migrations.
        let (Json(body), created): (Json<Value>, bool) = sqlx::query_as(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET body = EXCLUDED.body, updated_at = NOW()
            RETURNING body, (xmax = 0) AS created
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(&document))
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| match map_sqlx_error(e) {
            AppError::Conflict { details, .. } => AppError::conflict(
                format!("{} with this {} already exists", collection, key_field),
                serde_json::json!({
                    "collection": collection,
                    "key_field": key_field,
                    "constraint": details["constraint"],
                }),
            ),
            other => other,
        })?;

        Ok(Upserted {
            document: body,
            created,
        })
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> bool {
        match sqlx::query("SELECT 1").execute(self.pool.as_ref()).await {
            Ok(_) => true,
            Err(e) => {
                error!("Database health check failed: {}", e);
                false
            }
        }
    }
}
