use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::repo_types::{MealFields, MealRecord, MealRow};
use super::store::{MealStore, StoreError, StoreResult};
use crate::session::SessionToken;

/// Postgres-backed [`MealStore`]. Ties on `datetime` are ordered by the
/// identity column `seq`, which follows insertion order.
#[derive(Clone)]
pub struct PgMealStore {
    db: PgPool,
}

impl PgMealStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn storage(err: sqlx::Error, what: &'static str) -> StoreError {
    StoreError::Storage(anyhow::Error::new(err).context(what))
}

#[async_trait]
impl MealStore for PgMealStore {
    async fn create(&self, owner: &SessionToken, fields: MealFields) -> StoreResult<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO meals (id, owner_token, name, description, datetime, on_diet)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(owner.as_str())
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.datetime)
        .bind(fields.on_diet)
        .execute(&self.db)
        .await
        .map_err(|e| storage(e, "insert meal"))?;
        debug!(meal_id = %id, "meal row inserted");
        Ok(id)
    }

    async fn list(&self, owner: &SessionToken) -> StoreResult<Vec<MealRecord>> {
        let rows = sqlx::query_as::<_, MealRow>(
            r#"
            SELECT id, owner_token, name, description, datetime, on_diet
            FROM meals
            WHERE owner_token = $1
            ORDER BY datetime ASC, seq ASC
            "#,
        )
        .bind(owner.as_str())
        .fetch_all(&self.db)
        .await
        .map_err(|e| storage(e, "list meals"))?;
        Ok(rows.into_iter().map(MealRecord::from).collect())
    }

    async fn get(&self, owner: &SessionToken, id: Uuid) -> StoreResult<MealRecord> {
        let row = sqlx::query_as::<_, MealRow>(
            r#"
            SELECT id, owner_token, name, description, datetime, on_diet
            FROM meals
            WHERE id = $1 AND owner_token = $2
            "#,
        )
        .bind(id)
        .bind(owner.as_str())
        .fetch_optional(&self.db)
        .await
        .map_err(|e| storage(e, "get meal"))?;
        row.map(MealRecord::from).ok_or(StoreError::NotFound)
    }

    async fn update(&self, owner: &SessionToken, id: Uuid, fields: MealFields) -> StoreResult<()> {
        let res = sqlx::query(
            r#"
            UPDATE meals
               SET name = $3, description = $4, datetime = $5, on_diet = $6
             WHERE id = $1 AND owner_token = $2
            "#,
        )
        .bind(id)
        .bind(owner.as_str())
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.datetime)
        .bind(fields.on_diet)
        .execute(&self.db)
        .await
        .map_err(|e| storage(e, "update meal"))?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, owner: &SessionToken, id: Uuid) -> StoreResult<()> {
        let res = sqlx::query("DELETE FROM meals WHERE id = $1 AND owner_token = $2")
            .bind(id)
            .bind(owner.as_str())
            .execute(&self.db)
            .await
            .map_err(|e| storage(e, "delete meal"))?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
