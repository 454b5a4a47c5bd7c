use async_trait::async_trait;
use uuid::Uuid;

use super::repo_types::{MealFields, MealRecord};
use crate::session::SessionToken;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with that id belongs to the caller. A record owned by
    /// another session is reported the same way.
    #[error("meal not found")]
    NotFound,
    #[error("storage unavailable")]
    Storage(#[source] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Owner-scoped persistence for meal records.
///
/// Every operation takes the owner token; a record is only visible to, and
/// only mutable by, the token that created it.
#[async_trait]
pub trait MealStore: Send + Sync {
    /// Stores a new record and returns its freshly assigned id.
    async fn create(&self, owner: &SessionToken, fields: MealFields) -> StoreResult<Uuid>;

    /// All records of `owner`, by datetime ascending with ties in insertion order.
    async fn list(&self, owner: &SessionToken) -> StoreResult<Vec<MealRecord>>;

    async fn get(&self, owner: &SessionToken, id: Uuid) -> StoreResult<MealRecord>;

    async fn update(&self, owner: &SessionToken, id: Uuid, fields: MealFields) -> StoreResult<()>;

    async fn delete(&self, owner: &SessionToken, id: Uuid) -> StoreResult<()>;
}
