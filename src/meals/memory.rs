use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::repo_types::{MealFields, MealRecord};
use super::store::{MealStore, StoreError, StoreResult};
use crate::session::SessionToken;

struct StoredMeal {
    seq: u64,
    record: MealRecord,
}

/// One owner's records. A bucket is `retired` once it has been emptied and
/// unlinked from the map; writers that still hold it must look it up again.
#[derive(Default)]
struct OwnerMeals {
    meals: Vec<StoredMeal>,
    retired: bool,
}

type Bucket = Arc<Mutex<OwnerMeals>>;

/// In-process [`MealStore`].
///
/// Records are bucketed per owner token and each bucket has its own lock, so
/// callers with different tokens never wait on one another. The bucket map
/// lock is only held while looking up, inserting or removing a bucket, and it
/// is always taken before a bucket lock, never while holding one.
#[derive(Default)]
pub struct MemoryMealStore {
    buckets: RwLock<HashMap<SessionToken, Bucket>>,
    next_seq: AtomicU64,
}

impl MemoryMealStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn bucket(&self, owner: &SessionToken) -> Option<Bucket> {
        self.buckets.read().await.get(owner).cloned()
    }

    async fn bucket_or_insert(&self, owner: &SessionToken) -> Bucket {
        if let Some(bucket) = self.bucket(owner).await {
            return bucket;
        }
        self.buckets
            .write()
            .await
            .entry(owner.clone())
            .or_default()
            .clone()
    }

    /// Unlinks `owner`'s bucket if it is still `bucket` and still empty.
    async fn retire_if_empty(&self, owner: &SessionToken, bucket: &Bucket) {
        let mut map = self.buckets.write().await;
        let mut owned = bucket.lock().await;
        if !owned.meals.is_empty() || owned.retired {
            return;
        }
        if map.get(owner).is_some_and(|b| Arc::ptr_eq(b, bucket)) {
            map.remove(owner);
        }
        owned.retired = true;
    }
}

#[async_trait]
impl MealStore for MemoryMealStore {
    async fn create(&self, owner: &SessionToken, fields: MealFields) -> StoreResult<Uuid> {
        loop {
            let bucket = self.bucket_or_insert(owner).await;
            let mut owned = bucket.lock().await;
            if owned.retired {
                // emptied by a concurrent delete; fetch the fresh bucket
                continue;
            }
            let id = Uuid::new_v4();
            // taken under the bucket lock so seq order matches insertion order
            let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
            owned.meals.push(StoredMeal {
                seq,
                record: MealRecord::new(id, owner.clone(), fields),
            });
            return Ok(id);
        }
    }

    async fn list(&self, owner: &SessionToken) -> StoreResult<Vec<MealRecord>> {
        let Some(bucket) = self.bucket(owner).await else {
            return Ok(Vec::new());
        };
        let mut snapshot: Vec<(u64, MealRecord)> = bucket
            .lock()
            .await
            .meals
            .iter()
            .map(|m| (m.seq, m.record.clone()))
            .collect();
        snapshot.sort_by_key(|(seq, record)| (record.datetime, *seq));
        Ok(snapshot.into_iter().map(|(_, record)| record).collect())
    }

    async fn get(&self, owner: &SessionToken, id: Uuid) -> StoreResult<MealRecord> {
        let bucket = self.bucket(owner).await.ok_or(StoreError::NotFound)?;
        let owned = bucket.lock().await;
        owned
            .meals
            .iter()
            .find(|m| m.record.id == id)
            .map(|m| m.record.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, owner: &SessionToken, id: Uuid, fields: MealFields) -> StoreResult<()> {
        let bucket = self.bucket(owner).await.ok_or(StoreError::NotFound)?;
        let mut owned = bucket.lock().await;
        let meal = owned
            .meals
            .iter_mut()
            .find(|m| m.record.id == id)
            .ok_or(StoreError::NotFound)?;
        meal.record.apply(fields);
        Ok(())
    }

    async fn delete(&self, owner: &SessionToken, id: Uuid) -> StoreResult<()> {
        let bucket = self.bucket(owner).await.ok_or(StoreError::NotFound)?;
        let now_empty = {
            let mut owned = bucket.lock().await;
            let pos = owned
                .meals
                .iter()
                .position(|m| m.record.id == id)
                .ok_or(StoreError::NotFound)?;
            owned.meals.remove(pos);
            owned.meals.is_empty()
        };
        if now_empty {
            self.retire_if_empty(owner, &bucket).await;
        }
        Ok(())
    }
}
