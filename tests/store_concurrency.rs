use std::sync::Arc;

use dietlog::meals::{MealFields, MealStore, MemoryMealStore, StoreError};
use dietlog::session::SessionToken;
use dietlog::summary::summarize;
use time::{macros::datetime, Duration};

fn fields(i: i64, on_diet: bool) -> MealFields {
    MealFields {
        name: format!("meal {}", i),
        description: "concurrent".into(),
        datetime: datetime!(2024-01-01 0:00 UTC) + Duration::minutes(i),
        on_diet,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn owners_write_in_parallel_without_mixing_records() {
    let store = Arc::new(MemoryMealStore::new());
    let owners: Vec<SessionToken> = (0..8).map(|_| SessionToken::generate()).collect();

    let mut tasks = Vec::new();
    for owner in owners.clone() {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            // insert newest first so ordering comes from the store, not the loop
            for i in (0..50).rev() {
                store.create(&owner, fields(i, i % 2 == 0)).await.unwrap();
            }
        }));
    }
    for t in tasks {
        t.await.unwrap();
    }

    for owner in &owners {
        let meals = store.list(owner).await.unwrap();
        assert_eq!(meals.len(), 50);
        assert!(meals.iter().all(|m| &m.owner_token == owner));
        assert!(meals.windows(2).all(|w| w[0].datetime < w[1].datetime));

        let summary = summarize(&meals);
        assert_eq!(summary.total, 50);
        assert_eq!(summary.on_diet_count, 25);
        assert_eq!(summary.best_streak, 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_update_and_delete_never_resurrect() {
    let store = Arc::new(MemoryMealStore::new());
    let owner = SessionToken::generate();

    for round in 0..100 {
        let id = store.create(&owner, fields(round, true)).await.unwrap();

        let updater = {
            let store = store.clone();
            let owner = owner.clone();
            tokio::spawn(async move { store.update(&owner, id, fields(round, false)).await })
        };
        let deleter = {
            let store = store.clone();
            let owner = owner.clone();
            tokio::spawn(async move { store.delete(&owner, id).await })
        };

        let updated = updater.await.unwrap();
        deleter.await.unwrap().unwrap();

        assert!(matches!(updated, Ok(()) | Err(StoreError::NotFound)));
        assert!(matches!(store.get(&owner, id).await, Err(StoreError::NotFound)));
    }
    assert!(store.list(&owner).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_leave_one_complete_version() {
    let store = Arc::new(MemoryMealStore::new());
    let owner = SessionToken::generate();
    let id = store.create(&owner, fields(0, true)).await.unwrap();

    let mut tasks = Vec::new();
    for i in 1..=20 {
        let store = store.clone();
        let owner = owner.clone();
        tasks.push(tokio::spawn(async move {
            store.update(&owner, id, fields(i, i % 2 == 0)).await
        }));
    }
    for t in tasks {
        t.await.unwrap().unwrap();
    }

    let meal = store.get(&owner, id).await.unwrap();
    let n: i64 = meal.name.trim_start_matches("meal ").parse().unwrap();
    // every field comes from the same update
    assert_eq!(meal.on_diet, n % 2 == 0);
    assert_eq!(meal.datetime, fields(n, true).datetime);
    assert_eq!(meal.id, id);
    assert_eq!(meal.owner_token, owner);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn emptying_a_bucket_never_loses_a_concurrent_create() {
    let store = Arc::new(MemoryMealStore::new());
    let owner = SessionToken::generate();

    for round in 0..200 {
        let doomed = store.create(&owner, fields(round, true)).await.unwrap();

        let deleter = {
            let store = store.clone();
            let owner = owner.clone();
            tokio::spawn(async move { store.delete(&owner, doomed).await })
        };
        let creator = {
            let store = store.clone();
            let owner = owner.clone();
            tokio::spawn(async move { store.create(&owner, fields(round, false)).await })
        };

        deleter.await.unwrap().unwrap();
        let kept = creator.await.unwrap().unwrap();

        let meal = store.get(&owner, kept).await.unwrap();
        assert!(!meal.on_diet);
        store.delete(&owner, kept).await.unwrap();
        assert!(store.list(&owner).await.unwrap().is_empty());
    }
}
