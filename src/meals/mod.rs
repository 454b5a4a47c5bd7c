mod dto;
pub mod handlers;
mod memory;
mod repo;
mod repo_types;
mod store;

use crate::state::AppState;
use axum::Router;

pub use memory::MemoryMealStore;
pub use repo::PgMealStore;
pub use repo_types::{MealFields, MealRecord};
pub use store::{MealStore, StoreError, StoreResult};

pub fn router() -> Router<AppState> {
    handlers::meal_routes()
}
