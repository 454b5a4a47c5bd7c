use crate::config::{AppConfig, StoreBackend};
use crate::db;
use crate::meals::{MealStore, MemoryMealStore, PgMealStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MealStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let store = match config.store_backend {
            StoreBackend::Postgres => {
                let pool = db::connect(&config).await?;
                Arc::new(PgMealStore::new(pool)) as Arc<dyn MealStore>
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory meal store; records are lost on restart");
                Arc::new(MemoryMealStore::new()) as Arc<dyn MealStore>
            }
        };

        Ok(Self { store, config })
    }

    pub fn from_parts(store: Arc<dyn MealStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// State backed by a fresh in-memory store and default config.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            store_backend: StoreBackend::Memory,
            ..AppConfig::default()
        });
        Self::from_parts(Arc::new(MemoryMealStore::new()), config)
    }
}
