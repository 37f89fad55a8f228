use crate::config::AppConfig;
use crate::store::{MemoryStore, PgStore, Store};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let store = if config.uses_memory_store() {
            tracing::warn!("DATABASE_URL selects the in-memory store; data is lost on exit");
            Arc::new(MemoryStore::new()) as Arc<dyn Store>
        } else {
            Arc::new(PgStore::connect(&config.database_url).await?) as Arc<dyn Store>
        };

        Ok(Self::from_parts(store, Arc::new(config)))
    }

    pub fn from_parts(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::JwtConfig;

        let config = Arc::new(AppConfig {
            database_url: "memory://".into(),
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 60 * 24,
            },
            reset_ttl_minutes: 60,
            cors_origins: vec!["*".into()],
            debug: true,
            host: "127.0.0.1".into(),
            port: 0,
        });

        Self::from_parts(Arc::new(MemoryStore::new()), config)
    }
}
