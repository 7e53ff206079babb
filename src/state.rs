use crate::auth::{password::hash_password, session::SessionStore};
use crate::config::Config;
use crate::directory::Directory;
use crate::error::{AppError, AppResult};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::submissions::SubmissionStore;
use std::sync::Arc;
use std::time::Duration;

/// Everything the handlers share, built once at startup.
pub struct AppState {
    pub sessions: SessionStore,
    pub submissions: SubmissionStore,
    pub directory: Directory,
    /// argon2 hash of the shared development password
    pub password_hash: String,
}

impl AppState {
    pub fn open(config: &Config) -> AppResult<Self> {
        let durable: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.data_file)?);
        let ephemeral: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new(
            Duration::from_secs(config.session_ttl as u64),
        ));

        Self::with_stores(config, durable, ephemeral)
    }

    pub fn with_stores(
        config: &Config,
        durable: Arc<dyn KeyValueStore>,
        ephemeral: Arc<dyn KeyValueStore>,
    ) -> AppResult<Self> {
        let password_hash = hash_password(&config.shared_password).map_err(AppError::storage)?;

        Ok(Self {
            sessions: SessionStore::new(
                durable.clone(),
                ephemeral,
                chrono::Duration::seconds(config.session_ttl as i64),
                chrono::Duration::seconds(config.remember_ttl as i64),
            ),
            submissions: SubmissionStore::new(durable.clone()),
            directory: Directory::open(durable)?,
            password_hash,
        })
    }
}
