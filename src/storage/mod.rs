//! Key/value persistence the stores are built on.
//!
//! Values are opaque strings; typed records go through [`load_json`] / [`save_json`].

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::AppResult;
use serde::{Serialize, de::DeserializeOwned};

pub const SESSION_KEY_PREFIX: &str = "worktrack_user";
pub const SUBMISSIONS_KEY: &str = "worktrack_submissions";
pub const USERS_KEY: &str = "worktrack_users";
pub const NEXT_USER_ID_KEY: &str = "worktrack_next_user_id";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn set(&self, key: &str, value: String) -> AppResult<()>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> AppResult<()>;
    /// Every stored key starting with `prefix`, in no particular order.
    fn keys(&self, prefix: &str) -> AppResult<Vec<String>>;
}

pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> AppResult<Option<T>> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> AppResult<()> {
    store.set(key, serde_json::to_string(value)?)
}
