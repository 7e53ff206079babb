use crate::error::AppResult;
use crate::model::user::User;
use crate::storage::{KeyValueStore, SESSION_KEY_PREFIX, load_json, save_json};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user: User,
    pub remember: bool,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Authenticated identity per client session.
///
/// A remembered session lives in durable storage, any other in session-scoped storage.
/// Expired sessions read as absent and are removed when seen.
pub struct SessionStore {
    durable: Arc<dyn KeyValueStore>,
    ephemeral: Arc<dyn KeyValueStore>,
    session_ttl: Duration,
    remember_ttl: Duration,
}

fn key(session_id: &str) -> String {
    format!("{SESSION_KEY_PREFIX}:{session_id}")
}

fn key_prefix() -> String {
    format!("{SESSION_KEY_PREFIX}:")
}

impl SessionStore {
    pub fn new(
        durable: Arc<dyn KeyValueStore>,
        ephemeral: Arc<dyn KeyValueStore>,
        session_ttl: Duration,
        remember_ttl: Duration,
    ) -> Self {
        Self {
            durable,
            ephemeral,
            session_ttl,
            remember_ttl,
        }
    }

    pub fn start(&self, user: User, remember: bool, now: DateTime<Utc>) -> AppResult<Session> {
        if remember {
            self.prune_expired(now)?;
        }

        let (target, ttl) = if remember {
            (&self.durable, self.remember_ttl)
        } else {
            (&self.ephemeral, self.session_ttl)
        };

        let session = Session {
            id: Uuid::new_v4().to_string(),
            user,
            remember,
            started_at: now,
            expires_at: now + ttl,
        };
        save_json(target.as_ref(), &key(&session.id), &session)?;

        Ok(session)
    }

    pub fn get(&self, session_id: &str, now: DateTime<Utc>) -> AppResult<Option<Session>> {
        let key = key(session_id);
        let session = match load_json::<Session>(self.ephemeral.as_ref(), &key)? {
            Some(session) => Some(session),
            None => load_json(self.durable.as_ref(), &key)?,
        };

        match session {
            Some(session) if session.is_expired(now) => {
                debug!(session_id, "Dropping expired session");
                self.end(session_id)?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Clears the session from both storages. Ending an unknown session is a no-op.
    pub fn end(&self, session_id: &str) -> AppResult<()> {
        let key = key(session_id);
        self.ephemeral.remove(&key)?;
        self.durable.remove(&key)
    }

    /// Ends every session belonging to `user_id`; returns how many were ended.
    pub fn end_for_user(&self, user_id: u64) -> AppResult<usize> {
        let mut ended = 0;
        for store in [&self.ephemeral, &self.durable] {
            ended += remove_where(store.as_ref(), |s| s.user.id == user_id)?;
        }
        Ok(ended)
    }

    /// Removes expired remembered sessions from durable storage.
    pub fn prune_expired(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let pruned = remove_where(self.durable.as_ref(), |s| s.is_expired(now))?;
        if pruned > 0 {
            debug!(pruned, "Pruned expired sessions");
        }
        Ok(pruned)
    }
}

fn remove_where(
    store: &dyn KeyValueStore,
    predicate: impl Fn(&Session) -> bool,
) -> AppResult<usize> {
    let mut removed = 0;
    for key in store.keys(&key_prefix())? {
        let matched = load_json::<Session>(store, &key)?.is_some_and(|s| predicate(&s));
        if matched {
            store.remove(&key)?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use crate::storage::MemoryStore;

    fn stores() -> (Arc<MemoryStore>, Arc<MemoryStore>) {
        (
            Arc::new(MemoryStore::new(std::time::Duration::from_secs(60))),
            Arc::new(MemoryStore::new(std::time::Duration::from_secs(60))),
        )
    }

    fn session_store(durable: Arc<MemoryStore>, ephemeral: Arc<MemoryStore>) -> SessionStore {
        SessionStore::new(durable, ephemeral, Duration::hours(8), Duration::days(30))
    }

    fn user(id: u64) -> User {
        User {
            id,
            name: format!("User {id}"),
            email: format!("user{id}@company.com"),
            mobile: None,
            role: Role::Employee,
        }
    }

    #[test]
    fn remember_selects_exactly_one_storage() {
        let (durable, ephemeral) = stores();
        let sessions = session_store(durable.clone(), ephemeral.clone());
        let now = Utc::now();

        let kept = sessions.start(user(1), true, now).unwrap();
        assert!(durable.get(&key(&kept.id)).unwrap().is_some());
        assert!(ephemeral.get(&key(&kept.id)).unwrap().is_none());
        assert_eq!(kept.expires_at, now + Duration::days(30));

        let brief = sessions.start(user(1), false, now).unwrap();
        assert!(durable.get(&key(&brief.id)).unwrap().is_none());
        assert!(ephemeral.get(&key(&brief.id)).unwrap().is_some());
        assert_eq!(brief.expires_at, now + Duration::hours(8));

        assert_eq!(sessions.get(&kept.id, now).unwrap(), Some(kept));
        assert_eq!(sessions.get(&brief.id, now).unwrap(), Some(brief));
    }

    #[test]
    fn end_is_idempotent() {
        let (durable, ephemeral) = stores();
        let sessions = session_store(durable, ephemeral);

        let session = sessions.start(user(1), true, Utc::now()).unwrap();
        sessions.end(&session.id).unwrap();
        sessions.end(&session.id).unwrap();
        sessions.end("never-existed").unwrap();

        assert_eq!(sessions.get(&session.id, Utc::now()).unwrap(), None);
    }

    #[test]
    fn expired_remembered_session_is_gone() {
        let (durable, ephemeral) = stores();
        let sessions = session_store(durable.clone(), ephemeral);

        let long_ago = Utc::now() - Duration::days(31);
        let stale = sessions.start(user(1), true, long_ago).unwrap();

        assert_eq!(sessions.get(&stale.id, Utc::now()).unwrap(), None);
        assert!(durable.get(&key(&stale.id)).unwrap().is_none());
    }

    #[test]
    fn remembered_login_prunes_expired_records() {
        let (durable, ephemeral) = stores();
        let sessions = session_store(durable.clone(), ephemeral);

        let stale = sessions
            .start(user(1), true, Utc::now() - Duration::days(40))
            .unwrap();
        let fresh = sessions.start(user(2), true, Utc::now()).unwrap();

        assert!(durable.get(&key(&stale.id)).unwrap().is_none());
        assert_eq!(durable.keys(&key_prefix()).unwrap(), [key(&fresh.id)]);
    }

    #[test]
    fn end_for_user_clears_both_storages() {
        let (durable, ephemeral) = stores();
        let sessions = session_store(durable.clone(), ephemeral.clone());
        let now = Utc::now();

        let a = sessions.start(user(3), true, now).unwrap();
        let b = sessions.start(user(3), false, now).unwrap();
        let other = sessions.start(user(2), true, now).unwrap();

        assert_eq!(sessions.end_for_user(3).unwrap(), 2);
        assert_eq!(sessions.get(&a.id, now).unwrap(), None);
        assert_eq!(sessions.get(&b.id, now).unwrap(), None);
        assert_eq!(sessions.get(&other.id, now).unwrap(), Some(other));
        assert_eq!(sessions.end_for_user(3).unwrap(), 0);
    }
}
