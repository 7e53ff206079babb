use crate::error::AppResult;
use crate::model::attendance::{Submission, WorkEntry};
use crate::storage::{KeyValueStore, SUBMISSIONS_KEY, load_json, save_json};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Attendance and work records, at most one per (user, day).
pub struct SubmissionStore {
    kv: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl SubmissionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            write_lock: Mutex::new(()),
        }
    }

    pub fn all(&self) -> AppResult<Vec<Submission>> {
        Ok(load_json(self.kv.as_ref(), SUBMISSIONS_KEY)?.unwrap_or_default())
    }

    pub fn for_day(&self, user_id: u64, date: NaiveDate) -> AppResult<Option<Submission>> {
        Ok(self.all()?.into_iter().find(|s| s.is_for(user_id, date)))
    }

    /// Whether the daily form is locked for this user.
    pub fn has_submitted(&self, user_id: u64, date: NaiveDate) -> AppResult<bool> {
        Ok(self.for_day(user_id, date)?.is_some())
    }

    /// Records `entry` for (user, date), replacing any earlier record for that pair.
    ///
    /// Returns the stored record and whether an earlier one was replaced.
    pub fn submit(
        &self,
        user_id: u64,
        date: NaiveDate,
        entry: WorkEntry,
        now: DateTime<Utc>,
    ) -> AppResult<(Submission, bool)> {
        let _guard = self.write_lock.lock().expect("submission lock poisoned");
        let mut submissions = self.all()?;
        let submission = Submission::new(user_id, date, entry, now);

        let replaced = match submissions.iter().position(|s| s.is_for(user_id, date)) {
            Some(index) => {
                submissions[index] = submission.clone();
                true
            }
            None => {
                submissions.push(submission.clone());
                false
            }
        };

        save_json(self.kv.as_ref(), SUBMISSIONS_KEY, &submissions)?;
        debug!(user_id, %date, replaced, "Submission stored");

        Ok((submission, replaced))
    }
}
