use crate::error::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Attendance {
    Present,
    Absent,
}

/// What a user reported for one day. Work details only exist on a present day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "attendance", rename_all = "lowercase")]
pub enum WorkEntry {
    Present {
        seconds_done: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        remarks: Option<String>,
    },
    Absent,
}

impl WorkEntry {
    /// Validates raw form input. Seconds and remarks sent with an absent day are dropped.
    pub fn from_form(
        attendance: Option<Attendance>,
        seconds_done: Option<i64>,
        remarks: Option<String>,
    ) -> AppResult<Self> {
        match attendance {
            None => Err(AppError::validation("Please select attendance status")),
            Some(Attendance::Absent) => Ok(WorkEntry::Absent),
            Some(Attendance::Present) => {
                let seconds = seconds_done
                    .ok_or_else(|| AppError::validation("Please enter seconds done"))?;
                let seconds_done = u64::try_from(seconds).map_err(|_| {
                    AppError::validation("Seconds done must be a non-negative integer")
                })?;

                let remarks = remarks
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty());

                Ok(WorkEntry::Present {
                    seconds_done,
                    remarks,
                })
            }
        }
    }

    pub fn attendance(&self) -> Attendance {
        match self {
            WorkEntry::Present { .. } => Attendance::Present,
            WorkEntry::Absent => Attendance::Absent,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, WorkEntry::Present { .. })
    }

    pub fn seconds_done(&self) -> Option<u64> {
        match self {
            WorkEntry::Present { seconds_done, .. } => Some(*seconds_done),
            WorkEntry::Absent => None,
        }
    }

    pub fn remarks(&self) -> Option<&str> {
        match self {
            WorkEntry::Present { remarks, .. } => remarks.as_deref(),
            WorkEntry::Absent => None,
        }
    }
}

/// One user's record for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub user_id: u64,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub entry: WorkEntry,
    pub timestamp: DateTime<Utc>,
}

impl Submission {
    pub fn new(user_id: u64, date: NaiveDate, entry: WorkEntry, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            date,
            entry,
            timestamp: now,
        }
    }

    pub fn is_for(&self, user_id: u64, date: NaiveDate) -> bool {
        self.user_id == user_id && self.date == date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_requires_seconds() {
        let err = WorkEntry::from_form(Some(Attendance::Present), None, None).unwrap_err();
        assert_eq!(err, AppError::validation("Please enter seconds done"));

        let err = WorkEntry::from_form(Some(Attendance::Present), Some(-5), None).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn attendance_must_be_chosen() {
        let err = WorkEntry::from_form(None, Some(10), None).unwrap_err();
        assert_eq!(err, AppError::validation("Please select attendance status"));
    }

    #[test]
    fn absent_discards_work_details() {
        let entry =
            WorkEntry::from_form(Some(Attendance::Absent), Some(3600), Some("sick".into()))
                .unwrap();
        assert_eq!(entry, WorkEntry::Absent);
        assert_eq!(entry.seconds_done(), None);
        assert_eq!(entry.remarks(), None);
    }

    #[test]
    fn blank_remarks_are_dropped() {
        let entry =
            WorkEntry::from_form(Some(Attendance::Present), Some(0), Some("   ".into())).unwrap();
        assert_eq!(
            entry,
            WorkEntry::Present {
                seconds_done: 0,
                remarks: None
            }
        );
    }

    #[test]
    fn stored_shape_is_flat() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let sub = Submission::new(
            2,
            date,
            WorkEntry::Present {
                seconds_done: 3600,
                remarks: Some("ok".into()),
            },
            Utc::now(),
        );

        let value = serde_json::to_value(&sub).unwrap();
        assert_eq!(value["attendance"], "present");
        assert_eq!(value["seconds_done"], 3600);
        assert_eq!(value["date"], "2024-01-10");

        let back: Submission = serde_json::from_value(value).unwrap();
        assert_eq!(back, sub);
    }
}
