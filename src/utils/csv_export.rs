use crate::model::{attendance::Submission, user::User};
use std::borrow::Cow;

pub const EXPORT_FILE_NAME: &str = "work-tracking-data.csv";
const HEADER: [&str; 5] = ["Date", "User", "Attendance", "Seconds Done", "Remarks"];
const UNKNOWN_USER: &str = "Unknown User";

/// Quotes a field only when it would otherwise break the row.
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Renders submissions as CSV rows: date, user name, attendance, seconds, remarks.
///
/// Seconds and remarks are left blank when a record has none.
pub fn submissions_to_csv(submissions: &[Submission], users: &[User]) -> String {
    let mut lines = Vec::with_capacity(submissions.len() + 1);
    lines.push(HEADER.join(","));

    for s in submissions {
        let name = users
            .iter()
            .find(|u| u.id == s.user_id)
            .map_or(UNKNOWN_USER, |u| u.name.as_str());
        let seconds = s
            .entry
            .seconds_done()
            .map(|v| v.to_string())
            .unwrap_or_default();

        let row = [
            Cow::Owned(s.date.to_string()),
            escape(name),
            Cow::Owned(s.entry.attendance().to_string()),
            Cow::Owned(seconds),
            escape(s.entry.remarks().unwrap_or("")),
        ];
        lines.push(row.join(","));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{attendance::WorkEntry, role::Role};
    use chrono::{NaiveDate, Utc};

    fn john() -> User {
        User {
            id: 2,
            name: "John Smith".into(),
            email: "john@company.com".into(),
            mobile: None,
            role: Role::Employee,
        }
    }

    #[test]
    fn exports_header_and_rows() {
        let sub = Submission::new(
            2,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            WorkEntry::Present {
                seconds_done: 100,
                remarks: Some("ok".into()),
            },
            Utc::now(),
        );

        let csv = submissions_to_csv(&[sub], &[john()]);
        assert_eq!(
            csv,
            "Date,User,Attendance,Seconds Done,Remarks\n2024-01-01,John Smith,present,100,ok"
        );
    }

    #[test]
    fn absent_rows_leave_work_columns_blank() {
        let sub = Submission::new(
            9,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            WorkEntry::Absent,
            Utc::now(),
        );

        let csv = submissions_to_csv(&[sub], &[john()]);
        assert_eq!(csv.lines().nth(1), Some("2024-01-02,Unknown User,absent,,"));
    }

    #[test]
    fn quotes_fields_with_separators() {
        let sub = Submission::new(
            2,
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            WorkEntry::Present {
                seconds_done: 5,
                remarks: Some("fixed \"login\", tests".into()),
            },
            Utc::now(),
        );

        let csv = submissions_to_csv(&[sub], &[john()]);
        assert_eq!(
            csv.lines().nth(1),
            Some("2024-01-03,John Smith,present,5,\"fixed \"\"login\"\", tests\"")
        );
    }

    #[test]
    fn empty_list_is_header_only() {
        assert_eq!(
            submissions_to_csv(&[], &[]),
            "Date,User,Attendance,Seconds Done,Remarks"
        );
    }
}
