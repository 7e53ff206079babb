//! Read-only aggregation over submission lists. Nothing here touches storage.

use crate::model::{attendance::Submission, user::User};
use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `round(numerator / denominator)` with halves rounded up; 0 when the denominator is 0.
/// Never overflows, whatever the inputs.
fn div_round(numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    let remainder = numerator % denominator;
    numerator / denominator + u64::from(remainder >= denominator - remainder)
}

/// Sums saturate at `u64::MAX` instead of wrapping.
fn saturating_sum(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0, u64::saturating_add)
}

fn present(submissions: &[Submission]) -> impl Iterator<Item = &Submission> {
    submissions.iter().filter(|s| s.entry.is_present())
}

pub fn present_count(submissions: &[Submission]) -> u64 {
    present(submissions).count() as u64
}

pub fn total_present_seconds(submissions: &[Submission]) -> u64 {
    saturating_sum(present(submissions).map(|s| s.entry.seconds_done().unwrap_or(0)))
}

/// Percentage of submissions marked present, rounded; 0 for an empty list.
pub fn attendance_rate(submissions: &[Submission]) -> u64 {
    div_round(
        present_count(submissions).saturating_mul(100),
        submissions.len() as u64,
    )
}

/// Mean seconds over present submissions dated on or after `window_start`; 0 if none qualify.
pub fn window_average(submissions: &[Submission], window_start: NaiveDate) -> u64 {
    let (sum, count) = present(submissions)
        .filter(|s| s.date >= window_start)
        .fold((0u64, 0u64), |(sum, count), s| {
            (sum.saturating_add(s.entry.seconds_done().unwrap_or(0)), count + 1)
        });
    div_round(sum, count)
}

pub fn weekly_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(7)
}

/// One calendar month back, clamped to the end of a shorter month.
pub fn monthly_start(today: NaiveDate) -> NaiveDate {
    today.checked_sub_months(Months::new(1)).unwrap_or(today)
}

pub fn for_user(submissions: &[Submission], user_id: u64) -> Vec<Submission> {
    submissions
        .iter()
        .filter(|s| s.user_id == user_id)
        .cloned()
        .collect()
}

/// `Xh Ym`, truncating leftover seconds.
pub fn format_seconds(seconds: u64) -> String {
    format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
}

/// Admin list filter; unset fields match everything.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SubmissionFilter {
    pub user_id: Option<u64>,
    pub date: Option<NaiveDate>,
}

impl SubmissionFilter {
    pub fn matches(&self, submission: &Submission) -> bool {
        self.user_id.is_none_or(|id| submission.user_id == id)
            && self.date.is_none_or(|d| submission.date == d)
    }

    pub fn apply(&self, submissions: &[Submission]) -> Vec<Submission> {
        submissions
            .iter()
            .filter(|s| self.matches(s))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct Overview {
    pub total_submissions: u64,
    pub present_days: u64,
    pub total_seconds: u64,
    #[schema(example = "1h 30m")]
    pub total_display: String,
    pub attendance_rate: u64,
}

impl Overview {
    pub fn of(submissions: &[Submission]) -> Self {
        let total_seconds = total_present_seconds(submissions);
        Self {
            total_submissions: submissions.len() as u64,
            present_days: present_count(submissions),
            total_seconds,
            total_display: format_seconds(total_seconds),
            attendance_rate: attendance_rate(submissions),
        }
    }
}

#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct UserStats {
    pub user_id: u64,
    pub name: String,
    pub total_seconds: u64,
    pub present_days: u64,
    pub total_days: u64,
    pub attendance_rate: u64,
}

/// One row per directory user, computed over that user's submissions.
pub fn user_stats(users: &[User], submissions: &[Submission]) -> Vec<UserStats> {
    users
        .iter()
        .map(|u| {
            let own = for_user(submissions, u.id);
            UserStats {
                user_id: u.id,
                name: u.name.clone(),
                total_seconds: total_present_seconds(&own),
                present_days: present_count(&own),
                total_days: own.len() as u64,
                attendance_rate: attendance_rate(&own),
            }
        })
        .collect()
}

#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct AttendanceBreakdown {
    pub present: u64,
    pub absent: u64,
}

impl AttendanceBreakdown {
    pub fn of(submissions: &[Submission]) -> Self {
        let present = present_count(submissions);
        Self {
            present,
            absent: submissions.len() as u64 - present,
        }
    }
}

/// Figures shown on an employee's own dashboard.
#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct PersonalStats {
    pub total_seconds: u64,
    pub present_days: u64,
    pub total_days: u64,
    pub attendance_rate: u64,
    pub weekly_average_seconds: u64,
    pub monthly_average_seconds: u64,
}

impl PersonalStats {
    pub fn of(submissions: &[Submission], user_id: u64, today: NaiveDate) -> Self {
        let own = for_user(submissions, user_id);
        Self {
            total_seconds: total_present_seconds(&own),
            present_days: present_count(&own),
            total_days: own.len() as u64,
            attendance_rate: attendance_rate(&own),
            weekly_average_seconds: window_average(&own, weekly_start(today)),
            monthly_average_seconds: window_average(&own, monthly_start(today)),
        }
    }
}
