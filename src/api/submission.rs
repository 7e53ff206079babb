use crate::{
    auth::auth::AuthUser,
    error::AppResult,
    model::attendance::{Attendance, Submission, WorkEntry},
    state::AppState,
};
use actix_web::{HttpResponse, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct SubmitWorkReq {
    #[schema(example = "present")]
    pub attendance: Option<Attendance>,
    /// Required when present; ignored when absent
    #[schema(example = 3600)]
    pub seconds_done: Option<i64>,
    #[schema(example = "Finished the onboarding checklist")]
    pub remarks: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SubmissionResponse {
    pub id: String,
    pub user_id: u64,
    #[schema(example = "2024-01-10", value_type = String, format = Date)]
    pub date: NaiveDate,
    pub attendance: Attendance,
    pub seconds_done: Option<u64>,
    pub remarks: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: DateTime<Utc>,
}

impl From<&Submission> for SubmissionResponse {
    fn from(s: &Submission) -> Self {
        Self {
            id: s.id.clone(),
            user_id: s.user_id,
            date: s.date,
            attendance: s.entry.attendance(),
            seconds_done: s.entry.seconds_done(),
            remarks: s.entry.remarks().map(str::to_string),
            timestamp: s.timestamp,
        }
    }
}

/// State of the daily form for one user
#[derive(Serialize, ToSchema)]
pub struct TodayResponse {
    #[schema(example = "2024-01-10", value_type = String, format = Date)]
    pub date: NaiveDate,
    /// Once true the form is read-only for the rest of the day
    pub submitted: bool,
    pub submission: Option<SubmissionResponse>,
}

impl TodayResponse {
    pub fn load(state: &AppState, user_id: u64, today: NaiveDate) -> AppResult<Self> {
        let submitted = state.submissions.has_submitted(user_id, today)?;
        let submission = if submitted {
            state.submissions.for_day(user_id, today)?
        } else {
            None
        };

        Ok(Self {
            date: today,
            submitted,
            submission: submission.as_ref().map(SubmissionResponse::from),
        })
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Today's entry for the current user
#[utoipa::path(
    get,
    path = "/api/submissions/today",
    responses(
        (status = 200, description = "Today's entry, if any", body = TodayResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Submissions"
)]
pub async fn get_today(auth: AuthUser, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let today = TodayResponse::load(&state, auth.user_id, today())?;
    Ok(HttpResponse::Ok().json(today))
}

/// Submit (or replace) today's work entry
#[utoipa::path(
    post,
    path = "/api/submissions",
    request_body = SubmitWorkReq,
    responses(
        (status = 200, description = "Entry stored", body = Object, example = json!({
            "message": "Work entry submitted successfully!",
            "submission": {
                "id": "5f0c...",
                "user_id": 2,
                "date": "2024-01-10",
                "attendance": "present",
                "seconds_done": 3600,
                "remarks": null,
                "timestamp": "2024-01-10T09:00:00Z"
            }
        })),
        (status = 400, description = "Validation failed", body = Object, example = json!({
            "error": "Please enter seconds done"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Submissions"
)]
#[instrument(name = "submit_work", skip(auth, state, payload), fields(user_id = auth.user_id))]
pub async fn submit(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<SubmitWorkReq>,
) -> AppResult<HttpResponse> {
    let payload = payload.into_inner();
    let entry = WorkEntry::from_form(payload.attendance, payload.seconds_done, payload.remarks)?;

    let (submission, replaced) =
        state
            .submissions
            .submit(auth.user_id, today(), entry, Utc::now())?;

    info!(attendance = %submission.entry.attendance(), replaced, "Work entry stored");

    let message = if replaced {
        "Work entry updated successfully!"
    } else {
        "Work entry submitted successfully!"
    };

    Ok(HttpResponse::Ok().json(json!({
        "message": message,
        "submission": SubmissionResponse::from(&submission),
    })))
}
