use crate::{
    api::submission::{SubmissionResponse, TodayResponse, today},
    auth::auth::AuthUser,
    error::{AppError, AppResult},
    model::{role::Role, user::User},
    state::AppState,
    stats::{AttendanceBreakdown, Overview, PersonalStats, SubmissionFilter, UserStats, user_stats},
    utils::csv_export::{EXPORT_FILE_NAME, submissions_to_csv},
};
use actix_web::{
    HttpResponse,
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web,
};
use serde::Serialize;
use tracing::{debug, info};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct EmployeeDashboard {
    pub user: User,
    pub today: TodayResponse,
    pub stats: PersonalStats,
}

#[derive(Serialize, ToSchema)]
pub struct AdminStats {
    /// Figures over the filtered list
    pub overview: Overview,
    /// Present/absent split over every submission
    pub attendance: AttendanceBreakdown,
    /// One row per directory user, over every submission
    pub users: Vec<UserStats>,
}

#[derive(Serialize, ToSchema)]
pub struct AdminDashboard {
    pub user: User,
    #[serde(flatten)]
    pub stats: AdminStats,
}

/// What the landing page shows, decided once from the caller's role.
#[derive(Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum Dashboard {
    Employee(EmployeeDashboard),
    Admin(AdminDashboard),
}

impl AdminStats {
    fn load(state: &AppState, filter: &SubmissionFilter) -> AppResult<Self> {
        let all = state.submissions.all()?;
        let users = state.directory.list()?;

        Ok(Self {
            overview: Overview::of(&filter.apply(&all)),
            attendance: AttendanceBreakdown::of(&all),
            users: user_stats(&users, &all),
        })
    }
}

impl Dashboard {
    pub fn load(state: &AppState, auth: &AuthUser) -> AppResult<Self> {
        let user = state
            .directory
            .find_by_id(auth.user_id)?
            .ok_or(AppError::Unauthorized("Account no longer exists"))?;

        match auth.role {
            Role::Employee => {
                let today = today();
                let all = state.submissions.all()?;
                Ok(Dashboard::Employee(EmployeeDashboard {
                    today: TodayResponse::load(state, user.id, today)?,
                    stats: PersonalStats::of(&all, user.id, today),
                    user,
                }))
            }
            Role::Admin => Ok(Dashboard::Admin(AdminDashboard {
                user,
                stats: AdminStats::load(state, &SubmissionFilter::default())?,
            })),
        }
    }
}

/// Role-specific landing data
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Employee or admin dashboard, tagged by `view`", body = Object, example = json!({
            "view": "employee",
            "user": {"id": 2, "name": "John Smith", "email": "john@company.com", "role": "employee"},
            "today": {"date": "2024-01-10", "submitted": false, "submission": null},
            "stats": {
                "total_seconds": 7200,
                "present_days": 2,
                "total_days": 3,
                "attendance_rate": 67,
                "weekly_average_seconds": 3600,
                "monthly_average_seconds": 3600
            }
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn dashboard(auth: AuthUser, state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let dashboard = Dashboard::load(&state, &auth)?;
    Ok(HttpResponse::Ok().json(dashboard))
}

/// Submissions matching the filter (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/submissions",
    params(
        ("user_id" = Option<u64>, Query, description = "Only this user's entries"),
        ("date" = Option<String>, Query, description = "Only entries for this day (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Filtered submissions", body = [SubmissionResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admin"
)]
pub async fn list_submissions(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<SubmissionFilter>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let filtered = query.apply(&state.submissions.all()?);
    debug!(count = filtered.len(), "Listing submissions");

    let body: Vec<SubmissionResponse> = filtered.iter().map(SubmissionResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Aggregated statistics (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    params(
        ("user_id" = Option<u64>, Query, description = "Restrict the overview to this user"),
        ("date" = Option<String>, Query, description = "Restrict the overview to this day (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Overview, attendance split and per-user figures", body = AdminStats),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admin"
)]
pub async fn admin_stats(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<SubmissionFilter>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;
    Ok(HttpResponse::Ok().json(AdminStats::load(&state, &query)?))
}

/// Download the filtered submissions as CSV (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/export",
    params(
        ("user_id" = Option<u64>, Query, description = "Only this user's entries"),
        ("date" = Option<String>, Query, description = "Only entries for this day (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admin"
)]
pub async fn export(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<SubmissionFilter>,
) -> AppResult<HttpResponse> {
    auth.require_admin()?;

    let filtered = query.apply(&state.submissions.all()?);
    let csv = submissions_to_csv(&filtered, &state.directory.list()?);

    info!(rows = filtered.len(), admin_id = auth.user_id, "Exported submissions");

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(EXPORT_FILE_NAME.to_string())],
        })
        .body(csv))
}

#[cfg(test)]
mod tests {
    use crate::model::attendance::{Attendance, WorkEntry};
    use crate::test_app;
    use crate::test_support::{bearer, peer, test_state};
    use actix_web::{http::StatusCode, test};
    use chrono::{NaiveDate, Utc};
    use serde_json::Value;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[actix_web::test]
    async fn dashboard_dispatches_on_role() {
        let (state, config) = test_state();
        let employee = bearer(&state, &config, 2, false);
        let admin = bearer(&state, &config, 1, true);
        let app = test_app!(state, config);

        for (token, view) in [(employee, "employee"), (admin, "admin")] {
            let req = test::TestRequest::get()
                .uri("/api/dashboard")
                .peer_addr(peer())
                .insert_header(("Authorization", token))
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["view"], view);
        }
    }

    #[actix_web::test]
    async fn admin_routes_reject_employees() {
        let (state, config) = test_state();
        let employee = bearer(&state, &config, 2, false);
        let app = test_app!(state, config);

        for uri in ["/api/admin/submissions", "/api/admin/stats", "/api/admin/export"] {
            let req = test::TestRequest::get()
                .uri(uri)
                .peer_addr(peer())
                .insert_header(("Authorization", employee.clone()))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{uri}");
        }
    }

    #[actix_web::test]
    async fn export_applies_filter_and_names_users() {
        let (state, config) = test_state();
        let admin = bearer(&state, &config, 1, false);

        state
            .submissions
            .submit(
                2,
                day(1),
                WorkEntry::Present {
                    seconds_done: 100,
                    remarks: Some("ok".into()),
                },
                Utc::now(),
            )
            .unwrap();
        state
            .submissions
            .submit(3, day(1), WorkEntry::Absent, Utc::now())
            .unwrap();

        let app = test_app!(state, config);
        let req = test::TestRequest::get()
            .uri("/api/admin/export?user_id=2")
            .peer_addr(peer())
            .insert_header(("Authorization", admin))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "text/csv"
        );
        let body = test::read_body(resp).await;
        assert_eq!(
            std::str::from_utf8(&body).unwrap(),
            "Date,User,Attendance,Seconds Done,Remarks\n2024-01-01,John Smith,present,100,ok"
        );
    }

    #[actix_web::test]
    async fn stats_filter_only_narrows_the_overview() {
        let (state, config) = test_state();
        let admin = bearer(&state, &config, 1, false);

        for (user, d, entry) in [
            (2, 1, WorkEntry::Present { seconds_done: 3600, remarks: None }),
            (2, 2, WorkEntry::Present { seconds_done: 1800, remarks: None }),
            (3, 2, WorkEntry::Absent),
        ] {
            state.submissions.submit(user, day(d), entry, Utc::now()).unwrap();
        }

        let app = test_app!(state, config);
        let req = test::TestRequest::get()
            .uri("/api/admin/stats?date=2024-01-02")
            .peer_addr(peer())
            .insert_header(("Authorization", admin))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["overview"]["total_submissions"], 2);
        assert_eq!(body["overview"]["attendance_rate"], 50);
        assert_eq!(body["overview"]["total_display"], "0h 30m");
        assert_eq!(body["attendance"]["present"], 2);
        assert_eq!(body["attendance"]["absent"], 1);

        let john = body["users"]
            .as_array()
            .unwrap()
            .iter()
            .find(|u| u["name"] == "John Smith")
            .unwrap();
        assert_eq!(john["total_seconds"], 5400);
        assert_eq!(john["attendance_rate"], 100);
    }

    #[actix_web::test]
    async fn stats_stay_available_with_huge_second_counts() {
        let (state, config) = test_state();
        let admin = bearer(&state, &config, 1, false);

        for user in [1, 2, 3] {
            let entry =
                WorkEntry::from_form(Some(Attendance::Present), Some(i64::MAX), None).unwrap();
            state.submissions.submit(user, day(1), entry, Utc::now()).unwrap();
        }

        let app = test_app!(state, config);
        for uri in ["/api/admin/stats", "/api/dashboard"] {
            let req = test::TestRequest::get()
                .uri(uri)
                .peer_addr(peer())
                .insert_header(("Authorization", admin.clone()))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK, "{uri}");

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["overview"]["total_seconds"], u64::MAX);
            assert_eq!(body["overview"]["attendance_rate"], 100);
        }
    }
}
