use crate::api::dashboard::{AdminDashboard, AdminStats, EmployeeDashboard};
use crate::api::submission::{SubmissionResponse, SubmitWorkReq, TodayResponse};
use crate::api::user::AddUserReq;
use crate::model::{attendance::Attendance, role::Role, user::User};
use crate::models::{LoginReqDto, LoginResponse};
use crate::stats::{AttendanceBreakdown, Overview, PersonalStats, UserStats};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "WorkTrack API",
        version = "0.1.0",
        description = r#"
## Attendance & Work-Hour Tracking

Employees submit one attendance/work entry per day; administrators review
aggregated statistics and export the records.

### Key Features
- **Daily entry**: present (with seconds worked and optional remarks) or absent.
  Re-submitting for the same day replaces the earlier entry.
- **Dashboards**: personal totals and weekly/monthly averages for employees,
  filtered overviews and per-user figures for admins.
- **Export**: CSV download of the filtered entries.
- **User management**: add and remove users; the last admin always remains.

### Security
Endpoints under `/api` need a **Bearer token** from `/auth/login`.
Login checks a shared development password and is not a real credential check.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::logout,
        crate::auth::handlers::me,

        crate::api::submission::get_today,
        crate::api::submission::submit,

        crate::api::dashboard::dashboard,
        crate::api::dashboard::list_submissions,
        crate::api::dashboard::admin_stats,
        crate::api::dashboard::export,

        crate::api::user::list_users,
        crate::api::user::add_user,
        crate::api::user::remove_user
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            User,
            Role,
            Attendance,
            SubmitWorkReq,
            SubmissionResponse,
            TodayResponse,
            Overview,
            UserStats,
            AttendanceBreakdown,
            PersonalStats,
            EmployeeDashboard,
            AdminStats,
            AdminDashboard,
            AddUserReq
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login, logout and the current user"),
        (name = "Submissions", description = "Daily attendance/work entries"),
        (name = "Dashboard", description = "Role-specific landing data"),
        (name = "Admin", description = "Filtered listings, statistics and export"),
        (name = "Users", description = "Directory management"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
