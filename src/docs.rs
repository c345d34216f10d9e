use crate::api::dashboard::{
    ApplicationMetrics, ChartQuery, MonthlyChartResponse, WeeklyChartResponse,
};
use crate::api::leave::{
    CreateLeave, LeaveListFilter, LeaveListResponse, LeaveType, ReviewDecision, ReviewLeave,
};
use crate::leave::balance::LeaveBalance;
use crate::leave::chart::{DayLoad, LoadBand, MonthLoad};
use crate::model::leave_application::{
    EmployeeRef, LeaveApplication, LeaveMode, LeaveReview, LeaveStatus, ReviewerRef,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Management API",
        version = "1.0.0",
        description = r#"
## Leave Management System

This API powers a leave-management system: employees request leave and
track their balance, administrators review applications and watch the
workforce leave load.

### 🔹 Key Features
- **Leave Applications**
  - Submit requests, view history, application detail
- **Review Workflow**
  - Approve/deny pending applications, "my reviews" filtering
- **Leave Accounting**
  - Working-day balance against the annual allowance
- **Leave Load Charts**
  - Weekly and monthly on-leave head counts with severity bands

### 🔐 Security
Endpoints under the API prefix are protected with **JWT Bearer
authentication**. Review and chart endpoints require the **Admin** role.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave::create_leave,
        crate::api::leave::list_applications,
        crate::api::leave::get_leave,
        crate::api::leave::review_leave,

        crate::api::dashboard::leave_balance,
        crate::api::dashboard::leave_chart,
        crate::api::dashboard::application_metrics
    ),
    components(
        schemas(
            CreateLeave,
            LeaveType,
            LeaveListFilter,
            LeaveListResponse,
            ReviewLeave,
            ReviewDecision,
            LeaveApplication,
            LeaveStatus,
            LeaveMode,
            EmployeeRef,
            ReviewerRef,
            LeaveReview,
            LeaveBalance,
            ChartQuery,
            WeeklyChartResponse,
            MonthlyChartResponse,
            DayLoad,
            MonthLoad,
            LoadBand,
            ApplicationMetrics
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave application APIs"),
        (name = "Dashboard", description = "Balance and leave-load APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
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
