use crate::auth::auth::AuthUser;
use crate::leave::balance::{self, LeaveBalance};
use crate::leave::chart::{self, DayLoad, MonthLoad};
use crate::leave::rating;
use crate::model::leave_application;
use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ChartQuery {
    /// Chart bucketing: week (default) or month
    #[schema(example = "week")]
    pub view: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct WeeklyChartResponse {
    #[schema(example = "week")]
    pub view: String,
    pub days: Vec<DayLoad>,
}

#[derive(Serialize, ToSchema)]
pub struct MonthlyChartResponse {
    #[schema(example = "month")]
    pub view: String,
    pub months: Vec<MonthLoad>,
}

#[derive(Serialize, ToSchema)]
pub struct ApplicationMetrics {
    #[schema(example = 4)]
    pub leave_rating: u32,
    #[schema(example = 5)]
    pub on_leave_today: u32,
    pub balance: LeaveBalance,
}

/* =========================
Own leave balance
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leave/balance",
    responses(
        (status = 200, description = "The caller's leave balance", body = LeaveBalance),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn leave_balance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let applications = leave_application::load_applications(pool.get_ref(), Some(employee_id))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to fetch leave applications");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(balance::leave_balance(&applications)))
}

/* =========================
Leave load chart (Admin)
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leave/chart",
    params(ChartQuery),
    responses(
        (status = 200, description = "Weekly or monthly leave load buckets"),
        (status = 400, description = "Invalid chart view"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn leave_chart(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ChartQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let view = query.view.as_deref().unwrap_or("week");
    if view != "week" && view != "month" {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Invalid chart view. Allowed: week, month"
        })));
    }

    let applications = leave_application::load_applications(pool.get_ref(), None)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch leave applications");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    // the engine never reads the clock; the evaluation date is pinned here
    let today = Utc::now().date_naive();

    let response = if view == "month" {
        HttpResponse::Ok().json(MonthlyChartResponse {
            view: "month".into(),
            months: chart::monthly_load(&applications, today),
        })
    } else {
        HttpResponse::Ok().json(WeeklyChartResponse {
            view: "week".into(),
            days: chart::weekly_load(&applications, today),
        })
    };

    Ok(response)
}

/* =========================
Review-screen metrics (Admin)
========================= */
/// Everything the review screen shows next to one application: its
/// rating, today's on-leave head count, and the applicant's balance.
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}/metrics",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave application")
    ),
    responses(
        (status = 200, description = "Review metrics", body = ApplicationMetrics),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave application not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn application_metrics(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let leave_id = path.into_inner();

    let applications = leave_application::load_applications(pool.get_ref(), None)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_id, "Failed to fetch leave applications");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let Some(application) = applications.iter().find(|app| app.id == leave_id) else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Leave application not found"
        })));
    };

    let today = Utc::now().date_naive();

    let own: Vec<_> = applications
        .iter()
        .filter(|app| app.employee_id == application.employee_id)
        .cloned()
        .collect();

    let metrics = ApplicationMetrics {
        leave_rating: rating::leave_rating(
            &application.leave_type,
            application.start_date,
            application.end_date,
        ),
        on_leave_today: chart::on_leave_count(&applications, today),
        balance: balance::leave_balance(&own),
    };

    Ok(HttpResponse::Ok().json(metrics))
}
