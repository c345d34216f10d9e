use crate::auth::auth::AuthUser;
use crate::leave::views::{ApplicationQuery, StatusFilter, ViewFilter, filter_applications};
use crate::model::leave_application::{self, LeaveApplication, LeaveMode};
use crate::model::role::Role;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeaveType {
    Annual,
    Sick,
    Personal,
    Unpaid,
}

impl LeaveType {
    fn as_str(&self) -> &str {
        match self {
            LeaveType::Annual => "annual",
            LeaveType::Sick => "sick",
            LeaveType::Personal => "personal",
            LeaveType::Unpaid => "unpaid",
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeave {
    #[schema(example = "annual")]
    pub leave_type: LeaveType, // enum ensures Swagger dropdown
    #[schema(example = "full")]
    pub leave_mode: LeaveMode,
    #[schema(example = "Family vacation")]
    pub reason: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-02", format = "date", value_type = String)]
    pub end_date: NaiveDate,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveListFilter {
    /// Review view: all, pending, or reviewed (reviewed by me)
    #[schema(example = "pending")]
    pub view: Option<String>,
    /// Status filter: all, pending, accepted or denied
    #[schema(example = "accepted")]
    pub status: Option<String>,
    /// Case-insensitive employee name search
    #[schema(example = "jane")]
    pub search: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveApplication>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: u64,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Accepted,
    Denied,
}

impl ReviewDecision {
    fn as_str(&self) -> &str {
        match self {
            ReviewDecision::Accepted => "accepted",
            ReviewDecision::Denied => "denied",
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct ReviewLeave {
    #[schema(example = "accepted")]
    pub status: ReviewDecision,
    #[schema(example = "Approved, enjoy your leave", nullable = true)]
    pub comments: Option<String>,
}

/* =========================
Submit leave application
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave/request",
    request_body(
        content = CreateLeave,
        description = "Leave application payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave application submitted",
         body = Object,
         example = json!({
            "message": "Leave request submitted",
            "status": "pending"
         })
        ),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    // date ordering is rejected here, never silently corrected
    if payload.end_date < payload.start_date {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "endDate cannot be before startDate"
        })));
    }

    let reason = payload.reason.trim();
    if reason.chars().count() < 3 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Reason must be at least 3 characters long"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO leave_applications
            (employee_id, leave_type, leave_mode, start_date, end_date, reason, status)
        VALUES (?, ?, ?, ?, ?, ?, 'pending')
        "#,
    )
    .bind(employee_id)
    .bind(payload.leave_type.as_str())
    .bind(payload.leave_mode.to_string())
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(reason)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to create leave application");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Leave request submitted",
        "status": "pending"
    })))
}

/* =========================
List leave applications
========================= */
/// Admins see everything and can filter; employees see their own history.
#[utoipa::path(
    get,
    path = "/api/v1/leave/applications",
    params(LeaveListFilter),
    responses(
        (status = 200, description = "Paginated application list", body = LeaveListResponse),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn list_applications(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveListFilter>,
) -> actix_web::Result<impl Responder> {
    let scope = if auth.role == Role::Admin {
        None
    } else {
        Some(
            auth.employee_id
                .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?,
        )
    };

    let applications = leave_application::load_applications(pool.get_ref(), scope)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch leave applications");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let view = match query.view.as_deref() {
        None => ViewFilter::default(),
        Some(raw) => raw.parse::<ViewFilter>().map_err(|_| {
            actix_web::error::ErrorBadRequest("Invalid view. Allowed: all, pending, reviewed")
        })?,
    };

    let status = match query.status.as_deref() {
        None => StatusFilter::default(),
        Some(raw) => raw.parse::<StatusFilter>().map_err(|_| {
            actix_web::error::ErrorBadRequest(
                "Invalid status. Allowed: all, pending, accepted, denied",
            )
        })?,
    };

    let filter = ApplicationQuery {
        view,
        status,
        search: query.search.clone(),
    };
    let selected = filter_applications(&applications, &filter, auth.user_id);

    // -------------------------
    // Pagination (after filtering)
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = ((page - 1) * per_page) as usize;

    let total = selected.len() as u64;
    let data: Vec<LeaveApplication> = selected
        .into_iter()
        .skip(offset)
        .take(per_page as usize)
        .cloned()
        .collect();

    let response = LeaveListResponse {
        data,
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}

/* =========================
Application detail
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave application to fetch")
    ),
    responses(
        (status = 200, description = "Leave application found", body = LeaveApplication),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave application not found", body = Object, example = json!({
            "message": "Leave application not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let application = leave_application::load_application(pool.get_ref(), leave_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_id, "Failed to fetch leave application");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match application {
        Some(app) if auth.role == Role::Admin || auth.employee_id == Some(app.employee_id) => {
            Ok(HttpResponse::Ok().json(app))
        }
        Some(_) => Ok(HttpResponse::Forbidden().json(serde_json::json!({
            "message": "Not your application"
        }))),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Leave application not found"
        }))),
    }
}

/* =========================
Review leave application (Admin)
========================= */
/// Single-shot transition: a pending application becomes accepted or
/// denied exactly once, together with its review record.
#[utoipa::path(
    put,
    path = "/api/v1/leave/review/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave application to review")
    ),
    request_body = ReviewLeave,
    responses(
        (status = 200, description = "Leave application reviewed", body = Object, example = json!({
            "message": "Leave application reviewed",
            "status": "accepted"
        })),
        (status = 400, description = "Application not found or already reviewed", body = Object, example = json!({
            "message": "Leave application not found or already reviewed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn review_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<ReviewLeave>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let leave_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE leave_applications
        SET status = ?
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(payload.status.as_str())
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Review transition failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave application not found or already reviewed"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO leave_reviews
            (leave_application_id, reviewed_by, decision, comments)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(leave_id)
    .bind(auth.user_id)
    .bind(payload.status.as_str())
    .bind(payload.comments.as_deref())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to store leave review");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave application reviewed",
        "status": payload.status.as_str()
    })))
}
