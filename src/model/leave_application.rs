use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use sqlx::prelude::FromRow;
use strum::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LeaveStatus {
    Pending,
    Accepted,
    Denied,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LeaveMode {
    Full,
    Half,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeRef {
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "Engineering", nullable = true)]
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewerRef {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = "admin")]
    pub name: String,
}

/// Present only on applications that left the pending state.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaveReview {
    pub reviewer: Option<ReviewerRef>,
    #[schema(example = "Approved, enjoy your leave", nullable = true)]
    pub comments: Option<String>,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub reviewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LeaveApplication {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    pub employee: EmployeeRef,
    #[schema(example = "annual")]
    pub leave_type: String,
    #[schema(example = "full")]
    pub leave_mode: LeaveMode,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family vacation")]
    pub reason: String,
    #[schema(example = "pending")]
    pub status: LeaveStatus,
    #[schema(example = "2026-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub applied_at: Option<DateTime<Utc>>,
    pub review: Option<LeaveReview>,
}

/// Flat shape coming back from the list query. The review columns are
/// LEFT JOINed and arrive as NULLs when no review row exists.
#[derive(FromRow)]
pub struct LeaveApplicationRow {
    pub id: u64,
    pub employee_id: u64,
    pub employee_name: String,
    pub department: Option<String>,
    pub leave_type: String,
    pub leave_mode: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: Option<String>,
    pub applied_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<u64>,
    pub reviewer_name: Option<String>,
    pub review_comments: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl From<LeaveApplicationRow> for LeaveApplication {
    fn from(row: LeaveApplicationRow) -> Self {
        let LeaveApplicationRow {
            id,
            employee_id,
            employee_name,
            department,
            leave_type,
            leave_mode,
            start_date,
            end_date,
            reason,
            status,
            applied_at,
            reviewed_by,
            reviewer_name,
            review_comments,
            reviewed_at,
        } = row;

        // Stored statuses arrive with inconsistent casing; anything
        // unrecognized stays reviewable instead of blowing up.
        let status = status
            .as_deref()
            .map(str::trim)
            .and_then(|s| s.parse().ok())
            .unwrap_or(LeaveStatus::Pending);

        let leave_mode = leave_mode
            .as_deref()
            .map(str::trim)
            .and_then(|m| m.parse().ok())
            .unwrap_or(LeaveMode::Full);

        // A review exists only when the join produced a row; NULL fields
        // inside an existing row are kept as None, not invented.
        let review = if reviewed_by.is_some() || reviewed_at.is_some() || review_comments.is_some()
        {
            Some(LeaveReview {
                reviewer: reviewed_by.map(|id| ReviewerRef {
                    id,
                    name: reviewer_name.unwrap_or_default(),
                }),
                comments: review_comments,
                reviewed_at,
            })
        } else {
            None
        };

        LeaveApplication {
            id,
            employee_id,
            employee: EmployeeRef {
                name: employee_name,
                department,
            },
            leave_type,
            leave_mode,
            start_date,
            end_date,
            reason,
            status,
            applied_at,
            review,
        }
    }
}

const LIST_SQL: &str = r#"
    SELECT
        la.id,
        la.employee_id,
        CONCAT(e.first_name, ' ', e.last_name) AS employee_name,
        e.department,
        la.leave_type,
        la.leave_mode,
        la.start_date,
        la.end_date,
        la.reason,
        la.status,
        la.applied_at,
        r.reviewed_by,
        ru.username AS reviewer_name,
        r.comments AS review_comments,
        r.reviewed_at
    FROM leave_applications la
    JOIN employees e ON e.id = la.employee_id
    LEFT JOIN leave_reviews r ON r.leave_application_id = la.id
    LEFT JOIN users ru ON ru.id = r.reviewed_by
"#;

/// Fetch applications with employee and review context, newest first.
/// `employee_id` scopes the list to one employee's own history.
pub async fn load_applications(
    pool: &MySqlPool,
    employee_id: Option<u64>,
) -> sqlx::Result<Vec<LeaveApplication>> {
    let mut sql = String::from(LIST_SQL);
    if employee_id.is_some() {
        sql.push_str(" WHERE la.employee_id = ?");
    }
    sql.push_str(" ORDER BY la.applied_at DESC");

    let mut query = sqlx::query_as::<_, LeaveApplicationRow>(&sql);
    if let Some(id) = employee_id {
        query = query.bind(id);
    }

    let rows = query.fetch_all(pool).await?;
    Ok(rows.into_iter().map(LeaveApplication::from).collect())
}

pub async fn load_application(
    pool: &MySqlPool,
    id: u64,
) -> sqlx::Result<Option<LeaveApplication>> {
    let sql = format!("{} WHERE la.id = ?", LIST_SQL);

    let row = sqlx::query_as::<_, LeaveApplicationRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(LeaveApplication::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> LeaveApplicationRow {
        LeaveApplicationRow {
            id: 1,
            employee_id: 1000,
            employee_name: "Jane Doe".into(),
            department: Some("Engineering".into()),
            leave_type: "annual".into(),
            leave_mode: Some("full".into()),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            reason: "Family vacation".into(),
            status: Some("pending".into()),
            applied_at: None,
            reviewed_by: None,
            reviewer_name: None,
            review_comments: None,
            reviewed_at: None,
        }
    }

    #[test]
    fn status_parsing_ignores_case() {
        for raw in ["Accepted", "ACCEPTED", " accepted "] {
            let mut r = row();
            r.status = Some(raw.into());
            let app = LeaveApplication::from(r);
            assert_eq!(app.status, LeaveStatus::Accepted);
        }
    }

    #[test]
    fn unknown_status_normalizes_to_pending() {
        let mut r = row();
        r.status = Some("archived".into());
        assert_eq!(LeaveApplication::from(r).status, LeaveStatus::Pending);

        let mut r = row();
        r.status = None;
        assert_eq!(LeaveApplication::from(r).status, LeaveStatus::Pending);
    }

    #[test]
    fn unknown_mode_normalizes_to_full() {
        let mut r = row();
        r.leave_mode = Some("quarter".into());
        assert_eq!(LeaveApplication::from(r).leave_mode, LeaveMode::Full);
    }

    #[test]
    fn absent_review_row_yields_none() {
        let app = LeaveApplication::from(row());
        assert!(app.review.is_none());
    }

    #[test]
    fn review_row_with_null_fields_is_kept() {
        let mut r = row();
        r.status = Some("denied".into());
        r.reviewed_by = Some(7);
        r.reviewer_name = Some("admin".into());
        let app = LeaveApplication::from(r);

        let review = app.review.expect("review should be present");
        assert_eq!(review.reviewer.as_ref().map(|rv| rv.id), Some(7));
        assert!(review.comments.is_none());
        assert!(review.reviewed_at.is_none());
    }

    #[test]
    fn status_serializes_lowercase() {
        let v = serde_json::to_value(LeaveStatus::Denied).unwrap();
        assert_eq!(v, serde_json::json!("denied"));
    }
}
