use strum::EnumString;

use crate::model::leave_application::{LeaveApplication, LeaveStatus};

/// Administrator list views. `Reviewed` means "reviewed by me", not
/// reviewed by anyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ViewFilter {
    #[default]
    All,
    Pending,
    Reviewed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Accepted,
    Denied,
}

impl StatusFilter {
    pub fn matches(self, status: LeaveStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => status == LeaveStatus::Pending,
            StatusFilter::Accepted => status == LeaveStatus::Accepted,
            StatusFilter::Denied => status == LeaveStatus::Denied,
        }
    }
}

#[derive(Debug, Default)]
pub struct ApplicationQuery {
    pub view: ViewFilter,
    pub status: StatusFilter,
    /// Case-insensitive substring match on the employee display name.
    pub search: Option<String>,
}

/// Apply the view, status and name filters; all active filters combine
/// with AND. `reviewer_id` scopes the `reviewed` view to applications the
/// acting administrator closed.
pub fn filter_applications<'a>(
    applications: &'a [LeaveApplication],
    query: &ApplicationQuery,
    reviewer_id: u64,
) -> Vec<&'a LeaveApplication> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    applications
        .iter()
        .filter(|app| match query.view {
            ViewFilter::All => true,
            ViewFilter::Pending => app.status == LeaveStatus::Pending,
            ViewFilter::Reviewed => reviewed_by(app, reviewer_id),
        })
        .filter(|app| query.status.matches(app.status))
        .filter(|app| {
            needle
                .as_deref()
                .map_or(true, |n| app.employee.name.to_lowercase().contains(n))
        })
        .collect()
}

fn reviewed_by(app: &LeaveApplication, reviewer_id: u64) -> bool {
    app.status != LeaveStatus::Pending
        && app
            .review
            .as_ref()
            .and_then(|review| review.reviewer.as_ref())
            .map_or(false, |reviewer| reviewer.id == reviewer_id)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::leave_application::{EmployeeRef, LeaveMode, LeaveReview, ReviewerRef};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn leave(name: &str, status: LeaveStatus) -> LeaveApplication {
        LeaveApplication {
            id: 0,
            employee_id: 1000,
            employee: EmployeeRef {
                name: name.into(),
                department: None,
            },
            leave_type: "annual".into(),
            leave_mode: LeaveMode::Full,
            start_date: d(2024, 3, 4),
            end_date: d(2024, 3, 8),
            reason: "some reason".into(),
            status,
            applied_at: None,
            review: None,
        }
    }

    fn reviewed(name: &str, status: LeaveStatus, reviewer_id: u64) -> LeaveApplication {
        let mut app = leave(name, status);
        app.review = Some(LeaveReview {
            reviewer: Some(ReviewerRef {
                id: reviewer_id,
                name: "admin".into(),
            }),
            comments: None,
            reviewed_at: None,
        });
        app
    }

    #[test]
    fn default_query_passes_everything() {
        let apps = vec![
            leave("Jane Doe", LeaveStatus::Pending),
            reviewed("John Roe", LeaveStatus::Accepted, 7),
        ];
        let out = filter_applications(&apps, &ApplicationQuery::default(), 1);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn pending_view_excludes_closed_applications() {
        let apps = vec![
            leave("Jane Doe", LeaveStatus::Pending),
            reviewed("John Roe", LeaveStatus::Denied, 7),
        ];
        let query = ApplicationQuery {
            view: ViewFilter::Pending,
            ..Default::default()
        };
        let out = filter_applications(&apps, &query, 7);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].status, LeaveStatus::Pending);
    }

    #[test]
    fn reviewed_view_is_scoped_to_the_acting_admin() {
        let apps = vec![
            reviewed("Jane Doe", LeaveStatus::Accepted, 7),
            reviewed("John Roe", LeaveStatus::Denied, 8),
        ];
        let query = ApplicationQuery {
            view: ViewFilter::Reviewed,
            ..Default::default()
        };

        let mine = filter_applications(&apps, &query, 7);
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].employee.name, "Jane Doe");

        let theirs = filter_applications(&apps, &query, 8);
        assert_eq!(theirs.len(), 1);
        assert_eq!(theirs[0].employee.name, "John Roe");
    }

    #[test]
    fn reviewed_view_ignores_pending_and_reviewless_records() {
        // a pending record and a closed record missing its review both
        // stay out of the reviewed view
        let apps = vec![
            leave("Jane Doe", LeaveStatus::Pending),
            leave("John Roe", LeaveStatus::Accepted),
        ];
        let query = ApplicationQuery {
            view: ViewFilter::Reviewed,
            ..Default::default()
        };
        assert!(filter_applications(&apps, &query, 7).is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let apps = vec![
            leave("Jane Doe", LeaveStatus::Pending),
            leave("John Roe", LeaveStatus::Pending),
        ];
        let query = ApplicationQuery {
            search: Some("jane".into()),
            ..Default::default()
        };
        let out = filter_applications(&apps, &query, 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].employee.name, "Jane Doe");
    }

    #[test]
    fn blank_search_is_ignored() {
        let apps = vec![leave("Jane Doe", LeaveStatus::Pending)];
        let query = ApplicationQuery {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(filter_applications(&apps, &query, 1).len(), 1);
    }

    #[test]
    fn active_filters_combine_with_and() {
        let apps = vec![
            reviewed("Jane Doe", LeaveStatus::Accepted, 7),
            reviewed("Jane Smith", LeaveStatus::Denied, 7),
            reviewed("John Roe", LeaveStatus::Accepted, 7),
        ];
        let query = ApplicationQuery {
            view: ViewFilter::Reviewed,
            status: StatusFilter::Accepted,
            search: Some("JANE".into()),
        };
        let out = filter_applications(&apps, &query, 7);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].employee.name, "Jane Doe");
    }

    #[test]
    fn filters_parse_case_insensitively() {
        assert_eq!("Pending".parse::<ViewFilter>().unwrap(), ViewFilter::Pending);
        assert_eq!(
            "ACCEPTED".parse::<StatusFilter>().unwrap(),
            StatusFilter::Accepted
        );
        assert!("closed".parse::<ViewFilter>().is_err());
    }
}
