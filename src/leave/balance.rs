use serde::Serialize;
use utoipa::ToSchema;

use crate::leave::workdays::working_days;
use crate::model::leave_application::{LeaveApplication, LeaveStatus};

/// Fixed annual entitlement in working days. Not configurable per
/// employee.
pub const ANNUAL_ALLOWANCE: u32 = 30;

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct LeaveBalance {
    #[schema(example = 30)]
    pub allowed: u32,
    #[schema(example = 8)]
    pub used: u32,
    #[schema(example = 22)]
    pub remaining: u32,
}

/// Balance over one employee's applications. Only accepted applications
/// consume allowance; pending and denied ones are informational.
pub fn leave_balance(applications: &[LeaveApplication]) -> LeaveBalance {
    let used = applications
        .iter()
        .filter(|app| app.status == LeaveStatus::Accepted)
        .map(|app| working_days(app.start_date, app.end_date))
        .sum();

    LeaveBalance {
        allowed: ANNUAL_ALLOWANCE,
        used,
        remaining: ANNUAL_ALLOWANCE.saturating_sub(used),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::leave_application::{EmployeeRef, LeaveMode};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn leave(status: LeaveStatus, start: NaiveDate, end: NaiveDate) -> LeaveApplication {
        LeaveApplication {
            id: 0,
            employee_id: 1000,
            employee: EmployeeRef {
                name: "Jane Doe".into(),
                department: None,
            },
            leave_type: "annual".into(),
            leave_mode: LeaveMode::Full,
            start_date: start,
            end_date: end,
            reason: "some reason".into(),
            status,
            applied_at: None,
            review: None,
        }
    }

    #[test]
    fn no_accepted_applications_leaves_full_allowance() {
        let balance = leave_balance(&[]);
        assert_eq!(balance.used, 0);
        assert_eq!(balance.allowed, 30);
        assert_eq!(balance.remaining, 30);

        let apps = vec![
            leave(LeaveStatus::Pending, d(2024, 3, 4), d(2024, 3, 8)),
            leave(LeaveStatus::Denied, d(2024, 4, 1), d(2024, 4, 5)),
        ];
        let balance = leave_balance(&apps);
        assert_eq!(balance.used, 0);
        assert_eq!(balance.remaining, 30);
    }

    #[test]
    fn accepted_spans_sum_into_used_days() {
        // Mon-Wed (3 working days) and Mon-Fri (5 working days)
        let apps = vec![
            leave(LeaveStatus::Accepted, d(2024, 3, 4), d(2024, 3, 6)),
            leave(LeaveStatus::Accepted, d(2024, 4, 1), d(2024, 4, 5)),
        ];
        let balance = leave_balance(&apps);
        assert_eq!(balance.used, 8);
        assert_eq!(balance.remaining, 22);
    }

    #[test]
    fn remaining_never_goes_negative() {
        // Two month-long spans blow well past the allowance
        let apps = vec![
            leave(LeaveStatus::Accepted, d(2024, 3, 1), d(2024, 3, 31)),
            leave(LeaveStatus::Accepted, d(2024, 5, 1), d(2024, 5, 31)),
        ];
        let balance = leave_balance(&apps);
        assert!(balance.used > ANNUAL_ALLOWANCE);
        assert_eq!(balance.remaining, 0);
    }
}
