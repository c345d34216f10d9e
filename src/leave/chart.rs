use chrono::{Datelike, Duration, NaiveDate};
use derive_more::Display;
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::leave_application::{LeaveApplication, LeaveStatus};

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Visual severity of a day's on-leave head count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoadBand {
    #[display(fmt = "low")]
    Low,
    #[display(fmt = "medium")]
    Medium,
    #[display(fmt = "high")]
    High,
}

/// Up to 3 concurrent absences is low, 4-6 medium, above that high.
pub fn load_band(count: u32) -> LoadBand {
    if count <= 3 {
        LoadBand::Low
    } else if count <= 6 {
        LoadBand::Medium
    } else {
        LoadBand::High
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DayLoad {
    #[schema(example = "Mon")]
    pub label: String,
    #[schema(example = "2024-03-04", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = 2)]
    pub count: u32,
    pub band: LoadBand,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthLoad {
    #[schema(example = "Mar")]
    pub label: String,
    #[schema(example = 2024)]
    pub year: i32,
    #[schema(example = 3)]
    pub month: u32,
    #[schema(example = 4)]
    pub count: u32,
}

/// Monday of the week containing `today`. A Sunday evaluates as the week
/// ending that day, i.e. the preceding Monday.
pub fn week_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(today.weekday().num_days_from_monday() as i64)
}

/// Accepted applications whose inclusive [start, end] range contains
/// `date`.
pub fn on_leave_count(applications: &[LeaveApplication], date: NaiveDate) -> u32 {
    applications
        .iter()
        .filter(|app| {
            app.status == LeaveStatus::Accepted
                && app.start_date <= date
                && date <= app.end_date
        })
        .count() as u32
}

/// Head counts for the five weekdays of the evaluation week.
pub fn weekly_load(applications: &[LeaveApplication], today: NaiveDate) -> Vec<DayLoad> {
    let monday = week_start(today);

    (0..5)
        .map(|offset| {
            let date = monday + Duration::days(offset);
            let count = on_leave_count(applications, date);
            DayLoad {
                label: date.format("%a").to_string(),
                date,
                count,
                band: load_band(count),
            }
        })
        .collect()
}

/// Accepted applications bucketed over the six calendar months ending
/// with the evaluation month, by start date. Buckets are (year, month)
/// qualified, so a lookback across New Year keeps the two years apart.
pub fn monthly_load(applications: &[LeaveApplication], today: NaiveDate) -> Vec<MonthLoad> {
    let mut window = Vec::with_capacity(6);
    let (mut year, mut month) = (today.year(), today.month());
    for _ in 0..6 {
        window.push((year, month));
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }
    window.reverse();

    window
        .into_iter()
        .map(|(year, month)| {
            let count = applications
                .iter()
                .filter(|app| {
                    app.status == LeaveStatus::Accepted
                        && app.start_date.year() == year
                        && app.start_date.month() == month
                })
                .count() as u32;
            MonthLoad {
                label: MONTH_LABELS[(month - 1) as usize].to_string(),
                year,
                month,
                count,
            }
        })
        .collect()
}
