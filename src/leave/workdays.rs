use chrono::{Datelike, NaiveDate, Weekday};

/// Count of Monday-Friday days in the inclusive `start..=end` range.
/// Public holidays are not considered, only weekends.
///
/// A reversed range counts as zero; date ordering is validated at
/// submission time, not here.
pub fn working_days(start: NaiveDate, end: NaiveDate) -> u32 {
    let mut days = 0;
    let mut cursor = start;

    while cursor <= end {
        if !matches!(cursor.weekday(), Weekday::Sat | Weekday::Sun) {
            days += 1;
        }
        let Some(next) = cursor.succ_opt() else {
            break;
        };
        cursor = next;
    }

    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn single_weekday_counts_one() {
        // 2024-03-06 is a Wednesday
        assert_eq!(working_days(d(2024, 3, 6), d(2024, 3, 6)), 1);
    }

    #[test]
    fn single_weekend_day_counts_zero() {
        // 2024-03-09 is a Saturday, 2024-03-10 a Sunday
        assert_eq!(working_days(d(2024, 3, 9), d(2024, 3, 9)), 0);
        assert_eq!(working_days(d(2024, 3, 10), d(2024, 3, 10)), 0);
    }

    #[test]
    fn monday_through_friday_counts_five() {
        assert_eq!(working_days(d(2024, 3, 4), d(2024, 3, 8)), 5);
    }

    #[test]
    fn any_seven_day_span_counts_five() {
        // one full cycle regardless of which weekday it starts on
        for offset in 0..7 {
            let start = d(2024, 3, 4 + offset);
            let end = start + chrono::Duration::days(6);
            assert_eq!(working_days(start, end), 5, "start {start}");
        }
    }

    #[test]
    fn reversed_range_counts_zero() {
        assert_eq!(working_days(d(2024, 3, 8), d(2024, 3, 4)), 0);
    }

    #[test]
    fn spans_across_years() {
        // Fri 2023-12-29 .. Tue 2024-01-02: Fri, Mon, Tue
        assert_eq!(working_days(d(2023, 12, 29), d(2024, 1, 2)), 3);
        // all of 2024: 52 weeks plus Mon/Tue
        assert_eq!(working_days(d(2024, 1, 1), d(2024, 12, 31)), 262);
    }
}
