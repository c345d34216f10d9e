use chrono::NaiveDate;

/// Upper bound of the review-screen rating scale.
pub const MAX_RATING: u32 = 5;

/// Presentational score shown on the review screen: a weight for the
/// leave type plus a weight for the requested span, capped at
/// [`MAX_RATING`]. Unrecognized types fall into the lowest weight bucket.
///
/// The weights carry no stated business justification; keep them here so
/// they can be revised without touching the rest of the accounting code.
pub fn leave_rating(leave_type: &str, start: NaiveDate, end: NaiveDate) -> u32 {
    let type_weight = match leave_type.trim().to_lowercase().as_str() {
        "annual" => 3,
        "sick" => 4,
        "personal" => 2,
        _ => 1,
    };

    // raw day span, not working days; a reversed range scores like a
    // same-day request
    let span = (end - start).num_days().max(0);
    let duration_weight = if span <= 3 {
        3
    } else if span <= 5 {
        2
    } else {
        1
    };

    (type_weight + duration_weight).min(MAX_RATING)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn short_sick_leave_hits_the_cap() {
        // 4 + 3 capped to 5
        assert_eq!(leave_rating("sick", d(2024, 3, 4), d(2024, 3, 5)), 5);
    }

    #[test]
    fn long_spans_score_lower() {
        // annual: 3 + 2 for a 5-day span, 3 + 1 past that
        assert_eq!(leave_rating("annual", d(2024, 3, 4), d(2024, 3, 9)), 5);
        assert_eq!(leave_rating("annual", d(2024, 3, 4), d(2024, 3, 20)), 4);
        assert_eq!(leave_rating("personal", d(2024, 3, 4), d(2024, 3, 20)), 3);
    }

    #[test]
    fn unknown_types_fall_into_the_default_bucket() {
        // 1 + 3, regardless of casing or whitespace
        assert_eq!(leave_rating("sabbatical", d(2024, 3, 4), d(2024, 3, 4)), 4);
        assert_eq!(leave_rating("  UNPAID ", d(2024, 3, 4), d(2024, 3, 4)), 4);
    }

    #[test]
    fn type_matching_ignores_case() {
        assert_eq!(
            leave_rating("Annual", d(2024, 3, 4), d(2024, 3, 4)),
            leave_rating("annual", d(2024, 3, 4), d(2024, 3, 4)),
        );
    }

    #[test]
    fn reversed_range_scores_like_same_day() {
        assert_eq!(
            leave_rating("personal", d(2024, 3, 8), d(2024, 3, 4)),
            leave_rating("personal", d(2024, 3, 4), d(2024, 3, 4)),
        );
    }
}
