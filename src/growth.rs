use chrono::{Duration, NaiveDate};

use crate::models::{GrowthPoint, Member};
use crate::revenue::round_half_up;
use crate::window;

#[derive(Debug, Clone, PartialEq)]
pub struct MemberGrowth {
    pub curve: Vec<GrowthPoint>,
    pub new_signups: usize,
    /// Members added between the last two points of the curve.
    pub latest_month_joins: i64,
    pub signup_change_percent: i64,
}

/// Builds the cumulative headcount curve and the rolling signup metrics.
///
/// The signup change compares a rolling day count with the delta between the
/// second-to-last and third-to-last curve points. Points missing from short
/// windows count as 0.
pub fn summarize_growth(
    members: &[Member],
    months: usize,
    signup_window_days: i64,
    today: NaiveDate,
) -> MemberGrowth {
    let buckets = window::build_trailing_months(months, today);

    let curve: Vec<GrowthPoint> = buckets
        .iter()
        .map(|bucket| {
            let month_end = bucket.last_day();
            GrowthPoint {
                month: bucket.label.clone(),
                year: bucket.year,
                members: members
                    .iter()
                    .filter(|member| member.join_date <= month_end)
                    .count(),
            }
        })
        .collect();

    let new_signups = count_recent_signups(members, signup_window_days, today);

    let point = |back: usize| -> i64 {
        curve
            .len()
            .checked_sub(back)
            .and_then(|index| curve.get(index))
            .map(|p| p.members as i64)
            .unwrap_or(0)
    };
    let latest_month_joins = point(1) - point(2);
    let prior_month_joins = point(2) - point(3);

    let signup_change_percent = if prior_month_joins > 0 {
        round_half_up(
            (new_signups as f64 - prior_month_joins as f64) / prior_month_joins as f64 * 100.0,
        )
    } else if new_signups > 0 {
        100
    } else {
        0
    };

    MemberGrowth {
        curve,
        new_signups,
        latest_month_joins,
        signup_change_percent,
    }
}

pub fn count_recent_signups(members: &[Member], window_days: i64, today: NaiveDate) -> usize {
    let cutoff = today - Duration::days(window_days.max(0));
    members
        .iter()
        .filter(|member| member.join_date >= cutoff && member.join_date <= today)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberStatus;
    use uuid::Uuid;

    fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn member(join_date: NaiveDate) -> Member {
        Member {
            id: Uuid::new_v4(),
            name: "Sam Rivera".to_string(),
            join_date,
            status: MemberStatus::Active,
            last_activity: None,
        }
    }

    #[test]
    fn curve_is_cumulative_and_non_decreasing() {
        let members = vec![
            member(day(2022, 11, 3)),
            member(day(2023, 1, 31)),
            member(day(2023, 2, 1)),
            member(day(2023, 4, 18)),
            member(day(2023, 4, 30)),
        ];
        let growth = summarize_growth(&members, 6, 30, day(2023, 4, 30));
        let counts: Vec<usize> = growth.curve.iter().map(|p| p.members).collect();
        assert_eq!(counts, vec![1, 1, 2, 3, 3, 5]);
        assert!(counts.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn month_end_is_inclusive() {
        let members = vec![member(day(2023, 1, 31))];
        let growth = summarize_growth(&members, 2, 30, day(2023, 2, 15));
        assert_eq!(growth.curve[0].members, 1);
    }

    #[test]
    fn signups_use_a_rolling_window() {
        let today = day(2023, 5, 10);
        let members = vec![
            member(today),
            member(today - Duration::days(30)),
            member(today - Duration::days(31)),
            member(today + Duration::days(2)),
        ];
        assert_eq!(count_recent_signups(&members, 30, today), 2);
    }

    #[test]
    fn signup_change_compares_against_prior_month_delta() {
        let today = day(2023, 6, 20);
        let members = vec![
            member(day(2023, 3, 1)),
            member(day(2023, 4, 2)),
            member(day(2023, 4, 20)),
            member(day(2023, 6, 1)),
            member(day(2023, 6, 10)),
            member(day(2023, 6, 15)),
        ];
        let growth = summarize_growth(&members, 4, 30, today);
        let counts: Vec<usize> = growth.curve.iter().map(|p| p.members).collect();
        assert_eq!(counts, vec![1, 3, 3, 6]);
        assert_eq!(growth.latest_month_joins, 3);
        assert_eq!(growth.new_signups, 3);
        // d0 = curve[-2] - curve[-3] = 0, so any signup reports 100.
        assert_eq!(growth.signup_change_percent, 100);

        let growth = summarize_growth(&members, 4, 30, day(2023, 5, 20));
        // Curve Feb..May = [0, 1, 3, 3]; d0 = 2 against one signup on Apr 20.
        assert_eq!(growth.new_signups, 1);
        assert_eq!(growth.signup_change_percent, -50);
    }

    #[test]
    fn short_windows_treat_missing_points_as_zero() {
        let today = day(2023, 6, 20);
        let members = vec![member(day(2023, 5, 2)), member(day(2023, 6, 5))];
        let growth = summarize_growth(&members, 2, 30, today);
        // d0 = curve[-2] - 0 = 1; one rolling signup.
        assert_eq!(growth.signup_change_percent, 0);
    }

    #[test]
    fn empty_membership_reports_zero() {
        let growth = summarize_growth(&[], 6, 30, day(2023, 6, 20));
        assert!(growth.curve.iter().all(|p| p.members == 0));
        assert_eq!(growth.new_signups, 0);
        assert_eq!(growth.signup_change_percent, 0);
    }
}
