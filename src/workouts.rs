use std::collections::HashSet;

use chrono::NaiveDate;

use crate::models::{WorkoutCategory, WorkoutSession, WorkoutTrendPoint};
use crate::revenue::change_percent;
use crate::window;

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutTrends {
    pub trend: Vec<WorkoutTrendPoint>,
    pub total_sessions: usize,
    pub avg_sessions_per_member: f64,
    pub change_percent: i64,
}

/// Tallies sessions per month for the three tracked categories.
///
/// Sessions in any other category are left out of the monthly tallies but
/// still count toward the total, the per-member average and the
/// month-over-month change.
pub fn summarize_workouts(
    sessions: &[WorkoutSession],
    months: usize,
    today: NaiveDate,
) -> WorkoutTrends {
    let buckets = window::build_trailing_months(months, today);

    let trend = buckets
        .iter()
        .map(|bucket| {
            let mut point = WorkoutTrendPoint {
                month: bucket.label.clone(),
                year: bucket.year,
                strength: 0,
                cardio: 0,
                yoga: 0,
            };
            for session in sessions.iter().filter(|s| bucket.contains(s.date)) {
                match session.category {
                    WorkoutCategory::Strength => point.strength += 1,
                    WorkoutCategory::Cardio => point.cardio += 1,
                    WorkoutCategory::Yoga => point.yoga += 1,
                    WorkoutCategory::Other(_) => {}
                }
            }
            point
        })
        .collect();

    // Month-over-month uses its own two-month window so a one-month
    // trend still has a previous month to compare against.
    let recent = window::build_trailing_months(2, today);
    let count_in = |index: usize| {
        sessions
            .iter()
            .filter(|session| recent[index].contains(session.date))
            .count()
    };
    let previous = count_in(0);
    let current = count_in(1);

    WorkoutTrends {
        trend,
        total_sessions: sessions.len(),
        avg_sessions_per_member: average_per_member(sessions),
        change_percent: change_percent(current as f64, previous as f64),
    }
}

fn average_per_member(sessions: &[WorkoutSession]) -> f64 {
    if sessions.is_empty() {
        return 0.0;
    }
    let members: HashSet<_> = sessions.iter().map(|session| session.member_id).collect();
    sessions.len() as f64 / members.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn session(member_id: Uuid, category: WorkoutCategory, date: NaiveDate) -> WorkoutSession {
        WorkoutSession {
            id: Uuid::new_v4(),
            member_id,
            category,
            date,
            duration_minutes: 45,
        }
    }

    #[test]
    fn empty_sessions_average_to_zero() {
        let trends = summarize_workouts(&[], 6, day(2023, 6, 15));
        assert_eq!(trends.avg_sessions_per_member, 0.0);
        assert_eq!(trends.total_sessions, 0);
        assert_eq!(trends.change_percent, 0);
        assert_eq!(trends.trend.len(), 6);
        assert!(trends
            .trend
            .iter()
            .all(|p| p.strength == 0 && p.cardio == 0 && p.yoga == 0));
    }

    #[test]
    fn tallies_categories_per_month() {
        let alex = Uuid::new_v4();
        let sessions = vec![
            session(alex, WorkoutCategory::Strength, day(2023, 5, 2)),
            session(alex, WorkoutCategory::Strength, day(2023, 6, 1)),
            session(alex, WorkoutCategory::Cardio, day(2023, 6, 3)),
            session(alex, WorkoutCategory::Yoga, day(2023, 6, 9)),
            session(alex, WorkoutCategory::Yoga, day(2022, 6, 9)),
        ];
        let trends = summarize_workouts(&sessions, 2, day(2023, 6, 15));
        assert_eq!(trends.trend[0].strength, 1);
        assert_eq!(trends.trend[1].strength, 1);
        assert_eq!(trends.trend[1].cardio, 1);
        assert_eq!(trends.trend[1].yoga, 1);
    }

    #[test]
    fn other_categories_are_untallied_but_counted() {
        let member = Uuid::new_v4();
        let sessions = vec![
            session(member, WorkoutCategory::Other("Pilates".into()), day(2023, 6, 1)),
            session(member, WorkoutCategory::Cardio, day(2023, 6, 2)),
        ];
        let trends = summarize_workouts(&sessions, 1, day(2023, 6, 15));
        let june = &trends.trend[0];
        assert_eq!(june.strength + june.cardio + june.yoga, 1);
        assert_eq!(trends.total_sessions, 2);
        assert_eq!(trends.avg_sessions_per_member, 2.0);
    }

    #[test]
    fn average_divides_by_distinct_members() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let sessions = vec![
            session(a, WorkoutCategory::Cardio, day(2023, 6, 1)),
            session(a, WorkoutCategory::Cardio, day(2023, 6, 2)),
            session(b, WorkoutCategory::Yoga, day(2023, 6, 3)),
            session(c, WorkoutCategory::Yoga, day(2023, 6, 4)),
            session(c, WorkoutCategory::Yoga, day(2023, 6, 5)),
        ];
        let trends = summarize_workouts(&sessions, 6, day(2023, 6, 15));
        assert_eq!(trends.avg_sessions_per_member, 5.0 / 3.0);
    }

    #[test]
    fn change_uses_zero_guard_on_previous_month() {
        let member = Uuid::new_v4();
        let only_current = vec![session(member, WorkoutCategory::Cardio, day(2023, 6, 2))];
        assert_eq!(
            summarize_workouts(&only_current, 6, day(2023, 6, 15)).change_percent,
            0
        );

        let sessions = vec![
            session(member, WorkoutCategory::Cardio, day(2022, 12, 30)),
            session(member, WorkoutCategory::Cardio, day(2022, 12, 31)),
            session(member, WorkoutCategory::Strength, day(2023, 1, 3)),
        ];
        // Previous month lives in the prior year.
        assert_eq!(summarize_workouts(&sessions, 1, day(2023, 1, 10)).change_percent, -50);
    }
}
