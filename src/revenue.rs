use chrono::NaiveDate;

use crate::models::{Payment, RevenuePoint};
use crate::window;

#[derive(Debug, Clone, PartialEq)]
pub struct RevenueSummary {
    pub trend: Vec<RevenuePoint>,
    pub current: f64,
    pub previous: f64,
    pub change_percent: i64,
}

pub fn summarize_revenue(payments: &[Payment], months: usize, today: NaiveDate) -> RevenueSummary {
    let buckets = window::build_trailing_months(months, today);

    let trend: Vec<RevenuePoint> = buckets
        .iter()
        .map(|bucket| RevenuePoint {
            month: bucket.label.clone(),
            year: bucket.year,
            revenue: payments
                .iter()
                .filter(|payment| bucket.contains(payment.date))
                .map(|payment| payment.amount)
                .sum(),
        })
        .collect();

    let current = trend.last().map(|point| point.revenue).unwrap_or(0.0);
    let previous = if trend.len() >= 2 {
        trend[trend.len() - 2].revenue
    } else {
        0.0
    };

    RevenueSummary {
        change_percent: change_percent(current, previous),
        trend,
        current,
        previous,
    }
}

/// Percent change from `previous` to `current`; 0 whenever `previous` is 0.
pub fn change_percent(current: f64, previous: f64) -> i64 {
    if previous == 0.0 {
        return 0;
    }
    round_half_up((current - previous) / previous * 100.0)
}

pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn payment(year: i32, month: u32, day: u32, amount: f64) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            member_id: Uuid::new_v4(),
            amount,
            date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
        }
    }

    fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn doubles_month_over_month() {
        let payments = vec![payment(2023, 1, 15, 100.0), payment(2023, 2, 10, 200.0)];
        let summary = summarize_revenue(&payments, 2, day(2023, 2, 20));
        assert_eq!(summary.current, 200.0);
        assert_eq!(summary.previous, 100.0);
        assert_eq!(summary.change_percent, 100);
    }

    #[test]
    fn zero_previous_month_yields_zero_change() {
        let payments = vec![payment(2023, 2, 10, 750.0)];
        let summary = summarize_revenue(&payments, 6, day(2023, 2, 28));
        assert_eq!(summary.current, 750.0);
        assert_eq!(summary.change_percent, 0);
    }

    #[test]
    fn single_month_window_has_no_previous() {
        let payments = vec![payment(2023, 1, 15, 100.0), payment(2023, 2, 10, 200.0)];
        let summary = summarize_revenue(&payments, 1, day(2023, 2, 20));
        assert_eq!(summary.trend.len(), 1);
        assert_eq!(summary.previous, 0.0);
        assert_eq!(summary.change_percent, 0);
    }

    #[test]
    fn refunds_reduce_buckets_below_zero() {
        let payments = vec![payment(2023, 3, 1, 50.0), payment(2023, 3, 9, -80.0)];
        let summary = summarize_revenue(&payments, 3, day(2023, 3, 31));
        assert_eq!(summary.current, -30.0);
        assert_eq!(summary.trend[0].revenue, 0.0);
        assert_eq!(summary.trend[1].revenue, 0.0);
    }

    #[test]
    fn same_month_of_previous_year_is_not_counted() {
        let payments = vec![payment(2022, 2, 10, 999.0), payment(2023, 2, 10, 10.0)];
        let summary = summarize_revenue(&payments, 12, day(2023, 2, 1));
        assert_eq!(summary.current, 10.0);
        let total: f64 = summary.trend.iter().map(|point| point.revenue).sum();
        assert_eq!(total, 10.0);
    }

    #[test]
    fn rounding_goes_half_up() {
        assert_eq!(round_half_up(12.5), 13);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(change_percent(1.0, 3.0), -67);
    }
}
