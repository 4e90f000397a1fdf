use chrono::{Datelike, Duration, NaiveDate};

/// One calendar month inside a trailing window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthBucket {
    /// Zero-based month, 0 = January.
    pub month0: u32,
    pub year: i32,
    pub label: String,
}

impl MonthBucket {
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month0 + 1, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let (year, month) = if self.month0 == 11 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month0 + 2)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|next| next - Duration::days(1))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day() && date <= self.last_day()
    }
}

/// Longest window the builder will produce, in months.
pub const MAX_WINDOW_MONTHS: usize = 1200;

/// Returns the `n` calendar months ending with the anchor's month, oldest first.
///
/// `n` is clamped to `1..=MAX_WINDOW_MONTHS`.
pub fn build_trailing_months(n: usize, anchor: NaiveDate) -> Vec<MonthBucket> {
    let n = n.clamp(1, MAX_WINDOW_MONTHS) as i32;
    let anchor_index = anchor.year() * 12 + anchor.month0() as i32;

    (0..n)
        .map(|offset| {
            let index = anchor_index - (n - 1) + offset;
            let year = index.div_euclid(12);
            let month0 = index.rem_euclid(12) as u32;
            MonthBucket {
                month0,
                year,
                label: month_label(month0).to_string(),
            }
        })
        .collect()
}

fn month_label(month0: u32) -> &'static str {
    const LABELS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    LABELS[month0 as usize % 12]
}
