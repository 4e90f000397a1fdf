use anyhow::Context;
use clap::builder::RangedU64ValueParser;
use clap::Args;

use crate::window::MAX_WINDOW_MONTHS;

pub const DEFAULT_WINDOW_MONTHS: usize = 6;
pub const DEFAULT_SIGNUP_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Knobs for one aggregation pass.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct StatsConfig {
    /// Number of calendar months in the trend window
    #[arg(
        long = "months",
        default_value_t = DEFAULT_WINDOW_MONTHS,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_WINDOW_MONTHS as u64)
    )]
    pub window_months: usize,
    /// Days counted as "new" when reporting signups
    #[arg(long, default_value_t = DEFAULT_SIGNUP_WINDOW_DAYS)]
    pub signup_window_days: i64,
    /// Members listed under recent activity
    #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
    pub recent_limit: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            window_months: DEFAULT_WINDOW_MONTHS,
            signup_window_days: DEFAULT_SIGNUP_WINDOW_DAYS,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

pub fn database_url() -> anyhow::Result<String> {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            log::warn!("ignoring unreadable .env file: {err}");
        }
    }
    std::env::var("DATABASE_URL").context("DATABASE_URL must be set to a Postgres instance")
}
