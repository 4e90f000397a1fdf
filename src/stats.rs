use std::cmp::Reverse;

use chrono::{DateTime, NaiveDate, Utc};

use crate::config::StatsConfig;
use crate::growth;
use crate::models::{
    Activity, DashboardStats, Member, MemberStatus, Payment, RecentActivity, Trainer,
    TrainerStatus, WorkoutSession,
};
use crate::revenue;
use crate::source::SourceState;
use crate::workouts;

const NO_ACTIVITY: &str = "No activity";
const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone)]
pub struct Sources {
    pub members: SourceState<Member>,
    pub trainers: SourceState<Trainer>,
    pub payments: SourceState<Payment>,
    pub workouts: SourceState<WorkoutSession>,
}

impl Sources {
    fn all_ready(&self) -> bool {
        self.members.is_ready()
            && self.trainers.is_ready()
            && self.payments.is_ready()
            && self.workouts.is_ready()
    }
}

/// Recomputes dashboard stats when every source has loaded cleanly.
///
/// Returns `None` while any source is still loading or reports an error, in
/// which case the caller keeps whatever stats it already shows.
pub fn evaluate(sources: &Sources, today: NaiveDate, config: &StatsConfig) -> Option<DashboardStats> {
    if !sources.all_ready() {
        log::debug!("skipping stats pass, sources not ready");
        return None;
    }
    Some(build_stats(sources, today, config))
}

fn build_stats(sources: &Sources, today: NaiveDate, config: &StatsConfig) -> DashboardStats {
    let members = &sources.members.data;
    let payments = &sources.payments.data;
    let sessions = &sources.workouts.data;

    let revenue = revenue::summarize_revenue(payments, config.window_months, today);
    let growth = growth::summarize_growth(
        members,
        config.window_months,
        config.signup_window_days,
        today,
    );
    let workouts = workouts::summarize_workouts(sessions, config.window_months, today);

    let stats = DashboardStats {
        total_members: members.len(),
        active_members: members
            .iter()
            .filter(|member| member.status == MemberStatus::Active)
            .count(),
        active_trainers: sources
            .trainers
            .data
            .iter()
            .filter(|trainer| trainer.status == TrainerStatus::Active)
            .count(),
        monthly_revenue: revenue.current,
        previous_month_revenue: revenue.previous,
        revenue_change_percent: revenue.change_percent,
        new_signups: growth.new_signups,
        signup_change_percent: growth.signup_change_percent,
        total_sessions: workouts.total_sessions,
        avg_sessions_per_member: workouts.avg_sessions_per_member,
        session_change_percent: workouts.change_percent,
        revenue_trend: revenue.trend,
        member_growth: growth.curve,
        workout_trends: workouts.trend,
        recent_activities: recent_activities(members, config.recent_limit, today),
    };

    log::info!(
        "stats pass complete: {} members, {} payments, {} sessions",
        stats.total_members,
        payments.len(),
        stats.total_sessions
    );
    stats
}

/// Members ordered by most recent dated activity. Undated members sort last
/// and keep their input order.
pub fn recent_activities(members: &[Member], limit: usize, today: NaiveDate) -> Vec<RecentActivity> {
    let epoch = DateTime::<Utc>::UNIX_EPOCH.date_naive();
    let mut ordered: Vec<&Member> = members.iter().collect();
    ordered.sort_by_key(|member| {
        Reverse(
            member
                .last_activity
                .as_ref()
                .and_then(Activity::date)
                .unwrap_or(epoch),
        )
    });

    ordered
        .into_iter()
        .take(limit)
        .map(|member| {
            let (activity_type, time_label) = normalize_activity(member.last_activity.as_ref(), today);
            RecentActivity {
                name: non_empty(&member.name, UNKNOWN),
                activity_type,
                time_label,
                status: member.status.to_string(),
            }
        })
        .collect()
}

/// Splits an activity into its display type and relative time label.
pub fn normalize_activity(activity: Option<&Activity>, today: NaiveDate) -> (String, String) {
    match activity {
        Some(Activity::Record {
            activity_type,
            date,
        }) => (non_empty(activity_type, NO_ACTIVITY), relative_label(*date, today)),
        Some(Activity::Label(label)) => (non_empty(label, NO_ACTIVITY), UNKNOWN.to_string()),
        None => (NO_ACTIVITY.to_string(), UNKNOWN.to_string()),
    }
}

fn relative_label(date: NaiveDate, today: NaiveDate) -> String {
    match (today - date).num_days() {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        days if days > 1 => format!("{days} days ago"),
        -1 => "Tomorrow".to_string(),
        days => format!("In {} days", -days),
    }
}

fn non_empty(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Caller-side holder for the stats currently on display.
#[derive(Debug, Default)]
pub struct DashboardState {
    stats: DashboardStats,
}

impl DashboardState {
    pub fn stats(&self) -> &DashboardStats {
        &self.stats
    }

    /// Replaces the held stats if the sources allow a new pass. Returns
    /// whether anything changed.
    pub fn refresh(&mut self, sources: &Sources, today: NaiveDate, config: &StatsConfig) -> bool {
        match evaluate(sources, today, config) {
            Some(stats) => {
                self.stats = stats;
                true
            }
            None => false,
        }
    }
}
