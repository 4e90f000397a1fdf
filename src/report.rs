use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::DashboardStats;

fn signed(value: i64) -> String {
    if value > 0 {
        format!("+{value}%")
    } else {
        format!("{value}%")
    }
}

pub fn build_report(stats: &DashboardStats, today: NaiveDate) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Gym Dashboard Report");
    let _ = writeln!(output, "Generated on {today}");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(
        output,
        "- Members: {} total, {} active",
        stats.total_members, stats.active_members
    );
    let _ = writeln!(output, "- Active trainers: {}", stats.active_trainers);
    let _ = writeln!(
        output,
        "- Revenue this month: {:.2} (previous {:.2}, {})",
        stats.monthly_revenue,
        stats.previous_month_revenue,
        signed(stats.revenue_change_percent)
    );
    let _ = writeln!(
        output,
        "- New signups: {} ({})",
        stats.new_signups,
        signed(stats.signup_change_percent)
    );
    let _ = writeln!(
        output,
        "- Sessions: {} total, {:.1} per member ({} month over month)",
        stats.total_sessions,
        stats.avg_sessions_per_member,
        signed(stats.session_change_percent)
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Monthly Trends");
    let _ = writeln!(output, "| Month | Revenue | Members | Strength | Cardio | Yoga |");
    let _ = writeln!(output, "|---|---:|---:|---:|---:|---:|");

    let rows = stats
        .revenue_trend
        .iter()
        .zip(&stats.member_growth)
        .zip(&stats.workout_trends);
    for ((revenue, growth), workouts) in rows {
        let _ = writeln!(
            output,
            "| {} {} | {:.2} | {} | {} | {} | {} |",
            revenue.month,
            revenue.year,
            revenue.revenue,
            growth.members,
            workouts.strength,
            workouts.cardio,
            workouts.yoga
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Activity");

    if stats.recent_activities.is_empty() {
        let _ = writeln!(output, "No member activity recorded.");
    } else {
        for activity in &stats.recent_activities {
            let _ = writeln!(
                output,
                "- {} ({}): {}, {}",
                activity.name, activity.status, activity.activity_type, activity.time_label
            );
        }
    }

    output
}
