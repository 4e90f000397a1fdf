use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    Active,
    Inactive,
    Pending,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "Active",
            MemberStatus::Inactive => "Inactive",
            MemberStatus::Pending => "Pending",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberStatus {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        match value {
            "Active" => Ok(MemberStatus::Active),
            "Inactive" => Ok(MemberStatus::Inactive),
            "Pending" => Ok(MemberStatus::Pending),
            other => bail!("unknown member status {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainerStatus {
    Active,
    Inactive,
    OnLeave,
}

impl FromStr for TrainerStatus {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        match value {
            "Active" => Ok(TrainerStatus::Active),
            "Inactive" => Ok(TrainerStatus::Inactive),
            "OnLeave" => Ok(TrainerStatus::OnLeave),
            other => bail!("unknown trainer status {other:?}"),
        }
    }
}

/// Last thing a member did at the gym.
///
/// Upstream data carries this either as a bare label or as a dated record;
/// both shapes deserialize into this enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Activity {
    Label(String),
    Record {
        #[serde(rename = "type")]
        activity_type: String,
        date: NaiveDate,
    },
}

impl Activity {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Activity::Label(_) => None,
            Activity::Record { date, .. } => Some(*date),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub join_date: NaiveDate,
    pub status: MemberStatus,
    #[serde(default)]
    pub last_activity: Option<Activity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub member_id: Uuid,
    pub amount: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkoutCategory {
    Strength,
    Cardio,
    Yoga,
    Other(String),
}

impl From<String> for WorkoutCategory {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Strength" => WorkoutCategory::Strength,
            "Cardio" => WorkoutCategory::Cardio,
            "Yoga" => WorkoutCategory::Yoga,
            _ => WorkoutCategory::Other(value),
        }
    }
}

impl From<WorkoutCategory> for String {
    fn from(value: WorkoutCategory) -> Self {
        match value {
            WorkoutCategory::Strength => "Strength".to_string(),
            WorkoutCategory::Cardio => "Cardio".to_string(),
            WorkoutCategory::Yoga => "Yoga".to_string(),
            WorkoutCategory::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: Uuid,
    pub member_id: Uuid,
    pub category: WorkoutCategory,
    pub date: NaiveDate,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trainer {
    pub id: Uuid,
    pub name: String,
    pub status: TrainerStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenuePoint {
    pub month: String,
    pub year: i32,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPoint {
    pub month: String,
    pub year: i32,
    pub members: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTrendPoint {
    pub month: String,
    pub year: i32,
    pub strength: usize,
    pub cardio: usize,
    pub yoga: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub name: String,
    pub activity_type: String,
    pub time_label: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_members: usize,
    pub active_members: usize,
    pub active_trainers: usize,
    pub monthly_revenue: f64,
    pub previous_month_revenue: f64,
    pub revenue_change_percent: i64,
    pub new_signups: usize,
    pub signup_change_percent: i64,
    pub total_sessions: usize,
    pub avg_sessions_per_member: f64,
    pub session_change_percent: i64,
    pub revenue_trend: Vec<RevenuePoint>,
    pub member_growth: Vec<GrowthPoint>,
    pub workout_trends: Vec<WorkoutTrendPoint>,
    pub recent_activities: Vec<RecentActivity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_accepts_label_and_record_shapes() {
        let label: Activity = serde_json::from_str(r#""Yoga class""#).unwrap();
        assert_eq!(label, Activity::Label("Yoga class".to_string()));

        let record: Activity =
            serde_json::from_str(r#"{"type": "Spin", "date": "2024-03-02"}"#).unwrap();
        assert_eq!(
            record.date(),
            Some(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap())
        );
    }

    #[test]
    fn unknown_categories_are_kept_verbatim() {
        let category: WorkoutCategory = serde_json::from_str(r#""Pilates""#).unwrap();
        assert_eq!(category, WorkoutCategory::Other("Pilates".to_string()));
        assert_eq!(String::from(category), "Pilates");
    }

    #[test]
    fn statuses_parse_from_stored_text() {
        assert_eq!("Pending".parse::<MemberStatus>().unwrap(), MemberStatus::Pending);
        assert_eq!("OnLeave".parse::<TrainerStatus>().unwrap(), TrainerStatus::OnLeave);
        assert!("archived".parse::<MemberStatus>().is_err());
    }
}
