use anyhow::Context;
use chrono::{Duration, NaiveDate, Utc};
use clap::ValueEnum;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{Activity, Member, Payment, Trainer, WorkoutCategory, WorkoutSession};
use crate::source::DataSource;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Postgres-backed source for every dashboard entity.
#[derive(Clone)]
pub struct PgSource {
    pool: PgPool,
}

impl PgSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DataSource<Member> for PgSource {
    async fn fetch_all(&self) -> anyhow::Result<Vec<Member>> {
        let rows = sqlx::query(
            "SELECT id, full_name, status, joined_on, last_activity_type, last_activity_on \
             FROM gym_dashboard.members ORDER BY joined_on",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch members")?;

        let mut members = Vec::with_capacity(rows.len());
        for row in rows {
            let status: String = row.get("status");
            let activity_type: Option<String> = row.get("last_activity_type");
            let activity_on: Option<NaiveDate> = row.get("last_activity_on");
            members.push(Member {
                id: row.get("id"),
                name: row.get("full_name"),
                join_date: row.get("joined_on"),
                status: status.parse()?,
                last_activity: stored_activity(activity_type, activity_on),
            });
        }

        Ok(members)
    }
}

impl DataSource<Trainer> for PgSource {
    async fn fetch_all(&self) -> anyhow::Result<Vec<Trainer>> {
        let rows = sqlx::query("SELECT id, full_name, status FROM gym_dashboard.trainers")
            .fetch_all(&self.pool)
            .await
            .context("failed to fetch trainers")?;

        let mut trainers = Vec::with_capacity(rows.len());
        for row in rows {
            let status: String = row.get("status");
            trainers.push(Trainer {
                id: row.get("id"),
                name: row.get("full_name"),
                status: status.parse()?,
            });
        }

        Ok(trainers)
    }
}

impl DataSource<Payment> for PgSource {
    async fn fetch_all(&self) -> anyhow::Result<Vec<Payment>> {
        let rows = sqlx::query("SELECT id, member_id, amount, paid_on FROM gym_dashboard.payments")
            .fetch_all(&self.pool)
            .await
            .context("failed to fetch payments")?;

        Ok(rows
            .into_iter()
            .map(|row| Payment {
                id: row.get("id"),
                member_id: row.get("member_id"),
                amount: row.get("amount"),
                date: row.get("paid_on"),
            })
            .collect())
    }
}

impl DataSource<WorkoutSession> for PgSource {
    async fn fetch_all(&self) -> anyhow::Result<Vec<WorkoutSession>> {
        let rows = sqlx::query(
            "SELECT id, member_id, category, session_on, duration_minutes \
             FROM gym_dashboard.workout_sessions",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch workout sessions")?;

        Ok(rows
            .into_iter()
            .map(|row| WorkoutSession {
                id: row.get("id"),
                member_id: row.get("member_id"),
                category: WorkoutCategory::from(row.get::<String, _>("category")),
                date: row.get("session_on"),
                duration_minutes: row.get("duration_minutes"),
            })
            .collect())
    }
}

fn stored_activity(activity_type: Option<String>, date: Option<NaiveDate>) -> Option<Activity> {
    match (activity_type, date) {
        (Some(activity_type), Some(date)) => Some(Activity::Record {
            activity_type,
            date,
        }),
        (Some(label), None) => Some(Activity::Label(label)),
        (None, Some(date)) => Some(Activity::Record {
            activity_type: String::new(),
            date,
        }),
        (None, None) => None,
    }
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let today = Utc::now().date_naive();
    let days_ago = |days: i64| today - Duration::days(days);

    let members = vec![
        (
            Uuid::parse_str("9a41c2e8-7f3b-4d16-a5c9-81e2f04b6d37")?,
            "Marisol Vega",
            "marisol.vega@example.com",
            "Active",
            days_ago(160),
            Some(("Strength", Some(days_ago(1)))),
        ),
        (
            Uuid::parse_str("e2b7f90d-3c58-4a71-9e0f-6d4a1b8c2f95")?,
            "Theo Lindqvist",
            "theo.lindqvist@example.com",
            "Active",
            days_ago(95),
            Some(("Yoga", Some(days_ago(4)))),
        ),
        (
            Uuid::parse_str("47c0d3ab-b19e-4f82-8c6d-2a9e5f71b0c4")?,
            "Priya Raman",
            "priya.raman@example.com",
            "Pending",
            days_ago(12),
            Some(("Orientation", None)),
        ),
        (
            Uuid::parse_str("6b1c4c2e-5d0a-4f7e-9a3b-2f8e1d7c6a51")?,
            "Noah Brandt",
            "noah.brandt@example.com",
            "Inactive",
            days_ago(300),
            None,
        ),
    ];

    for (id, name, email, status, joined_on, activity) in members {
        let (activity_type, activity_on) = match activity {
            Some((kind, on)) => (Some(kind), on),
            None => (None, None),
        };
        sqlx::query(
            r#"
            INSERT INTO gym_dashboard.members
            (id, full_name, email, status, joined_on, last_activity_type, last_activity_on)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (email) DO UPDATE
            SET full_name = EXCLUDED.full_name,
                status = EXCLUDED.status,
                last_activity_type = EXCLUDED.last_activity_type,
                last_activity_on = EXCLUDED.last_activity_on
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(status)
        .bind(joined_on)
        .bind(activity_type)
        .bind(activity_on)
        .execute(pool)
        .await?;
    }

    let trainers = vec![
        (
            Uuid::parse_str("a4f2e7c1-8b3d-4e6f-9c0a-1d2b3c4e5f60")?,
            "Dana Okafor",
            "Active",
        ),
        (
            Uuid::parse_str("b7e3d9a2-6c1f-4a8b-8d2e-3f4a5b6c7d81")?,
            "Lee Park",
            "OnLeave",
        ),
    ];

    for (id, name, status) in trainers {
        sqlx::query(
            r#"
            INSERT INTO gym_dashboard.trainers (id, full_name, status)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET status = EXCLUDED.status
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(status)
        .execute(pool)
        .await?;
    }

    let payments = vec![
        ("seed-pay-001", "marisol.vega@example.com", 59.0, days_ago(62)),
        ("seed-pay-002", "marisol.vega@example.com", 59.0, days_ago(31)),
        ("seed-pay-003", "marisol.vega@example.com", 59.0, days_ago(1)),
        ("seed-pay-004", "theo.lindqvist@example.com", 89.0, days_ago(33)),
        ("seed-pay-005", "theo.lindqvist@example.com", 89.0, days_ago(3)),
        ("seed-pay-006", "priya.raman@example.com", 25.0, days_ago(12)),
    ];

    for (source_key, email, amount, paid_on) in payments {
        insert_payment(pool, source_key, email, amount, paid_on).await?;
    }

    let sessions = vec![
        ("seed-ws-001", "marisol.vega@example.com", "Strength", days_ago(1), 60),
        ("seed-ws-002", "marisol.vega@example.com", "Cardio", days_ago(8), 30),
        ("seed-ws-003", "marisol.vega@example.com", "Strength", days_ago(35), 55),
        ("seed-ws-004", "theo.lindqvist@example.com", "Yoga", days_ago(4), 75),
        ("seed-ws-005", "theo.lindqvist@example.com", "Yoga", days_ago(40), 75),
        ("seed-ws-006", "theo.lindqvist@example.com", "Pilates", days_ago(9), 50),
    ];

    for (source_key, email, category, session_on, minutes) in sessions {
        insert_session(pool, source_key, email, category, session_on, minutes).await?;
    }

    Ok(())
}

async fn member_id_by_email(pool: &PgPool, email: &str) -> anyhow::Result<Option<Uuid>> {
    let row = sqlx::query("SELECT id FROM gym_dashboard.members WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|row| row.get("id")))
}

/// Returns whether a new row was written.
async fn insert_payment(
    pool: &PgPool,
    source_key: &str,
    email: &str,
    amount: f64,
    paid_on: NaiveDate,
) -> anyhow::Result<bool> {
    let Some(member_id) = member_id_by_email(pool, email).await? else {
        log::warn!("skipping payment {source_key}: no member with email {email}");
        return Ok(false);
    };

    let result = sqlx::query(
        r#"
        INSERT INTO gym_dashboard.payments (id, member_id, amount, paid_on, source_key)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(member_id)
    .bind(amount)
    .bind(paid_on)
    .bind(source_key)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

async fn insert_session(
    pool: &PgPool,
    source_key: &str,
    email: &str,
    category: &str,
    session_on: NaiveDate,
    duration_minutes: i32,
) -> anyhow::Result<bool> {
    let Some(member_id) = member_id_by_email(pool, email).await? else {
        log::warn!("skipping workout {source_key}: no member with email {email}");
        return Ok(false);
    };

    let result = sqlx::query(
        r#"
        INSERT INTO gym_dashboard.workout_sessions
        (id, member_id, category, session_on, duration_minutes, source_key)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(member_id)
    .bind(category)
    .bind(session_on)
    .bind(duration_minutes)
    .bind(source_key)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ImportKind {
    Payments,
    Workouts,
}

pub async fn import_csv(
    pool: &PgPool,
    kind: ImportKind,
    csv_path: &std::path::Path,
) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct PaymentRow {
        email: String,
        amount: f64,
        paid_on: NaiveDate,
        source_key: Option<String>,
    }

    #[derive(serde::Deserialize)]
    struct WorkoutRow {
        email: String,
        category: String,
        session_on: NaiveDate,
        duration_minutes: i32,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    match kind {
        ImportKind::Payments => {
            for result in reader.deserialize::<PaymentRow>() {
                let row = result?;
                let source_key = row
                    .source_key
                    .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));
                if insert_payment(pool, &source_key, &row.email, row.amount, row.paid_on).await? {
                    inserted += 1;
                }
            }
        }
        ImportKind::Workouts => {
            for result in reader.deserialize::<WorkoutRow>() {
                let row = result?;
                let source_key = row
                    .source_key
                    .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));
                if insert_session(
                    pool,
                    &source_key,
                    &row.email,
                    &row.category,
                    row.session_on,
                    row.duration_minutes,
                )
                .await?
                {
                    inserted += 1;
                }
            }
        }
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_activity_prefers_dated_record() {
        let on = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        assert_eq!(
            stored_activity(Some("Yoga".into()), Some(on)),
            Some(Activity::Record {
                activity_type: "Yoga".into(),
                date: on
            })
        );
        assert_eq!(
            stored_activity(Some("Tour".into()), None),
            Some(Activity::Label("Tour".into()))
        );
        assert_eq!(stored_activity(None, None), None);
    }
}
