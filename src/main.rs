use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

mod config;
mod db;
mod growth;
mod models;
mod report;
mod revenue;
mod source;
mod stats;
mod window;
mod workouts;

use config::StatsConfig;
use models::{Member, Payment, Trainer, WorkoutSession};
use source::{DataSource, Snapshot};
use stats::{DashboardState, Sources};

#[derive(Parser)]
#[command(name = "gym-dashboard-stats")]
#[command(about = "Trend metrics for the gym overview dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load sample members, trainers, payments and sessions
    Seed,
    /// Import payments or workout sessions from a CSV file
    Import {
        #[arg(long, value_enum)]
        kind: db::ImportKind,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Compute dashboard stats
    Stats {
        /// Read entities from a JSON snapshot instead of Postgres
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// Print the full stats object as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        config: StatsConfig,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        snapshot: Option<PathBuf>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[command(flatten)]
        config: StatsConfig,
    },
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = config::database_url()?;
    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

async fn collect_sources(
    members: &impl DataSource<Member>,
    trainers: &impl DataSource<Trainer>,
    payments: &impl DataSource<Payment>,
    workouts: &impl DataSource<WorkoutSession>,
) -> Sources {
    let (members, trainers, payments, workouts) = tokio::join!(
        source::load_state(members, "members"),
        source::load_state(trainers, "trainers"),
        source::load_state(payments, "payments"),
        source::load_state(workouts, "workout sessions"),
    );
    Sources {
        members,
        trainers,
        payments,
        workouts,
    }
}

async fn load_sources(snapshot: Option<&Path>) -> anyhow::Result<Sources> {
    match snapshot {
        Some(path) => {
            let (members, trainers, payments, workouts) =
                Snapshot::from_path(path)?.into_sources();
            Ok(collect_sources(&members, &trainers, &payments, &workouts).await)
        }
        None => {
            let pg = db::PgSource::new(connect().await?);
            Ok(collect_sources(&pg, &pg, &pg, &pg).await)
        }
    }
}

fn first_error(sources: &Sources) -> Option<&str> {
    [
        sources.members.error.as_deref(),
        sources.trainers.error.as_deref(),
        sources.payments.error.as_deref(),
        sources.workouts.error.as_deref(),
    ]
    .into_iter()
    .flatten()
    .next()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::InitDb => {
            db::init_db(&connect().await?).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&connect().await?).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { kind, csv } => {
            let inserted = db::import_csv(&connect().await?, kind, &csv).await?;
            println!("Inserted {inserted} rows from {}.", csv.display());
        }
        Commands::Stats {
            snapshot,
            json,
            config,
        } => {
            let today = Utc::now().date_naive();
            let sources = load_sources(snapshot.as_deref()).await?;
            let mut state = DashboardState::default();
            if !state.refresh(&sources, today, &config) {
                if let Some(err) = first_error(&sources) {
                    eprintln!("Showing empty stats, a source failed: {err}");
                }
            }
            let stats = state.stats();

            if json {
                println!("{}", serde_json::to_string_pretty(stats)?);
                return Ok(());
            }

            println!(
                "Members: {} ({} active), trainers active: {}",
                stats.total_members, stats.active_members, stats.active_trainers
            );
            println!(
                "Revenue this month: {:.2} ({}% vs last month)",
                stats.monthly_revenue, stats.revenue_change_percent
            );
            println!(
                "New signups: {} ({}%)",
                stats.new_signups, stats.signup_change_percent
            );
            println!(
                "Sessions: {} ({:.1} per member, {}% month over month)",
                stats.total_sessions, stats.avg_sessions_per_member, stats.session_change_percent
            );
        }
        Commands::Report {
            snapshot,
            out,
            config,
        } => {
            let today = Utc::now().date_naive();
            let sources = load_sources(snapshot.as_deref()).await?;
            let mut state = DashboardState::default();
            if !state.refresh(&sources, today, &config) {
                if let Some(err) = first_error(&sources) {
                    eprintln!("Writing empty report, a source failed: {err}");
                }
            }
            let report = report::build_report(state.stats(), today);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
