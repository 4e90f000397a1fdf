use std::future::Future;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::models::{Member, Payment, Trainer, WorkoutSession};

/// Anything that can hand over a full collection of one entity type.
pub trait DataSource<T> {
    fn fetch_all(&self) -> impl Future<Output = anyhow::Result<Vec<T>>> + Send;
}

/// Last observed state of one upstream collection.
#[derive(Debug, Clone)]
pub struct SourceState<T> {
    pub data: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> SourceState<T> {
    pub fn loaded(data: Vec<T>) -> Self {
        Self {
            data,
            loading: false,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            data: Vec::new(),
            loading: false,
            error: Some(error.into()),
        }
    }

    pub fn is_ready(&self) -> bool {
        !self.loading && self.error.is_none()
    }
}

pub async fn load_state<T, S>(source: &S, name: &str) -> SourceState<T>
where
    S: DataSource<T>,
{
    match source.fetch_all().await {
        Ok(data) => {
            log::debug!("loaded {} {name}", data.len());
            SourceState::loaded(data)
        }
        Err(err) => {
            log::warn!("failed to load {name}: {err:#}");
            SourceState::failed(format!("{err:#}"))
        }
    }
}

/// In-memory source returning a fixed collection.
#[derive(Debug, Clone)]
pub struct FixtureSource<T> {
    items: Vec<T>,
}

impl<T> FixtureSource<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T: Clone + Send + Sync> DataSource<T> for FixtureSource<T> {
    async fn fetch_all(&self) -> anyhow::Result<Vec<T>> {
        Ok(self.items.clone())
    }
}

/// A dashboard dump stored as one JSON document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub trainers: Vec<Trainer>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub workouts: Vec<WorkoutSession>,
}

impl Snapshot {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse snapshot {}", path.display()))
    }

    pub fn into_sources(
        self,
    ) -> (
        FixtureSource<Member>,
        FixtureSource<Trainer>,
        FixtureSource<Payment>,
        FixtureSource<WorkoutSession>,
    ) {
        (
            FixtureSource::new(self.members),
            FixtureSource::new(self.trainers),
            FixtureSource::new(self.payments),
            FixtureSource::new(self.workouts),
        )
    }
}

#[cfg(test)]
pub(crate) struct FailingSource;

#[cfg(test)]
impl<T: Send> DataSource<T> for FailingSource {
    async fn fetch_all(&self) -> anyhow::Result<Vec<T>> {
        anyhow::bail!("connection refused")
    }
}
