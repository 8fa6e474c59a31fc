//! Travel log entries and per-user statistics

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::RngExt;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::TripEstimate;
use crate::Result;
use crate::cache::PersistentCache;
use crate::models::TransportMode;

const LOG_PREFIX: &str = "log:";

/// A priced trip as it is handed to persistence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TravelLog {
    pub origin_address: String,
    pub destination_address: String,
    pub mode: TransportMode,
    pub distance_km: f64,
    pub duration_seconds: u64,
    pub emission_kg: f64,
    pub polyline: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TravelLog {
    #[must_use]
    pub fn from_estimate(estimate: &TripEstimate, created_at: DateTime<Utc>) -> Self {
        Self {
            origin_address: estimate.origin.formatted_address.clone(),
            destination_address: estimate.destination.formatted_address.clone(),
            mode: estimate.mode,
            distance_km: estimate.distance_km,
            duration_seconds: estimate.duration_seconds,
            emission_kg: estimate.emission_kg,
            polyline: estimate.polyline.clone(),
            created_at,
        }
    }

    #[must_use]
    pub fn duration_text(&self) -> String {
        format_duration(self.duration_seconds)
    }
}

/// Where priced trips end up
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TravelLogRecorder: Send + Sync {
    async fn record(&self, log: TravelLog) -> Result<()>;
}

/// Keeps logs in memory, newest last
#[derive(Default)]
pub struct InMemoryTravelLog {
    logs: RwLock<Vec<TravelLog>>,
}

impl InMemoryTravelLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<TravelLog> {
        self.logs.read().await.clone()
    }
}

#[async_trait]
impl TravelLogRecorder for InMemoryTravelLog {
    async fn record(&self, log: TravelLog) -> Result<()> {
        self.logs.write().await.push(log);
        Ok(())
    }
}

/// Logs kept in the on-disk cache database, one key per entry.
/// Keys sort by creation time, so a prefix scan returns them oldest first.
pub struct PersistentTravelLog {
    store: PersistentCache,
}

impl PersistentTravelLog {
    #[must_use]
    pub fn new(store: PersistentCache) -> Self {
        Self { store }
    }

    pub async fn entries(&self) -> Result<Vec<TravelLog>> {
        Ok(self.store.scan_prefix(LOG_PREFIX).await?)
    }
}

fn log_key(log: &TravelLog) -> String {
    let micros = u64::try_from(log.created_at.timestamp_micros()).unwrap_or(0);
    // entries from the same microsecond must not overwrite each other
    let nonce: u64 = rand::rng().random_range(0..u64::MAX);
    format!("{LOG_PREFIX}{micros:020}:{nonce:016x}")
}

#[async_trait]
impl TravelLogRecorder for PersistentTravelLog {
    async fn record(&self, log: TravelLog) -> Result<()> {
        self.store.put(&log_key(&log), log, None).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModeStatistics {
    pub mode: TransportMode,
    pub trips: usize,
    pub distance_km: f64,
    pub emission_kg: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TravelStatistics {
    pub trips: usize,
    pub distance_km: f64,
    pub emission_kg: f64,
    /// Sorted by emission, highest first
    pub by_mode: Vec<ModeStatistics>,
}

impl TravelStatistics {
    #[must_use]
    pub fn from_logs(logs: &[TravelLog]) -> Self {
        let mut per_mode: HashMap<TransportMode, ModeStatistics> = HashMap::new();
        for log in logs {
            let entry = per_mode.entry(log.mode).or_insert(ModeStatistics {
                mode: log.mode,
                trips: 0,
                distance_km: 0.0,
                emission_kg: 0.0,
            });
            entry.trips += 1;
            entry.distance_km += log.distance_km;
            entry.emission_kg += log.emission_kg;
        }

        let mut by_mode: Vec<_> = per_mode.into_values().collect();
        by_mode.sort_by(|a, b| {
            b.emission_kg
                .total_cmp(&a.emission_kg)
                .then_with(|| a.mode.label().cmp(b.mode.label()))
        });

        Self {
            trips: logs.len(),
            distance_km: logs.iter().map(|l| l.distance_km).sum(),
            emission_kg: logs.iter().map(|l| l.emission_kg).sum(),
            by_mode,
        }
    }

    /// Statistics for logs created in `[start, end)`
    #[must_use]
    pub fn between(logs: &[TravelLog], start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::from_logs(&window(logs, start, end))
    }
}

fn window(logs: &[TravelLog], start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<TravelLog> {
    logs.iter()
        .filter(|l| l.created_at >= start && l.created_at < end)
        .cloned()
        .collect()
}

/// A recorded trip as listed in a report
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TripSummary {
    pub created_at: DateTime<Utc>,
    pub mode: TransportMode,
    pub origin: String,
    pub destination: String,
    pub distance_km: f64,
    pub emission_kg: f64,
    pub duration: String,
}

impl From<&TravelLog> for TripSummary {
    fn from(log: &TravelLog) -> Self {
        Self {
            created_at: log.created_at,
            mode: log.mode,
            origin: log.origin_address.clone(),
            destination: log.destination_address.clone(),
            distance_km: log.distance_km,
            emission_kg: log.emission_kg,
            duration: log.duration_text(),
        }
    }
}

/// Statistics plus the trips they were computed from
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TravelReport {
    pub statistics: TravelStatistics,
    pub trips: Vec<TripSummary>,
}

impl TravelReport {
    /// Report over logs created in `[since, until)`. A missing bound is open.
    #[must_use]
    pub fn between(
        logs: &[TravelLog],
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Self {
        let start = since.unwrap_or(DateTime::<Utc>::MIN_UTC);
        let end = until.unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            statistics: TravelStatistics::between(logs, start, end),
            trips: window(logs, start, end).iter().map(TripSummary::from).collect(),
        }
    }
}

/// "1h 5m", "12m" or "40s"
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        format!("{}s", seconds % 60)
    }
}
