use chrono::{Duration, Utc};
use domain::errors::QueryError;
use domain::models::{
    AggregateStats, HallOfFameEntry, LeaderboardEntry, Player, PlayerProfile, ServerMetadata,
    StatCategory,
};
use domain::repositories::StatsQueryRepository;

use crate::cache_store::SnapshotCacheStore;
use crate::embedded::EmbeddedStatsDatabase;

mod cache_store;
mod embedded;

#[cfg(any(test, feature = "test-utils"))]
pub mod fixtures;

pub mod config {
    use std::path::PathBuf;

    #[derive(Debug, serde::Deserialize, Clone)]
    pub struct Snapshot {
        pub url: String,
        pub cache_directory: PathBuf,
    }

    impl Snapshot {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(envy::prefixed("STATS_SNAPSHOT_").from_env::<Self>()?)
        }
    }
}

/// A cached snapshot older than this is re-downloaded before serving.
const SNAPSHOT_TTL_HOURS: i64 = 1;

/// Statistics backend working off a downloaded snapshot of the whole
/// database.
///
/// Each request checks the cache store, downloads a new snapshot when the
/// cached one is missing or past its TTL, and then runs the query on a
/// private in-memory database. Concurrent refreshes are collapsed into one
/// download by `refresh_guard`.
pub struct SnapshotRepository {
    http: reqwest::Client,
    snapshot_url: String,
    cache: SnapshotCacheStore,
    refresh_guard: tokio::sync::Mutex<()>,
}

impl SnapshotRepository {
    pub fn try_new(config: config::Snapshot) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            snapshot_url: config.url,
            cache: SnapshotCacheStore::new(&config.cache_directory),
            refresh_guard: tokio::sync::Mutex::new(()),
        })
    }

    async fn engine_for_query(&self) -> Result<EmbeddedStatsDatabase, QueryError> {
        if let Some(engine) = self.cached_engine().await {
            return Ok(engine);
        }

        // Serialize refreshes: whoever wins the lock downloads once, everyone
        // else finds a fresh cache on the re-check.
        let _refresh = self.refresh_guard.lock().await;
        if let Some(engine) = self.cached_engine().await {
            return Ok(engine);
        }
        self.refreshed_engine().await
    }

    /// Returns an engine restored from the cache entry when one exists and is
    /// younger than the TTL. A cache entry that fails to restore counts as
    /// absent.
    async fn cached_engine(&self) -> Option<EmbeddedStatsDatabase> {
        let store = self.cache.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let entry = store.get()?;
            let age = Utc::now().signed_duration_since(entry.cached_at);
            if age >= Duration::hours(SNAPSHOT_TTL_HOURS) {
                tracing::debug!(age_minutes = age.num_minutes(), "cached snapshot is stale");
                return None;
            }

            match EmbeddedStatsDatabase::from_snapshot_bytes(&entry.snapshot) {
                Ok(engine) => {
                    tracing::debug!(
                        age_minutes = age.num_minutes(),
                        "serving from cached snapshot"
                    );
                    Some(engine)
                }
                Err(err) => {
                    tracing::warn!(error = %err, "cached snapshot failed to load, treating it as absent");
                    None
                }
            }
        });
        handle.await.ok().flatten()
    }

    async fn refreshed_engine(&self) -> Result<EmbeddedStatsDatabase, QueryError> {
        tracing::info!(url = %self.snapshot_url, "downloading statistics snapshot");
        let snapshot = self.fetch_snapshot().await?;

        let store = self.cache.clone();
        run_blocking(move || {
            let engine = EmbeddedStatsDatabase::from_snapshot_bytes(&snapshot)
                .map_err(QueryError::source_unavailable)?;
            let canonical = engine
                .export_snapshot_bytes()
                .map_err(QueryError::query_failed)?;

            // A failed write must not fail the request; the next request will
            // simply download again.
            if let Err(err) = store.put(&canonical, Utc::now()) {
                tracing::warn!(error = %err, "could not persist refreshed snapshot, serving it uncached");
            }

            Ok(engine)
        })
        .await
    }

    async fn fetch_snapshot(&self) -> Result<Vec<u8>, QueryError> {
        let response = self
            .http
            .get(self.snapshot_url.as_str())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(QueryError::source_unavailable)?;

        let bytes = response
            .bytes()
            .await
            .map_err(QueryError::source_unavailable)?;
        Ok(bytes.to_vec())
    }
}

async fn run_blocking<T: Send + 'static>(
    work: impl FnOnce() -> Result<T, QueryError> + Send + 'static,
) -> Result<T, QueryError> {
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| QueryError::query_failed(anyhow::Error::new(err)))?
}

#[async_trait::async_trait]
impl StatsQueryRepository for SnapshotRepository {
    #[tracing::instrument(skip(self))]
    async fn get_all_players(&self) -> Result<Vec<Player>, QueryError> {
        let engine = self.engine_for_query().await?;
        run_blocking(move || engine.all_players().map_err(QueryError::query_failed)).await
    }

    #[tracing::instrument(skip(self))]
    async fn get_player_by_uuid(&self, uuid: &str) -> Result<PlayerProfile, QueryError> {
        let engine = self.engine_for_query().await?;
        let uuid = uuid.to_owned();
        run_blocking(move || {
            engine
                .player_by_uuid(&uuid)
                .map_err(QueryError::query_failed)?
                .ok_or_else(QueryError::player_not_found)
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn get_player_by_id(&self, id: i64) -> Result<PlayerProfile, QueryError> {
        let engine = self.engine_for_query().await?;
        run_blocking(move || {
            engine
                .player_by_id(id)
                .map_err(QueryError::query_failed)?
                .ok_or_else(QueryError::player_not_found)
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn get_hall_of_fame(&self) -> Result<Vec<HallOfFameEntry>, QueryError> {
        let engine = self.engine_for_query().await?;
        run_blocking(move || engine.hall_of_fame().map_err(QueryError::query_failed)).await
    }

    #[tracing::instrument(skip(self))]
    async fn get_server_metadata(&self) -> Result<ServerMetadata, QueryError> {
        let engine = self.engine_for_query().await?;
        run_blocking(move || {
            engine
                .server_metadata()
                .map_err(QueryError::query_failed)?
                .ok_or_else(QueryError::server_data_not_found)
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn get_server_aggregate_stats(&self) -> Result<AggregateStats, QueryError> {
        let engine = self.engine_for_query().await?;
        run_blocking(move || {
            engine
                .server_aggregate_stats()
                .map_err(QueryError::query_failed)
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn get_stat_leaderboard(
        &self,
        category: StatCategory,
        stat_name: &str,
    ) -> Result<Vec<LeaderboardEntry>, QueryError> {
        let engine = self.engine_for_query().await?;
        let stat_name = stat_name.to_owned();
        run_blocking(move || {
            engine
                .stat_leaderboard(category, &stat_name)
                .map_err(QueryError::query_failed)
        })
        .await
    }
}
