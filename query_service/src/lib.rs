//! Process-wide backend selection.
//!
//! Exactly one statistics backend exists per process, chosen from
//! configuration when [`StatsBackend::from_env`] runs and immutable
//! afterwards. Consumers hold the enum and call the repository trait; no call
//! site ever re-reads the switch.

use domain::errors::QueryError;
use domain::models::{
    AggregateStats, HallOfFameEntry, LeaderboardEntry, Player, PlayerProfile, ServerMetadata,
    StatCategory,
};
use domain::repositories::StatsQueryRepository;
use infra_rdb_repository_impl::DatabaseConnector;
use infra_snapshot_repository_impl::SnapshotRepository;

pub mod config {
    #[derive(Debug, serde::Deserialize, Clone)]
    pub struct Backend {
        #[serde(default)]
        pub use_remote_db: bool,
    }

    impl Backend {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(envy::prefixed("STATS_").from_env::<Self>()?)
        }
    }
}

pub enum StatsBackend {
    Snapshot(SnapshotRepository),
    Rdb(DatabaseConnector),
}

impl StatsBackend {
    /// Builds the backend selected by `STATS_USE_REMOTE_DB`, reading the
    /// chosen backend's own configuration section from the environment.
    pub async fn from_env() -> anyhow::Result<Self> {
        let switch = config::Backend::from_env()?;
        if switch.use_remote_db {
            tracing::info!("serving statistics from the remote database");
            let config = infra_rdb_repository_impl::config::Database::from_env()?;
            Ok(Self::Rdb(DatabaseConnector::try_new(config).await?))
        } else {
            tracing::info!("serving statistics from cached snapshots");
            let config = infra_snapshot_repository_impl::config::Snapshot::from_env()?;
            Ok(Self::Snapshot(SnapshotRepository::try_new(config)?))
        }
    }
}

macro_rules! delegate {
    ($self:expr, $backend:ident => $call:expr) => {
        match $self {
            StatsBackend::Snapshot($backend) => $call.await,
            StatsBackend::Rdb($backend) => $call.await,
        }
    };
}

#[async_trait::async_trait]
impl StatsQueryRepository for StatsBackend {
    async fn get_all_players(&self) -> Result<Vec<Player>, QueryError> {
        delegate!(self, backend => backend.get_all_players())
    }

    async fn get_player_by_uuid(&self, uuid: &str) -> Result<PlayerProfile, QueryError> {
        delegate!(self, backend => backend.get_player_by_uuid(uuid))
    }

    async fn get_player_by_id(&self, id: i64) -> Result<PlayerProfile, QueryError> {
        delegate!(self, backend => backend.get_player_by_id(id))
    }

    async fn get_hall_of_fame(&self) -> Result<Vec<HallOfFameEntry>, QueryError> {
        delegate!(self, backend => backend.get_hall_of_fame())
    }

    async fn get_server_metadata(&self) -> Result<ServerMetadata, QueryError> {
        delegate!(self, backend => backend.get_server_metadata())
    }

    async fn get_server_aggregate_stats(&self) -> Result<AggregateStats, QueryError> {
        delegate!(self, backend => backend.get_server_aggregate_stats())
    }

    async fn get_stat_leaderboard(
        &self,
        category: StatCategory,
        stat_name: &str,
    ) -> Result<Vec<LeaderboardEntry>, QueryError> {
        delegate!(self, backend => backend.get_stat_leaderboard(category, stat_name))
    }
}
