use crate::errors::QueryError;
use crate::models::{
    AggregateStats, HallOfFameEntry, LeaderboardEntry, Player, PlayerProfile, ServerMetadata,
    StatCategory,
};

/// The seven read operations every statistics backend exposes.
///
/// Implementations must be interchangeable: for the same underlying data,
/// every operation returns the same values in the same order regardless of
/// which backend served it.
#[async_trait::async_trait]
pub trait StatsQueryRepository {
    /// All registered players, ordered by registry id.
    async fn get_all_players(&self) -> Result<Vec<Player>, QueryError>;

    async fn get_player_by_uuid(&self, uuid: &str) -> Result<PlayerProfile, QueryError>;

    async fn get_player_by_id(&self, id: i64) -> Result<PlayerProfile, QueryError>;

    /// Top players by hall-of-fame score, at most 15, score descending with
    /// ties in registry order.
    async fn get_hall_of_fame(&self) -> Result<Vec<HallOfFameEntry>, QueryError>;

    async fn get_server_metadata(&self) -> Result<ServerMetadata, QueryError>;

    async fn get_server_aggregate_stats(&self) -> Result<AggregateStats, QueryError>;

    /// All holders of one named counter, highest value first. An unknown
    /// `stat_name` yields an empty board, not an error.
    async fn get_stat_leaderboard(
        &self,
        category: StatCategory,
        stat_name: &str,
    ) -> Result<Vec<LeaderboardEntry>, QueryError>;
}
