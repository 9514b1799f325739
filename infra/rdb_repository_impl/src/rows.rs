//! Row structures loaded from the remote schema and their conversions into
//! domain values. All null substitution happens through the shared `domain`
//! constructors so both backends produce identical payloads.

use chrono::NaiveDateTime;
use diesel::sql_types::{BigInt, Nullable, Text};
use diesel::{Queryable, QueryableByName};

use domain::models::{
    AggregateStats, AggregateSums, HallOfFameEntry, LeaderboardEntry, Player, ServerMetadata,
    StatEntry,
};

/// One `uuid_map` row, columns in table order.
#[derive(Debug, Queryable)]
pub(crate) struct PlayerRow {
    pub id: i64,
    pub uuid: String,
    pub nick: String,
    pub last_online: NaiveDateTime,
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Self {
            id: row.id,
            uuid: row.uuid,
            nick: row.nick,
            last_online: row.last_online.and_utc(),
        }
    }
}

#[derive(Debug, Queryable)]
pub(crate) struct StatRow {
    pub stat_name: String,
    pub amount: i64,
    pub position: Option<i64>,
}

impl From<StatRow> for StatEntry {
    fn from(row: StatRow) -> Self {
        Self {
            name: row.stat_name,
            value: row.amount,
            position: row.position,
        }
    }
}

#[derive(Debug, Queryable)]
pub(crate) struct HallOfFameRow {
    pub player_id: i64,
    pub uuid: String,
    pub nick: String,
    pub score: i64,
}

impl From<HallOfFameRow> for HallOfFameEntry {
    fn from(row: HallOfFameRow) -> Self {
        Self {
            id: row.player_id,
            uuid: row.uuid,
            nick: row.nick,
            score: row.score,
        }
    }
}

#[derive(Debug, Queryable)]
pub(crate) struct LeaderboardRow {
    pub position: Option<i64>,
    pub player_id: i64,
    pub player_uuid: String,
    pub player_nick: String,
    pub amount: i64,
}

impl From<LeaderboardRow> for LeaderboardEntry {
    fn from(row: LeaderboardRow) -> Self {
        Self {
            rank: row.position,
            player_id: row.player_id,
            player_uuid: row.player_uuid,
            player_nick: row.player_nick,
            score: row.amount,
        }
    }
}

/// The `sync_metadata` singleton, columns in table order.
#[derive(Debug, Queryable)]
pub(crate) struct MetadataRow {
    pub last_update: NaiveDateTime,
    pub server_name: Option<String>,
    pub server_desc: Option<String>,
    pub server_url: Option<String>,
    pub server_icon: Option<Vec<u8>>,
}

impl From<MetadataRow> for ServerMetadata {
    fn from(row: MetadataRow) -> Self {
        ServerMetadata::from_source(
            row.last_update.and_utc(),
            row.server_desc,
            row.server_url,
            row.server_icon.as_deref(),
        )
    }
}

/// Result of the single aggregate statement. Sums are `NULL` over empty
/// tables; MySQL `SUM` yields `DECIMAL`, so every sum is `CAST(... AS SIGNED)`
/// in the statement to land here as a signed integer.
#[derive(Debug, QueryableByName)]
pub(crate) struct AggregateRow {
    #[diesel(sql_type = Nullable<Text>)]
    pub server_name: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub server_url: Option<String>,
    #[diesel(sql_type = BigInt)]
    pub player_count: i64,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub play_time: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub damage_dealt: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub travelled_distance: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub broken_tools: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub crafted_items: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub mined_blocks: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub killed_mobs: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub dropped_items: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub pickedup_items: Option<i64>,
}

impl From<AggregateRow> for AggregateStats {
    fn from(row: AggregateRow) -> Self {
        AggregateStats::from_source(
            row.server_name,
            row.server_url,
            row.player_count,
            AggregateSums {
                play_time: row.play_time,
                damage_dealt: row.damage_dealt,
                travelled_distance: row.travelled_distance,
                broken_tools: row.broken_tools,
                crafted_items: row.crafted_items,
                mined_blocks: row.mined_blocks,
                killed_mobs: row.killed_mobs,
                dropped_items: row.dropped_items,
                pickedup_items: row.pickedup_items,
            },
        )
    }
}
