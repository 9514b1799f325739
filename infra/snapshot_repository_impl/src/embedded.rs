use std::collections::BTreeMap;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, DatabaseName, OptionalExtension, Row};

use domain::models::{
    AggregateStats, AggregateSums, HallOfFameEntry, LeaderboardEntry, Player, PlayerProfile,
    ServerMetadata, StatCategory, StatEntry, TRAVEL_DISTANCE_STAT_NAMES,
};

/// In-memory rendition of one statistics snapshot.
///
/// Every request restores its own instance from snapshot bytes, so a cache
/// refresh can never be observed mid-query. All methods are synchronous and
/// expected to run on a blocking task.
pub(crate) struct EmbeddedStatsDatabase {
    conn: Connection,
}

impl EmbeddedStatsDatabase {
    /// Loads a binary SQLite snapshot into a fresh in-memory database. Fails
    /// when the bytes are not a complete, readable database image.
    pub(crate) fn from_snapshot_bytes(snapshot: &[u8]) -> anyhow::Result<Self> {
        let staging = tempfile::NamedTempFile::new()?;
        std::fs::write(staging.path(), snapshot)?;

        let mut conn = Connection::open_in_memory()?;
        conn.restore(
            DatabaseName::Main,
            staging.path(),
            None::<fn(rusqlite::backup::Progress)>,
        )?;
        Ok(Self { conn })
    }

    /// Serializes the database back into the canonical binary form the cache
    /// persists.
    pub(crate) fn export_snapshot_bytes(&self) -> anyhow::Result<Vec<u8>> {
        let staging = tempfile::NamedTempFile::new()?;
        self.conn.backup(
            DatabaseName::Main,
            staging.path(),
            None::<fn(rusqlite::backup::Progress)>,
        )?;
        Ok(std::fs::read(staging.path())?)
    }

    pub(crate) fn all_players(&self) -> anyhow::Result<Vec<Player>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, player_uuid, player_nick, player_last_online
             FROM uuid_map ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map([], Self::registry_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, uuid, nick, last_online_ms)| {
                Ok(Player {
                    id,
                    uuid,
                    nick,
                    last_online: datetime_from_epoch_millis(last_online_ms)?,
                })
            })
            .collect()
    }

    pub(crate) fn player_by_uuid(&self, uuid: &str) -> anyhow::Result<Option<PlayerProfile>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, player_uuid, player_nick, player_last_online
                 FROM uuid_map WHERE player_uuid = ?1 LIMIT 1",
                params![uuid],
                Self::registry_row,
            )
            .optional()?;

        row.map(|row| self.assemble_profile(row)).transpose()
    }

    pub(crate) fn player_by_id(&self, id: i64) -> anyhow::Result<Option<PlayerProfile>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, player_uuid, player_nick, player_last_online
                 FROM uuid_map WHERE id = ?1 LIMIT 1",
                params![id],
                Self::registry_row,
            )
            .optional()?;

        row.map(|row| self.assemble_profile(row)).transpose()
    }

    pub(crate) fn hall_of_fame(&self) -> anyhow::Result<Vec<HallOfFameEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT hof.player_id, um.player_uuid, um.player_nick, hof.score
             FROM hall_of_fame hof
             INNER JOIN uuid_map um ON hof.player_id = um.id
             ORDER BY hof.score DESC, hof.player_id ASC
             LIMIT 15",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(HallOfFameEntry {
                    id: row.get(0)?,
                    uuid: row.get(1)?,
                    nick: row.get(2)?,
                    score: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub(crate) fn server_metadata(&self) -> anyhow::Result<Option<ServerMetadata>> {
        let row = self
            .conn
            .query_row(
                "SELECT last_update, server_desc, server_url, server_icon
                 FROM sync_metadata LIMIT 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<Vec<u8>>>(3)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(last_update_ms, desc, url, icon)| {
            Ok(ServerMetadata::from_source(
                datetime_from_epoch_millis(last_update_ms)?,
                desc,
                url,
                icon.as_deref(),
            ))
        })
        .transpose()
    }

    pub(crate) fn server_aggregate_stats(&self) -> anyhow::Result<AggregateStats> {
        let travel_stats = TRAVEL_DISTANCE_STAT_NAMES
            .map(|name| format!("'{name}'"))
            .join(", ");
        let sql = format!(
            "SELECT
               (SELECT server_name FROM sync_metadata LIMIT 1),
               (SELECT server_url FROM sync_metadata LIMIT 1),
               (SELECT COUNT(*) FROM uuid_map),
               (SELECT SUM(amount) FROM custom WHERE stat_name = 'play_time'),
               (SELECT SUM(amount) FROM custom WHERE stat_name = 'damage_dealt'),
               (SELECT SUM(amount) FROM custom WHERE stat_name IN ({travel_stats})),
               (SELECT SUM(amount) FROM broken),
               (SELECT SUM(amount) FROM crafted),
               (SELECT SUM(amount) FROM mined),
               (SELECT SUM(amount) FROM killed),
               (SELECT SUM(amount) FROM dropped),
               (SELECT SUM(amount) FROM picked_up)"
        );

        let stats = self.conn.query_row(&sql, [], |row| {
            Ok(AggregateStats::from_source(
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                AggregateSums {
                    play_time: row.get(3)?,
                    damage_dealt: row.get(4)?,
                    travelled_distance: row.get(5)?,
                    broken_tools: row.get(6)?,
                    crafted_items: row.get(7)?,
                    mined_blocks: row.get(8)?,
                    killed_mobs: row.get(9)?,
                    dropped_items: row.get(10)?,
                    pickedup_items: row.get(11)?,
                },
            ))
        })?;
        Ok(stats)
    }

    pub(crate) fn stat_leaderboard(
        &self,
        category: StatCategory,
        stat_name: &str,
    ) -> anyhow::Result<Vec<LeaderboardEntry>> {
        let sql = format!(
            "SELECT c.position, u.id, u.player_uuid, u.player_nick, c.amount
             FROM {} c
             INNER JOIN uuid_map u ON c.player_id = u.id
             WHERE c.stat_name = ?1
             ORDER BY c.amount DESC, c.position ASC",
            category.table_name()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params![stat_name], |row| {
                Ok(LeaderboardEntry {
                    rank: row.get(0)?,
                    player_id: row.get(1)?,
                    player_uuid: row.get(2)?,
                    player_nick: row.get(3)?,
                    score: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn registry_row(row: &Row<'_>) -> rusqlite::Result<(i64, String, String, i64)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    }

    fn assemble_profile(
        &self,
        (id, uuid, nick, last_online_ms): (i64, String, String, i64),
    ) -> anyhow::Result<PlayerProfile> {
        let hof = self
            .conn
            .query_row(
                "SELECT score FROM hall_of_fame WHERE player_id = ?1 LIMIT 1",
                params![id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .unwrap_or(0);

        let mut stats = BTreeMap::new();
        for category in StatCategory::ALL {
            let sql = format!(
                "SELECT stat_name, amount, position FROM {}
                 WHERE player_id = ?1 ORDER BY position ASC",
                category.table_name()
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let entries = stmt
                .query_map(params![id], |row| {
                    Ok(StatEntry {
                        name: row.get(0)?,
                        value: row.get(1)?,
                        position: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            if !entries.is_empty() {
                stats.insert(category, entries);
            }
        }

        Ok(PlayerProfile {
            nick,
            uuid,
            last_online: datetime_from_epoch_millis(last_online_ms)?,
            hof,
            stats,
        })
    }
}

fn datetime_from_epoch_millis(millis: i64) -> anyhow::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| anyhow!("epoch millisecond timestamp out of range: {millis}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{snapshot_bytes, FixtureMetadata, FixturePlayer};

    const LAST_ONLINE_MS: i64 = 1_715_000_000_000;

    fn two_miners() -> Vec<FixturePlayer> {
        vec![
            FixturePlayer {
                id: 1,
                uuid: "11111111-1111-1111-1111-111111111111",
                nick: "Pickaxe",
                last_online_ms: LAST_ONLINE_MS,
                stats: vec![
                    (StatCategory::Mined, "stone", 50),
                    (StatCategory::Mined, "dirt", 10),
                ],
            },
            FixturePlayer {
                id: 2,
                uuid: "22222222-2222-2222-2222-222222222222",
                nick: "Shovel",
                last_online_ms: LAST_ONLINE_MS,
                stats: vec![(StatCategory::Mined, "stone", 70)],
            },
        ]
    }

    fn engine(players: &[FixturePlayer], metadata: Option<&FixtureMetadata>) -> EmbeddedStatsDatabase {
        EmbeddedStatsDatabase::from_snapshot_bytes(&snapshot_bytes(players, metadata)).unwrap()
    }

    #[test]
    fn rejects_bytes_that_are_not_a_database() {
        assert!(EmbeddedStatsDatabase::from_snapshot_bytes(b"definitely not sqlite").is_err());
    }

    #[test]
    fn export_round_trips_through_restore() {
        let original = engine(&two_miners(), None);
        let reloaded =
            EmbeddedStatsDatabase::from_snapshot_bytes(&original.export_snapshot_bytes().unwrap())
                .unwrap();

        assert_eq!(
            original.all_players().unwrap(),
            reloaded.all_players().unwrap()
        );
    }

    #[test]
    fn all_players_come_back_in_id_order() {
        let players = vec![
            FixturePlayer {
                id: 3,
                uuid: "33333333-3333-3333-3333-333333333333",
                nick: "Third",
                last_online_ms: LAST_ONLINE_MS,
                stats: vec![],
            },
            FixturePlayer {
                id: 1,
                uuid: "11111111-1111-1111-1111-111111111111",
                nick: "First",
                last_online_ms: LAST_ONLINE_MS,
                stats: vec![],
            },
            FixturePlayer {
                id: 2,
                uuid: "22222222-2222-2222-2222-222222222222",
                nick: "Second",
                last_online_ms: LAST_ONLINE_MS,
                stats: vec![],
            },
        ];
        let engine = engine(&players, None);

        let listed = engine.all_players().unwrap();
        assert_eq!(
            listed.iter().map(|player| player.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(listed[0].nick, "First");
        assert_eq!(listed[0].uuid, "11111111-1111-1111-1111-111111111111");
        assert_eq!(
            listed[0].last_online,
            DateTime::from_timestamp_millis(LAST_ONLINE_MS).unwrap()
        );
    }

    #[test]
    fn profile_lookup_by_uuid_and_id_agree() {
        let engine = engine(&two_miners(), None);

        let by_uuid = engine
            .player_by_uuid("11111111-1111-1111-1111-111111111111")
            .unwrap()
            .unwrap();
        let by_id = engine.player_by_id(1).unwrap().unwrap();
        assert_eq!(by_uuid, by_id);
    }

    #[test]
    fn profile_contains_only_populated_categories_in_position_order() {
        let engine = engine(&two_miners(), None);

        let profile = engine
            .player_by_uuid("11111111-1111-1111-1111-111111111111")
            .unwrap()
            .unwrap();

        assert_eq!(profile.nick, "Pickaxe");
        // dirt is the only holder of its counter (position 1); stone is held
        // by both players and Pickaxe trails Shovel (position 2).
        let mined = &profile.stats[&StatCategory::Mined];
        assert_eq!(
            mined
                .iter()
                .map(|entry| (entry.name.as_str(), entry.value, entry.position))
                .collect::<Vec<_>>(),
            vec![("dirt", 10, Some(1)), ("stone", 50, Some(2))]
        );
        assert!(!profile.stats.contains_key(&StatCategory::Broken));
    }

    #[test]
    fn profile_hall_of_fame_score_defaults_to_zero() {
        let mut players = two_miners();
        players.push(FixturePlayer {
            id: 3,
            uuid: "33333333-3333-3333-3333-333333333333",
            nick: "Idle",
            last_online_ms: LAST_ONLINE_MS,
            stats: vec![],
        });
        let engine = engine(&players, None);

        // First place in "stone" (10) plus second in nothing else.
        let shovel = engine.player_by_id(2).unwrap().unwrap();
        assert_eq!(shovel.hof, 10);

        let idle = engine.player_by_id(3).unwrap().unwrap();
        assert_eq!(idle.hof, 0);
    }

    #[test]
    fn unknown_players_are_reported_as_absent() {
        let engine = engine(&two_miners(), None);
        assert!(engine
            .player_by_uuid("99999999-9999-9999-9999-999999999999")
            .unwrap()
            .is_none());
        assert!(engine.player_by_id(99).unwrap().is_none());
    }

    #[test]
    fn hall_of_fame_is_capped_and_ordered_with_stable_ties() {
        // Scores by construction: id 1 -> 50, id 2 -> 30, id 3 -> 30, and
        // thirteen more players at 10 points each.
        let mut players = vec![
            FixturePlayer {
                id: 1,
                uuid: "00000000-0000-0000-0000-000000000001",
                nick: "Fifty",
                last_online_ms: LAST_ONLINE_MS,
                stats: vec![
                    (StatCategory::Custom, "a", 100),
                    (StatCategory::Custom, "b", 100),
                    (StatCategory::Custom, "c", 100),
                    (StatCategory::Custom, "d", 100),
                    (StatCategory::Custom, "e", 100),
                ],
            },
            FixturePlayer {
                id: 2,
                uuid: "00000000-0000-0000-0000-000000000002",
                nick: "ThirtyEarly",
                last_online_ms: LAST_ONLINE_MS,
                stats: vec![
                    (StatCategory::Killed, "f", 1),
                    (StatCategory::Killed, "g", 1),
                    (StatCategory::Killed, "h", 1),
                ],
            },
            FixturePlayer {
                id: 3,
                uuid: "00000000-0000-0000-0000-000000000003",
                nick: "ThirtyLate",
                last_online_ms: LAST_ONLINE_MS,
                stats: vec![
                    (StatCategory::Used, "i", 1),
                    (StatCategory::Used, "j", 1),
                    (StatCategory::Used, "k", 1),
                ],
            },
        ];
        let fillers: [(i64, &str, &str); 13] = [
            (4, "00000000-0000-0000-0000-000000000004", "n04"),
            (5, "00000000-0000-0000-0000-000000000005", "n05"),
            (6, "00000000-0000-0000-0000-000000000006", "n06"),
            (7, "00000000-0000-0000-0000-000000000007", "n07"),
            (8, "00000000-0000-0000-0000-000000000008", "n08"),
            (9, "00000000-0000-0000-0000-000000000009", "n09"),
            (10, "00000000-0000-0000-0000-000000000010", "n10"),
            (11, "00000000-0000-0000-0000-000000000011", "n11"),
            (12, "00000000-0000-0000-0000-000000000012", "n12"),
            (13, "00000000-0000-0000-0000-000000000013", "n13"),
            (14, "00000000-0000-0000-0000-000000000014", "n14"),
            (15, "00000000-0000-0000-0000-000000000015", "n15"),
            (16, "00000000-0000-0000-0000-000000000016", "n16"),
        ];
        for (id, uuid, nick) in fillers {
            players.push(FixturePlayer {
                id,
                uuid,
                nick,
                last_online_ms: LAST_ONLINE_MS,
                stats: vec![(StatCategory::Dropped, nick, 1)],
            });
        }
        let engine = engine(&players, None);

        let board = engine.hall_of_fame().unwrap();
        assert_eq!(board.len(), 15);
        assert_eq!(
            board
                .iter()
                .take(3)
                .map(|entry| (entry.id, entry.score))
                .collect::<Vec<_>>(),
            vec![(1, 50), (2, 30), (3, 30)]
        );
        assert!(board
            .windows(2)
            .all(|pair| pair[0].score >= pair[1].score));
        // The sixteenth player (highest id among the ten-point group) falls
        // off the board.
        assert!(board.iter().all(|entry| entry.id != 16));
        assert_eq!(board[0].nick, "Fifty");
    }

    #[test]
    fn metadata_inlines_icons_and_defaults_missing_fields() {
        let engine = engine(
            &[],
            Some(&FixtureMetadata {
                server_icon: Some(vec![0x89, 0x50, 0x4e, 0x47]),
                ..FixtureMetadata::default()
            }),
        );

        let metadata = engine.server_metadata().unwrap().unwrap();
        assert_eq!(metadata.icon, "data:image/png;base64,iVBORw==");
        assert_eq!(metadata.desc, domain::models::DEFAULT_SERVER_DESCRIPTION);
        assert_eq!(metadata.url, domain::models::DEFAULT_SERVER_URL);
    }

    #[test]
    fn metadata_is_absent_without_a_sync_row() {
        let engine = engine(&two_miners(), None);
        assert!(engine.server_metadata().unwrap().is_none());
    }

    #[test]
    fn aggregate_stats_on_an_empty_database_are_all_zero() {
        let engine = engine(&[], None);

        let stats = engine.server_aggregate_stats().unwrap();
        assert_eq!(stats.server_name, "Unknown");
        assert_eq!(stats.server_url, "#");
        assert_eq!(stats.stats.player_count, 0);
        assert_eq!(stats.stats.total_play_time, 0);
        assert_eq!(stats.stats.total_travelled_distance, 0);
        assert_eq!(stats.stats.total_mined_blocks, 0);
    }

    #[test]
    fn aggregate_stats_sum_the_expected_counters() {
        let players = vec![
            FixturePlayer {
                id: 1,
                uuid: "11111111-1111-1111-1111-111111111111",
                nick: "Busy",
                last_online_ms: LAST_ONLINE_MS,
                stats: vec![
                    (StatCategory::Custom, "play_time", 100),
                    (StatCategory::Custom, "damage_dealt", 7),
                    (StatCategory::Custom, "walk_one_cm", 500),
                    (StatCategory::Mined, "stone", 50),
                    (StatCategory::Broken, "pickaxe", 5),
                    (StatCategory::Crafted, "table", 2),
                    (StatCategory::Killed, "zombie", 9),
                    (StatCategory::Dropped, "dirt", 4),
                    (StatCategory::PickedUp, "dirt", 6),
                    (StatCategory::Used, "torch", 11),
                ],
            },
            FixturePlayer {
                id: 2,
                uuid: "22222222-2222-2222-2222-222222222222",
                nick: "Sailor",
                last_online_ms: LAST_ONLINE_MS,
                stats: vec![
                    (StatCategory::Custom, "play_time", 50),
                    (StatCategory::Custom, "boat_one_cm", 250),
                    (StatCategory::Mined, "stone", 70),
                ],
            },
        ];
        let engine = engine(
            &players,
            Some(&FixtureMetadata {
                server_name: Some("Test Server"),
                server_url: Some("https://stats.example"),
                ..FixtureMetadata::default()
            }),
        );

        let stats = engine.server_aggregate_stats().unwrap();
        assert_eq!(stats.server_name, "Test Server");
        assert_eq!(stats.server_url, "https://stats.example");
        assert_eq!(stats.stats.player_count, 2);
        assert_eq!(stats.stats.total_play_time, 150);
        assert_eq!(stats.stats.total_damage_dealt, 7);
        assert_eq!(stats.stats.total_travelled_distance, 750);
        assert_eq!(stats.stats.total_mined_blocks, 120);
        assert_eq!(stats.stats.total_broken_tools, 5);
        assert_eq!(stats.stats.total_crafted_items, 2);
        assert_eq!(stats.stats.total_killed_mobs, 9);
        assert_eq!(stats.stats.total_dropped_items, 4);
        assert_eq!(stats.stats.total_pickedup_items, 6);
    }

    #[test]
    fn leaderboard_joins_the_registry_and_orders_by_value() {
        let engine = engine(&two_miners(), None);

        let board = engine
            .stat_leaderboard(StatCategory::Mined, "stone")
            .unwrap();
        assert_eq!(
            board
                .iter()
                .map(|entry| (entry.player_id, entry.score, entry.rank))
                .collect::<Vec<_>>(),
            vec![(2, 70, Some(1)), (1, 50, Some(2))]
        );
        assert_eq!(board[0].player_nick, "Shovel");
        assert_eq!(board[0].player_uuid, "22222222-2222-2222-2222-222222222222");
    }

    #[test]
    fn leaderboard_for_an_unknown_stat_is_empty_not_an_error() {
        let engine = engine(&two_miners(), None);
        assert_eq!(
            engine
                .stat_leaderboard(StatCategory::Mined, "no_such_stat")
                .unwrap(),
            vec![]
        );
    }
}
