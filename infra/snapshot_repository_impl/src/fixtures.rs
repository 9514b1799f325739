//! Schema-true snapshot builders for test suites.
//!
//! The builders synthesize the exact table layout the game server exports:
//! `uuid_map`, `hall_of_fame`, `sync_metadata` and the nine stat tables.
//! `position` ranks and hall-of-fame scores are derived from the inserted
//! values the same way the upstream exporter derives them, so fixtures stay
//! honest about cross-table consistency.

use std::collections::HashMap;

use rusqlite::{params, Connection};

use domain::models::StatCategory;

/// Placement points awarded for the top five positions of each counter.
const HOF_PLACEMENT_POINTS: [i64; 5] = [10, 5, 3, 2, 1];

pub struct FixturePlayer {
    pub id: i64,
    pub uuid: &'static str,
    pub nick: &'static str,
    pub last_online_ms: i64,
    /// `(category, stat name, amount)` rows; positions are computed.
    pub stats: Vec<(StatCategory, &'static str, i64)>,
}

pub struct FixtureMetadata {
    pub last_update_ms: i64,
    pub server_name: Option<&'static str>,
    pub server_desc: Option<&'static str>,
    pub server_url: Option<&'static str>,
    pub server_icon: Option<Vec<u8>>,
}

impl Default for FixtureMetadata {
    fn default() -> Self {
        Self {
            last_update_ms: 1_715_000_000_000,
            server_name: None,
            server_desc: None,
            server_url: None,
            server_icon: None,
        }
    }
}

/// Builds a complete binary snapshot. Passing no metadata leaves the
/// `sync_metadata` table present but empty.
pub fn snapshot_bytes(players: &[FixturePlayer], metadata: Option<&FixtureMetadata>) -> Vec<u8> {
    let staging = tempfile::NamedTempFile::new().expect("create snapshot staging file");
    {
        let conn = Connection::open(staging.path()).expect("open snapshot database");
        create_schema(&conn);
        insert_players(&conn, players);
        insert_stats_and_hall_of_fame(&conn, players);
        if let Some(metadata) = metadata {
            insert_metadata(&conn, metadata);
        }
    }
    std::fs::read(staging.path()).expect("read snapshot bytes")
}

fn create_schema(conn: &Connection) {
    conn.execute_batch(
        "CREATE TABLE uuid_map (
            id INTEGER PRIMARY KEY,
            player_uuid TEXT NOT NULL UNIQUE,
            player_nick TEXT NOT NULL,
            player_last_online INTEGER NOT NULL
         );
         CREATE TABLE hall_of_fame (
            player_id INTEGER PRIMARY KEY,
            score INTEGER NOT NULL
         );
         CREATE TABLE sync_metadata (
            last_update INTEGER NOT NULL,
            server_name TEXT,
            server_desc TEXT,
            server_url TEXT,
            server_icon BLOB
         );",
    )
    .expect("create registry tables");

    for category in StatCategory::ALL {
        conn.execute_batch(&format!(
            "CREATE TABLE {} (
                player_id INTEGER NOT NULL,
                stat_name TEXT NOT NULL,
                amount INTEGER NOT NULL,
                position INTEGER
             )",
            category.table_name()
        ))
        .expect("create stat table");
    }
}

fn insert_players(conn: &Connection, players: &[FixturePlayer]) {
    for player in players {
        conn.execute(
            "INSERT INTO uuid_map (id, player_uuid, player_nick, player_last_online)
             VALUES (?1, ?2, ?3, ?4)",
            params![player.id, player.uuid, player.nick, player.last_online_ms],
        )
        .expect("insert player");
    }
}

fn insert_stats_and_hall_of_fame(conn: &Connection, players: &[FixturePlayer]) {
    let mut counters: HashMap<(StatCategory, &str), Vec<(i64, i64)>> = HashMap::new();
    for player in players {
        for (category, stat_name, amount) in &player.stats {
            counters
                .entry((*category, stat_name))
                .or_default()
                .push((player.id, *amount));
        }
    }

    let mut hof_scores: HashMap<i64, i64> = HashMap::new();
    for ((category, stat_name), mut holders) in counters {
        // Stable sort: equal amounts keep player declaration order.
        holders.sort_by_key(|(_, amount)| std::cmp::Reverse(*amount));

        for (index, (player_id, amount)) in holders.iter().enumerate() {
            let position = (index + 1) as i64;
            conn.execute(
                &format!(
                    "INSERT INTO {} (player_id, stat_name, amount, position)
                     VALUES (?1, ?2, ?3, ?4)",
                    category.table_name()
                ),
                params![player_id, stat_name, amount, position],
            )
            .expect("insert stat row");

            if let Some(points) = HOF_PLACEMENT_POINTS.get(index) {
                *hof_scores.entry(*player_id).or_default() += points;
            }
        }
    }

    let mut scored = hof_scores.into_iter().collect::<Vec<_>>();
    scored.sort_unstable();
    for (player_id, score) in scored {
        conn.execute(
            "INSERT INTO hall_of_fame (player_id, score) VALUES (?1, ?2)",
            params![player_id, score],
        )
        .expect("insert hall of fame row");
    }
}

fn insert_metadata(conn: &Connection, metadata: &FixtureMetadata) {
    conn.execute(
        "INSERT INTO sync_metadata (last_update, server_name, server_desc, server_url, server_icon)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            metadata.last_update_ms,
            metadata.server_name,
            metadata.server_desc,
            metadata.server_url,
            metadata.server_icon
        ],
    )
    .expect("insert sync metadata");
}
