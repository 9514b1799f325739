use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::statistics::{StatCategory, StatEntry};

/// One row of the player registry. `id` and `uuid` are both unique and
/// immutable once assigned by the game server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    pub id: i64,
    pub uuid: String,
    pub nick: String,
    pub last_online: DateTime<Utc>,
}

/// Full per-player view assembled by the lookup operations.
///
/// `hof` is 0 for players without a hall-of-fame row. Categories in which the
/// player has no rows are absent from `stats` rather than present-but-empty,
/// and entries within a category keep their source-computed `position` order.
/// The numeric registry id is not part of this view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerProfile {
    pub nick: String,
    pub uuid: String,
    pub last_online: DateTime<Utc>,
    pub hof: i64,
    pub stats: BTreeMap<StatCategory, Vec<StatEntry>>,
}
