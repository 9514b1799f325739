use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::errors::UnknownStatCategory;

/// The nine stat tables of the statistics schema. The declaration order is
/// the canonical iteration order (it is also alphabetical on the table name),
/// so ordered maps keyed by category serialize identically on every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatCategory {
    Broken,
    Crafted,
    Custom,
    Dropped,
    Killed,
    KilledBy,
    Mined,
    PickedUp,
    Used,
}

impl StatCategory {
    pub const ALL: [StatCategory; 9] = [
        StatCategory::Broken,
        StatCategory::Crafted,
        StatCategory::Custom,
        StatCategory::Dropped,
        StatCategory::Killed,
        StatCategory::KilledBy,
        StatCategory::Mined,
        StatCategory::PickedUp,
        StatCategory::Used,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            StatCategory::Broken => "broken",
            StatCategory::Crafted => "crafted",
            StatCategory::Custom => "custom",
            StatCategory::Dropped => "dropped",
            StatCategory::Killed => "killed",
            StatCategory::KilledBy => "killed_by",
            StatCategory::Mined => "mined",
            StatCategory::PickedUp => "picked_up",
            StatCategory::Used => "used",
        }
    }
}

impl fmt::Display for StatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

impl FromStr for StatCategory {
    type Err = UnknownStatCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatCategory::ALL
            .into_iter()
            .find(|category| category.table_name() == s)
            .ok_or_else(|| UnknownStatCategory(s.to_owned()))
    }
}

/// One named counter within a stat category.
///
/// `position` is the source-computed rank of this value among all players
/// holding the same (category, name) counter; 1 is the highest value. The
/// query core never recomputes positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatEntry {
    pub name: String,
    pub value: i64,
    pub position: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HallOfFameEntry {
    pub id: i64,
    pub uuid: String,
    pub nick: String,
    pub score: i64,
}

/// One row of a per-stat leaderboard, already joined with the player
/// registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: Option<i64>,
    pub player_id: i64,
    pub player_uuid: String,
    pub player_nick: String,
    pub score: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_parse_from_their_table_names() {
        for category in StatCategory::ALL {
            assert_eq!(
                category.table_name().parse::<StatCategory>().unwrap(),
                category
            );
        }
        assert!("uuid_map".parse::<StatCategory>().is_err());
    }

    #[test]
    fn category_order_follows_table_names() {
        let mut sorted = StatCategory::ALL;
        sorted.sort_by_key(|category| category.table_name());
        assert_eq!(sorted, StatCategory::ALL);
    }

    #[test]
    fn categories_serialize_as_table_names() {
        let json = serde_json::to_string(&StatCategory::KilledBy).unwrap();
        assert_eq!(json, "\"killed_by\"");
        let json = serde_json::to_string(&StatCategory::PickedUp).unwrap();
        assert_eq!(json, "\"picked_up\"");
    }
}
