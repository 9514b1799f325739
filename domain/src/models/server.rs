use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEFAULT_SERVER_DESCRIPTION: &str =
    "§cPowered by§r\n§a§lPlayer statistics §7§8(no motd found)";
pub const DEFAULT_SERVER_URL: &str = "https://modrinth.com/mod/player-statistics";
pub const DEFAULT_SERVER_ICON: &str = "/assets/server_missing_img.webp";

/// The `custom` counters that add up to `total_travelled_distance`, all in
/// centimeters.
pub const TRAVEL_DISTANCE_STAT_NAMES: [&str; 15] = [
    "climb_one_cm",
    "crouch_one_cm",
    "fall_one_cm",
    "fly_one_cm",
    "sprint_one_cm",
    "swim_one_cm",
    "walk_one_cm",
    "walk_on_water_one_cm",
    "walk_under_water_one_cm",
    "boat_one_cm",
    "aviate_one_cm",
    "horse_one_cm",
    "minecart_one_cm",
    "pig_one_cm",
    "strider_one_cm",
];

/// Renders a raw icon blob as an inline `data:` URI, or falls back to the
/// bundled placeholder asset when the source stored no icon at all.
pub fn icon_data_uri(icon: Option<&[u8]>) -> String {
    match icon {
        Some(bytes) => format!("data:image/png;base64,{}", BASE64.encode(bytes)),
        None => DEFAULT_SERVER_ICON.to_owned(),
    }
}

/// The `sync_metadata` singleton with every nullable field already
/// substituted, so consumers never see a hole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerMetadata {
    pub last_update: DateTime<Utc>,
    pub desc: String,
    pub url: String,
    pub icon: String,
}

impl ServerMetadata {
    /// Builds the metadata view from a raw `sync_metadata` row. Missing and
    /// empty text fields both fall back to the defaults; a present icon blob
    /// (even an empty one) is inlined as a data URI.
    pub fn from_source(
        last_update: DateTime<Utc>,
        desc: Option<String>,
        url: Option<String>,
        icon: Option<&[u8]>,
    ) -> Self {
        Self {
            last_update,
            desc: non_empty(desc).unwrap_or_else(|| DEFAULT_SERVER_DESCRIPTION.to_owned()),
            url: non_empty(url).unwrap_or_else(|| DEFAULT_SERVER_URL.to_owned()),
            icon: icon_data_uri(icon),
        }
    }
}

/// Raw `SUM` results of the aggregate query. Every field is `None` when the
/// summed table (or stat name selection) had no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateSums {
    pub play_time: Option<i64>,
    pub damage_dealt: Option<i64>,
    pub travelled_distance: Option<i64>,
    pub broken_tools: Option<i64>,
    pub crafted_items: Option<i64>,
    pub mined_blocks: Option<i64>,
    pub killed_mobs: Option<i64>,
    pub dropped_items: Option<i64>,
    pub pickedup_items: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateCounters {
    pub player_count: i64,
    pub total_play_time: i64,
    pub total_damage_dealt: i64,
    pub total_travelled_distance: i64,
    pub total_broken_tools: i64,
    pub total_crafted_items: i64,
    pub total_mined_blocks: i64,
    pub total_killed_mobs: i64,
    pub total_dropped_items: i64,
    pub total_pickedup_items: i64,
}

/// Server-wide aggregate view. An empty statistics database still produces
/// one row of all-zero counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    pub server_name: String,
    pub server_url: String,
    pub stats: AggregateCounters,
}

impl AggregateStats {
    pub fn from_source(
        server_name: Option<String>,
        server_url: Option<String>,
        player_count: i64,
        sums: AggregateSums,
    ) -> Self {
        Self {
            server_name: non_empty(server_name).unwrap_or_else(|| "Unknown".to_owned()),
            server_url: non_empty(server_url).unwrap_or_else(|| "#".to_owned()),
            stats: AggregateCounters {
                player_count,
                total_play_time: sums.play_time.unwrap_or(0),
                total_damage_dealt: sums.damage_dealt.unwrap_or(0),
                total_travelled_distance: sums.travelled_distance.unwrap_or(0),
                total_broken_tools: sums.broken_tools.unwrap_or(0),
                total_crafted_items: sums.crafted_items.unwrap_or(0),
                total_mined_blocks: sums.mined_blocks.unwrap_or(0),
                total_killed_mobs: sums.killed_mobs.unwrap_or(0),
                total_dropped_items: sums.dropped_items.unwrap_or(0),
                total_pickedup_items: sums.pickedup_items.unwrap_or(0),
            },
        }
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|value| !value.is_empty())
}
