mod player;
mod server;
mod statistics;

pub use player::{Player, PlayerProfile};
pub use server::{
    icon_data_uri, AggregateCounters, AggregateStats, AggregateSums, ServerMetadata,
    DEFAULT_SERVER_DESCRIPTION, DEFAULT_SERVER_ICON, DEFAULT_SERVER_URL,
    TRAVEL_DISTANCE_STAT_NAMES,
};
pub use statistics::{HallOfFameEntry, LeaderboardEntry, StatCategory, StatEntry};
