//! Uniform serialization envelope for query results.
//!
//! Consumers never handle `QueryError` values directly; they receive
//! `{success, error, <payload>}` where exactly one of `error` and the payload
//! field is non-null. The payload key differs per operation family (`players`
//! for the registry list, `player` for profile lookups, `data` for everything
//! else), matching what downstream pages already consume.

use serde::Serialize;

use crate::errors::QueryError;
use crate::models::{Player, PlayerProfile};

#[derive(Debug, Clone, Serialize)]
pub struct PlayerListResponse {
    pub success: bool,
    pub error: Option<String>,
    pub players: Option<Vec<Player>>,
}

impl From<Result<Vec<Player>, QueryError>> for PlayerListResponse {
    fn from(result: Result<Vec<Player>, QueryError>) -> Self {
        match result {
            Ok(players) => Self {
                success: true,
                error: None,
                players: Some(players),
            },
            Err(err) => Self {
                success: false,
                error: Some(err.to_string()),
                players: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerProfileResponse {
    pub success: bool,
    pub error: Option<String>,
    pub player: Option<PlayerProfile>,
}

impl From<Result<PlayerProfile, QueryError>> for PlayerProfileResponse {
    fn from(result: Result<PlayerProfile, QueryError>) -> Self {
        match result {
            Ok(player) => Self {
                success: true,
                error: None,
                player: Some(player),
            },
            Err(err) => Self {
                success: false,
                error: Some(err.to_string()),
                player: None,
            },
        }
    }
}

/// Envelope for the hall-of-fame, metadata, aggregate and leaderboard
/// operations.
#[derive(Debug, Clone, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub error: Option<String>,
    pub data: Option<T>,
}

impl<T> From<Result<T, QueryError>> for DataResponse<T> {
    fn from(result: Result<T, QueryError>) -> Self {
        match result {
            Ok(data) => Self {
                success: true,
                error: None,
                data: Some(data),
            },
            Err(err) => Self {
                success: false,
                error: Some(err.to_string()),
                data: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeaderboardEntry;
    use serde_json::json;

    #[test]
    fn successful_data_envelope_has_null_error() {
        let result: Result<Vec<LeaderboardEntry>, QueryError> = Ok(vec![]);
        let envelope = DataResponse::from(result);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"success": true, "error": null, "data": []})
        );
    }

    #[test]
    fn failed_data_envelope_has_null_payload() {
        let result: Result<Vec<LeaderboardEntry>, QueryError> =
            Err(QueryError::player_not_found());
        let envelope = DataResponse::from(result);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"success": false, "error": "Player not found", "data": null})
        );
    }

    #[test]
    fn player_list_envelope_uses_the_players_key() {
        let envelope = PlayerListResponse::from(Ok(vec![]));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"success": true, "error": null, "players": []})
        );
    }

    #[test]
    fn profile_envelope_uses_the_player_key() {
        let envelope = PlayerProfileResponse::from(Err(QueryError::player_not_found()));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"success": false, "error": "Player not found", "player": null})
        );
    }
}
