/// Failure taxonomy shared by every statistics backend.
///
/// Empty result sets are deliberately not represented here. A leaderboard
/// with no rows, a player list with no players or an aggregate over empty
/// tables is a successful query.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The statistics source itself could not be reached or materialized:
    /// snapshot download failed, the downloaded snapshot did not parse, or no
    /// pooled connection could be acquired.
    #[error("statistics source unavailable: {0}")]
    SourceUnavailable(#[source] anyhow::Error),

    /// The requested entity does not exist in an otherwise healthy source.
    #[error("{0}")]
    NotFound(&'static str),

    /// A statement failed or a row refused to map to a domain value.
    #[error("query failed: {0}")]
    QueryFailed(#[source] anyhow::Error),
}

impl QueryError {
    pub fn source_unavailable(cause: impl Into<anyhow::Error>) -> Self {
        Self::SourceUnavailable(cause.into())
    }

    pub fn query_failed(cause: impl Into<anyhow::Error>) -> Self {
        Self::QueryFailed(cause.into())
    }

    pub fn player_not_found() -> Self {
        Self::NotFound("Player not found")
    }

    pub fn server_data_not_found() -> Self {
        Self::NotFound("No server data found")
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown stat category: {0}")]
pub struct UnknownStatCategory(pub String);
