//! Global leaderboard
//!
//! - `LeaderboardClient`: the contract the game talks to
//! - `memory`: in-process sorted-set store (tests, native runs)
//! - `api`: serverless request boundary (validation, status codes, JSON)
//! - `http`: browser `fetch` client for the same endpoints (WASM only)

pub mod api;
#[cfg(target_arch = "wasm32")]
pub mod http;
pub mod memory;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::player::NameError;

pub use memory::MemoryLeaderboard;

/// One ranked row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// 1-based, descending by score
    pub rank: u32,
    pub player_id: String,
    pub name: String,
    pub score: u32,
    pub games_played: u32,
    /// ISO-8601 on the wire
    pub last_played: DateTime<Utc>,
}

/// Where a specific player sits, even outside the returned window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRank {
    pub rank: u32,
    pub player_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardPage {
    #[serde(rename = "leaderboard")]
    pub entries: Vec<LeaderboardEntry>,
    #[serde(default)]
    pub player_rank: Option<PlayerRank>,
    pub total_players: u32,
}

/// Result of a score submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    #[serde(default)]
    pub rank: Option<u32>,
    pub total_players: u32,
    pub new_record: bool,
    pub best_score: u32,
}

/// Context sent along with a score
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoreMeta {
    pub character: Character,
    /// Whether the client saw this as a personal best
    pub new_record: bool,
}

/// Leaderboard failures
///
/// Client errors (4xx) mean the request itself was wrong and repeating it
/// cannot help. Everything else is a server or transport failure.
#[derive(Debug, Clone, PartialEq)]
pub enum LeaderboardError {
    InvalidName(NameError),
    AlreadyRegistered,
    NotFound,
    OutOfRange,
    MissingField(&'static str),
    InvalidRequest(String),
    MethodNotAllowed,
    /// Storage failed
    Unavailable(String),
    /// The request never got an answer
    Network(String),
}

impl fmt::Display for LeaderboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidName(NameError::TooShort { .. } | NameError::TooLong { .. }) => {
                write!(f, "Player name must be between 2-15 characters")
            }
            Self::InvalidName(_) => write!(f, "Invalid player name"),
            Self::AlreadyRegistered => write!(f, "Player already registered"),
            Self::NotFound => write!(f, "Player not found"),
            Self::OutOfRange => write!(f, "Invalid score range"),
            Self::MissingField(field) => write!(f, "{} is required", field),
            Self::InvalidRequest(msg) => write!(f, "{}", msg),
            Self::MethodNotAllowed => write!(f, "Method not allowed"),
            Self::Unavailable(_) => write!(f, "Internal server error"),
            Self::Network(msg) => write!(f, "Connection error: {}", msg),
        }
    }
}

impl std::error::Error for LeaderboardError {}

impl From<NameError> for LeaderboardError {
    fn from(err: NameError) -> Self {
        Self::InvalidName(err)
    }
}

impl LeaderboardError {
    /// HTTP status the request boundary answers with
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidName(_)
            | Self::OutOfRange
            | Self::MissingField(_)
            | Self::InvalidRequest(_) => 400,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::AlreadyRegistered => 409,
            Self::Unavailable(_) => 500,
            Self::Network(_) => 503,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status())
    }

    /// Rebuild an error from a non-2xx response
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => Self::NotFound,
            405 => Self::MethodNotAllowed,
            409 => Self::AlreadyRegistered,
            400..=499 => Self::InvalidRequest(message),
            _ => Self::Unavailable(message),
        }
    }
}

/// The leaderboard as seen by the game
pub trait LeaderboardClient {
    /// Create a player record with score 0
    fn register_player(&mut self, player_id: &str, name: &str) -> Result<(), LeaderboardError>;

    /// Record a finished game. Best score only moves up; games played always increments.
    fn submit_score(
        &mut self,
        player_id: &str,
        score: u32,
        meta: &ScoreMeta,
    ) -> Result<SubmitOutcome, LeaderboardError>;

    /// Top `limit` players (capped at 50), plus `player_id`'s rank if given
    fn fetch_leaderboard(
        &self,
        limit: usize,
        player_id: Option<&str>,
    ) -> Result<LeaderboardPage, LeaderboardError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert!(LeaderboardError::OutOfRange.is_client_error());
        assert!(LeaderboardError::MissingField("score").is_client_error());
        assert!(LeaderboardError::AlreadyRegistered.is_client_error());
        assert!(!LeaderboardError::Unavailable("down".into()).is_client_error());
        assert!(!LeaderboardError::Network("offline".into()).is_client_error());
    }

    #[test]
    fn test_from_status() {
        assert_eq!(
            LeaderboardError::from_status(409, "dup"),
            LeaderboardError::AlreadyRegistered
        );
        assert_eq!(LeaderboardError::from_status(404, ""), LeaderboardError::NotFound);
        assert_eq!(
            LeaderboardError::from_status(400, "Invalid score range"),
            LeaderboardError::InvalidRequest("Invalid score range".into())
        );
        assert!(matches!(
            LeaderboardError::from_status(502, "bad gateway"),
            LeaderboardError::Unavailable(_)
        ));
    }

    #[test]
    fn test_name_error_messages() {
        let short: LeaderboardError = NameError::TooShort { len: 1 }.into();
        assert_eq!(short.to_string(), "Player name must be between 2-15 characters");
        let banned: LeaderboardError = NameError::Banned("bot").into();
        assert_eq!(banned.to_string(), "Invalid player name");
    }

    #[test]
    fn test_page_wire_format() {
        let json = r#"{
            "success": true,
            "leaderboard": [{
                "rank": 1,
                "playerId": "a",
                "name": "Ana",
                "score": 9,
                "gamesPlayed": 2,
                "lastPlayed": "2025-01-01T00:00:00.000Z"
            }],
            "playerRank": null,
            "totalPlayers": 1,
            "timestamp": "2025-01-01T00:00:05.000Z"
        }"#;
        let page: LeaderboardPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.entries[0].name, "Ana");
        assert_eq!(
            page.entries[0].last_played.timestamp_millis(),
            1_735_689_600_000
        );
        assert_eq!(page.player_rank, None);
        assert_eq!(page.total_players, 1);
    }
}
