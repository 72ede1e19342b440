//! Local player identity
//!
//! Persisted to LocalStorage. A player gets an opaque id on first launch and
//! becomes registered once a name is accepted by the leaderboard.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 15;

/// Substrings rejected anywhere in a name, case-insensitively
pub const BANNED_WORDS: [&str; 4] = ["admin", "test", "bot", "spam"];

/// Why a player name was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    TooShort { len: usize },
    TooLong { len: usize },
    InvalidCharacter(char),
    Banned(&'static str),
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { .. } => {
                write!(f, "name must be at least {} characters", NAME_MIN_CHARS)
            }
            Self::TooLong { .. } => {
                write!(f, "name must be at most {} characters", NAME_MAX_CHARS)
            }
            Self::InvalidCharacter(c) => write!(f, "name cannot contain {:?}", c),
            Self::Banned(_) => write!(f, "invalid player name"),
        }
    }
}

impl std::error::Error for NameError {}

#[inline]
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ' ' || c == '_' || c == '-'
}

/// Strip characters a name may not contain and trim surrounding spaces
pub fn sanitize_name(raw: &str) -> String {
    let filtered: String = raw.chars().filter(|&c| is_name_char(c)).collect();
    filtered.trim().to_string()
}

/// Check a name against the length, charset and banned-word rules.
/// Returns the trimmed name.
pub fn validate_name(raw: &str) -> Result<String, NameError> {
    let name = raw.trim();
    let len = name.chars().count();
    if len < NAME_MIN_CHARS {
        return Err(NameError::TooShort { len });
    }
    if len > NAME_MAX_CHARS {
        return Err(NameError::TooLong { len });
    }
    if let Some(c) = name.chars().find(|&c| !is_name_char(c)) {
        return Err(NameError::InvalidCharacter(c));
    }
    let lower = name.to_lowercase();
    if let Some(word) = BANNED_WORDS.iter().copied().find(|w| lower.contains(w)) {
        return Err(NameError::Banned(word));
    }
    Ok(name.to_string())
}

/// New opaque id: `player_<unix ms>_<9 base-36 chars>`
pub fn generate_player_id<R: Rng>(now_ms: f64, rng: &mut R) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let suffix: String = (0..9)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    format!("player_{}_{}", now_ms as u64, suffix)
}

/// Stored shape of a registered player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub best_score: u32,
    /// Registration time, ISO-8601 on the wire
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

/// The player on this device
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: String,
    pub name: Option<String>,
    pub best_score: u32,
    pub is_registered: bool,
    created_at: DateTime<Utc>,
}

impl Player {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "flappy_player";

    /// Unregistered player with the given id
    pub fn guest(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            best_score: 0,
            is_registered: false,
            created_at: DateTime::default(),
        }
    }

    /// Unregistered player with a freshly generated id
    pub fn new_guest() -> Self {
        let id = generate_player_id(crate::now_ms(), &mut rand::rng());
        log::info!("New player id generated: {}", id);
        Self::guest(id)
    }

    pub fn from_record(record: PlayerRecord) -> Self {
        Self {
            id: record.id,
            name: Some(record.name),
            best_score: record.best_score,
            is_registered: true,
            created_at: record.created_at,
        }
    }

    /// Mark the player registered under `name`
    pub fn register(&mut self, name: impl Into<String>, now: DateTime<Utc>) -> PlayerRecord {
        self.name = Some(name.into());
        self.is_registered = true;
        self.created_at = now;
        log::info!("Player {} registered locally", self.id);
        self.record_unchecked()
    }

    /// Raise the local best if `score` beats it. Returns true on a new record.
    pub fn update_best(&mut self, score: u32) -> bool {
        if score > self.best_score {
            self.best_score = score;
            true
        } else {
            false
        }
    }

    /// Storable record, only for registered players
    pub fn record(&self) -> Option<PlayerRecord> {
        self.is_registered.then(|| self.record_unchecked())
    }

    fn record_unchecked(&self) -> PlayerRecord {
        PlayerRecord {
            id: self.id.clone(),
            name: self.name.clone().unwrap_or_default(),
            best_score: self.best_score,
            created_at: self.created_at,
        }
    }

    /// Load the player from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<PlayerRecord>(&json) {
                    Ok(record) => {
                        log::info!("Loaded player {} ({})", record.name, record.id);
                        return Self::from_record(record);
                    }
                    Err(e) => log::error!("Error loading player data: {}", e),
                }
            }
        }

        Self::new_guest()
    }

    /// Save a player record to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(record: &PlayerRecord) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(record) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Player saved (best {})", record.best_score);
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new_guest()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(_record: &PlayerRecord) {
        // No-op for native
    }
}
