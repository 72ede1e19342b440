//! In-process leaderboard
//!
//! Mirrors the hosted store: a hash of player records plus a sorted set of
//! best scores. Used by tests, the native runner and the request boundary.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::{
    LeaderboardClient, LeaderboardEntry, LeaderboardError, LeaderboardPage, PlayerRank,
    ScoreMeta, SubmitOutcome,
};
use crate::consts::{MAX_LEADERBOARD_LIMIT, MAX_SUBMITTED_SCORE};
use crate::player::validate_name;

/// A single score above the previous best by more than this is logged
const SUSPICIOUS_JUMP: u32 = 100;

#[derive(Debug, Clone)]
struct PlayerRow {
    name: String,
    best_score: u32,
    games_played: u32,
    created_at: DateTime<Utc>,
    last_played: DateTime<Utc>,
    /// Order in which the current best was reached; breaks ties
    reached_seq: u64,
}

#[derive(Debug, Default)]
pub struct MemoryLeaderboard {
    players: HashMap<String, PlayerRow>,
    next_seq: u64,
    offline: bool,
}

impl MemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a storage outage: every call fails with `Unavailable`
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Registration time of a player
    pub fn created_at(&self, player_id: &str) -> Option<DateTime<Utc>> {
        self.players.get(player_id).map(|row| row.created_at)
    }

    fn check_online(&self) -> Result<(), LeaderboardError> {
        if self.offline {
            Err(LeaderboardError::Unavailable("storage offline".into()))
        } else {
            Ok(())
        }
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// All players, best first
    fn ranked(&self) -> Vec<(&String, &PlayerRow)> {
        let mut rows: Vec<_> = self.players.iter().collect();
        rows.sort_by(|(_, a), (_, b)| {
            b.best_score
                .cmp(&a.best_score)
                .then(a.reached_seq.cmp(&b.reached_seq))
        });
        rows
    }

    fn rank_of(&self, player_id: &str) -> Option<u32> {
        self.ranked()
            .iter()
            .position(|(id, _)| id.as_str() == player_id)
            .map(|i| i as u32 + 1)
    }
}

impl LeaderboardClient for MemoryLeaderboard {
    fn register_player(&mut self, player_id: &str, name: &str) -> Result<(), LeaderboardError> {
        if player_id.is_empty() {
            return Err(LeaderboardError::MissingField("playerId"));
        }
        let name = validate_name(name)?;
        self.check_online()?;
        if self.players.contains_key(player_id) {
            return Err(LeaderboardError::AlreadyRegistered);
        }

        let now = Utc::now();
        let seq = self.bump_seq();
        self.players.insert(
            player_id.to_string(),
            PlayerRow {
                name,
                best_score: 0,
                games_played: 0,
                created_at: now,
                last_played: now,
                reached_seq: seq,
            },
        );
        log::info!("Player registered: {}", player_id);
        Ok(())
    }

    fn submit_score(
        &mut self,
        player_id: &str,
        score: u32,
        meta: &ScoreMeta,
    ) -> Result<SubmitOutcome, LeaderboardError> {
        if score > MAX_SUBMITTED_SCORE {
            return Err(LeaderboardError::OutOfRange);
        }
        self.check_online()?;
        if !self.players.contains_key(player_id) {
            return Err(LeaderboardError::NotFound);
        }

        let seq = self.bump_seq();
        let Some(row) = self.players.get_mut(player_id) else {
            return Err(LeaderboardError::NotFound);
        };

        if score > row.best_score.saturating_add(SUSPICIOUS_JUMP) {
            log::warn!(
                "Suspicious score jump for {}: {} -> {}",
                player_id,
                row.best_score,
                score
            );
        }

        row.games_played += 1;
        row.last_played = Utc::now();
        let new_record = score > row.best_score;
        if new_record {
            row.best_score = score;
            row.reached_seq = seq;
        }
        let best_score = row.best_score;
        log::debug!(
            "Score {} for {} ({}, new record: {})",
            score,
            player_id,
            meta.character.key(),
            new_record
        );

        Ok(SubmitOutcome {
            rank: self.rank_of(player_id),
            total_players: self.players.len() as u32,
            new_record,
            best_score,
        })
    }

    fn fetch_leaderboard(
        &self,
        limit: usize,
        player_id: Option<&str>,
    ) -> Result<LeaderboardPage, LeaderboardError> {
        self.check_online()?;
        let limit = limit.clamp(1, MAX_LEADERBOARD_LIMIT);
        let ranked = self.ranked();

        let entries = ranked
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, (id, row))| LeaderboardEntry {
                rank: i as u32 + 1,
                player_id: (*id).clone(),
                name: row.name.clone(),
                score: row.best_score,
                games_played: row.games_played,
                last_played: row.last_played,
            })
            .collect();

        let player_rank = player_id.and_then(|wanted| {
            ranked
                .iter()
                .position(|(id, _)| id.as_str() == wanted)
                .map(|i| PlayerRank {
                    rank: i as u32 + 1,
                    player_id: wanted.to_string(),
                })
        });

        Ok(LeaderboardPage {
            entries,
            player_rank,
            total_players: ranked.len() as u32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::NameError;

    fn meta() -> ScoreMeta {
        ScoreMeta::default()
    }

    fn board_with(scores: &[(&str, u32)]) -> MemoryLeaderboard {
        let mut board = MemoryLeaderboard::new();
        for (id, score) in scores {
            board.register_player(id, &format!("Name {}", id)).unwrap();
            board.submit_score(id, *score, &meta()).unwrap();
        }
        board
    }

    #[test]
    fn test_register_starts_at_zero() {
        let mut board = MemoryLeaderboard::new();
        board.register_player("p1", "Fonso").unwrap();
        let page = board.fetch_leaderboard(10, Some("p1")).unwrap();
        assert_eq!(page.entries[0].score, 0);
        assert_eq!(page.entries[0].games_played, 0);
        assert_eq!(page.player_rank.map(|r| r.rank), Some(1));
    }

    #[test]
    fn test_register_rejects_bad_names_and_duplicates() {
        let mut board = MemoryLeaderboard::new();
        assert_eq!(
            board.register_player("p1", "Admin99"),
            Err(LeaderboardError::InvalidName(NameError::Banned("admin")))
        );
        assert!(board.is_empty());

        board.register_player("p1", "Rocky").unwrap();
        assert_eq!(
            board.register_player("p1", "Rocky"),
            Err(LeaderboardError::AlreadyRegistered)
        );
        assert_eq!(
            board.register_player("", "Rocky"),
            Err(LeaderboardError::MissingField("playerId"))
        );
    }

    #[test]
    fn test_best_only_moves_up() {
        let mut board = board_with(&[("p1", 100)]);

        let first = board.submit_score("p1", 150, &meta()).unwrap();
        assert!(first.new_record);
        assert_eq!(first.best_score, 150);

        let second = board.submit_score("p1", 90, &meta()).unwrap();
        assert!(!second.new_record);
        assert_eq!(second.best_score, 150);

        let page = board.fetch_leaderboard(10, None).unwrap();
        assert_eq!(page.entries[0].score, 150);
        assert_eq!(page.entries[0].games_played, 3);
    }

    #[test]
    fn test_submit_validation() {
        let mut board = board_with(&[("p1", 1)]);
        assert_eq!(
            board.submit_score("p1", 1001, &meta()),
            Err(LeaderboardError::OutOfRange)
        );
        assert_eq!(
            board.submit_score("ghost", 10, &meta()),
            Err(LeaderboardError::NotFound)
        );
        assert!(board.submit_score("p1", 1000, &meta()).is_ok());
    }

    #[test]
    fn test_limit_window_and_player_rank() {
        let board = board_with(&[("a", 10), ("b", 50), ("c", 30), ("d", 40), ("e", 5)]);
        let page = board.fetch_leaderboard(3, Some("e")).unwrap();

        assert_eq!(page.entries.len(), 3);
        let ranked: Vec<_> = page
            .entries
            .iter()
            .map(|e| (e.rank, e.player_id.as_str(), e.score))
            .collect();
        assert_eq!(ranked, vec![(1, "b", 50), (2, "d", 40), (3, "c", 30)]);
        assert_eq!(page.player_rank.map(|r| r.rank), Some(5));
        assert_eq!(page.total_players, 5);
    }

    #[test]
    fn test_limit_is_clamped() {
        let ids: Vec<String> = (0..60).map(|i| format!("p{}", i)).collect();
        let mut board = MemoryLeaderboard::new();
        for id in &ids {
            board.register_player(id, "Player").unwrap();
        }
        assert_eq!(board.fetch_leaderboard(500, None).unwrap().entries.len(), 50);
        assert_eq!(board.fetch_leaderboard(0, None).unwrap().entries.len(), 1);
    }

    #[test]
    fn test_ties_rank_first_reacher_higher() {
        let board = board_with(&[("early", 20), ("late", 20)]);
        let page = board.fetch_leaderboard(10, Some("late")).unwrap();
        assert_eq!(page.entries[0].player_id, "early");
        assert_eq!(page.player_rank.map(|r| r.rank), Some(2));
    }

    #[test]
    fn test_unknown_player_has_no_rank() {
        let board = board_with(&[("a", 1)]);
        let page = board.fetch_leaderboard(10, Some("nobody")).unwrap();
        assert!(page.player_rank.is_none());
    }

    #[test]
    fn test_offline_store_is_unavailable() {
        let mut board = board_with(&[("a", 1)]);
        board.set_offline(true);
        let err = board.fetch_leaderboard(10, None).unwrap_err();
        assert!(matches!(err, LeaderboardError::Unavailable(_)));
        assert!(!err.is_client_error());

        board.set_offline(false);
        assert!(board.fetch_leaderboard(10, None).is_ok());
    }
}
