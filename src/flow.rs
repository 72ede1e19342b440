//! Top-level screen state machine
//!
//! `Start → CharacterSelect → (Registration) → Playing → GameOver`, with
//! `Ranking` reachable from `Start` and `GameOver`. The flow performs no I/O:
//! leaderboard calls and storage writes are queued as [`FlowCommand`]s for the
//! host to run, and their results come back through `on_*` methods.

use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::character::{Character, Instrument};
use crate::consts::DEFAULT_LEADERBOARD_LIMIT;
use crate::leaderboard::{LeaderboardError, LeaderboardPage, ScoreMeta};
use crate::player::{Player, PlayerRecord, sanitize_name, validate_name};
use crate::sim::{self, Bird, Collectible, Obstacle, Session, SessionEvent, SessionPhase, TickInput};
use crate::tuning::Tuning;

/// What the last game ended with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOverSummary {
    pub final_score: u32,
    pub character: Character,
    pub new_record: bool,
    pub best_score: u32,
}

/// Screen to return to when leaving the ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingOrigin {
    Start,
    GameOver(GameOverSummary),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankingStatus {
    Loading,
    Ready,
    /// Last fetch failed; showing the previous page if any
    Stale(String),
}

#[derive(Debug, Clone)]
pub enum Screen {
    Start,
    CharacterSelect,
    /// Name entry for unregistered players, after the character pick
    Registration {
        character: Character,
        message: Option<String>,
        pending: bool,
    },
    Playing(Box<Session>),
    GameOver(GameOverSummary),
    Ranking {
        origin: RankingOrigin,
        status: RankingStatus,
    },
}

/// Side effects requested by the flow
#[derive(Debug, Clone, PartialEq)]
pub enum FlowCommand {
    RegisterPlayer {
        player_id: String,
        name: String,
    },
    /// Fire-and-forget; the result is never fed back
    SubmitScore {
        player_id: String,
        score: u32,
        meta: ScoreMeta,
    },
    FetchLeaderboard {
        limit: usize,
        player_id: Option<String>,
    },
    PersistPlayer(PlayerRecord),
}

pub struct ScreenFlow {
    screen: Screen,
    player: Player,
    tuning: Tuning,
    /// Supplies one seed per session
    seeds: Pcg32,
    /// Name sent with the in-flight registration
    pending_name: Option<String>,
    ranking: Option<LeaderboardPage>,
    commands: Vec<FlowCommand>,
    events: Vec<SessionEvent>,
}

impl ScreenFlow {
    pub fn new(player: Player, tuning: Tuning, seed: u64) -> Self {
        Self {
            screen: Screen::Start,
            player,
            tuning,
            seeds: Pcg32::seed_from_u64(seed),
            pending_name: None,
            ranking: None,
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Last leaderboard page received
    pub fn ranking(&self) -> Option<&LeaderboardPage> {
        self.ranking.as_ref()
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.screen {
            Screen::Playing(session) => Some(session.as_ref()),
            _ => None,
        }
    }

    /// Whether flap input means anything right now
    pub fn is_playing(&self) -> bool {
        matches!(self.screen, Screen::Playing(_))
    }

    fn go(&mut self, screen: Screen) {
        log::debug!("Screen: {} -> {}", screen_name(&self.screen), screen_name(&screen));
        self.screen = screen;
    }

    fn start_session(&mut self, character: Character) {
        let seed = self.seeds.random();
        let session = Session::new(character, self.tuning.clone(), seed);
        self.go(Screen::Playing(Box::new(session)));
    }

    /// Start screen "play"
    pub fn play(&mut self) {
        if matches!(self.screen, Screen::Start) {
            self.go(Screen::CharacterSelect);
        }
    }

    /// Pick a character. Unregistered players enter their name first.
    pub fn select_character(&mut self, character: Character) {
        if !matches!(self.screen, Screen::CharacterSelect) {
            return;
        }
        if self.player.is_registered {
            self.start_session(character);
        } else {
            self.go(Screen::Registration {
                character,
                message: None,
                pending: false,
            });
        }
    }

    /// Name typed in the registration modal. Invalid names are rejected
    /// here and never reach the network.
    pub fn submit_name(&mut self, text: &str) {
        let Screen::Registration {
            message, pending, ..
        } = &mut self.screen
        else {
            return;
        };
        if *pending {
            return;
        }

        match validate_name(&sanitize_name(text)) {
            Ok(name) => {
                *message = None;
                *pending = true;
                self.pending_name = Some(name.clone());
                self.commands.push(FlowCommand::RegisterPlayer {
                    player_id: self.player.id.clone(),
                    name,
                });
            }
            Err(err) => {
                log::debug!("Rejected name {:?}: {}", text, err);
                *message = Some(LeaderboardError::from(err).to_string());
            }
        }
    }

    pub fn cancel_registration(&mut self) {
        if matches!(self.screen, Screen::Registration { .. }) {
            self.go(Screen::Start);
        }
    }

    /// Outcome of the `RegisterPlayer` command sent with `name`.
    ///
    /// Only the answer to the request currently on screen moves the flow
    /// forward. An earlier request that the server accepted still binds the
    /// id to its name, so that name wins locally. A conflict means the id is
    /// already known to the server and counts as success; the typed name is
    /// kept unless an accepted name has been seen.
    pub fn on_registration_result(&mut self, name: &str, result: Result<(), LeaderboardError>) {
        let current = self.pending_name.as_deref() == Some(name);

        match result {
            Ok(()) => {
                if !self.player.is_registered || self.player.name.as_deref() != Some(name) {
                    let record = self.player.register(name, Utc::now());
                    self.commands.push(FlowCommand::PersistPlayer(record));
                }
            }
            Err(_) if !current => {
                log::debug!("Ignoring stale registration answer for {:?}", name);
                return;
            }
            Err(LeaderboardError::AlreadyRegistered) => {
                log::warn!("Player {} already registered, reusing it", self.player.id);
                if !self.player.is_registered {
                    let record = self.player.register(name, Utc::now());
                    self.commands.push(FlowCommand::PersistPlayer(record));
                }
            }
            Err(err) => {
                log::warn!("Registration failed: {}", err);
                self.pending_name = None;
                if let Screen::Registration {
                    message, pending, ..
                } = &mut self.screen
                {
                    *message = Some(err.to_string());
                    *pending = false;
                }
                return;
            }
        }

        if !current {
            return;
        }
        self.pending_name = None;
        if let Screen::Registration {
            character,
            pending: true,
            ..
        } = self.screen
        {
            self.start_session(character);
        }
    }

    /// Run one simulation tick
    pub fn tick(&mut self, input: &TickInput) {
        let Screen::Playing(session) = &mut self.screen else {
            return;
        };
        sim::tick(session, input);
        self.events.extend(session.drain_events());
        if session.is_over() {
            let final_score = session.final_score.unwrap_or(session.score);
            let character = session.character;
            self.finish_session(final_score, character);
        }
    }

    fn finish_session(&mut self, final_score: u32, character: Character) {
        let new_record = self.player.update_best(final_score);

        if self.player.is_registered {
            if new_record {
                if let Some(record) = self.player.record() {
                    self.commands.push(FlowCommand::PersistPlayer(record));
                }
            }
            self.commands.push(FlowCommand::SubmitScore {
                player_id: self.player.id.clone(),
                score: final_score,
                meta: ScoreMeta {
                    character,
                    new_record,
                },
            });
        }

        self.go(Screen::GameOver(GameOverSummary {
            final_score,
            character,
            new_record,
            best_score: self.player.best_score,
        }));
    }

    pub fn play_again(&mut self) {
        if matches!(self.screen, Screen::GameOver(_)) {
            self.go(Screen::CharacterSelect);
        }
    }

    pub fn main_menu(&mut self) {
        match self.screen {
            Screen::GameOver(_) | Screen::CharacterSelect | Screen::Ranking { .. } => {
                self.go(Screen::Start)
            }
            Screen::Registration { .. } => self.cancel_registration(),
            Screen::Start | Screen::Playing(_) => {}
        }
    }

    fn request_ranking(&mut self) {
        let player_id = self
            .player
            .is_registered
            .then(|| self.player.id.clone());
        self.commands.push(FlowCommand::FetchLeaderboard {
            limit: DEFAULT_LEADERBOARD_LIMIT,
            player_id,
        });
    }

    /// Open the ranking from `Start` or `GameOver`
    pub fn open_ranking(&mut self) {
        let origin = match self.screen {
            Screen::Start => RankingOrigin::Start,
            Screen::GameOver(summary) => RankingOrigin::GameOver(summary),
            _ => return,
        };
        self.go(Screen::Ranking {
            origin,
            status: RankingStatus::Loading,
        });
        self.request_ranking();
    }

    pub fn refresh_ranking(&mut self) {
        if let Screen::Ranking { status, .. } = &mut self.screen {
            *status = RankingStatus::Loading;
            self.request_ranking();
        }
    }

    /// Outcome of a `FetchLeaderboard` command
    pub fn on_leaderboard(&mut self, result: Result<LeaderboardPage, LeaderboardError>) {
        let status = match result {
            Ok(page) => {
                self.ranking = Some(page);
                RankingStatus::Ready
            }
            Err(err) => {
                log::warn!("Leaderboard fetch failed: {}", err);
                RankingStatus::Stale(err.to_string())
            }
        };
        if let Screen::Ranking { status: current, .. } = &mut self.screen {
            *current = status;
        }
    }

    /// Leave the ranking for where it was opened from; elsewhere step back one screen
    pub fn back(&mut self) {
        match self.screen {
            Screen::Ranking { origin, .. } => match origin {
                RankingOrigin::Start => self.go(Screen::Start),
                RankingOrigin::GameOver(summary) => self.go(Screen::GameOver(summary)),
            },
            Screen::CharacterSelect => self.go(Screen::Start),
            Screen::Registration { .. } => self.cancel_registration(),
            _ => {}
        }
    }

    /// Take queued side effects
    pub fn drain_commands(&mut self) -> Vec<FlowCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Take gameplay events since the last call (sound cues)
    pub fn drain_session_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Snapshot for the presentation layer
    pub fn view(&self) -> FlowView<'_> {
        match &self.screen {
            Screen::Start => FlowView::Start {
                player_name: self.player.name.as_deref(),
                best_score: self.player.best_score,
            },
            Screen::CharacterSelect => FlowView::CharacterSelect {
                characters: Character::ALL
                    .iter()
                    .map(|c| CharacterView {
                        key: c.key(),
                        name: c.name(),
                        tagline: c.tagline(),
                        instrument: c.instrument(),
                    })
                    .collect(),
            },
            Screen::Registration {
                character,
                message,
                pending,
            } => FlowView::Registration {
                character: *character,
                message: message.as_deref(),
                pending: *pending,
            },
            Screen::Playing(session) => FlowView::Playing {
                phase: session.phase,
                score: session.score,
                character: session.character,
                bird: &session.bird,
                obstacles: session.field.obstacles.iter().collect(),
                collectibles: session.field.active_collectibles().collect(),
            },
            Screen::GameOver(summary) => FlowView::GameOver(*summary),
            Screen::Ranking { status, .. } => {
                let (loading, error) = match status {
                    RankingStatus::Loading => (true, None),
                    RankingStatus::Ready => (false, None),
                    RankingStatus::Stale(msg) => (false, Some(msg.as_str())),
                };
                FlowView::Ranking {
                    loading,
                    error,
                    page: self.ranking.as_ref(),
                    player_id: self.player.is_registered.then_some(self.player.id.as_str()),
                }
            }
        }
    }
}

fn screen_name(screen: &Screen) -> &'static str {
    match screen {
        Screen::Start => "start",
        Screen::CharacterSelect => "character-select",
        Screen::Registration { .. } => "registration",
        Screen::Playing(_) => "playing",
        Screen::GameOver(_) => "game-over",
        Screen::Ranking { .. } => "ranking",
    }
}

#[derive(Debug, Serialize)]
pub struct CharacterView {
    pub key: &'static str,
    pub name: &'static str,
    pub tagline: &'static str,
    pub instrument: Instrument,
}

/// Serializable screen snapshot, tagged by `screen`
#[derive(Debug, Serialize)]
#[serde(tag = "screen", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FlowView<'a> {
    Start {
        player_name: Option<&'a str>,
        best_score: u32,
    },
    CharacterSelect {
        characters: Vec<CharacterView>,
    },
    Registration {
        character: Character,
        message: Option<&'a str>,
        pending: bool,
    },
    Playing {
        phase: SessionPhase,
        score: u32,
        character: Character,
        bird: &'a Bird,
        obstacles: Vec<&'a Obstacle>,
        collectibles: Vec<&'a Collectible>,
    },
    GameOver(GameOverSummary),
    Ranking {
        loading: bool,
        error: Option<&'a str>,
        page: Option<&'a LeaderboardPage>,
        player_id: Option<&'a str>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::{LeaderboardEntry, PlayerRank};

    fn registered_flow() -> ScreenFlow {
        let mut player = Player::guest("player_1_abc");
        player.register("Fonso", Utc::now());
        ScreenFlow::new(player, Tuning::default(), 11)
    }

    fn guest_flow() -> ScreenFlow {
        ScreenFlow::new(Player::guest("player_2_xyz"), Tuning::default(), 11)
    }

    const FLAP: TickInput = TickInput {
        jump: true,
        idle_mode: false,
    };

    /// One flap, then no input until the session ends
    fn crash(flow: &mut ScreenFlow) {
        flow.tick(&FLAP);
        for _ in 0..10_000 {
            if !matches!(flow.screen(), Screen::Playing(_)) {
                return;
            }
            flow.tick(&TickInput::default());
        }
        panic!("session never ended");
    }

    fn page(ids: &[&str]) -> LeaderboardPage {
        LeaderboardPage {
            entries: ids
                .iter()
                .enumerate()
                .map(|(i, id)| LeaderboardEntry {
                    rank: i as u32 + 1,
                    player_id: id.to_string(),
                    name: id.to_string(),
                    score: 10 - i as u32,
                    games_played: 1,
                    last_played: Utc::now(),
                })
                .collect(),
            player_rank: Some(PlayerRank {
                rank: 1,
                player_id: ids[0].to_string(),
            }),
            total_players: ids.len() as u32,
        }
    }

    #[test]
    fn test_registered_player_goes_straight_to_play() {
        let mut flow = registered_flow();
        flow.play();
        assert!(matches!(flow.screen(), Screen::CharacterSelect));

        flow.select_character(Character::Mauro);
        let session = flow.session().unwrap();
        assert_eq!(session.character, Character::Mauro);
        assert_eq!(session.phase, SessionPhase::Ready);
        assert!(flow.drain_commands().is_empty());
    }

    #[test]
    fn test_registration_gates_play() {
        let mut flow = guest_flow();
        flow.play();
        flow.select_character(Character::Diego);
        assert!(matches!(flow.screen(), Screen::Registration { .. }));

        flow.submit_name("x");
        match flow.screen() {
            Screen::Registration {
                message, pending, ..
            } => {
                assert!(message.is_some());
                assert!(!pending);
            }
            other => panic!("unexpected screen {:?}", other),
        }
        assert!(flow.drain_commands().is_empty());

        flow.submit_name("  <Diego!> ");
        assert_eq!(
            flow.drain_commands(),
            vec![FlowCommand::RegisterPlayer {
                player_id: "player_2_xyz".into(),
                name: "Diego".into(),
            }]
        );

        flow.on_registration_result("Diego", Ok(()));
        assert!(flow.player().is_registered);
        assert_eq!(flow.player().name.as_deref(), Some("Diego"));
        assert_eq!(flow.session().map(|s| s.character), Some(Character::Diego));
        assert!(matches!(
            flow.drain_commands().as_slice(),
            [FlowCommand::PersistPlayer(record)] if record.name == "Diego"
        ));
    }

    #[test]
    fn test_banned_name_rejected_locally() {
        let mut flow = guest_flow();
        flow.play();
        flow.select_character(Character::Fonso);
        flow.submit_name("Admin99");
        assert!(flow.drain_commands().is_empty());
        assert!(matches!(
            flow.screen(),
            Screen::Registration { message: Some(msg), .. } if msg == "Invalid player name"
        ));
    }

    #[test]
    fn test_conflict_counts_as_registered() {
        let mut flow = guest_flow();
        flow.play();
        flow.select_character(Character::Rocky);
        flow.submit_name("Rocky");
        flow.on_registration_result("Rocky", Err(LeaderboardError::AlreadyRegistered));
        assert!(flow.player().is_registered);
        assert_eq!(flow.player().name.as_deref(), Some("Rocky"));
        assert!(flow.session().is_some());
    }

    /// Register as "Rocky", back out before the answer, come back as "Diego"
    fn resubmit_after_cancel() -> ScreenFlow {
        let mut flow = guest_flow();
        flow.play();
        flow.select_character(Character::Rocky);
        flow.submit_name("Rocky");
        flow.cancel_registration();
        flow.play();
        flow.select_character(Character::Diego);
        flow.submit_name("Diego");
        flow.drain_commands();
        flow
    }

    #[test]
    fn test_stale_registration_failure_is_ignored() {
        let mut flow = resubmit_after_cancel();
        flow.on_registration_result("Rocky", Err(LeaderboardError::Network("timeout".into())));
        assert!(matches!(
            flow.screen(),
            Screen::Registration { pending: true, message: None, .. }
        ));

        flow.on_registration_result("Diego", Ok(()));
        assert_eq!(flow.player().name.as_deref(), Some("Diego"));
        assert_eq!(flow.session().map(|s| s.character), Some(Character::Diego));
    }

    #[test]
    fn test_accepted_name_survives_later_conflict() {
        let mut flow = resubmit_after_cancel();

        // The server took the first request; the player is still waiting on the second
        flow.on_registration_result("Rocky", Ok(()));
        assert_eq!(flow.player().name.as_deref(), Some("Rocky"));
        assert!(matches!(
            flow.drain_commands().as_slice(),
            [FlowCommand::PersistPlayer(record)] if record.name == "Rocky"
        ));
        assert!(matches!(flow.screen(), Screen::Registration { pending: true, .. }));

        flow.on_registration_result("Diego", Err(LeaderboardError::AlreadyRegistered));
        assert_eq!(flow.player().name.as_deref(), Some("Rocky"));
        assert!(flow.drain_commands().is_empty());
        assert_eq!(flow.session().map(|s| s.character), Some(Character::Diego));
    }

    #[test]
    fn test_late_answer_after_cancel_registers_without_playing() {
        let mut flow = guest_flow();
        flow.play();
        flow.select_character(Character::Mauro);
        flow.submit_name("Mauro");
        flow.cancel_registration();

        flow.on_registration_result("Mauro", Ok(()));
        assert!(flow.player().is_registered);
        assert!(matches!(flow.screen(), Screen::Start));

        // A duplicate answer for the same name changes nothing
        flow.drain_commands();
        flow.on_registration_result("Mauro", Err(LeaderboardError::AlreadyRegistered));
        assert!(flow.drain_commands().is_empty());
        assert!(matches!(flow.screen(), Screen::Start));
    }

    #[test]
    fn test_failed_registration_stays_open() {
        let mut flow = guest_flow();
        flow.play();
        flow.select_character(Character::Rocky);
        flow.submit_name("Rocky");
        flow.on_registration_result("Rocky", Err(LeaderboardError::Network("offline".into())));

        assert!(!flow.player().is_registered);
        assert!(matches!(
            flow.screen(),
            Screen::Registration { pending: false, message: Some(_), .. }
        ));

        // Retry goes out again
        flow.drain_commands();
        flow.submit_name("Rocky");
        assert_eq!(flow.drain_commands().len(), 1);
    }

    #[test]
    fn test_cancel_returns_to_start() {
        let mut flow = guest_flow();
        flow.play();
        flow.select_character(Character::Fonso);
        flow.cancel_registration();
        assert!(matches!(flow.screen(), Screen::Start));
    }

    #[test]
    fn test_game_over_submits_and_persists() {
        let mut flow = registered_flow();
        flow.play();
        flow.select_character(Character::Fonso);
        flow.drain_commands();
        crash(&mut flow);

        let Screen::GameOver(summary) = *flow.screen() else {
            panic!("expected game over");
        };
        assert_eq!(summary.character, Character::Fonso);

        let commands = flow.drain_commands();
        let submits: Vec<_> = commands
            .iter()
            .filter_map(|c| match c {
                FlowCommand::SubmitScore { score, meta, .. } => Some((*score, meta.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(submits.len(), 1);
        assert_eq!(submits[0].0, summary.final_score);
        assert_eq!(submits[0].1.character, Character::Fonso);

        let persisted = commands
            .iter()
            .any(|c| matches!(c, FlowCommand::PersistPlayer(_)));
        assert_eq!(persisted, summary.new_record);

        let events = flow.drain_session_events();
        assert_eq!(events.first(), Some(&SessionEvent::Started));
        assert!(matches!(events.last(), Some(SessionEvent::Crashed { .. })));
    }

    #[test]
    fn test_input_after_game_over_is_ignored() {
        let mut flow = registered_flow();
        flow.play();
        flow.select_character(Character::Fonso);
        crash(&mut flow);
        flow.drain_commands();

        flow.tick(&FLAP);
        assert!(matches!(flow.screen(), Screen::GameOver(_)));
        assert!(flow.drain_commands().is_empty());
    }

    #[test]
    fn test_only_gameplay_accepts_flaps() {
        let mut flow = guest_flow();
        assert!(!flow.is_playing());
        flow.play();
        assert!(!flow.is_playing());
        flow.select_character(Character::Fonso);
        assert!(!flow.is_playing());
        flow.submit_name("Fonso");
        flow.on_registration_result("Fonso", Ok(()));
        assert!(flow.is_playing());

        crash(&mut flow);
        assert!(!flow.is_playing());
        flow.open_ranking();
        assert!(!flow.is_playing());
        flow.back();

        // The next session waits in Ready until it gets a flap of its own
        flow.play_again();
        flow.select_character(Character::Fonso);
        assert!(flow.is_playing());
        for _ in 0..30 {
            flow.tick(&TickInput::default());
        }
        assert_eq!(flow.session().map(|s| s.phase), Some(SessionPhase::Ready));
        flow.tick(&FLAP);
        assert_eq!(flow.session().map(|s| s.phase), Some(SessionPhase::Running));
    }

    #[test]
    fn test_play_again_picks_a_fresh_session() {
        let mut flow = registered_flow();
        flow.play();
        flow.select_character(Character::Fonso);
        let first_seed = flow.session().unwrap().seed;
        crash(&mut flow);

        flow.play_again();
        assert!(matches!(flow.screen(), Screen::CharacterSelect));
        flow.select_character(Character::Diego);
        let session = flow.session().unwrap();
        assert_eq!(session.score, 0);
        assert_ne!(session.seed, first_seed);
    }

    #[test]
    fn test_ranking_returns_to_origin() {
        let mut flow = registered_flow();
        flow.open_ranking();
        assert_eq!(
            flow.drain_commands(),
            vec![FlowCommand::FetchLeaderboard {
                limit: DEFAULT_LEADERBOARD_LIMIT,
                player_id: Some("player_1_abc".into()),
            }]
        );
        flow.back();
        assert!(matches!(flow.screen(), Screen::Start));

        flow.play();
        flow.select_character(Character::Fonso);
        crash(&mut flow);
        let Screen::GameOver(summary) = *flow.screen() else {
            panic!("expected game over");
        };
        flow.open_ranking();
        flow.back();
        assert!(matches!(flow.screen(), Screen::GameOver(s) if *s == summary));
    }

    #[test]
    fn test_failed_fetch_keeps_stale_page() {
        let mut flow = registered_flow();
        flow.open_ranking();
        flow.on_leaderboard(Ok(page(&["a", "b"])));
        assert!(matches!(
            flow.screen(),
            Screen::Ranking { status: RankingStatus::Ready, .. }
        ));

        flow.refresh_ranking();
        assert_eq!(flow.drain_commands().len(), 2);
        flow.on_leaderboard(Err(LeaderboardError::Unavailable("down".into())));
        assert!(matches!(
            flow.screen(),
            Screen::Ranking { status: RankingStatus::Stale(_), .. }
        ));
        assert_eq!(flow.ranking().map(|p| p.entries.len()), Some(2));
    }

    #[test]
    fn test_guest_ranking_has_no_player_id() {
        let mut flow = guest_flow();
        flow.open_ranking();
        assert!(matches!(
            flow.drain_commands().as_slice(),
            [FlowCommand::FetchLeaderboard { player_id: None, .. }]
        ));
    }

    #[test]
    fn test_view_is_tagged_json() {
        let mut flow = registered_flow();
        let json = serde_json::to_value(flow.view()).unwrap();
        assert_eq!(json["screen"], "start");
        assert_eq!(json["playerName"], "Fonso");

        flow.play();
        let json = serde_json::to_value(flow.view()).unwrap();
        assert_eq!(json["screen"], "characterSelect");
        assert_eq!(json["characters"][3]["instrument"], "mic");

        flow.select_character(Character::Rocky);
        let json = serde_json::to_value(flow.view()).unwrap();
        assert_eq!(json["phase"], "ready");

        flow.tick(&FLAP);
        let json = serde_json::to_value(flow.view()).unwrap();
        assert_eq!(json["screen"], "playing");
        assert_eq!(json["phase"], "running");
        assert_eq!(json["obstacles"].as_array().map(Vec::len), Some(1));
    }
}
