//! Flappy Band entry point
//!
//! Handles platform-specific initialization and runs the game loop.
//! On the web the page owns rendering and modals; the game hands it a JSON
//! view every time the state changes.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{KeyboardEvent, MouseEvent, TouchEvent};

    use flappy_band::flow::FlowCommand;
    use flappy_band::leaderboard::http::HttpLeaderboard;
    use flappy_band::sim::{SessionEvent, TickInput};
    use flappy_band::{Character, FrameClock, Player, Screen, ScreenFlow, Tuning};

    // Page hooks. Both are optional; missing hooks are skipped.
    #[wasm_bindgen(inline_js = "
        export function present_view(json) {
            if (typeof window.flappyPresent === 'function') {
                window.flappyPresent(JSON.parse(json));
            }
        }

        export function play_sound(name) {
            if (typeof window.flappySound === 'function') {
                window.flappySound(name);
            }
        }
    ")]
    extern "C" {
        fn present_view(json: &str);
        fn play_sound(name: &str);
    }

    /// Game instance holding all state
    struct Game {
        flow: ScreenFlow,
        clock: FrameClock,
        input: TickInput,
        api: HttpLeaderboard,
        /// Last JSON handed to the page
        last_view: String,
    }

    thread_local! {
        static GAME: RefCell<Option<Rc<RefCell<Game>>>> = const { RefCell::new(None) };
    }

    impl Game {
        fn new(seed: u64) -> Self {
            Self {
                flow: ScreenFlow::new(Player::load(), Tuning::load(), seed),
                clock: FrameClock::default(),
                input: TickInput::default(),
                api: HttpLeaderboard::default(),
                last_view: String::new(),
            }
        }

        fn update(&mut self, time: f64) {
            // A flap latched on a menu must not start the next session
            if !self.flow.is_playing() {
                self.input.jump = false;
            }
            let ticks = self.clock.advance(time);
            for _ in 0..ticks {
                self.flow.tick(&self.input);
                self.input.jump = false;
            }
            for event in self.flow.drain_session_events() {
                let sound = match event {
                    SessionEvent::Flapped => "flap",
                    SessionEvent::ObstaclePassed { .. } => "score",
                    SessionEvent::Collected { .. } => "collect",
                    SessionEvent::Crashed { .. } => "hit",
                    SessionEvent::Started => continue,
                };
                play_sound(sound);
            }
        }

        fn present(&mut self) {
            match serde_json::to_string(&self.flow.view()) {
                Ok(json) if json != self.last_view => {
                    present_view(&json);
                    self.last_view = json;
                }
                Ok(_) => {}
                Err(e) => log::error!("Failed to serialize view: {}", e),
            }
        }

        /// Space / Enter / click: whatever the current screen's main action is
        fn primary_action(&mut self) {
            if self.flow.is_playing() {
                self.input.jump = true;
            } else if matches!(self.flow.screen(), Screen::Start) {
                self.flow.play();
            } else {
                // No-op outside game over
                self.flow.play_again();
            }
        }
    }

    /// Run `f` against the live game, then execute whatever it queued
    fn with_game(f: impl FnOnce(&mut Game)) {
        let Some(game) = GAME.with(|g| g.borrow().clone()) else {
            log::warn!("Game not started yet");
            return;
        };
        f(&mut game.borrow_mut());
        dispatch(&game);
    }

    /// Execute queued flow commands. Network calls run in the background and
    /// never block the frame loop.
    fn dispatch(game: &Rc<RefCell<Game>>) {
        let (commands, api) = {
            let mut g = game.borrow_mut();
            (g.flow.drain_commands(), g.api.clone())
        };

        for command in commands {
            match command {
                FlowCommand::PersistPlayer(record) => Player::save(&record),
                FlowCommand::RegisterPlayer { player_id, name } => {
                    let game = game.clone();
                    let api = api.clone();
                    wasm_bindgen_futures::spawn_local(async move {
                        let result = api.register_player(&player_id, &name).await;
                        game.borrow_mut()
                            .flow
                            .on_registration_result(&name, result);
                        dispatch(&game);
                    });
                }
                FlowCommand::SubmitScore {
                    player_id,
                    score,
                    meta,
                } => {
                    let api = api.clone();
                    wasm_bindgen_futures::spawn_local(async move {
                        match api.submit_score(&player_id, score, &meta).await {
                            Ok(outcome) => log::info!(
                                "Score submitted: rank {:?} of {}, best {}",
                                outcome.rank,
                                outcome.total_players,
                                outcome.best_score
                            ),
                            Err(e) => log::warn!("Score submission failed: {}", e),
                        }
                    });
                }
                FlowCommand::FetchLeaderboard { limit, player_id } => {
                    let game = game.clone();
                    let api = api.clone();
                    wasm_bindgen_futures::spawn_local(async move {
                        let result = api.fetch_leaderboard(limit, player_id.as_deref()).await;
                        game.borrow_mut().flow.on_leaderboard(result);
                    });
                }
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Flappy Band starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window");
            return;
        };
        if let Some(loading) = window
            .document()
            .and_then(|d| d.get_element_by_id("loading"))
        {
            let _ = loading.set_attribute("class", "hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        GAME.with(|g| *g.borrow_mut() = Some(game.clone()));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone());
        setup_visibility_handler(game.clone());

        request_animation_frame(game);
        log::info!("Flappy Band running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                // Typing in the name modal
                if matches!(game.borrow().flow.screen(), Screen::Registration { .. }) {
                    if event.key() == "Escape" {
                        game.borrow_mut().flow.cancel_registration();
                    }
                    return;
                }
                {
                    let mut g = game.borrow_mut();
                    match event.key().as_str() {
                        " " | "ArrowUp" | "Enter" => {
                            event.prevent_default();
                            g.primary_action();
                        }
                        "Escape" => g.flow.back(),
                        "m" | "M" => g.flow.main_menu(),
                        "r" | "R" => {
                            if matches!(g.flow.screen(), Screen::Ranking { .. }) {
                                g.flow.refresh_ranking();
                            } else {
                                g.flow.open_ranking();
                            }
                        }
                        "1" | "2" | "3" | "4" => {
                            let index = event.key().parse::<usize>().unwrap_or(1) - 1;
                            if let Some(character) = Character::from_index(index) {
                                g.flow.select_character(character);
                            }
                        }
                        "i" | "I" => {
                            g.input.idle_mode = !g.input.idle_mode;
                            log::info!("Idle mode: {}", g.input.idle_mode);
                        }
                        _ => {}
                    }
                }
                dispatch(&game);
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse: flap only, menus are page buttons
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.flow.is_playing() {
                    g.input.jump = true;
                }
            });
            let _ = window
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let mut g = game.borrow_mut();
                if g.flow.is_playing() {
                    event.prevent_default();
                    g.input.jump = true;
                }
            });
            let _ = window
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Hidden tabs get no frames; forget the gap instead of catching up
    fn setup_visibility_handler(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                game.borrow_mut().clock.reset();
                log::info!("Tab hidden, frame clock reset");
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.present();
        }
        // Game over queues the score submission
        dispatch(&game);

        request_animation_frame(game);
    }

    // Page modal and button hooks

    #[wasm_bindgen]
    pub fn submit_player_name(name: &str) {
        with_game(|g| g.flow.submit_name(name));
    }

    #[wasm_bindgen]
    pub fn cancel_registration() {
        with_game(|g| g.flow.cancel_registration());
    }

    #[wasm_bindgen]
    pub fn select_character(key: &str) {
        with_game(|g| g.flow.select_character(Character::from_key(key)));
    }

    #[wasm_bindgen]
    pub fn start_game() {
        with_game(|g| g.flow.play());
    }

    #[wasm_bindgen]
    pub fn flap() {
        with_game(|g| {
            if g.flow.is_playing() {
                g.input.jump = true;
            }
        });
    }

    #[wasm_bindgen]
    pub fn play_again() {
        with_game(|g| g.flow.play_again());
    }

    #[wasm_bindgen]
    pub fn main_menu() {
        with_game(|g| g.flow.main_menu());
    }

    #[wasm_bindgen]
    pub fn show_ranking() {
        with_game(|g| g.flow.open_ranking());
    }

    #[wasm_bindgen]
    pub fn refresh_ranking() {
        with_game(|g| g.flow.refresh_ranking());
    }

    #[wasm_bindgen]
    pub fn go_back() {
        with_game(|g| g.flow.back());
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    //! Native runner: the autopilot plays one game against an in-memory leaderboard

    use anyhow::{Context, Result, bail};

    use flappy_band::consts::TICK_RATE;
    use flappy_band::flow::FlowCommand;
    use flappy_band::leaderboard::{LeaderboardClient, MemoryLeaderboard};
    use flappy_band::sim::TickInput;
    use flappy_band::{Character, Player, Screen, ScreenFlow, Tuning};

    /// Give up after ten minutes of simulated flight
    const MAX_TICKS: u64 = 10 * 60 * TICK_RATE as u64;

    fn execute(flow: &mut ScreenFlow, board: &mut MemoryLeaderboard) {
        for command in flow.drain_commands() {
            match command {
                FlowCommand::PersistPlayer(record) => Player::save(&record),
                FlowCommand::RegisterPlayer { player_id, name } => {
                    let result = board.register_player(&player_id, &name);
                    flow.on_registration_result(&name, result);
                }
                FlowCommand::SubmitScore {
                    player_id,
                    score,
                    meta,
                } => match board.submit_score(&player_id, score, &meta) {
                    Ok(outcome) => log::info!(
                        "Submitted {}: rank {:?}, new record {}",
                        score,
                        outcome.rank,
                        outcome.new_record
                    ),
                    Err(e) => log::warn!("Score submission failed: {}", e),
                },
                FlowCommand::FetchLeaderboard { limit, player_id } => {
                    let result = board.fetch_leaderboard(limit, player_id.as_deref());
                    flow.on_leaderboard(result);
                }
            }
        }
    }

    pub fn run(seed: u64) -> Result<()> {
        let mut board = MemoryLeaderboard::new();
        let mut flow = ScreenFlow::new(Player::load(), Tuning::load(), seed);

        let character = Character::from_index((seed % 4) as usize).unwrap_or_default();
        flow.play();
        flow.select_character(character);
        flow.submit_name("Autopilot");
        execute(&mut flow, &mut board);

        if let Screen::Registration { message, .. } = flow.screen() {
            bail!("registration failed: {}", message.as_deref().unwrap_or("unknown"));
        }

        let input = TickInput {
            jump: false,
            idle_mode: true,
        };
        let mut ticks = 0;
        while flow.is_playing() {
            if ticks == MAX_TICKS {
                let score = flow.session().map(|s| s.score).unwrap_or_default();
                println!("Autopilot still flying after {} ticks, score {}", ticks, score);
                return Ok(());
            }
            flow.tick(&input);
            ticks += 1;
        }
        execute(&mut flow, &mut board);

        let Screen::GameOver(summary) = *flow.screen() else {
            bail!("session ended on an unexpected screen");
        };
        println!(
            "{} ({}) scored {} in {} ticks",
            character.name(),
            character.instrument().as_str(),
            summary.final_score,
            ticks
        );

        flow.open_ranking();
        execute(&mut flow, &mut board);
        let page = flow.ranking().context("leaderboard unavailable")?;
        println!("\nRanking ({} players)", page.total_players);
        for entry in &page.entries {
            println!("{:>3}. {:<15} {:>5}", entry.rank, entry.name, entry.score);
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use anyhow::Context;

    env_logger::init();
    log::info!("Flappy Band (native) starting...");
    log::info!("Browser build runs with `trunk serve`; running a headless autopilot game");

    let seed = match std::env::args().nth(1) {
        Some(arg) => arg
            .parse::<u64>()
            .with_context(|| format!("invalid seed {:?}", arg))?,
        None => flappy_band::now_ms() as u64,
    };
    log::info!("Seed: {}", seed);

    headless::run(seed)
}
