//! Buggy Run entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::KeyboardEvent;

    use buggy_run::Tuning;
    use buggy_run::consts::*;
    use buggy_run::sim::{GameState, TickInput, tick};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
    }

    impl Game {
        fn new(tuning: Tuning) -> Self {
            Self {
                state: GameState::new(tuning),
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(MAX_FRAME_DT);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                tick(&mut self.state, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.start = false;
            }
        }

        /// Update HUD text in the DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let session = &self.state.session;

            if let Some(el) = document.get_element_by_id("hud-time") {
                el.set_text_content(Some(&format!("{:.2}s", session.display_time())));
            }
            if let Some(el) = document.get_element_by_id("hud-speed") {
                el.set_text_content(Some(&format!("{} km/h", session.display_speed_kmh())));
            }
            if let Some(el) = document.get_element_by_id("hud-status") {
                el.set_text_content(Some(session.state.as_str()));
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("logger init failed: {e}").into());
        }

        log::info!("Buggy Run starting...");

        let game = Rc::new(RefCell::new(Game::new(Tuning::load())));
        setup_input_handlers(game.clone());
        request_animation_frame(game);

        log::info!("Buggy Run ready - press Enter to start");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            log::error!("No window; input disabled");
            return;
        };

        // Key down: held controls, Enter (re)starts a run
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let code = event.code();
                if code == "Enter" {
                    g.input.start = true;
                } else if g.input.controls.set_key(&code, true) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().input.controls.set_key(&event.code(), false);
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
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

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use buggy_run::Tuning;
    use buggy_run::consts::SIM_DT;
    use buggy_run::sim::{ControlState, GameState, RaceState, TickInput, tick};

    env_logger::init();
    log::info!("Buggy Run (native) starting...");
    log::info!("Native mode runs a headless scripted drive - build for wasm32 to play");

    let mut state = GameState::new(Tuning::load());
    tick(&mut state, &TickInput { start: true, ..Default::default() }, SIM_DT);

    // Full throttle with a short left flick half way down the course
    let mut ticks = 0u32;
    while state.session.state == RaceState::Running && ticks < 60 * 30 {
        let left = (180..200).contains(&ticks);
        let right = (200..220).contains(&ticks);
        let input = TickInput {
            controls: ControlState { forward: true, left, right, ..Default::default() },
            start: false,
        };
        tick(&mut state, &input, SIM_DT);
        ticks += 1;

        if ticks % 60 == 0 {
            if let (Some(body), Some(pose)) = (state.body.as_ref(), state.camera_pose) {
                log::info!(
                    "t={:.1}s speed={} km/h car={:.1?} camera={:.1?}",
                    state.session.display_time(),
                    state.session.display_speed_kmh(),
                    body.position,
                    pose.position,
                );
            }
        }
    }

    println!(
        "{} after {:.2}s",
        state.session.state.as_str(),
        state.session.display_time()
    );
}
