//! Proposal Quest entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Event, EventTarget, KeyboardEvent, PointerEvent};

    use proposal_quest::Tuning;
    use proposal_quest::audio::AudioManager;
    use proposal_quest::consts::NOMINAL_DT;
    use proposal_quest::sim::{FrameInput, GameEvent, Orchestrator, StepOutcome};
    use proposal_quest::view::View;

    /// Everything the page keeps alive between frames
    struct Game {
        orch: Orchestrator,
        view: View,
        audio: AudioManager,
        input: FrameInput,
        last_time: f64,
    }

    impl Game {
        fn new(view: View, seed: u64) -> Self {
            let viewport = view.viewport();
            Self {
                orch: Orchestrator::new(Tuning::load(), viewport, seed),
                view,
                audio: AudioManager::new(),
                input: FrameInput::default(),
                last_time: 0.0,
            }
        }

        /// Simulate one frame and route its events to the presentation layer
        fn update(&mut self, dt: f32, dpr: f64) {
            let viewport = self.view.fit(dpr);
            self.orch.resize(viewport);

            let report = self.orch.tick(dt, &self.input);
            self.input.end_frame();

            for event in &report.events {
                match event {
                    GameEvent::Message(text) => self.view.show_toast(text),
                    GameEvent::Cue(cue) => self.audio.play(*cue),
                    GameEvent::Points(_) => {}
                }
            }

            match report.outcome {
                StepOutcome::Continue => {}
                StepOutcome::SceneComplete(next) => self.view.show_scene_clear(next),
                StepOutcome::TerminalReached => self.view.show_overlay("proposal", true),
            }

            self.view.tick_toast(dt);
        }

        fn render(&self) {
            self.view.draw(&self.orch);
            self.view.update_hud(&self.orch);
        }

        fn start(&mut self) {
            self.audio.resume();
            self.orch.start(self.view.viewport());
            self.input = FrameInput::default();
            self.view.show_overlay("intro", false);
        }

        fn advance(&mut self) {
            self.input = FrameInput::default();
            if self.orch.advance(self.view.viewport()).is_some() {
                self.view.show_overlay("clear", false);
            }
        }

        fn reset(&mut self) {
            self.orch.reset(self.view.viewport());
            self.input = FrameInput::default();
            self.view.show_overlay("clear", false);
            self.view.show_overlay("proposal", false);
            self.view.show_overlay("intro", true);
        }
    }

    /// Register `handler` for `name` on `target` for the lifetime of the page
    fn listen(target: &EventTarget, name: &str, handler: impl FnMut(Event) + 'static) {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        if target
            .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
            .is_err()
        {
            log::warn!("Failed to listen for {}", name);
        }
        closure.forget();
    }

    fn on_click(document: &Document, id: &str, handler: impl FnMut(Event) + 'static) {
        match document.get_element_by_id(id) {
            Some(el) => listen(&el, "click", handler),
            None => log::warn!("No #{} button on the page", id),
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Proposal Quest starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };
        let Some(view) = View::new(document.clone()) else {
            log::error!("No #canvas with a 2d context");
            return;
        };

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(view, seed)));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&window, &document, game.clone());
        setup_buttons(&document, game.clone());

        request_animation_frame(game);
        log::info!("Proposal Quest running!");
    }

    fn setup_input_handlers(window: &web_sys::Window, document: &Document, game: Rc<RefCell<Game>>) {
        let canvas: EventTarget = game.borrow().view.canvas().clone().into();

        {
            let game = game.clone();
            listen(&canvas, "pointerdown", move |event| {
                let Some(event) = event.dyn_ref::<PointerEvent>() else { return };
                event.prevent_default();
                let mut g = game.borrow_mut();
                let at = g.view.to_local(event.client_x() as f64, event.client_y() as f64);
                g.input.press_pointer(at);
                g.audio.resume();
            });
        }

        {
            let game = game.clone();
            listen(&canvas, "pointermove", move |event| {
                let Some(event) = event.dyn_ref::<PointerEvent>() else { return };
                let mut g = game.borrow_mut();
                let at = g.view.to_local(event.client_x() as f64, event.client_y() as f64);
                g.input.move_pointer(at);
            });
        }

        for name in ["pointerup", "pointercancel"] {
            let game = game.clone();
            listen(window, name, move |_event| {
                game.borrow_mut().input.release_pointer();
            });
        }

        {
            let game = game.clone();
            listen(window, "keydown", move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else { return };
                let mut g = game.borrow_mut();
                let code = event.code();
                if g.input.keys.set_from_code(&code, true) {
                    event.prevent_default();
                    return;
                }
                match code.as_str() {
                    "Space" => {
                        event.prevent_default();
                        if !event.repeat() {
                            g.input.tap = true;
                        }
                    }
                    "KeyR" => g.reset(),
                    "KeyM" => {
                        let muted = g.audio.toggle_muted();
                        log::info!("Muted: {}", muted);
                    }
                    _ => {}
                }
            });
        }

        {
            let game = game.clone();
            listen(window, "keyup", move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else { return };
                game.borrow_mut().input.keys.set_from_code(&event.code(), false);
            });
        }

        // Coming back to the tab starts from a nominal frame, not a stale timestamp
        {
            let document_clone = document.clone();
            listen(document, "visibilitychange", move |_event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Visible {
                    game.borrow_mut().last_time = 0.0;
                }
            });
        }
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            on_click(document, "start-btn", move |_event| game.borrow_mut().start());
        }
        {
            let game = game.clone();
            on_click(document, "next-btn", move |_event| game.borrow_mut().advance());
        }
        on_click(document, "restart-btn", move |_event| game.borrow_mut().reset());
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time; the orchestrator clamps it
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                NOMINAL_DT
            };
            g.last_time = time;

            let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
            g.update(dt, dpr);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Headless autopilot run through every scene
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use proposal_quest::Tuning;
    use proposal_quest::consts::NOMINAL_DT;
    use proposal_quest::sim::{Orchestrator, StepOutcome, Viewport, autopilot};

    env_logger::init();
    log::info!("Proposal Quest (native) starting...");
    log::info!("Native mode is a headless demo - run with `trunk serve` for the web version");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => Tuning::from_json_or_default(&json),
            Err(e) => {
                log::warn!("Could not read {}: {}, using defaults", path, e);
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };

    let viewport = Viewport::new(800.0, 600.0);
    let seed = 0x5eed;
    let mut orch = Orchestrator::new(tuning, viewport, seed);
    orch.start(viewport);

    // Ten simulated minutes is far more than any scene needs
    let max_frames = (600.0 / NOMINAL_DT) as u32;
    let mut elapsed = 0.0f32;
    for _ in 0..max_frames {
        let input = autopilot::drive(&orch);
        let report = orch.tick(NOMINAL_DT, &input);
        elapsed += NOMINAL_DT;

        for text in report.messages() {
            log::debug!("[{:7.2}s] {}", elapsed, text);
        }

        match report.outcome {
            StepOutcome::Continue => {}
            StepOutcome::SceneComplete(next) => {
                println!("{:7.2}s  cleared, score {:4}  -> {}", elapsed, orch.score(), next.title());
                orch.advance(viewport);
            }
            StepOutcome::TerminalReached => {
                println!("{:7.2}s  proposal reached, final score {}", elapsed, orch.score());
                return;
            }
        }
    }

    println!("Autopilot gave up at {} ({:.0}s)", orch.scene().title(), elapsed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
