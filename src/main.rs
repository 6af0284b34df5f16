//! Flappy Rogue entry point
//!
//! wasm: browser game loop. Native: headless autopilot runner.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use flappy_rogue::audio::WebAudio;
    use flappy_rogue::consts::SIM_DT;
    use flappy_rogue::persistence::LocalStorageStore;
    use flappy_rogue::render::Renderer;
    use flappy_rogue::sim::{GameEvent, GamePhase, UpgradeId, world_name};
    use flappy_rogue::{Game, Settings, Tuning};

    /// Browser-side state around the session
    struct App {
        game: Game,
        renderer: Renderer,
        settings: Settings,
        document: Document,
        last_time: f64,
    }

    impl App {
        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            self.last_time = time;

            let events = self.game.frame(dt);
            for event in &events {
                self.apply_event(event);
            }

            self.renderer.render(self.game.state());
            self.update_hud();
        }

        /// Mirror session events into the DOM
        fn apply_event(&self, event: &GameEvent) {
            match event {
                GameEvent::PhaseChanged(phase) => self.show_screen(*phase),
                GameEvent::UpgradeOffered(offer) => self.fill_offer(offer),
                GameEvent::GameOver(summary) => {
                    self.set_text("final-score", &summary.score.to_string());
                    self.set_text("final-cleared", &summary.obstacles_cleared.to_string());
                    self.set_text("final-pickups", &summary.pickups_collected.to_string());
                    self.set_text("final-world", &world_name(summary.world_tier));
                }
                _ => {}
            }
        }

        fn show_screen(&self, phase: GamePhase) {
            self.set_visible("menu", phase == GamePhase::Menu);
            self.set_visible("hud", matches!(phase, GamePhase::Playing | GamePhase::ChoicePending));
            self.set_visible("upgrade-screen", phase == GamePhase::ChoicePending);
            self.set_visible("game-over", phase == GamePhase::GameOver);

            if phase == GamePhase::GameOver {
                let stats = self.game.stats();
                self.set_text("best-score", &stats.high_score.to_string());
                self.set_text("total-runs", &stats.total_runs.to_string());
                self.set_visible("new-record", self.game.is_new_record());
            }
        }

        fn fill_offer(&self, offer: &[UpgradeId]) {
            for slot in 0..3 {
                let id = format!("upgrade-{}", slot);
                match offer.get(slot) {
                    Some(upgrade) => {
                        self.set_visible(&id, true);
                        self.set_text(&format!("{}-name", id), upgrade.name());
                        self.set_text(&format!("{}-desc", id), upgrade.description());
                        if let Some(el) = self.document.get_element_by_id(&id) {
                            let _ = el.set_attribute("data-rarity", upgrade.rarity().as_str());
                        }
                    }
                    None => self.set_visible(&id, false),
                }
            }
        }

        fn update_hud(&self) {
            let state = self.game.state();
            self.set_text("hud-score", &state.score.to_string());
            self.set_text("hud-health", &format!("{}/{}", state.health, state.max_health));
            self.set_text("hud-world", &world_name(state.world_tier));
            self.set_visible("hud-combo", state.combo > 1);
            if state.combo > 1 {
                self.set_text("hud-combo", &format!("x{}", state.combo));
            }
            self.set_visible("hud-shield", state.effects.shield_charge);
            self.set_visible("hud-revive", state.effects.revive_banked);
        }

        fn toggle_particles(&mut self) {
            self.settings.particles = !self.settings.particles;
            self.renderer.particles = self.settings.effective_particles();
            self.settings.save();
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_visible(&self, id: &str, visible: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let _ = el.class_list().toggle_with_force("hidden", !visible);
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Flappy Rogue starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.class_list().add_1("hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()?;

        let settings = Settings::load();
        let viewport = window.inner_width()?.as_f64().unwrap_or(800.0);
        let platform = settings.platform_for_width(viewport);
        let tuning = Tuning::for_platform(platform);
        log::info!("Platform preset: {}", platform.as_str());

        let mut renderer = Renderer::new(canvas.clone())?;
        renderer.resize(tuning.width, tuning.height, window.device_pixel_ratio());
        renderer.particles = settings.effective_particles();

        let mut audio = WebAudio::new();
        audio.set_volume(settings.effective_volume());

        let seed = js_sys::Date::now() as u64;
        let game = Game::new(
            tuning,
            Box::new(LocalStorageStore::default()),
            Box::new(audio),
            seed,
        );
        log::info!("Game initialized with seed: {}", seed);

        let app = Rc::new(RefCell::new(App {
            game,
            renderer,
            settings,
            document: document.clone(),
            last_time: 0.0,
        }));
        app.borrow().show_screen(GamePhase::Menu);

        setup_input_handlers(&canvas, &window, app.clone());
        setup_buttons(&document, app.clone());

        request_animation_frame(app);
        log::info!("Flappy Rogue running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, window: &web_sys::Window, app: Rc<RefCell<App>>) {
        // Click / tap
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                app.borrow_mut().game.activate();
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut a = app.borrow_mut();
                match event.key().as_str() {
                    " " | "ArrowUp" | "w" | "W" | "Enter" => {
                        event.prevent_default();
                        a.game.activate();
                    }
                    "1" => a.game.choose(0),
                    "2" => a.game.choose(1),
                    "3" => a.game.choose(2),
                    "Escape" => a.game.show_menu(),
                    "a" | "A" => {
                        let enabled = !a.game.autopilot();
                        a.game.set_autopilot(enabled);
                        log::info!("Autopilot: {}", enabled);
                    }
                    "p" | "P" => a.toggle_particles(),
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, app: Rc<RefCell<App>>) {
        for id in ["start-btn", "restart-btn"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                    app.borrow_mut().game.activate();
                });
                let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        if let Some(btn) = document.get_element_by_id("menu-btn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                app.borrow_mut().game.show_menu();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        for slot in 0..3 {
            if let Some(btn) = document.get_element_by_id(&format!("upgrade-{}", slot)) {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                    app.borrow_mut().game.choose(slot);
                });
                let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_game::run() {
        log::error!("Startup failed: {:?}", e);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fs;
    use std::path::PathBuf;

    use anyhow::{Context, Result, anyhow};
    use clap::{Parser, ValueEnum};

    use flappy_rogue::audio::LogAudio;
    use flappy_rogue::persistence::{JsonFileStore, MemoryStore, StatsStore};
    use flappy_rogue::sim::{GamePhase, world_name};
    use flappy_rogue::{Game, Platform, Tuning};

    #[derive(Clone, Copy, Debug, ValueEnum)]
    enum CliPlatform {
        Desktop,
        Mobile,
    }

    impl From<CliPlatform> for Platform {
        fn from(value: CliPlatform) -> Self {
            match value {
                CliPlatform::Desktop => Platform::Desktop,
                CliPlatform::Mobile => Platform::Mobile,
            }
        }
    }

    #[derive(Parser, Debug)]
    #[command(name = "flappy-rogue")]
    #[command(about = "Headless Flappy Rogue runner: plays seeded runs on autopilot")]
    struct Cli {
        /// Seed for the first run; later runs use seed + n
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Tick cap per run (60 ticks per second)
        #[arg(long, default_value_t = 36_000)]
        ticks: u64,
        #[arg(long, value_enum, default_value_t = CliPlatform::Desktop)]
        platform: CliPlatform,
        /// JSON tuning overrides on top of the platform preset
        #[arg(long)]
        tuning: Option<PathBuf>,
        /// Stats file; in-memory when omitted
        #[arg(long)]
        stats: Option<PathBuf>,
        #[arg(long, default_value_t = 1)]
        runs: u32,
    }

    fn load_tuning(cli: &Cli) -> Result<Tuning> {
        let Some(path) = &cli.tuning else {
            return Ok(Tuning::for_platform(cli.platform.into()));
        };
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read tuning file {}", path.display()))?;
        Tuning::from_json(&json)
            .with_context(|| format!("invalid tuning file {}", path.display()))
    }

    pub fn run() -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        let cli = Cli::parse();

        if cli.ticks == 0 {
            return Err(anyhow!("--ticks must be > 0"));
        }

        let tuning = load_tuning(&cli)?;
        let store: Box<dyn StatsStore> = match &cli.stats {
            Some(path) => Box::new(JsonFileStore::new(path)),
            None => Box::new(MemoryStore::default()),
        };

        log::info!("Flappy Rogue (native) starting...");
        let mut game = Game::new(tuning, store, Box::new(LogAudio::default()), cli.seed);
        game.set_autopilot(true);

        for n in 0..cli.runs {
            let seed = cli.seed.wrapping_add(u64::from(n));
            game.start_run(seed);
            for _ in 0..cli.ticks {
                game.step();
                if game.state().phase == GamePhase::GameOver {
                    break;
                }
            }

            let summary = game.state().summary();
            let ended = if game.state().phase == GamePhase::GameOver {
                "died"
            } else {
                "tick cap"
            };
            println!(
                "seed {:>20}  score {:>6}  cleared {:>5}  pickups {:>4}  world {:<14} ticks {:>6} ({})",
                summary.seed,
                summary.score,
                summary.obstacles_cleared,
                summary.pickups_collected,
                world_name(summary.world_tier),
                summary.ticks,
                ended
            );
        }

        let stats = game.stats();
        println!(
            "high score {}  total runs {}",
            stats.high_score, stats.total_runs
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}
