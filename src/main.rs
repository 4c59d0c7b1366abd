//! Dino Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::convert::FromWasmAbi;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent,
    };

    use dino_runner::audio::AudioManager;
    use dino_runner::platform::input::{self, TouchTracker};
    use dino_runner::platform::{Clock, ManualScheduler};
    use dino_runner::renderer::{Backdrop, RenderState, Vertex};
    use dino_runner::sim::{GamePhase, Intent};
    use dino_runner::{Session, Settings, Tuning};

    /// `performance.now()`, the same timebase as requestAnimationFrame
    struct PerformanceClock {
        performance: Option<web_sys::Performance>,
    }

    impl PerformanceClock {
        fn new() -> Self {
            Self {
                performance: web_sys::window().and_then(|w| w.performance()),
            }
        }
    }

    impl Clock for PerformanceClock {
        fn now_ms(&self) -> f64 {
            self.performance
                .as_ref()
                .map_or_else(js_sys::Date::now, |p| p.now())
        }
    }

    /// Everything the DOM callbacks share
    struct Game {
        session: Session,
        render_state: Option<RenderState>,
        /// Same flag the session's scheduler sets; polled after every callback
        scheduler: ManualScheduler,
        touches: TouchTracker,
        vertices: Vec<Vertex>,
        /// Canvas size in CSS pixels (the simulation's coordinate space)
        view: (f32, f32),
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    type Shared = Rc<RefCell<Game>>;

    impl Game {
        fn track_fps(&mut self, time: f64) {
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % self.frame_times.len();
            let oldest = self.frame_times[self.frame_index];
            if oldest > 0.0 && time > oldest {
                self.fps = (60000.0 / (time - oldest)).round() as u32;
            }
        }

        fn draw(&mut self) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            self.vertices.clear();
            self.session.render(&mut self.vertices);
            match render_state.render(&self.vertices, self.view) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    render_state.reconfigure();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Update HUD and overlay screens in the DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let hud = self.session.hud();

            set_text(&document, "#hud-score .hud-value", &hud.score.to_string());
            set_text(&document, "#hud-stage .hud-value", &hud.stage);
            let show_fps = self.session.settings().show_fps;
            set_hidden(&document, "hud-fps", !show_fps);
            if show_fps {
                set_text(&document, "#hud-fps .hud-value", &self.fps.to_string());
            }

            set_hidden(&document, "start-screen", hud.phase != GamePhase::Start);
            set_hidden(&document, "pause-menu", hud.phase != GamePhase::Paused);
            set_hidden(&document, "game-over", hud.phase != GamePhase::GameOver);
            if hud.phase == GamePhase::GameOver {
                set_text(&document, "#final-score", &hud.score.to_string());
                let reached = self.session.state().stage.number().to_string();
                set_text(&document, "#final-stage", &reached);
            }

            let pause_label = if hud.phase == GamePhase::Paused {
                "▶️"
            } else {
                "⏸️"
            };
            set_text(&document, "#pause-btn", pause_label);
            set_text(&document, "#sound-btn", if hud.muted { "🔇" } else { "🔊" });
        }
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten()
            && el.text_content().as_deref() != Some(text)
        {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
        }
    }

    /// Register a DOM listener for the lifetime of the page
    fn listen<E>(target: &EventTarget, kind: &str, handler: impl FnMut(E) + 'static)
    where
        E: FromWasmAbi + 'static,
    {
        let closure = Closure::<dyn FnMut(E)>::new(handler);
        let _ = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn set_timeout(ms: i32, f: impl FnOnce() + 'static) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(f);
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            ms,
        );
        closure.forget();
    }

    /// Redraw and hand any requested frame to the browser
    fn refresh(game: &Shared) {
        let pending = {
            let mut g = game.borrow_mut();
            g.draw();
            g.update_hud();
            g.scheduler.take_pending()
        };
        if pending {
            request_animation_frame(game.clone());
        }
    }

    fn dispatch(game: &Shared, intent: Intent) {
        game.borrow_mut().session.handle_intent(intent);
        refresh(game);
    }

    fn request_animation_frame(game: Shared) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Shared, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.session.frame(time);
            g.track_fps(time);
        }
        refresh(&game);
    }

    /// CSS and device pixel sizes of the canvas
    fn canvas_sizes(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
    ) -> ((f32, f32), (u32, u32)) {
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width().max(1);
        let client_h = canvas.client_height().max(1);
        (
            (client_w as f32, client_h as f32),
            ((client_w as f64 * dpr) as u32, (client_h as f64 * dpr) as u32),
        )
    }

    /// Tuning overrides from an inline `<script id="tuning" type="application/json">`
    fn load_tuning(document: &Document) -> Tuning {
        document
            .get_element_by_id("tuning")
            .and_then(|el| el.text_content())
            .map(|json| Tuning::from_json_or_default(&json))
            .unwrap_or_default()
    }

    fn js_err(context: &str, e: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&format!("{context}: {e}"))
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Dino Runner starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        set_hidden(&document, "loading", true);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()?;

        let ((view_w, view_h), (width, height)) = canvas_sizes(&window, &canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        let tuning = load_tuning(&document);
        let scheduler = ManualScheduler::new();
        let seed = js_sys::Date::now() as u64;

        let session = Session::new(view_w, view_h, tuning, seed)
            .with_audio(AudioManager::new(&settings))
            .with_settings(settings)
            .with_environment(Backdrop::new(view_w, view_h, Default::default()))
            .with_scheduler(scheduler.clone())
            .with_clock(PerformanceClock::new());

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| js_err("Failed to create surface", e))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| js_err("Failed to get adapter", e))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| js_err("Failed to create device", e))?;

        let game = Rc::new(RefCell::new(Game {
            session,
            render_state: Some(render_state),
            scheduler,
            touches: TouchTracker::new(),
            vertices: Vec::new(),
            view: (view_w, view_h),
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }));

        setup_keyboard(&window, game.clone());
        setup_pointer(&canvas, game.clone());
        setup_buttons(&document, game.clone());
        setup_auto_pause(&window, &document, game.clone());
        setup_resize(&window, &canvas, game.clone());

        set_hidden(&document, "hud", false);
        refresh(&game);

        log::info!("Dino Runner running!");
        Ok(())
    }

    fn setup_keyboard(window: &web_sys::Window, game: Shared) {
        {
            let game = game.clone();
            listen(window, "keydown", move |event: KeyboardEvent| {
                let code = event.code();
                if input::is_game_key(&code) {
                    event.prevent_default();
                }
                let phase = game.borrow().session.phase();
                if let Some(intent) = input::key_down(&code, phase) {
                    dispatch(&game, intent);
                }
            });
        }

        listen(window, "keyup", move |event: KeyboardEvent| {
            if let Some(intent) = input::key_up(&event.code()) {
                dispatch(&game, intent);
            }
        });
    }

    /// Touch position relative to the canvas (CSS pixels)
    fn touch_point(canvas: &HtmlCanvasElement, touch: &web_sys::Touch) -> (f32, f32) {
        let rect = canvas.get_bounding_client_rect();
        (
            (touch.client_x() as f64 - rect.left()) as f32,
            (touch.client_y() as f64 - rect.top()) as f32,
        )
    }

    fn changed_touches(event: &TouchEvent) -> Vec<web_sys::Touch> {
        let list = event.changed_touches();
        (0..list.length()).filter_map(|i| list.get(i)).collect()
    }

    fn setup_pointer(canvas: &HtmlCanvasElement, game: Shared) {
        // Touch start: a tap jumps once the delay passes without a swipe
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            listen(canvas, "touchstart", move |event: TouchEvent| {
                event.prevent_default();
                for touch in changed_touches(&event) {
                    let id = touch.identifier();
                    let (x, y) = touch_point(&canvas_clone, &touch);
                    game.borrow_mut().touches.start(id, x, y);
                    let game = game.clone();
                    set_timeout(input::TAP_DELAY_MS, move || {
                        let intent = game.borrow_mut().touches.tap_due(id);
                        if let Some(intent) = intent {
                            dispatch(&game, intent);
                        }
                    });
                }
            });
        }

        // Touch move: vertical swipes
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            listen(canvas, "touchmove", move |event: TouchEvent| {
                event.prevent_default();
                for touch in changed_touches(&event) {
                    let (x, y) = touch_point(&canvas_clone, &touch);
                    let intent = game.borrow_mut().touches.moved(touch.identifier(), x, y);
                    if let Some(intent) = intent {
                        dispatch(&game, intent);
                    }
                }
            });
        }

        // Touch end / cancel
        for kind in ["touchend", "touchcancel"] {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            listen(canvas, kind, move |event: TouchEvent| {
                event.prevent_default();
                for touch in changed_touches(&event) {
                    let (x, y) = touch_point(&canvas_clone, &touch);
                    let intent = game.borrow_mut().touches.end(touch.identifier(), x, y);
                    if let Some(intent) = intent {
                        dispatch(&game, intent);
                    }
                }
            });
        }

        // Mouse: upper half jumps, lower half ducks briefly
        {
            let canvas_clone = canvas.clone();
            listen(canvas, "mousedown", move |event: MouseEvent| {
                if game.borrow().session.phase() != GamePhase::Playing {
                    return;
                }
                let height = canvas_clone.client_height() as f32;
                let intent = input::click_intent(event.offset_y() as f32, height);
                dispatch(&game, intent);
                if intent == Intent::DuckStart {
                    let game = game.clone();
                    set_timeout(input::MOUSE_DUCK_RELEASE_MS, move || {
                        dispatch(&game, Intent::DuckEnd);
                    });
                }
            });
        }
    }

    fn setup_buttons(document: &Document, game: Shared) {
        let clicks = [
            ("start-btn", Intent::Start),
            ("restart-btn", Intent::Restart),
            ("pause-btn", Intent::PauseToggle),
            ("resume-btn", Intent::PauseToggle),
            ("sound-btn", Intent::MuteToggle),
        ];
        for (id, intent) in clicks {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                listen(&btn, "click", move |_event: MouseEvent| {
                    dispatch(&game, intent);
                });
            }
        }

        // On-screen touch controls
        let holds = [
            ("jump-btn", "touchstart", Intent::Jump),
            ("jump-btn", "mousedown", Intent::Jump),
            ("duck-btn", "touchstart", Intent::DuckStart),
            ("duck-btn", "mousedown", Intent::DuckStart),
            ("duck-btn", "touchend", Intent::DuckEnd),
            ("duck-btn", "mouseup", Intent::DuckEnd),
        ];
        for (id, kind, intent) in holds {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                listen(&btn, kind, move |event: web_sys::Event| {
                    event.prevent_default();
                    dispatch(&game, intent);
                });
            }
        }
    }

    fn setup_auto_pause(window: &web_sys::Window, document: &Document, game: Shared) {
        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            listen(document, "visibilitychange", move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden
                    && game.borrow_mut().session.auto_pause()
                {
                    log::info!("Auto-paused (tab hidden)");
                    refresh(&game);
                }
            });
        }

        // Window blur (click outside)
        listen(window, "blur", move |_event: web_sys::FocusEvent| {
            if game.borrow_mut().session.auto_pause() {
                log::info!("Auto-paused (window blur)");
                refresh(&game);
            }
        });
    }

    fn setup_resize(window: &web_sys::Window, canvas: &HtmlCanvasElement, game: Shared) {
        let window_clone = window.clone();
        let canvas = canvas.clone();
        listen(window, "resize", move |_event: web_sys::UiEvent| {
            let ((view_w, view_h), (width, height)) = canvas_sizes(&window_clone, &canvas);
            canvas.set_width(width);
            canvas.set_height(height);
            {
                let mut g = game.borrow_mut();
                g.view = (view_w, view_h);
                g.session.resize(view_w, view_h);
                if let Some(render_state) = g.render_state.as_mut() {
                    render_state.resize(width, height);
                }
            }
            refresh(&game);
        });
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().await
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Dino Runner (native) starting...");
    log::info!("The game itself runs in the browser - build the wasm target with `trunk serve`");

    headless_run(0x5EED);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play one run at 60 FPS with a naive autopilot and log how far it got
#[cfg(not(target_arch = "wasm32"))]
fn headless_run(seed: u64) {
    use dino_runner::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
    use dino_runner::platform::{Clock, ManualScheduler, VirtualClock};
    use dino_runner::sim::{GamePhase, Intent};
    use dino_runner::{Session, Tuning};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 60 * 5;

    let clock = VirtualClock::new(0.0);
    let scheduler = ManualScheduler::new();
    let mut session = Session::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, Tuning::default(), seed)
        .with_clock(clock.clone())
        .with_scheduler(scheduler.clone());

    session.handle_intent(Intent::Start);
    let mut frames = 0;
    while scheduler.take_pending() && frames < MAX_FRAMES {
        clock.advance(FRAME_MS);
        session.frame(clock.now_ms());
        frames += 1;

        let state = session.state();
        let reach = state.actor.x + state.actor.width + state.game_speed * 12.0;
        let threat = state
            .obstacles
            .iter()
            .find(|o| o.x + o.width > state.actor.x && o.x < reach);
        let intent = match threat {
            Some(o) if o.flying => Intent::DuckStart,
            Some(_) => Intent::Jump,
            None if state.actor.is_ducking() => Intent::DuckEnd,
            None => continue,
        };
        session.handle_intent(intent);
    }

    let hud = session.hud();
    let outcome = if hud.phase == GamePhase::GameOver {
        "crashed"
    } else {
        "survived"
    };
    log::info!(
        "Headless run {} after {} frames: score {}, stage {}",
        outcome,
        frames,
        hud.score,
        hud.stage
    );
}
