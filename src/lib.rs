//! Combo Lock core crate.
//!
//! A three-slot combination lock that gates entry to the real game. The target
//! code comes from a seeded generator so a `?seed=` link reproduces the same
//! lock. `lock` holds the rules as a pure reducer; `gate` is the browser front
//! end driving it from keyboard and pointer input.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod gate;
pub mod input;
pub mod lock;
pub mod logging;
pub mod rain;
pub mod rng;
pub mod synth;

pub use config::{ConfigError, GameConfig};
pub use lock::{
    Difficulty, Direction, LockInput, LockMachine, LockObserver, LockState, Notification,
    SLOT_COUNT, Session, SoundCue, generate_target_code,
};
pub use rng::SequenceGenerator;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[cfg(feature = "serde_json")]
fn to_js(e: ConfigError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn page_query() -> String {
    web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default()
}

fn launch(mut config: GameConfig) -> Result<(), JsValue> {
    logging::init(&config.log_level);
    config.apply_query(&page_query());
    gate::start_gate(config)
}

// -----------------------------------------------------------------------------
// Entrypoints
// -----------------------------------------------------------------------------

/// Start with default settings; `?seed=` in the page URL is honoured.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    launch(GameConfig::default())
}

/// Start from a JSON config object (see `GameConfig`). The page URL's `seed`
/// still wins over the JSON one.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> Result<(), JsValue> {
    launch(GameConfig::from_json(json).map_err(to_js)?)
}

/// Draw a fresh code. Without a seed the running generator continues.
#[wasm_bindgen]
pub fn reset_game(seed: Option<f64>) {
    gate::dispatch(LockInput::Reset { seed: seed.map(|s| s.trunc() as i64) });
}

/// Milliseconds since page load, 0 outside a browser.
fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
