// Browser smoke tests. Run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use combo_lock::{GameConfig, LockInput, gate};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn doc() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

#[wasm_bindgen_test]
fn builds_widget_and_rolls_digit() {
    let cfg = GameConfig { seed: Some(1), sound: false, ..GameConfig::default() };
    gate::start_gate(cfg).unwrap();

    let slots = doc().query_selector_all("#cl-lock .cl-slot").unwrap();
    assert_eq!(slots.length(), 3);
    let first = doc().query_selector("#cl-lock .cl-digit").unwrap().unwrap();
    assert_eq!(first.text_content().as_deref(), Some("0"));

    gate::dispatch(LockInput::ChangeDigit(combo_lock::Direction::Down));
    assert_eq!(first.text_content().as_deref(), Some("9"));
}

#[wasm_bindgen_test]
fn restart_replaces_widget() {
    let cfg = GameConfig { seed: Some(2), sound: false, ..GameConfig::default() };
    gate::start_gate(cfg.clone()).unwrap();
    gate::start_gate(cfg).unwrap();
    assert_eq!(doc().query_selector_all("#cl-lock").unwrap().length(), 1);
}

#[wasm_bindgen_test]
fn reset_during_rain_keeps_lock() {
    let cfg = GameConfig {
        seed: Some(3),
        symbols: "0".to_string(),
        sound: false,
        ..GameConfig::default()
    };
    gate::start_gate(cfg).unwrap();

    gate::dispatch(LockInput::CheckFullCombination);
    assert!(doc().get_element_by_id("cl-rain").is_some());

    gate::dispatch(LockInput::Reset { seed: None });
    assert!(doc().get_element_by_id("cl-rain").is_none());
    let root = doc().get_element_by_id("cl-lock").unwrap();
    assert!(!root.class_list().contains("unlocked"));

    // A second unlock runs exactly one rain.
    gate::dispatch(LockInput::CheckFullCombination);
    assert_eq!(doc().query_selector_all("#cl-rain").unwrap().length(), 1);
    assert!(root.class_list().contains("unlocked"));
}
