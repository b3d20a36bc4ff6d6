//! Browser front end for the lock.
//!
//! Builds the lock widget, wires keyboard and pointer listeners through the
//! `input` translators into a single `Session`, and subscribes the DOM
//! renderer and audio player to its notifications. Nothing in here decides
//! game rules; that all lives in `lock`.

mod audio;
mod render;

use std::cell::{Cell, RefCell};

use tracing::{debug, info};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, window};

use crate::config::GameConfig;
use crate::input::{InputSource, KeyboardSource, PointerAction, PointerSource};
use crate::lock::{LockInput, LockMachine, SLOT_COUNT, Session};

pub use audio::AudioPlayer;
pub use render::{DomRenderer, LockDom, UnlockPlan};

const ROOT_ID: &str = "cl-lock";

const LOCK_CSS: &str = "
#cl-lock { position:fixed; left:50%; top:45%; transform:translate(-50%,-50%); padding:28px 32px 20px;
  background:#1d1d1d; border:2px solid #333; border-radius:18px; box-shadow:0 0 32px rgba(0,0,0,0.25);
  font-family:'Fira Code', monospace; color:#eee; text-align:center; z-index:50; user-select:none; }
#cl-lock .cl-shackle { width:96px; height:64px; margin:-72px auto 16px; border:12px solid #888;
  border-bottom:none; border-radius:60px 60px 0 0; cursor:pointer; transition:transform 0.4s; }
#cl-lock.unlocked .cl-shackle { transform:translateY(-22px); border-color:#7CFC9A; }
#cl-lock .cl-dials { display:flex; gap:12px; justify-content:center; }
#cl-lock .cl-slot { width:56px; height:72px; line-height:72px; font-size:40px; background:#111;
  border:2px solid #444; border-radius:10px; cursor:pointer; overflow:hidden; }
#cl-lock .cl-slot.active { border-color:#ffd166; }
#cl-lock .cl-slot.correct { border-color:#7CFC9A; color:#7CFC9A; }
#cl-lock .cl-slot.roll-up .cl-digit { display:inline-block; animation:cl-roll-up 0.15s ease-out; }
#cl-lock .cl-slot.roll-down .cl-digit { display:inline-block; animation:cl-roll-down 0.15s ease-out; }
#cl-lock.shake { animation:cl-shake 0.42s; }
#cl-lock .cl-controls { margin-top:14px; display:flex; gap:8px; justify-content:center; }
#cl-lock .cl-status { margin-top:10px; min-height:1.2em; font-size:14px; color:#ffd166; }
@keyframes cl-roll-up { from { transform:translateY(60%); opacity:0; } to { transform:none; opacity:1; } }
@keyframes cl-roll-down { from { transform:translateY(-60%); opacity:0; } to { transform:none; opacity:1; } }
@keyframes cl-shake { 0%,100% { transform:translate(-50%,-50%); } 20%,60% { transform:translate(calc(-50% - 10px),-50%); }
  40%,80% { transform:translate(calc(-50% + 10px),-50%); } }
";

thread_local! {
    static SESSION: RefCell<Option<Session>> = const { RefCell::new(None) };
    static KEYBOARD_BOUND: Cell<bool> = const { Cell::new(false) };
}

fn with_session<R>(f: impl FnOnce(&mut Session) -> R) -> Option<R> {
    SESSION.with(|cell| cell.borrow_mut().as_mut().map(f))
}

/// Make `session` the one receiving page input, dropping any previous one.
fn install_session(session: Session) {
    SESSION.with(|cell| {
        cell.replace(Some(session));
    });
}

/// Stop routing page input to the lock. Called once the gate has been left;
/// if the session is mid-dispatch the drop is retried on the next tick.
pub fn end_session() {
    let ended = SESSION.with(|cell| match cell.try_borrow_mut() {
        Ok(mut slot) => {
            slot.take();
            true
        }
        Err(_) => false,
    });
    if ended {
        debug!("session ended");
        return;
    }
    let retry = Closure::once_into_js(end_session);
    if let Some(win) = window() {
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(retry.unchecked_ref(), 0);
    }
}

/// Route one key to `session`. Returns true when the lock reacted to it, i.e.
/// the page should not see the key as well.
pub fn handle_key(session: &mut Session, key: &str) -> bool {
    KeyboardSource
        .translate(key, session.state())
        .is_some_and(|input| !session.dispatch(input).is_empty())
}

/// Feed an input straight into the running session (if any).
pub fn dispatch(input: LockInput) {
    with_session(|s| {
        s.dispatch(input);
    });
}

fn dispatch_pointer(action: PointerAction) {
    with_session(|s| {
        if let Some(input) = PointerSource.translate(&action, s.state()) {
            s.dispatch(input);
        }
    });
}

/// Seed used when the page does not supply one.
pub fn default_seed() -> i64 {
    #[cfg(feature = "rng")]
    {
        let mut bytes = [0u8; 8];
        match getrandom::getrandom(&mut bytes) {
            Ok(()) => return i64::from_le_bytes(bytes),
            Err(e) => tracing::warn!(error = %e, "entropy unavailable, seeding from clock"),
        }
    }
    crate::performance_now() as i64
}

/// Build the lock widget and start accepting input.
pub fn start_gate(config: GameConfig) -> Result<(), JsValue> {
    config.validate().map_err(|e| JsValue::from_str(&e.to_string()))?;
    let doc = window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let seed = config.seed.unwrap_or_else(default_seed);
    let machine = LockMachine::new(seed, config.alphabet(), config.difficulty);
    info!(seed, difficulty = ?config.difficulty, "starting lock");

    let dom = build_dom(&doc)?;
    bind_pointer(&dom)?;

    let renderer = DomRenderer::new(
        dom,
        config.symbol_chars(),
        UnlockPlan { next_url: config.next_url.clone(), rain_seed: seed },
    );
    renderer.sync(machine.state());

    let mut session = Session::new(machine);
    session.subscribe(Box::new(renderer));
    if config.sound {
        session.subscribe(Box::new(AudioPlayer::new()));
    }
    render::stop_rain();
    install_session(session);
    // Only one keyboard listener per page, even if the gate is restarted.
    if !KEYBOARD_BOUND.with(|bound| bound.replace(true)) {
        bind_keyboard(&doc)?;
    }
    Ok(())
}

fn build_dom(doc: &Document) -> Result<LockDom, JsValue> {
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;
    if let Some(old) = doc.get_element_by_id(ROOT_ID) {
        debug!("replacing existing lock widget");
        old.remove();
    }
    if doc.get_element_by_id("cl-style").is_none() {
        let style = doc.create_element("style")?;
        style.set_id("cl-style");
        style.set_text_content(Some(LOCK_CSS));
        body.append_child(&style)?;
    }

    let root = element(doc, "div", "cl-lock")?;
    root.set_id(ROOT_ID);

    let shackle = element(doc, "div", "cl-shackle")?;
    shackle.set_attribute("title", "Try the full combination")?;
    root.append_child(&shackle)?;

    let dials = element(doc, "div", "cl-dials")?;
    let mut slots = Vec::with_capacity(SLOT_COUNT);
    let mut digits = Vec::with_capacity(SLOT_COUNT);
    for i in 0..SLOT_COUNT {
        let slot = element(doc, "div", "cl-slot")?;
        slot.set_attribute("data-slot", &i.to_string())?;
        let digit = element(doc, "span", "cl-digit")?;
        slot.append_child(&digit)?;
        dials.append_child(&slot)?;
        slots.push(slot);
        digits.push(digit);
    }
    root.append_child(&dials)?;

    let controls = element(doc, "div", "cl-controls")?;
    for (id, label) in [("cl-up", "▲"), ("cl-down", "▼"), ("cl-confirm", "✓")] {
        let button = element(doc, "button", "cl-button")?;
        button.set_id(id);
        button.set_text_content(Some(label));
        controls.append_child(&button)?;
    }
    root.append_child(&controls)?;

    let status = element(doc, "div", "cl-status")?;
    root.append_child(&status)?;
    body.append_child(&root)?;

    Ok(LockDom { root, shackle, slots, digits, status })
}

fn element(doc: &Document, tag: &str, class: &str) -> Result<Element, JsValue> {
    let el = doc.create_element(tag)?;
    el.set_class_name(class);
    Ok(el)
}

fn on_click(el: &Element, action: PointerAction) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
        dispatch_pointer(action);
    }) as Box<dyn FnMut(_)>);
    el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn bind_pointer(dom: &LockDom) -> Result<(), JsValue> {
    for (i, slot) in dom.slots.iter().enumerate() {
        on_click(slot, PointerAction::SlotClicked(i as i32))?;
    }
    on_click(&dom.shackle, PointerAction::ShackleClicked)?;
    for (id, action) in [
        ("cl-up", PointerAction::UpButton),
        ("cl-down", PointerAction::DownButton),
        ("cl-confirm", PointerAction::ConfirmButton),
    ] {
        let button = dom
            .root
            .query_selector(&format!("#{id}"))?
            .ok_or_else(|| JsValue::from_str("missing lock button"))?;
        on_click(&button, action)?;
    }

    let closure = Closure::wrap(Box::new(move |evt: web_sys::WheelEvent| {
        evt.prevent_default();
        dispatch_pointer(PointerAction::Wheel(evt.delta_y()));
    }) as Box<dyn FnMut(_)>);
    dom.root.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn bind_keyboard(doc: &Document) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
        // Leave browser shortcuts alone.
        if evt.ctrl_key() || evt.meta_key() || evt.alt_key() {
            return;
        }
        let key = evt.key();
        if with_session(|s| handle_key(s, &key)).unwrap_or(false) {
            evt.prevent_default();
        }
    }) as Box<dyn FnMut(_)>);
    doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
