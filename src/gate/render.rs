// DOM rendering of lock notifications plus the unlock rain canvas.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use tracing::{debug, warn};
use wasm_bindgen::{JsCast, prelude::*};
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, window};

use crate::lock::{Direction, LockObserver, LockState, Notification, SLOT_COUNT};
use crate::rain::Rain;

const SHAKE_MS: i32 = 420;
const RAIN_GLYPH_PX: f64 = 22.0;

/// Handles to the lock widget built by `gate::build_dom`.
pub struct LockDom {
    pub root: Element,
    pub shackle: Element,
    pub slots: Vec<Element>,
    pub digits: Vec<Element>,
    pub status: Element,
}

/// What happens after the rain finishes.
#[derive(Clone, Debug)]
pub struct UnlockPlan {
    pub next_url: Option<String>,
    pub rain_seed: i64,
}

/// Applies notifications to the widget by toggling CSS classes and text.
pub struct DomRenderer {
    dom: LockDom,
    symbols: Vec<char>,
    plan: UnlockPlan,
}

impl DomRenderer {
    pub fn new(dom: LockDom, symbols: Vec<char>, plan: UnlockPlan) -> Self {
        Self { dom, symbols, plan }
    }

    fn symbol(&self, digit: usize) -> String {
        self.symbols.get(digit).copied().unwrap_or('?').to_string()
    }

    /// Redraw everything from a state snapshot.
    pub fn sync(&self, state: &LockState) {
        for slot in 0..SLOT_COUNT {
            if let Some(d) = state.digit(slot) {
                self.dom.digits[slot].set_text_content(Some(&self.symbol(d)));
            }
            let classes = self.dom.slots[slot].class_list();
            classes.toggle_with_force("active", slot == state.active_slot()).ok();
            classes.toggle_with_force("correct", state.is_slot_correct(slot)).ok();
            classes.remove_2("roll-up", "roll-down").ok();
        }
        let root = self.dom.root.class_list();
        root.toggle_with_force("unlocked", state.is_unlocked()).ok();
        root.remove_1("shake").ok();
        self.dom.status.set_text_content(Some(""));
    }

    fn roll(&self, slot: usize, new: usize, direction: Direction) {
        self.dom.digits[slot].set_text_content(Some(&self.symbol(new)));
        let classes = self.dom.slots[slot].class_list();
        classes.remove_2("roll-up", "roll-down").ok();
        // Force a reflow so the animation restarts on repeated rolls.
        let _ = self.dom.slots[slot].client_width();
        classes
            .add_1(match direction {
                Direction::Up => "roll-up",
                Direction::Down => "roll-down",
            })
            .ok();
    }

    fn shake(&self) {
        self.dom.root.class_list().add_1("shake").ok();
        self.dom.status.set_text_content(Some("Wrong combination"));
        let root = self.dom.root.clone();
        let clear = Closure::once_into_js(move || {
            root.class_list().remove_1("shake").ok();
        });
        if let Some(win) = window() {
            let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
                clear.unchecked_ref(),
                SHAKE_MS,
            );
        }
    }

    fn unlock(&self) {
        self.dom.root.class_list().add_1("unlocked").ok();
        self.dom.status.set_text_content(Some("Unlocked"));
        if let Err(e) = start_rain(&self.dom.root, &self.symbols, &self.plan) {
            warn!(error = ?e, "rain animation failed to start");
            super::end_session();
            finish_gate(&self.dom.root, &self.plan);
        }
    }
}

impl LockObserver for DomRenderer {
    fn notify(&mut self, state: &LockState, note: &Notification) {
        match *note {
            Notification::SlotChanged(active) => {
                for (i, el) in self.dom.slots.iter().enumerate() {
                    el.class_list().toggle_with_force("active", i == active).ok();
                }
            }
            Notification::DigitChanged { slot, new, direction, .. } => {
                self.roll(slot, new, direction)
            }
            Notification::SlotEvaluated { slot, correct } => {
                self.dom.slots[slot].class_list().toggle_with_force("correct", correct).ok();
            }
            Notification::CombinationRejected => self.shake(),
            Notification::Unlocked => self.unlock(),
            Notification::Reset => {
                stop_rain();
                self.sync(state);
            }
            Notification::Sound(_) => {}
        }
    }
}

// --- Rain -------------------------------------------------------------------

struct RainState {
    rain: Rain,
    ctx: CanvasRenderingContext2d,
    canvas: HtmlCanvasElement,
    root: Element,
    plan: UnlockPlan,
    last_ts: Option<f64>,
    /// Frame loops of any other generation exit on their next frame.
    generation: u64,
}

thread_local! {
    static RAIN_STATE: RefCell<Option<RainState>> = const { RefCell::new(None) };
    static RAIN_GENERATION: Cell<u64> = const { Cell::new(0) };
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn document() -> Result<Document, JsValue> {
    window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn start_rain(root: &Element, symbols: &[char], plan: &UnlockPlan) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = document()?;
    let width = win.inner_width()?.as_f64().unwrap_or(640.0);
    let height = win.inner_height()?.as_f64().unwrap_or(480.0);

    let canvas: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
    canvas.set_id("cl-rain");
    canvas.set_width(width as u32);
    canvas.set_height(height as u32);
    canvas.set_attribute(
        "style",
        "position:fixed; inset:0; pointer-events:none; z-index:60;",
    )?;
    doc.body()
        .ok_or_else(|| JsValue::from_str("no body"))?
        .append_child(&canvas)?;

    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;
    ctx.set_font(&format!("{RAIN_GLYPH_PX}px 'Fira Code', monospace"));
    ctx.set_text_align("center");

    let rain = Rain::new(width, height, RAIN_GLYPH_PX, symbols, plan.rain_seed);
    stop_rain();
    let generation = RAIN_GENERATION.with(|g| {
        g.set(g.get() + 1);
        g.get()
    });
    debug!(columns = rain.drops().len(), generation, "rain started");
    RAIN_STATE.with(|cell| {
        cell.replace(Some(RainState {
            rain,
            ctx,
            canvas,
            root: root.clone(),
            plan: plan.clone(),
            last_ts: None,
            generation,
        }))
    });
    start_rain_loop(generation);
    Ok(())
}

/// Cancel a running rain without leaving the gate. The frame loop notices the
/// missing state and stops.
pub fn stop_rain() {
    if let Some(state) = RAIN_STATE.with(|cell| cell.borrow_mut().take()) {
        state.canvas.remove();
        debug!(generation = state.generation, "rain cancelled");
    }
}

fn start_rain_loop(generation: u64) {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = Rc::clone(&f);
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        let running = RAIN_STATE.with(|cell| {
            let mut slot = cell.borrow_mut();
            let Some(state) = slot.as_mut().filter(|s| s.generation == generation) else {
                return false;
            };
            if rain_tick(state, ts) {
                return true;
            }
            if let Some(done) = slot.take() {
                done.canvas.remove();
                drop(slot);
                super::end_session();
                finish_gate(&done.root, &done.plan);
            }
            false
        });
        if running {
            request_frame(&f);
        }
    }) as Box<dyn FnMut(f64)>));
    request_frame(&g);
}

fn request_frame(f: &FrameCallback) {
    if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

/// Advance and draw one frame. Returns false once the rain is over.
fn rain_tick(state: &mut RainState, ts: f64) -> bool {
    let dt = state.last_ts.map_or(0.0, |prev| ts - prev);
    state.last_ts = Some(ts);
    state.rain.step(dt);

    let ctx = &state.ctx;
    let (w, h) = (state.rain.width(), state.rain.height());
    ctx.clear_rect(0.0, 0.0, w, h);
    // Fade out over the last fifth of the animation.
    let alpha = ((1.0 - state.rain.progress()) * 5.0).clamp(0.0, 1.0);
    ctx.set_global_alpha(alpha);
    ctx.set_fill_style_str("#7CFC9A");
    let mut buf = [0u8; 4];
    for drop in state.rain.drops() {
        ctx.fill_text(drop.glyph.encode_utf8(&mut buf), drop.x, drop.y).ok();
    }
    ctx.set_global_alpha(1.0);
    !state.rain.finished()
}

/// Leave the lock: follow `next_url` or hand the page back to the host.
fn finish_gate(root: &Element, plan: &UnlockPlan) {
    if let Some(url) = &plan.next_url
        && let Some(win) = window()
    {
        if let Err(e) = win.location().set_href(url) {
            warn!(error = ?e, %url, "navigation failed");
        }
        return;
    }
    root.remove();
    if let Ok(doc) = document()
        && let Some(body) = doc.body()
    {
        body.class_list().add_1("combo-lock-unlocked").ok();
    }
    debug!("gate finished");
}
