//! Input sources.
//!
//! Every physical input mechanism implements `InputSource` and turns its own
//! raw events into the same small set of `LockInput`s. The reducer never sees
//! key names or pointer coordinates.

use crate::lock::{Direction, LockInput, LockState};

pub trait InputSource {
    type Raw: ?Sized;

    /// Translate one raw event. `None` means the event is not for the lock.
    fn translate(&mut self, raw: &Self::Raw, state: &LockState) -> Option<LockInput>;
}

/// Keyboard mapping, fed with `KeyboardEvent.key` values.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyboardSource;

impl InputSource for KeyboardSource {
    type Raw = str;

    fn translate(&mut self, key: &str, state: &LockState) -> Option<LockInput> {
        let active = state.active_slot() as i32;
        let input = match key {
            "1" => LockInput::SelectSlot(0),
            "2" => LockInput::SelectSlot(1),
            "3" => LockInput::SelectSlot(2),
            // Off-the-end neighbours are left for the reducer to ignore.
            "ArrowLeft" => LockInput::SelectSlot(active - 1),
            "ArrowRight" => LockInput::SelectSlot(active + 1),
            "ArrowUp" | "w" | "W" => LockInput::ChangeDigit(Direction::Up),
            "ArrowDown" | "s" | "S" => LockInput::ChangeDigit(Direction::Down),
            "Enter" | " " => LockInput::Confirm,
            "c" | "C" => LockInput::CheckFullCombination,
            "Escape" => LockInput::Reset { seed: None },
            _ => return None,
        };
        Some(input)
    }
}

/// Pointer interactions with the lock widget.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerAction {
    SlotClicked(i32),
    /// `WheelEvent.deltaY`; scrolling up (negative) rolls the digit up.
    Wheel(f64),
    UpButton,
    DownButton,
    ConfirmButton,
    ShackleClicked,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PointerSource;

impl InputSource for PointerSource {
    type Raw = PointerAction;

    fn translate(&mut self, raw: &PointerAction, _state: &LockState) -> Option<LockInput> {
        match *raw {
            PointerAction::SlotClicked(slot) => Some(LockInput::SelectSlot(slot)),
            PointerAction::Wheel(dy) if dy < 0.0 => Some(LockInput::ChangeDigit(Direction::Up)),
            PointerAction::Wheel(dy) if dy > 0.0 => Some(LockInput::ChangeDigit(Direction::Down)),
            PointerAction::Wheel(_) => None,
            PointerAction::UpButton => Some(LockInput::ChangeDigit(Direction::Up)),
            PointerAction::DownButton => Some(LockInput::ChangeDigit(Direction::Down)),
            PointerAction::ConfirmButton => Some(LockInput::Confirm),
            PointerAction::ShackleClicked => Some(LockInput::CheckFullCombination),
        }
    }
}
