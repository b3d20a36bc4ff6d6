//! Combination lock reducer.
//!
//! `LockMachine` is a pure state machine: it applies one `LockInput` at a time
//! and returns the `Notification`s describing what changed. It never touches
//! the DOM or audio; the `gate` module (or any other host) renders and sonifies
//! the notifications. `Session` adds observer fan-out on top.
//!
//! Reducer policy:
//! - changing a digit clears that slot's correctness flag,
//! - a correct confirm moves the active slot forward (stopping at the last slot),
//! - once unlocked every input except `Reset` is ignored.

mod event;

pub use event::{Direction, LockInput, Notification, SoundCue};

use tracing::{debug, info};

use crate::rng::SequenceGenerator;

/// Number of slots in the combination.
pub const SLOT_COUNT: usize = 3;

/// Default symbol alphabet size (digits 0-9).
pub const DEFAULT_ALPHABET: usize = 10;

/// Whether digit changes may hint at the target through sound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Difficulty {
    /// Landing on the target digit plays `SoundCue::Match`.
    Easy,
    /// Every digit change plays the neutral tick.
    #[default]
    Normal,
}

impl Difficulty {
    pub fn hints_enabled(self) -> bool {
        matches!(self, Difficulty::Easy)
    }
}

/// Draw a target code: `SLOT_COUNT` sequential draws in slot order.
pub fn generate_target_code(seed: i64, alphabet: usize) -> [usize; SLOT_COUNT] {
    draw_code(&mut SequenceGenerator::new(seed), alphabet)
}

fn draw_code(rng: &mut SequenceGenerator, alphabet: usize) -> [usize; SLOT_COUNT] {
    let mut code = [0; SLOT_COUNT];
    for digit in code.iter_mut() {
        *digit = rng.draw_int(alphabet);
    }
    code
}

/// Snapshot of everything an observer may render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockState {
    digits: [usize; SLOT_COUNT],
    active_slot: usize,
    target: [usize; SLOT_COUNT],
    slot_correct: [bool; SLOT_COUNT],
    unlocked: bool,
}

impl LockState {
    fn locked(target: [usize; SLOT_COUNT]) -> Self {
        Self {
            digits: [0; SLOT_COUNT],
            active_slot: 0,
            target,
            slot_correct: [false; SLOT_COUNT],
            unlocked: false,
        }
    }

    pub fn digits(&self) -> [usize; SLOT_COUNT] {
        self.digits
    }

    pub fn digit(&self, slot: usize) -> Option<usize> {
        self.digits.get(slot).copied()
    }

    pub fn active_slot(&self) -> usize {
        self.active_slot
    }

    pub fn target_code(&self) -> [usize; SLOT_COUNT] {
        self.target
    }

    pub fn slot_correct(&self) -> [bool; SLOT_COUNT] {
        self.slot_correct
    }

    pub fn is_slot_correct(&self, slot: usize) -> bool {
        self.slot_correct.get(slot).copied().unwrap_or(false)
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    fn all_correct(&self) -> bool {
        self.slot_correct.iter().all(|&c| c)
    }
}

/// The lock reducer.
#[derive(Clone, Debug)]
pub struct LockMachine {
    state: LockState,
    rng: SequenceGenerator,
    alphabet: usize,
    difficulty: Difficulty,
}

impl LockMachine {
    /// Build a locked machine whose target code is drawn from `seed`.
    /// An alphabet of zero is treated as one symbol.
    pub fn new(seed: i64, alphabet: usize, difficulty: Difficulty) -> Self {
        let alphabet = alphabet.max(1);
        let mut rng = SequenceGenerator::new(seed);
        let target = draw_code(&mut rng, alphabet);
        debug!(seed, alphabet, "lock initialized");
        Self { state: LockState::locked(target), rng, alphabet, difficulty }
    }

    pub fn state(&self) -> &LockState {
        &self.state
    }

    pub fn alphabet(&self) -> usize {
        self.alphabet
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Apply one input and return the resulting notifications.
    pub fn apply(&mut self, input: LockInput) -> Vec<Notification> {
        match input {
            LockInput::SelectSlot(index) => self.select_slot(index),
            LockInput::ChangeDigit(direction) => self.change_digit(direction),
            LockInput::Confirm => self.confirm_slot(),
            LockInput::CheckFullCombination => self.check_full_combination(),
            LockInput::Reset { seed } => self.reset(seed),
        }
    }

    /// Draw a fresh code and clear all player state. Allowed while unlocked.
    pub fn reset(&mut self, seed: Option<i64>) -> Vec<Notification> {
        if let Some(seed) = seed {
            self.rng = SequenceGenerator::new(seed);
        }
        let target = draw_code(&mut self.rng, self.alphabet);
        self.state = LockState::locked(target);
        info!(reseeded = seed.is_some(), "lock reset");
        vec![Notification::Reset]
    }

    pub fn select_slot(&mut self, index: i32) -> Vec<Notification> {
        if self.state.unlocked {
            return Vec::new();
        }
        let Some(slot) = usize::try_from(index).ok().filter(|&s| s < SLOT_COUNT) else {
            debug!(index, "ignoring out-of-range slot");
            return Vec::new();
        };
        self.state.active_slot = slot;
        debug!(slot, "slot selected");
        vec![Notification::SlotChanged(slot), Notification::Sound(SoundCue::Tick)]
    }

    pub fn change_digit(&mut self, direction: Direction) -> Vec<Notification> {
        if self.state.unlocked {
            return Vec::new();
        }
        let slot = self.state.active_slot;
        let old = self.state.digits[slot];
        let n = self.alphabet as i64;
        let new = (old as i64 + direction.step()).rem_euclid(n) as usize;
        self.state.digits[slot] = new;

        let mut notes = vec![Notification::DigitChanged { slot, old, new, direction }];
        if std::mem::replace(&mut self.state.slot_correct[slot], false) {
            notes.push(Notification::SlotEvaluated { slot, correct: false });
        }
        let cue = if self.difficulty.hints_enabled() && new == self.state.target[slot] {
            SoundCue::Match
        } else {
            SoundCue::Tick
        };
        notes.push(Notification::Sound(cue));
        debug!(slot, old, new, "digit changed");
        notes
    }

    pub fn confirm_slot(&mut self) -> Vec<Notification> {
        if self.state.unlocked {
            return Vec::new();
        }
        let slot = self.state.active_slot;
        let correct = self.state.digits[slot] == self.state.target[slot];
        self.state.slot_correct[slot] = correct;
        debug!(slot, correct, "slot confirmed");

        let mut notes = vec![Notification::SlotEvaluated { slot, correct }];
        if !correct {
            notes.push(Notification::Sound(SoundCue::Wrong));
            return notes;
        }
        if self.state.all_correct() {
            self.finish_unlock(&mut notes);
            return notes;
        }
        let next = (slot + 1).min(SLOT_COUNT - 1);
        if next != slot {
            self.state.active_slot = next;
            notes.push(Notification::SlotChanged(next));
        }
        notes.push(Notification::Sound(SoundCue::Correct));
        notes
    }

    /// Compare every slot at once. No state changes on a mismatch.
    pub fn check_full_combination(&mut self) -> Vec<Notification> {
        if self.state.unlocked {
            return Vec::new();
        }
        if self.state.digits != self.state.target {
            debug!("full combination rejected");
            return vec![
                Notification::CombinationRejected,
                Notification::Sound(SoundCue::Wrong),
            ];
        }
        let mut notes: Vec<Notification> = (0..SLOT_COUNT)
            .map(|slot| Notification::SlotEvaluated { slot, correct: true })
            .collect();
        self.state.slot_correct = [true; SLOT_COUNT];
        self.finish_unlock(&mut notes);
        notes
    }

    fn finish_unlock(&mut self, notes: &mut Vec<Notification>) {
        debug_assert!(self.state.all_correct());
        self.state.unlocked = true;
        info!("lock opened");
        notes.push(Notification::Unlocked);
        notes.push(Notification::Sound(SoundCue::Unlock));
    }
}

/// Receives every notification a `Session` produces.
pub trait LockObserver {
    fn notify(&mut self, state: &LockState, note: &Notification);
}

/// A reducer wired to any number of observers.
pub struct Session {
    machine: LockMachine,
    observers: Vec<Box<dyn LockObserver>>,
}

impl Session {
    pub fn new(machine: LockMachine) -> Self {
        Self { machine, observers: Vec::new() }
    }

    pub fn subscribe(&mut self, observer: Box<dyn LockObserver>) {
        self.observers.push(observer);
    }

    pub fn machine(&self) -> &LockMachine {
        &self.machine
    }

    pub fn state(&self) -> &LockState {
        self.machine.state()
    }

    /// Apply `input`, forward the notifications to all observers in order and
    /// return them.
    pub fn dispatch(&mut self, input: LockInput) -> Vec<Notification> {
        let notes = self.machine.apply(input);
        let state = self.machine.state();
        for note in &notes {
            for observer in self.observers.iter_mut() {
                observer.notify(state, note);
            }
        }
        notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    fn machine(seed: i64) -> LockMachine {
        LockMachine::new(seed, DEFAULT_ALPHABET, Difficulty::Normal)
    }

    /// Roll the active slot up to `digit` from zero.
    fn dial(m: &mut LockMachine, digit: usize) {
        for _ in 0..digit {
            m.change_digit(Direction::Up);
        }
    }

    #[test]
    fn seed_one_fixture() {
        assert_eq!(generate_target_code(1, 10), [2, 5, 3]);
        assert_eq!(machine(1).state().target_code(), [2, 5, 3]);
    }

    #[test]
    fn reset_without_seed_continues_generator() {
        let mut m = machine(1);
        assert_eq!(m.reset(None), vec![Notification::Reset]);
        assert_eq!(m.state().target_code(), [9, 7, 1]);
    }

    #[test]
    fn reset_with_same_seed_restores_code() {
        let mut m = machine(77);
        let original = m.state().target_code();
        m.change_digit(Direction::Up);
        m.select_slot(2);
        m.reset(Some(77));
        assert_eq!(m.state().target_code(), original);
        assert_eq!(m.state().digits(), [0, 0, 0]);
        assert_eq!(m.state().active_slot(), 0);
        assert!(!m.state().is_unlocked());
    }

    #[test]
    fn down_from_zero_wraps() {
        let mut m = machine(1);
        let notes = m.change_digit(Direction::Down);
        assert_eq!(m.state().digits(), [9, 0, 0]);
        assert_eq!(m.state().active_slot(), 0);
        assert_eq!(
            notes[0],
            Notification::DigitChanged { slot: 0, old: 0, new: 9, direction: Direction::Down }
        );
    }

    #[test]
    fn two_symbol_roll_keeps_direction() {
        let mut m = LockMachine::new(1, 2, Difficulty::Normal);
        let up = m.change_digit(Direction::Up);
        let down = m.change_digit(Direction::Down);
        assert_eq!(up[0], Notification::DigitChanged { slot: 0, old: 0, new: 1, direction: Direction::Up });
        assert_eq!(
            down[0],
            Notification::DigitChanged { slot: 0, old: 1, new: 0, direction: Direction::Down }
        );
    }

    #[test]
    fn select_slot_ignores_out_of_range() {
        let mut m = machine(1);
        assert_eq!(
            m.select_slot(2),
            vec![Notification::SlotChanged(2), Notification::Sound(SoundCue::Tick)]
        );
        assert!(m.select_slot(3).is_empty());
        assert!(m.select_slot(-1).is_empty());
        assert_eq!(m.state().active_slot(), 2);
    }

    #[test]
    fn wrong_confirm_does_not_advance() {
        let mut m = machine(1);
        let notes = m.confirm_slot();
        assert_eq!(
            notes,
            vec![
                Notification::SlotEvaluated { slot: 0, correct: false },
                Notification::Sound(SoundCue::Wrong),
            ]
        );
        assert_eq!(m.state().active_slot(), 0);
    }

    #[test]
    fn correct_confirms_advance_and_unlock_once() {
        let mut m = machine(1);
        let mut unlocks = 0;
        for (slot, &digit) in [2usize, 5, 3].iter().enumerate() {
            assert_eq!(m.state().active_slot(), slot);
            dial(&mut m, digit);
            let notes = m.confirm_slot();
            unlocks += notes.iter().filter(|n| **n == Notification::Unlocked).count();
        }
        assert!(m.state().is_unlocked());
        assert_eq!(unlocks, 1);
        assert_eq!(m.state().active_slot(), 2);
    }

    #[test]
    fn changing_a_confirmed_digit_clears_its_flag() {
        let mut m = machine(1);
        dial(&mut m, 2);
        m.confirm_slot();
        assert!(m.state().is_slot_correct(0));
        m.select_slot(0);
        let notes = m.change_digit(Direction::Up);
        assert!(notes.contains(&Notification::SlotEvaluated { slot: 0, correct: false }));
        assert!(!m.state().is_slot_correct(0));
    }

    #[test]
    fn unlocked_is_absorbing() {
        let mut m = machine(1);
        m.select_slot(0);
        dial(&mut m, 2);
        m.select_slot(1);
        dial(&mut m, 5);
        m.select_slot(2);
        dial(&mut m, 3);
        let notes = m.check_full_combination();
        assert_eq!(notes.last(), Some(&Notification::Sound(SoundCue::Unlock)));
        assert_eq!(m.state().slot_correct(), [true; SLOT_COUNT]);

        let frozen = m.state().clone();
        assert!(m.select_slot(0).is_empty());
        assert!(m.change_digit(Direction::Up).is_empty());
        assert!(m.confirm_slot().is_empty());
        assert!(m.check_full_combination().is_empty());
        assert_eq!(m.state(), &frozen);
    }

    #[test]
    fn full_check_mismatch_leaves_state() {
        let mut m = machine(1);
        let before = m.state().clone();
        assert_eq!(
            m.check_full_combination(),
            vec![Notification::CombinationRejected, Notification::Sound(SoundCue::Wrong)]
        );
        assert_eq!(m.state(), &before);
    }

    #[test]
    fn hint_sound_only_on_easy() {
        let mut easy = LockMachine::new(1, 10, Difficulty::Easy);
        let mut normal = machine(1);
        easy.change_digit(Direction::Up);
        normal.change_digit(Direction::Up);
        let easy_notes = easy.change_digit(Direction::Up);
        let normal_notes = normal.change_digit(Direction::Up);
        assert_eq!(easy_notes.last(), Some(&Notification::Sound(SoundCue::Match)));
        assert_eq!(normal_notes.last(), Some(&Notification::Sound(SoundCue::Tick)));
    }

    #[test]
    fn zero_alphabet_is_clamped() {
        let mut m = LockMachine::new(3, 0, Difficulty::Normal);
        assert_eq!(m.alphabet(), 1);
        assert_eq!(m.state().target_code(), [0, 0, 0]);
        m.change_digit(Direction::Up);
        assert_eq!(m.state().digit(0), Some(0));
    }

    struct Recorder(Rc<RefCell<Vec<Notification>>>);

    impl LockObserver for Recorder {
        fn notify(&mut self, _state: &LockState, note: &Notification) {
            self.0.borrow_mut().push(*note);
        }
    }

    #[test]
    fn session_fans_out_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut session = Session::new(machine(1));
        session.subscribe(Box::new(Recorder(Rc::clone(&seen))));
        session.subscribe(Box::new(Recorder(Rc::clone(&seen))));
        let notes = session.dispatch(LockInput::SelectSlot(1));
        assert_eq!(notes.len(), 2);
        assert_eq!(
            *seen.borrow(),
            vec![
                Notification::SlotChanged(1),
                Notification::SlotChanged(1),
                Notification::Sound(SoundCue::Tick),
                Notification::Sound(SoundCue::Tick),
            ]
        );
    }
}
