// Inputs consumed by the lock reducer and notifications it emits.

/// Direction of a digit change. Wraps around the symbol alphabet both ways.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Signed step (+1 / -1).
    pub fn step(self) -> i64 {
        match self {
            Direction::Up => 1,
            Direction::Down => -1,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

/// Logical action produced by any input source (keyboard, pointer, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LockInput {
    /// Out-of-range indices are tolerated and ignored by the reducer.
    SelectSlot(i32),
    ChangeDigit(Direction),
    Confirm,
    CheckFullCombination,
    /// `None` keeps drawing from the running session generator.
    Reset { seed: Option<i64> },
}

/// Abstract sound effect requested from the audio collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SoundCue {
    /// Neutral click for slot moves and digit rolls.
    Tick,
    /// Digit landed on the target digit (only emitted with hints enabled).
    Match,
    /// Slot confirmed correct.
    Correct,
    /// Slot confirmed wrong or full combination rejected.
    Wrong,
    Unlock,
}

/// Observable state change emitted by the reducer, in the order it happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Notification {
    SlotChanged(usize),
    /// `direction` is carried explicitly: with a two-symbol alphabet `old`
    /// and `new` alone cannot tell a roll up from a roll down.
    DigitChanged { slot: usize, old: usize, new: usize, direction: Direction },
    SlotEvaluated { slot: usize, correct: bool },
    CombinationRejected,
    Unlocked,
    /// A fresh target code was drawn and all player state cleared.
    Reset,
    Sound(SoundCue),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_steps() {
        assert_eq!(Direction::Up.step(), 1);
        assert_eq!(Direction::Down.step(), -1);
        assert_eq!(Direction::Up.reversed(), Direction::Down);
        assert_eq!(Direction::Down.reversed().step(), 1);
    }
}
