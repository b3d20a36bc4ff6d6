//! Additive-synthesis sample generator for the lock's sound effects.
//!
//! Each tone is a handful of sine partials under a single exponential decay.
//! Output is mono `f32` PCM, ready to copy into a WebAudio buffer.

use std::f32::consts::TAU;

use crate::lock::SoundCue;

/// Peak magnitude after normalisation.
pub const PEAK: f32 = 0.9;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Partial {
    /// Frequency multiple of the tone's base.
    pub ratio: f32,
    pub gain: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub base_hz: f32,
    pub partials: &'static [Partial],
    /// Envelope is `exp(-decay * t)`.
    pub decay: f32,
    /// Seconds.
    pub duration: f32,
}

const fn p(ratio: f32, gain: f32) -> Partial {
    Partial { ratio, gain }
}

const TICK: Tone = Tone {
    base_hz: 1800.0,
    partials: &[p(1.0, 1.0), p(2.7, 0.4), p(5.1, 0.2)],
    decay: 90.0,
    duration: 0.04,
};

const MATCH: Tone = Tone {
    base_hz: 1320.0,
    partials: &[p(1.0, 1.0), p(2.0, 0.5), p(3.0, 0.25)],
    decay: 40.0,
    duration: 0.08,
};

const CORRECT: Tone = Tone {
    base_hz: 880.0,
    partials: &[p(1.0, 1.0), p(1.5, 0.6), p(2.0, 0.3)],
    decay: 12.0,
    duration: 0.3,
};

const WRONG: Tone = Tone {
    base_hz: 150.0,
    partials: &[p(1.0, 1.0), p(1.06, 0.8), p(2.0, 0.3)],
    decay: 8.0,
    duration: 0.35,
};

const UNLOCK: Tone = Tone {
    base_hz: 523.25,
    partials: &[p(1.0, 1.0), p(1.26, 0.7), p(1.5, 0.6), p(2.0, 0.4), p(4.0, 0.1)],
    decay: 2.5,
    duration: 1.2,
};

impl Tone {
    pub fn for_cue(cue: SoundCue) -> &'static Tone {
        match cue {
            SoundCue::Tick => &TICK,
            SoundCue::Match => &MATCH,
            SoundCue::Correct => &CORRECT,
            SoundCue::Wrong => &WRONG,
            SoundCue::Unlock => &UNLOCK,
        }
    }

    pub fn sample_count(&self, sample_rate: f32) -> usize {
        if !(sample_rate > 0.0 && self.duration > 0.0) {
            return 0;
        }
        (self.duration * sample_rate).round() as usize
    }

    /// Render the tone at `sample_rate` Hz.
    pub fn render(&self, sample_rate: f32) -> Vec<f32> {
        let len = self.sample_count(sample_rate);
        let mut out: Vec<f32> = (0..len)
            .map(|i| {
                let t = i as f32 / sample_rate;
                let env = (-self.decay * t).exp();
                let sum: f32 = self
                    .partials
                    .iter()
                    .map(|part| part.gain * (TAU * self.base_hz * part.ratio * t).sin())
                    .sum();
                sum * env
            })
            .collect();

        let peak = out.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
        if peak > 0.0 {
            let scale = PEAK / peak;
            out.iter_mut().for_each(|s| *s *= scale);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: f32 = 44_100.0;

    #[test]
    fn length_matches_duration() {
        let tone = Tone::for_cue(SoundCue::Correct);
        assert_eq!(tone.render(RATE).len(), (0.3 * RATE).round() as usize);
    }

    #[test]
    fn normalised_peak() {
        for cue in [SoundCue::Tick, SoundCue::Match, SoundCue::Correct, SoundCue::Wrong, SoundCue::Unlock] {
            let samples = Tone::for_cue(cue).render(RATE);
            let peak = samples.iter().fold(0.0_f32, |m, s| m.max(s.abs()));
            assert!((peak - PEAK).abs() < 1e-4, "{cue:?} peak {peak}");
            assert_eq!(samples[0], 0.0);
        }
    }

    #[test]
    fn envelope_decays() {
        let samples = Tone::for_cue(SoundCue::Unlock).render(RATE);
        let quarter = samples.len() / 4;
        let energy = |s: &[f32]| s.iter().map(|x| x * x).sum::<f32>();
        assert!(energy(&samples[..quarter]) > energy(&samples[samples.len() - quarter..]));
    }

    #[test]
    fn degenerate_rate_yields_nothing() {
        let tone = Tone::for_cue(SoundCue::Tick);
        assert!(tone.render(0.0).is_empty());
        assert!(tone.render(-8000.0).is_empty());
        assert!(tone.render(f32::NAN).is_empty());
    }
}
