// WebAudio playback of synthesized cues.

use std::collections::HashMap;

use tracing::warn;
use wasm_bindgen::JsValue;
use web_sys::{AudioBuffer, AudioContext};

use crate::lock::{LockObserver, LockState, Notification, SoundCue};
use crate::synth::Tone;

/// Plays `Notification::Sound` cues. The context is created lazily on the
/// first cue, which always arrives from a user gesture.
#[derive(Default)]
pub struct AudioPlayer {
    ctx: Option<AudioContext>,
    buffers: HashMap<SoundCue, AudioBuffer>,
}

impl AudioPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    fn context(&mut self) -> Result<&AudioContext, JsValue> {
        if self.ctx.is_none() {
            let ctx = AudioContext::new()?;
            let _ = ctx.resume();
            self.ctx = Some(ctx);
        }
        self.ctx.as_ref().ok_or_else(|| JsValue::from_str("no audio context"))
    }

    fn buffer(&mut self, cue: SoundCue) -> Result<AudioBuffer, JsValue> {
        if let Some(buf) = self.buffers.get(&cue) {
            return Ok(buf.clone());
        }
        let ctx = self.context()?;
        let rate = ctx.sample_rate();
        let mut samples = Tone::for_cue(cue).render(rate);
        let buf = ctx.create_buffer(1, samples.len().max(1) as u32, rate)?;
        buf.copy_to_channel(&mut samples, 0)?;
        self.buffers.insert(cue, buf.clone());
        Ok(buf)
    }

    pub fn play(&mut self, cue: SoundCue) -> Result<(), JsValue> {
        let buf = self.buffer(cue)?;
        let ctx = self.context()?;
        let source = ctx.create_buffer_source()?;
        source.set_buffer(Some(&buf));
        source.connect_with_audio_node(&ctx.destination())?;
        source.start()?;
        Ok(())
    }
}

impl LockObserver for AudioPlayer {
    fn notify(&mut self, _state: &LockState, note: &Notification) {
        if let Notification::Sound(cue) = note
            && let Err(e) = self.play(*cue)
        {
            warn!(?cue, error = ?e, "sound playback failed");
        }
    }
}
