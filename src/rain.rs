//! Falling-character animation played once the lock opens.
//!
//! Pure model: the canvas renderer in `gate::render` only reads `drops()`.

use crate::rng::SequenceGenerator;

/// Total length of the celebration.
pub const RAIN_DURATION_MS: f64 = 2_400.0;

/// Fall speed range in pixels per millisecond.
const MIN_SPEED: f64 = 0.25;
const MAX_SPEED: f64 = 0.75;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Raindrop {
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub glyph: char,
}

#[derive(Clone, Debug)]
pub struct Rain {
    width: f64,
    height: f64,
    glyph_px: f64,
    symbols: Vec<char>,
    drops: Vec<Raindrop>,
    rng: SequenceGenerator,
    elapsed_ms: f64,
    duration_ms: f64,
}

impl Rain {
    /// One drop per `glyph_px` wide column, starting above the top edge.
    pub fn new(width: f64, height: f64, glyph_px: f64, symbols: &[char], seed: i64) -> Self {
        let glyph_px = glyph_px.max(1.0);
        let symbols = if symbols.is_empty() { vec!['0'] } else { symbols.to_vec() };
        let columns = (width.max(0.0) / glyph_px).floor() as usize;
        let mut rain = Self {
            width,
            height,
            glyph_px,
            symbols,
            drops: Vec::with_capacity(columns),
            rng: SequenceGenerator::new(seed),
            elapsed_ms: 0.0,
            duration_ms: RAIN_DURATION_MS,
        };
        for col in 0..columns {
            let x = col as f64 * glyph_px + glyph_px / 2.0;
            let y = -rain.rng.draw() * height.max(glyph_px);
            let drop = rain.spawn(x, y);
            rain.drops.push(drop);
        }
        rain
    }

    pub fn with_duration(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    fn spawn(&mut self, x: f64, y: f64) -> Raindrop {
        let speed = MIN_SPEED + self.rng.draw() * (MAX_SPEED - MIN_SPEED);
        let glyph = self.symbols[self.rng.draw_int(self.symbols.len())];
        Raindrop { x, y, speed, glyph }
    }

    /// Advance by `dt_ms`. Drops leaving the bottom restart one glyph above
    /// the top with a fresh speed and symbol.
    pub fn step(&mut self, dt_ms: f64) {
        let dt = dt_ms.max(0.0);
        self.elapsed_ms += dt;
        for i in 0..self.drops.len() {
            let mut drop = self.drops[i];
            drop.y += drop.speed * dt;
            if drop.y - self.glyph_px > self.height {
                drop = self.spawn(drop.x, -self.glyph_px);
            }
            self.drops[i] = drop;
        }
    }

    pub fn drops(&self) -> &[Raindrop] {
        &self.drops
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn glyph_px(&self) -> f64 {
        self.glyph_px
    }

    /// 0.0 at start, 1.0 once finished.
    pub fn progress(&self) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn finished(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }
}
