//! Session configuration: seed, symbol alphabet, difficulty and presentation
//! switches. Everything has a default so an empty page works out of the box.

use thiserror::Error;
use tracing::warn;
use url::form_urlencoded;

use crate::lock::Difficulty;

/// Digits shown on the dials unless the page supplies its own symbols.
pub const DEFAULT_SYMBOLS: &str = "0123456789";

/// Errors raised while assembling a `GameConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `seed` query parameter was present but not an integer.
    #[error("invalid seed: {raw:?}")]
    InvalidSeed {
        /// The raw parameter value.
        raw: String,
    },

    /// The symbol alphabet has no characters.
    #[error("symbol alphabet is empty")]
    EmptyAlphabet,

    /// JSON configuration could not be parsed.
    #[cfg(feature = "serde_json")]
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    pub seed: Option<i64>,
    pub symbols: String,
    pub difficulty: Difficulty,
    /// tracing `EnvFilter` directive.
    pub log_level: String,
    /// Page to open once the unlock animation has played.
    pub next_url: Option<String>,
    pub sound: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            symbols: DEFAULT_SYMBOLS.to_string(),
            difficulty: Difficulty::Normal,
            log_level: "info".to_string(),
            next_url: None,
            sound: true,
        }
    }
}

impl GameConfig {
    /// Parse a JSON object; missing fields fall back to defaults.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: GameConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::EmptyAlphabet);
        }
        Ok(())
    }

    /// Dial symbols as individual chars.
    pub fn symbol_chars(&self) -> Vec<char> {
        self.symbols.chars().collect()
    }

    /// Alphabet size N.
    pub fn alphabet(&self) -> usize {
        self.symbols.chars().count()
    }

    /// Overlay the `seed` query parameter (if any) onto this config. A
    /// malformed seed is logged and ignored so the lock still starts.
    pub fn apply_query(&mut self, query: &str) {
        match seed_from_query(query) {
            Ok(Some(seed)) => self.seed = Some(seed),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "ignoring seed from page url"),
        }
    }
}

/// Extract `seed` from a URL query string such as `?seed=42&mode=x`.
/// Values are percent/`+` decoded first, so `?seed=%2D5` is `-5`.
pub fn seed_from_query(query: &str) -> Result<Option<i64>, ConfigError> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let raw = form_urlencoded::parse(query.as_bytes())
        .find_map(|(key, value)| (key == "seed").then_some(value));
    match raw {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidSeed { raw: value.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_present() {
        assert_eq!(seed_from_query("?seed=42").unwrap(), Some(42));
        assert_eq!(seed_from_query("a=1&seed=-7&b=2").unwrap(), Some(-7));
    }

    #[test]
    fn seed_absent() {
        assert_eq!(seed_from_query("").unwrap(), None);
        assert_eq!(seed_from_query("?seeds=3&x").unwrap(), None);
    }

    #[test]
    fn seed_malformed() {
        let err = seed_from_query("?seed=abc").unwrap_err();
        assert_eq!(err.to_string(), "invalid seed: \"abc\"");
        assert!(matches!(seed_from_query("?seed").unwrap_err(), ConfigError::InvalidSeed { .. }));
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = GameConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.alphabet(), 10);
        assert_eq!(cfg.difficulty, Difficulty::Normal);
    }

    #[test]
    fn empty_alphabet_rejected() {
        let cfg = GameConfig { symbols: String::new(), ..GameConfig::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::EmptyAlphabet)));
    }

    #[test]
    fn alphabet_counts_chars_not_bytes() {
        let cfg = GameConfig { symbols: "一二三四".to_string(), ..GameConfig::default() };
        assert_eq!(cfg.alphabet(), 4);
        assert_eq!(cfg.symbol_chars()[3], '四');
    }

    #[test]
    fn query_overrides_seed() {
        let mut cfg = GameConfig { seed: Some(1), ..GameConfig::default() };
        cfg.apply_query("?seed=9");
        assert_eq!(cfg.seed, Some(9));
        cfg.apply_query("?other=1");
        assert_eq!(cfg.seed, Some(9));
    }

    #[test]
    fn malformed_query_seed_falls_back() {
        let mut cfg = GameConfig::default();
        cfg.apply_query("?seed=abc");
        assert_eq!(cfg.seed, None);

        let mut cfg = GameConfig { seed: Some(3), ..GameConfig::default() };
        cfg.apply_query("?seed=12x");
        assert_eq!(cfg.seed, Some(3));
    }

    #[test]
    fn seed_is_percent_decoded() {
        assert_eq!(seed_from_query("?seed=%2D5").unwrap(), Some(-5));
        assert_eq!(seed_from_query("?x=a+b&seed=%2B17").unwrap(), Some(17));
        assert_eq!(seed_from_query("?se%65d=8").unwrap(), Some(8));
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn json_partial_config() {
        let cfg = GameConfig::from_json(r#"{"seed": 5, "difficulty": "easy"}"#).unwrap();
        assert_eq!(cfg.seed, Some(5));
        assert_eq!(cfg.difficulty, Difficulty::Easy);
        assert_eq!(cfg.symbols, DEFAULT_SYMBOLS);
        assert!(matches!(GameConfig::from_json(r#"{"symbols": ""}"#), Err(ConfigError::EmptyAlphabet)));
    }
}
