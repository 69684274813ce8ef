//! Runtime parameter store addressed by name
//!
//! Every cell has a fixed kind. Text written to a cell is parsed according to
//! that kind, so interactive `key=value` edits never need reflection.

use std::collections::BTreeMap;
use std::fmt;

use parking_lot::RwLock;
use tracing::debug;

use crate::config::PredictConfig;

/// Keys accepted by [`ParameterStore`], with the kind of each cell
pub const PARAMETER_KEYS: [(&str, ParamKind); 8] = [
    ("repeat_last_n", ParamKind::Int),
    ("repeat_penalty", ParamKind::Float),
    ("seed", ParamKind::Int),
    ("temp", ParamKind::Float),
    ("threads", ParamKind::Int),
    ("tokens", ParamKind::Int),
    ("top_k", ParamKind::Int),
    ("top_p", ParamKind::Float),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Float,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Int(i32),
    Float(f32),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Int(_) => ParamKind::Int,
            ParamValue::Float(_) => ParamKind::Float,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("unknown option {0}")]
    NotFound(String),

    #[error("option {key} expects {expected:?}, got {actual:?}")]
    TypeMismatch {
        key: String,
        expected: ParamKind,
        actual: ParamKind,
    },

    #[error("parsing value '{value}' for {key} as {kind:?}: {reason}")]
    Parse {
        key: String,
        value: String,
        kind: ParamKind,
        reason: String,
    },
}

/// Process-wide set of sampling parameters, editable by name
#[derive(Debug)]
pub struct ParameterStore {
    cells: RwLock<BTreeMap<&'static str, ParamValue>>,
}

impl ParameterStore {
    /// Seed every cell from `config`
    pub fn from_config(config: &PredictConfig) -> Self {
        let cells = BTreeMap::from([
            ("repeat_last_n", ParamValue::Int(config.repeat_last_n)),
            ("repeat_penalty", ParamValue::Float(config.penalty)),
            ("seed", ParamValue::Int(config.seed)),
            ("temp", ParamValue::Float(config.temperature)),
            ("threads", ParamValue::Int(config.threads)),
            ("tokens", ParamValue::Int(config.tokens)),
            ("top_k", ParamValue::Int(config.top_k)),
            ("top_p", ParamValue::Float(config.top_p)),
        ]);
        Self { cells: RwLock::new(cells) }
    }

    pub fn get(&self, key: &str) -> Result<ParamValue, ParamError> {
        self.cells
            .read()
            .get(key)
            .copied()
            .ok_or_else(|| ParamError::NotFound(key.to_string()))
    }

    /// Parse `text` by the declared kind of `key` and store it
    pub fn set(&self, key: &str, text: &str) -> Result<(), ParamError> {
        let value = parse_value(key, text)?;
        self.cells.write().insert(canonical_key(key)?, value);
        Ok(())
    }

    /// Store an already typed value; the variant must match the cell
    pub fn set_value(&self, key: &str, value: ParamValue) -> Result<(), ParamError> {
        let expected = kind_of(key)?;
        if value.kind() != expected {
            return Err(ParamError::TypeMismatch {
                key: key.to_string(),
                expected,
                actual: value.kind(),
            });
        }
        self.cells.write().insert(canonical_key(key)?, value);
        Ok(())
    }

    /// All entries sorted by key
    pub fn list(&self) -> Vec<(&'static str, ParamValue)> {
        self.cells.read().iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Apply the `key=value` tokens at the start of `line`.
    ///
    /// Scanning stops at the first token that is not `known_key=value`. A token
    /// with several `=` uses the text between the first two as its value, so
    /// `seed=1=2` sets seed to 1. All recognized values are parsed before any
    /// is written, so a bad value leaves the whole store untouched. Returns
    /// whether the line was an edit.
    pub fn apply_line(&self, line: &str) -> Result<bool, ParamError> {
        let mut edits = Vec::new();
        for token in line.split_whitespace() {
            let mut fields = token.split('=');
            let (Some(key), Some(value)) = (fields.next(), fields.next()) else {
                break;
            };
            let Ok(key) = canonical_key(key.trim()) else {
                break;
            };
            edits.push((key, parse_value(key, value.trim())?));
        }

        if edits.is_empty() {
            return Ok(false);
        }

        let mut cells = self.cells.write();
        for (key, value) in edits {
            debug!(key, %value, "parameter changed");
            cells.insert(key, value);
        }
        Ok(true)
    }

    /// Project the store onto `base`; fields the store doesn't hold come from `base`
    pub fn resolve(&self, base: &PredictConfig) -> PredictConfig {
        let cells = self.cells.read();
        let int = |key: &str, fallback: i32| match cells.get(key) {
            Some(ParamValue::Int(v)) => *v,
            _ => fallback,
        };
        let float = |key: &str, fallback: f32| match cells.get(key) {
            Some(ParamValue::Float(v)) => *v,
            _ => fallback,
        };

        PredictConfig {
            seed: int("seed", base.seed),
            threads: int("threads", base.threads),
            tokens: int("tokens", base.tokens),
            top_k: int("top_k", base.top_k),
            top_p: float("top_p", base.top_p),
            temperature: float("temp", base.temperature),
            penalty: float("repeat_penalty", base.penalty),
            repeat_last_n: int("repeat_last_n", base.repeat_last_n),
            ..*base
        }
        .normalized()
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::from_config(&PredictConfig::default())
    }
}

/// Renders the settings line, e.g. `repeat_last_n=64 repeat_penalty=1.3 ...`
impl fmt::Display for ParameterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settings: Vec<String> = self
            .list()
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        f.write_str(&settings.join(" "))
    }
}

fn canonical_key(key: &str) -> Result<&'static str, ParamError> {
    PARAMETER_KEYS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(name, _)| *name)
        .ok_or_else(|| ParamError::NotFound(key.to_string()))
}

fn kind_of(key: &str) -> Result<ParamKind, ParamError> {
    PARAMETER_KEYS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, kind)| *kind)
        .ok_or_else(|| ParamError::NotFound(key.to_string()))
}

fn parse_value(key: &str, text: &str) -> Result<ParamValue, ParamError> {
    let kind = kind_of(key)?;
    let parse_error = |reason: String| ParamError::Parse {
        key: key.to_string(),
        value: text.to_string(),
        kind,
        reason,
    };

    match kind {
        ParamKind::Int => text
            .parse::<i32>()
            .map(ParamValue::Int)
            .map_err(|e| parse_error(e.to_string())),
        ParamKind::Float => text
            .parse::<f32>()
            .map(ParamValue::Float)
            .map_err(|e| parse_error(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UNBOUNDED_TOKENS;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip_defaults() {
        let store = ParameterStore::default();
        for (key, value) in store.list() {
            store.set(key, &value.to_string()).unwrap();
            assert_eq!(store.get(key).unwrap(), value, "{}", key);
        }
    }

    #[test]
    fn test_parse_error_keeps_value() {
        let store = ParameterStore::default();
        for (key, _) in PARAMETER_KEYS {
            let before = store.get(key).unwrap();
            let err = store.set(key, "not-a-number").unwrap_err();
            assert!(matches!(err, ParamError::Parse { .. }));
            assert_eq!(store.get(key).unwrap(), before);
        }
    }

    #[test]
    fn test_unknown_key() {
        let store = ParameterStore::default();
        assert_eq!(store.get("mirostat"), Err(ParamError::NotFound("mirostat".into())));
        assert!(matches!(store.set("mirostat", "2"), Err(ParamError::NotFound(_))));
    }

    #[test]
    fn test_type_mismatch() {
        let store = ParameterStore::default();
        let err = store.set_value("seed", ParamValue::Float(4.2)).unwrap_err();
        assert!(matches!(err, ParamError::TypeMismatch { .. }));
        assert_eq!(store.get("seed").unwrap(), ParamValue::Int(-1));

        store.set_value("temp", ParamValue::Float(0.5)).unwrap();
        assert_eq!(store.get("temp").unwrap(), ParamValue::Float(0.5));
    }

    #[test]
    fn test_int_rejects_float_text() {
        let store = ParameterStore::default();
        assert!(store.set("tokens", "12.5").is_err());
        assert!(store.set("tokens", "99999999999").is_err());
        store.set("top_p", "1").unwrap();
        assert_eq!(store.get("top_p").unwrap(), ParamValue::Float(1.0));
    }

    #[test]
    fn test_list_sorted() {
        let store = ParameterStore::default();
        let keys: Vec<&str> = store.list().into_iter().map(|(k, _)| k).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys.len(), PARAMETER_KEYS.len());
    }

    #[test]
    fn test_settings_line() {
        let config = PredictConfig {
            threads: 4,
            ..Default::default()
        };
        let store = ParameterStore::from_config(&config);
        assert_eq!(
            store.to_string(),
            "repeat_last_n=64 repeat_penalty=1.3 seed=-1 temp=0.8 threads=4 tokens=128 top_k=40 top_p=0.95"
        );
    }

    #[test]
    fn test_apply_line_edits() {
        let store = ParameterStore::default();
        assert!(store.apply_line("seed=42 temp=0.5\n").unwrap());
        assert_eq!(store.get("seed").unwrap(), ParamValue::Int(42));
        assert_eq!(store.get("temp").unwrap(), ParamValue::Float(0.5));
    }

    #[test]
    fn test_apply_line_prose() {
        let store = ParameterStore::default();
        assert!(!store.apply_line("hello world").unwrap());
        assert!(!store.apply_line("x=1 means seed=5").unwrap());
        assert_eq!(store.get("seed").unwrap(), ParamValue::Int(-1));
    }

    #[test]
    fn test_apply_line_stops_at_unknown_token() {
        let store = ParameterStore::default();
        assert!(store.apply_line("top_k=10 foo=1 seed=3").unwrap());
        assert_eq!(store.get("top_k").unwrap(), ParamValue::Int(10));
        assert_eq!(store.get("seed").unwrap(), ParamValue::Int(-1));
    }

    #[test]
    fn test_apply_line_extra_separators() {
        let store = ParameterStore::default();
        assert!(store.apply_line("seed=1=2 temp=0.5=x").unwrap());
        assert_eq!(store.get("seed").unwrap(), ParamValue::Int(1));
        assert_eq!(store.get("temp").unwrap(), ParamValue::Float(0.5));

        let err = store.apply_line("top_k==3").unwrap_err();
        assert!(matches!(err, ParamError::Parse { ref key, ref value, .. } if key == "top_k" && value.is_empty()));
    }

    #[test]
    fn test_apply_line_is_atomic() {
        let store = ParameterStore::default();
        let err = store.apply_line("seed=42 temp=warm").unwrap_err();
        assert!(matches!(err, ParamError::Parse { ref key, .. } if key == "temp"));
        assert_eq!(store.get("seed").unwrap(), ParamValue::Int(-1));
        assert_eq!(store.get("temp").unwrap(), ParamValue::Float(0.8));
    }

    #[test]
    fn test_resolve() {
        let base = PredictConfig {
            ignore_eos: true,
            ..Default::default()
        };
        let store = ParameterStore::from_config(&base);
        store.apply_line("tokens=0 top_k=7 repeat_penalty=1.1").unwrap();

        let resolved = store.resolve(&base);
        assert_eq!(resolved.tokens, UNBOUNDED_TOKENS);
        assert_eq!(resolved.top_k, 7);
        assert_eq!(resolved.penalty, 1.1);
        assert!(resolved.ignore_eos);
        assert_eq!(resolved.seed, base.seed);
    }
}
