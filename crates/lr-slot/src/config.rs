//! Machine configuration
//!
//! Everything fixed at startup: grid shape, strip length, symbol catalog and
//! payline set. Loadable from JSON or YAML and validated before use.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::paytable::{Payline, reference_paylines};
use crate::symbols::SymbolCatalog;
use crate::timing::{MAX_TIMING_MS, TimingConfig};

/// Validation limits
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    pub max_reels: usize,
    pub max_rows: usize,
    pub max_symbols: usize,
    pub max_paylines: usize,
    pub max_strip_len: usize,
    pub max_spin_steps: usize,
    /// Upper bound for any timing value, in milliseconds
    pub max_timing_ms: f64,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_reels: 10,
            max_rows: 10,
            max_symbols: 50,
            max_paylines: 100,
            max_strip_len: 10_000,
            max_spin_steps: 100_000,
            max_timing_ms: MAX_TIMING_MS,
        }
    }
}

/// Complete machine description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Number of reels (columns)
    pub reels: usize,
    /// Visible rows per reel
    pub rows: usize,
    /// Symbols per reel strip
    pub strip_len: usize,
    /// Rendered symbol height; settle offsets are reported in these units
    pub symbol_height_px: f64,
    /// Whole symbols every reel travels per spin before the drawn extra
    pub min_spin_steps: usize,
    /// Credits for a fresh account
    pub default_credits: u64,
    /// Draw the next spin's content ahead of time
    pub lookahead: bool,
    /// Symbol catalog in draw order
    pub symbols: SymbolCatalog,
    /// Payline set
    pub paylines: Vec<Payline>,
    /// Cosmetic timing
    pub timing: TimingConfig,
}

impl MachineConfig {
    /// Reference 5×3 machine
    pub fn reference() -> Self {
        Self {
            reels: 5,
            rows: 3,
            strip_len: 40,
            symbol_height_px: 60.0,
            min_spin_steps: 40,
            default_credits: lr_state::DEFAULT_CREDITS,
            lookahead: true,
            symbols: SymbolCatalog::reference(),
            paylines: reference_paylines(),
            timing: TimingConfig::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yml::from_str(yaml).map_err(|e| ConfigError::Yaml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load by extension: `.yaml`/`.yml` as YAML, anything else as JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;

        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        let config = if is_yaml {
            Self::from_yaml_str(&text)?
        } else {
            Self::from_json_str(&text)?
        };

        log::info!(
            "Loaded machine config {:?}: {}x{}, {} symbols, {} lines",
            path,
            config.reels,
            config.rows,
            config.symbols.len(),
            config.paylines.len()
        );
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Json(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_with(&ConfigLimits::default())
    }

    pub fn validate_with(&self, limits: &ConfigLimits) -> Result<(), ConfigError> {
        if self.reels == 0 || self.reels > limits.max_reels {
            return Err(ConfigError::Validation(format!(
                "reels must be 1..={}, got {}",
                limits.max_reels, self.reels
            )));
        }
        if self.rows == 0 || self.rows > limits.max_rows {
            return Err(ConfigError::Validation(format!(
                "rows must be 1..={}, got {}",
                limits.max_rows, self.rows
            )));
        }
        if self.strip_len < self.rows || self.strip_len > limits.max_strip_len {
            return Err(ConfigError::Validation(format!(
                "strip_len must be {}..={}, got {}",
                self.rows, limits.max_strip_len, self.strip_len
            )));
        }
        if self.min_spin_steps > limits.max_spin_steps {
            return Err(ConfigError::Validation(format!(
                "min_spin_steps must be <= {}, got {}",
                limits.max_spin_steps, self.min_spin_steps
            )));
        }
        if !(self.symbol_height_px.is_finite() && self.symbol_height_px > 0.0) {
            return Err(ConfigError::Validation(format!(
                "symbol_height_px must be positive, got {}",
                self.symbol_height_px
            )));
        }

        if self.symbols.is_empty() {
            return Err(ConfigError::Validation("symbol catalog is empty".into()));
        }
        if self.symbols.len() > limits.max_symbols {
            return Err(ConfigError::Validation(format!(
                "too many symbols: {} > {}",
                self.symbols.len(),
                limits.max_symbols
            )));
        }
        let mut seen = HashSet::new();
        for symbol in self.symbols.iter() {
            if !seen.insert(symbol.id) {
                return Err(ConfigError::Validation(format!(
                    "duplicate symbol id {}",
                    symbol.id
                )));
            }
            if symbol.weight == 0 {
                return Err(ConfigError::Validation(format!(
                    "symbol {} has zero weight",
                    symbol.key
                )));
            }
        }

        if self.paylines.len() > limits.max_paylines {
            return Err(ConfigError::Validation(format!(
                "too many paylines: {} > {}",
                self.paylines.len(),
                limits.max_paylines
            )));
        }
        for (index, line) in self.paylines.iter().enumerate() {
            if line.rows.len() != self.reels {
                return Err(ConfigError::Validation(format!(
                    "payline {} has {} positions, expected {}",
                    index,
                    line.rows.len(),
                    self.reels
                )));
            }
            if let Some(&row) = line.rows.iter().find(|&&row| row >= self.rows) {
                return Err(ConfigError::Validation(format!(
                    "payline {} uses row {} outside 0..{}",
                    index, row, self.rows
                )));
            }
        }

        self.timing.validate_within(limits.max_timing_ms)
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::reference()
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(String),

    #[error("YAML parse error: {0}")]
    Yaml(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
