//! Engine configuration.
//!
//! Settings are layered: built-in defaults, then an optional file (any
//! format the `config` crate recognises by extension), then environment
//! variables prefixed with `MATCHBOOK_` (e.g. `MATCHBOOK_CHANNEL_CAPACITY=4096`).
//!
//! ```toml
//! book_capacity = 100000
//! channel_capacity = 1024
//! depth_levels = 10
//!
//! [[instruments]]
//! id = 700
//! symbol = "00700.HK"
//! ```

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// One tradable instrument.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstrumentConfig {
    pub id: u64,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Resting orders pre-allocated per book
    pub book_capacity: usize,

    /// Bound of each book actor's request queue
    pub channel_capacity: usize,

    /// Levels per side in the depth view published after every change
    pub depth_levels: usize,

    /// Books created at startup
    pub instruments: Vec<InstrumentConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            book_capacity: 10_000,
            channel_capacity: 1_024,
            depth_levels: 5,
            instruments: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load defaults, then `path` if given, then `MATCHBOOK_*` variables.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("MATCHBOOK").try_parsing(true))
            .build()?;

        let config: EngineConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document on top of the defaults.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        let config: EngineConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid("channel_capacity must be at least 1".into()));
        }

        let mut ids: Vec<u64> = self.instruments.iter().map(|i| i.id).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(ConfigError::Invalid(format!("instrument {} listed twice", pair[0])));
        }
        Ok(())
    }

    /// Symbol configured for an instrument id.
    pub fn symbol(&self, instrument: u64) -> Option<&str> {
        self.instruments
            .iter()
            .find(|i| i.id == instrument)
            .map(|i| i.symbol.as_str())
    }
}
