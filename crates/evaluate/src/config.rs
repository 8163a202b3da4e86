//! Evaluation settings, loadable from a TOML file and overridable on the
//! command line.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::strategy::Strategy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("engine path is required")]
    MissingEnginePath,
}

/// Settings for an evaluation run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    /// Path to the engine binary under test.
    pub engine_path: String,
    /// Number of matches against Stockfish.
    pub matches: u32,
    /// Games per match.
    pub games: u32,
    /// Search time per move in milliseconds.
    pub movetime_ms: u64,
    pub strategy: Strategy,
    /// Opponent ELO bounds. Auto-detected from Stockfish when unset.
    pub min_elo: Option<u32>,
    pub max_elo: Option<u32>,
    pub stockfish_path: String,
    /// Warmup matches excluded from the rating. Defaults to `min(2, matches-1)`.
    pub warmup: Option<u32>,
    /// Start games from a random opening line.
    pub openings: bool,
    /// Write per-game PGN files under `game_logs/`.
    pub log_pgn: bool,
    /// Optional path for a JSON dump of the full results.
    pub json_out: Option<PathBuf>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            engine_path: String::new(),
            matches: 10,
            games: 2,
            movetime_ms: 100,
            strategy: Strategy::Adaptive,
            min_elo: None,
            max_elo: None,
            stockfish_path: "stockfish".to_string(),
            warmup: None,
            openings: true,
            log_pgn: false,
            json_out: None,
        }
    }
}

impl EvalConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Ensure required settings are present once file and CLI layers are
    /// merged.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine_path.is_empty() {
            return Err(ConfigError::MissingEnginePath);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = EvalConfig::default();
        assert_eq!(config.matches, 10);
        assert_eq!(config.games, 2);
        assert_eq!(config.strategy, Strategy::Adaptive);
        assert_eq!(config.stockfish_path, "stockfish");
        assert!(config.openings);
        assert!(!config.log_pgn);
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_overrides_defaults() {
        let config: EvalConfig = toml::from_str(
            r#"
            engine_path = "./my_engine"
            matches = 5
            games = 4
            movetime_ms = 250
            strategy = "bsearch"
            min_elo = 1000
            max_elo = 2000
            log_pgn = true
            "#,
        )
        .unwrap();

        assert_eq!(config.engine_path, "./my_engine");
        assert_eq!(config.matches, 5);
        assert_eq!(config.games, 4);
        assert_eq!(config.movetime_ms, 250);
        assert_eq!(config.strategy, Strategy::Bsearch);
        assert_eq!(config.min_elo, Some(1000));
        assert_eq!(config.max_elo, Some(2000));
        assert!(config.log_pgn);
        // Unset fields keep their defaults.
        assert_eq!(config.stockfish_path, "stockfish");
        assert!(config.openings);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<EvalConfig, _> = toml::from_str("engin_path = \"typo\"");
        assert!(result.is_err());
    }
}
