//! ELO estimation strategies: how opponent strength is chosen from match
//! to match, and how the final performance rating is assembled.

use std::path::Path;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uci_client::UciEngine;

use crate::config::EvalConfig;
use crate::elo::{performance_rating, RatingError};
use crate::match_runner::{run_match, GameRecord, MatchConfig, MatchResult};
use crate::pgn;

pub const DEFAULT_MIN_ELO: u32 = 800;
pub const DEFAULT_MAX_ELO: u32 = 2800;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("matches must be at least 1")]
    NoMatches,
    #[error("min ELO ({min}) must be <= max ELO ({max})")]
    BadEloRange { min: u32, max: u32 },
    #[error("warmup ({warmup}) must be less than the match count ({matches})")]
    WarmupTooLarge { warmup: u32, matches: u32 },
    #[error("unknown strategy '{0}', use 'adaptive', 'linear', or 'bsearch'")]
    UnknownStrategy(String),
    #[error(transparent)]
    Uci(#[from] uci_client::UciError),
    #[error(transparent)]
    Rating(#[from] RatingError),
    #[error(transparent)]
    Pgn(#[from] pgn::PgnError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Adaptive,
    Linear,
    Bsearch,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Adaptive => "adaptive",
            Strategy::Linear => "linear",
            Strategy::Bsearch => "bsearch",
        }
    }
}

impl FromStr for Strategy {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adaptive" => Ok(Strategy::Adaptive),
            "linear" => Ok(Strategy::Linear),
            "bsearch" => Ok(Strategy::Bsearch),
            other => Err(EvalError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Outcome of a full evaluation run.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub estimated_elo: f64,
    pub total_score: f64,
    pub total_games: u32,
    /// (opponent ELO, match result) in play order.
    pub match_results: Vec<(u32, MatchResult)>,
    pub warmup_matches: u32,
    pub warmup_excluded: u32,
}

/// Evenly spaced opponent ELO levels across the range. A single match is
/// played at the midpoint.
pub fn generate_elo_levels(
    min_elo: u32,
    max_elo: u32,
    num_matches: u32,
) -> Result<Vec<u32>, EvalError> {
    if num_matches < 1 {
        return Err(EvalError::NoMatches);
    }
    if min_elo > max_elo {
        return Err(EvalError::BadEloRange {
            min: min_elo,
            max: max_elo,
        });
    }

    if num_matches == 1 {
        return Ok(vec![(min_elo + max_elo) / 2]);
    }

    let step = (max_elo - min_elo) as f64 / (num_matches - 1) as f64;
    Ok((0..num_matches)
        .map(|i| (min_elo as f64 + i as f64 * step).round() as u32)
        .collect())
}

/// Effective warmup count: defaults to `min(2, matches - 1)` and must stay
/// below the match count so at least one match is rated.
pub fn resolve_warmup(warmup: Option<u32>, num_matches: u32) -> Result<u32, EvalError> {
    if num_matches < 1 {
        return Err(EvalError::NoMatches);
    }
    let warmup = warmup.unwrap_or_else(|| 2.min(num_matches - 1));
    if warmup >= num_matches {
        return Err(EvalError::WarmupTooLarge {
            warmup,
            matches: num_matches,
        });
    }
    Ok(warmup)
}

/// Number of warmup matches excluded after `total_matches` have been played.
///
/// Exclusion starts once rated matches equal the warmup count, then one
/// more warmup match is dropped per subsequent match until all are gone.
pub fn warmup_excluded(warmup: u32, total_matches: u32) -> u32 {
    if warmup == 0 {
        return 0;
    }
    let rated = total_matches as i64 - warmup as i64;
    let excluded = (rated - warmup as i64 + 1).max(0).min(warmup as i64);
    excluded as u32
}

/// Query Stockfish for its valid `UCI_Elo` range, falling back to the
/// defaults when the option is missing or the process cannot be started.
pub fn get_stockfish_elo_range(stockfish_path: &str) -> (u32, u32) {
    match UciEngine::start(stockfish_path) {
        Ok(engine) => {
            if let Some(opt) = engine.get_option("UCI_Elo") {
                let bounds = opt
                    .min
                    .as_deref()
                    .and_then(|m| m.parse::<u32>().ok())
                    .zip(opt.max.as_deref().and_then(|m| m.parse::<u32>().ok()));
                if let Some((min_elo, max_elo)) = bounds {
                    info!(min_elo, max_elo, "detected Stockfish UCI_Elo range");
                    return (min_elo, max_elo);
                }
            }
        }
        Err(e) => {
            warn!(error = %e, "could not detect Stockfish ELO range");
        }
    }

    info!(
        min_elo = DEFAULT_MIN_ELO,
        max_elo = DEFAULT_MAX_ELO,
        "using default ELO range"
    );
    (DEFAULT_MIN_ELO, DEFAULT_MAX_ELO)
}

fn engine_display_name(engine_path: &str) -> String {
    Path::new(engine_path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| engine_path.to_string())
}

fn run_single_match(
    config: &EvalConfig,
    elo: u32,
    log_dir: Option<&Path>,
    match_results: &mut Vec<(u32, MatchResult)>,
) -> Result<f64, EvalError> {
    info!(elo, "starting match vs Stockfish");

    let match_config = MatchConfig {
        engine_path: config.engine_path.clone(),
        stockfish_path: config.stockfish_path.clone(),
        stockfish_elo: elo,
        num_games: config.games,
        movetime_ms: config.movetime_ms,
        use_openings: config.openings,
    };

    let match_number = match_results.len() as u32 + 1;
    let engine_name = engine_display_name(&config.engine_path);
    let date = Utc::now().format("%Y.%m.%d").to_string();

    let result = match log_dir {
        Some(dir) => {
            let mut on_game = |game: &GameRecord| {
                if let Err(e) =
                    pgn::write_game_pgn(dir, match_number, game, elo, &engine_name, &date)
                {
                    warn!(error = %e, "failed to write game PGN");
                }
            };
            run_match(&match_config, Some(&mut on_game))?
        }
        None => run_match(&match_config, None)?,
    };

    let pct = result.total_score / config.games as f64 * 100.0;
    info!(
        elo,
        score = result.total_score,
        games = config.games,
        pct = format!("{pct:.0}%").as_str(),
        "match finished"
    );

    let score = result.total_score;
    match_results.push((elo, result));
    Ok(score)
}

/// Flatten the rated portion of the results into per-game opponent ratings
/// plus the rated score.
fn rated_slice(match_results: &[(u32, MatchResult)], excluded: u32) -> (Vec<f64>, f64) {
    let mut opponents: Vec<f64> = Vec::new();
    let mut score = 0.0;
    for (elo, mr) in &match_results[excluded as usize..] {
        opponents.extend(std::iter::repeat(*elo as f64).take(mr.num_games as usize));
        score += mr.total_score;
    }
    (opponents, score)
}

fn build_result(
    total_score: f64,
    match_results: Vec<(u32, MatchResult)>,
    warmup: u32,
) -> Result<EvaluationResult, EvalError> {
    let excluded = warmup_excluded(warmup, match_results.len() as u32);
    let (rated_opponents, rated_score) = rated_slice(&match_results, excluded);
    let total_games: u32 = match_results.iter().map(|(_, mr)| mr.num_games).sum();

    let estimated_elo = performance_rating(&rated_opponents, rated_score)?;
    info!(
        performance_elo = format!("{estimated_elo:.0}").as_str(),
        excluded, warmup, "evaluation complete"
    );

    Ok(EvaluationResult {
        estimated_elo,
        total_score,
        total_games,
        match_results,
        warmup_matches: warmup,
        warmup_excluded: excluded,
    })
}

fn evaluate_linear(
    config: &EvalConfig,
    min_elo: u32,
    max_elo: u32,
    warmup: u32,
    log_dir: Option<&Path>,
) -> Result<EvaluationResult, EvalError> {
    let elo_levels = generate_elo_levels(min_elo, max_elo, config.matches)?;

    let mut total_score = 0.0;
    let mut match_results: Vec<(u32, MatchResult)> = Vec::new();

    for elo in elo_levels {
        total_score += run_single_match(config, elo, log_dir, &mut match_results)?;
    }

    build_result(total_score, match_results, warmup)
}

fn evaluate_adaptive(
    config: &EvalConfig,
    min_elo: u32,
    max_elo: u32,
    warmup: u32,
    log_dir: Option<&Path>,
) -> Result<EvaluationResult, EvalError> {
    let mut total_score = 0.0;
    let mut match_results: Vec<(u32, MatchResult)> = Vec::new();

    let mut next_elo = (min_elo + max_elo) / 2;

    for match_num in 0..config.matches {
        total_score += run_single_match(config, next_elo, log_dir, &mut match_results)?;

        if match_num + 1 < config.matches {
            // Select the next opponent from the current estimate, gradually
            // dropping warmup matches as rated data accumulates.
            let excluded = warmup_excluded(warmup, match_num + 1);
            let (sel_opponents, sel_score) = rated_slice(&match_results, excluded);

            let estimated = performance_rating(&sel_opponents, sel_score)?;
            next_elo = (estimated.round() as i64)
                .clamp(min_elo as i64, max_elo as i64) as u32;
            info!(
                estimate = format!("{estimated:.0}").as_str(),
                next_elo,
                using_matches = match_results.len() - excluded as usize,
                "adaptive selection"
            );
        }
    }

    build_result(total_score, match_results, warmup)
}

fn evaluate_bsearch(
    config: &EvalConfig,
    min_elo: u32,
    max_elo: u32,
    warmup: u32,
    log_dir: Option<&Path>,
) -> Result<EvaluationResult, EvalError> {
    let mut total_score = 0.0;
    let mut match_results: Vec<(u32, MatchResult)> = Vec::new();

    let mut lo = min_elo as f64;
    let mut hi = max_elo as f64;

    for match_num in 0..config.matches {
        let mid = ((lo + hi) / 2.0).round() as u32;
        total_score += run_single_match(config, mid, log_dir, &mut match_results)?;

        if match_num + 1 < config.matches {
            let (_, last_result) = &match_results[match_results.len() - 1];
            let pct = last_result.total_score / config.games as f64;
            if pct > 0.5 {
                lo = mid as f64;
            } else if pct < 0.5 {
                hi = mid as f64;
            }
            info!(
                score_pct = format!("{:.0}%", pct * 100.0).as_str(),
                lo = lo.round() as u32,
                hi = hi.round() as u32,
                "bsearch narrowing"
            );
        }
    }

    build_result(total_score, match_results, warmup)
}

/// Run a full evaluation with the configured strategy. The opponent ELO
/// range is auto-detected from Stockfish when not set explicitly.
pub fn evaluate_engine(config: &EvalConfig) -> Result<EvaluationResult, EvalError> {
    let warmup = resolve_warmup(config.warmup, config.matches)?;

    let (min_elo, max_elo) = match (config.min_elo, config.max_elo) {
        (Some(min), Some(max)) => (min, max),
        (min, max) => {
            let (detected_min, detected_max) = get_stockfish_elo_range(&config.stockfish_path);
            (min.unwrap_or(detected_min), max.unwrap_or(detected_max))
        }
    };
    if min_elo > max_elo {
        return Err(EvalError::BadEloRange {
            min: min_elo,
            max: max_elo,
        });
    }

    let log_dir = if config.log_pgn {
        Some(pgn::create_log_dir(&config.engine_path)?)
    } else {
        None
    };
    let log_dir = log_dir.as_deref();

    match config.strategy {
        Strategy::Adaptive => evaluate_adaptive(config, min_elo, max_elo, warmup, log_dir),
        Strategy::Linear => evaluate_linear(config, min_elo, max_elo, warmup, log_dir),
        Strategy::Bsearch => evaluate_bsearch(config, min_elo, max_elo, warmup, log_dir),
    }
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod strategy_tests;
