//! Performance ELO rating via the iterative (FIDE-like) method.
//!
//! Finds the rating R such that the total expected score against all
//! opponents equals the actual score, using binary search.

use thiserror::Error;

/// Acceptable difference between expected and actual score.
pub const RATING_TOLERANCE: f64 = 0.001;
/// Binary search bounds for the performance rating.
pub const RATING_SEARCH_LO: f64 = 0.0;
pub const RATING_SEARCH_HI: f64 = 5000.0;
const MAX_ITERATIONS: u32 = 1000;

#[derive(Debug, Error, PartialEq)]
pub enum RatingError {
    #[error("opponents list must not be empty")]
    NoOpponents,
    #[error("score must be between 0 and {max} (number of games), got {score}")]
    ScoreOutOfRange { score: f64, max: usize },
}

/// Expected score of a player with `rating` against `opponent_rating`,
/// in (0, 1) per the standard ELO formula.
pub fn expected_score(rating: f64, opponent_rating: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((opponent_rating - rating) / 400.0))
}

/// Sum of expected scores against each opponent.
pub fn total_expected_score(rating: f64, opponents: &[f64]) -> f64 {
    opponents
        .iter()
        .map(|&opp| expected_score(rating, opp))
        .sum()
}

/// Find the performance rating for `score` points against `opponents`.
///
/// A perfect or zero score converges to the boundary of the search range.
pub fn performance_rating(opponents: &[f64], score: f64) -> Result<f64, RatingError> {
    if opponents.is_empty() {
        return Err(RatingError::NoOpponents);
    }
    if score < 0.0 || score > opponents.len() as f64 {
        return Err(RatingError::ScoreOutOfRange {
            score,
            max: opponents.len(),
        });
    }

    let mut lo = RATING_SEARCH_LO;
    let mut hi = RATING_SEARCH_HI;
    for _ in 0..MAX_ITERATIONS {
        let mid = (lo + hi) / 2.0;
        let expected = total_expected_score(mid, opponents);
        if (expected - score).abs() < RATING_TOLERANCE {
            return Ok(mid);
        }
        if expected < score {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok((lo + hi) / 2.0)
}
