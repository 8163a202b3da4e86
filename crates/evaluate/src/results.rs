//! Evaluation results reporting: summary table and JSON persistence.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::strategy::EvaluationResult;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize results: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write results: {0}")]
    Io(#[from] std::io::Error),
}

/// Generate the per-match summary table as text.
pub fn generate_report(result: &EvaluationResult) -> String {
    let mut report = String::new();

    report.push('\n');
    report.push_str(&format!(
        "{:>5}  {:>6}  {:>5}  {:>4}\n",
        "ELO", "Score", "Games", "Pct"
    ));
    for (i, (elo, mr)) in result.match_results.iter().enumerate() {
        let pct = mr.total_score / mr.num_games as f64 * 100.0;
        let suffix = if (i as u32) < result.warmup_excluded {
            "  (warmup)"
        } else {
            ""
        };
        report.push_str(&format!(
            "{:>5}  {:>6.1}  {:>5}  {:>3.0}%{}\n",
            elo, mr.total_score, mr.num_games, pct, suffix
        ));
    }

    report.push('\n');
    report.push_str(&format!(
        "Total: {:.1} / {}\n",
        result.total_score, result.total_games
    ));
    if result.warmup_excluded > 0 {
        report.push_str(&format!(
            "Warmup: {} match(es) excluded from rating\n",
            result.warmup_excluded
        ));
    }
    report.push_str(&format!("Performance ELO: {:.0}\n", result.estimated_elo));

    report
}

/// Print the summary table to stdout.
pub fn print_report(result: &EvaluationResult) {
    print!("{}", generate_report(result));
}

/// Save the full results as pretty-printed JSON.
pub fn save_json(result: &EvaluationResult, path: &Path) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(result)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_runner::MatchResult;

    fn sample() -> EvaluationResult {
        EvaluationResult {
            estimated_elo: 1543.2,
            total_score: 3.5,
            total_games: 6,
            match_results: vec![
                (
                    1800,
                    MatchResult {
                        total_score: 0.5,
                        num_games: 2,
                        games: Vec::new(),
                    },
                ),
                (
                    1400,
                    MatchResult {
                        total_score: 1.5,
                        num_games: 2,
                        games: Vec::new(),
                    },
                ),
                (
                    1550,
                    MatchResult {
                        total_score: 1.5,
                        num_games: 2,
                        games: Vec::new(),
                    },
                ),
            ],
            warmup_matches: 2,
            warmup_excluded: 1,
        }
    }

    #[test]
    fn report_lists_matches_and_flags_warmup() {
        let report = generate_report(&sample());

        assert!(report.contains(" 1800     0.5      2   25%  (warmup)"));
        assert!(report.contains(" 1400     1.5      2   75%"));
        assert!(!report.contains("1400     1.5      2   75%  (warmup)"));
        assert!(report.contains("Total: 3.5 / 6"));
        assert!(report.contains("Warmup: 1 match(es) excluded from rating"));
        assert!(report.contains("Performance ELO: 1543"));
    }

    #[test]
    fn report_omits_warmup_line_when_nothing_excluded() {
        let mut result = sample();
        result.warmup_excluded = 0;
        let report = generate_report(&result);
        assert!(!report.contains("Warmup:"));
    }

    #[test]
    fn results_serialize_to_json() {
        let json = serde_json::to_string_pretty(&sample()).unwrap();
        assert!(json.contains("\"estimated_elo\""));
        assert!(json.contains("\"match_results\""));
        assert!(json.contains("1543.2"));
    }
}
