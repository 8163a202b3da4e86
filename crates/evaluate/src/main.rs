//! Evaluation CLI
//!
//! Estimate a UCI engine's ELO by playing matches against Stockfish.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use evaluate::{evaluate_engine, results, EvalConfig, Strategy};

fn print_usage() {
    println!("Engine ELO evaluation vs Stockfish");
    println!();
    println!("Usage:");
    println!("  evaluate <engine_path> [options]");
    println!();
    println!("Options:");
    println!("  --matches N       Number of matches (default: 10)");
    println!("  --games N         Games per match (default: 2)");
    println!("  --movetime MS     Time per move in ms (default: 100)");
    println!("  --strategy S      adaptive | linear | bsearch (default: adaptive)");
    println!("  --min-elo N       Min opponent ELO (default: auto-detect)");
    println!("  --max-elo N       Max opponent ELO (default: auto-detect)");
    println!("  --stockfish PATH  Path to Stockfish (default: stockfish)");
    println!("  --warmup N        Warmup matches excluded from rating (default: 2)");
    println!("  --no-openings     Start every game from the initial position");
    println!("  --pgn             Write per-game PGN files under game_logs/");
    println!("  --json PATH       Dump full results as JSON");
    println!("  --config PATH     Load settings from a TOML file (flags override)");
    println!();
    println!("Examples:");
    println!("  evaluate ./my_engine --matches 10 --games 2 --movetime 100");
    println!("  evaluate ./my_engine --strategy bsearch --min-elo 1000 --max-elo 2600 --pgn");
}

fn value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str> {
    *i += 1;
    args.get(*i)
        .map(|s| s.as_str())
        .with_context(|| format!("{flag} requires a value"))
}

fn parse_args(args: &[String]) -> Result<EvalConfig> {
    // The config file forms the base layer so that flags override it.
    let mut config = EvalConfig::default();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--config" {
            let path = value(args, &mut i, "--config")?;
            config = EvalConfig::from_toml_file(Path::new(path))?;
            break;
        }
        i += 1;
    }

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--matches" => {
                config.matches = value(args, &mut i, "--matches")?
                    .parse()
                    .context("invalid --matches value")?;
            }
            "--games" => {
                config.games = value(args, &mut i, "--games")?
                    .parse()
                    .context("invalid --games value")?;
            }
            "--movetime" => {
                config.movetime_ms = value(args, &mut i, "--movetime")?
                    .parse()
                    .context("invalid --movetime value")?;
            }
            "--strategy" => {
                config.strategy = value(args, &mut i, "--strategy")?.parse::<Strategy>()?;
            }
            "--min-elo" => {
                config.min_elo = Some(
                    value(args, &mut i, "--min-elo")?
                        .parse()
                        .context("invalid --min-elo value")?,
                );
            }
            "--max-elo" => {
                config.max_elo = Some(
                    value(args, &mut i, "--max-elo")?
                        .parse()
                        .context("invalid --max-elo value")?,
                );
            }
            "--stockfish" => {
                config.stockfish_path = value(args, &mut i, "--stockfish")?.to_string();
            }
            "--warmup" => {
                config.warmup = Some(
                    value(args, &mut i, "--warmup")?
                        .parse()
                        .context("invalid --warmup value")?,
                );
            }
            "--no-openings" => {
                config.openings = false;
            }
            "--pgn" => {
                config.log_pgn = true;
            }
            "--json" => {
                config.json_out = Some(PathBuf::from(value(args, &mut i, "--json")?));
            }
            "--config" => {
                // Already consumed in the first pass.
                i += 1;
            }
            flag if flag.starts_with("--") => {
                bail!("unknown option: {flag}");
            }
            positional => {
                if !config.engine_path.is_empty() {
                    bail!("unexpected argument: {positional}");
                }
                config.engine_path = positional.to_string();
            }
        }
        i += 1;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let config = parse_args(&args)?;

    let result = evaluate_engine(&config)?;

    results::print_report(&result);
    if let Some(path) = &config.json_out {
        results::save_json(&result, path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Results written to {}", path.display());
    }

    Ok(())
}
