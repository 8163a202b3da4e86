//! Subprocess client for UCI chess engines.
//!
//! Spawns an engine binary, speaks the line-oriented UCI protocol over its
//! stdin/stdout, and exposes the handful of commands the evaluation harness
//! needs: handshake with option discovery, `setoption`, `ucinewgame`, and
//! `go movetime` returning the best move and a centipawn score.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, trace, warn};

/// Sentinel score substituted for `score mate N` info lines.
pub const MATE_SCORE: i32 = 100_000;

#[derive(Debug, Error)]
pub enum UciError {
    #[error("failed to launch engine {path}: {source}")]
    Spawn {
        path: String,
        source: std::io::Error,
    },
    #[error("engine i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("engine closed its stdout")]
    EngineClosed,
    #[error("unexpected engine output: {0}")]
    Protocol(String),
}

/// Attributes of a UCI option as advertised during the handshake, e.g.
/// `option name UCI_Elo type spin default 1320 min 1320 max 3190`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UciOption {
    pub kind: Option<String>,
    pub default: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
}

/// The engine seam used by the match runner. Implemented by `UciEngine`
/// and by scripted stand-ins in tests.
pub trait MoveProvider {
    /// Human-readable identifier (the binary path for real engines).
    fn label(&self) -> &str;

    /// Signal the start of a new game.
    fn new_game(&mut self) -> Result<(), UciError>;

    /// Search the position reached by `moves` from the starting position
    /// and return `(bestmove, score_cp)`. `bestmove` is `(none)` or `0000`
    /// when the engine believes it has no legal moves; the score is from
    /// the engine's perspective, mate scores mapped to ±`MATE_SCORE`.
    fn go(
        &mut self,
        moves: &[String],
        movetime_ms: u64,
    ) -> Result<(String, Option<i32>), UciError>;
}

/// A running UCI engine process.
pub struct UciEngine {
    path: String,
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    options: HashMap<String, UciOption>,
}

impl UciEngine {
    /// Launch the engine binary and perform the `uci`/`uciok` handshake,
    /// collecting every advertised option along the way.
    pub fn start(path: &str) -> Result<Self, UciError> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| UciError::Spawn {
                path: path.to_string(),
                source,
            })?;

        let stdin = child.stdin.take().expect("engine stdin is piped");
        let stdout = child.stdout.take().expect("engine stdout is piped");

        let mut engine = UciEngine {
            path: path.to_string(),
            child,
            stdin,
            stdout: BufReader::new(stdout),
            options: HashMap::new(),
        };

        engine.send("uci")?;
        loop {
            let line = engine.read_line()?;
            if line.starts_with("option ") {
                if let Some((name, info)) = parse_option_line(&line) {
                    engine.options.insert(name, info);
                }
            }
            if line.starts_with("uciok") {
                break;
            }
        }
        debug!(path, options = engine.options.len(), "engine started");
        Ok(engine)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Parsed attributes for an advertised option, or None if the engine
    /// does not support it.
    pub fn get_option(&self, name: &str) -> Option<&UciOption> {
        self.options.get(name)
    }

    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), UciError> {
        self.send(&format!("setoption name {name} value {value}"))
    }

    fn send(&mut self, command: &str) -> Result<(), UciError> {
        trace!(path = %self.path, "> {command}");
        self.stdin.write_all(command.as_bytes())?;
        self.stdin.write_all(b"\n")?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, UciError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(UciError::EngineClosed);
        }
        let line = line.trim().to_string();
        trace!(path = %self.path, "< {line}");
        Ok(line)
    }

    fn read_until(&mut self, prefix: &str) -> Result<String, UciError> {
        loop {
            let line = self.read_line()?;
            if line.starts_with(prefix) {
                return Ok(line);
            }
        }
    }
}

impl MoveProvider for UciEngine {
    fn label(&self) -> &str {
        &self.path
    }

    fn new_game(&mut self) -> Result<(), UciError> {
        self.send("ucinewgame")?;
        self.send("isready")?;
        self.read_until("readyok")?;
        Ok(())
    }

    fn go(
        &mut self,
        moves: &[String],
        movetime_ms: u64,
    ) -> Result<(String, Option<i32>), UciError> {
        if moves.is_empty() {
            self.send("position startpos")?;
        } else {
            self.send(&format!("position startpos moves {}", moves.join(" ")))?;
        }
        self.send(&format!("go movetime {movetime_ms}"))?;

        let mut score_cp: Option<i32> = None;
        loop {
            let line = self.read_line()?;
            if let Some(rest) = line.strip_prefix("bestmove") {
                let best = match rest.split_whitespace().next() {
                    Some(tok) => tok.to_string(),
                    None => return Err(UciError::Protocol(line)),
                };
                return Ok((best, score_cp));
            }
            if let Some(score) = parse_info_score(&line) {
                score_cp = Some(score);
            }
        }
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        // Polite quit first, force-kill if the process lingers.
        if self.send("quit").is_err() {
            warn!(path = %self.path, "engine stdin already closed at shutdown");
        }
        for _ in 0..50 {
            match self.child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) => thread::sleep(Duration::from_millis(100)),
                Err(_) => break,
            }
        }
        warn!(path = %self.path, "engine did not exit on quit, killing");
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Parse a UCI `option` line into its name and attributes.
///
/// Option names may span several tokens; the name ends at the first
/// attribute keyword.
fn parse_option_line(line: &str) -> Option<(String, UciOption)> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 4 || tokens[0] != "option" || tokens[1] != "name" {
        return None;
    }

    const KEYWORDS: [&str; 5] = ["type", "default", "min", "max", "var"];
    let mut name_parts: Vec<&str> = Vec::new();
    let mut i = 2;
    while i < tokens.len() && !KEYWORDS.contains(&tokens[i]) {
        name_parts.push(tokens[i]);
        i += 1;
    }
    if name_parts.is_empty() {
        return None;
    }

    let mut info = UciOption::default();
    while i < tokens.len() {
        let key = tokens[i];
        i += 1;
        if i >= tokens.len() {
            break;
        }
        match key {
            "type" => {
                info.kind = Some(tokens[i].to_string());
                i += 1;
            }
            "default" => {
                info.default = Some(tokens[i].to_string());
                i += 1;
            }
            "min" => {
                info.min = Some(tokens[i].to_string());
                i += 1;
            }
            "max" => {
                info.max = Some(tokens[i].to_string());
                i += 1;
            }
            _ => {}
        }
    }

    Some((name_parts.join(" "), info))
}

/// Extract a centipawn score from an `info` line, mapping mate scores to
/// ±`MATE_SCORE` (`mate 0` means the side to move is checkmated).
fn parse_info_score(line: &str) -> Option<i32> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let idx = tokens.iter().position(|&t| t == "score")?;
    match (tokens.get(idx + 1), tokens.get(idx + 2)) {
        (Some(&"cp"), Some(value)) => value.parse().ok(),
        (Some(&"mate"), Some(value)) => {
            let mate_in: i32 = value.parse().ok()?;
            if mate_in > 0 {
                Some(MATE_SCORE)
            } else {
                Some(-MATE_SCORE)
            }
        }
        _ => None,
    }
}
