// Replay module for analyzing historical game states and debugging decision-making
//
// This module provides functionality to:
// 1. Parse JSONL debug logs written by `debug_logger`
// 2. Re-run the search on historical states (in parallel across turns)
// 3. Compare logged vs replayed moves
// 4. Generate analysis reports

use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::bot::Bot;
use crate::config::Config;
use crate::types::{Battlesnake, Board, Direction, Game, Ruleset};

/// Timeout assumed for log lines recorded without game metadata
const DEFAULT_GAME_TIMEOUT_MS: u32 = 500;

/// Represents a single log entry from the debug JSONL file
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogEntry {
    pub turn: u32,
    pub chosen_move: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub depth: Option<u32>,
    #[serde(default)]
    pub game: Option<Game>,
    #[serde(default)]
    pub you: Option<Battlesnake>,
    pub board: Board,
    #[serde(default)]
    pub timestamp: String,
}

impl LogEntry {
    /// The snake that made the logged move; older logs without `you` use the first snake
    pub fn our_snake(&self) -> Result<&Battlesnake, String> {
        match &self.you {
            Some(you) => Ok(you),
            None => self
                .board
                .snakes
                .first()
                .ok_or_else(|| format!("Turn {}: no snakes found in board state", self.turn)),
        }
    }

    /// Logged game metadata, or a standard game when the line predates it
    pub fn game_or_default(&self) -> Game {
        self.game.clone().unwrap_or_else(|| Game {
            id: "replay".to_string(),
            ruleset: Ruleset::default(),
            map: String::new(),
            timeout: DEFAULT_GAME_TIMEOUT_MS,
            source: String::new(),
        })
    }
}

/// Result of replaying a single turn
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub turn: u32,
    pub original_move: Direction,
    pub replayed_move: Direction,
    pub matches: bool,
    pub original_score: Option<f64>,
    pub replayed_score: f64,
    pub search_depth: u32,
    pub boards: usize,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing debug logs
pub struct ReplayEngine {
    bot: Bot,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine {
            bot: Bot::new(config),
            verbose,
        }
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<LogEntry>, String> {
        let file = File::open(log_path.as_ref())
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: LogEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Runs the search on one logged state with the same budget a live request would get
    pub fn replay_turn(&self, entry: &LogEntry) -> Result<ReplayResult, String> {
        let you = entry.our_snake()?;
        let game = entry.game_or_default();
        let original_move = Direction::parse(&entry.chosen_move)?;

        let start_time = Instant::now();
        let budget = self
            .bot
            .config()
            .timing
            .effective_budget_ms(game.timeout as u64);
        let deadline = start_time + Duration::from_millis(budget);

        let result = self
            .bot
            .compute_move(&game, entry.turn, &entry.board, you, deadline)?;

        Ok(ReplayResult {
            turn: entry.turn,
            original_move,
            replayed_move: result.direction,
            matches: original_move == result.direction,
            original_score: entry.score,
            replayed_score: result.score,
            search_depth: result.stats.depth_completed,
            boards: result.stats.boards,
            computation_time_ms: start_time.elapsed().as_millis(),
        })
    }

    /// Replays a single log entry and reports the comparison when verbose
    pub fn replay_entry(&self, entry: &LogEntry) -> Result<ReplayResult, String> {
        if self.verbose {
            info!("Replaying turn {}...", entry.turn);
        }

        let result = self.replay_turn(entry)?;

        if self.verbose {
            if result.matches {
                info!(
                    "Turn {}: ✓ MATCH - {} (score: {:.1}, depth: {}, time: {}ms)",
                    result.turn,
                    result.replayed_move.as_str(),
                    result.replayed_score,
                    result.search_depth,
                    result.computation_time_ms
                );
            } else {
                warn!(
                    "Turn {}: ✗ MISMATCH - Original: {}, Replayed: {} (score: {:.1}, depth: {}, time: {}ms)",
                    result.turn,
                    result.original_move.as_str(),
                    result.replayed_move.as_str(),
                    result.replayed_score,
                    result.search_depth,
                    result.computation_time_ms
                );
            }
        }

        Ok(result)
    }

    /// Replays all entries in a log file, one search per rayon worker.
    /// Results come back in log order; turns that fail to replay are skipped with a warning.
    pub fn replay_all(&self, entries: &[LogEntry]) -> Vec<ReplayResult> {
        entries
            .par_iter()
            .map(|entry| (entry.turn, self.replay_entry(entry)))
            .collect::<Vec<_>>()
            .into_iter()
            .filter_map(|(turn, outcome)| match outcome {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", turn, e);
                    None
                }
            })
            .collect()
    }

    /// Replays specific turns from a log file
    pub fn replay_turns(
        &self,
        entries: &[LogEntry],
        turn_numbers: &[u32],
    ) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for turn_num in turn_numbers {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn_num)
                .ok_or_else(|| format!("Turn {} not found in log file", turn_num))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", turn_num, e);
                }
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Turns:    {}", stats.total_turns);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let count = results.len() as f64;
            let avg_time = results.iter().map(|r| r.computation_time_ms as f64).sum::<f64>() / count;
            let avg_depth = results.iter().map(|r| r.search_depth as f64).sum::<f64>() / count;
            let avg_boards = results.iter().map(|r| r.boards as f64).sum::<f64>() / count;

            println!("Average Search Depth:       {:.1}", avg_depth);
            println!("Average Boards Explored:    {:.0}", avg_boards);
            println!("Average Computation Time:   {:.1}ms\n", avg_time);
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                let original = result
                    .original_score
                    .map(|s| format!("{:.1}", s))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "Turn {}: {} → {} (logged score: {}, replayed score: {:.1}, depth: {}, time: {}ms)",
                    result.turn,
                    result.original_move.as_str(),
                    result.replayed_move.as_str(),
                    original,
                    result.replayed_score,
                    result.search_depth,
                    result.computation_time_ms
                );
            }
            println!();
        }
    }

    /// Validates that specific expected moves were made
    pub fn validate_expected_moves(
        &self,
        entries: &[LogEntry],
        expected_moves: &[(u32, Vec<Direction>)], // (turn, acceptable_moves)
    ) -> Result<(), String> {
        for (turn, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn)
                .ok_or_else(|| format!("Turn {} not found in log", turn))?;

            let actual_move = Direction::parse(&entry.chosen_move)?;

            if !acceptable.contains(&actual_move) {
                return Err(format!(
                    "Turn {}: Expected one of {:?}, but got {}",
                    turn,
                    acceptable.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    actual_move.as_str()
                ));
            }
        }

        Ok(())
    }
}
