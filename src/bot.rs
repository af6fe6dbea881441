// Welcome to
// __________         __    __  .__                               __
// \______   \_____ _/  |__/  |_|  |   ____   ______ ____ _____  |  | __ ____
//  |    |  _/\__  \\   __\   __\  | _/ __ \ /  ___//    \\__  \ |  |/ // __ \
//  |    |   \ / __ \|  |  |  | |  |_\  ___/ \___ \|   |  \/ __ \|    <\  ___/
//  |________/(______/__|  |__| |____/\_____>______>___|__(______/__|__\\_____>
//
// Endpoint logic: metadata, game start/end, and move selection.
// The move itself comes from the area-of-control search in `search`.

use log::{error, info};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use crate::board::BoardState;
use crate::config::Config;
use crate::debug_logger::DebugLogger;
use crate::search::{self, SearchResult};
use crate::types::{Battlesnake, Board, Direction, Game};

/// Move engine behind the HTTP endpoints.
/// Owns the tuning config and the JSONL move recorder; each move request builds its own search.
pub struct Bot {
    config: Config,
    debug_logger: DebugLogger,
}

impl Bot {
    /// Creates a Bot whose moves are not recorded
    pub fn new(config: Config) -> Self {
        Bot {
            config,
            debug_logger: DebugLogger::disabled(),
        }
    }

    /// Creates a Bot that records every move to the given debug logger
    pub fn with_debug_logger(config: Config, debug_logger: DebugLogger) -> Self {
        Bot {
            config,
            debug_logger,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns bot metadata and appearance
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        let appearance = &self.config.appearance;
        json!({
            "apiversion": "1",
            "author": appearance.author,
            "color": appearance.color,
            "head": appearance.head,
            "tail": appearance.tail,
            "version": appearance.version,
        })
    }

    /// Called when a game starts
    /// Corresponds to POST /start endpoint
    pub fn start(&self, game: &Game, _turn: &u32, board: &Board, _you: &Battlesnake) -> Value {
        info!(
            "GAME START {} ({} {}x{}, {} snakes)",
            game.id,
            game.ruleset.name,
            board.width,
            board.height,
            board.snakes.len()
        );
        json!({ "message": "ok" })
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, game: &Game, turn: &u32, _board: &Board, _you: &Battlesnake) -> Value {
        info!("GAME OVER {} after {} turns", game.id, turn);
        json!({ "message": "ok" })
    }

    /// Deadline for a request received at `received`:
    /// min(game timeout, cap) minus the safety margin
    pub fn deadline_for(&self, game: &Game, received: Instant) -> Instant {
        let budget = self.config.timing.effective_budget_ms(game.timeout as u64);
        received + Duration::from_millis(budget)
    }

    /// Computes and returns the next move
    /// Corresponds to POST /move endpoint
    ///
    /// The search is CPU-bound, so it runs on tokio's blocking pool and the
    /// handler awaits its result. The search stops itself at the deadline.
    ///
    /// # Returns
    /// * `Ok(Value)` - JSON response containing the chosen move direction
    /// * `Err(String)` - the request describes an impossible board
    pub async fn get_move(
        &self,
        game: &Game,
        turn: &u32,
        board: &Board,
        you: &Battlesnake,
    ) -> Result<Value, String> {
        let received = Instant::now();
        let root = BoardState::from_api(game, *turn, board, you, &self.config.game_rules)?;
        let deadline = self.deadline_for(game, received);

        info!("Turn {}: Computing move", turn);

        let config = self.config.clone();
        let outcome =
            tokio::task::spawn_blocking(move || search::search(root, deadline, &config)).await;

        let chosen_move = match outcome {
            Ok(result) => {
                Self::log_result(*turn, &result, received);
                self.debug_logger.log_move(
                    *turn,
                    game.clone(),
                    you.clone(),
                    board.clone(),
                    &result,
                );
                result.direction
            }
            Err(e) => {
                error!("Turn {}: search task failed ({}), answering up", turn, e);
                Direction::Up
            }
        };

        let mut response = json!({ "move": chosen_move.as_str() });
        if !self.config.appearance.shout.is_empty() {
            response["shout"] = json!(self.config.appearance.shout);
        }
        Ok(response)
    }

    /// Synchronous move computation with an explicit deadline, used by the replay tooling
    pub fn compute_move(
        &self,
        game: &Game,
        turn: u32,
        board: &Board,
        you: &Battlesnake,
        deadline: Instant,
    ) -> Result<SearchResult, String> {
        let root = BoardState::from_api(game, turn, board, you, &self.config.game_rules)?;
        Ok(search::search(root, deadline, &self.config))
    }

    fn log_result(turn: u32, result: &SearchResult, received: Instant) {
        info!(
            "Turn {}: Chose {} (score: {:.1}, depth: {}, boards: {}, dominated: {}, duplicates: {}, time: {}ms)",
            turn,
            result.direction.as_str(),
            result.score,
            result.stats.depth_completed,
            result.stats.boards,
            result.stats.dominated,
            result.stats.duplicates,
            received.elapsed().as_millis()
        );
        for entry in &result.direction_scores {
            info!(
                "Turn {}:   {:<5} {:.1} over {} boards",
                turn,
                entry.direction.as_str(),
                entry.score,
                entry.boards
            );
        }
    }
}
