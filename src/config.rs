// Configuration module for reading Snake.toml
// Every tunable of the search, the evaluator and the opponent heuristics lives here

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub timing: TimingConfig,
    pub search: SearchConfig,
    pub scores: ScoresConfig,
    pub heuristics: HeuristicsConfig,
    pub game_rules: GameRulesConfig,
    pub appearance: AppearanceConfig,
    pub debug: DebugConfig,
}

/// Deadline derivation
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    /// Upper bound applied to the game's own timeout
    pub timeout_cap_ms: u64,
    /// Subtracted from the timeout to cover network latency
    pub safety_margin_ms: u64,
    /// 0 means the search only stops on deadline or board budget
    pub max_search_depth: u32,
}

impl TimingConfig {
    /// Computes the effective computation budget for a game timeout
    pub fn effective_budget_ms(&self, game_timeout_ms: u64) -> u64 {
        game_timeout_ms
            .min(self.timeout_cap_ms)
            .saturating_sub(self.safety_margin_ms)
    }
}

/// Board tree limits and pruning switches
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub max_boards: usize,
    pub dominance_pruning: bool,
    pub duplicate_pruning: bool,
}

/// Evaluation weights
#[derive(Debug, Deserialize, Clone)]
pub struct ScoresConfig {
    /// Multiplier of food cells in the food array (other cells weigh 1)
    pub food_weight: i64,
    /// Multiplier of the central 3x3 in the center-weight array (other cells weigh 1)
    pub center_control_weight: i64,
    pub area_multiplier: i64,
    pub food_score: i64,
    pub murder_score: i64,
    pub win_score: i64,
    pub self_eliminated_score: i64,
}

/// Opponent move pruning knobs
#[derive(Debug, Deserialize, Clone)]
pub struct HeuristicsConfig {
    /// Opponents whose head is farther than this from ours get pruned candidates
    pub opponent_prune_distance: i32,
    pub straight_ahead_on_odd_turns: bool,
}

/// Game rules constants
#[derive(Debug, Deserialize, Clone)]
pub struct GameRulesConfig {
    pub max_health: i32,
    pub health_loss_per_turn: i32,
    /// Used when the ruleset does not send hazardDamagePerTurn
    pub default_hazard_damage: i32,
}

/// Metadata returned on GET /
#[derive(Debug, Deserialize, Clone)]
pub struct AppearanceConfig {
    pub author: String,
    pub color: String,
    pub head: String,
    pub tail: String,
    pub version: String,
    /// Empty string disables the shout
    pub shout: String,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Snake.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Snake.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Snake.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Snake.toml
    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig {
                timeout_cap_ms: 500,
                safety_margin_ms: 100,
                max_search_depth: 0,
            },
            search: SearchConfig {
                max_boards: 50_000,
                dominance_pruning: true,
                duplicate_pruning: true,
            },
            scores: ScoresConfig {
                food_weight: 5,
                center_control_weight: 2,
                area_multiplier: 1,
                food_score: 100,
                murder_score: 100,
                win_score: 1000,
                self_eliminated_score: 0,
            },
            heuristics: HeuristicsConfig {
                opponent_prune_distance: 4,
                straight_ahead_on_odd_turns: true,
            },
            game_rules: GameRulesConfig {
                max_health: 100,
                health_loss_per_turn: 1,
                default_hazard_damage: 14,
            },
            appearance: AppearanceConfig {
                author: "voronoi-snake".to_string(),
                color: "#00DEAD".to_string(),
                head: "default".to_string(),
                tail: "default".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                shout: String::new(),
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "battlesnake_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Snake.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }
}
