// Deadline-bounded search over successor boards
//
// Boards live in an arena; parents index their children and children keep the
// parent index. The frontier is a FIFO, so boards are expanded level by level.
// A board's score becomes the running mean of its children's scores as they
// are generated, and every change is pushed up to the root.
//
// On deadline or board-budget expiry the root children's current means decide
// the move, whether or not the last level was fully expanded.

use log::{debug, warn};
use std::collections::{HashSet, VecDeque};
use std::time::Instant;

use crate::board::{BoardState, StateKey, TerminalReason};
use crate::config::Config;
use crate::eval::Evaluator;
use crate::expander::{candidate_sets, MoveTuples};
use crate::rules;
use crate::types::Direction;

/// One board in the search arena
#[derive(Debug)]
pub struct Node {
    pub board: BoardState,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub depth: u32,
    child_score_sum: f64,
}

/// Mean score of the root children reached by one of our moves
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionScore {
    pub direction: Direction,
    pub score: f64,
    pub boards: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    pub boards: usize,
    pub dominated: usize,
    pub duplicates: usize,
    /// Deepest level whose boards were all generated
    pub depth_completed: u32,
    pub deadline_hit: bool,
    pub budget_exhausted: bool,
    pub elapsed_ms: u128,
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub direction: Direction,
    pub score: f64,
    pub direction_scores: Vec<DirectionScore>,
    pub stats: SearchStats,
}

/// Runs the search from `root` until `deadline`, the board budget, or tree exhaustion
pub fn search(root: BoardState, deadline: Instant, config: &Config) -> SearchResult {
    let mut search = Search::new(root, deadline, config);
    search.run()
}

pub struct Search<'a> {
    config: &'a Config,
    evaluator: Evaluator,
    nodes: Vec<Node>,
    frontier: VecDeque<usize>,
    deadline: Instant,
    started: Instant,
    stats: SearchStats,
}

impl<'a> Search<'a> {
    pub fn new(mut root: BoardState, deadline: Instant, config: &'a Config) -> Self {
        let evaluator = Evaluator::new(&config.scores, root.width, root.height);
        root.score = evaluator.evaluate(&root);

        Search {
            config,
            evaluator,
            nodes: vec![Node {
                board: root,
                parent: None,
                children: Vec::new(),
                depth: 0,
                child_score_sum: 0.0,
            }],
            frontier: VecDeque::new(),
            deadline,
            started: Instant::now(),
            stats: SearchStats::default(),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn run(&mut self) -> SearchResult {
        if self.nodes[0].board.is_terminal() {
            debug!("Root board is terminal; nothing to search");
            return self.finish(Vec::new());
        }

        // depth 1 is always computed, deadline or not
        self.expand(0, false);
        let mut level = 1;
        if !self.frontier.is_empty() {
            self.stats.depth_completed = 1;
        }

        let max_depth = self.config.timing.max_search_depth;
        let mut exhausted = true;

        while let Some(idx) = self.frontier.pop_front() {
            let depth = self.nodes[idx].depth;
            if depth > level {
                // every board of the previous level has been expanded
                level = depth;
                self.stats.depth_completed = level;
                debug!("Level {} complete: {:?}", level, self.root_scores());
            }

            if Instant::now() >= self.deadline {
                self.stats.deadline_hit = true;
                exhausted = false;
                break;
            }
            if self.nodes.len() >= self.config.search.max_boards {
                warn!(
                    "Board budget of {} reached at depth {}",
                    self.config.search.max_boards, level
                );
                self.stats.budget_exhausted = true;
                exhausted = false;
                break;
            }

            if max_depth != 0 && depth >= max_depth {
                continue;
            }
            if self.nodes[idx].board.is_terminal() {
                continue;
            }

            if !self.expand(idx, true) {
                self.stats.deadline_hit = true;
                exhausted = false;
                break;
            }
        }

        if exhausted {
            self.stats.depth_completed = self.nodes.iter().map(|n| n.depth).max().unwrap_or(0);
        }

        let scores = self.root_scores();
        self.finish(scores)
    }

    /// Streams the children of `idx` into the arena.
    /// Returns false if the deadline interrupted generation.
    fn expand(&mut self, idx: usize, honor_deadline: bool) -> bool {
        let sets = candidate_sets(&self.nodes[idx].board, &self.config.heuristics);
        let depth = self.nodes[idx].depth + 1;
        // duplicates are only looked for among siblings
        let mut siblings: HashSet<StateKey> = HashSet::new();

        for moves in MoveTuples::new(sets) {
            if honor_deadline && Instant::now() >= self.deadline {
                return false;
            }
            if honor_deadline && self.nodes.len() >= self.config.search.max_boards {
                return true;
            }

            let mut child = rules::advance(&self.nodes[idx].board, &moves, &self.config.game_rules);
            child.score = self.evaluator.evaluate(&child);

            if self.config.search.duplicate_pruning
                && !child.is_terminal()
                && !siblings.insert(child.state_key())
            {
                child.terminal_reason = Some(TerminalReason::Duplicate);
                self.stats.duplicates += 1;
            }

            let child_idx = self.nodes.len();
            self.nodes.push(Node {
                board: child,
                parent: Some(idx),
                children: Vec::new(),
                depth,
                child_score_sum: 0.0,
            });
            self.nodes[idx].children.push(child_idx);

            if self.config.search.dominance_pruning {
                self.apply_dominance(idx, child_idx);
            }

            self.integrate(idx, child_idx);

            if !self.nodes[child_idx].board.is_terminal() {
                self.frontier.push_back(child_idx);
            }
        }

        true
    }

    /// Marks the new child dominated by a sibling, and siblings dominated by the new child
    fn apply_dominance(&mut self, parent: usize, child: usize) {
        if self.nodes[child].board.terminal_reason == Some(TerminalReason::SelfEliminated) {
            return;
        }

        let child_metrics = Metrics::of(&self.nodes[child].board);
        let siblings: Vec<usize> = self.nodes[parent]
            .children
            .iter()
            .copied()
            .filter(|&s| s != child)
            .filter(|&s| self.nodes[s].board.terminal_reason != Some(TerminalReason::SelfEliminated))
            .collect();

        let mut child_dominated = false;
        for sibling in siblings {
            let sibling_metrics = Metrics::of(&self.nodes[sibling].board);

            if sibling_metrics.dominates(&child_metrics) {
                child_dominated = true;
            } else if child_metrics.dominates(&sibling_metrics)
                && !self.nodes[sibling].board.is_terminal()
            {
                self.nodes[sibling].board.terminal_reason = Some(TerminalReason::Dominated);
                self.stats.dominated += 1;
            }
        }

        if child_dominated && !self.nodes[child].board.is_terminal() {
            self.nodes[child].board.terminal_reason = Some(TerminalReason::Dominated);
            self.stats.dominated += 1;
        }
    }

    /// Folds a new child into its parent's running mean and pushes the change upward
    fn integrate(&mut self, parent: usize, child: usize) {
        let child_score = self.nodes[child].board.score;
        let node = &mut self.nodes[parent];
        node.child_score_sum += child_score;
        let old = node.board.score;
        node.board.score = node.child_score_sum / node.children.len() as f64;
        let delta = node.board.score - old;
        self.propagate(parent, delta);
    }

    fn propagate(&mut self, mut idx: usize, mut delta: f64) {
        while let Some(parent) = self.nodes[idx].parent {
            if delta == 0.0 {
                break;
            }
            let node = &mut self.nodes[parent];
            node.child_score_sum += delta;
            let old = node.board.score;
            node.board.score = node.child_score_sum / node.children.len() as f64;
            delta = node.board.score - old;
            idx = parent;
        }
    }

    /// Root children grouped by our move, averaged
    fn root_scores(&self) -> Vec<DirectionScore> {
        let root = &self.nodes[0];
        let head = root.board.my_snake.head();

        let mut scores: Vec<DirectionScore> = Vec::new();
        for &child in &root.children {
            let board = &self.nodes[child].board;
            let direction = match Direction::between(head, board.my_snake.head()) {
                Some(d) => d,
                None => continue,
            };
            match scores.iter_mut().find(|s| s.direction == direction) {
                Some(entry) => {
                    entry.score += board.score;
                    entry.boards += 1;
                }
                None => scores.push(DirectionScore {
                    direction,
                    score: board.score,
                    boards: 1,
                }),
            }
        }

        for entry in &mut scores {
            entry.score /= entry.boards as f64;
        }
        scores
    }

    fn finish(&mut self, direction_scores: Vec<DirectionScore>) -> SearchResult {
        self.stats.boards = self.nodes.len();
        self.stats.elapsed_ms = self.started.elapsed().as_millis();

        let (direction, score) = select_direction(&direction_scores);
        SearchResult {
            direction,
            score,
            direction_scores,
            stats: self.stats.clone(),
        }
    }
}

/// Highest mean wins; ties go to the earlier direction in Up, Right, Down, Left.
/// With no scored direction there is no legal move and Up is returned.
pub fn select_direction(scores: &[DirectionScore]) -> (Direction, f64) {
    let mut best: Option<(Direction, f64)> = None;
    for direction in Direction::tie_break_order() {
        if let Some(entry) = scores.iter().find(|s| s.direction == direction) {
            match best {
                Some((_, best_score)) if entry.score <= best_score => {}
                _ => best = Some((direction, entry.score)),
            }
        }
    }
    best.unwrap_or((Direction::Up, f64::NEG_INFINITY))
}

/// Ordered metrics compared for Pareto dominance between siblings
#[derive(Debug, Clone, Copy, PartialEq)]
struct Metrics {
    length: usize,
    murders: u32,
    health: i32,
    score: f64,
}

impl Metrics {
    fn of(board: &BoardState) -> Self {
        Metrics {
            length: board.my_snake.length(),
            murders: board.my_snake.murder_count,
            health: board.my_snake.health,
            score: board.score,
        }
    }

    fn dominates(&self, other: &Metrics) -> bool {
        let no_worse = self.length >= other.length
            && self.murders >= other.murders
            && self.health >= other.health
            && self.score >= other.score;
        let better = self.length > other.length
            || self.murders > other.murders
            || self.health > other.health
            || self.score > other.score;
        no_worse && better
    }
}
