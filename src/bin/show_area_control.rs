// Prints the area-of-control map for one turn of a debug log
//
// Usage:
//   cargo run --bin show_area_control -- <log_file.jsonl> <turn_number> [--config <path>]
//
// Cells show our BFS distance where we get there strictly first, '*' for food we
// control, '.' where an opponent ties or wins, '#' for bodies and heads.

use std::env;
use std::process;

use voronoi_snake::area_control::is_wall;
use voronoi_snake::board::BoardState;
use voronoi_snake::config::Config;
use voronoi_snake::eval::Evaluator;
use voronoi_snake::replay::{LogEntry, ReplayEngine};
use voronoi_snake::types::Coord;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: show_area_control <game_file.jsonl> <turn_number> [--config <path>]");
        process::exit(1);
    }

    let target_turn: u32 = match args[2].parse() {
        Ok(turn) => turn,
        Err(e) => {
            eprintln!("Turn must be a number: {}", e);
            process::exit(1);
        }
    };
    let config_path = match args.iter().position(|a| a == "--config") {
        Some(i) => args.get(i + 1).cloned().unwrap_or_else(|| "Snake.toml".to_string()),
        None => "Snake.toml".to_string(),
    };
    let config = Config::from_file(&config_path).unwrap_or_else(|_| Config::default_hardcoded());

    let engine = ReplayEngine::new(config.clone(), false);
    let entries = engine.load_log_file(&args[1]).unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(1);
    });

    let entry = match entries.iter().find(|e| e.turn == target_turn) {
        Some(entry) => entry,
        None => {
            eprintln!("Turn {} not found", target_turn);
            process::exit(1);
        }
    };

    if let Err(e) = show(entry, &config) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn show(entry: &LogEntry, config: &Config) -> Result<(), String> {
    let you = entry.our_snake()?;
    let game = entry.game_or_default();
    let board = BoardState::from_api(&game, entry.turn, &entry.board, you, &config.game_rules)?;
    let area = board.area_of_control();
    let evaluator = Evaluator::new(&config.scores, board.width, board.height);

    println!("═══════════════════════════════════════════════════════════");
    println!("          TURN {} AREA OF CONTROL", entry.turn);
    println!("═══════════════════════════════════════════════════════════\n");
    println!(
        "Our Snake: {} (health={}, length={})",
        you.name,
        you.health,
        board.my_snake.length()
    );
    println!("Logged move: {}", entry.chosen_move);
    println!("Controlled cells: {}", area.controlled_cells());
    println!("Static score: {:.1}\n", evaluator.evaluate(&board));

    for y in (0..board.height).rev() {
        let mut line = format!("{:>3} ", y);
        for x in 0..board.width {
            let coord = Coord::new(x, y);
            let mine = area.my_area.get(coord);
            let cell = if is_wall(area.bodies[0].get(coord)) || coord == board.my_snake.head() {
                "#".to_string()
            } else if board.food.contains(&coord) && mine > 0 {
                "*".to_string()
            } else if mine > 0 {
                mine.to_string()
            } else {
                ".".to_string()
            };
            line.push_str(&format!("{:>3}", cell));
        }
        println!("{}", line);
    }

    let mut footer = "    ".to_string();
    for x in 0..board.width {
        footer.push_str(&format!("{:>3}", x));
    }
    println!("{}\n", footer);

    for (slice, snake) in area.distances.iter().zip(board.living_snakes()) {
        let reachable = slice.interior().filter(|&(_, d)| d > 0).count();
        let farthest = slice.interior().map(|(_, d)| d).max().unwrap_or(0);
        println!(
            "{:<20} head ({}, {}) reaches {} cells, farthest {} moves away",
            snake.id,
            snake.head().x,
            snake.head().y,
            reachable,
            farthest
        );
    }

    Ok(())
}
