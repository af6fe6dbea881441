// Library exports for the area-of-control Battlesnake
// This allows the replay tool and other utilities to use the core search logic

pub mod area_control;
pub mod board;
pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod eval;
pub mod expander;
pub mod grid;
pub mod replay;
pub mod rules;
pub mod search;
pub mod snake;
pub mod types;
