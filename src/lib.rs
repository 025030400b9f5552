pub mod camera;
pub mod config;
pub mod engine;
pub mod events;
pub mod grid;
pub mod io;
pub mod parse_rle;
pub mod pattern;
pub mod rule_set;
pub mod simulation;

mod parse_util;

pub use engine::advance;
pub use engine::step;
pub use grid::Grid;

pub type ScreenSize = u16;
pub type WorldOffset = i64;
