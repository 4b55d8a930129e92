//! **mazes** is a maze generation and route finding library.
//!
//! Grids are arenas of cells keyed by flat index. Large grids materialize their cells on demand,
//! small ones are populated up front by the `GridFactory`. Mazes are carved by the `Algorithm`
//! strategies and rendered as ASCII text, optionally annotated with distances. Many mazes can be
//! generated at once on a `BatchGenerator` thread pool.

pub mod batch;
pub mod cells;
pub mod config;
pub mod create;
pub mod errors;
pub mod generators;
pub mod grid;
pub mod grid_dimensions;
pub mod grid_displays;
pub mod grid_factory;
pub mod grid_iterators;
pub mod index_tree;
pub mod pathing;
pub mod randomizer;
pub mod units;
mod utils;
