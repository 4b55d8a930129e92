use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;
use tracing::debug;

use crate::cells::{CellIndex, CompassPrimary};
use crate::errors::{Error, ErrorKind};
use crate::grid::Grid;
use crate::randomizer::Randomizer;


/// The carving algorithms, dispatched by `carve`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Algorithm {
    BinaryTree,
    Sidewinder,
    DepthFirstSearch,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::BinaryTree => "binary_tree",
            Algorithm::Sidewinder => "sidewinder",
            Algorithm::DepthFirstSearch => "dfs",
        }
    }

    /// Carve passages into `grid`. False if the grid has no cells to carve.
    pub fn carve(self, grid: &mut Grid, rng: &mut Randomizer) -> bool {
        debug!("[generators] {} over {:?}", self, grid);
        match self {
            Algorithm::BinaryTree => binary_tree(grid, rng),
            Algorithm::Sidewinder => sidewinder(grid, rng),
            Algorithm::DepthFirstSearch => depth_first_search(grid, rng),
        }
    }
}

impl Default for Algorithm {
    fn default() -> Algorithm {
        Algorithm::BinaryTree
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Algorithm, Error> {
        match s {
            "binary_tree" => Ok(Algorithm::BinaryTree),
            "sidewinder" => Ok(Algorithm::Sidewinder),
            "dfs" => Ok(Algorithm::DepthFirstSearch),
            _ => Err(ErrorKind::InvalidAlgorithm(s.to_string()).into()),
        }
    }
}

/// Apply the binary tree maze generation algorithm to a grid.
/// Each cell carves a passage either north or east, picked at random among those that exist.
/// Fixing the two directions for the whole run is what keeps the maze perfect, at the cost of
/// an unbroken corridor along the northern row and the eastern column.
pub fn binary_tree(grid: &mut Grid, rng: &mut Randomizer) -> bool {
    if grid.size() == 0 {
        return false;
    }
    let range = grid.lazy_range();
    range.visit(grid, |grid, index| {
        let neighbours: SmallVec<[CellIndex; 2]> = [CompassPrimary::North, CompassPrimary::East]
            .iter()
            .filter_map(|dir| grid.neighbour_at_direction(index, *dir))
            .collect();

        if !neighbours.is_empty() {
            let link_index = neighbours[rng.get_int(0, neighbours.len() - 1)];
            let _ = grid.link(index, link_index, true);
        }
    });
    true
}

/// Apply the sidewinder maze generation algorithm to the grid.
/// Visits each row west to east, growing a run of cells joined eastwards. When a run closes, one
/// random member of it carves north and the run starts over. Runs always close at the eastern
/// boundary and never close in the northern row, which becomes a single corridor.
pub fn sidewinder(grid: &mut Grid, rng: &mut Randomizer) -> bool {
    if grid.size() == 0 {
        return false;
    }
    for row in grid.iter_row() {
        let mut run: Vec<CellIndex> = vec![];

        for index in row {
            grid.materialize(index);
            run.push(index);

            let east = grid.neighbour_at_direction(index, CompassPrimary::East);
            let at_eastern_boundary = east.is_none();
            let at_northern_boundary =
                grid.neighbour_at_direction(index, CompassPrimary::North).is_none();

            let should_close_out = at_eastern_boundary ||
                                   (!at_northern_boundary && rng.get_int(0, 1) == 0);

            if should_close_out {
                let run_member = run[rng.get_int(0, run.len() - 1)];
                if let Some(north) = grid.neighbour_at_direction(run_member, CompassPrimary::North) {
                    let _ = grid.link(run_member, north, true);
                }
                run.clear();
            } else if let Some(east) = east {
                let _ = grid.link(index, east, true);
            }
        }
    }
    true
}

/// Randomized depth first search, backtracking with an explicit stack.
/// A cell with no passages yet counts as unvisited. Levels share no walls, so each level is
/// carved from its own start cell.
pub fn depth_first_search(grid: &mut Grid, rng: &mut Randomizer) -> bool {
    let level_size = grid.dimensions().level_size();
    if grid.size() == 0 || level_size == 0 {
        return false;
    }

    for level in 0..grid.levels().0 {
        let start = CellIndex(level * level_size + rng.get_int(0, level_size - 1));
        grid.materialize(start);
        let mut stack = vec![start];

        while let Some(&current) = stack.last() {
            let unvisited: SmallVec<[CellIndex; 4]> = grid.neighbours(current)
                .into_iter()
                .filter(|n| !grid.cell(*n).map_or(false, |c| c.has_links()))
                .collect();

            if unvisited.is_empty() {
                stack.pop();
            } else {
                let next = unvisited[rng.get_int(0, unvisited.len() - 1)];
                grid.materialize(next);
                let _ = grid.link(current, next, true);
                stack.push(next);
            }
        }
    }
    true
}
