use tracing::debug;

use crate::cells::{CellIndex, CompassPrimary};
use crate::grid::Grid;
use crate::pathing::Distances;
use crate::units::{ColumnIndex, LevelIndex, RowIndex};
use crate::utils;


/// Per cell rendering hooks. The defaults draw an empty passage with no background.
pub trait GridDisplay {
    fn contents_of(&self, _index: CellIndex) -> String {
        String::from(" ")
    }

    /// 24 bit `0xRRGGBB` colour for the cell, if the display has one.
    fn background_color_for(&self, _index: CellIndex) -> Option<u32> {
        None
    }
}

impl GridDisplay for Grid {}

/// Draw the grid with `+`, `-` and `|` walls, one block per level.
///
/// Every cell body is as wide as the longest contents in the grid, centred and padded by one
/// space either side, so the walls stay aligned whatever the labels. Cells that were never
/// materialized have every wall standing.
pub fn render_text<D: GridDisplay + ?Sized>(grid: &Grid, display: &D) -> String {
    let (rows, columns) = (grid.rows().0, grid.columns().0);
    let width = cell_width(grid, display);
    let wall = "-".repeat(width + 2);
    let open = " ".repeat(width + 2);
    let mut output = String::new();

    for level in 0..grid.levels().0 {
        output.push('+');
        for _ in 0..columns {
            output.push_str(&wall);
            output.push('+');
        }
        output.push('\n');

        for row in 0..rows {
            let mut top = String::from("|");
            let mut bottom = String::from("+");
            for column in 0..columns {
                let index = grid.dimensions().encode(RowIndex(row), ColumnIndex(column), LevelIndex(level));
                let (east_open, south_open, body) = match index {
                    Some(index) => (grid.is_neighbour_linked(index, CompassPrimary::East),
                                    grid.is_neighbour_linked(index, CompassPrimary::South),
                                    display.contents_of(index)),
                    None => (false, false, String::from(" ")),
                };
                top.push_str(&format!(" {:^width$} ", body, width = width));
                top.push(if east_open { ' ' } else { '|' });
                bottom.push_str(if south_open { &open } else { &wall });
                bottom.push('+');
            }
            output.push_str(&top);
            output.push('\n');
            output.push_str(&bottom);
            output.push('\n');
        }
    }
    output.push('\n');
    output
}

// Widest contents of any cell, at least one character.
fn cell_width<D: GridDisplay + ?Sized>(grid: &Grid, display: &D) -> usize {
    grid.range()
        .cells(grid)
        .map(|cell| display.contents_of(cell.index()).chars().count())
        .max()
        .unwrap_or(1)
        .max(1)
}

/// A grid that annotates the cells of a long path with their base 36 distance from its start.
///
/// `configure` sweeps breadth first from the first cell, roots a distance field at the farthest
/// cell found, and keeps the path from that root to the last cell of the first level. When that
/// cell is unreachable the whole field is shown instead.
#[derive(Debug, Clone)]
pub struct DistanceGrid {
    grid: Grid,
    distances: Option<Distances<u32>>,
}

impl DistanceGrid {
    pub fn new(grid: Grid) -> DistanceGrid {
        DistanceGrid {
            grid,
            distances: None,
        }
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn distances(&self) -> Option<&Distances<u32>> {
        self.distances.as_ref()
    }

    /// Compute the displayed distances from the current passages. False if the grid has no cells.
    pub fn configure(&mut self) -> bool {
        self.distances = None;
        let first = match self.grid.to_vec().first() {
            Some(cell) => cell.index(),
            None => return false,
        };
        let sweep = match Distances::<u32>::for_grid(&self.grid, first) {
            Some(d) => d,
            None => return false,
        };
        let (far_end, _) = sweep.max();
        let from_far_end = match Distances::<u32>::for_grid(&self.grid, far_end) {
            Some(d) => d,
            None => return false,
        };
        let anchor = CellIndex(self.grid.dimensions().level_size().saturating_sub(1));

        let path = match from_far_end.path_to(&self.grid, anchor) {
            // rooted at the anchor itself, so run to the other end of the longest path instead
            Some(path) if path.len() <= 1 => from_far_end.path_to(&self.grid, from_far_end.max().0),
            path => path,
        };
        self.distances = match path {
            Some(path) => {
                debug!("[grid_displays] path of {} cells from {}", path.len(), far_end);
                Some(path)
            }
            None => Some(from_far_end),
        };
        true
    }
}

impl GridDisplay for DistanceGrid {
    fn contents_of(&self, index: CellIndex) -> String {
        self.distances
            .as_ref()
            .and_then(|d| d.get(index))
            .map_or_else(|| String::from(" "), |d| utils::to_base36(u64::from(d)))
    }
}

/// A distance grid shaded by how far each cell is along the path, with decimal contents.
#[derive(Debug, Clone)]
pub struct ColoredGrid {
    distance_grid: DistanceGrid,
}

impl ColoredGrid {
    pub fn new(grid: Grid) -> ColoredGrid {
        ColoredGrid { distance_grid: DistanceGrid::new(grid) }
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        self.distance_grid.grid()
    }

    #[inline]
    pub fn grid_mut(&mut self) -> &mut Grid {
        self.distance_grid.grid_mut()
    }

    pub fn configure(&mut self) -> bool {
        self.distance_grid.configure()
    }

    pub fn distances(&self) -> Option<&Distances<u32>> {
        self.distance_grid.distances()
    }
}

/// White at distance zero, fading to green at distance ten and beyond.
pub fn color_for_distance(distance: u32) -> u32 {
    let intensity = ((10.0 - distance as f32) / 10.0).max(0.0).min(1.0);
    let dark = (255.0 * intensity) as u32;
    let bright = 128 + (127.0 * intensity) as u32;
    (dark << 16) | (bright << 8) | dark
}

impl GridDisplay for ColoredGrid {
    fn contents_of(&self, index: CellIndex) -> String {
        self.distances()
            .and_then(|d| d.get(index))
            .map_or_else(|| String::from(" "), |d| d.to_string())
    }

    fn background_color_for(&self, index: CellIndex) -> Option<u32> {
        self.distances().and_then(|d| d.get(index)).map(color_for_distance)
    }
}
