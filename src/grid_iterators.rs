use std::cmp;

use crate::cells::{Cell, CellIndex};
use crate::grid::Grid;
use crate::grid_dimensions::GridDimensions;

/// A half open span `[start, end)` of flat cell indices.
///
/// Ranges hold no borrow of the grid, so a carving loop can walk a range while mutating the grid
/// it came from. With `creating_cells(true)` a visit materializes each cell before handing it out,
/// which bounds memory on huge grids to the cells a walk actually reaches.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GridRange {
    start: usize,
    end: usize,
    create_missing: bool,
}

impl GridRange {
    pub fn full(dimensions: &GridDimensions) -> GridRange {
        GridRange {
            start: 0,
            end: dimensions.size().0,
            create_missing: false,
        }
    }

    /// Clamped to the grid, so an oversized `end` stops at the last cell.
    pub fn between(dimensions: &GridDimensions, start: CellIndex, end: CellIndex) -> GridRange {
        let total = dimensions.size().0;
        let end = cmp::min(end.0, total);
        GridRange {
            start: cmp::min(start.0, end),
            end,
            create_missing: false,
        }
    }

    pub fn creating_cells(self, create_missing: bool) -> GridRange {
        GridRange { create_missing, ..self }
    }

    #[inline]
    pub fn creates_cells(&self) -> bool {
        self.create_missing
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn indices(&self) -> GridCellIter {
        GridCellIter {
            current: self.start,
            end: self.end,
        }
    }

    /// Call `f` for each index of the range in ascending order.
    ///
    /// Missing cells are built first when the range creates cells, and skipped otherwise.
    pub fn visit<F>(&self, grid: &mut Grid, mut f: F)
        where F: FnMut(&mut Grid, CellIndex)
    {
        for index in self.indices() {
            if self.create_missing {
                grid.materialize(index);
            } else if !grid.contains(index) {
                continue;
            }
            f(grid, index);
        }
    }

    /// The materialized cells of the range. Never creates anything.
    pub fn cells<'a>(&self, grid: &'a Grid) -> impl Iterator<Item = &'a Cell> + 'a {
        self.indices().filter_map(move |index| grid.cell(index))
    }
}

#[derive(Debug, Clone)]
pub struct GridCellIter {
    current: usize,
    end: usize,
}

impl ExactSizeIterator for GridCellIter {} // default impl using size_hint()
impl Iterator for GridCellIter {
    type Item = CellIndex;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current < self.end {
            let index = CellIndex(self.current);
            self.current += 1;
            Some(index)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.current;
        (remaining, Some(remaining))
    }
}

/// One row of indices at a time, every level in turn.
#[derive(Debug, Clone)]
pub struct BatchIter {
    current_row: usize,
    rows_count: usize,
    columns: usize,
}

impl BatchIter {
    pub fn rows(dimensions: &GridDimensions) -> BatchIter {
        BatchIter {
            current_row: 0,
            rows_count: dimensions.rows().0 * dimensions.levels().0,
            columns: dimensions.columns().0,
        }
    }
}

impl ExactSizeIterator for BatchIter {}
impl Iterator for BatchIter {
    type Item = Vec<CellIndex>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row < self.rows_count {
            let first = self.current_row * self.columns;
            self.current_row += 1;
            Some((first..first + self.columns).map(CellIndex).collect())
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rows_count - self.current_row;
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{ColumnsCount, LevelsCount, RowsCount};

    fn dims(r: usize, c: usize, l: usize) -> GridDimensions {
        GridDimensions::new(RowsCount(r), ColumnsCount(c), LevelsCount(l))
    }

    #[test]
    fn full_and_sub_ranges() {
        let d = dims(2, 3, 1);
        let full: Vec<usize> = GridRange::full(&d).indices().map(|i| i.0).collect();
        assert_eq!(full, vec![0, 1, 2, 3, 4, 5]);

        let sub = GridRange::between(&d, CellIndex(2), CellIndex(4));
        assert_eq!(sub.indices().map(|i| i.0).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(sub.len(), 2);

        let clamped = GridRange::between(&d, CellIndex(4), CellIndex(100));
        assert_eq!(clamped.indices().len(), 2);
        assert!(GridRange::between(&d, CellIndex(9), CellIndex(12)).is_empty());
    }

    #[test]
    fn lazy_visit_builds_only_visited_cells() {
        let mut g = Grid::new(RowsCount(100), ColumnsCount(100), LevelsCount(1));
        let range = GridRange::between(g.dimensions(), CellIndex(0), CellIndex(3)).creating_cells(true);
        let mut seen = vec![];
        range.visit(&mut g, |grid, index| {
            assert!(grid.contains(index));
            seen.push(index.0);
        });
        assert_eq!(seen, vec![0, 1, 2]);
        // the visited cells plus their east and south neighbours
        assert_eq!(g.num_cells(), 7);
    }

    #[test]
    fn plain_visit_skips_missing_cells() {
        let mut g = Grid::new(RowsCount(3), ColumnsCount(3), LevelsCount(1));
        g.insert(CellIndex(4));
        let mut seen = vec![];
        g.range().visit(&mut g, |_, index| seen.push(index.0));
        assert_eq!(seen, vec![4]);
        assert_eq!(g.num_cells(), 1);
        assert_eq!(g.range().cells(&g).count(), 1);
    }

    #[test]
    fn row_batches_cover_every_level() {
        let d = dims(2, 2, 2);
        let rows: Vec<Vec<usize>> = BatchIter::rows(&d)
            .map(|row| row.into_iter().map(|i| i.0).collect())
            .collect();
        assert_eq!(rows, vec![vec![0, 1], vec![2, 3], vec![4, 5], vec![6, 7]]);
    }
}
