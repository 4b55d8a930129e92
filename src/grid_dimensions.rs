use crate::cells::{CellIndex, CompassPrimary};
use crate::units::{ColumnIndex, ColumnsCount, LevelIndex, LevelsCount, NodesCount, RowIndex,
                   RowsCount};


/// Rows, columns and levels of a grid, and the flat index arithmetic over them.
///
/// Levels are stacked square grids with no structural adjacency between levels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GridDimensions {
    rows: RowsCount,
    columns: ColumnsCount,
    levels: LevelsCount,
}

impl GridDimensions {
    pub fn new(rows: RowsCount, columns: ColumnsCount, levels: LevelsCount) -> GridDimensions {
        GridDimensions {
            rows,
            columns,
            levels,
        }
    }

    #[inline(always)]
    pub fn rows(&self) -> RowsCount {
        self.rows
    }

    #[inline(always)]
    pub fn columns(&self) -> ColumnsCount {
        self.columns
    }

    #[inline(always)]
    pub fn levels(&self) -> LevelsCount {
        self.levels
    }

    #[inline(always)]
    pub fn level_size(&self) -> usize {
        self.rows.0 * self.columns.0
    }

    /// Total possible cells over every level.
    #[inline(always)]
    pub fn size(&self) -> NodesCount {
        NodesCount(self.level_size() * self.levels.0)
    }

    #[inline]
    pub fn is_valid_index(&self, index: CellIndex) -> bool {
        index.0 < self.size().0
    }

    /// Returns None if the row, column or level is out of range.
    pub fn encode(&self, row: RowIndex, column: ColumnIndex, level: LevelIndex) -> Option<CellIndex> {
        if row.0 < self.rows.0 && column.0 < self.columns.0 && level.0 < self.levels.0 {
            Some(CellIndex(level.0 * self.level_size() + row.0 * self.columns.0 + column.0))
        } else {
            None
        }
    }

    pub fn decode(&self, index: CellIndex) -> Option<(RowIndex, ColumnIndex, LevelIndex)> {
        if !self.is_valid_index(index) {
            return None;
        }
        let level = index.0 / self.level_size();
        let within_level = index.0 % self.level_size();
        Some((RowIndex(within_level / self.columns.0),
              ColumnIndex(within_level % self.columns.0),
              LevelIndex(level)))
    }

    /// The structurally adjacent index in a direction, None at a grid boundary.
    pub fn offset(&self, index: CellIndex, dir: CompassPrimary) -> Option<CellIndex> {
        let (RowIndex(row), ColumnIndex(col), level) = self.decode(index)?;
        let (row, col) = match dir {
            CompassPrimary::North => (row.checked_sub(1)?, col),
            CompassPrimary::South => (row + 1, col),
            CompassPrimary::East => (row, col + 1),
            CompassPrimary::West => (row, col.checked_sub(1)?),
        };
        self.encode(RowIndex(row), ColumnIndex(col), level)
    }
}
