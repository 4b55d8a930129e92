use std::cmp;
use std::fmt;

use itertools::Itertools;
use tracing::debug;

use crate::cells::{Cell, CellIndex, CellIndexSmallVec, CompassPrimary, ALL_DIRECTIONS};
use crate::grid_dimensions::GridDimensions;
use crate::grid_iterators::{BatchIter, GridRange};
use crate::index_tree::IndexTree;
use crate::units::{ColumnsCount, LevelsCount, LinksCount, NodesCount, RowsCount};
use crate::utils::{self, FnvHashMap, FnvHashSet};


#[derive(Debug, Clone)]
struct Slot {
    // creation serial, higher is more recent
    serial: u64,
    cell: Cell,
}

/// Arena of cells keyed by flat index, plus an ordered tree of the indices materialized so far.
///
/// A grid starts empty. `populate` builds every cell up front; otherwise cells come into being
/// through `materialize`, `search` or a lazy `GridRange`, so memory tracks the cells actually
/// visited rather than the total the dimensions allow.
///
/// A `Grid` is not shared between threads while it is being carved.
#[derive(Clone)]
pub struct Grid {
    dimensions: GridDimensions,
    slots: FnvHashMap<CellIndex, Slot>,
    tree: IndexTree,
    next_serial: u64,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum CellLinkError {
    MissingCell(CellIndex),
    SelfLink,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "Grid :: rows: {}, columns: {}, levels: {}, materialized: {}",
               self.rows(),
               self.columns(),
               self.levels(),
               self.num_cells())
    }
}

impl Grid {
    pub fn new(rows: RowsCount, columns: ColumnsCount, levels: LevelsCount) -> Grid {
        Grid::with_dimensions(GridDimensions::new(rows, columns, levels))
    }

    pub fn with_dimensions(dimensions: GridDimensions) -> Grid {
        Grid {
            dimensions,
            slots: utils::fnv_hashmap(0),
            tree: IndexTree::new(),
            next_serial: 0,
        }
    }

    #[inline]
    pub fn dimensions(&self) -> &GridDimensions {
        &self.dimensions
    }

    #[inline]
    pub fn rows(&self) -> RowsCount {
        self.dimensions.rows()
    }

    #[inline]
    pub fn columns(&self) -> ColumnsCount {
        self.dimensions.columns()
    }

    #[inline]
    pub fn levels(&self) -> LevelsCount {
        self.dimensions.levels()
    }

    /// Total cells the dimensions allow, materialized or not.
    #[inline]
    pub fn size(&self) -> usize {
        self.dimensions.size().0
    }

    /// Cells materialized so far.
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_fully_populated(&self) -> bool {
        self.num_cells() == self.size()
    }

    /// Eagerly build and wire every cell.
    pub fn populate(&mut self) {
        let NodesCount(total) = self.dimensions.size();
        debug!("[grid] eager population of {} cells", total);
        self.slots.reserve(total.saturating_sub(self.slots.len()));
        for i in 0..total {
            let _ = self.create_cell(CellIndex(i));
        }
    }

    /// Build the cell at `index` and its structural neighbours if they do not exist yet.
    ///
    /// Returns the indices created by this call, empty if all were present or `index` is out of range.
    pub fn materialize(&mut self, index: CellIndex) -> CellIndexSmallVec {
        let mut created = CellIndexSmallVec::new();
        if !self.dimensions.is_valid_index(index) {
            return created;
        }
        if self.create_cell(index) {
            created.push(index);
        }
        for dir in ALL_DIRECTIONS.iter() {
            if let Some(n) = self.dimensions.offset(index, *dir) {
                if self.create_cell(n) {
                    created.push(n);
                }
            }
        }
        created
    }

    /// The cell at `index` if it has been materialized.
    #[inline]
    pub fn cell(&self, index: CellIndex) -> Option<&Cell> {
        self.slots.get(&index).map(|slot| &slot.cell)
    }

    #[inline]
    pub fn contains(&self, index: CellIndex) -> bool {
        self.slots.contains_key(&index)
    }

    /// Find the cell at `index`, materializing it and its neighbours on a miss.
    ///
    /// None only when `index` lies outside the grid.
    pub fn search(&mut self, index: CellIndex) -> Option<&Cell> {
        if !self.contains(index) {
            self.materialize(index);
        }
        self.cell(index)
    }

    /// As `search`, but walks the index tree beginning at the subtree rooted at `start`.
    pub fn search_from(&mut self, start: CellIndex, index: CellIndex) -> Option<&Cell> {
        if !self.tree.search_from(start, index) {
            self.materialize(index);
        }
        self.cell(index)
    }

    /// Add one cell without touching its neighbours. False if present or out of range.
    pub fn insert(&mut self, index: CellIndex) -> bool {
        self.create_cell(index)
    }

    /// Move the cell at `old` to `new`, carrying its passages along.
    ///
    /// Fails with no change if `old` is absent, or `new` is occupied or out of range.
    pub fn update(&mut self, old: CellIndex, new: CellIndex) -> bool {
        if old == new {
            return self.contains(old);
        }
        if !self.dimensions.is_valid_index(new) || !self.tree.update(old, new) {
            return false;
        }
        let mut slot = match self.slots.remove(&old) {
            Some(slot) => slot,
            None => return false,
        };
        slot.cell.set_index(new);
        for dir in ALL_DIRECTIONS.iter() {
            slot.cell.set_neighbour(*dir, self.dimensions.offset(new, *dir));
        }
        for partner in slot.cell.links().to_vec() {
            if let Some(p) = self.slots.get_mut(&partner) {
                p.cell.relink(old, new);
            }
        }
        self.slots.insert(new, slot);
        true
    }

    /// Remove the cell at `index` and every passage into it.
    pub fn delete(&mut self, index: CellIndex) -> bool {
        let slot = match self.slots.remove(&index) {
            Some(slot) => slot,
            None => return false,
        };
        self.tree.delete(index);
        for partner in slot.cell.links() {
            if let Some(p) = self.slots.get_mut(partner) {
                p.cell.remove_link(index);
            }
        }
        true
    }

    /// Carve a passage from `a` to `b`, and back again when `bidi`.
    ///
    /// Both cells must already be materialized; on error nothing changes.
    pub fn link(&mut self, a: CellIndex, b: CellIndex, bidi: bool) -> Result<(), CellLinkError> {
        if a == b {
            return Err(CellLinkError::SelfLink);
        }
        for index in &[a, b] {
            if !self.contains(*index) {
                return Err(CellLinkError::MissingCell(*index));
            }
        }
        if let Some(slot) = self.slots.get_mut(&a) {
            slot.cell.add_link(b);
        }
        if bidi {
            if let Some(slot) = self.slots.get_mut(&b) {
                slot.cell.add_link(a);
            }
        }
        Ok(())
    }

    /// Returns true if any passage was removed.
    pub fn unlink(&mut self, a: CellIndex, b: CellIndex, bidi: bool) -> bool {
        let mut removed = self.slots.get_mut(&a).map_or(false, |slot| slot.cell.remove_link(b));
        if bidi {
            removed |= self.slots.get_mut(&b).map_or(false, |slot| slot.cell.remove_link(a));
        }
        removed
    }

    /// Is there a passage from `a` to `b`?
    pub fn is_linked(&self, a: CellIndex, b: CellIndex) -> bool {
        self.cell(a).map_or(false, |c| c.is_linked(b))
    }

    pub fn is_neighbour_linked(&self, index: CellIndex, dir: CompassPrimary) -> bool {
        self.cell(index).map_or(false, |c| c.is_neighbour_linked(dir))
    }

    /// Cells joined to `index` by a passage. None if the cell is not materialized.
    pub fn links(&self, index: CellIndex) -> Option<&[CellIndex]> {
        self.cell(index).map(|c| c.links())
    }

    /// Structural neighbours, derived from the dimensions whether or not they are materialized.
    pub fn neighbours(&self, index: CellIndex) -> CellIndexSmallVec {
        ALL_DIRECTIONS.iter()
            .filter_map(|dir| self.dimensions.offset(index, *dir))
            .collect()
    }

    #[inline]
    pub fn neighbour_at_direction(&self, index: CellIndex, dir: CompassPrimary) -> Option<CellIndex> {
        self.dimensions.offset(index, dir)
    }

    /// Every passage once, as an ascending `(low, high)` pair, sorted.
    ///
    /// A one way link is listed like a two way passage between the same cells.
    pub fn iter_links(&self) -> Vec<(CellIndex, CellIndex)> {
        let mut pairs: FnvHashSet<(CellIndex, CellIndex)> = utils::fnv_hashset(self.slots.len() * 2);
        for slot in self.slots.values() {
            let from = slot.cell.index();
            pairs.extend(slot.cell.links().iter().map(|to| (cmp::min(from, *to), cmp::max(from, *to))));
        }
        pairs.into_iter().sorted().collect()
    }

    pub fn links_count(&self) -> LinksCount {
        LinksCount(self.iter_links().len())
    }

    /// Drop every passage, keeping the cells.
    pub fn clear_cells(&mut self) {
        for slot in self.slots.values_mut() {
            slot.cell.clear_links();
        }
    }

    /// Row major snapshot of the materialized cells.
    ///
    /// Cells are ordered most recently created first, then stably by index, so the result never
    /// depends on hash order or creation order.
    pub fn to_vec(&self) -> Vec<&Cell> {
        let mut ordered: Vec<&Slot> = self.slots.values().collect();
        ordered.sort_by(|x, y| y.serial.cmp(&x.serial));
        ordered.sort_by_key(|slot| slot.cell.index());
        ordered.into_iter().map(|slot| &slot.cell).collect()
    }

    /// `to_vec` split into rows. Rows with no materialized cells are skipped.
    pub fn to_vec2(&self) -> Vec<Vec<&Cell>> {
        let columns = self.columns().0;
        self.to_vec()
            .into_iter()
            .group_by(|cell| cell.index().0 / columns)
            .into_iter()
            .map(|(_, row)| row.collect())
            .collect()
    }

    /// Materialized indices in ascending order, read from the index tree.
    pub fn indices(&self) -> Vec<CellIndex> {
        self.tree.in_order()
    }

    /// Every index of the grid, without creating anything.
    pub fn range(&self) -> GridRange {
        GridRange::full(&self.dimensions)
    }

    /// Every index of the grid, materializing cells as the range is visited.
    pub fn lazy_range(&self) -> GridRange {
        GridRange::full(&self.dimensions).creating_cells(true)
    }

    pub fn iter_row(&self) -> BatchIter {
        BatchIter::rows(&self.dimensions)
    }

    // Returns true if a cell was created.
    fn create_cell(&mut self, index: CellIndex) -> bool {
        if self.slots.contains_key(&index) || !self.dimensions.is_valid_index(index) {
            return false;
        }
        let mut cell = Cell::new(index);
        for dir in ALL_DIRECTIONS.iter() {
            cell.set_neighbour(*dir, self.dimensions.offset(index, *dir));
        }
        let serial = self.next_serial;
        self.next_serial += 1;
        self.slots.insert(index, Slot { serial, cell });
        self.tree.insert(index);
        true
    }
}
