use smallvec::SmallVec;
use std::fmt;

/// Flat position of a cell: `level * rows * columns + row * columns + column`.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct CellIndex(pub usize);

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type CellIndexSmallVec = SmallVec<[CellIndex; 4]>;

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum CompassPrimary {
    North,
    South,
    East,
    West,
}

impl CompassPrimary {
    pub fn opposite(self) -> CompassPrimary {
        match self {
            CompassPrimary::North => CompassPrimary::South,
            CompassPrimary::South => CompassPrimary::North,
            CompassPrimary::East => CompassPrimary::West,
            CompassPrimary::West => CompassPrimary::East,
        }
    }
}

pub const ALL_DIRECTIONS: [CompassPrimary; 4] = [CompassPrimary::North,
                                                 CompassPrimary::South,
                                                 CompassPrimary::East,
                                                 CompassPrimary::West];

/// A grid position with structural neighbour slots and the passages carved out of it.
///
/// Neighbours and links are plain indices into the owning `Grid`, never references, so a cell
/// can be moved or dropped without invalidating any other cell.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cell {
    index: CellIndex,
    north: Option<CellIndex>,
    south: Option<CellIndex>,
    east: Option<CellIndex>,
    west: Option<CellIndex>,
    links: CellIndexSmallVec,
}

impl Cell {
    pub fn new(index: CellIndex) -> Cell {
        Cell {
            index,
            north: None,
            south: None,
            east: None,
            west: None,
            links: SmallVec::new(),
        }
    }

    #[inline]
    pub fn index(&self) -> CellIndex {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: CellIndex) {
        self.index = index;
    }

    #[inline]
    pub fn neighbour(&self, dir: CompassPrimary) -> Option<CellIndex> {
        match dir {
            CompassPrimary::North => self.north,
            CompassPrimary::South => self.south,
            CompassPrimary::East => self.east,
            CompassPrimary::West => self.west,
        }
    }

    pub fn set_neighbour(&mut self, dir: CompassPrimary, neighbour: Option<CellIndex>) {
        let slot = match dir {
            CompassPrimary::North => &mut self.north,
            CompassPrimary::South => &mut self.south,
            CompassPrimary::East => &mut self.east,
            CompassPrimary::West => &mut self.west,
        };
        *slot = neighbour;
    }

    /// Structurally adjacent cells, whether or not a passage joins them.
    pub fn neighbours(&self) -> CellIndexSmallVec {
        ALL_DIRECTIONS.iter().filter_map(|dir| self.neighbour(*dir)).collect()
    }

    /// Record a passage to `other`. Re-linking is a no-op.
    pub fn add_link(&mut self, other: CellIndex) {
        if !self.is_linked(other) {
            self.links.push(other);
        }
    }

    /// Returns true if a passage was removed.
    pub fn remove_link(&mut self, other: CellIndex) -> bool {
        if let Some(pos) = self.links.iter().position(|&l| l == other) {
            self.links.remove(pos);
            true
        } else {
            false
        }
    }

    /// Linear scan, a cell has at most four passages.
    #[inline]
    pub fn is_linked(&self, other: CellIndex) -> bool {
        self.links.contains(&other)
    }

    pub fn is_neighbour_linked(&self, dir: CompassPrimary) -> bool {
        self.neighbour(dir).map_or(false, |n| self.is_linked(n))
    }

    #[inline]
    pub fn links(&self) -> &[CellIndex] {
        &self.links
    }

    pub fn has_links(&self) -> bool {
        !self.links.is_empty()
    }

    pub(crate) fn clear_links(&mut self) {
        self.links.clear();
    }

    /// Point any passage to `old` at `new` instead. Neighbour slots are geometry and stay put.
    pub(crate) fn relink(&mut self, old: CellIndex, new: CellIndex) {
        for link in self.links.iter_mut() {
            if *link == old {
                *link = new;
            }
        }
    }
}
