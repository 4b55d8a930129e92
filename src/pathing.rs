use std::collections::VecDeque;
use std::fmt::{Debug, Display};
use std::ops::Add;

use num::traits::{Bounded, One, ToPrimitive, Unsigned, Zero};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::cells::CellIndex;
use crate::grid::Grid;
use crate::utils::{self, FnvHashMap};


// Trait (hack) used purely as a generic type parameter alias because it looks ugly to type this out each time
pub trait MaxDistance
    : Zero + One + Bounded + Unsigned + Add + ToPrimitive + Debug + Clone + Copy + Display + Ord
    {
}
impl<T: Zero + One + Bounded + Unsigned + Add + ToPrimitive + Debug + Clone + Copy + Display + Ord> MaxDistance for T {}


/// Link-graph distances from a root cell.
///
/// A field is either *seeded*, holding only the root and its direct passages, or *complete*, after
/// a breadth first pass over every reachable cell. Path queries need a complete field.
#[derive(Debug, Clone)]
pub struct Distances<MaxDistanceT = u32> {
    root: CellIndex,
    distances: FnvHashMap<CellIndex, MaxDistanceT>,
    complete: bool,
}

impl<MaxDistanceT> Distances<MaxDistanceT>
    where MaxDistanceT: MaxDistance
{
    /// Root at distance zero and every cell one passage away at distance one.
    ///
    /// None if `root` is not a materialized cell of the grid.
    pub fn seeded(grid: &Grid, root: CellIndex) -> Option<Distances<MaxDistanceT>> {
        let links = grid.links(root)?;
        let mut distances = utils::fnv_hashmap(links.len() + 1);
        distances.insert(root, Zero::zero());
        for link in links {
            distances.insert(*link, One::one());
        }
        Some(Distances {
            root,
            distances,
            complete: false,
        })
    }

    /// A complete field: seeded then expanded.
    pub fn for_grid(grid: &Grid, root: CellIndex) -> Option<Distances<MaxDistanceT>> {
        let mut distances = Distances::seeded(grid, root)?;
        distances.expand(grid);
        Some(distances)
    }

    /// Breadth first over passages from the root, recording the first distance seen for each cell.
    ///
    /// The walk stops at the largest distance `MaxDistanceT` can hold; cells any farther are left
    /// without a distance.
    pub fn expand(&mut self, grid: &Grid) {
        self.distances.clear();
        self.distances.insert(self.root, Zero::zero());

        let mut saturated = false;
        let mut frontier = VecDeque::new();
        frontier.push_back(self.root);
        while let Some(current) = frontier.pop_front() {
            let distance_to_current = match self.distances.get(&current) {
                Some(d) => *d,
                None => continue,
            };
            if distance_to_current == MaxDistanceT::max_value() {
                saturated = true;
                continue;
            }
            let links = match grid.links(current) {
                Some(links) => links,
                None => continue,
            };
            for link in links {
                if !self.distances.contains_key(link) {
                    self.distances.insert(*link, distance_to_current + One::one());
                    frontier.push_back(*link);
                }
            }
        }
        if saturated {
            warn!("[pathing] distances from {} stop at {}, cells beyond are left out",
                  self.root,
                  MaxDistanceT::max_value());
        }
        self.complete = true;
        debug!("[pathing] distances from {} reach {} cells", self.root, self.distances.len());
    }

    #[inline(always)]
    pub fn root(&self) -> CellIndex {
        self.root
    }

    #[inline(always)]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    #[inline(always)]
    pub fn get(&self, index: CellIndex) -> Option<MaxDistanceT> {
        self.distances.get(&index).cloned()
    }

    #[inline(always)]
    pub fn contains(&self, index: CellIndex) -> bool {
        self.distances.contains_key(&index)
    }

    pub fn set(&mut self, index: CellIndex, distance: MaxDistanceT) {
        self.distances.insert(index, distance);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Cells with a recorded distance, ascending by index.
    pub fn cells(&self) -> Vec<CellIndex> {
        let mut cells: Vec<CellIndex> = self.distances.keys().cloned().collect();
        cells.sort();
        cells
    }

    /// Cells ordered by distance from the root, ties by index.
    pub fn ordered_cells(&self) -> Vec<CellIndex> {
        let mut cells: Vec<(MaxDistanceT, CellIndex)> = self.distances
            .iter()
            .map(|(index, d)| (*d, *index))
            .collect();
        cells.sort();
        cells.into_iter().map(|(_, index)| index).collect()
    }

    /// The farthest cell and its distance. Ties go to the lowest index.
    pub fn max(&self) -> (CellIndex, MaxDistanceT) {
        let mut furthest = (self.root, Zero::zero());
        for (index, d) in self.distances.iter() {
            if *d > furthest.1 || (*d == furthest.1 && *index < furthest.0) {
                furthest = (*index, *d);
            }
        }
        furthest
    }

    pub fn furthest_points(&self) -> SmallVec<[CellIndex; 8]> {
        let (_, furthest_distance) = self.max();
        let mut furthest: SmallVec<[CellIndex; 8]> = self.distances
            .iter()
            .filter(|(_, d)| **d == furthest_distance)
            .map(|(index, _)| *index)
            .collect();
        furthest.sort();
        furthest
    }

    /// The breadcrumbs of one shortest path from the root to `goal`.
    ///
    /// Walks back from `goal`, stepping each time to a linked cell one closer to the root. None if
    /// the field is not complete, or `goal` is unreachable.
    pub fn path_to(&self, grid: &Grid, goal: CellIndex) -> Option<Distances<MaxDistanceT>> {
        if !self.complete {
            warn!("[pathing] path_to({}) on a seeded distance field, run expand first", goal);
            return None;
        }
        let mut current_distance = self.get(goal)?;
        let mut breadcrumbs = Distances {
            root: self.root,
            distances: utils::fnv_hashmap(current_distance.to_usize().unwrap_or(0) + 1),
            complete: true,
        };
        breadcrumbs.set(goal, current_distance);

        let mut current = goal;
        while current != self.root {
            let step_back = current_distance - One::one();
            let closer = grid.links(current)?
                .iter()
                .filter(|link| self.get(**link) == Some(step_back))
                .min()
                .cloned()?;
            breadcrumbs.set(closer, step_back);
            current = closer;
            current_distance = step_back;
        }
        Some(breadcrumbs)
    }
}

/// One shortest path between the two ends of a double breadth first sweep.
///
/// The far end of a sweep from an arbitrary cell starts the path, and the far end of a sweep from
/// there finishes it. In a perfect maze that is the longest path.
pub fn longest_path<MaxDistanceT: MaxDistance>(grid: &Grid) -> Option<Distances<MaxDistanceT>> {
    let arbitrary_start = grid.to_vec().first().map(|c| c.index())?;
    let first = Distances::<MaxDistanceT>::for_grid(grid, arbitrary_start)?;
    let (path_start, _) = first.max();
    let from_start = Distances::<MaxDistanceT>::for_grid(grid, path_start)?;
    let (path_end, _) = from_start.max();
    from_start.path_to(grid, path_end)
}


#[cfg(test)]
mod tests {
    use quickcheck::{quickcheck, TestResult};

    use super::*;
    use crate::generators::Algorithm;
    use crate::randomizer::Randomizer;
    use crate::units::{ColumnsCount, LevelsCount, RowsCount};

    type SmallDistances = Distances<u8>;

    fn open_grid(r: usize, c: usize) -> Grid {
        let mut g = Grid::new(RowsCount(r), ColumnsCount(c), LevelsCount(1));
        g.populate();
        g
    }

    // 2x2 grid, every wall between the four cells opened
    fn open_square() -> Grid {
        let mut g = open_grid(2, 2);
        g.link(CellIndex(0), CellIndex(1), true).expect("Link Failed");
        g.link(CellIndex(0), CellIndex(2), true).expect("Link Failed");
        g.link(CellIndex(1), CellIndex(3), true).expect("Link Failed");
        g.link(CellIndex(2), CellIndex(3), true).expect("Link Failed");
        g
    }

    #[test]
    fn construction_requires_materialized_root() {
        let g = Grid::new(RowsCount(40), ColumnsCount(40), LevelsCount(1));
        assert!(SmallDistances::for_grid(&g, CellIndex(0)).is_none());
        let g = open_grid(3, 3);
        assert!(SmallDistances::for_grid(&g, CellIndex(9)).is_none());
    }

    #[test]
    fn unreachable_cells_have_no_distance() {
        let g = open_grid(3, 3);
        let distances = SmallDistances::for_grid(&g, CellIndex(4)).unwrap();
        assert_eq!(distances.root(), CellIndex(4));
        assert_eq!(distances.get(CellIndex(4)), Some(0));
        for i in (0..9).filter(|i| *i != 4) {
            assert_eq!(distances.get(CellIndex(i)), None);
        }
        assert_eq!(distances.max(), (CellIndex(4), 0));
    }

    #[test]
    fn distances_on_open_grid() {
        let g = open_square();
        let distances = SmallDistances::for_grid(&g, CellIndex(0)).unwrap();
        assert_eq!(distances.get(CellIndex(0)), Some(0));
        assert_eq!(distances.get(CellIndex(1)), Some(1));
        assert_eq!(distances.get(CellIndex(2)), Some(1));
        assert_eq!(distances.get(CellIndex(3)), Some(2));
        assert_eq!(distances.max(), (CellIndex(3), 2));
        assert_eq!(&*distances.furthest_points(), &[CellIndex(3)]);
        assert_eq!(distances.cells(), vec![CellIndex(0), CellIndex(1), CellIndex(2), CellIndex(3)]);
    }

    #[test]
    fn seeded_field_is_one_hop_only() {
        let mut g = open_grid(1, 3);
        g.link(CellIndex(0), CellIndex(1), true).unwrap();
        g.link(CellIndex(1), CellIndex(2), true).unwrap();

        let mut distances = SmallDistances::seeded(&g, CellIndex(0)).unwrap();
        assert!(!distances.is_complete());
        assert_eq!(distances.get(CellIndex(1)), Some(1));
        assert_eq!(distances.get(CellIndex(2)), None);
        assert!(distances.path_to(&g, CellIndex(1)).is_none());

        distances.expand(&g);
        assert!(distances.is_complete());
        assert_eq!(distances.get(CellIndex(2)), Some(2));
        assert!(distances.path_to(&g, CellIndex(2)).is_some());
    }

    #[test]
    fn forced_path_through_three_by_three() {
        // a snake 0-1-2-5-4-3-6-7-8 through every cell
        let mut g = open_grid(3, 3);
        let snake = [0, 1, 2, 5, 4, 3, 6, 7, 8];
        for pair in snake.windows(2) {
            g.link(CellIndex(pair[0]), CellIndex(pair[1]), true).unwrap();
        }
        let distances = SmallDistances::for_grid(&g, CellIndex(0)).unwrap();
        let path = distances.path_to(&g, CellIndex(8)).unwrap();

        assert_eq!(path.len(), 9);
        let walked: Vec<usize> = path.ordered_cells().iter().map(|c| c.0).collect();
        assert_eq!(walked, snake.to_vec());
        let steps: Vec<u8> = path.ordered_cells().iter().map(|c| path.get(*c).unwrap()).collect();
        assert_eq!(steps, (0..9).collect::<Vec<u8>>());
    }

    #[test]
    fn path_to_unreachable_goal_is_none() {
        let mut g = open_grid(2, 2);
        g.link(CellIndex(0), CellIndex(1), true).unwrap();
        let distances = SmallDistances::for_grid(&g, CellIndex(0)).unwrap();
        assert!(distances.path_to(&g, CellIndex(3)).is_none());
    }

    #[test]
    fn longest_path_of_a_corridor() {
        let mut g = open_grid(1, 5);
        for i in 0..4 {
            g.link(CellIndex(i), CellIndex(i + 1), true).unwrap();
        }
        let path = longest_path::<u32>(&g).unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path.max().1, 4);
    }

    #[test]
    fn narrow_distances_stop_at_their_maximum() {
        let mut g = open_grid(1, 300);
        for i in 0..299 {
            g.link(CellIndex(i), CellIndex(i + 1), true).unwrap();
        }
        let distances = SmallDistances::for_grid(&g, CellIndex(0)).unwrap();
        assert!(distances.is_complete());
        assert_eq!(distances.len(), 256);
        assert_eq!(distances.get(CellIndex(255)), Some(255));
        assert_eq!(distances.get(CellIndex(256)), None);
        assert_eq!(distances.max(), (CellIndex(255), 255));
        assert_eq!(distances.path_to(&g, CellIndex(255)).map(|p| p.len()), Some(256));

        let wide = Distances::<u32>::for_grid(&g, CellIndex(0)).unwrap();
        assert_eq!(wide.get(CellIndex(299)), Some(299));
    }

    #[test]
    fn bfs_distances_step_down_to_the_root() {
        fn p(seed: u64, rows: u8, columns: u8, root: usize) -> TestResult {
            let (rows, columns) = (rows as usize % 12 + 1, columns as usize % 12 + 1);
            let mut g = open_grid(rows, columns);
            let mut rng = Randomizer::new(seed);
            if !Algorithm::DepthFirstSearch.carve(&mut g, &mut rng) {
                return TestResult::failed();
            }
            let root = CellIndex(root % g.size());
            let distances = match Distances::<u32>::for_grid(&g, root) {
                Some(d) => d,
                None => return TestResult::failed(),
            };
            for index in distances.cells() {
                let d = distances.get(index).unwrap_or(u32::max_value());
                if (d == 0) != (index == root) {
                    return TestResult::failed();
                }
                if d > 0 {
                    let has_closer = g.links(index)
                        .map_or(false, |ls| ls.iter().any(|l| distances.get(*l) == Some(d - 1)));
                    if !has_closer {
                        return TestResult::failed();
                    }
                }
            }
            TestResult::from_bool(distances.len() == g.size())
        }
        quickcheck(p as fn(u64, u8, u8, usize) -> TestResult);
    }
}
