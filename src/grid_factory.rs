//! Registry of named grid constructors.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, error, warn};

use crate::config::MazeConfig;
use crate::grid::Grid;
use crate::grid_displays::{render_text, ColoredGrid, DistanceGrid, GridDisplay};
use crate::utils::{self, FnvHashMap};

/// Grids at or under this many cells are built eagerly, larger ones materialize on demand.
pub const EAGER_POPULATION_LIMIT: usize = 1000;

/// A grid as handed out by the factory: the cells to carve plus how to draw them.
pub trait MazeGrid: GridDisplay + Send {
    fn grid(&self) -> &Grid;

    fn grid_mut(&mut self) -> &mut Grid;

    /// Runs after carving. Displays that derive anything from the passages compute it here.
    fn configure(&mut self) -> bool {
        true
    }

    fn to_text(&self) -> String {
        render_text(self.grid(), self)
    }
}

impl MazeGrid for Grid {
    fn grid(&self) -> &Grid {
        self
    }

    fn grid_mut(&mut self) -> &mut Grid {
        self
    }
}

impl MazeGrid for DistanceGrid {
    fn grid(&self) -> &Grid {
        DistanceGrid::grid(self)
    }

    fn grid_mut(&mut self) -> &mut Grid {
        DistanceGrid::grid_mut(self)
    }

    fn configure(&mut self) -> bool {
        DistanceGrid::configure(self)
    }
}

impl MazeGrid for ColoredGrid {
    fn grid(&self) -> &Grid {
        ColoredGrid::grid(self)
    }

    fn grid_mut(&mut self) -> &mut Grid {
        ColoredGrid::grid_mut(self)
    }

    fn configure(&mut self) -> bool {
        ColoredGrid::configure(self)
    }
}

pub type GridCreator = dyn Fn(&MazeConfig) -> Option<Box<dyn MazeGrid>> + Send + Sync;

fn plain_grid(config: &MazeConfig) -> Grid {
    Grid::new(config.rows(), config.columns(), config.levels())
}

/// Thread safe map from key to grid constructor.
///
/// Starts with `grid`, `distance_grid`, `colored_grid` and `text_grid` registered. A registered key
/// keeps its creator until it is unregistered.
pub struct GridFactory {
    creators: Mutex<FnvHashMap<String, Arc<GridCreator>>>,
}

impl Default for GridFactory {
    fn default() -> GridFactory {
        GridFactory::new()
    }
}

impl GridFactory {
    pub fn new() -> GridFactory {
        let mut creators = utils::fnv_hashmap(8);
        register_default_creators(&mut creators);
        GridFactory { creators: Mutex::new(creators) }
    }

    // A creator that panicked under the lock leaves the map intact, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<FnvHashMap<String, Arc<GridCreator>>> {
        self.creators.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// False for an empty or already registered key.
    pub fn register_creator<F>(&self, key: &str, creator: F) -> bool
        where F: Fn(&MazeConfig) -> Option<Box<dyn MazeGrid>> + Send + Sync + 'static
    {
        if key.is_empty() {
            return false;
        }
        let mut creators = self.lock();
        if creators.contains_key(key) {
            return false;
        }
        creators.insert(key.to_string(), Arc::new(creator));
        true
    }

    pub fn unregister_creator(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn is_registered(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Sorted.
    pub fn get_registered_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Drop every creator and register the defaults again.
    pub fn clear(&self) {
        let mut creators = self.lock();
        creators.clear();
        register_default_creators(&mut creators);
    }

    /// Build a grid with the creator under `key`.
    ///
    /// Small grids come back fully populated, large ones empty. None for an unknown key, or a
    /// creator that returns nothing or panics.
    pub fn create(&self, key: &str, config: &MazeConfig) -> Option<Box<dyn MazeGrid>> {
        let creator = match self.lock().get(key) {
            Some(creator) => Arc::clone(creator),
            None => {
                warn!("[grid_factory] no creator registered for '{}'", key);
                return None;
            }
        };

        let created = panic::catch_unwind(AssertUnwindSafe(|| (*creator)(config)));
        let mut maze = match created {
            Ok(Some(maze)) => maze,
            Ok(None) => {
                warn!("[grid_factory] creator '{}' produced no grid", key);
                return None;
            }
            Err(_) => {
                error!("[grid_factory] creator '{}' panicked", key);
                return None;
            }
        };

        let cells = config.cells_count();
        if cells <= EAGER_POPULATION_LIMIT {
            maze.grid_mut().populate();
        } else {
            debug!("[grid_factory] {} cells, leaving '{}' to materialize lazily", cells, key);
        }
        Some(maze)
    }

    /// Build with the key `key_for` picks for this config.
    pub fn create_from_config(&self, config: &MazeConfig) -> Option<Box<dyn MazeGrid>> {
        self.create(key_for(config), config)
    }
}

/// `distance_grid` when distances are wanted, `grid` otherwise.
pub fn key_for(config: &MazeConfig) -> &'static str {
    if config.distances() {
        "distance_grid"
    } else {
        "grid"
    }
}

fn register_default_creators(creators: &mut FnvHashMap<String, Arc<GridCreator>>) {
    let defaults: [(&str, Arc<GridCreator>); 4] = [
        ("grid", Arc::new(|config: &MazeConfig| {
            Some(Box::new(plain_grid(config)) as Box<dyn MazeGrid>)
        })),
        ("distance_grid", Arc::new(|config: &MazeConfig| {
            Some(Box::new(DistanceGrid::new(plain_grid(config))) as Box<dyn MazeGrid>)
        })),
        ("colored_grid", Arc::new(|config: &MazeConfig| {
            Some(Box::new(ColoredGrid::new(plain_grid(config))) as Box<dyn MazeGrid>)
        })),
        ("text_grid", Arc::new(|config: &MazeConfig| {
            if config.distances() {
                Some(Box::new(DistanceGrid::new(plain_grid(config))) as Box<dyn MazeGrid>)
            } else {
                Some(Box::new(plain_grid(config)) as Box<dyn MazeGrid>)
            }
        })),
    ];
    for (key, creator) in defaults.iter() {
        creators.insert(key.to_string(), Arc::clone(creator));
    }
}
