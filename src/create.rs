use tracing::{debug, warn};

use crate::config::MazeConfig;
use crate::grid_factory::{GridFactory, MazeGrid};
use crate::randomizer::Randomizer;

/// Generate one maze and keep hold of it.
///
/// Builds the grid through `factory`, carves it with the configured algorithm seeded by the
/// configured seed, then lets the grid compute any distances it displays. None if any step fails.
pub fn create_maze(factory: &GridFactory, config: &MazeConfig) -> Option<Box<dyn MazeGrid>> {
    let mut maze = factory.create_from_config(config)?;

    let mut rng = Randomizer::new(config.seed());
    if !config.algorithm().carve(maze.grid_mut(), &mut rng) {
        warn!("[create] {} could not carve {:?}", config.algorithm(), maze.grid());
        return None;
    }
    if !maze.configure() {
        warn!("[create] distances unavailable for {:?}", maze.grid());
        return None;
    }
    debug!("[create] {} with seed {} carved {} cells",
           config.algorithm(),
           config.seed(),
           maze.grid().num_cells());
    Some(maze)
}

/// Generate one maze and render it as text. An empty string means the maze could not be built.
pub fn create(factory: &GridFactory, config: &MazeConfig) -> String {
    create_maze(factory, config).map_or_else(String::new, |maze| maze.to_text())
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;
    use crate::generators::Algorithm;

    fn text_for(config: &MazeConfig) -> String {
        create(&GridFactory::new(), config)
    }

    #[test]
    fn same_seed_same_text() {
        let config = MazeConfig::new()
            .with_rows(5)
            .with_columns(5)
            .with_algorithm(Algorithm::BinaryTree)
            .with_seed(12345);
        let first = text_for(&config);
        let second = text_for(&config);
        assert!(!first.is_empty());
        assert_eq!(first, second);
        assert!(first.starts_with("+---+---+---+---+---+\n"));
        assert_eq!(first.lines().count(), 1 + 2 * 5 + 1);
    }

    #[test]
    fn seeds_and_algorithms_change_the_maze() {
        let base = MazeConfig::new().with_rows(8).with_columns(8);
        let texts: Vec<String> = [Algorithm::BinaryTree, Algorithm::Sidewinder, Algorithm::DepthFirstSearch]
            .iter()
            .map(|a| text_for(&base.with_algorithm(*a).with_seed(1)))
            .collect();
        assert_ne!(texts[0], texts[1]);
        assert_ne!(texts[1], texts[2]);
        assert_ne!(text_for(&base.with_seed(1)), text_for(&base.with_seed(2)));
    }

    #[test]
    fn distances_show_up_in_the_text() {
        let config = MazeConfig::new().with_rows(4).with_columns(4).with_seed(7).with_distances(true);
        let text = text_for(&config);
        assert!(text.contains(" 0 "));
    }

    #[test]
    fn lazily_built_grids_render_whole() {
        let config = MazeConfig::new()
            .with_rows(40)
            .with_columns(40)
            .with_algorithm(Algorithm::DepthFirstSearch)
            .with_seed(11);
        let text = text_for(&config);
        assert_eq!(text.lines().count(), 1 + 2 * 40 + 1);
    }

    #[test]
    fn unknown_grid_key_gives_empty_text() {
        let factory = GridFactory::new();
        factory.unregister_creator("grid");
        assert!(create_maze(&factory, &MazeConfig::new()).is_none());
        assert_eq!(create(&factory, &MazeConfig::new()), "");
    }

    #[test]
    fn created_maze_renders_as_its_text() {
        let factory = GridFactory::new();
        let config = MazeConfig::new().with_rows(6).with_columns(7).with_seed(21);
        let maze = create_maze(&factory, &config).unwrap();
        assert_eq!(maze.grid().links_count().0, 6 * 7 - 1);
        assert_eq!(maze.to_text(), create(&factory, &config));
    }

    #[test]
    fn distance_labels_keep_every_line_the_same_width() {
        let config = MazeConfig::new()
            .with_rows(10)
            .with_columns(10)
            .with_algorithm(Algorithm::DepthFirstSearch)
            .with_seed(1)
            .with_distances(true);
        let text = text_for(&config);
        let widths: Vec<usize> = text.lines()
            .filter(|l| !l.is_empty())
            .map(|l| l.chars().count())
            .unique()
            .collect();
        assert_eq!(widths.len(), 1, "{}", text);
    }
}
