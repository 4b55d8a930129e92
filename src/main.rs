use docopt::Docopt;
use error_chain::bail;
use serde_derive::Deserialize;
use mazes::{
    batch::BatchGenerator,
    config::{MazeConfig, OutputFormat},
    create::create_maze,
    generators::Algorithm,
    grid_factory::{GridFactory, MazeGrid},
};
use std::{
    io,
    io::prelude::*,
    fs::File,
    sync::Arc,
};
use tracing::{debug, Level};

const USAGE: &str = "Mazes

Usage:
    mazes_driver -h | --help
    mazes_driver [--rows=<r>] [--columns=<c>] [--levels=<l>] [--algorithm=<a>] [--seed=<s>] [--distances] [--output=<o>] [--text-out=<path>] [--save-edges=<path>] [--verbose]
    mazes_driver batch <count> [--rows=<r>] [--columns=<c>] [--levels=<l>] [--algorithm=<a>] [--seed=<s>] [--distances] [--output=<o>] [--text-out=<path>] [--workers=<n>] [--verbose]

Options:
    -h --help              Show this screen.
    --rows=<r>             Rows per level, clamped to 1..=100 [default: 10].
    --columns=<c>          Columns per level, clamped to 1..=100 [default: 10].
    --levels=<l>           Stacked levels, clamped to 1..=10 [default: 1].
    --algorithm=<a>        One of binary_tree, sidewinder or dfs [default: binary_tree].
    --seed=<s>             Seed for the random choices while carving. A batch uses seed, seed+1, ... [default: 0].
    --distances            Annotate the longest path with base 36 distances from its start.
    --output=<o>           One of txt, text or stdout [default: txt].
    --text-out=<path>      Output file path for the text rendering. Printed to stdout when not given.
    --save-edges=<path>    Serialize the maze to a text file: each line is a pair of numbers. Line 1: n(#vertices) m(#edges). Line 2+ edge between vertices. Uses 1-based vertex indices.
    --workers=<n>          Worker threads generating a batch [default: 4].
    --verbose              Log debug output to stderr.
";
#[derive(Debug, Deserialize)]
struct MazeArgs {
    cmd_batch: bool,
    arg_count: Option<usize>,
    flag_rows: usize,
    flag_columns: usize,
    flag_levels: usize,
    flag_algorithm: String,
    flag_seed: u64,
    flag_distances: bool,
    flag_output: String,
    flag_text_out: String,
    flag_save_edges: String,
    flag_workers: usize,
    flag_verbose: bool,
}

mod errors {
    use error_chain::*;
    error_chain! {
        links {
            Maze(::mazes::errors::Error, ::mazes::errors::ErrorKind);
        }

        foreign_links {
            DocOptFailure(::docopt::Error);
            Io(::std::io::Error);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {

    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if args.flag_verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let config = maze_config_from_args(&args)?;
    debug!("[driver] {:?}", config);

    let factory = Arc::new(GridFactory::new());

    let text = if args.cmd_batch {
        let count = args.arg_count.unwrap_or(1);
        let requests: Vec<MazeConfig> = (0..count as u64)
            .map(|i| config.with_seed(config.seed().wrapping_add(i)))
            .collect();
        BatchGenerator::new(Arc::clone(&factory), args.flag_workers).create_batch(&requests)
    } else {
        let maze = create_maze(&factory, &config)
            .ok_or_else(|| format!("No maze was generated for {:?}", config))?;
        if !args.flag_save_edges.is_empty() {
            save_maze_graph(maze.as_ref(), &args.flag_save_edges)?;
        }
        maze.to_text()
    };

    if text.is_empty() {
        bail!("No maze was generated for {:?}", config);
    }

    if config.output_format() == OutputFormat::Stdout || args.flag_text_out.is_empty() {
        print!("{}", text);
    } else {
        write_text_to_file(&text, &args.flag_text_out)
            .chain_err(|| format!("Failed to write maze to text file {}", args.flag_text_out))?;
    }

    Ok(())
}

fn maze_config_from_args(args: &MazeArgs) -> Result<MazeConfig> {
    let algorithm: Algorithm = args.flag_algorithm.parse()?;
    let output_format: OutputFormat = args.flag_output.parse()?;
    Ok(MazeConfig::new()
        .with_rows(args.flag_rows)
        .with_columns(args.flag_columns)
        .with_levels(args.flag_levels)
        .with_algorithm(algorithm)
        .with_seed(args.flag_seed)
        .with_distances(args.flag_distances)
        .with_output_format(output_format))
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}

fn save_maze_graph(maze: &dyn MazeGrid, file_path: &str) -> Result<()> {
    let grid = maze.grid();

    let mut graph_data = String::new();
    graph_data.push_str(&format!("{} {}\n", grid.size(), grid.links_count().0));
    for (src, dst) in grid.iter_links() {
        graph_data.push_str(&format!("{} {}\n", src.0 + 1, dst.0 + 1));
    }

    write_text_to_file(&graph_data, file_path)
        .chain_err(|| format!("Failed to write maze graph to text file {}", file_path))?;

    Ok(())
}
