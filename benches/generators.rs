use criterion::{criterion_group, criterion_main, Criterion};
use mazes::{
    batch::BatchGenerator,
    config::MazeConfig,
    generators::Algorithm,
    grid::Grid,
    grid_factory::GridFactory,
    randomizer::Randomizer,
    units::{ColumnsCount, LevelsCount, RowsCount},
};
use std::sync::Arc;

fn populated_grid(rows: usize, columns: usize) -> Grid {
    let mut g = Grid::new(RowsCount(rows), ColumnsCount(columns), LevelsCount(1));
    g.populate();
    g
}

fn bench_algorithm_32(c: &mut Criterion, algorithm: Algorithm) {
    let g = populated_grid(32, 32);
    c.bench_function(&format!("{}_maze_32", algorithm), move |b| {
        b.iter(|| {
            let mut maze = g.clone();
            algorithm.carve(&mut maze, &mut Randomizer::new(7))
        })
    });
}

fn bench_binary_maze_32(c: &mut Criterion) {
    bench_algorithm_32(c, Algorithm::BinaryTree);
}

fn bench_sidewinder_maze_32(c: &mut Criterion) {
    bench_algorithm_32(c, Algorithm::Sidewinder);
}

fn bench_dfs_maze_32(c: &mut Criterion) {
    bench_algorithm_32(c, Algorithm::DepthFirstSearch);
}

fn bench_lazy_dfs_maze_100(c: &mut Criterion) {
    c.bench_function("lazy_dfs_maze_100", |b| {
        b.iter(|| {
            let mut g = Grid::new(RowsCount(100), ColumnsCount(100), LevelsCount(1));
            Algorithm::DepthFirstSearch.carve(&mut g, &mut Randomizer::new(7))
        })
    });
}

fn bench_batch_of_16(c: &mut Criterion) {
    let generator = BatchGenerator::with_default_workers(Arc::new(GridFactory::new()));
    let requests: Vec<MazeConfig> = (0..16)
        .map(|seed| MazeConfig::new().with_rows(20).with_columns(20).with_seed(seed))
        .collect();
    c.bench_function("batch_of_16_mazes_20", move |b| {
        b.iter(|| generator.create_batch(&requests))
    });
}

criterion_group!(
    benches,
    bench_binary_maze_32,
    bench_sidewinder_maze_32,
    bench_dfs_maze_32,
    bench_lazy_dfs_maze_100,
    bench_batch_of_16
);
criterion_main!(benches);
