use std::cmp;
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, ErrorKind};
use crate::generators::Algorithm;
use crate::units::{ColumnsCount, LevelsCount, RowsCount};

pub const MAX_ROWS: usize = 100;
pub const MAX_COLUMNS: usize = 100;
pub const MAX_LEVELS: usize = 10;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OutputFormat {
    /// Written to a plain text file.
    Text,
    Stdout,
}

impl Default for OutputFormat {
    fn default() -> OutputFormat {
        OutputFormat::Text
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            OutputFormat::Text => f.write_str("txt"),
            OutputFormat::Stdout => f.write_str("stdout"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<OutputFormat, Error> {
        match s {
            "txt" | "text" => Ok(OutputFormat::Text),
            "stdout" => Ok(OutputFormat::Stdout),
            _ => Err(ErrorKind::InvalidOutputFormat(s.to_string()).into()),
        }
    }
}

/// Everything needed to generate one maze.
///
/// Dimensions are clamped on the way in: zero becomes one and anything over the maximum becomes
/// the maximum.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MazeConfig {
    rows: RowsCount,
    columns: ColumnsCount,
    levels: LevelsCount,
    algorithm: Algorithm,
    seed: u64,
    distances: bool,
    output_format: OutputFormat,
}

impl Default for MazeConfig {
    fn default() -> MazeConfig {
        MazeConfig {
            rows: RowsCount(10),
            columns: ColumnsCount(10),
            levels: LevelsCount(1),
            algorithm: Algorithm::BinaryTree,
            seed: 0,
            distances: false,
            output_format: OutputFormat::Text,
        }
    }
}

fn clamp(value: usize, max: usize) -> usize {
    cmp::min(cmp::max(value, 1), max)
}

impl MazeConfig {
    pub fn new() -> MazeConfig {
        MazeConfig::default()
    }

    pub fn with_rows(self, rows: usize) -> MazeConfig {
        MazeConfig { rows: RowsCount(clamp(rows, MAX_ROWS)), ..self }
    }

    pub fn with_columns(self, columns: usize) -> MazeConfig {
        MazeConfig { columns: ColumnsCount(clamp(columns, MAX_COLUMNS)), ..self }
    }

    pub fn with_levels(self, levels: usize) -> MazeConfig {
        MazeConfig { levels: LevelsCount(clamp(levels, MAX_LEVELS)), ..self }
    }

    pub fn with_algorithm(self, algorithm: Algorithm) -> MazeConfig {
        MazeConfig { algorithm, ..self }
    }

    pub fn with_seed(self, seed: u64) -> MazeConfig {
        MazeConfig { seed, ..self }
    }

    pub fn with_distances(self, distances: bool) -> MazeConfig {
        MazeConfig { distances, ..self }
    }

    pub fn with_output_format(self, output_format: OutputFormat) -> MazeConfig {
        MazeConfig { output_format, ..self }
    }

    #[inline]
    pub fn rows(&self) -> RowsCount {
        self.rows
    }

    #[inline]
    pub fn columns(&self) -> ColumnsCount {
        self.columns
    }

    #[inline]
    pub fn levels(&self) -> LevelsCount {
        self.levels
    }

    #[inline]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn distances(&self) -> bool {
        self.distances
    }

    #[inline]
    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    /// Total cells of a maze built from this config.
    pub fn cells_count(&self) -> usize {
        self.rows.0 * self.columns.0 * self.levels.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = MazeConfig::new();
        assert_eq!(c.rows(), RowsCount(10));
        assert_eq!(c.columns(), ColumnsCount(10));
        assert_eq!(c.levels(), LevelsCount(1));
        assert_eq!(c.algorithm(), Algorithm::BinaryTree);
        assert_eq!(c.seed(), 0);
        assert!(!c.distances());
        assert_eq!(c.output_format(), OutputFormat::Text);
    }

    #[test]
    fn dimensions_are_clamped() {
        let c = MazeConfig::new().with_rows(0).with_columns(1000).with_levels(11);
        assert_eq!(c.rows(), RowsCount(1));
        assert_eq!(c.columns(), ColumnsCount(MAX_COLUMNS));
        assert_eq!(c.levels(), LevelsCount(MAX_LEVELS));
        assert_eq!(c.cells_count(), MAX_COLUMNS * MAX_LEVELS);
    }

    #[test]
    fn output_formats_parse() {
        assert_eq!("txt".parse::<OutputFormat>().ok(), Some(OutputFormat::Text));
        assert_eq!("text".parse::<OutputFormat>().ok(), Some(OutputFormat::Text));
        assert_eq!("stdout".parse::<OutputFormat>().ok(), Some(OutputFormat::Stdout));
        let err = "bmp".parse::<OutputFormat>().err().map(|e| e.to_string());
        assert_eq!(err.as_deref(),
                   Some("invalid output format: 'bmp' (expected txt, text or stdout)"));
    }
}
