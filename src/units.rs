//! Newtypes for grid sizes and positions, so a row count is never passed where a column count
//! belongs.

use std::fmt;

macro_rules! unit {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Copy, Clone, Debug, Default)]
        pub struct $name(pub usize);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

unit!(RowsCount);
unit!(ColumnsCount);
unit!(LevelsCount);

unit!(RowIndex);
unit!(ColumnIndex);
unit!(LevelIndex);

unit!(
    /// Total cells a grid can hold.
    NodesCount
);
unit!(
    /// Passages between cells, each counted once.
    LinksCount
);
