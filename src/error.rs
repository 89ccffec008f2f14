use std::fmt;

use crate::cell::Side;
use crate::maze::Pos;

/// Precondition violations raised by wall mutations. These indicate a caller
/// bug; expected outcomes such as a blocked move are reported as plain values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MazeError {
    OutOfBounds { pos: Pos, rows: usize, columns: usize },
    NotAdjacent { a: Pos, b: Pos },
    BorderWall { pos: Pos, side: Side },
    AlreadyRotating { pos: Pos },
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { pos, rows, columns } => write!(
                f,
                "cell ({}, {}) is outside the {}x{} grid",
                pos.row, pos.column, rows, columns
            ),
            Self::NotAdjacent { a, b } => write!(
                f,
                "cells ({}, {}) and ({}, {}) do not share a wall",
                a.row, a.column, b.row, b.column
            ),
            Self::BorderWall { pos, side } => write!(
                f,
                "the {:?} wall of ({}, {}) is a border wall and cannot rotate",
                side, pos.row, pos.column
            ),
            Self::AlreadyRotating { pos } => {
                write!(f, "cell ({}, {}) is already rotating", pos.row, pos.column)
            }
        }
    }
}

impl std::error::Error for MazeError {}

pub type MazeResult<T> = Result<T, MazeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_both_cells() {
        let err = MazeError::NotAdjacent {
            a: Pos::new(0, 0),
            b: Pos::new(2, 0),
        };
        assert_eq!(
            err.to_string(),
            "cells (0, 0) and (2, 0) do not share a wall"
        );
    }
}
