//! Maze generation and wall-rotation engine for a terminal maze game.
//!
//! [`maze::Maze`] builds a perfect maze with a randomized depth-first
//! backtracker, one step per call, so a frontend can animate construction.
//! In frantic mode [`scramble`] rotates walls of selected cells while keeping
//! both sides of every boundary in agreement, and [`navigation`] refuses
//! moves across shown walls or into cells that are mid-rotation.

pub mod cell;
pub mod difficulty;
pub mod error;
pub mod game;
pub mod maze;
pub mod navigation;
pub mod scramble;

pub use cell::{Cell, Rotation, RotationStep, Side, Wall};
pub use difficulty::{Difficulty, GameMode};
pub use error::{MazeError, MazeResult};
pub use game::{Game, GameEvent, GameState};
pub use maze::{GenerationState, Maze, Pos};
pub use navigation::{Dir, MoveOutcome, MoveRejection};
pub use scramble::ScrambleStatus;
