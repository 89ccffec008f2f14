use log::trace;

use crate::cell::Side;
use crate::maze::{Maze, Pos};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    /// The wall of the current cell this move crosses.
    pub fn side(self) -> Side {
        match self {
            Dir::Up => Side::Top,
            Dir::Down => Side::Bottom,
            Dir::Left => Side::Left,
            Dir::Right => Side::Right,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveRejection {
    GenerationIncomplete,
    WallShown,
    DestinationRotating,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { to: Pos },
    ReachedGoal { to: Pos },
    Rejected(MoveRejection),
}

impl MoveOutcome {
    pub fn moved(self) -> bool {
        !matches!(self, MoveOutcome::Rejected(_))
    }

    pub fn reached_goal(self) -> bool {
        matches!(self, MoveOutcome::ReachedGoal { .. })
    }
}

impl Maze {
    /// Whether the player could cross `dir` right now, without moving.
    pub fn can_move(&self, dir: Dir) -> Result<Pos, MoveRejection> {
        if !self.generation_complete() {
            return Err(MoveRejection::GenerationIncomplete);
        }
        let from = self.current();
        let side = dir.side();
        if self.current_cell().is_shown(side) {
            return Err(MoveRejection::WallShown);
        }
        // An open wall on the border would lead nowhere; treat it as shown.
        let to = self.neighbor(from, side).ok_or(MoveRejection::WallShown)?;
        match self.cell(to) {
            Some(cell) if cell.is_rotating() => Err(MoveRejection::DestinationRotating),
            Some(_) => Ok(to),
            None => Err(MoveRejection::WallShown),
        }
    }

    /// Moves the player one cell if the shared wall is open and the
    /// destination is not mid-rotation. Rejected moves change nothing.
    pub fn try_move(&mut self, dir: Dir) -> MoveOutcome {
        let to = match self.can_move(dir) {
            Ok(to) => to,
            Err(reason) => {
                trace!("move {:?} rejected: {:?}", dir, reason);
                return MoveOutcome::Rejected(reason);
            }
        };
        self.set_current(to);
        if to == self.goal() {
            MoveOutcome::ReachedGoal { to }
        } else {
            MoveOutcome::Moved { to }
        }
    }
}
