use crate::maze::Pos;

/// Degrees a rotating wall sweeps per call.
pub const THETA_STEP: u16 = 2;
/// A full rotation is a quarter turn.
pub const ROTATION_DEGREES: u16 = 90;
/// Calls needed to carry a wall through a full rotation.
pub const ROTATION_STEPS: u8 = (ROTATION_DEGREES / THETA_STEP) as u8;

/// One of the four walls of a cell, in the fixed order used by every
/// snapshot: top, right, bottom, left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    pub fn index(self) -> usize {
        match self {
            Side::Top => 0,
            Side::Right => 1,
            Side::Bottom => 2,
            Side::Left => 3,
        }
    }

    /// The matching side on the neighbour across this wall.
    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }

    /// (row, column) offset of the neighbour across this wall.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Side::Top => (-1, 0),
            Side::Right => (0, 1),
            Side::Bottom => (1, 0),
            Side::Left => (0, -1),
        }
    }

    /// The slot a wall on this side sweeps into. The mapping is a cyclic
    /// permutation, so each rotation closes exactly one slot and opens one.
    pub fn rotates_into(self) -> Side {
        match self {
            Side::Top => Side::Left,
            Side::Right => Side::Top,
            Side::Bottom => Side::Right,
            Side::Left => Side::Bottom,
        }
    }

    /// Resting angle of a wall on this side, in degrees.
    pub fn rest_theta(self) -> u16 {
        match self {
            Side::Top => 0,
            Side::Right => 90,
            Side::Bottom => 180,
            Side::Left => 270,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wall {
    pub(crate) is_shown: bool,
    pub(crate) theta: u16,
    pub(crate) max_theta: u16,
}

impl Wall {
    fn at_rest(side: Side) -> Self {
        let theta = side.rest_theta();
        Self {
            is_shown: true,
            theta,
            max_theta: theta + ROTATION_DEGREES,
        }
    }

    pub fn is_shown(&self) -> bool {
        self.is_shown
    }

    pub fn theta(&self) -> u16 {
        self.theta
    }

    pub fn max_theta(&self) -> u16 {
        self.max_theta
    }
}

/// Progress of the one wall a cell is currently rotating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation {
    pub wall: Side,
    pub steps: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationStep {
    /// The wall moved but has not reached its target angle.
    Sweeping { theta: u16 },
    /// The wall reached its target angle on this call. Angles are back at
    /// rest; the owner must hide `from` and show `into`.
    Complete { from: Side, into: Side },
}

#[derive(Debug, Clone)]
pub struct Cell {
    row: usize,
    column: usize,
    pub(crate) visited: bool,
    pub(crate) is_goal: bool,
    pub(crate) walls: [Wall; 4],
    rotation: Option<Rotation>,
}

impl Cell {
    pub fn new(row: usize, column: usize) -> Self {
        Self {
            row,
            column,
            visited: false,
            is_goal: false,
            walls: Side::ALL.map(Wall::at_rest),
            rotation: None,
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn pos(&self) -> Pos {
        Pos::new(self.row, self.column)
    }

    pub fn visited(&self) -> bool {
        self.visited
    }

    pub fn is_goal(&self) -> bool {
        self.is_goal
    }

    pub fn wall(&self, side: Side) -> &Wall {
        &self.walls[side.index()]
    }

    pub fn is_shown(&self, side: Side) -> bool {
        self.walls[side.index()].is_shown
    }

    /// Shown flags as [top, right, bottom, left].
    pub fn shown_walls(&self) -> [bool; 4] {
        self.walls.map(|w| w.is_shown)
    }

    pub fn open_wall_count(&self) -> usize {
        self.walls.iter().filter(|w| !w.is_shown).count()
    }

    pub fn is_rotating(&self) -> bool {
        self.rotation.is_some()
    }

    pub fn rotation(&self) -> Option<Rotation> {
        self.rotation
    }

    pub fn wall_to_rotate(&self) -> Option<Side> {
        self.rotation.map(|r| r.wall)
    }

    pub(crate) fn start_rotation(&mut self, wall: Side) {
        self.walls[wall.index()].theta = wall.rest_theta();
        self.rotation = Some(Rotation { wall, steps: 0 });
    }

    /// Sweeps the rotating wall by one step. The completing call resets both
    /// angles and clears the rotation; there is no separate reset call.
    pub(crate) fn advance_rotation(&mut self) -> Option<RotationStep> {
        let rotation = self.rotation.as_mut()?;
        rotation.steps += 1;
        let from = rotation.wall;

        let wall = &mut self.walls[from.index()];
        wall.theta += THETA_STEP;
        if wall.theta < wall.max_theta {
            return Some(RotationStep::Sweeping { theta: wall.theta });
        }

        let into = from.rotates_into();
        self.walls[from.index()].theta = from.rest_theta();
        self.walls[into.index()].theta = into.rest_theta();
        self.rotation = None;
        Some(RotationStep::Complete { from, into })
    }
}

/// Cells are identified by their grid position alone.
impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row && self.column == other.column
    }
}

impl Eq for Cell {}
