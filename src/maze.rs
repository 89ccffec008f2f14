use std::collections::VecDeque;

use log::{debug, trace};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::cell::{Cell, Side};
use crate::error::{MazeError, MazeResult};
use crate::scramble::ScrambleCycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub row: usize,
    pub column: usize,
}

impl Pos {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// The side of `self` that faces `other`, if the two are orthogonal
    /// neighbours exactly one unit apart.
    pub fn side_towards(self, other: Pos) -> Option<Side> {
        let dr = other.row as isize - self.row as isize;
        let dc = other.column as isize - self.column as isize;
        Side::ALL.into_iter().find(|side| side.delta() == (dr, dc))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    Running,
    Complete,
}

/// Grid of cells plus the state machines that build and mutate it.
///
/// Walls are stored on both cells of a boundary so renderers can read a cell
/// in isolation, but every write goes through [`Maze::set_wall`], which
/// updates both copies together.
#[derive(Debug, Clone)]
pub struct Maze {
    rows: usize,
    columns: usize,
    grid: Vec<Vec<Cell>>,
    current: Pos,
    stack: Vec<Pos>,
    pub(crate) cells_to_rotate: Vec<Pos>,
    pub(crate) scramble: Option<ScrambleCycle>,
    generation_complete: bool,
}

impl Maze {
    pub const START: Pos = Pos::new(0, 0);

    /// Builds a fully walled grid. Zero dimensions are raised to one.
    pub fn new(rows: usize, columns: usize) -> Self {
        let rows = rows.max(1);
        let columns = columns.max(1);
        let mut grid: Vec<Vec<Cell>> = (0..rows)
            .map(|row| (0..columns).map(|column| Cell::new(row, column)).collect())
            .collect();

        grid[rows - 1][columns - 1].is_goal = true;
        grid[0][0].visited = true;

        Self {
            rows,
            columns,
            grid,
            current: Self::START,
            stack: Vec::new(),
            cells_to_rotate: Vec::new(),
            scramble: None,
            generation_complete: rows * columns == 1,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn goal(&self) -> Pos {
        Pos::new(self.rows - 1, self.columns - 1)
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.row < self.rows && pos.column < self.columns
    }

    pub fn cell(&self, pos: Pos) -> Option<&Cell> {
        self.grid.get(pos.row).and_then(|row| row.get(pos.column))
    }

    pub(crate) fn cell_mut(&mut self, pos: Pos) -> &mut Cell {
        &mut self.grid[pos.row][pos.column]
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.grid.iter().flat_map(|row| row.iter())
    }

    pub fn current(&self) -> Pos {
        self.current
    }

    pub fn current_cell(&self) -> &Cell {
        &self.grid[self.current.row][self.current.column]
    }

    pub(crate) fn set_current(&mut self, pos: Pos) {
        self.current = pos;
    }

    /// Puts the player back on the start cell without touching the walls.
    pub fn reset_player(&mut self) {
        if self.generation_complete {
            self.current = Self::START;
        }
    }

    pub fn generation_complete(&self) -> bool {
        self.generation_complete
    }

    /// The cell the generator is carving from, while it is still running.
    pub fn generation_head(&self) -> Option<Pos> {
        (!self.generation_complete).then_some(self.current)
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_border(&self, pos: Pos, side: Side) -> bool {
        match side {
            Side::Top => pos.row == 0,
            Side::Right => pos.column + 1 == self.columns,
            Side::Bottom => pos.row + 1 == self.rows,
            Side::Left => pos.column == 0,
        }
    }

    /// The in-bounds cell across `side`, without wrapping at the edges.
    pub fn neighbor(&self, pos: Pos, side: Side) -> Option<Pos> {
        if self.is_border(pos, side) {
            return None;
        }
        let (dr, dc) = side.delta();
        Some(Pos::new(
            (pos.row as isize + dr) as usize,
            (pos.column as isize + dc) as usize,
        ))
    }

    /// Picks uniformly among the unvisited in-bounds neighbours of `pos`.
    pub fn random_unvisited_neighbor(
        &self,
        pos: Pos,
        rng: &mut impl Rng,
    ) -> Option<(Side, Pos)> {
        let mut options = Vec::with_capacity(4);
        for side in Side::ALL {
            if let Some(next) = self.neighbor(pos, side) {
                if !self.grid[next.row][next.column].visited {
                    options.push((side, next));
                }
            }
        }
        options.choose(rng).copied()
    }

    /// Single write path for walls: updates `pos`'s wall on `side` and the
    /// matching wall of the neighbour across it, if there is one.
    pub(crate) fn set_wall(&mut self, pos: Pos, side: Side, shown: bool) {
        self.cell_mut(pos).walls[side.index()].is_shown = shown;
        if let Some(next) = self.neighbor(pos, side) {
            self.cell_mut(next).walls[side.opposite().index()].is_shown = shown;
        }
    }

    pub(crate) fn check_bounds(&self, pos: Pos) -> MazeResult<()> {
        if self.contains(pos) {
            Ok(())
        } else {
            Err(MazeError::OutOfBounds {
                pos,
                rows: self.rows,
                columns: self.columns,
            })
        }
    }

    /// Opens the boundary shared by two orthogonally adjacent cells.
    pub fn remove_walls(&mut self, a: Pos, b: Pos) -> MazeResult<()> {
        self.check_bounds(a)?;
        self.check_bounds(b)?;
        let side = a.side_towards(b).ok_or(MazeError::NotAdjacent { a, b })?;
        self.set_wall(a, side, false);
        Ok(())
    }

    /// Advances the randomized depth-first backtracker by one step. Once the
    /// stack drains the maze is complete and further calls change nothing.
    pub fn step_generation(&mut self, rng: &mut impl Rng) -> GenerationState {
        if self.generation_complete {
            return GenerationState::Complete;
        }

        let current = self.current;
        self.cell_mut(current).visited = true;

        if let Some((side, next)) = self.random_unvisited_neighbor(current, rng) {
            self.cell_mut(next).visited = true;
            self.stack.push(current);
            self.set_wall(current, side, false);
            self.current = next;
            trace!("carved {:?} -> {:?}", current, next);
        } else if let Some(previous) = self.stack.pop() {
            self.current = previous;
        }

        if self.stack.is_empty() {
            self.generation_complete = true;
            debug!(
                "generated {}x{} maze with {} open walls",
                self.rows,
                self.columns,
                self.walls_removed()
            );
            return GenerationState::Complete;
        }
        GenerationState::Running
    }

    /// Runs generation to completion and returns the number of steps taken.
    pub fn generate(&mut self, rng: &mut impl Rng) -> usize {
        let mut steps = 0;
        while !self.generation_complete {
            self.step_generation(rng);
            steps += 1;
        }
        steps
    }

    /// Number of open interior boundaries.
    pub fn walls_removed(&self) -> usize {
        self.cells()
            .map(|cell| {
                [Side::Right, Side::Bottom]
                    .into_iter()
                    .filter(|&side| !cell.is_shown(side) && !self.is_border(cell.pos(), side))
                    .count()
            })
            .sum()
    }

    /// Neighbours reachable from `pos` through open walls.
    pub fn open_neighbors(&self, pos: Pos) -> Vec<Pos> {
        let Some(cell) = self.cell(pos) else {
            return Vec::new();
        };
        Side::ALL
            .into_iter()
            .filter(|&side| !cell.is_shown(side))
            .filter_map(|side| self.neighbor(pos, side))
            .collect()
    }

    pub fn reachable_from(&self, start: Pos) -> Vec<Vec<bool>> {
        let mut seen = vec![vec![false; self.columns]; self.rows];
        if !self.contains(start) {
            return seen;
        }
        let mut q = VecDeque::new();
        seen[start.row][start.column] = true;
        q.push_back(start);
        while let Some(pos) = q.pop_front() {
            for next in self.open_neighbors(pos) {
                if !seen[next.row][next.column] {
                    seen[next.row][next.column] = true;
                    q.push_back(next);
                }
            }
        }
        seen
    }

    /// True when the open walls form a spanning tree: every cell reachable
    /// and exactly `rows * columns - 1` boundaries open.
    pub fn is_perfect(&self) -> bool {
        let connected = self
            .reachable_from(Self::START)
            .iter()
            .all(|row| row.iter().all(|&seen| seen));
        connected && self.walls_removed() == self.rows * self.columns - 1
    }

    /// Checks that both copies of every interior wall agree.
    pub fn walls_consistent(&self) -> bool {
        self.cells().all(|cell| {
            Side::ALL.into_iter().all(|side| {
                match self.neighbor(cell.pos(), side).and_then(|n| self.cell(n)) {
                    Some(other) => other.is_shown(side.opposite()) == cell.is_shown(side),
                    None => true,
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn new_maze_is_fully_walled_with_goal_in_corner() {
        let maze = Maze::new(3, 4);
        assert_eq!(maze.goal(), Pos::new(2, 3));
        assert_eq!(maze.cells().filter(|c| c.is_goal()).count(), 1);
        assert!(maze.cells().all(|c| c.shown_walls() == [true; 4]));
        assert!(!maze.generation_complete());
        assert_eq!(maze.current(), Maze::START);
        assert!(maze.cell(Maze::START).map(|c| c.visited()).unwrap_or(false));
    }

    #[test]
    fn neighbor_lookup_does_not_wrap() {
        let maze = Maze::new(2, 3);
        assert_eq!(maze.neighbor(Pos::new(0, 0), Side::Top), None);
        assert_eq!(maze.neighbor(Pos::new(0, 0), Side::Left), None);
        assert_eq!(maze.neighbor(Pos::new(1, 2), Side::Right), None);
        assert_eq!(maze.neighbor(Pos::new(1, 2), Side::Bottom), None);
        assert_eq!(maze.neighbor(Pos::new(0, 1), Side::Right), Some(Pos::new(0, 2)));
    }

    #[test]
    fn unvisited_neighbor_skips_visited_cells() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut maze = Maze::new(1, 2);
        assert_eq!(
            maze.random_unvisited_neighbor(Pos::new(0, 0), &mut rng),
            Some((Side::Right, Pos::new(0, 1)))
        );
        maze.cell_mut(Pos::new(0, 1)).visited = true;
        assert_eq!(maze.random_unvisited_neighbor(Pos::new(0, 0), &mut rng), None);
    }

    #[test]
    fn remove_walls_clears_both_sides() {
        let mut maze = Maze::new(3, 3);
        maze.remove_walls(Pos::new(1, 1), Pos::new(0, 1)).unwrap();
        assert!(!maze.cell(Pos::new(1, 1)).unwrap().is_shown(Side::Top));
        assert!(!maze.cell(Pos::new(0, 1)).unwrap().is_shown(Side::Bottom));

        maze.remove_walls(Pos::new(1, 1), Pos::new(1, 2)).unwrap();
        assert!(!maze.cell(Pos::new(1, 1)).unwrap().is_shown(Side::Right));
        assert!(!maze.cell(Pos::new(1, 2)).unwrap().is_shown(Side::Left));
        assert_eq!(maze.walls_removed(), 2);
        assert!(maze.walls_consistent());
    }

    #[test]
    fn remove_walls_rejects_bad_pairs() {
        let mut maze = Maze::new(3, 3);
        assert_eq!(
            maze.remove_walls(Pos::new(0, 0), Pos::new(1, 1)),
            Err(MazeError::NotAdjacent {
                a: Pos::new(0, 0),
                b: Pos::new(1, 1)
            })
        );
        assert_eq!(
            maze.remove_walls(Pos::new(0, 0), Pos::new(0, 0)),
            Err(MazeError::NotAdjacent {
                a: Pos::new(0, 0),
                b: Pos::new(0, 0)
            })
        );
        assert!(matches!(
            maze.remove_walls(Pos::new(2, 2), Pos::new(3, 2)),
            Err(MazeError::OutOfBounds { .. })
        ));
        assert_eq!(maze.walls_removed(), 0);
    }

    #[test]
    fn single_cell_maze_is_complete_immediately() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut maze = Maze::new(1, 1);
        assert!(maze.generation_complete());
        assert_eq!(maze.step_generation(&mut rng), GenerationState::Complete);
        assert_eq!(maze.walls_removed(), 0);
        assert!(maze.current_cell().is_goal());
    }

    #[test]
    fn generation_takes_two_steps_per_carved_cell() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut maze = Maze::new(4, 5);
        let steps = maze.generate(&mut rng);
        assert_eq!(steps, 2 * (4 * 5 - 1));
        assert_eq!(maze.stack_len(), 0);
        assert_eq!(maze.current(), Maze::START);
        assert!(maze.cells().all(|c| c.visited()));
    }

    #[test]
    fn generation_head_disappears_when_complete() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut maze = Maze::new(2, 2);
        assert_eq!(maze.generation_head(), Some(Maze::START));
        maze.step_generation(&mut rng);
        assert_ne!(maze.generation_head(), Some(Maze::START));
        maze.generate(&mut rng);
        assert_eq!(maze.generation_head(), None);
    }
}
