//! Frantic-mode wall rotation: picks a set of cells, then sweeps one wall of
//! each into the neighbouring open slot over a fixed number of ticks.

use log::{debug, trace, warn};
use rand::Rng;

use crate::cell::{RotationStep, Side};
use crate::error::{MazeError, MazeResult};
use crate::maze::{Maze, Pos};

/// Random draws allowed per requested cell before selection gives up.
pub const SELECTION_ATTEMPTS_PER_CELL: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrambleCycle {
    ticks: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrambleStatus {
    /// No cycle is in flight.
    Idle,
    /// At least one selected cell is still rotating.
    Running,
    /// The last rotation of the cycle completed on this call.
    Finished,
}

impl Maze {
    pub fn cells_to_rotate(&self) -> &[Pos] {
        &self.cells_to_rotate
    }

    pub fn is_scrambling(&self) -> bool {
        self.scramble.is_some()
    }

    /// Ticks advanced so far in the active cycle.
    pub fn scramble_ticks(&self) -> Option<u8> {
        self.scramble.map(|cycle| cycle.ticks)
    }

    /// A cell is worth rotating only if some shown wall is not on the outer
    /// edge; border walls have no neighbour to sweep into.
    pub fn has_rotatable_walls(&self, pos: Pos) -> bool {
        let Some(cell) = self.cell(pos) else {
            return false;
        };
        let shown = Side::ALL.iter().filter(|&&side| cell.is_shown(side)).count();
        let shown_border = Side::ALL
            .iter()
            .filter(|&&side| cell.is_shown(side) && self.is_border(pos, side))
            .count();
        shown > shown_border
    }

    fn is_selectable(&self, pos: Pos) -> bool {
        let Some(cell) = self.cell(pos) else {
            return false;
        };
        if cell.is_goal() || self.cells_to_rotate.contains(&pos) {
            return false;
        }
        // Selected cells never share a boundary, so no two rotations of one
        // cycle write the same wall.
        if self
            .cells_to_rotate
            .iter()
            .any(|picked| picked.side_towards(pos).is_some())
        {
            return false;
        }
        self.has_rotatable_walls(pos)
    }

    /// Replaces `cells_to_rotate` with up to `count` random qualifying cells.
    /// Draws are capped; when the grid cannot supply enough cells the cycle
    /// proceeds with fewer. The current selection is kept while a cycle is
    /// in flight.
    pub fn select_cells_to_rotate(&mut self, rng: &mut impl Rng, count: usize) -> usize {
        if self.scramble.is_some() {
            return 0;
        }
        self.cells_to_rotate.clear();

        let wanted = count.min(self.rows() * self.columns() - 1);
        let max_attempts = wanted * SELECTION_ATTEMPTS_PER_CELL;
        let mut attempts = 0;
        while self.cells_to_rotate.len() < wanted && attempts < max_attempts {
            attempts += 1;
            let pos = Pos::new(rng.gen_range(0..self.rows()), rng.gen_range(0..self.columns()));
            if self.is_selectable(pos) {
                self.cells_to_rotate.push(pos);
            }
        }

        if self.cells_to_rotate.len() < wanted {
            warn!(
                "selected {} of {} rotating cells after {} draws",
                self.cells_to_rotate.len(),
                wanted,
                attempts
            );
        }
        self.cells_to_rotate.len()
    }

    /// First wall, in top/right/bottom/left order, that is shown, is not a
    /// border wall, and whose destination slot is open.
    pub fn choose_wall_to_rotate(&self, pos: Pos) -> Option<Side> {
        let cell = self.cell(pos)?;
        Side::ALL.into_iter().find(|&side| {
            cell.is_shown(side)
                && !cell.is_shown(side.rotates_into())
                && !self.is_border(pos, side)
        })
    }

    pub fn start_rotation(&mut self, pos: Pos, side: Side) -> MazeResult<()> {
        self.check_bounds(pos)?;
        if self.is_border(pos, side) {
            return Err(MazeError::BorderWall { pos, side });
        }
        let cell = self.cell_mut(pos);
        if cell.is_rotating() {
            return Err(MazeError::AlreadyRotating { pos });
        }
        cell.start_rotation(side);
        Ok(())
    }

    /// Sweeps the rotating wall of `pos` by one step. The wall keeps blocking
    /// on both sides while it sweeps; on the completing call the source
    /// boundary opens and the destination boundary closes.
    pub fn advance_rotation(&mut self, pos: Pos) -> Option<RotationStep> {
        if !self.contains(pos) {
            return None;
        }
        let step = self.cell_mut(pos).advance_rotation()?;
        if let RotationStep::Complete { from, into } = step {
            self.set_wall(pos, from, false);
            self.set_wall(pos, into, true);
            trace!("{:?} rotated {:?} into {:?}", pos, from, into);
        }
        Some(step)
    }

    /// Starts a scramble cycle over `count` freshly selected cells. Ignored
    /// while generation is running or another cycle is in flight; a cycle
    /// with no qualifying cells is skipped.
    pub fn begin_scramble(&mut self, rng: &mut impl Rng, count: usize) -> usize {
        if !self.generation_complete() || self.scramble.is_some() {
            return 0;
        }
        let selected = self.select_cells_to_rotate(rng, count);
        if selected > 0 {
            self.scramble = Some(ScrambleCycle { ticks: 0 });
            debug!("scramble cycle started with {} cells", selected);
        }
        selected
    }

    /// Advances every selected cell by one tick. Walls are chosen on the
    /// first tick and stay fixed for the rest of the cycle.
    pub fn advance_scramble(&mut self) -> ScrambleStatus {
        let Some(cycle) = self.scramble else {
            return ScrambleStatus::Idle;
        };

        let selected = self.cells_to_rotate.clone();
        if cycle.ticks == 0 {
            for &pos in &selected {
                if let Some(side) = self.choose_wall_to_rotate(pos) {
                    self.cell_mut(pos).start_rotation(side);
                }
            }
        }

        for &pos in &selected {
            self.advance_rotation(pos);
        }

        let still_rotating = selected
            .iter()
            .any(|&pos| self.cell(pos).is_some_and(|cell| cell.is_rotating()));
        if still_rotating {
            self.scramble = Some(ScrambleCycle {
                ticks: cycle.ticks + 1,
            });
            ScrambleStatus::Running
        } else {
            self.scramble = None;
            debug!("scramble cycle finished after {} ticks", cycle.ticks + 1);
            ScrambleStatus::Finished
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::ROTATION_STEPS;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn shown(maze: &Maze, row: usize, column: usize, side: Side) -> bool {
        maze.cell(Pos::new(row, column)).unwrap().is_shown(side)
    }

    #[test]
    fn reselecting_mid_cycle_keeps_rotating_cells() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut maze = Maze::new(8, 8);
        maze.generate(&mut rng);
        assert!(maze.begin_scramble(&mut rng, 16) > 0);
        maze.advance_scramble();
        let selected = maze.cells_to_rotate().to_vec();

        assert_eq!(maze.select_cells_to_rotate(&mut rng, 16), 0);
        assert_eq!(maze.cells_to_rotate(), &selected[..]);

        while maze.advance_scramble() == ScrambleStatus::Running {}
        assert!(maze.cells().all(|c| !c.is_rotating()));
    }

    #[test]
    fn wall_choice_follows_fixed_priority() {
        let mut maze = Maze::new(3, 3);
        let center = Pos::new(1, 1);
        assert_eq!(maze.choose_wall_to_rotate(center), None);

        maze.remove_walls(center, Pos::new(1, 0)).unwrap();
        assert_eq!(maze.choose_wall_to_rotate(center), Some(Side::Top));

        maze.remove_walls(center, Pos::new(0, 1)).unwrap();
        assert_eq!(maze.choose_wall_to_rotate(center), Some(Side::Right));

        maze.remove_walls(center, Pos::new(1, 2)).unwrap();
        assert_eq!(maze.choose_wall_to_rotate(center), Some(Side::Bottom));
    }

    #[test]
    fn wall_choice_skips_border_walls() {
        let mut maze = Maze::new(3, 3);
        let corner = Pos::new(0, 1);
        maze.remove_walls(corner, Pos::new(0, 0)).unwrap();
        // Top is shown with an open left slot, but it is on the border.
        assert_eq!(maze.choose_wall_to_rotate(corner), None);
        assert!(maze.has_rotatable_walls(corner));
    }

    #[test]
    fn rotation_moves_wall_into_open_slot() {
        let mut maze = Maze::new(3, 3);
        let center = Pos::new(1, 1);
        maze.remove_walls(center, Pos::new(1, 0)).unwrap();
        let open_before = maze.cell(center).unwrap().open_wall_count();

        maze.start_rotation(center, Side::Top).unwrap();
        for _ in 1..ROTATION_STEPS {
            assert!(matches!(
                maze.advance_rotation(center),
                Some(RotationStep::Sweeping { .. })
            ));
            assert!(shown(&maze, 1, 1, Side::Top));
            assert!(shown(&maze, 0, 1, Side::Bottom));
            assert!(maze.walls_consistent());
        }
        assert_eq!(
            maze.advance_rotation(center),
            Some(RotationStep::Complete {
                from: Side::Top,
                into: Side::Left
            })
        );

        assert!(!shown(&maze, 1, 1, Side::Top));
        assert!(!shown(&maze, 0, 1, Side::Bottom));
        assert!(shown(&maze, 1, 1, Side::Left));
        assert!(shown(&maze, 1, 0, Side::Right));
        assert!(!maze.cell(center).unwrap().is_rotating());
        assert_eq!(maze.cell(center).unwrap().open_wall_count(), open_before);
        assert!(maze.walls_consistent());
    }

    #[test]
    fn start_rotation_rejects_invalid_requests() {
        let mut maze = Maze::new(2, 2);
        assert_eq!(
            maze.start_rotation(Pos::new(0, 0), Side::Top),
            Err(MazeError::BorderWall {
                pos: Pos::new(0, 0),
                side: Side::Top
            })
        );
        assert!(matches!(
            maze.start_rotation(Pos::new(5, 0), Side::Right),
            Err(MazeError::OutOfBounds { .. })
        ));
        maze.start_rotation(Pos::new(0, 0), Side::Right).unwrap();
        assert_eq!(
            maze.start_rotation(Pos::new(0, 0), Side::Bottom),
            Err(MazeError::AlreadyRotating {
                pos: Pos::new(0, 0)
            })
        );
    }

    #[test]
    fn selection_is_capped_on_tiny_grids() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut maze = Maze::new(2, 2);
        maze.generate(&mut rng);
        let selected = maze.select_cells_to_rotate(&mut rng, 50);
        assert!(selected <= 3);
        assert!(!maze.cells_to_rotate().contains(&maze.goal()));
    }

    #[test]
    fn begin_scramble_waits_for_generation() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut maze = Maze::new(5, 5);
        assert_eq!(maze.begin_scramble(&mut rng, 10), 0);
        assert_eq!(maze.advance_scramble(), ScrambleStatus::Idle);
    }
}
