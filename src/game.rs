use std::time::Duration;

use log::debug;
use rand::Rng;

use crate::difficulty::{Difficulty, GameMode};
use crate::maze::{GenerationState, Maze};
use crate::navigation::{Dir, MoveOutcome};
use crate::scramble::ScrambleStatus;

/// Frantic mode starts a cycle on every non-zero multiple of this many seconds.
pub const SCRAMBLE_INTERVAL_SECS: u64 = 3;
/// Memory mode shows the maze for this long before hiding it.
pub const MEMORY_PREVIEW_SECS: u64 = 3;
/// Memory mode flashes the maze for one second out of every period.
pub const MEMORY_FLASH_PERIOD_SECS: u64 = 5;
pub const DEFAULT_GENERATION_STEPS_PER_TICK: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Generating,
    Playing,
    Paused,
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    GenerationComplete,
    ScrambleStarted { cells: usize },
    ScrambleFinished,
}

/// One play session: the maze for the chosen difficulty, the game clock and
/// the frantic-mode scramble trigger.
#[derive(Debug, Clone)]
pub struct Game {
    difficulty: Difficulty,
    mode: GameMode,
    maze: Maze,
    state: GameState,
    elapsed: Duration,
    generation_steps_per_tick: usize,
    last_scramble_second: Option<u64>,
}

impl Game {
    pub fn new(difficulty: Difficulty, mode: GameMode) -> Self {
        let (rows, columns) = difficulty.dimensions();
        Self::with_dimensions(difficulty, mode, rows, columns)
    }

    /// A session whose maze size differs from the difficulty's default.
    pub fn with_dimensions(
        difficulty: Difficulty,
        mode: GameMode,
        rows: usize,
        columns: usize,
    ) -> Self {
        let maze = Maze::new(rows, columns);
        let state = if maze.generation_complete() {
            GameState::Playing
        } else {
            GameState::Generating
        };
        Self {
            difficulty,
            mode,
            maze,
            state,
            elapsed: Duration::ZERO,
            generation_steps_per_tick: DEFAULT_GENERATION_STEPS_PER_TICK,
            last_scramble_second: None,
        }
    }

    pub fn set_generation_steps_per_tick(&mut self, steps: usize) {
        self.generation_steps_per_tick = steps.max(1);
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.as_secs()
    }

    pub fn is_won(&self) -> bool {
        self.state == GameState::Won
    }

    /// Whether the renderer should draw the maze and player this frame.
    pub fn maze_visible(&self) -> bool {
        if self.mode != GameMode::Memory || self.state != GameState::Playing {
            return true;
        }
        let secs = self.elapsed_secs();
        secs <= MEMORY_PREVIEW_SECS || secs % MEMORY_FLASH_PERIOD_SECS == MEMORY_PREVIEW_SECS
    }

    /// Advances the session by one frame of `dt`.
    pub fn tick(&mut self, dt: Duration, rng: &mut impl Rng) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match self.state {
            GameState::Generating => {
                for _ in 0..self.generation_steps_per_tick {
                    if self.maze.step_generation(rng) == GenerationState::Complete {
                        self.state = GameState::Playing;
                        events.push(GameEvent::GenerationComplete);
                        break;
                    }
                }
            }
            GameState::Playing => {
                self.elapsed = self.elapsed.saturating_add(dt);
                if self.mode == GameMode::Frantic {
                    self.tick_frantic(rng, &mut events);
                }
            }
            GameState::Paused | GameState::Won => {}
        }
        events
    }

    fn tick_frantic(&mut self, rng: &mut impl Rng, events: &mut Vec<GameEvent>) {
        let secs = self.elapsed_secs();
        let due = secs != 0
            && secs % SCRAMBLE_INTERVAL_SECS == 0
            && self.last_scramble_second != Some(secs);
        if due && !self.maze.is_scrambling() {
            self.last_scramble_second = Some(secs);
            let cells = self
                .maze
                .begin_scramble(rng, self.difficulty.rotating_cells());
            if cells > 0 {
                events.push(GameEvent::ScrambleStarted { cells });
            }
        }
        if self.maze.advance_scramble() == ScrambleStatus::Finished {
            events.push(GameEvent::ScrambleFinished);
        }
    }

    /// Forwards a move to the maze while the game is running. Returns `None`
    /// when input is not accepted (paused or already won).
    pub fn try_move(&mut self, dir: Dir) -> Option<MoveOutcome> {
        if matches!(self.state, GameState::Paused | GameState::Won) {
            return None;
        }
        let outcome = self.maze.try_move(dir);
        if outcome.reached_goal() {
            self.state = GameState::Won;
            debug!("goal reached after {:?}", self.elapsed);
        }
        Some(outcome)
    }

    pub fn pause(&mut self) {
        if self.state == GameState::Playing {
            self.state = GameState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == GameState::Paused {
            self.state = GameState::Playing;
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            GameState::Playing => self.pause(),
            GameState::Paused => self.resume(),
            _ => {}
        }
    }

    /// Same maze, player back on the start cell, clock reset.
    pub fn restart(&mut self) {
        self.maze.reset_player();
        self.elapsed = Duration::ZERO;
        self.last_scramble_second = None;
        if self.maze.generation_complete() {
            self.state = GameState::Playing;
        }
    }

    /// Discards the current maze, including any generation in progress, and
    /// starts building a fresh one.
    pub fn new_maze(&mut self) {
        let (rows, columns) = (self.maze.rows(), self.maze.columns());
        self.replace_maze(rows, columns);
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        let (rows, columns) = difficulty.dimensions();
        self.replace_maze(rows, columns);
    }

    /// Switching mode builds a fresh maze, dropping any cycle in flight.
    pub fn set_mode(&mut self, mode: GameMode) {
        self.mode = mode;
        let (rows, columns) = (self.maze.rows(), self.maze.columns());
        self.replace_maze(rows, columns);
    }

    fn replace_maze(&mut self, rows: usize, columns: usize) {
        let steps = self.generation_steps_per_tick;
        *self = Self::with_dimensions(self.difficulty, self.mode, rows, columns);
        self.generation_steps_per_tick = steps;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const FRAME: Duration = Duration::from_millis(100);

    fn generated(mode: GameMode, rows: usize, columns: usize, seed: u64) -> (Game, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = Game::with_dimensions(Difficulty::Easy, mode, rows, columns);
        while game.state() == GameState::Generating {
            game.tick(FRAME, &mut rng);
        }
        (game, rng)
    }

    #[test]
    fn generation_animates_over_ticks_then_plays() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut game = Game::new(Difficulty::Easy, GameMode::Classic);
        game.set_generation_steps_per_tick(1);

        let events = game.tick(FRAME, &mut rng);
        assert!(events.is_empty());
        assert_eq!(game.state(), GameState::Generating);
        assert_eq!(game.elapsed(), Duration::ZERO);

        let mut completions = 0;
        while game.state() == GameState::Generating {
            completions += game
                .tick(FRAME, &mut rng)
                .iter()
                .filter(|e| **e == GameEvent::GenerationComplete)
                .count();
        }
        assert_eq!(completions, 1);
        assert!(game.maze().is_perfect());
    }

    #[test]
    fn clock_runs_only_while_playing() {
        let (mut game, mut rng) = generated(GameMode::Classic, 4, 4, 2);
        game.tick(FRAME, &mut rng);
        assert_eq!(game.elapsed(), FRAME);

        game.pause();
        game.tick(FRAME, &mut rng);
        assert_eq!(game.elapsed(), FRAME);
        assert_eq!(game.try_move(Dir::Right), None);

        game.toggle_pause();
        game.tick(FRAME, &mut rng);
        assert_eq!(game.elapsed(), FRAME * 2);
    }

    #[test]
    fn memory_mode_hides_maze_between_flashes() {
        let (mut game, mut rng) = generated(GameMode::Memory, 4, 4, 3);
        assert!(game.maze_visible());
        let second = Duration::from_secs(1);
        let mut visibility = Vec::new();
        for _ in 0..9 {
            game.tick(second, &mut rng);
            visibility.push(game.maze_visible());
        }
        // Seconds 1..=9: preview through 3, then only at 8.
        assert_eq!(
            visibility,
            vec![true, true, true, false, false, false, false, true, false]
        );
    }

    #[test]
    fn frantic_mode_scrambles_once_per_interval() {
        let (mut game, mut rng) = generated(GameMode::Frantic, 8, 8, 4);
        let frame = Duration::from_millis(50);
        let mut started = 0;
        let mut finished = 0;
        // 50 ms frames over 7 seconds: cycles at 3 s and 6 s, each 45 frames.
        for _ in 0..140 {
            for event in game.tick(frame, &mut rng) {
                match event {
                    GameEvent::ScrambleStarted { .. } => started += 1,
                    GameEvent::ScrambleFinished => finished += 1,
                    GameEvent::GenerationComplete => {}
                }
            }
        }
        assert_eq!(started, 2);
        assert!(finished >= 1);
        assert!(finished <= started);
        assert!(game.maze().walls_consistent());
    }

    #[test]
    fn restart_keeps_maze_and_resets_clock() {
        let (mut game, mut rng) = generated(GameMode::Classic, 5, 5, 5);
        let walls: Vec<[bool; 4]> = game.maze().cells().map(|c| c.shown_walls()).collect();
        game.tick(FRAME, &mut rng);
        game.restart();
        assert_eq!(game.elapsed(), Duration::ZERO);
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.maze().current(), Maze::START);
        let after: Vec<[bool; 4]> = game.maze().cells().map(|c| c.shown_walls()).collect();
        assert_eq!(walls, after);
    }

    #[test]
    fn changing_difficulty_regenerates_from_scratch() {
        let (mut game, _) = generated(GameMode::Classic, 5, 5, 6);
        game.set_difficulty(Difficulty::Medium);
        assert_eq!(game.state(), GameState::Generating);
        assert_eq!(game.maze().rows(), 15);
        assert_eq!(game.maze().walls_removed(), 0);
        assert_eq!(game.maze().stack_len(), 0);
    }

    #[test]
    fn changing_mode_regenerates_the_maze() {
        let (mut game, mut rng) = generated(GameMode::Classic, 6, 6, 7);
        game.tick(FRAME, &mut rng);
        game.set_mode(GameMode::Memory);
        assert_eq!(game.mode(), GameMode::Memory);
        assert_eq!(game.state(), GameState::Generating);
        assert_eq!(game.elapsed(), Duration::ZERO);
        assert_eq!(game.maze().rows(), 6);
        assert_eq!(game.maze().walls_removed(), 0);
    }

    #[test]
    fn changing_mode_mid_scramble_leaves_no_cell_rotating() {
        let (mut game, mut rng) = generated(GameMode::Frantic, 8, 8, 4);
        let frame = Duration::from_millis(50);
        let mut frames = 0;
        while !game.maze().is_scrambling() {
            game.tick(frame, &mut rng);
            frames += 1;
            assert!(frames < 200, "no scramble cycle started");
        }
        game.tick(frame, &mut rng);
        assert!(game.maze().cells().any(|c| c.is_rotating()));

        game.set_mode(GameMode::Classic);
        assert!(!game.maze().is_scrambling());
        assert!(game.maze().cells().all(|c| !c.is_rotating()));

        while game.state() == GameState::Generating {
            game.tick(frame, &mut rng);
        }
        for _ in 0..200 {
            game.tick(frame, &mut rng);
        }
        assert!(!game.maze().is_scrambling());
        assert!(game.maze().cells().all(|c| !c.is_rotating()));
        assert!(game.maze().is_perfect());
    }
}
