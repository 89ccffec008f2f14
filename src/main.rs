use clap::Parser;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use frantic_maze::{Difficulty, Dir, Game, GameEvent, GameMode, GameState, Maze, Pos, Side};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::io::{self, Stdout, Write};
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

const CELL_W: usize = 2;
const DEFAULT_TICK_MS: u64 = 16;
const DEFAULT_RENDER_FPS: u64 = 60;
const WALL_PALETTE: [Color; 7] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
    Color::White,
];

#[derive(Debug, Parser)]
#[command(name = "frantic-maze")]
#[command(about = "Escape a procedurally generated maze whose walls may rotate")]
struct Cli {
    #[arg(long, default_value = "easy")]
    difficulty: Difficulty,
    #[arg(long, default_value = "classic")]
    mode: GameMode,
    /// Seed for reproducible mazes.
    #[arg(long)]
    seed: Option<u64>,
    /// A colour name, "mixed" or "mixed-animated".
    #[arg(long, default_value = "white")]
    wall_color: WallColor,
    /// Generator steps per tick while the maze is being built.
    #[arg(long, default_value_t = frantic_maze::game::DEFAULT_GENERATION_STEPS_PER_TICK)]
    generation_steps: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum WallColor {
    Solid(Color),
    Mixed,
    MixedAnimated,
}

impl FromStr for WallColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let color = match s.trim().to_ascii_lowercase().as_str() {
            "mixed" => return Ok(WallColor::Mixed),
            "mixed-animated" => return Ok(WallColor::MixedAnimated),
            "white" => Color::White,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "magenta" | "purple" => Color::Magenta,
            "cyan" => Color::Cyan,
            "grey" | "gray" => Color::Grey,
            other => return Err(format!("unknown wall color '{other}'")),
        };
        Ok(WallColor::Solid(color))
    }
}

/// Per-cell wall colours for the mixed palettes.
struct Palette {
    mode: WallColor,
    colors: Vec<Color>,
    columns: usize,
}

impl Palette {
    fn new(mode: WallColor, maze: &Maze, rng: &mut impl Rng) -> Self {
        let mut palette = Self {
            mode,
            colors: Vec::new(),
            columns: 0,
        };
        palette.reshuffle(maze, rng);
        palette
    }

    fn reshuffle(&mut self, maze: &Maze, rng: &mut impl Rng) {
        self.columns = maze.columns();
        self.colors = (0..maze.rows() * maze.columns())
            .map(|_| *WALL_PALETTE.choose(rng).unwrap_or(&Color::White))
            .collect();
    }

    fn color_for(&self, pos: Pos, rng: &mut impl Rng) -> Color {
        match self.mode {
            WallColor::Solid(color) => color,
            WallColor::Mixed => self
                .colors
                .get(pos.row * self.columns + pos.column)
                .copied()
                .unwrap_or(Color::White),
            WallColor::MixedAnimated => *WALL_PALETTE.choose(rng).unwrap_or(&Color::White),
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Goal,
    Head,
    Wall,
    Sweeping,
    Incoming,
    Unvisited,
    Empty,
}

#[derive(Clone, Copy, PartialEq)]
struct Tile {
    glyph: Glyph,
    color: Color,
}

const BLANK: Tile = Tile {
    glyph: Glyph::Empty,
    color: Color::Reset,
};

struct Renderer {
    last: Vec<Tile>,
    last_hud: String,
    width: usize,
    height: usize,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    fn new(width: usize, height: usize) -> Self {
        Self {
            last: vec![BLANK; width * height],
            last_hud: String::new(),
            width,
            height,
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    fn fit(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            *self = Self::new(width, height);
        }
    }
}

enum Command {
    Move(Dir),
    TogglePause,
    Restart,
    NewMaze,
    Difficulty(Difficulty),
    CycleMode,
    Quit,
}

fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &cli);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn run(stdout: &mut Stdout, cli: &Cli) -> io::Result<()> {
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut game = Game::new(cli.difficulty, cli.mode);
    game.set_generation_steps_per_tick(cli.generation_steps);
    let mut palette = Palette::new(cli.wall_color, game.maze(), &mut rng);
    let (width, height) = glyph_size(game.maze());
    let mut renderer = Renderer::new(width, height);

    let (tick_ms, render_fps) = read_speed_settings();
    let tick_time = Duration::from_millis(tick_ms);
    let frame_time = Duration::from_micros(1_000_000 / render_fps.max(1));
    let mut last_tick = Instant::now();
    info!(
        "starting {} maze in {} mode (tick {}ms, {} fps)",
        game.difficulty(),
        game.mode(),
        tick_ms,
        render_fps
    );

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                    continue;
                }
                match command_for(key.code) {
                    Some(Command::Quit) => return Ok(()),
                    Some(command) => apply(command, &mut game, &mut palette, &mut rng),
                    None => {}
                }
            }
        }

        let since_tick = last_tick.elapsed();
        if since_tick >= tick_time {
            last_tick = Instant::now();
            for event in game.tick(since_tick, &mut rng) {
                match event {
                    GameEvent::GenerationComplete => debug!("maze ready"),
                    GameEvent::ScrambleStarted { cells } => {
                        debug!("rotating walls of {} cells", cells)
                    }
                    GameEvent::ScrambleFinished => debug!("walls settled"),
                }
            }
        }

        render(stdout, &game, &palette, &mut renderer, &mut rng)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn read_speed_settings() -> (u64, u64) {
    let tick_ms = std::env::var("MAZE_TICK_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_TICK_MS);
    let render_fps = std::env::var("MAZE_FPS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RENDER_FPS);
    (tick_ms, render_fps)
}

fn command_for(code: KeyCode) -> Option<Command> {
    let command = match code {
        KeyCode::Up | KeyCode::Char('k') => Command::Move(Dir::Up),
        KeyCode::Down | KeyCode::Char('j') => Command::Move(Dir::Down),
        KeyCode::Left | KeyCode::Char('h') => Command::Move(Dir::Left),
        KeyCode::Right | KeyCode::Char('l') => Command::Move(Dir::Right),
        KeyCode::Char('p') => Command::TogglePause,
        KeyCode::Char('r') => Command::Restart,
        KeyCode::Char('n') => Command::NewMaze,
        KeyCode::Char('m') => Command::CycleMode,
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
        KeyCode::Char(c @ '1'..='4') => {
            let idx = c as usize - '1' as usize;
            Command::Difficulty(Difficulty::ALL[idx])
        }
        _ => return None,
    };
    Some(command)
}

fn apply(command: Command, game: &mut Game, palette: &mut Palette, rng: &mut impl Rng) {
    match command {
        Command::Move(dir) => {
            if let Some(outcome) = game.try_move(dir) {
                if outcome.reached_goal() {
                    info!("escaped in {}s", game.elapsed_secs());
                }
            }
        }
        Command::TogglePause => game.toggle_pause(),
        Command::Restart => game.restart(),
        Command::NewMaze => {
            game.new_maze();
            palette.reshuffle(game.maze(), rng);
        }
        Command::Difficulty(difficulty) => {
            game.set_difficulty(difficulty);
            palette.reshuffle(game.maze(), rng);
        }
        Command::CycleMode => {
            game.set_mode(game.mode().next());
            palette.reshuffle(game.maze(), rng);
        }
        Command::Quit => {}
    }
}

fn glyph_size(maze: &Maze) -> (usize, usize) {
    (maze.columns() * 2 + 1, maze.rows() * 2 + 1)
}

/// Shown state of the horizontal boundary above grid row `i` (the bottom
/// border when `i == rows`).
fn horizontal_wall(maze: &Maze, i: usize, column: usize) -> bool {
    let (pos, side) = if i < maze.rows() {
        (Pos::new(i, column), Side::Top)
    } else {
        (Pos::new(maze.rows() - 1, column), Side::Bottom)
    };
    maze.cell(pos).map_or(true, |cell| cell.is_shown(side))
}

/// Shown state of the vertical boundary left of grid column `j`.
fn vertical_wall(maze: &Maze, row: usize, j: usize) -> bool {
    let (pos, side) = if j < maze.columns() {
        (Pos::new(row, j), Side::Left)
    } else {
        (Pos::new(row, maze.columns() - 1), Side::Right)
    };
    maze.cell(pos).map_or(true, |cell| cell.is_shown(side))
}

fn boundary_glyph(pos: Pos, side: Side) -> (usize, usize) {
    let (gx, gy) = (pos.column * 2 + 1, pos.row * 2 + 1);
    match side {
        Side::Top => (gx, gy - 1),
        Side::Bottom => (gx, gy + 1),
        Side::Left => (gx - 1, gy),
        Side::Right => (gx + 1, gy),
    }
}

/// Lays the maze out on a glyph grid: cells on odd coordinates, boundaries
/// between them, corners on even coordinates.
fn compose(game: &Game, palette: &Palette, rng: &mut impl Rng) -> Vec<Tile> {
    let maze = game.maze();
    let (width, height) = glyph_size(maze);
    let mut tiles = vec![BLANK; width * height];
    if !game.maze_visible() {
        return tiles;
    }

    for gy in 0..height {
        for gx in 0..width {
            let (i, j) = (gy / 2, gx / 2);
            let row = i.min(maze.rows() - 1);
            let column = j.min(maze.columns() - 1);
            let shown = match (gy % 2, gx % 2) {
                (0, 0) => {
                    (i > 0 && vertical_wall(maze, i - 1, j))
                        || (i < maze.rows() && vertical_wall(maze, i, j))
                        || (j > 0 && horizontal_wall(maze, i, j - 1))
                        || (j < maze.columns() && horizontal_wall(maze, i, j))
                }
                (0, _) => horizontal_wall(maze, i, j),
                (_, 0) => vertical_wall(maze, i, j),
                _ => false,
            };
            if shown {
                tiles[gy * width + gx] = Tile {
                    glyph: Glyph::Wall,
                    color: palette.color_for(Pos::new(row, column), rng),
                };
            }
        }
    }

    for cell in maze.cells() {
        let pos = cell.pos();
        let (gx, gy) = boundary_glyph(pos, Side::Top);
        let center = (gy + 1) * width + gx;
        if !cell.visited() {
            tiles[center] = Tile {
                glyph: Glyph::Unvisited,
                color: Color::DarkGrey,
            };
        }
        if cell.is_goal() {
            tiles[center] = Tile {
                glyph: Glyph::Goal,
                color: Color::Green,
            };
        }

        if let Some(rotation) = cell.rotation() {
            let from = rotation.wall;
            let swept = cell.wall(from).theta() - from.rest_theta();
            let (sx, sy) = boundary_glyph(pos, from);
            let (dx, dy) = boundary_glyph(pos, from.rotates_into());
            let (moving, resting) = if swept < 45 {
                ((sx, sy), (dx, dy))
            } else {
                ((dx, dy), (sx, sy))
            };
            tiles[moving.1 * width + moving.0] = Tile {
                glyph: Glyph::Sweeping,
                color: Color::Yellow,
            };
            tiles[resting.1 * width + resting.0] = Tile {
                glyph: Glyph::Incoming,
                color: Color::DarkYellow,
            };
        }
    }

    if let Some(head) = maze.generation_head() {
        let (gx, gy) = (head.column * 2 + 1, head.row * 2 + 1);
        tiles[gy * width + gx] = Tile {
            glyph: Glyph::Head,
            color: Color::Magenta,
        };
    }

    if game.state() != GameState::Generating {
        let player = maze.current();
        let (gx, gy) = (player.column * 2 + 1, player.row * 2 + 1);
        tiles[gy * width + gx] = Tile {
            glyph: Glyph::Player,
            color: Color::Yellow,
        };
    }
    tiles
}

fn hud_for(game: &Game) -> String {
    let status = match game.state() {
        GameState::Generating => "building...".to_string(),
        GameState::Playing => format!("{}s", game.elapsed_secs()),
        GameState::Paused => format!("{}s PAUSED", game.elapsed_secs()),
        GameState::Won => format!("ESCAPED in {}s! r restart, n new maze", game.elapsed_secs()),
    };
    format!(
        "{}  Difficulty: {}  Mode: {}  (arrows move, p pause, 1-4 size, m mode, q quit)",
        status,
        game.difficulty(),
        game.mode()
    )
}

fn render(
    stdout: &mut Stdout,
    game: &Game,
    palette: &Palette,
    renderer: &mut Renderer,
    rng: &mut impl Rng,
) -> io::Result<()> {
    let (width, height) = glyph_size(game.maze());
    renderer.fit(width, height);
    let needed_h = (height + 2) as u16;
    let needed_w = (width * CELL_W) as u16;

    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }
    if renderer.needs_full {
        stdout.queue(Clear(ClearType::All))?;
    }

    let hud = hud_for(game);
    if renderer.needs_full || hud != renderer.last_hud {
        stdout.queue(MoveTo(0, renderer.origin_y - 1))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        stdout.queue(Print(&hud))?;
        stdout.queue(ResetColor)?;
        renderer.last_hud = hud;
    }

    let tiles = compose(game, palette, rng);
    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let tile = tiles[idx];
            if renderer.needs_full || tile != renderer.last[idx] {
                renderer.last[idx] = tile;
                draw_tile(stdout, renderer, x, y, tile)?;
            }
        }
    }
    renderer.needs_full = false;

    stdout.flush()?;
    Ok(())
}

fn draw_tile(
    stdout: &mut Stdout,
    renderer: &Renderer,
    x: usize,
    y: usize,
    tile: Tile,
) -> io::Result<()> {
    let text = match tile.glyph {
        Glyph::Player => "😃",
        Glyph::Goal => "🏁",
        Glyph::Head => "◆",
        Glyph::Wall => "██",
        Glyph::Sweeping => "▓▓",
        Glyph::Incoming => "░░",
        Glyph::Unvisited => "··",
        Glyph::Empty => "  ",
    };
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let y_pos = renderer.origin_y + y as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(tile.color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}
