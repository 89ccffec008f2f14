use std::fmt;
use std::str::FromStr;

/// Maze size tiers. Rows and columns are equal for every tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    Impossible,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Impossible,
    ];

    /// (rows, columns)
    pub fn dimensions(self) -> (usize, usize) {
        match self {
            Difficulty::Easy => (10, 10),
            Difficulty::Medium => (15, 15),
            Difficulty::Hard => (20, 20),
            Difficulty::Impossible => (25, 25),
        }
    }

    /// Cells asked for per scramble cycle.
    pub fn rotating_cells(self) -> usize {
        self.dimensions().0 * 2
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Impossible => "impossible",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown difficulty '{s}' (easy, medium, hard, impossible)"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameMode {
    /// The maze is always visible.
    #[default]
    Classic,
    /// The maze is shown briefly, then only flashes back periodically.
    Memory,
    /// Walls rotate every few seconds.
    Frantic,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Classic, GameMode::Memory, GameMode::Frantic];

    pub fn name(self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::Memory => "memory",
            GameMode::Frantic => "frantic",
        }
    }

    pub fn next(self) -> GameMode {
        match self {
            GameMode::Classic => GameMode::Memory,
            GameMode::Memory => GameMode::Frantic,
            GameMode::Frantic => GameMode::Classic,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameMode::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown mode '{s}' (classic, memory, frantic)"))
    }
}
