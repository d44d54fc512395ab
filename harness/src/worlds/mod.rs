//! Bundled sample worlds.
//!
//! Each world is a ready-made problem the CLI can run by name
//! (`wayfind world <name>`), and a fixture for tests and benchmarks.

pub mod dinner;
pub mod grid;
pub mod map_coloring;
pub mod n_queens;
pub mod romania;

use std::fmt;
use std::str::FromStr;

use crate::problem::ProblemV1;

/// The worlds available by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum World {
    /// Arad to Bucharest on the Romania road map.
    Romania,
    /// The bundled grid maze.
    Maze,
    /// Three-colouring the map of Australia.
    Australia,
    /// Eight queens.
    Queens,
    /// AND-OR plan for hosting dinner.
    Dinner,
}

impl World {
    pub const ALL: [World; 5] = [World::Romania, World::Maze, World::Australia, World::Queens, World::Dinner];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            World::Romania => "romania",
            World::Maze => "maze",
            World::Australia => "australia",
            World::Queens => "queens",
            World::Dinner => "dinner",
        }
    }

    /// The world as a problem file.
    ///
    /// # Errors
    ///
    /// [`grid::GridParseError`] if the bundled maze fails to parse.
    pub fn problem(self) -> Result<ProblemV1, grid::GridParseError> {
        Ok(match self {
            World::Romania => romania::to_bucharest("Arad").into(),
            World::Maze => grid::maze()?.to_problem().into(),
            World::Australia => map_coloring::australia().into(),
            World::Queens => n_queens::queens_problem(8).into(),
            World::Dinner => dinner::dinner().into(),
        })
    }
}

impl fmt::Display for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown world {0:?} (expected one of romania, maze, australia, queens, dinner)")]
pub struct UnknownWorld(pub String);

impl FromStr for World {
    type Err = UnknownWorld;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        World::ALL
            .into_iter()
            .find(|world| world.as_str() == s)
            .ok_or_else(|| UnknownWorld(s.to_string()))
    }
}
