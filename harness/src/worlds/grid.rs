//! Four-connected grid mazes.
//!
//! [`Grid`] is an implicit [`StateSpace`]: successors are computed from the
//! wall map on demand, nothing is materialized. [`GridWorld::to_problem`]
//! flattens the same maze into a `graph_problem.v1` file for the harness.
//!
//! Map syntax, one row per line:
//!
//! ```text
//! S..#    S start, G goal, # wall, anything else open
//! .#.G
//! ```

use std::collections::BTreeMap;

use wayfind_search::{Cost, Heuristic, StateSpace};

use crate::problem::{EdgeSpec, GraphProblemV1, GRAPH_PROBLEM_SCHEMA};

/// A grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// State name used in problem files: `r{row}c{col}`.
    #[must_use]
    pub fn name(self) -> String {
        format!("r{}c{}", self.row, self.col)
    }

    #[must_use]
    pub fn manhattan(self, other: Cell) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

/// Error parsing a grid map.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridParseError {
    #[error("grid map is empty")]
    Empty,
    #[error("row {row} has width {found}, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },
    #[error("grid map needs exactly one {marker:?}, found {count}")]
    Marker { marker: char, count: usize },
}

/// Rectangular maze with unit-cost moves right, down, left and up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    walls: Vec<bool>,
}

impl Grid {
    #[must_use]
    pub fn open(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            walls: vec![false; width * height],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn set_wall(&mut self, cell: Cell) {
        if self.in_bounds(cell) {
            self.walls[cell.row * self.width + cell.col] = true;
        }
    }

    #[must_use]
    pub fn is_open(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && !self.walls[cell.row * self.width + cell.col]
    }

    fn in_bounds(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    /// Open neighbours in move order: right, down, left, up.
    #[must_use]
    pub fn neighbours(&self, cell: Cell) -> Vec<Cell> {
        let mut out = Vec::with_capacity(4);
        let mut push = |row: Option<usize>, col: Option<usize>| {
            if let (Some(row), Some(col)) = (row, col) {
                let next = Cell::new(row, col);
                if self.is_open(next) {
                    out.push(next);
                }
            }
        };
        push(Some(cell.row), cell.col.checked_add(1));
        push(cell.row.checked_add(1), Some(cell.col));
        push(Some(cell.row), cell.col.checked_sub(1));
        push(cell.row.checked_sub(1), Some(cell.col));
        out
    }

    /// Open cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height)
            .flat_map(move |row| (0..self.width).map(move |col| Cell::new(row, col)))
            .filter(|&cell| self.is_open(cell))
    }
}

impl StateSpace for Grid {
    type State = Cell;

    fn successors(&self, state: &Cell) -> Vec<(Cell, Cost)> {
        if !self.is_open(*state) {
            return Vec::new();
        }
        self.neighbours(*state).into_iter().map(|c| (c, Cost::ONE)).collect()
    }

    fn contains(&self, state: &Cell) -> bool {
        self.is_open(*state)
    }

    fn is_reversible(&self) -> bool {
        true
    }

    fn predecessors(&self, state: &Cell) -> Vec<(Cell, Cost)> {
        self.successors(state)
    }
}

/// Manhattan distance to a fixed goal cell; consistent on unit grids.
#[derive(Debug, Clone, Copy)]
pub struct Manhattan {
    pub goal: Cell,
}

impl Heuristic<Cell> for Manhattan {
    #[allow(clippy::cast_precision_loss)]
    fn estimate(&self, state: &Cell) -> Cost {
        Cost::new(state.manhattan(self.goal) as f64)
    }
}

/// A maze with its start and goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridWorld {
    pub grid: Grid,
    pub start: Cell,
    pub goal: Cell,
}

impl GridWorld {
    /// Parse a map (see the module docs). Trailing whitespace is ignored.
    ///
    /// # Errors
    ///
    /// [`GridParseError`] for an empty or ragged map, or when `S` or `G` is
    /// missing or repeated.
    pub fn parse(map: &str) -> Result<Self, GridParseError> {
        let rows: Vec<&str> = map.lines().map(str::trim_end).filter(|l| !l.is_empty()).collect();
        let width = rows.first().map_or(0, |r| r.chars().count());
        if width == 0 {
            return Err(GridParseError::Empty);
        }
        let mut grid = Grid::open(width, rows.len());
        let mut starts = Vec::new();
        let mut goals = Vec::new();
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(GridParseError::Ragged {
                    row,
                    expected: width,
                    found,
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let cell = Cell::new(row, col);
                match ch {
                    '#' => grid.set_wall(cell),
                    'S' => starts.push(cell),
                    'G' => goals.push(cell),
                    _ => {}
                }
            }
        }
        let start = single(&starts, 'S')?;
        let goal = single(&goals, 'G')?;
        Ok(Self { grid, start, goal })
    }

    #[must_use]
    pub fn heuristic(&self) -> Manhattan {
        Manhattan { goal: self.goal }
    }

    /// The maze as an undirected graph problem with a Manhattan heuristic
    /// table. Edges are listed right and down from each cell, row-major.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_problem(&self) -> GraphProblemV1 {
        let mut edges = Vec::new();
        let mut heuristic = BTreeMap::new();
        for cell in self.grid.cells() {
            heuristic.insert(cell.name(), cell.manhattan(self.goal) as f64);
            for next in self.grid.neighbours(cell) {
                if next > cell {
                    edges.push(EdgeSpec {
                        from: cell.name(),
                        to: next.name(),
                        cost: 1.0,
                    });
                }
            }
        }
        GraphProblemV1 {
            schema_version: GRAPH_PROBLEM_SCHEMA.to_string(),
            directed: false,
            edges,
            states: vec![self.start.name(), self.goal.name()],
            start: self.start.name(),
            goal: self.goal.name(),
            heuristic,
        }
    }
}

fn single(cells: &[Cell], marker: char) -> Result<Cell, GridParseError> {
    match cells {
        [cell] => Ok(*cell),
        _ => Err(GridParseError::Marker {
            marker,
            count: cells.len(),
        }),
    }
}

/// The bundled maze.
pub const MAZE: &str = "\
S...#.......
.##.#.####..
.#..#....#..
.#.####.##.#
.#......#...
.######.#.#.
........#.#G
";

/// Parse [`MAZE`].
///
/// # Errors
///
/// Never for the bundled map; kept fallible to share [`GridWorld::parse`].
pub fn maze() -> Result<GridWorld, GridParseError> {
    GridWorld::parse(MAZE)
}
