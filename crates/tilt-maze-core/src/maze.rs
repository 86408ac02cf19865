//! Maze grids.
//!
//! Maps are data: a table of [`MapDef`]s picked by index, copied into a
//! [`Maze`] at the start of every round.

use crate::config::Geometry;

pub const MAZE_WIDTH: usize = 16;
pub const MAZE_HEIGHT: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Cell {
    Empty = 0,
    Wall = 1,
    Hole = 2,
    Goal = 3,
}

impl Cell {
    const fn from_code(code: u8) -> Self {
        match code {
            1 => Cell::Wall,
            2 => Cell::Hole,
            3 => Cell::Goal,
            _ => Cell::Empty,
        }
    }
}

pub type Grid = [[Cell; MAZE_WIDTH]; MAZE_HEIGHT];

/// Grid coordinate `(col, row)`.
pub type CellPos = (u8, u8);

pub struct MapDef {
    pub name: &'static str,
    pub grid: Grid,
    pub start: CellPos,
    pub goal: CellPos,
}

/// Decodes a table written with `0` floor, `1` wall, `2` hole, `3` goal.
const fn decode(raw: [[u8; MAZE_WIDTH]; MAZE_HEIGHT]) -> Grid {
    let mut grid = [[Cell::Empty; MAZE_WIDTH]; MAZE_HEIGHT];
    let mut row = 0;
    while row < MAZE_HEIGHT {
        let mut col = 0;
        while col < MAZE_WIDTH {
            grid[row][col] = Cell::from_code(raw[row][col]);
            col += 1;
        }
        row += 1;
    }
    grid
}

pub static MAPS: [MapDef; 3] = [
    MapDef {
        name: "CLASSIC",
        grid: decode([
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 1, 0, 1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1],
            [1, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1],
            [1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 1, 0, 1, 0, 1],
            [1, 1, 1, 1, 1, 1, 0, 1, 1, 1, 0, 1, 0, 1, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1],
            [1, 0, 1, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 0, 1],
            [1, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1],
            [1, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 0, 1, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 1, 0, 1],
            [1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 3, 1],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        ]),
        start: (1, 1),
        goal: (14, 14),
    },
    MapDef {
        name: "ZIGZAG",
        grid: decode([
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1],
            [1, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1],
            [1, 0, 1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 0, 1],
            [1, 0, 1, 0, 1, 0, 0, 0, 0, 0, 0, 1, 0, 1, 0, 1],
            [1, 0, 1, 0, 1, 0, 1, 1, 1, 1, 0, 1, 0, 1, 0, 1],
            [1, 0, 1, 0, 1, 0, 1, 2, 1, 1, 0, 1, 0, 1, 0, 1],
            [1, 0, 1, 0, 1, 0, 1, 0, 0, 0, 0, 1, 0, 1, 0, 1],
            [1, 0, 1, 0, 1, 0, 1, 1, 1, 1, 1, 1, 0, 1, 0, 1],
            [1, 0, 1, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1],
            [1, 0, 1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1],
            [1, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 3, 1],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        ]),
        start: (1, 1),
        goal: (14, 14),
    },
    MapDef {
        name: "PILLARS",
        grid: decode([
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 3, 1],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        ]),
        start: (1, 1),
        goal: (14, 14),
    },
];

/// Map definition by index, wrapping past the end of the table.
pub fn map(index: usize) -> &'static MapDef {
    &MAPS[index % MAPS.len()]
}

/// The grid of the round in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct Maze {
    cells: Grid,
    start: CellPos,
}

impl Maze {
    pub fn load(index: usize) -> Self {
        let def = map(index);
        Self {
            cells: def.grid,
            start: def.start,
        }
    }

    pub fn start(&self) -> CellPos {
        self.start
    }

    /// Cell kind at a grid coordinate; anything outside the grid is a wall.
    pub fn cell(&self, col: i32, row: i32) -> Cell {
        if col < 0 || row < 0 || col >= MAZE_WIDTH as i32 || row >= MAZE_HEIGHT as i32 {
            return Cell::Wall;
        }
        self.cells[row as usize][col as usize]
    }

    /// Cell kind under a screen pixel.
    pub fn cell_at(&self, geo: &Geometry, x: f32, y: f32) -> Cell {
        self.cell(
            geo.cell_index(x, geo.offset_x),
            geo.cell_index(y, geo.offset_y),
        )
    }
}
