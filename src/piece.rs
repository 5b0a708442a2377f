use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};

// ============================================================================
// Shapes
// ============================================================================

pub type Cell = u8;

/// Side of the square array every piece pattern fits in.
pub const MAX_PIECE_SIZE: usize = 4;
/// Highest color id a cell may carry.
pub const MAX_COLOR: Cell = 7;

type CellGrid = [[Cell; MAX_PIECE_SIZE]; MAX_PIECE_SIZE];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Shape {
    T,
    S,
    Z,
    J,
    L,
    I,
    O,
}

impl Shape {
    pub const ALL: [Shape; 7] = [
        Shape::T,
        Shape::S,
        Shape::Z,
        Shape::J,
        Shape::L,
        Shape::I,
        Shape::O,
    ];

    /// Color id written into every occupied cell of this shape.
    pub fn color(self) -> Cell {
        match self {
            Shape::T => 1,
            Shape::S => 2,
            Shape::Z => 3,
            Shape::J => 4,
            Shape::L => 5,
            Shape::I => 6,
            Shape::O => 7,
        }
    }

    /// Spawn orientation as `(width, height, cells)`.
    fn pattern(self) -> (usize, usize, CellGrid) {
        let c = self.color();
        match self {
            Shape::T => (3, 2, [[c, c, c, 0], [0, c, 0, 0], [0; 4], [0; 4]]),
            Shape::S => (3, 2, [[0, c, c, 0], [c, c, 0, 0], [0; 4], [0; 4]]),
            Shape::Z => (3, 2, [[c, c, 0, 0], [0, c, c, 0], [0; 4], [0; 4]]),
            Shape::J => (3, 2, [[c, 0, 0, 0], [c, c, c, 0], [0; 4], [0; 4]]),
            Shape::L => (3, 2, [[0, 0, c, 0], [c, c, c, 0], [0; 4], [0; 4]]),
            Shape::I => (4, 1, [[c, c, c, c], [0; 4], [0; 4], [0; 4]]),
            Shape::O => (2, 2, [[c, c, 0, 0], [c, c, 0, 0], [0; 4], [0; 4]]),
        }
    }

    fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

// ============================================================================
// Piece
// ============================================================================

/// A tetromino placed on the field.
///
/// `x`/`y` anchor the top-left corner of the cell pattern. Pieces are
/// values: rotating or shifting yields a new piece and leaves the receiver
/// untouched, so callers can test a candidate before committing it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Piece {
    cells: CellGrid,
    width: usize,
    height: usize,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// Spawn position for `shape`: horizontally centered, top row.
    pub fn new(shape: Shape, columns: usize) -> Self {
        let (width, _, _) = shape.pattern();
        let x = columns as i32 / 2 - width as i32 / 2;
        Self::new_at(shape, x, 0)
    }

    pub fn new_at(shape: Shape, x: i32, y: i32) -> Self {
        let (width, height, cells) = shape.pattern();
        Self {
            cells,
            width,
            height,
            x,
            y,
        }
    }

    /// Builds a piece from an arbitrary rectangular pattern.
    pub fn from_cells<R: AsRef<[Cell]>>(rows: &[R], x: i32, y: i32) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        if height == 0 || width == 0 {
            return Err(Error::EmptyPiece);
        }
        if width > MAX_PIECE_SIZE || height > MAX_PIECE_SIZE {
            return Err(Error::PieceTooLarge {
                width,
                height,
                max: MAX_PIECE_SIZE,
            });
        }

        let mut cells = [[0; MAX_PIECE_SIZE]; MAX_PIECE_SIZE];
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(Error::RaggedPiece {
                    row: r,
                    expected: width,
                    found: row.len(),
                });
            }
            for (c, &value) in row.iter().enumerate() {
                if value > MAX_COLOR {
                    return Err(Error::InvalidCell {
                        row: r,
                        col: c,
                        value,
                    });
                }
                cells[r][c] = value;
            }
        }
        if cells.iter().flatten().all(|&value| value == 0) {
            return Err(Error::BlankPiece);
        }

        Ok(Self {
            cells,
            width,
            height,
            x,
            y,
        })
    }

    /// Draws the next shape from `provider` and places it at the spawn point.
    pub fn spawn<P: PieceProvider + ?Sized>(provider: &mut P, columns: usize) -> Self {
        Self::new(provider.next_shape(), columns)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at pattern column `col`, pattern row `row`; 0 outside the pattern.
    pub fn cell(&self, col: usize, row: usize) -> Cell {
        if col < self.width && row < self.height {
            self.cells[row][col]
        } else {
            0
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells[..self.height]
            .iter()
            .map(move |row| &row[..self.width])
    }

    /// Occupied cells in field coordinates as `(x, y, color)`.
    pub fn blocks(&self) -> impl Iterator<Item = (i32, i32, Cell)> + '_ {
        self.rows().enumerate().flat_map(move |(cy, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, &value)| value != 0)
                .map(move |(cx, &value)| (self.x + cx as i32, self.y + cy as i32, value))
        })
    }

    /// Quarter turn clockwise around the same origin.
    ///
    /// Column `c` of this pattern, read top to bottom, becomes row `c` of
    /// the result read right to left.
    pub fn rotate(&self) -> Self {
        let mut cells = [[0; MAX_PIECE_SIZE]; MAX_PIECE_SIZE];
        for r in 0..self.height {
            for c in 0..self.width {
                cells[c][self.height - 1 - r] = self.cells[r][c];
            }
        }
        Self {
            cells,
            width: self.height,
            height: self.width,
            x: self.x,
            y: self.y,
        }
    }

    pub fn shift(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let line: Vec<String> = row.iter().map(|value| value.to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

// ============================================================================
// Piece Provider Trait
// ============================================================================

/// Source of shapes for new pieces.
pub trait PieceProvider {
    fn next_shape(&mut self) -> Shape;
}

/// Uniform choice over the seven shapes.
pub struct RandomPieceProvider {
    rng: StdRng,
}

impl RandomPieceProvider {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Same seed, same shape sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPieceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceProvider for RandomPieceProvider {
    fn next_shape(&mut self) -> Shape {
        Shape::random(&mut self.rng)
    }
}

/// Cycles through a fixed list of shapes.
pub struct SequencePieceProvider {
    shapes: Vec<Shape>,
    index: usize,
}

impl SequencePieceProvider {
    /// # Panics
    ///
    /// Panics if `shapes` is empty.
    pub fn new(shapes: Vec<Shape>) -> Self {
        assert!(!shapes.is_empty(), "sequence provider needs at least one shape");
        Self { shapes, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_shape(&mut self) -> Shape {
        let shape = self.shapes[self.index % self.shapes.len()];
        self.index += 1;
        shape
    }
}
