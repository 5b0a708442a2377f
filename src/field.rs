use std::fmt;

use crate::error::{Error, Result};
use crate::piece::{Cell, Piece};

/// Value stored in every cell of the row beneath the visible field.
const SENTINEL: Cell = 1;

/// The grid of settled cells.
///
/// One extra, permanently occupied row sits under the visible rows so that
/// reaching the floor is detected the same way as landing on a block.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Field {
    grid: Vec<Vec<Cell>>,
    columns: usize,
    rows: usize,
}

impl Field {
    pub fn new(columns: usize, rows: usize) -> Result<Self> {
        if columns == 0 {
            return Err(Error::NoColumns);
        }
        if rows == 0 {
            return Err(Error::NoRows);
        }
        let mut grid = vec![vec![0; columns]; rows];
        grid.push(vec![SENTINEL; columns]);
        Ok(Self {
            grid,
            columns,
            rows,
        })
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of visible rows; the sentinel row is not counted.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Visible rows, top first.
    pub fn visible_rows(&self) -> &[Vec<Cell>] {
        &self.grid[..self.rows]
    }

    /// Cell at `(x, y)`; `None` outside the grid. Row `rows()` is the sentinel.
    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        self.grid.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Empties every visible row.
    pub fn clear(&mut self) {
        for row in &mut self.grid[..self.rows] {
            row.fill(0);
        }
    }

    /// Overwrites a visible cell. Out-of-range writes are ignored.
    pub fn set_cell(&mut self, x: usize, y: usize, value: Cell) {
        if y < self.rows {
            if let Some(cell) = self.grid[y].get_mut(x) {
                *cell = value;
            }
        }
    }

    /// True when any occupied cell of `piece` leaves the grid or overlaps a
    /// settled cell (the sentinel row included).
    pub fn check_collision(&self, piece: &Piece) -> bool {
        piece.blocks().any(|(x, y, _)| {
            if x < 0 || y < 0 {
                return true;
            }
            match self.cell(x as usize, y as usize) {
                Some(cell) => cell != 0,
                None => true,
            }
        })
    }

    /// Adds `piece` into the grid one row above its current origin.
    ///
    /// Called right after a downward step collided, so `piece.y - 1` is the
    /// last position that was free.
    pub fn merge_piece(&mut self, piece: &Piece) {
        for (x, y, value) in piece.blocks() {
            let y = y - 1;
            if x < 0 || y < 0 || y as usize >= self.rows {
                continue;
            }
            if let Some(cell) = self.grid[y as usize].get_mut(x as usize) {
                *cell += value;
            }
        }
    }

    /// Removes every full visible row, dropping the rows above it, and
    /// returns how many were removed.
    pub fn detect_and_remove_full_rows(&mut self) -> u32 {
        let mut removed = 0;
        while let Some(y) = (0..self.rows).find(|&y| self.is_row_full(y)) {
            self.grid.remove(y);
            self.grid.insert(0, vec![0; self.columns]);
            removed += 1;
        }
        removed
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        y < self.rows && self.grid[y].iter().all(|&cell| cell != 0)
    }

    pub fn filled_count_in_row(&self, y: usize) -> usize {
        self.grid
            .get(y)
            .map_or(0, |row| row.iter().filter(|&&cell| cell != 0).count())
    }

    pub fn total_filled_cells(&self) -> usize {
        self.visible_rows()
            .iter()
            .flatten()
            .filter(|&&cell| cell != 0)
            .count()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.grid {
            let line: Vec<String> = row.iter().map(|value| value.to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
