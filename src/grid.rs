use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use rand::Rng;
use thiserror::Error;

const DEAD_CHAR: char = '.';
const ALIVE_CHAR: char = 'O';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("Row {row} has {got} cells, expected {expected}")]
    InvalidGridShape {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("Cell ({row}, {col}) holds {value}, expected 0 or 1")]
    InvalidCellState { row: usize, col: usize, value: u8 },

    #[error("Unrecognized character '{found}' at ({row}, {col})")]
    InvalidCharacter { row: usize, col: usize, found: char },
}

/// A rectangular matrix of cell states.
///
/// Cells are stored row-major, so row `r` is `cells[r * width..(r + 1) * width]`.
///
/// A grid with no rows or no columns is always represented as the canonical empty grid, with
/// `width == height == 0`. This keeps "no cells" a single value, so comparing against
/// [`Grid::empty`] is enough to detect extinction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Grid {
    cells: Vec<bool>,
    width: usize,
    height: usize,
}

impl Grid {
    /// The canonical empty grid
    pub const fn empty() -> Self {
        Self {
            cells: Vec::new(),
            width: 0,
            height: 0,
        }
    }

    /// A `width` by `height` grid of dead cells.
    pub fn dead(width: usize, height: usize) -> Self {
        if width == 0 || height == 0 {
            return Self::empty();
        }

        Self {
            cells: vec![false; width * height],
            width,
            height,
        }
    }

    /// A `width` by `height` grid where every cell is alive with probability `density`, clamped
    /// to `0.0..=1.0`.
    pub fn random<R: Rng + ?Sized>(width: usize, height: usize, density: f64, rng: &mut R) -> Self {
        let density = if density.is_nan() {
            0.0
        } else {
            density.clamp(0.0, 1.0)
        };

        let mut grid = Self::dead(width, height);
        grid.cells.iter_mut().for_each(|c| *c = rng.gen_bool(density));

        grid
    }

    /// Build a grid from rows of `0`s and `1`s.
    ///
    /// Every row must have the same length as the first one. Input with no rows, or with rows of
    /// no cells, yields [`Grid::empty`].
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, GridError> {
        let Some(first) = rows.first() else {
            return Ok(Self::empty());
        };

        let width = first.as_ref().len();
        let mut cells = Vec::with_capacity(width * rows.len());

        for (row, r) in rows.iter().enumerate() {
            let r = r.as_ref();

            if r.len() != width {
                return Err(GridError::InvalidGridShape {
                    row,
                    expected: width,
                    got: r.len(),
                });
            }

            for (col, &value) in r.iter().enumerate() {
                match value {
                    0 => cells.push(false),
                    1 => cells.push(true),
                    value => return Err(GridError::InvalidCellState { row, col, value }),
                }
            }
        }

        if width == 0 {
            return Ok(Self::empty());
        }

        Ok(Self {
            cells,
            width,
            height: rows.len(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether this is the canonical empty grid.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of live cells
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// The state of the cell at (`row`, `col`), or `None` if it lies outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<bool> {
        if row < self.height && col < self.width {
            Some(self.cells[self.xy_from(row, col)])
        } else {
            None
        }
    }

    /// Like [`Grid::get`], except cells outside the grid read as dead.
    pub fn is_alive(&self, row: usize, col: usize) -> bool {
        self.get(row, col).unwrap_or(false)
    }

    /// Set a single cell. Coordinates outside the grid are ignored.
    pub fn set(&mut self, row: usize, col: usize, alive: bool) {
        if row < self.height && col < self.width {
            let i = self.xy_from(row, col);
            self.cells[i] = alive;
        }
    }

    /// Flip a single cell. Returns whether anything changed, since coordinates outside the grid
    /// are ignored.
    pub fn toggle(&mut self, row: usize, col: usize) -> bool {
        if row < self.height && col < self.width {
            let i = self.xy_from(row, col);
            self.cells[i] = !self.cells[i];

            true
        } else {
            false
        }
    }

    /// Copy the cells of `pattern` into this grid with the pattern's top left corner at
    /// (`row`, `col`). Any part of the pattern falling outside the grid is clipped.
    pub fn stamp(&mut self, pattern: &Grid, row: isize, col: isize) {
        for (pr, cells) in pattern.rows().enumerate() {
            let Some(r) = row.checked_add_unsigned(pr).and_then(|r| usize::try_from(r).ok())
            else {
                continue;
            };

            for (pc, &alive) in cells.iter().enumerate() {
                let Some(c) = col.checked_add_unsigned(pc).and_then(|c| usize::try_from(c).ok())
                else {
                    continue;
                };

                self.set(r, c, alive);
            }
        }
    }

    /// A single row of the grid.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.height()`.
    pub fn row(&self, row: usize) -> &[bool] {
        assert!(row < self.height, "row is out of bounds");

        &self.cells[row * self.width..(row + 1) * self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        // `chunks` rejects a size of zero, which only happens for the (cell-less) empty grid
        self.cells.chunks(self.width.max(1))
    }

    /// Convert back to rows of `0`s and `1`s.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.rows()
            .map(|r| r.iter().map(|&c| c as u8).collect())
            .collect()
    }

    /// Copy out the sub-grid covering `rows` and `cols`.
    ///
    /// Ranges are clamped to the grid. An empty selection yields [`Grid::empty`].
    pub fn crop(&self, rows: Range<usize>, cols: Range<usize>) -> Grid {
        let rows = rows.start.min(self.height)..rows.end.min(self.height);
        let cols = cols.start.min(self.width)..cols.end.min(self.width);

        if rows.is_empty() || cols.is_empty() {
            return Self::empty();
        }

        let width = cols.len();
        let height = rows.len();
        let mut cells = Vec::with_capacity(width * height);

        for r in rows {
            cells.extend_from_slice(&self.row(r)[cols.clone()]);
        }

        Self {
            cells,
            width,
            height,
        }
    }

    /// Fit the grid to exactly `width` by `height`, dropping cells past the right and bottom
    /// edges and filling new space with dead cells.
    pub fn resized(&self, width: usize, height: usize) -> Grid {
        let mut grid = Self::dead(width, height);
        grid.stamp(self, 0, 0);

        grid
    }

    pub(crate) fn from_parts(cells: Vec<bool>, width: usize, height: usize) -> Self {
        debug_assert_eq!(cells.len(), width * height);

        if width == 0 || height == 0 {
            return Self::empty();
        }

        Self {
            cells,
            width,
            height,
        }
    }

    fn xy_from(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }
}

/// Plaintext rendering: one line per row, `.` for dead cells and `O` for live ones. The empty
/// grid renders as nothing.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }

            for &alive in row {
                let c = if alive { ALIVE_CHAR } else { DEAD_CHAR };
                write!(f, "{c}")?;
            }
        }

        Ok(())
    }
}

/// Parse the plaintext format written by [`Grid`]'s `Display`.
///
/// Lines starting with `!` are comments, and blank lines are skipped. `*` is accepted as a live
/// cell alongside `O`.
///
/// See: https://conwaylife.com/wiki/Plaintext
impl FromStr for Grid {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rows = Vec::new();

        let lines = s
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty() && !l.starts_with('!'));

        for (row, line) in lines.enumerate() {
            let cells = line
                .chars()
                .enumerate()
                .map(|(col, c)| match c {
                    DEAD_CHAR => Ok(0),
                    ALIVE_CHAR | '*' => Ok(1),
                    found => Err(GridError::InvalidCharacter { row, col, found }),
                })
                .collect::<Result<Vec<u8>, _>>()?;

            rows.push(cells);
        }

        Self::from_rows(&rows)
    }
}
