use tracing::debug;
use tracing::trace;

use crate::WorldOffset;
use crate::grid::Grid;
use crate::rule_set::RuleSet;

/// How a grid relates to the plane it lives on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Boundary {
    /// The grid is a viewport onto an infinite plane. It grows whenever a pattern reaches past
    /// its edge, and shrinks back to the bounding box of its live cells after every step.
    #[default]
    Unbounded,

    /// The grid is a fixed window. Everything outside it is permanently dead, so growth past its
    /// edge is lost.
    Clipped { width: usize, height: usize },
}

/// Where a stepped grid's origin sits, relative to the origin of the grid it came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Offset {
    pub row: WorldOffset,
    pub col: WorldOffset,
}

/// A rule set paired with a boundary policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Engine {
    pub rules: RuleSet,
    pub boundary: Boundary,
}

impl Engine {
    pub const fn new(rules: RuleSet, boundary: Boundary) -> Self {
        Self { rules, boundary }
    }

    /// Compute the next generation of `grid`.
    pub fn step(&self, grid: &Grid) -> Grid {
        self.step_tracked(grid).0
    }

    /// Like [`Engine::step`], but also reports how far the origin moved.
    pub fn step_tracked(&self, grid: &Grid) -> (Grid, Offset) {
        match self.boundary {
            Boundary::Unbounded => {
                let next = apply_rule(&expand(grid), self.rules);
                let (next, (top, left)) = compact_with_origin(&next);

                trace!(
                    width = next.width(),
                    height = next.height(),
                    population = next.population(),
                    "stepped"
                );

                if next.is_empty() {
                    return (next, Offset::default());
                }

                // `expand` put the old origin at (1, 1)
                let offset = Offset {
                    row: top as WorldOffset - 1,
                    col: left as WorldOffset - 1,
                };

                (next, offset)
            }
            Boundary::Clipped { width, height } => {
                // Cells outside the window already read as dead, so no border is needed
                let next = apply_rule(&grid.resized(width, height), self.rules);

                trace!(width, height, population = next.population(), "stepped");

                (next, Offset::default())
            }
        }
    }

    /// Apply [`Engine::step`] `generations` times.
    pub fn advance(&self, grid: &Grid, generations: u64) -> Grid {
        self.advance_tracked(grid, generations).0
    }

    /// Like [`Engine::advance`], with the origin shifts of every step summed up.
    pub fn advance_tracked(&self, grid: &Grid, generations: u64) -> (Grid, Offset) {
        debug!(generations, rules = %self.rules, "advancing");

        let mut current = grid.clone();
        let mut origin = Offset::default();

        for _ in 0..generations {
            let (next, offset) = self.step_tracked(&current);

            origin.row += offset.row;
            origin.col += offset.col;
            current = next;
        }

        (current, origin)
    }
}

/// Compute the next generation of `grid` under B3/S23 on an unbounded plane.
pub fn step(grid: &Grid) -> Grid {
    Engine::default().step(grid)
}

/// Apply [`step`] `generations` times. Zero generations returns a copy of `grid`.
pub fn advance(grid: &Grid, generations: u64) -> Grid {
    Engine::default().advance(grid, generations)
}

/// Surround `grid` with a single layer of dead cells.
///
/// The result is 2 cells wider and taller, with `grid` at offset (1, 1). This gives every cell on
/// the original edge a full neighborhood, so births just outside the old bounds are computed.
pub fn expand(grid: &Grid) -> Grid {
    let (w, h) = (grid.width() + 2, grid.height() + 2);
    let mut cells = vec![false; w * h];

    for (r, row) in grid.rows().enumerate() {
        let start = (r + 1) * w + 1;
        cells[start..start + row.len()].copy_from_slice(row);
    }

    Grid::from_parts(cells, w, h)
}

/// Count the live neighbors of the cell at row `x`, column `y`.
///
/// Neighbors outside the grid count as dead.
///
///   (x-1, y-1) (x-1, y) (x-1, y+1)
///   (x,   y-1)    --    (x,   y+1)
///   (x+1, y-1) (x+1, y) (x+1, y+1)
///
pub fn count_neighbors(grid: &Grid, x: usize, y: usize) -> u8 {
    let mut n = 0;

    for dx in [-1isize, 0, 1] {
        for dy in [-1isize, 0, 1] {
            if dx == 0 && dy == 0 {
                continue;
            }

            let (Some(r), Some(c)) = (x.checked_add_signed(dx), y.checked_add_signed(dy)) else {
                continue;
            };

            if grid.is_alive(r, c) {
                n += 1;
            }
        }
    }

    n
}

/// Apply `rules` to every cell of `grid` at once.
///
/// Every cell is computed from `grid` as given, never from partially updated output. The result
/// has the same dimensions as `grid`.
pub fn apply_rule(grid: &Grid, rules: RuleSet) -> Grid {
    let (w, h) = (grid.width(), grid.height());
    let mut cells = Vec::with_capacity(w * h);

    for x in 0..h {
        for y in 0..w {
            let alive = grid.is_alive(x, y);
            cells.push(rules.next_state(alive, count_neighbors(grid, x, y)));
        }
    }

    Grid::from_parts(cells, w, h)
}

/// Trim dead rows and columns off the edges of `grid`, down to the bounding box of its live
/// cells. A grid with no live cells becomes [`Grid::empty`].
pub fn compact(grid: &Grid) -> Grid {
    compact_with_origin(grid).0
}

/// Like [`compact`], and also returns how many rows were removed from the top and columns from
/// the left.
///
/// Edges are trimmed in a fixed order: top rows, bottom rows, left columns, right columns. Each
/// edge is trimmed until it holds a live cell before moving to the next.
fn compact_with_origin(grid: &Grid) -> (Grid, (usize, usize)) {
    let (w, h) = (grid.width(), grid.height());
    let row_dead = |r: usize| grid.row(r).iter().all(|&c| !c);

    let mut top = 0;
    while top < h && row_dead(top) {
        top += 1;
    }

    if top == h {
        return (Grid::empty(), (0, 0));
    }

    let mut bottom = h;
    while bottom > top && row_dead(bottom - 1) {
        bottom -= 1;
    }

    let col_dead = |c: usize| (top..bottom).all(|r| !grid.is_alive(r, c));

    let mut left = 0;
    while left < w && col_dead(left) {
        left += 1;
    }

    let mut right = w;
    while right > left && col_dead(right - 1) {
        right -= 1;
    }

    (grid.crop(top..bottom, left..right), (top, left))
}
