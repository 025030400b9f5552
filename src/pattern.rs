use crate::grid::Grid;
use crate::grid::GridError;

/// A named seed pattern.
pub struct Pattern {
    pub name: &'static str,
    pub rows: &'static [&'static [u8]],
}

impl Pattern {
    pub fn to_grid(&self) -> Result<Grid, GridError> {
        Grid::from_rows(self.rows)
    }
}

pub const GLIDER: Pattern = Pattern {
    name: "Glider",
    rows: &[&[0, 1, 0], &[0, 0, 1], &[1, 1, 1]],
};

pub const BLINKER: Pattern = Pattern {
    name: "Blinker",
    rows: &[&[1, 1, 1]],
};

pub const TOAD: Pattern = Pattern {
    name: "Toad",
    rows: &[&[0, 1, 1, 1], &[1, 1, 1, 0]],
};

pub const BEACON: Pattern = Pattern {
    name: "Beacon",
    rows: &[&[1, 1, 0, 0], &[1, 1, 0, 0], &[0, 0, 1, 1], &[0, 0, 1, 1]],
};

#[rustfmt::skip]
pub const PULSAR: Pattern = Pattern {
    name: "Pulsar",
    rows: &[
        &[0,0,1,1,1,0,0,0,1,1,1,0,0],
        &[0,0,0,0,0,0,0,0,0,0,0,0,0],
        &[1,0,0,0,0,1,0,1,0,0,0,0,1],
        &[1,0,0,0,0,1,0,1,0,0,0,0,1],
        &[1,0,0,0,0,1,0,1,0,0,0,0,1],
        &[0,0,1,1,1,0,0,0,1,1,1,0,0],
        &[0,0,0,0,0,0,0,0,0,0,0,0,0],
        &[0,0,1,1,1,0,0,0,1,1,1,0,0],
        &[1,0,0,0,0,1,0,1,0,0,0,0,1],
        &[1,0,0,0,0,1,0,1,0,0,0,0,1],
        &[1,0,0,0,0,1,0,1,0,0,0,0,1],
        &[0,0,0,0,0,0,0,0,0,0,0,0,0],
        &[0,0,1,1,1,0,0,0,1,1,1,0,0],
    ],
};

pub const PATTERNS: &[Pattern] = &[GLIDER, BLINKER, TOAD, BEACON, PULSAR];

/// Look up a preset by name, ignoring case.
pub fn find(name: &str) -> Option<&'static Pattern> {
    PATTERNS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// The offset that centers a pattern of `pattern_dim` cells in a grid of `grid_dim` cells along
/// one axis. Patterns larger than the grid get a negative offset, which is rounded down.
pub fn centered_offset(grid_dim: usize, pattern_dim: usize) -> isize {
    (grid_dim as isize - pattern_dim as isize).div_euclid(2)
}

/// Stamp `pattern` into a `width` by `height` background of dead cells at (`row`, `col`),
/// clipping anything that falls outside.
pub fn place(pattern: &Grid, width: usize, height: usize, row: isize, col: isize) -> Grid {
    let mut grid = Grid::dead(width, height);
    grid.stamp(pattern, row, col);

    grid
}

/// Like [`place`], centering the pattern in the background.
pub fn place_centered(pattern: &Grid, width: usize, height: usize) -> Grid {
    let row = centered_offset(height, pattern.height());
    let col = centered_offset(width, pattern.width());

    place(pattern, width, height, row, col)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for pattern in PATTERNS {
            let grid = pattern.to_grid().unwrap();

            assert!(grid.population() > 0, "{} is empty", pattern.name);
        }
    }

    #[test]
    fn find_ignores_case() {
        assert_eq!(find("glider").map(|p| p.name), Some("Glider"));
        assert_eq!(find("PULSAR").map(|p| p.name), Some("Pulsar"));
        assert!(find("gosper").is_none());
    }

    #[test]
    fn centering() {
        assert_eq!(centered_offset(30, 3), 13);
        assert_eq!(centered_offset(40, 13), 13);
        assert_eq!(centered_offset(2, 3), -1);
    }

    #[test]
    fn place_blinker_centered() {
        let blinker = BLINKER.to_grid().unwrap();
        let grid = place_centered(&blinker, 5, 3);

        assert_eq!(
            grid.to_rows(),
            vec![vec![0, 0, 0, 0, 0], vec![0, 1, 1, 1, 0], vec![0, 0, 0, 0, 0]]
        );
    }

    #[test]
    fn place_clips_oversized_patterns() {
        let pulsar = PULSAR.to_grid().unwrap();
        let grid = place_centered(&pulsar, 3, 3);

        // The 3x3 window sits over the pulsar's hollow center
        assert_eq!(grid, Grid::dead(3, 3));
    }
}
