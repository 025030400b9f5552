use gridlife::Grid;
use gridlife::advance;
use gridlife::engine::apply_rule;
use gridlife::engine::compact;
use gridlife::engine::count_neighbors;
use gridlife::engine::expand;
use gridlife::rule_set::B3S23;
use gridlife::step;
use proptest::prelude::*;

/// Grids up to 8x8 with arbitrary contents, dead borders included.
fn any_grid() -> impl Strategy<Value = Grid> {
    (1usize..=8, 1usize..=8).prop_flat_map(|(w, h)| {
        prop::collection::vec(prop::collection::vec(0u8..=1, w), h)
            .prop_map(|rows| Grid::from_rows(&rows).unwrap())
    })
}

fn is_rectangular(grid: &Grid) -> bool {
    let consistent = grid.rows().all(|r| r.len() == grid.width())
        && grid.rows().count() == grid.height();

    // Zero-sized grids only ever show up as the canonical empty grid
    let canonical = (grid.width() == 0) == (grid.height() == 0);

    consistent && canonical
}

proptest! {
    #[test]
    fn advance_is_deterministic(grid in any_grid(), n in 0u64..16) {
        prop_assert_eq!(advance(&grid, n), advance(&grid, n));
    }

    #[test]
    fn advance_composes(grid in any_grid(), a in 0u64..8, b in 0u64..8) {
        prop_assert_eq!(advance(&advance(&grid, a), b), advance(&grid, a + b));
    }

    #[test]
    fn step_leaves_input_untouched(grid in any_grid()) {
        let before = grid.clone();
        let _ = step(&grid);

        prop_assert_eq!(grid, before);
    }

    #[test]
    fn compact_is_idempotent(grid in any_grid()) {
        let once = compact(&grid);

        prop_assert_eq!(compact(&once), once);
    }

    #[test]
    fn compact_keeps_every_live_cell(grid in any_grid()) {
        prop_assert_eq!(compact(&grid).population(), grid.population());
    }

    #[test]
    fn compact_leaves_no_dead_border(grid in any_grid()) {
        let c = compact(&grid);

        if !c.is_empty() {
            let (w, h) = (c.width(), c.height());

            prop_assert!(c.row(0).contains(&true));
            prop_assert!(c.row(h - 1).contains(&true));
            prop_assert!((0..h).any(|r| c.is_alive(r, 0)));
            prop_assert!((0..h).any(|r| c.is_alive(r, w - 1)));
        }
    }

    #[test]
    fn step_output_is_compact(grid in any_grid()) {
        let next = step(&grid);

        prop_assert_eq!(compact(&next), next);
    }

    #[test]
    fn dead_borders_do_not_matter(grid in any_grid()) {
        prop_assert_eq!(step(&compact(&grid)), step(&grid));
    }

    #[test]
    fn outputs_stay_rectangular(grid in any_grid(), n in 0u64..10) {
        prop_assert!(is_rectangular(&step(&grid)));
        prop_assert!(is_rectangular(&advance(&grid, n)));
        prop_assert!(is_rectangular(&compact(&grid)));
    }

    #[test]
    fn expand_adds_a_dead_border(grid in any_grid()) {
        let e = expand(&grid);

        prop_assert_eq!(e.width(), grid.width() + 2);
        prop_assert_eq!(e.height(), grid.height() + 2);
        prop_assert_eq!(e.population(), grid.population());
        prop_assert_eq!(e.crop(1..grid.height() + 1, 1..grid.width() + 1), grid);
    }

    #[test]
    fn stepper_follows_b3s23(grid in any_grid()) {
        let e = expand(&grid);
        let next = apply_rule(&e, B3S23);

        for x in 0..e.height() {
            for y in 0..e.width() {
                let n = count_neighbors(&e, x, y);
                let alive = e.is_alive(x, y);
                let expected = n == 3 || (alive && n == 2);

                prop_assert_eq!(next.is_alive(x, y), expected, "cell ({}, {}) with {} neighbors", x, y, n);
            }
        }
    }

    #[test]
    fn all_dead_grids_go_extinct(w in 0usize..10, h in 0usize..10) {
        prop_assert_eq!(step(&Grid::dead(w, h)), Grid::empty());
    }
}

#[test]
fn empty_grid_steps_to_itself() {
    assert_eq!(step(&Grid::empty()), Grid::empty());
    assert_eq!(advance(&Grid::empty(), 100), Grid::empty());
}

#[test]
fn single_cell_dies() -> anyhow::Result<()> {
    let cell = Grid::from_rows(&[[1]])?;

    assert_eq!(advance(&cell, 1), Grid::empty());

    Ok(())
}

#[test]
fn zero_generations_is_identity() -> anyhow::Result<()> {
    let grid = Grid::from_rows(&[[0, 0, 0], [0, 1, 1]])?;

    assert_eq!(advance(&grid, 0), grid);

    Ok(())
}
