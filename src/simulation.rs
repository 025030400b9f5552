use std::time::Duration;
use std::time::Instant;

use rand::Rng;
use tracing::debug;

use crate::WorldOffset;
use crate::engine::Boundary;
use crate::engine::Engine;
use crate::grid::Grid;

pub const MIN_INTERVAL: Duration = Duration::from_millis(50);
pub const MAX_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(200);

/// Amount `faster` and `slower` change the interval by.
pub const INTERVAL_STEP: Duration = Duration::from_millis(50);

/// Share of live cells in a random fill.
pub const RANDOM_DENSITY: f64 = 0.3;

/// A periodic tick schedule.
///
/// The scheduler never sleeps or spawns anything. The owner's loop asks it whether a tick is due
/// with [`Scheduler::poll`], and cancelling is just not asking.
#[derive(Debug, Clone)]
pub struct Scheduler {
    interval: Duration,
    next_tick: Option<Instant>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.clamp(MIN_INTERVAL, MAX_INTERVAL),
            next_tick: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    /// Start ticking, with the first tick one interval from `now`. Does nothing if already
    /// running.
    pub fn start(&mut self, now: Instant) {
        if self.next_tick.is_none() {
            self.next_tick = Some(now + self.interval);
        }
    }

    pub fn stop(&mut self) {
        self.next_tick = None;
    }

    /// Change the interval, clamped to [`MIN_INTERVAL`]..=[`MAX_INTERVAL`]. A running schedule
    /// restarts from `now`.
    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.interval = interval.clamp(MIN_INTERVAL, MAX_INTERVAL);

        if self.next_tick.is_some() {
            self.next_tick = Some(now + self.interval);
        }
    }

    /// Whether a tick is due at `now`. A due tick schedules the next one.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_tick {
            Some(t) if t <= now => {
                // Ticks missed while the owner was busy are dropped rather than replayed
                self.next_tick = Some(now + self.interval);

                true
            }
            _ => false,
        }
    }

    /// Time left until the next tick, if running.
    pub fn until_next(&self, now: Instant) -> Option<Duration> {
        self.next_tick.map(|t| t.saturating_duration_since(now))
    }
}

/// The state of a running simulation: the current grid, where it sits on the plane, and how
/// often it advances.
///
/// The engine itself holds no state; a `Simulation` owns the single current [`Grid`] and replaces
/// it on every step.
#[derive(Debug, Clone, Default)]
pub struct Simulation {
    engine: Engine,
    grid: Grid,
    origin: (WorldOffset, WorldOffset),
    generation: u64,
    scheduler: Scheduler,
}

impl Simulation {
    pub fn new(grid: Grid) -> Self {
        Self::with_engine(grid, Engine::default())
    }

    pub fn with_engine(grid: Grid, engine: Engine) -> Self {
        Self {
            engine,
            grid,
            ..Default::default()
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// World coordinates, as (row, column), of the grid's top left cell.
    pub fn origin(&self) -> (WorldOffset, WorldOffset) {
        self.origin
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn interval(&self) -> Duration {
        self.scheduler.interval()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn start(&mut self, now: Instant) {
        debug!(generation = self.generation, "start");
        self.scheduler.start(now);
    }

    pub fn stop(&mut self) {
        debug!(generation = self.generation, "stop");
        self.scheduler.stop();
    }

    pub fn toggle_running(&mut self, now: Instant) {
        if self.is_running() {
            self.stop();
        } else {
            self.start(now);
        }
    }

    pub fn set_speed(&mut self, interval: Duration, now: Instant) {
        self.scheduler.set_interval(interval, now);
        debug!(interval = ?self.scheduler.interval(), "speed changed");
    }

    pub fn faster(&mut self, now: Instant) {
        let interval = self.interval().saturating_sub(INTERVAL_STEP);
        self.set_speed(interval, now);
    }

    pub fn slower(&mut self, now: Instant) {
        let interval = self.interval() + INTERVAL_STEP;
        self.set_speed(interval, now);
    }

    /// Advance a single generation by hand, stopping the schedule.
    pub fn step_once(&mut self) {
        self.stop();
        self.advance();
    }

    /// Advance a generation if one is due at `now`. Returns whether the grid changed hands.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.scheduler.poll(now) {
            return false;
        }

        self.advance();

        true
    }

    /// Reset to the empty grid at generation zero, and stop.
    pub fn clear(&mut self) {
        self.load(Grid::empty());
    }

    /// Replace the grid with `grid` at generation zero, and stop.
    pub fn load(&mut self, grid: Grid) {
        self.stop();
        self.grid = grid;
        self.origin = (0, 0);
        self.generation = 0;
    }

    /// Flip the cell at (`row`, `col`) of the current grid. Out of range cells are ignored.
    pub fn toggle(&mut self, row: usize, col: usize) -> bool {
        self.grid.toggle(row, col)
    }

    /// Replace the grid with a random `width` by `height` fill at generation zero. Keeps running
    /// if it was.
    pub fn randomize(&mut self, width: usize, height: usize, density: f64) {
        self.randomize_with(&mut rand::thread_rng(), width, height, density);
    }

    pub fn randomize_with<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        width: usize,
        height: usize,
        density: f64,
    ) {
        self.grid = Grid::random(width, height, density, rng);
        self.origin = (0, 0);
        self.generation = 0;

        debug!(width, height, density, "randomized");
    }

    /// Flip the cell at world (`row`, `col`).
    ///
    /// On an unbounded plane the grid grows to take in a cell outside it. A clipped window
    /// ignores cells outside it, and returns false.
    pub fn toggle_at(&mut self, row: WorldOffset, col: WorldOffset) -> bool {
        let (r, c) = (row - self.origin.0, col - self.origin.1);
        let (h, w) = (self.grid.height() as WorldOffset, self.grid.width() as WorldOffset);

        if (0..h).contains(&r) && (0..w).contains(&c) {
            return self.grid.toggle(r as usize, c as usize);
        }

        if let Boundary::Clipped { .. } = self.engine.boundary {
            return false;
        }

        if self.grid.is_empty() {
            self.grid = Grid::dead(1, 1);
            self.grid.set(0, 0, true);
            self.origin = (row, col);

            return true;
        }

        let (top, left) = (r.min(0), c.min(0));
        let (bottom, right) = (h.max(r + 1), w.max(c + 1));

        let mut grid = Grid::dead((right - left) as usize, (bottom - top) as usize);
        grid.stamp(&self.grid, -top as isize, -left as isize);
        grid.set((r - top) as usize, (c - left) as usize, true);

        self.grid = grid;
        self.origin = (self.origin.0 + top, self.origin.1 + left);

        true
    }

    fn advance(&mut self) {
        let (grid, offset) = self.engine.step_tracked(&self.grid);

        self.grid = grid;
        self.origin.0 += offset.row;
        self.origin.1 += offset.col;
        self.generation += 1;
    }
}
