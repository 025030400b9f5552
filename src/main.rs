use std::io;
use std::io::Write;
use std::time;
use std::time::Instant;

use anyhow::Context;
use crossterm::cursor;
use crossterm::event;
use crossterm::execute;
use crossterm::queue;
use crossterm::style;
use crossterm::terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gridlife::Grid;
use gridlife::ScreenSize;
use gridlife::WorldOffset;
use gridlife::camera::Camera;
use gridlife::config::Config;
use gridlife::config::Source;
use gridlife::config::USAGE;
use gridlife::engine::Boundary;
use gridlife::engine::Engine;
use gridlife::events::AppEvent;
use gridlife::events::CameraEvent;
use gridlife::events::EngineEvent;
use gridlife::events::Event;
use gridlife::io::convert_event;
use gridlife::io::scoped;
use gridlife::parse_rle::read_rle;
use gridlife::pattern;
use gridlife::rule_set::RuleSet;
use gridlife::simulation::RANDOM_DENSITY;
use gridlife::simulation::Simulation;

const FRAMERATE: u32 = 60;
const FRAMETIME: time::Duration =
    time::Duration::from_millis(((1f64 / FRAMERATE as f64) * 1_000f64) as u64);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::from_args(std::env::args().skip(1)).context("Invalid arguments")?;

    if config.help {
        println!("{USAGE}");
        return Ok(());
    }

    let (grid, file_rule) = load(&config.source)?;
    let rules = config.rule.or(file_rule).unwrap_or_default();
    let engine = Engine::new(rules, config.boundary);

    // A fixed window starts with the pattern in its middle
    let grid = match config.boundary {
        Boundary::Clipped { width, height } => pattern::place_centered(&grid, width, height),
        Boundary::Unbounded => grid,
    };

    info!(
        width = grid.width(),
        height = grid.height(),
        rule = %rules,
        boundary = ?config.boundary,
        "loaded pattern"
    );

    if let Some(generations) = config.print {
        println!("{}", engine.advance(&grid, generations));

        return Ok(());
    }

    let mut sim = Simulation::with_engine(grid, engine);
    sim.set_speed(config.interval, Instant::now());

    let mut stdout = io::stdout();

    let enter_screen = || {
        let mut out = io::stdout();
        execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            event::EnableMouseCapture
        )
    };
    let leave_screen = || {
        let mut out = io::stdout();
        execute!(
            out,
            event::DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )
    };

    // Raw mode is undone even if entering the alternate screen fails
    scoped(
        terminal::enable_raw_mode,
        || scoped(enter_screen, || run(&mut sim, &mut stdout), leave_screen),
        terminal::disable_raw_mode,
    )
}

/// Read the starting grid, and the rule it asks for, if any.
fn load(source: &Source) -> anyhow::Result<(Grid, Option<RuleSet>)> {
    match source {
        Source::Preset(name) => {
            let preset = pattern::find(name)
                .with_context(|| format!("No preset named \"{name}\""))?;

            Ok((preset.to_grid()?, None))
        }
        Source::File(path) => {
            let data = std::fs::read(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;

            let is_rle = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("rle"));

            if is_rle {
                let file = read_rle(&data)
                    .with_context(|| format!("Failed to read RLE file {}", path.display()))?;

                Ok((file.pattern, Some(file.set)))
            } else {
                let text = std::str::from_utf8(&data).context("Pattern file is not UTF-8")?;
                let grid: Grid = text
                    .parse()
                    .with_context(|| format!("Failed to read {}", path.display()))?;

                Ok((grid, None))
            }
        }
    }
}

/// Camera covering the terminal, leaving the last line for the status bar.
fn terminal_camera(cols: ScreenSize, rows: ScreenSize) -> Camera {
    Camera::for_terminal(cols, rows.saturating_sub(1))
}

fn center(cam: &mut Camera, sim: &Simulation) {
    let (row, col) = sim.origin();
    let grid = sim.grid();

    cam.center_on(
        row + (grid.height() / 2) as WorldOffset,
        col + (grid.width() / 2) as WorldOffset,
    );
}

fn run(sim: &mut Simulation, stdout: &mut io::Stdout) -> anyhow::Result<()> {
    let (cols, rows) = terminal::size()?;
    let mut cam = terminal_camera(cols, rows);
    center(&mut cam, sim);

    loop {
        let now = Instant::now();

        // Wait for input until the next frame, or the next generation if that comes first
        let timeout = sim
            .is_running()
            .then(|| sim.interval())
            .map_or(FRAMETIME, |i| i.min(FRAMETIME));

        let event = if event::poll(timeout)? {
            convert_event(event::read()?)
        } else {
            None
        };

        match event {
            None => {}
            Some(Event::AppEvent(AppEvent::Exit)) => break,
            Some(Event::AppEvent(AppEvent::CameraEvent(e))) => match e {
                CameraEvent::Move { rows, cols } => {
                    cam.offset_y(rows);
                    cam.offset_x(cols);
                }
                CameraEvent::Resize { cols, rows } => {
                    let (row, col) = cam.position();
                    cam = terminal_camera(cols, rows);
                    cam.offset_y(row);
                    cam.offset_x(col);
                }
                CameraEvent::Reset => center(&mut cam, sim),
            },
            Some(Event::EngineEvent(e)) => match e {
                EngineEvent::TogglePlay => sim.toggle_running(now),
                EngineEvent::Step => sim.step_once(),
                EngineEvent::Faster => sim.faster(now),
                EngineEvent::Slower => sim.slower(now),
                EngineEvent::Clear => sim.clear(),
                EngineEvent::Randomize => {
                    let (width, height) = match sim.engine().boundary {
                        Boundary::Clipped { width, height } => (width, height),
                        Boundary::Unbounded => (cam.width(), cam.height()),
                    };

                    sim.randomize(width, height, RANDOM_DENSITY);
                    center(&mut cam, sim);
                }
                EngineEvent::Edit { col, row } => {
                    if let Some((row, col)) = cam.cell_at(col, row) {
                        sim.toggle_at(row, col);
                    }
                }
            },
        }

        sim.tick(Instant::now());

        cam.reset();
        cam.draw(sim.grid(), sim.origin());
        let s = cam.render();

        queue!(stdout, terminal::Clear(terminal::ClearType::All), cursor::MoveTo(0, 0))?;

        for line in s.lines() {
            queue!(stdout, style::Print(line), cursor::MoveToNextLine(1))?;
        }

        let state = if sim.is_running() { "running" } else { "paused" };
        queue!(
            stdout,
            style::Print(format!(
                "gen {}  pop {}  {}ms  {}  {}  [space] play  [n] step  [+/-] speed  [c] clear  [r] random  [click] edit  [q] quit",
                sim.generation(),
                sim.grid().population(),
                sim.interval().as_millis(),
                sim.engine().rules,
                state,
            ))
        )?;

        stdout.flush()?;
    }

    Ok(())
}
