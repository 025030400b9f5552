use std::io;

use crossterm::event::Event as CrossTermEvent;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;

use crate::events::AppEvent;
use crate::events::CameraEvent;
use crate::events::EngineEvent;
use crate::events::Event;
use crate::WorldOffset;

/// Cells the camera moves per key press
const PAN: WorldOffset = 8;

/// Converts a crossterm event into a gridlife event
pub fn convert_event(event: CrossTermEvent) -> Option<Event> {
    match event {
        CrossTermEvent::Key(KeyEvent {
            kind: KeyEventKind::Release,
            ..
        }) => None,
        CrossTermEvent::Key(key_event) => convert_key(key_event),
        CrossTermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) => Some(Event::EngineEvent(EngineEvent::Edit { col: column, row })),
        CrossTermEvent::Resize(cols, rows) => Some(Event::AppEvent(AppEvent::CameraEvent(
            CameraEvent::Resize { cols, rows },
        ))),
        _ => None,
    }
}

/// Run `body` between `enter` and `leave`.
///
/// `leave` runs once `enter` has succeeded, whether or not `body` fails. A `body` error wins over
/// a `leave` error. Nest calls to stack terminal modes, so a failing inner `enter` still unwinds
/// the outer ones.
pub fn scoped<T, E, B, L>(enter: E, body: B, leave: L) -> anyhow::Result<T>
where
    E: FnOnce() -> io::Result<()>,
    B: FnOnce() -> anyhow::Result<T>,
    L: FnOnce() -> io::Result<()>,
{
    enter()?;

    let res = body();
    let left = leave();

    let value = res?;
    left?;

    Ok(value)
}

fn convert_key(key_event: KeyEvent) -> Option<Event> {
    let camera = |rows, cols| {
        Some(Event::AppEvent(AppEvent::CameraEvent(CameraEvent::Move {
            rows,
            cols,
        })))
    };

    match key_event {
        KeyEvent {
            code: KeyCode::Char('q'),
            ..
        }
        | KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            ..
        } => Some(Event::AppEvent(AppEvent::Exit)),

        KeyEvent {
            code: KeyCode::Char(' '),
            ..
        } => Some(Event::EngineEvent(EngineEvent::TogglePlay)),
        KeyEvent {
            code: KeyCode::Char('n'),
            ..
        } => Some(Event::EngineEvent(EngineEvent::Step)),
        KeyEvent {
            code: KeyCode::Char('+' | '='),
            ..
        } => Some(Event::EngineEvent(EngineEvent::Faster)),
        KeyEvent {
            code: KeyCode::Char('-'),
            ..
        } => Some(Event::EngineEvent(EngineEvent::Slower)),
        KeyEvent {
            code: KeyCode::Char('c'),
            ..
        } => Some(Event::EngineEvent(EngineEvent::Clear)),
        KeyEvent {
            code: KeyCode::Char('r'),
            ..
        } => Some(Event::EngineEvent(EngineEvent::Randomize)),

        // movements
        KeyEvent {
            code: KeyCode::Char('h') | KeyCode::Left,
            ..
        } => camera(0, -PAN),
        KeyEvent {
            code: KeyCode::Char('j') | KeyCode::Down,
            ..
        } => camera(PAN, 0),
        KeyEvent {
            code: KeyCode::Char('k') | KeyCode::Up,
            ..
        } => camera(-PAN, 0),
        KeyEvent {
            code: KeyCode::Char('l') | KeyCode::Right,
            ..
        } => camera(0, PAN),
        KeyEvent {
            code: KeyCode::Char('0'),
            ..
        } => Some(Event::AppEvent(AppEvent::CameraEvent(CameraEvent::Reset))),

        _ => None,
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::io;

    use crossterm::event::Event as CrossTermEvent;
    use crossterm::event::KeyCode;
    use crossterm::event::KeyEvent;
    use crossterm::event::KeyModifiers;
    use crossterm::event::MouseButton;
    use crossterm::event::MouseEvent;
    use crossterm::event::MouseEventKind;

    use super::convert_event;
    use super::scoped;
    use crate::events::AppEvent;
    use crate::events::CameraEvent;
    use crate::events::EngineEvent;
    use crate::events::Event;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Option<Event> {
        convert_event(CrossTermEvent::Key(KeyEvent::new(code, modifiers)))
    }

    #[test]
    fn exit_keys() {
        assert!(matches!(
            key(KeyCode::Char('q'), KeyModifiers::NONE),
            Some(Event::AppEvent(AppEvent::Exit))
        ));
        assert!(matches!(
            key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(Event::AppEvent(AppEvent::Exit))
        ));
    }

    #[test]
    fn plain_c_clears() {
        assert!(matches!(
            key(KeyCode::Char('c'), KeyModifiers::NONE),
            Some(Event::EngineEvent(EngineEvent::Clear))
        ));
    }

    #[test]
    fn pan_and_resize() {
        assert!(matches!(
            key(KeyCode::Char('j'), KeyModifiers::NONE),
            Some(Event::AppEvent(AppEvent::CameraEvent(CameraEvent::Move { rows: 8, cols: 0 })))
        ));
        assert!(matches!(
            convert_event(CrossTermEvent::Resize(80, 24)),
            Some(Event::AppEvent(AppEvent::CameraEvent(CameraEvent::Resize {
                cols: 80,
                rows: 24
            })))
        ));
    }

    #[test]
    fn r_randomizes() {
        assert!(matches!(
            key(KeyCode::Char('r'), KeyModifiers::NONE),
            Some(Event::EngineEvent(EngineEvent::Randomize))
        ));
    }

    #[test]
    fn left_click_edits() {
        let click = |kind| {
            convert_event(CrossTermEvent::Mouse(MouseEvent {
                kind,
                column: 3,
                row: 7,
                modifiers: KeyModifiers::NONE,
            }))
        };

        assert!(matches!(
            click(MouseEventKind::Down(MouseButton::Left)),
            Some(Event::EngineEvent(EngineEvent::Edit { col: 3, row: 7 }))
        ));
        assert!(click(MouseEventKind::Down(MouseButton::Right)).is_none());
        assert!(click(MouseEventKind::Moved).is_none());
    }

    #[test]
    fn scoped_leaves_after_body() {
        let log = RefCell::new(Vec::new());
        let push = |s| log.borrow_mut().push(s);

        let res: anyhow::Result<()> = scoped(
            || Ok(push("enter")),
            || {
                push("body");
                anyhow::bail!("body failed")
            },
            || Ok(push("leave")),
        );

        assert!(res.is_err());
        assert_eq!(*log.borrow(), ["enter", "body", "leave"]);
    }

    #[test]
    fn failed_inner_enter_unwinds_outer() {
        let log = RefCell::new(Vec::new());
        let push = |s| log.borrow_mut().push(s);

        let res: anyhow::Result<()> = scoped(
            || Ok(push("raw mode on")),
            || {
                scoped(
                    || Err(io::Error::other("no alternate screen")),
                    || Ok(push("run")),
                    || Ok(push("alternate screen off")),
                )
            },
            || Ok(push("raw mode off")),
        );

        assert!(res.is_err());
        assert_eq!(*log.borrow(), ["raw mode on", "raw mode off"]);
    }

    #[test]
    fn leave_error_is_reported() {
        let res = scoped(|| Ok(()), || Ok(1), || Err(io::Error::other("restore failed")));

        assert!(res.is_err());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        assert!(key(KeyCode::Char('z'), KeyModifiers::NONE).is_none());
    }
}
