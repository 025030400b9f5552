use crate::ScreenSize;
use crate::WorldOffset;

pub enum Event {
    EngineEvent(EngineEvent),
    AppEvent(AppEvent),
}

pub enum EngineEvent {
    /// Start or stop the periodic stepping
    TogglePlay,

    /// Advance the world state by one generation, and stop
    Step,

    /// Shorten the interval between generations
    Faster,

    /// Lengthen the interval between generations
    Slower,

    /// Kill every cell
    Clear,

    /// Fill the view with random cells
    Randomize,

    /// Flip the cell under a terminal character
    Edit { col: ScreenSize, row: ScreenSize },
}

pub enum AppEvent {
    CameraEvent(CameraEvent),

    /// Exit the application
    Exit,
}

pub enum CameraEvent {
    Move { rows: WorldOffset, cols: WorldOffset },
    Resize { cols: ScreenSize, rows: ScreenSize },
    Reset,
}
