//! Application module: exposes the view model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model`. It never talks to the audio output
//! or the backend itself; the runtime feeds it catalog responses and
//! playback events.

mod model;

pub use model::*;
