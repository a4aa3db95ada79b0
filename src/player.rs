//! Playback: the session state machine and the audio output it drives.
//!
//! [`PlaybackController`] owns the [`Session`] and the single [`AudioOutput`];
//! the view learns about changes through [`PlaybackEvent`]s.

mod controller;
mod output;
mod session;
mod sink;

pub use controller::{Direction, PlaybackController, PlaybackError, PlaybackEvent};
pub use output::{AudioOutput, OutputError};
pub use session::Session;
pub use sink::RodioOutput;

#[cfg(test)]
mod tests;
