//! Platform layer
//!
//! Everything that touches wall-clock time or the outside world:
//! - Frame pacing and stats
//! - The encoder child process
//! - Stop requests from the terminal

pub mod encoder;
pub mod input;
pub mod scheduler;

pub use encoder::{EncoderSink, encoder_args};
pub use input::{KeyPressStop, NeverStop, StopSignal};
pub use scheduler::{FrameStats, RunSummary, Scheduler};
