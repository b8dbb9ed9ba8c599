//! Error types
//!
//! Everything here is fatal for a run: the simulation has no partially usable
//! state after a placement failure and the encoder pipe cannot be recovered.

use thiserror::Error;

/// Configuration-fatal failures raised while building a world
#[derive(Debug, Error)]
pub enum SimError {
    #[error("could not place body {index} after {attempts} attempts: population too dense for the arena")]
    PlacementExhausted { index: usize, attempts: u32 },

    #[error("could not find a distinct color for body {index} after {attempts} attempts")]
    ColorExhausted { index: usize, attempts: u32 },

    #[error(
        "{population} bodies of size {size} cannot fit in {width}x{height} (needs {needed:.0} px², at most {available:.0} px² usable)"
    )]
    Overcrowded {
        population: usize,
        size: f32,
        width: f32,
        height: f32,
        needed: f32,
        available: f32,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Resource-fatal failures from the render/encode sinks
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to start encoder `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("encoder pipe failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoder exited with {0}")]
    EncoderExit(std::process::ExitStatus),
}
