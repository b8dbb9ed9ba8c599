//! Video encoder pipe
//!
//! Frames are rasterized into an RGB24 buffer and streamed to the stdin of an
//! external encoder process (ffmpeg by default).

use std::io::{BufWriter, Write};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::error::SinkError;
use crate::renderer::{FrameBuffer, RenderSink};
use crate::settings::Settings;
use crate::sim::World;

/// Arguments for a raw rgb24 stdin -> H.264 encode
pub fn encoder_args(settings: &Settings) -> Vec<String> {
    let size = format!("{}x{}", settings.width, settings.height);
    let fps = settings.fps.to_string();
    [
        "-y",
        "-f",
        "rawvideo",
        "-pixel_format",
        "rgb24",
        "-video_size",
        size.as_str(),
        "-framerate",
        fps.as_str(),
        "-i",
        "-",
        "-vf",
        "format=yuv420p",
        "-c:v",
        "libx264",
        "-preset",
        settings.output.preset.as_str(),
        settings.output.output.as_str(),
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Render sink that pipes every frame into an encoder child process
#[derive(Debug)]
pub struct EncoderSink {
    frame: FrameBuffer,
    child: Child,
    stdin: Option<BufWriter<ChildStdin>>,
    program: String,
    frames: u64,
}

impl EncoderSink {
    /// Start the configured encoder for this arena
    pub fn spawn(settings: &Settings) -> Result<Self, SinkError> {
        let program = settings.output.encoder.clone();
        let mut command = Command::new(&program);
        command.args(encoder_args(settings));
        log::info!(
            "Recording {}x{} @ {} fps to {}",
            settings.width,
            settings.height,
            settings.fps,
            settings.output.output
        );
        let frame = FrameBuffer::new(settings.width, settings.height, settings.background);
        Self::with_command(program, command, frame)
    }

    /// Start an arbitrary command that reads raw frames on stdin
    pub fn with_command(
        program: String,
        mut command: Command,
        frame: FrameBuffer,
    ) -> Result<Self, SinkError> {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|source| SinkError::Spawn {
                program: program.clone(),
                source,
            })?;
        let stdin = child.stdin.take().map(BufWriter::new);
        Ok(Self {
            frame,
            child,
            stdin,
            program,
            frames: 0,
        })
    }

    /// Frames written so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderSink for EncoderSink {
    fn render(&mut self, world: &World) -> Result<(), SinkError> {
        self.frame.draw_world(world);
        if let Some(stdin) = self.stdin.as_mut() {
            stdin.write_all(self.frame.bytes())?;
            self.frames += 1;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        let Some(mut stdin) = self.stdin.take() else {
            return Ok(());
        };
        stdin.flush()?;
        // Closing the pipe tells the encoder the stream is over
        drop(stdin);

        let status = self.child.wait()?;
        if !status.success() {
            return Err(SinkError::EncoderExit(status));
        }
        log::info!("{} finalized {} frames", self.program, self.frames);
        Ok(())
    }
}

impl Drop for EncoderSink {
    fn drop(&mut self) {
        if self.stdin.take().is_some() {
            log::warn!("Encoder dropped without finish; output may be truncated");
            let _ = self.child.wait();
        }
    }
}
