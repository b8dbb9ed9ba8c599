//! Fixed-rate frame loop
//!
//! One simulation tick and one render per frame. Each frame measures its own
//! work and sleeps off the rest of the interval; a slow frame is never made up
//! by skipping ticks.

use std::thread;
use std::time::{Duration, Instant};

use super::input::StopSignal;
use crate::error::SinkError;
use crate::renderer::RenderSink;
use crate::settings::Settings;
use crate::sim::{World, tick};

/// Running frame-time statistics
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    frames: u64,
    total: Duration,
    worst: Duration,
    window_frames: u32,
    window_total: Duration,
}

impl FrameStats {
    pub fn record(&mut self, work: Duration) {
        self.frames += 1;
        self.total += work;
        self.worst = self.worst.max(work);
        self.window_frames += 1;
        self.window_total += work;
    }

    /// Average over the current window, then start a new one
    pub fn take_window(&mut self) -> Option<Duration> {
        if self.window_frames == 0 {
            return None;
        }
        let avg = self.window_total / self.window_frames;
        self.window_frames = 0;
        self.window_total = Duration::ZERO;
        Some(avg)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn average(&self) -> Duration {
        if self.frames == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos((self.total.as_nanos() / self.frames as u128) as u64)
    }

    pub fn worst(&self) -> Duration {
        self.worst
    }
}

/// How a run ended
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub ticks: u64,
    pub stopped_early: bool,
    pub stats: FrameStats,
    pub elapsed: Duration,
}

/// Drives the world at a fixed frame rate
#[derive(Debug, Clone)]
pub struct Scheduler {
    interval: Duration,
    total_ticks: u64,
    /// Frames between stats log lines
    stats_every: u32,
    realtime: bool,
}

impl Scheduler {
    pub fn new(settings: &Settings) -> Self {
        Self {
            interval: settings.frame_interval(),
            total_ticks: settings.total_ticks(),
            stats_every: settings.fps.saturating_mul(2).max(1),
            realtime: true,
        }
    }

    /// Disable sleeping between frames (offline renders, tests)
    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Override the tick budget
    pub fn with_total_ticks(mut self, total_ticks: u64) -> Self {
        self.total_ticks = total_ticks;
        self
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Run until the tick budget is spent or `stop` fires
    ///
    /// The sink is finished on both paths; a sink error aborts the run.
    pub fn run<R, S>(
        &self,
        world: &mut World,
        sink: &mut R,
        stop: &mut S,
    ) -> Result<RunSummary, SinkError>
    where
        R: RenderSink + ?Sized,
        S: StopSignal + ?Sized,
    {
        let started = Instant::now();
        let mut stats = FrameStats::default();
        let mut stopped_early = false;

        log::info!(
            "Running {} ticks at {:.1} ms/frame{}",
            self.total_ticks,
            self.interval.as_secs_f64() * 1000.0,
            if self.realtime { "" } else { " (unpaced)" }
        );

        for _ in 0..self.total_ticks {
            if stop.should_stop() {
                stopped_early = true;
                break;
            }

            let frame_start = Instant::now();
            tick(world);
            sink.render(world)?;
            let work = frame_start.elapsed();
            stats.record(work);

            if stats.frames() % self.stats_every as u64 == 0 {
                if let Some(avg) = stats.take_window() {
                    log::debug!(
                        "Avg frame time: {:.3} ms ({:.1} FPS), {} live bodies",
                        avg.as_secs_f64() * 1000.0,
                        1.0 / avg.as_secs_f64().max(1e-9),
                        world.valid_count()
                    );
                }
            }

            if self.realtime {
                if let Some(rest) = self.interval.checked_sub(work) {
                    thread::sleep(rest);
                }
            }
        }

        sink.finish()?;

        let summary = RunSummary {
            ticks: stats.frames(),
            stopped_early,
            elapsed: started.elapsed(),
            stats,
        };
        log::info!(
            "{} {} ticks in {:.1}s (avg {:.3} ms, worst {:.3} ms), {} live bodies",
            if summary.stopped_early { "Stopped after" } else { "Finished" },
            summary.ticks,
            summary.elapsed.as_secs_f64(),
            summary.stats.average().as_secs_f64() * 1000.0,
            summary.stats.worst().as_secs_f64() * 1000.0,
            world.valid_count()
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::input::NeverStop;
    use crate::settings::InteractionPolicy;

    struct CountingSink {
        frames: u64,
        finished: bool,
    }

    impl RenderSink for CountingSink {
        fn render(&mut self, _world: &World) -> Result<(), SinkError> {
            self.frames += 1;
            Ok(())
        }

        fn finish(&mut self) -> Result<(), SinkError> {
            self.finished = true;
            Ok(())
        }
    }

    struct StopAfter(u32);

    impl StopSignal for StopAfter {
        fn should_stop(&mut self) -> bool {
            if self.0 == 0 {
                return true;
            }
            self.0 -= 1;
            false
        }
    }

    fn small_world() -> World {
        let settings = Settings {
            width: 400,
            height: 300,
            population: 10,
            base_size: 20.0,
            ..Settings::from_policy(InteractionPolicy::Bounce)
        };
        World::new(settings, 17).unwrap()
    }

    #[test]
    fn test_runs_exact_tick_budget() {
        let mut world = small_world();
        let scheduler = Scheduler::new(&world.settings).realtime(false).with_total_ticks(50);
        let mut sink = CountingSink {
            frames: 0,
            finished: false,
        };
        let summary = scheduler.run(&mut world, &mut sink, &mut NeverStop).unwrap();

        assert_eq!(summary.ticks, 50);
        assert!(!summary.stopped_early);
        assert_eq!(sink.frames, 50);
        assert!(sink.finished);
        assert_eq!(world.time_ticks, 50);
    }

    #[test]
    fn test_stop_signal_checked_at_tick_boundary() {
        let mut world = small_world();
        let scheduler = Scheduler::new(&world.settings).realtime(false).with_total_ticks(1000);
        let mut sink = CountingSink {
            frames: 0,
            finished: false,
        };
        let summary = scheduler.run(&mut world, &mut sink, &mut StopAfter(7)).unwrap();

        assert!(summary.stopped_early);
        assert_eq!(summary.ticks, 7);
        assert_eq!(world.time_ticks, 7);
        assert!(sink.finished);
    }

    #[test]
    fn test_default_budget_from_settings() {
        let settings = Settings::default();
        let scheduler = Scheduler::new(&settings);
        assert_eq!(scheduler.total_ticks(), 60 * 1800);
    }

    #[test]
    fn test_paced_run_takes_at_least_the_frame_interval() {
        let mut world = small_world();
        world.settings.fps = 100;
        let scheduler = Scheduler::new(&world.settings).with_total_ticks(5);
        let summary = scheduler
            .run(&mut world, &mut crate::renderer::FrameBuffer::new(400, 300, 0), &mut NeverStop)
            .unwrap();
        assert!(summary.elapsed >= Duration::from_millis(40));
    }

    #[test]
    fn test_frame_stats_window() {
        let mut stats = FrameStats::default();
        assert_eq!(stats.take_window(), None);
        stats.record(Duration::from_millis(2));
        stats.record(Duration::from_millis(4));
        assert_eq!(stats.take_window(), Some(Duration::from_millis(3)));
        assert_eq!(stats.take_window(), None);
        stats.record(Duration::from_millis(9));
        assert_eq!(stats.frames(), 3);
        assert_eq!(stats.worst(), Duration::from_millis(9));
        assert_eq!(stats.average(), Duration::from_millis(5));
    }
}
