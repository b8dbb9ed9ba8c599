//! Run settings
//!
//! Fixed at startup and loaded from JSON. Nothing here changes at runtime; the
//! mutable parts (active policy, gravity constant) are copied into the world.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::BACKGROUND_COLOR;
use crate::error::SimError;

/// How two touching bodies interact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InteractionPolicy {
    /// Elastic equal-mass bounce
    #[default]
    Bounce,
    /// Larger body slowly absorbs the smaller; runs the core/shell cycle
    Suction,
    /// Irreversible area-conserving merge
    Fuse,
}

impl InteractionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionPolicy::Bounce => "bounce",
            InteractionPolicy::Suction => "suction",
            InteractionPolicy::Fuse => "fuse",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bounce" | "elastic" => Some(InteractionPolicy::Bounce),
            "suction" | "absorb" => Some(InteractionPolicy::Suction),
            "fuse" | "fusion" | "merge" => Some(InteractionPolicy::Fuse),
            _ => None,
        }
    }

    /// Whether this configuration drives the core/shell lifecycle
    pub fn has_lifecycle(&self) -> bool {
        matches!(self, InteractionPolicy::Suction)
    }
}

/// N-body attraction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GravitySettings {
    pub enabled: bool,
    /// Initial G, restored after every core/shell cycle
    pub constant: f32,
    /// Per-tick multiplier while not collision-enabled
    pub growth: f32,
    /// G never grows past this
    pub max_constant: f32,
    /// Added to r² so coincident centers stay finite
    pub softening: f32,
}

impl Default for GravitySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            constant: 0.05,
            growth: 1.001,
            max_constant: 50.0,
            softening: 1.0,
        }
    }
}

/// Suction variant tuning and core/shell cycle limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleSettings {
    /// Ticks a lone survivor waits before becoming a core
    pub wait_ticks: u32,
    /// Shell bodies emitted per tick at most
    pub emission_batch: u32,
    /// Placement attempts per emission
    pub emission_trials: u32,
    /// Clearance between the core surface and a fresh shell body
    pub emission_gap: f32,
    /// Ticks the bounce regime may last before it is forcibly ended
    pub bounce_phase_cap: u32,
    /// Fraction of a satellite's area handed to its host each tick
    pub transfer_rate: f32,
    /// A satellite smaller than this area is consumed
    pub absorb_floor: f32,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            wait_ticks: 2 * 60,
            emission_batch: 4,
            emission_trials: 32,
            emission_gap: 1.0,
            bounce_phase_cap: 20 * 60,
            transfer_rate: 0.1,
            absorb_floor: 1.0,
        }
    }
}

/// Where frames go
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Pipe frames to the encoder
    pub record: bool,
    /// Encoder output file
    pub output: String,
    /// x264 preset passed to the encoder
    pub preset: String,
    /// Encoder executable
    pub encoder: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            record: true,
            output: "out.mp4".to_string(),
            preset: "fast".to_string(),
            encoder: "ffmpeg".to_string(),
        }
    }
}

/// Complete run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Arena size in pixels
    pub width: u32,
    pub height: u32,
    /// Initial bodies; also the fixed slot capacity
    pub population: usize,
    /// Diameter of a freshly spawned body
    pub base_size: f32,
    /// Per-axis initial speed bound (pixels per tick)
    pub max_speed: f32,
    pub fps: u32,
    pub duration_secs: u32,
    pub policy: InteractionPolicy,
    /// RNG seed; `None` lets the binary pick one
    pub seed: Option<u64>,
    /// Packed 0xRRGGBB
    pub background: u32,
    pub gravity: GravitySettings,
    pub lifecycle: LifecycleSettings,
    pub output: OutputSettings,
}

impl Default for Settings {
    fn default() -> Self {
        let fps = 60;
        Self {
            width: 1920,
            height: 1080,
            population: 85,
            base_size: 40.0,
            max_speed: max_speed_for_fps(fps),
            fps,
            duration_secs: 30 * 60,
            policy: InteractionPolicy::Bounce,
            seed: None,
            background: BACKGROUND_COLOR,
            gravity: GravitySettings::default(),
            lifecycle: LifecycleSettings::default(),
            output: OutputSettings::default(),
        }
    }
}

/// 10 px/tick at 60 Hz, scaled so on-screen speed is frame-rate independent
pub fn max_speed_for_fps(fps: u32) -> f32 {
    10.0 * 60.0 / fps.max(1) as f32
}

impl Settings {
    /// Settings for a policy with its usual companions
    pub fn from_policy(policy: InteractionPolicy) -> Self {
        let mut settings = Self::default();
        settings.apply_policy(policy);
        settings
    }

    /// Switch policy (suction and fuse runs look best with gravity pulling)
    pub fn apply_policy(&mut self, policy: InteractionPolicy) {
        self.policy = policy;
        self.gravity.enabled = !matches!(policy, InteractionPolicy::Bounce);
    }

    /// Total ticks in the run
    pub fn total_ticks(&self) -> u64 {
        self.fps as u64 * self.duration_secs as u64
    }

    /// Frame interval for pacing
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }

    /// Load settings from a JSON file; missing fields take defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<(), SimError> {
        let invalid = |msg: String| Err(SimError::InvalidConfig(msg));

        if self.population == 0 {
            return invalid("population must be at least 1".to_string());
        }
        if !(self.base_size > 0.0 && self.base_size.is_finite()) {
            return invalid(format!("base_size must be positive, got {}", self.base_size));
        }
        let min_extent = 2.0 * self.base_size;
        if (self.width as f32) <= min_extent || (self.height as f32) <= min_extent {
            return invalid(format!(
                "arena {}x{} is too small for bodies of size {}",
                self.width, self.height, self.base_size
            ));
        }
        if self.fps == 0 {
            return invalid("fps must be at least 1".to_string());
        }
        if self.max_speed < 0.0 || !self.max_speed.is_finite() {
            return invalid(format!("max_speed must be non-negative, got {}", self.max_speed));
        }
        if !(0.0..=1.0).contains(&self.lifecycle.transfer_rate) || self.lifecycle.transfer_rate == 0.0 {
            return invalid(format!(
                "transfer_rate must be in (0, 1], got {}",
                self.lifecycle.transfer_rate
            ));
        }
        if self.gravity.softening <= 0.0 {
            return invalid("gravity softening must be positive".to_string());
        }
        if self.gravity.growth < 1.0 {
            return invalid(format!("gravity growth must be >= 1, got {}", self.gravity.growth));
        }
        Ok(())
    }
}
