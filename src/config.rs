// Immutable launch settings, validated before any window exists.

use std::path::PathBuf;
use std::time::Duration;

use crate::color::TransparencyKey;
use crate::error::{Error, Result};
use crate::prepare::FitBox;

pub const DEFAULT_FPS: u32 = 18;
pub const MAX_FPS: u32 = 1000;
/// Matte tolerance used by the "remove background, then run" launch.
pub const DEFAULT_LAUNCH_TOLERANCE: u8 = 10;

/// Built-in sprites shipped next to the binary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    Cat,
    Fox,
    Fox2,
}

impl Preset {
    pub fn file_name(self) -> &'static str {
        match self {
            Preset::Cat => "cat.gif",
            Preset::Fox => "Fox.gif",
            Preset::Fox2 => "fox2.gif",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayConfig {
    pub source: PathBuf,
    /// Side of the square box the sprite is fitted into.
    pub size: u32,
    pub fps: u32,
    pub remove_background: bool,
    pub tolerance: u8,
    pub key: TransparencyKey,
    /// Minimum time between focused-window queries; zero = every frame.
    pub poll_interval: Duration,
}

impl OverlayConfig {
    pub fn new(source: impl Into<PathBuf>, size: u32, fps: u32) -> Result<Self> {
        Self {
            source: source.into(),
            size,
            fps,
            remove_background: false,
            tolerance: DEFAULT_LAUNCH_TOLERANCE,
            key: TransparencyKey::default(),
            poll_interval: Duration::ZERO,
        }
        .validated()
    }

    pub fn with_background_removal(mut self, tolerance: u8) -> Self {
        self.remove_background = true;
        self.tolerance = tolerance;
        self
    }

    pub fn with_key(mut self, key: TransparencyKey) -> Self {
        self.key = key;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn fit_box(&self) -> FitBox {
        FitBox::square(self.size)
    }

    fn validated(self) -> Result<Self> {
        if self.source.as_os_str().is_empty() {
            return Err(Error::configuration("no source file given"));
        }
        if self.size == 0 {
            return Err(Error::configuration("size must be greater than zero"));
        }
        if self.fps == 0 || self.fps > MAX_FPS {
            return Err(Error::configuration(format!(
                "fps must be in 1..={MAX_FPS}, got {}",
                self.fps
            )));
        }
        Ok(self)
    }
}
