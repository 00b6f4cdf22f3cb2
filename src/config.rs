//! Engine configuration.
//!
//! Values are read once at startup and handed to the [`Engine`](crate::Engine)
//! as plain data. A config can be built in code or loaded from TOML:
//!
//! ```toml
//! tick_rate = 60
//! title = "Hero"
//! background = { r = 16, g = 16, b = 24 }
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// True-color RGB value used to clear the frame.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash, Deserialize)]
pub struct Rgb {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black (0, 0, 0)
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// White (255, 255, 255)
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Create from a 24-bit hex color (e.g., 0xFF5500).
    #[inline]
    pub const fn from_u32(hex: u32) -> Self {
        Self::new(
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }
}

impl std::fmt::Debug for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    #[inline]
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

/// Configuration for the [`Engine`](crate::Engine).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Simulation steps per second.
    pub tick_rate: u32,
    /// Color the frame is cleared to before rendering.
    pub background: Rgb,
    /// Window or terminal title.
    pub title: String,
    /// Requested display width.
    pub display_width: u32,
    /// Requested display height.
    pub display_height: u32,
    /// Upper bound for each process drain during shutdown.
    ///
    /// `None` waits until every process has exited.
    pub drain_timeout_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            background: Rgb::BLACK,
            title: "Untitled".to_string(),
            display_width: 640,
            display_height: 480,
            drain_timeout_ms: None,
        }
    }
}

impl EngineConfig {
    /// Parse a config from a TOML string. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check the values that would make the loop misbehave.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::InvalidTickRate);
        }
        Ok(())
    }

    /// Duration of one simulation step.
    #[inline]
    pub fn step(&self) -> Duration {
        Duration::from_secs(1) / self.tick_rate.max(1)
    }

    /// Shutdown drain timeout, if any.
    #[inline]
    pub fn drain_timeout(&self) -> Option<Duration> {
        self.drain_timeout_ms.map(Duration::from_millis)
    }
}
