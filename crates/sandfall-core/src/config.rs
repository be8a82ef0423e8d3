//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Grid dimensions, tick timing and brush/render tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Grid width in cells
    pub width: usize,
    /// Grid height in cells
    pub height: usize,
    /// Seconds of real time per simulation tick
    pub tick_interval: f32,
    /// Cap on ticks run by a single `update` call
    pub max_ticks_per_update: u32,
    /// Liquid sub-passes per tick
    pub liquid_flow_passes: u32,
    /// Paint brush radius in cells
    pub brush_radius: u32,
    /// Max relative brightness jitter applied to liquids when rendering
    pub liquid_shimmer: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::from_resolution(240, 16.0 / 9.0)
    }
}

impl SimConfig {
    /// Grid sized from a vertical resolution and a display aspect ratio
    pub fn from_resolution(vertical_resolution: usize, aspect: f32) -> Self {
        Self {
            width: (vertical_resolution as f32 * aspect).round() as usize,
            height: vertical_resolution,
            tick_interval: 0.05,
            max_ticks_per_update: 2,
            liquid_flow_passes: 5,
            brush_radius: 5,
            liquid_shimmer: 0.05,
        }
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        if self.tick_interval.is_nan() || self.tick_interval <= 0.0 {
            return Err(ConfigError::InvalidTickInterval(self.tick_interval));
        }
        if self.max_ticks_per_update == 0 {
            return Err(ConfigError::NoTicksPerUpdate);
        }
        if !(0.0..=1.0).contains(&self.liquid_shimmer) {
            return Err(ConfigError::InvalidShimmer(self.liquid_shimmer));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimConfig::default();
        assert_eq!(config.height, 240);
        assert_eq!(config.width, 427);
        assert_eq!(config.tick_interval, 0.05);
        assert_eq!(config.liquid_flow_passes, 5);
        assert_eq!(config.brush_radius, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_resolution_rounds_width() {
        let config = SimConfig::from_resolution(100, 1.5);
        assert_eq!((config.width, config.height), (150, 100));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(matches!(
            SimConfig::default().with_size(0, 10).validate(),
            Err(ConfigError::EmptyGrid { .. })
        ));

        let config = SimConfig {
            tick_interval: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTickInterval(_))
        ));

        let config = SimConfig {
            max_ticks_per_update: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoTicksPerUpdate)));
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config: SimConfig = ron::from_str("(width: 64, height: 32)").unwrap();
        assert_eq!((config.width, config.height), (64, 32));
        assert_eq!(config.liquid_flow_passes, 5);
    }
}
