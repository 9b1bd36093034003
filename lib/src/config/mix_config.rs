//! Mix configuration types.
//!
//! This module provides the settings that control where and how the two
//! filament feeds are blended. Field names in JSON follow the keys used by
//! the slicer's post-processing settings panel, so a settings export can be
//! loaded directly.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// How start/finish positions are interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Units {
    /// Positions are heights in millimeters.
    #[serde(rename = "mm")]
    Millimeters,
    /// Positions are one-based layer numbers, as shown in the slicer preview.
    #[default]
    #[serde(rename = "layer")]
    Layer,
}

impl Units {
    /// Parse units from a CLI-style name.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mm" | "millimeters" => Some(Units::Millimeters),
            "layer" | "layers" => Some(Units::Layer),
            _ => None,
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Units::Millimeters => write!(f, "mm"),
            Units::Layer => write!(f, "layer"),
        }
    }
}

/// Fixed ratio or linear blend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Behavior {
    /// Set a single mixture at the start position.
    #[default]
    #[serde(rename = "fixed_value")]
    Fixed,
    /// Fade from the start ratio to the finish ratio across the range.
    #[serde(rename = "blend_value")]
    Blend,
}

impl Behavior {
    /// Parse behavior from a CLI-style name.
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fixed" | "fixed_value" => Some(Behavior::Fixed),
            "blend" | "blend_value" => Some(Behavior::Blend),
            _ => None,
        }
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Behavior::Fixed => write!(f, "fixed"),
            Behavior::Blend => write!(f, "blend"),
        }
    }
}

/// Settings for one color mix pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixConfig {
    /// Units for `start_height` and `finish_height`.
    #[serde(rename = "unitsOfMeasurement")]
    pub units: Units,

    /// Object to apply the mix to under "one at a time" sequencing.
    /// 0 = every object.
    #[serde(rename = "objectNumber")]
    pub object_number: u32,

    /// Where the mix starts (mm or layer).
    pub start_height: f64,

    /// Fixed or blend.
    pub behavior: Behavior,

    /// Where the blend finishes (mm or layer). Ignored for fixed mixes.
    pub finish_height: f64,

    /// First extruder percentage at the start position, 0-100.
    pub mix_start: f64,

    /// First extruder percentage at the finish position, 0-100.
    pub mix_finish: f64,
}

impl MixConfig {
    /// Create a new MixConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set how start and finish positions are measured.
    pub fn units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    /// Builder method: select a single object (0 = all).
    pub fn object_number(mut self, object: u32) -> Self {
        self.object_number = object;
        self
    }

    /// Builder method: position of the first mixed layer.
    pub fn start_height(mut self, height: f64) -> Self {
        self.start_height = height;
        self
    }

    /// Builder method: position of the last blended layer.
    pub fn finish_height(mut self, height: f64) -> Self {
        self.finish_height = height;
        self
    }

    /// Builder method: fixed mix or linear blend.
    pub fn behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Builder method: first extruder percentage at the start.
    pub fn mix_start(mut self, ratio: f64) -> Self {
        self.mix_start = ratio;
        self
    }

    /// Builder method: first extruder percentage at the finish.
    pub fn mix_finish(mut self, ratio: f64) -> Self {
        self.mix_finish = ratio;
        self
    }

    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a configuration from a JSON string.
    ///
    /// Missing keys take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration.
    ///
    /// Ratios are only required to be finite; values outside 0-100 are
    /// accepted and clamped when the mix is emitted.
    pub fn validate(&self) -> Result<()> {
        for (name, height) in [
            ("start_height", self.start_height),
            ("finish_height", self.finish_height),
        ] {
            if !height.is_finite() || height < 0.0 {
                return Err(Error::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, height
                )));
            }
        }
        for (name, ratio) in [("mix_start", self.mix_start), ("mix_finish", self.mix_finish)] {
            if !ratio.is_finite() {
                return Err(Error::Config(format!("{} must be finite", name)));
            }
        }
        Ok(())
    }
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            units: Units::Layer,
            object_number: 0,
            start_height: 0.0,
            behavior: Behavior::Fixed,
            finish_height: 0.0,
            mix_start: 100.0,
            mix_finish: 0.0,
        }
    }
}

impl fmt::Display for MixConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.behavior {
            Behavior::Fixed => write!(
                f,
                "MixConfig(fixed {:.0}% at {}{}, object={})",
                self.mix_start, self.start_height, self.units, self.object_number
            ),
            Behavior::Blend => write!(
                f,
                "MixConfig(blend {:.0}%->{:.0}% over {}-{}{}, object={})",
                self.mix_start,
                self.mix_finish,
                self.start_height,
                self.finish_height,
                self.units,
                self.object_number
            ),
        }
    }
}
