//! Mapping of user positions onto a layer range.
//!
//! Users give start and finish positions either as heights in millimeters or
//! as one-based layer numbers from the slicer preview. The G-code itself
//! numbers layers from zero. [`LayerRange::resolve`] converts both forms into
//! an inclusive zero-based range and, for blends, the change in mix ratio per
//! layer.
//!
//! Millimeter positions snap to whole layers. Layer numbers are only shifted
//! to zero-based, so a fractional layer number gives a fractional bound: a
//! fixed mix at layer 1.5 matches no layer at all.

use crate::config::{Behavior, MixConfig, Units};
use crate::{Error, Result};
use log::{debug, warn};
use serde::Serialize;

/// Inclusive range of zero-based layers to mix, with the ratio ramp.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LayerRange {
    /// Lower bound. Whole for millimeter positions, may be fractional for layer numbers.
    pub start_layer: f64,
    /// Upper bound.
    pub end_layer: f64,
    /// Change in first-feed percentage per layer. Zero for fixed mixes.
    pub increment: f64,
    /// First-feed percentage at `start_layer`.
    pub start_ratio: f64,
}

impl LayerRange {
    /// Resolve the range for `config`.
    ///
    /// `layer_height` is only consulted for millimeter units. A blend whose
    /// start and finish land on the same layer has no slope and is rejected
    /// with [`Error::DegenerateRange`].
    pub fn resolve(config: &MixConfig, layer_height: f64) -> Result<Self> {
        let start_layer = position_to_layer(config.units, config.start_height, layer_height);

        let range = match config.behavior {
            Behavior::Fixed => Self {
                start_layer,
                end_layer: start_layer,
                increment: 0.0,
                start_ratio: config.mix_start,
            },
            Behavior::Blend => {
                let end_layer =
                    position_to_layer(config.units, config.finish_height, layer_height);
                if end_layer == start_layer {
                    return Err(Error::DegenerateRange { layer: start_layer });
                }
                if end_layer < start_layer {
                    warn!(
                        "Blend finishes at layer {} before it starts at layer {}, no layer will be mixed",
                        end_layer, start_layer
                    );
                }
                Self {
                    start_layer,
                    end_layer,
                    increment: (config.mix_finish - config.mix_start) / (end_layer - start_layer),
                    start_ratio: config.mix_start,
                }
            }
        };

        debug!(
            "Layer range {}..={} (increment {:.3}%/layer)",
            range.start_layer, range.end_layer, range.increment
        );
        Ok(range)
    }

    /// Check whether a layer is inside the range, boundaries included.
    pub fn contains(&self, layer: i64) -> bool {
        let layer = layer as f64;
        layer >= self.start_layer && layer <= self.end_layer
    }

    /// First-feed percentage at `layer`, truncated toward zero.
    ///
    /// Not clamped; ratios outside 0-100 pass straight through. The rewriter
    /// clamps the value into 0..=100 before emitting it, so the G-code may
    /// carry a different percentage than this returns.
    pub fn mix_value(&self, layer: i64) -> i64 {
        ((layer as f64 - self.start_layer) * self.increment + self.start_ratio) as i64
    }
}

/// Convert one user position to a zero-based layer.
///
/// A millimeter position of exactly 0 is always layer 0, whatever the layer
/// height. With no resolved layer height every millimeter position is layer 0.
/// Layer numbers keep any fraction.
fn position_to_layer(units: Units, position: f64, layer_height: f64) -> f64 {
    match units {
        Units::Millimeters => {
            if position == 0.0 {
                0.0
            } else if layer_height <= 0.0 {
                warn!(
                    "No layer height declared in the G-code, treating {} mm as layer 0",
                    position
                );
                0.0
            } else {
                (position / layer_height).round_ties_even()
            }
        }
        Units::Layer => {
            let position = if position <= 0.0 { 1.0 } else { position };
            position - 1.0
        }
    }
}
