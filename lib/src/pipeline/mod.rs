//! Pipeline module - orchestrates a complete color mix pass.
//!
//! This module provides a high-level API for the whole post-processing step:
//! blocks → layer height → layer range → rewritten blocks
//!
//! # Example
//!
//! ```rust,ignore
//! use colormix::pipeline::ColorMixPipeline;
//! use colormix::{Document, MixConfig};
//!
//! let mut document = Document::from_file("model.gcode")?;
//! let pipeline = ColorMixPipeline::new(MixConfig::default());
//!
//! let report = pipeline.process(&mut document)?;
//! println!("{}", report.to_json()?);
//! ```

use crate::config::{MixConfig, Units};
use crate::gcode::Document;
use crate::mix::{resolve_layer_height, LayerRange, RewriteStats, StreamRewriter};
use crate::Result;
use log::info;
use serde::Serialize;

/// The main pipeline that runs one color mix pass.
#[derive(Clone, Debug, Default)]
pub struct ColorMixPipeline {
    /// Mix configuration.
    config: MixConfig,
}

impl ColorMixPipeline {
    /// Create a new pipeline with the given configuration.
    pub fn new(config: MixConfig) -> Self {
        Self { config }
    }

    /// Create a pipeline with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(MixConfig::default())
    }

    /// Get the configuration.
    pub fn config(&self) -> &MixConfig {
        &self.config
    }

    /// Get mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut MixConfig {
        &mut self.config
    }

    /// Host entry point: rewrite the slicer's layer blocks and hand them back.
    pub fn execute(&self, data: Vec<String>) -> Result<Vec<String>> {
        let mut document = Document::new(data);
        self.process(&mut document)?;
        Ok(document.into_blocks())
    }

    /// Run the pass over a document in place.
    pub fn process(&self, document: &mut Document) -> Result<MixReport> {
        self.process_with_callback(document, |_, _| {})
    }

    /// Run the pass with a progress callback.
    ///
    /// The callback receives (stage_name, progress_0_to_1).
    pub fn process_with_callback<F>(
        &self,
        document: &mut Document,
        mut callback: F,
    ) -> Result<MixReport>
    where
        F: FnMut(&str, f64),
    {
        self.config.validate()?;

        // Step 1: Layer height, only needed to convert millimeters
        callback("layer_height", 0.0);
        let layer_height = match self.config.units {
            Units::Millimeters => resolve_layer_height(document.blocks()),
            Units::Layer => 0.0,
        };
        callback("layer_height", 1.0);

        // Step 2: Layer range
        callback("range", 0.0);
        let range = LayerRange::resolve(&self.config, layer_height)?;
        callback("range", 1.0);

        // Step 3: Rewrite
        let rewriter = StreamRewriter::new(range, self.config.object_number);
        let stats = rewriter.rewrite_all_with_callback(document.blocks_mut(), |progress| {
            callback("rewrite", progress);
        });
        callback("rewrite", 1.0);

        info!(
            "Mixed {} of {} layers across {} object(s)",
            stats.layers_mixed, stats.layers_seen, stats.objects_seen
        );

        Ok(MixReport {
            config: self.config.clone(),
            layer_height,
            range,
            stats,
        })
    }
}

/// Result of one color mix pass.
#[derive(Clone, Debug, Serialize)]
pub struct MixReport {
    /// Configuration used.
    pub config: MixConfig,
    /// Layer height used for millimeter conversion (0 if unused or undeclared).
    pub layer_height: f64,
    /// Resolved layer range.
    pub range: LayerRange,
    /// Rewrite counters.
    pub stats: RewriteStats,
}

impl MixReport {
    /// Serialize the report to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
