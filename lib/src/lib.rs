//! # ColorMix
//!
//! A G-code post-processor for 2-in-1 mixing hotends (e.g. the Geeetech A10M).
//!
//! Sliced G-code arrives as a list of blocks, one per printed layer. This library
//! injects Marlin mixing commands into selected layers so that the two filament
//! feeds blend in a fixed proportion, or fade linearly from one proportion to
//! another across a layer range:
//! - Layer height resolution from the slicer header
//! - Position (mm or layer number) to layer range mapping
//! - Per-object targeting for "one at a time" print sequences
//! - In-place rewriting that replaces previously injected mix blocks
//!
//! ## Example
//!
//! ```rust,ignore
//! use colormix::{Behavior, ColorMixPipeline, Document, MixConfig, Units};
//!
//! let mut document = Document::from_file("model.gcode")?;
//! let config = MixConfig::new()
//!     .units(Units::Millimeters)
//!     .behavior(Behavior::Blend)
//!     .start_height(0.0)
//!     .finish_height(10.0)
//!     .mix_start(100.0)
//!     .mix_finish(0.0);
//! let report = ColorMixPipeline::new(config).process(&mut document)?;
//! document.write_to_file("model.mixed.gcode")?;
//! ```

pub mod config;
pub mod gcode;
pub mod mix;
pub mod pipeline;

pub use config::{Behavior, MixConfig, Units};
pub use gcode::tag::{extract_value, NumberShape, TagMarker};
pub use gcode::{Document, MixCommand, MixProportion};
pub use mix::{
    resolve_layer_height, survey_document, DocumentSurvey, LayerRange, RewriteStats,
    RunningState, StreamRewriter,
};
pub use pipeline::{ColorMixPipeline, MixReport};

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for color mix operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Degenerate blend range: start and finish both resolve to layer {layer}")]
    DegenerateRange { layer: f64 },
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::DegenerateRange { layer: 4.0 };
        assert_eq!(
            err.to_string(),
            "Degenerate blend range: start and finish both resolve to layer 4"
        );

        let err = Error::Config("bad".into());
        assert_eq!(err.to_string(), "Configuration error: bad");
    }
}
