//! Color mix processing.
//!
//! The three stages run in order:
//! 1. [`resolve_layer_height`] reads the declared layer height (millimeter units only)
//! 2. [`LayerRange::resolve`] maps user positions to an inclusive layer range
//! 3. [`StreamRewriter`] injects mix blocks into the targeted layers

mod layer_height;
mod range;
mod rewriter;

pub use layer_height::resolve_layer_height;
pub use range::LayerRange;
pub use rewriter::{RewriteStats, RunningState, StreamRewriter};

use crate::gcode::tag::LAYER_INDEX;
use serde::Serialize;

/// Read-only summary of a document.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DocumentSurvey {
    /// Declared layer height, 0 when not declared.
    pub layer_height: f64,
    /// Layer markers found.
    pub layer_markers: usize,
    /// Objects detected from `;LAYER:0` repeats.
    pub objects: u32,
    /// Highest layer index seen, -1 when there are no markers.
    pub max_layer: i64,
    /// Layers already followed by a mix block.
    pub mixed_layers: Vec<i64>,
}

/// Summarize a document without modifying it.
pub fn survey_document<S: AsRef<str>>(blocks: &[S]) -> DocumentSurvey {
    let mut state = RunningState::new();
    let mut survey = DocumentSurvey {
        layer_height: resolve_layer_height(blocks),
        max_layer: -1,
        ..Default::default()
    };

    for block in blocks {
        let lines: Vec<&str> = block.as_ref().split('\n').collect();
        for (index, line) in lines.iter().enumerate() {
            if !LAYER_INDEX.is_present(line) {
                continue;
            }
            state.enter_layer(line);
            survey.layer_markers += 1;
            survey.max_layer = survey.max_layer.max(state.current_layer);
            if rewriter::stale_block_len(&lines[index + 1..]) > 0 {
                survey.mixed_layers.push(state.current_layer);
            }
        }
    }

    survey.objects = state.object_index;
    survey
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_survey_plain_document() {
        let blocks = [
            ";Layer height: 0.16\nG28\n",
            ";LAYER:0\nG1 X1\n",
            ";LAYER:1\nG1 X2\n",
            ";LAYER:0\nG1 X1\n",
        ];
        let survey = survey_document(&blocks);
        assert!((survey.layer_height - 0.16).abs() < 1e-12);
        assert_eq!(survey.layer_markers, 3);
        assert_eq!(survey.objects, 2);
        assert_eq!(survey.max_layer, 1);
        assert!(survey.mixed_layers.is_empty());
    }

    #[test]
    fn test_survey_finds_mixed_layers() {
        let range = LayerRange {
            start_layer: 1.0,
            end_layer: 2.0,
            increment: 0.0,
            start_ratio: 50.0,
        };
        let mut blocks: Vec<String> = (0..4).map(|l| format!(";LAYER:{}\nG1 X1\n", l)).collect();
        StreamRewriter::new(range, 0).rewrite_all(&mut blocks);

        let survey = survey_document(&blocks);
        assert_eq!(survey.mixed_layers, [1, 2]);
        assert_eq!(survey.layer_height, 0.0);
    }
}
