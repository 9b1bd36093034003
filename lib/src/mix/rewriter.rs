//! Layer-by-layer stream rewriting.
//!
//! The rewriter walks every block in order, tracking the current layer from
//! `;LAYER:` markers and counting objects: under "one at a time" sequencing
//! every object restarts its layer numbering at 0, so each `;LAYER:0` begins
//! a new object.
//!
//! Right after the marker of every targeted layer it writes a mix block:
//!
//! ```text
//! ;LAYER:5
//! M163 S0 P0.70 ; ColorMix
//! M163 S1 P0.30 ; ColorMix
//! M164 S2 ; ColorMix
//! T2 ; ColorMix
//! ```
//!
//! A mix block already following the marker is dropped first, so running the
//! pass again with the same settings gives the same output.

use super::range::LayerRange;
use crate::gcode::tag::LAYER_INDEX;
use crate::gcode::{is_injected, MixCommand, FEED_SELECT, INJECTED_TAG, LEGACY_BLOCK_LEN};
use log::{debug, warn};
use serde::Serialize;

/// Position of the pass within the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunningState {
    /// Current zero-based layer, -1 before the first marker.
    pub current_layer: i64,
    /// One-based index of the current object, 0 before the first `;LAYER:0`.
    pub object_index: u32,
}

impl Default for RunningState {
    fn default() -> Self {
        Self {
            current_layer: -1,
            object_index: 0,
        }
    }
}

impl RunningState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance on a layer marker line. An unparseable marker leaves the
    /// state unchanged.
    pub fn enter_layer(&mut self, marker_line: &str) {
        if let Some(layer) = LAYER_INDEX.value(marker_line) {
            self.current_layer = layer as i64;
            if self.current_layer == 0 {
                self.object_index += 1;
            }
        }
    }
}

/// Counters collected during a rewrite pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RewriteStats {
    /// Blocks processed.
    pub blocks: usize,
    /// Layer markers encountered.
    pub layers_seen: usize,
    /// Objects detected.
    pub objects_seen: u32,
    /// Layers that received a mix block.
    pub layers_mixed: usize,
    /// Previously injected mix blocks that were replaced.
    pub stale_blocks_removed: usize,
    /// Mix values clamped into 0-100.
    pub clamped_values: usize,
}

/// Injects mix blocks into the layers of a range.
#[derive(Clone, Debug)]
pub struct StreamRewriter {
    range: LayerRange,
    object_number: u32,
}

impl StreamRewriter {
    /// Create a rewriter for `range`, restricted to one object unless
    /// `object_number` is 0.
    pub fn new(range: LayerRange, object_number: u32) -> Self {
        Self {
            range,
            object_number,
        }
    }

    pub fn range(&self) -> &LayerRange {
        &self.range
    }

    /// Check whether the layer the state points at should be mixed.
    pub fn targets(&self, state: &RunningState) -> bool {
        self.range.contains(state.current_layer)
            && (self.object_number == 0 || self.object_number == state.object_index)
    }

    /// Rewrite every block in place.
    pub fn rewrite_all(&self, blocks: &mut [String]) -> RewriteStats {
        self.rewrite_all_with_callback(blocks, |_| {})
    }

    /// Rewrite every block in place, reporting progress (0 to 1) after each.
    pub fn rewrite_all_with_callback<F>(
        &self,
        blocks: &mut [String],
        mut callback: F,
    ) -> RewriteStats
    where
        F: FnMut(f64),
    {
        let mut state = RunningState::new();
        let mut stats = RewriteStats::default();
        let total = blocks.len().max(1) as f64;

        for (index, block) in blocks.iter_mut().enumerate() {
            *block = self.rewrite_block(block, &mut state, &mut stats);
            callback((index + 1) as f64 / total);
        }

        stats.objects_seen = state.object_index;
        stats
    }

    /// Rewrite a single block, threading `state` across calls.
    ///
    /// Every non-empty line is kept in order; empty lines are dropped.
    pub fn rewrite_block(
        &self,
        block: &str,
        state: &mut RunningState,
        stats: &mut RewriteStats,
    ) -> String {
        let lines: Vec<&str> = block.split('\n').collect();
        let mut out = String::with_capacity(block.len() + 128);
        let mut index = 0;

        while index < lines.len() {
            let line = lines[index];
            index += 1;

            if !line.is_empty() {
                out.push_str(line);
                out.push('\n');
            }

            if !LAYER_INDEX.is_present(line) {
                continue;
            }
            state.enter_layer(line);
            stats.layers_seen += 1;

            if !self.targets(state) {
                continue;
            }

            let stale = stale_block_len(&lines[index..]);
            if stale > 0 {
                debug!(
                    "Replacing {} stale mix lines at layer {}",
                    stale, state.current_layer
                );
                index += stale;
                stats.stale_blocks_removed += 1;
            }

            let mix = self.range.mix_value(state.current_layer);
            let clamped = mix.clamp(0, 100);
            if clamped != mix {
                warn!(
                    "Mix {}% at layer {} is out of range, using {}%",
                    mix, state.current_layer, clamped
                );
                stats.clamped_values += 1;
            }

            for command in MixCommand::mix_block(clamped as u8) {
                out.push_str(&command.to_gcode());
                out.push(' ');
                out.push_str(INJECTED_TAG);
                out.push('\n');
            }
            stats.layers_mixed += 1;
        }

        stats.blocks += 1;
        out
    }
}

/// Length of a mix block at the start of `following`, or 0.
///
/// Tagged lines are matched by content. Untagged blocks from older versions
/// are recognized by position: four lines, the last being the feed select.
pub(crate) fn stale_block_len(following: &[&str]) -> usize {
    let tagged = following.iter().take_while(|l| is_injected(l)).count();
    if tagged > 0 {
        return tagged;
    }
    match following.get(LEGACY_BLOCK_LEN - 1) {
        Some(line) if line.trim_end() == FEED_SELECT => LEGACY_BLOCK_LEN,
        _ => 0,
    }
}
