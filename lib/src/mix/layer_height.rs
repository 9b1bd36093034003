//! Layer height resolution.

use crate::gcode::tag::LAYER_HEIGHT;
use log::debug;

/// Find the layer height declared in the slicer header.
///
/// Blocks are scanned in order and lines within a block in order; the first
/// positive `;Layer height:` value wins. Returns 0.0 when nothing is declared,
/// which callers must treat as unresolved.
pub fn resolve_layer_height<S: AsRef<str>>(blocks: &[S]) -> f64 {
    for (index, block) in blocks.iter().enumerate() {
        let found = block
            .as_ref()
            .split('\n')
            .filter_map(|line| LAYER_HEIGHT.value(line))
            .find(|height| *height > 0.0);
        if let Some(height) = found {
            debug!("Layer height {} mm declared in block {}", height, index);
            return height;
        }
    }
    0.0
}
