//! Block-structured G-code document.

use super::tag::LAYER_INDEX;
use std::fs;
use std::io;
use std::path::Path;

/// Sliced G-code as an ordered list of text blocks.
///
/// The slicer hands post-processors one block per layer, each beginning with
/// its `;LAYER:` marker, preceded by a header block with the start G-code.
/// Blocks are stored as raw text and may be replaced wholesale.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<String>,
}

impl Document {
    /// Wrap an existing list of blocks.
    pub fn new(blocks: Vec<String>) -> Self {
        Self { blocks }
    }

    /// Split flat G-code into blocks, starting a new block at every line
    /// that begins with the layer marker.
    pub fn from_gcode(content: &str) -> Self {
        let mut blocks = Vec::new();
        let mut current = String::new();

        for line in content.split_inclusive('\n') {
            if line.starts_with(LAYER_INDEX.key) && !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            current.push_str(line);
        }
        if !current.is_empty() {
            blocks.push(current);
        }

        Self { blocks }
    }

    /// Read and split a G-code file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_gcode(&content))
    }

    /// Concatenate all blocks back into flat G-code.
    pub fn to_gcode(&self) -> String {
        self.blocks.concat()
    }

    /// Write the document to a file.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        fs::write(path, self.to_gcode())
    }

    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut [String] {
        &mut self.blocks
    }

    pub fn into_blocks(self) -> Vec<String> {
        self.blocks
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Total number of lines across all blocks.
    pub fn line_count(&self) -> usize {
        self.blocks.iter().map(|b| b.lines().count()).sum()
    }
}

impl From<Vec<String>> for Document {
    fn from(blocks: Vec<String>) -> Self {
        Self::new(blocks)
    }
}
