//! G-code module.
//!
//! This module provides the mixing command vocabulary emitted by the rewriter,
//! the markers it recognizes in slicer output, and the block-structured
//! [`Document`] the host hands over.

mod document;
pub mod tag;

pub use document::Document;

/// Virtual tool the blended mix is saved to and selected from.
pub const MIX_SLOT: u8 = 2;

/// Feed-select command that ends every injected mix block.
pub const FEED_SELECT: &str = "T2";

/// Trailing comment appended to every injected line.
pub const INJECTED_TAG: &str = "; ColorMix";

/// Number of lines in an untagged mix block written by older versions.
pub const LEGACY_BLOCK_LEN: usize = 4;

/// Proportion of one mixer channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MixProportion {
    /// Channel carries the whole mix (`P1`).
    Full,
    /// Channel is off (`P0`).
    Off,
    /// Channel carries `n` percent, 1..=99 (`P0.nn`).
    Percent(u8),
}

/// Marlin mixing extruder commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MixCommand {
    /// M163 - Set mix factor for one stepper channel
    SetMixFactor {
        channel: u8,
        proportion: MixProportion,
    },
    /// M164 - Save current mix to a virtual tool
    SaveMix { slot: u8 },
    /// T - Select tool
    SelectTool(u8),
}

impl MixCommand {
    /// Convert the command to a G-code string.
    pub fn to_gcode(&self) -> String {
        match self {
            MixCommand::SetMixFactor {
                channel,
                proportion,
            } => match proportion {
                MixProportion::Full => format!("M163 S{} P1", channel),
                MixProportion::Off => format!("M163 S{} P0", channel),
                MixProportion::Percent(p) => format!("M163 S{} P0.{:02}", channel, p),
            },
            MixCommand::SaveMix { slot } => format!("M164 S{}", slot),
            MixCommand::SelectTool(tool) => format!("T{}", tool),
        }
    }

    /// The four commands that set, save and select a mix where the first
    /// feed gets `percent` and the second feed the remainder.
    ///
    /// `percent` is clamped to 100.
    pub fn mix_block(percent: u8) -> [MixCommand; 4] {
        let percent = percent.min(100);
        let (first, second) = match percent {
            100 => (MixProportion::Full, MixProportion::Off),
            0 => (MixProportion::Off, MixProportion::Full),
            p => (MixProportion::Percent(p), MixProportion::Percent(100 - p)),
        };
        [
            MixCommand::SetMixFactor {
                channel: 0,
                proportion: first,
            },
            MixCommand::SetMixFactor {
                channel: 1,
                proportion: second,
            },
            MixCommand::SaveMix { slot: MIX_SLOT },
            MixCommand::SelectTool(MIX_SLOT),
        ]
    }
}

/// Check whether a line was written by the rewriter.
pub fn is_injected(line: &str) -> bool {
    line.trim_end().ends_with(INJECTED_TAG)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(percent: u8) -> Vec<String> {
        MixCommand::mix_block(percent)
            .iter()
            .map(|c| c.to_gcode())
            .collect()
    }

    #[test]
    fn test_full_first_feed() {
        assert_eq!(render(100), ["M163 S0 P1", "M163 S1 P0", "M164 S2", "T2"]);
    }

    #[test]
    fn test_full_second_feed() {
        assert_eq!(render(0), ["M163 S0 P0", "M163 S1 P1", "M164 S2", "T2"]);
    }

    #[test]
    fn test_proportional_mix() {
        assert_eq!(
            render(70),
            ["M163 S0 P0.70", "M163 S1 P0.30", "M164 S2", "T2"]
        );
        // Two-digit zero padding
        assert_eq!(render(5)[0], "M163 S0 P0.05");
        assert_eq!(render(5)[1], "M163 S1 P0.95");
    }

    #[test]
    fn test_mix_block_clamps() {
        assert_eq!(render(250), render(100));
    }

    #[test]
    fn test_select_tool_matches_feed_select() {
        assert_eq!(MixCommand::SelectTool(MIX_SLOT).to_gcode(), FEED_SELECT);
    }

    #[test]
    fn test_is_injected() {
        assert!(is_injected("M164 S2 ; ColorMix"));
        assert!(is_injected("T2 ; ColorMix\r"));
        assert!(!is_injected("T2"));
        assert!(!is_injected(";LAYER:3"));
    }
}
