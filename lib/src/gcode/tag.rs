//! Tag-value extraction from slicer comments.
//!
//! Slicers embed metadata in G-code comments, e.g. `;Layer height: 0.2` in
//! the header or `;LAYER:12` at the start of each layer. A [`TagMarker`]
//! describes one such key: the text to look for, the shape of the number
//! that follows it, and whether a comment earlier on the line hides it.
//!
//! Extraction never fails hard. A missing key, a commented-out key, or a
//! value that does not parse all yield the caller's default.

/// The literal accepted immediately after a marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NumberShape {
    /// `[+-]?digits[.digits]`
    Decimal,
    /// `[+-]?digits`
    Integer,
    /// A single digit in `0..=max`.
    Digit { max: u8 },
}

/// A key embedded in G-code text, followed by a number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TagMarker {
    /// Marker text, including its leading `;` when it is a comment tag.
    pub key: &'static str,
    /// When true, a `;` earlier on the line than the key hides the value.
    pub comment_sensitive: bool,
    /// Shape of the literal following the key.
    pub shape: NumberShape,
}

/// Layer height declared in the slicer header.
pub const LAYER_HEIGHT: TagMarker = TagMarker::new(";Layer height: ");

/// Zero-based layer index at the start of each layer block.
pub const LAYER_INDEX: TagMarker = TagMarker::new(";LAYER:")
    .comment_sensitive(false)
    .shape(NumberShape::Integer);

/// Marker written by the ChangeAtZ post-processor.
pub const CHANGE_AT_Z: TagMarker = TagMarker::new(";ChangeAtZ")
    .comment_sensitive(false)
    .shape(NumberShape::Digit { max: 4 });

const COMMENT: char = ';';

impl TagMarker {
    /// A comment-sensitive marker with a decimal value.
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            comment_sensitive: true,
            shape: NumberShape::Decimal,
        }
    }

    pub const fn comment_sensitive(mut self, sensitive: bool) -> Self {
        self.comment_sensitive = sensitive;
        self
    }

    pub const fn shape(mut self, shape: NumberShape) -> Self {
        self.shape = shape;
        self
    }

    /// Check whether the key occurs anywhere on the line.
    pub fn is_present(&self, line: &str) -> bool {
        line.contains(self.key)
    }

    /// Extract the value following this marker, if any.
    pub fn value(&self, line: &str) -> Option<f64> {
        let pos = line.find(self.key)?;
        if self.comment_sensitive && line.find(COMMENT).is_some_and(|c| c < pos) {
            return None;
        }
        let rest = &line[pos + self.key.len()..];
        let literal = self.shape.leading_literal(rest);
        literal.parse::<f64>().ok()
    }

    /// Extract the value following this marker, or `default`.
    pub fn extract(&self, line: &str, default: f64) -> f64 {
        self.value(line).unwrap_or(default)
    }
}

impl NumberShape {
    /// The longest prefix of `text` matching this shape. May be empty or a
    /// lone sign, which then fails to parse.
    fn leading_literal<'a>(&self, text: &'a str) -> &'a str {
        let bytes = text.as_bytes();
        let mut end = 0;
        match *self {
            NumberShape::Digit { max } => {
                if bytes
                    .first()
                    .is_some_and(|b| b.is_ascii_digit() && b - b'0' <= max)
                {
                    end = 1;
                }
            }
            NumberShape::Integer | NumberShape::Decimal => {
                if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
                    end = 1;
                }
                end += count_digits(&bytes[end..]);
                if *self == NumberShape::Decimal && bytes.get(end) == Some(&b'.') {
                    end += 1;
                    end += count_digits(&bytes[end..]);
                }
            }
        }
        &text[..end]
    }
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Extract the number following `marker` on `line`, or `default`.
pub fn extract_value(line: &str, marker: &TagMarker, default: f64) -> f64 {
    marker.extract(line, default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_marker_returns_default() {
        assert_eq!(extract_value("G1 X10 Y10", &LAYER_HEIGHT, 7.0), 7.0);
        assert_eq!(extract_value("", &LAYER_INDEX, -1.0), -1.0);
    }

    #[test]
    fn test_layer_height_value() {
        assert_eq!(LAYER_HEIGHT.value(";Layer height: 0.2"), Some(0.2));
        assert_eq!(LAYER_HEIGHT.value(";Layer height: 0.12 mm"), Some(0.12));
        assert_eq!(LAYER_HEIGHT.value(";Layer height: -0.5"), Some(-0.5));
    }

    #[test]
    fn test_comment_before_marker_hides_value() {
        // An earlier `;` comments the marker out.
        assert_eq!(LAYER_HEIGHT.value("; old ;Layer height: 0.3"), None);
        assert_eq!(extract_value(";;Layer height: 0.3", &LAYER_HEIGHT, 0.0), 0.0);

        let speed = TagMarker::new("F");
        assert_eq!(speed.value("G1 X5 F1200"), Some(1200.0));
        assert_eq!(speed.value("G1 X5 ; F1200"), None);
    }

    #[test]
    fn test_whitelisted_markers_ignore_comments() {
        assert_eq!(LAYER_INDEX.value("; note ;LAYER:12"), Some(12.0));
        assert_eq!(CHANGE_AT_Z.value("; x ;ChangeAtZ3 started"), Some(3.0));
    }

    #[test]
    fn test_layer_index_shape() {
        assert_eq!(LAYER_INDEX.value(";LAYER:0"), Some(0.0));
        assert_eq!(LAYER_INDEX.value(";LAYER:-3"), Some(-3.0));
        assert_eq!(LAYER_INDEX.value(";LAYER:+4"), Some(4.0));
        // Integers only: the fraction is not part of the literal.
        assert_eq!(LAYER_INDEX.value(";LAYER:5.9"), Some(5.0));
    }

    #[test]
    fn test_unparseable_returns_default() {
        assert_eq!(LAYER_INDEX.value(";LAYER:"), None);
        assert_eq!(LAYER_INDEX.value(";LAYER:abc"), None);
        assert_eq!(LAYER_INDEX.value(";LAYER:-"), None);
        assert_eq!(extract_value(";Layer height: .", &LAYER_HEIGHT, 0.1), 0.1);
        assert_eq!(extract_value(";LAYER:x", &LAYER_INDEX, 9.0), 9.0);
    }

    #[test]
    fn test_decimal_edge_forms() {
        assert_eq!(LAYER_HEIGHT.value(";Layer height: .25"), Some(0.25));
        assert_eq!(LAYER_HEIGHT.value(";Layer height: 3."), Some(3.0));
        assert_eq!(LAYER_HEIGHT.value(";Layer height: 1.2.3"), Some(1.2));
    }

    #[test]
    fn test_change_at_z_digit_range() {
        assert_eq!(CHANGE_AT_Z.value(";ChangeAtZ4"), Some(4.0));
        assert_eq!(CHANGE_AT_Z.value(";ChangeAtZ5"), None);
        assert_eq!(CHANGE_AT_Z.value(";ChangeAtZ-1"), None);
    }

    #[test]
    fn test_is_present() {
        assert!(LAYER_INDEX.is_present(";LAYER:3"));
        assert!(!LAYER_INDEX.is_present(";LAYER_COUNT:3"));
    }
}
