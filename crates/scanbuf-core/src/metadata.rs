//! Per-frame sidecar data.

/// Container text written for an empty frame tag.
pub const UNDEFINED_TAG: &str = "not defined";

/// Metadata carried alongside one frame of a [`PixelBuffer`](crate::PixelBuffer).
///
/// None of this lives in pixel memory; it is copied by every conversion and
/// round-tripped through the container format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameMetadata {
    /// Free-text tag. Empty means "not defined".
    pub tag: String,
    /// Capture position within a larger composite, `(-1, -1)` when unset.
    pub anchor: (i32, i32),
    /// Sub-second capture offset.
    pub elapsed: u32,
    /// XML side channel, raw bytes.
    pub xml: Vec<u8>,
    /// Parent or group name.
    pub parent_name: Option<String>,
}

impl Default for FrameMetadata {
    fn default() -> Self {
        Self {
            tag: String::new(),
            anchor: (-1, -1),
            elapsed: 0,
            xml: Vec::new(),
            parent_name: None,
        }
    }
}

impl FrameMetadata {
    /// Whether the anchor has been assigned.
    #[inline]
    pub fn has_anchor(&self) -> bool {
        self.anchor.0 >= 0 || self.anchor.1 >= 0
    }

    /// Tag text as written to a container.
    pub fn tag_or_default(&self) -> &str {
        if self.tag.is_empty() { UNDEFINED_TAG } else { &self.tag }
    }
}

/// Physical resolution in dots per inch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Horizontal dots per inch.
    pub x: f32,
    /// Vertical dots per inch.
    pub y: f32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self { x: 72.0, y: 72.0 }
    }
}

impl Resolution {
    /// Same density on both axes.
    pub const fn uniform(dpi: f32) -> Self {
        Self { x: dpi, y: dpi }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let meta = FrameMetadata::default();
        assert_eq!(meta.anchor, (-1, -1));
        assert!(!meta.has_anchor());
        assert_eq!(meta.tag_or_default(), UNDEFINED_TAG);
        assert_eq!(Resolution::default(), Resolution::uniform(72.0));
    }

    #[test]
    fn test_tag_passthrough() {
        let meta = FrameMetadata {
            tag: "left".into(),
            anchor: (0, 12),
            ..Default::default()
        };
        assert!(meta.has_anchor());
        assert_eq!(meta.tag_or_default(), "left");
    }
}
