use crate::foundation::core::Frame;

/// Default extension of rendered frames.
pub const DEFAULT_EXT: &str = ".png";

/// Zero-padding width for frame numbers: `max(4, digits(range_end))`.
pub fn frame_padding(range_end: Frame) -> usize {
    range_end.to_string().len().max(4)
}

/// Deterministic `{prefix}{frame:0W}{ext}` filename template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameNameTemplate {
    prefix: String,
    padding: usize,
    ext: String,
}

impl FrameNameTemplate {
    /// Template for a sequence ending at `range_end`.
    ///
    /// `prefix` defaults to empty and `ext` to [`DEFAULT_EXT`].
    pub fn new(range_end: Frame, prefix: Option<&str>, ext: Option<&str>) -> Self {
        Self {
            prefix: prefix.unwrap_or_default().to_string(),
            padding: frame_padding(range_end),
            ext: ext.unwrap_or(DEFAULT_EXT).to_string(),
        }
    }

    /// Per-layer template `{prefix}pos_{position}.{frame:0W}{ext}`.
    pub fn for_layer(
        range_end: Frame,
        position: i64,
        prefix: Option<&str>,
        ext: Option<&str>,
    ) -> Self {
        let prefix = format!("{}pos_{position}.", prefix.unwrap_or_default());
        Self::new(range_end, Some(&prefix), ext)
    }

    /// Filename for `frame`.
    pub fn format(&self, frame: Frame) -> String {
        format!(
            "{}{:0width$}{}",
            self.prefix,
            frame,
            self.ext,
            width = self.padding
        )
    }

    /// Zero-padding width in use.
    pub fn padding(&self) -> usize {
        self.padding
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plan/template.rs"]
mod tests;
