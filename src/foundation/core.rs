use std::ops::RangeInclusive;

use crate::foundation::error::{CelError, CelResult};

/// Frame index on the host timeline.
///
/// Frames are signed: pre-behavior extrapolation may reach before frame `0`.
pub type Frame = i64;

/// Opaque layer identifier as reported by the host application.
pub type LayerId = String;

/// Inclusive frame span `[start, end]` in timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameSpan {
    /// First frame (inclusive).
    pub start: Frame,
    /// Last frame (inclusive).
    pub end: Frame,
}

impl FrameSpan {
    /// Create a validated span with `start <= end`.
    pub fn new(start: Frame, end: Frame) -> CelResult<Self> {
        if start > end {
            return Err(CelError::validation(format!(
                "frame span start ({start}) must be <= end ({end})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Number of frames contained in the span.
    pub fn len_frames(self) -> u64 {
        (self.end - self.start).unsigned_abs() + 1
    }

    /// Return `true` when `f` is inside `[start, end]`.
    pub fn contains(self, f: Frame) -> bool {
        self.start <= f && f <= self.end
    }

    /// Iterate every frame of the span in ascending order.
    pub fn frames(self) -> RangeInclusive<Frame> {
        self.start..=self.end
    }

    /// Shift both bounds by `delta` frames.
    pub fn shift(self, delta: i64) -> Self {
        Self {
            start: self.start.saturating_add(delta),
            end: self.end.saturating_add(delta),
        }
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
