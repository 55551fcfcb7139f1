use crate::foundation::core::Frame;
use crate::resolve::RawReferences;
use crate::scene::layer::Behavior;

/// Layer timing needed to extrapolate frames outside the active range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillContext {
    /// First active frame of the layer.
    pub layer_start: Frame,
    /// Active length `N = frame_end - frame_start + 1`.
    pub frame_count: i64,
    /// Exposure nearest to the filled span; the `hold` source.
    pub anchor: Frame,
}

/// Source frame shown at `frame` under `mode`, or `None` when the layer is transparent there.
pub fn behavior_frame(mode: Behavior, ctx: FillContext, frame: Frame) -> Option<Frame> {
    match mode {
        Behavior::None => None,
        Behavior::Hold => Some(ctx.anchor),
        Behavior::Repeat => {
            let n = ctx.frame_count.max(1);
            Some(ctx.layer_start + (frame - ctx.layer_start).rem_euclid(n))
        }
        Behavior::Pingpong => {
            let half_period = ctx.frame_count - 1;
            // A one-frame layer has nothing to bounce over.
            if half_period <= 0 {
                return Some(ctx.anchor);
            }
            let diff = (frame - ctx.layer_start).abs();
            let half_periods = diff / half_period;
            let direction = if half_periods % 2 == 1 { -1 } else { 1 };
            Some(
                ctx.layer_start
                    + half_period * (half_periods % 2)
                    + (diff % half_period) * direction,
            )
        }
    }
}

/// Write `mode` into `out` for every frame of `[start, end]`. Empty when `start > end`.
pub(crate) fn fill_behavior(
    mode: Behavior,
    ctx: FillContext,
    start: Frame,
    end: Frame,
    out: &mut RawReferences,
) {
    for frame in start..=end {
        out.insert(frame, behavior_frame(mode, ctx, frame));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/fill.rs"]
mod tests;
