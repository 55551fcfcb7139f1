use std::path::Path;

use crate::foundation::core::Frame;

/// Host collaborator that renders one layer at one frame into an image file.
///
/// Implementations must write a complete image to `dst` before returning `Ok`. The
/// pipeline never calls two renders for the same `dst` concurrently.
pub trait FrameRenderer {
    /// Render `layer_id` at `frame` to `dst`.
    fn render_frame(&self, layer_id: &str, frame: Frame, dst: &Path) -> anyhow::Result<()>;
}

impl<F> FrameRenderer for F
where
    F: Fn(&str, Frame, &Path) -> anyhow::Result<()>,
{
    fn render_frame(&self, layer_id: &str, frame: Frame, dst: &Path) -> anyhow::Result<()> {
        self(layer_id, frame, dst)
    }
}
