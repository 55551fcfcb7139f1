use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::foundation::core::Frame;
use crate::foundation::error::{CelError, CelResult};
use crate::plan::extraction::LayerPlan;
use crate::render::layer::LayerFiles;
use crate::render::link::link_or_copy;

/// Give every unmapped frame of `frames` a file, so the layer sequence has no holes.
///
/// A frame mapped to `None` stays transparent. A frame with no entry gets the most recent
/// preceding file, or the first file of the sequence when the gap is at its head. New files
/// are placed under `out_dir` with the plan's filename for that frame.
///
/// Returns the number of frames filled.
#[tracing::instrument(skip(files, plan, out_dir, frames), fields(frames = frames.len()))]
pub fn fill_sequence_gaps(
    files: &mut LayerFiles,
    plan: &LayerPlan,
    out_dir: &Path,
    frames: &BTreeSet<Frame>,
) -> CelResult<usize> {
    let Some(first_file) = frames
        .iter()
        .find_map(|frame| files.get(frame).cloned().flatten())
    else {
        return Ok(0);
    };

    let mut previous: Option<PathBuf> = None;
    let mut filled = 0;
    for &frame in frames {
        match files.get(&frame) {
            Some(Some(path)) => previous = Some(path.clone()),
            Some(None) => {}
            None => {
                let src = previous.as_ref().unwrap_or(&first_file);
                if !src.is_file() {
                    return Err(CelError::io(
                        src,
                        std::io::Error::new(
                            std::io::ErrorKind::NotFound,
                            "gap source file is missing",
                        ),
                    ));
                }
                let name = plan.filename(frame).ok_or_else(|| {
                    CelError::validation(format!("no filename bound for gap frame {frame}"))
                })?;
                let dst = out_dir.join(name);
                link_or_copy(src, &dst)?;
                tracing::debug!(frame, src = %src.display(), "filled sequence gap");
                files.insert(frame, Some(dst));
                filled += 1;
            }
        }
    }
    Ok(filled)
}

#[cfg(test)]
#[path = "../../tests/unit/render/gaps.rs"]
mod tests;
