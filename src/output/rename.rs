use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::foundation::core::{Frame, FrameSpan};
use crate::foundation::error::{CelError, CelResult};
use crate::plan::template::FrameNameTemplate;

/// Renumber a finished frame sequence so that `range.start` becomes `new_start`.
///
/// Files stay in their directory and are renamed to `{prefix}{frame:0W}{ext}` with `W` taken
/// from the larger of the old and new last frame. Frames are processed in the order that
/// never overwrites a not-yet-renamed file. A destination held by a file outside the sequence
/// is reported before anything is renamed.
#[tracing::instrument(skip(files), fields(files = files.len()))]
pub fn rename_by_frame_start(
    files: &BTreeMap<Frame, PathBuf>,
    range: FrameSpan,
    new_start: Frame,
    prefix: Option<&str>,
    ext: Option<&str>,
) -> CelResult<BTreeMap<Frame, PathBuf>> {
    let offset = new_start - range.start;
    let new_end = range.end + offset;
    let template = FrameNameTemplate::new(range.end.max(new_end), prefix, ext);

    let source_frames: Vec<Frame> = if range.start < new_start {
        range.frames().rev().collect()
    } else {
        range.frames().collect()
    };

    let moves: Vec<(Frame, &Path, PathBuf)> = source_frames
        .into_iter()
        .filter_map(|frame| files.get(&frame).map(|src| (frame, src.as_path())))
        .map(|(frame, src)| {
            let dst_frame = frame + offset;
            let dst = src
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(template.format(dst_frame));
            (dst_frame, src, dst)
        })
        .collect();

    let sources: BTreeSet<&Path> = files.values().map(PathBuf::as_path).collect();
    for (_, src, dst) in &moves {
        if dst.as_path() != *src && dst.exists() && !sources.contains(dst.as_path()) {
            return Err(CelError::RenameCollision {
                src: src.to_path_buf(),
                dst: dst.clone(),
            });
        }
    }

    let mut out = BTreeMap::new();
    let mut renamed = 0usize;
    for (dst_frame, src, dst) in moves {
        if src.file_name() != dst.file_name() {
            std::fs::rename(src, &dst).map_err(|e| CelError::io(src, e))?;
            renamed += 1;
        }
        out.insert(dst_frame, dst);
    }
    tracing::info!(renamed, new_start, new_end, "renumbered output frames");
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/output/rename.rs"]
mod tests;
