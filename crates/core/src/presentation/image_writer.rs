use std::path::{Path, PathBuf};

use crate::emotion::domain::frame_annotation::FrameAnnotation;
use crate::presentation::overlay::annotate_frame;
use crate::shared::frame::Frame;

/// Writes a single frame to an image file.
pub trait ImageWriter: Send {
    /// The format is chosen from the path's extension.
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;
}

/// File name for a snapshot, e.g. `snapshot_000042_happy.png`.
pub fn snapshot_file_name(frame: &Frame, annotation: &FrameAnnotation) -> String {
    let label = annotation
        .dominant_emotion()
        .map_or("noface", |emotion| emotion.name());
    format!("snapshot_{:06}_{label}.png", frame.index())
}

/// Draws the annotation onto a copy of `frame` and saves it under `dir`.
///
/// Returns the path written.
pub fn save_snapshot(
    writer: &dyn ImageWriter,
    dir: &Path,
    frame: &Frame,
    annotation: &FrameAnnotation,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = dir.join(snapshot_file_name(frame, annotation));
    writer.write(&path, &annotate_frame(frame, annotation))?;
    Ok(path)
}
