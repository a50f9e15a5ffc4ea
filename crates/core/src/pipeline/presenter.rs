use crate::emotion::domain::frame_annotation::FrameAnnotation;
use crate::shared::frame::Frame;

/// Display side of the inference loop.
///
/// Receives one `(frame, annotation)` pair per rendered tick. Frames are
/// handed over by value and not retained by the loop.
pub trait Presenter: Send {
    fn render(&mut self, frame: Frame, annotation: FrameAnnotation);

    /// Show a user-facing status or error message.
    fn show_status(&mut self, message: &str);

    /// Blank the video surface after the camera stops.
    fn clear(&mut self);
}
