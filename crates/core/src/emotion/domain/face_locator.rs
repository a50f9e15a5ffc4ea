use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Finds face rectangles in a frame.
///
/// Implementations may be stateful, hence `&mut self`.
pub trait FaceLocator: Send {
    fn locate(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>>;
}
