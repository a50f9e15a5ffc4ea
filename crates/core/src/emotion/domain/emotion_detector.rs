use crate::emotion::domain::emotion_scores::EmotionScores;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// One detected face and its per-emotion confidences.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceEmotion {
    pub face_box: FaceBox,
    pub scores: EmotionScores,
}

/// Domain interface for facial emotion recognition.
///
/// Returns every face found in `frame`, in the detector's own order. An
/// empty vector means no face, which is not an error. Latency may vary
/// widely between calls.
pub trait EmotionDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceEmotion>, Box<dyn std::error::Error>>;
}
