use crate::emotion::domain::emotion_scores::EmotionScores;
use crate::shared::frame::Frame;

/// Scores the expression of a single, already-cropped face.
pub trait EmotionClassifier: Send {
    fn classify(&mut self, face: &Frame) -> Result<EmotionScores, Box<dyn std::error::Error>>;
}
