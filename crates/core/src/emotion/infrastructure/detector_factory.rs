use std::path::PathBuf;

use crate::emotion::domain::emotion_detector::EmotionDetector;

use super::face_emotion_detector::FaceEmotionDetector;
use super::onnx_emotion_classifier::OnnxEmotionClassifier;
use super::onnx_face_locator::OnnxFaceLocator;

/// Resolved on-disk locations of the two models the detector needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelPaths {
    pub face: PathBuf,
    pub emotion: PathBuf,
}

/// Loads both ONNX models and wires them into a two-stage detector.
pub fn create_detector(
    models: &ModelPaths,
    confidence: f64,
) -> Result<Box<dyn EmotionDetector>, Box<dyn std::error::Error>> {
    log::info!(
        "Loading models: {} + {}",
        models.face.display(),
        models.emotion.display()
    );
    let locator = OnnxFaceLocator::new(&models.face, confidence)?;
    let classifier = OnnxEmotionClassifier::new(&models.emotion)?;
    Ok(Box::new(FaceEmotionDetector::new(locator, classifier)))
}
