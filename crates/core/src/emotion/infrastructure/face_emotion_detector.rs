use crate::emotion::domain::emotion_classifier::EmotionClassifier;
use crate::emotion::domain::emotion_detector::{EmotionDetector, FaceEmotion};
use crate::emotion::domain::face_locator::FaceLocator;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Two-stage detector: locate faces, then classify each crop.
///
/// Output order follows the locator's order.
pub struct FaceEmotionDetector<L: FaceLocator, C: EmotionClassifier> {
    locator: L,
    classifier: C,
}

impl<L: FaceLocator, C: EmotionClassifier> FaceEmotionDetector<L, C> {
    pub fn new(locator: L, classifier: C) -> Self {
        Self {
            locator,
            classifier,
        }
    }
}

impl<L: FaceLocator, C: EmotionClassifier> EmotionDetector for FaceEmotionDetector<L, C> {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceEmotion>, Box<dyn std::error::Error>> {
        let boxes = self.locator.locate(frame)?;
        let mut results = Vec::with_capacity(boxes.len());
        for face_box in boxes {
            let Some(crop) = frame.crop(&face_box) else {
                log::debug!("Skipping face outside frame: {face_box:?}");
                continue;
            };
            let scores = self.classifier.classify(&crop)?;
            results.push(FaceEmotion {
                face_box: crop_box(&face_box, frame),
                scores,
            });
        }
        Ok(results)
    }
}

/// The box actually cropped, i.e. clamped to the frame.
fn crop_box(face_box: &FaceBox, frame: &Frame) -> FaceBox {
    face_box
        .clamp_to(frame.width(), frame.height())
        .unwrap_or(*face_box)
}
