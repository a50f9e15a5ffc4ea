use crate::emotion::domain::emotion::Emotion;
use crate::emotion::domain::emotion_detector::FaceEmotion;
use crate::emotion::domain::emotion_scores::EmotionScores;
use crate::shared::constants::DETECTING_LABEL;
use crate::shared::face_box::FaceBox;

/// Per-tick inference result handed to the presenter alongside the frame.
///
/// Either all fields are set (a face was found) or none are. The only
/// constructors are `empty` and the `from_detection*` pair.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameAnnotation {
    face_box: Option<FaceBox>,
    scores: Option<EmotionScores>,
    dominant_emotion: Option<Emotion>,
}

impl FrameAnnotation {
    /// The "no face this tick" annotation.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Annotates using the first detection only, in detector order.
    pub fn from_detections(detections: &[FaceEmotion]) -> Self {
        detections
            .first()
            .map(Self::from_detection)
            .unwrap_or_default()
    }

    pub fn from_detection(detection: &FaceEmotion) -> Self {
        let (dominant, _) = detection.scores.dominant();
        Self {
            face_box: Some(detection.face_box),
            scores: Some(detection.scores),
            dominant_emotion: Some(dominant),
        }
    }

    pub fn face_box(&self) -> Option<FaceBox> {
        self.face_box
    }

    pub fn scores(&self) -> Option<EmotionScores> {
        self.scores
    }

    pub fn dominant_emotion(&self) -> Option<Emotion> {
        self.dominant_emotion
    }

    pub fn is_empty(&self) -> bool {
        self.face_box.is_none() && self.scores.is_none() && self.dominant_emotion.is_none()
    }

    /// Progress bar values in canonical order; all zero when no face was found.
    pub fn bar_values(&self) -> [(Emotion, u8); 7] {
        Emotion::ALL.map(|e| (e, self.scores.map_or(0, |s| s.percent(e))))
    }

    /// Confidence of the dominant emotion, if any.
    pub fn dominant_score(&self) -> Option<f32> {
        Some(self.scores?.get(self.dominant_emotion?))
    }

    /// Status line, e.g. `"Emotion: Happy - 90.00%"` or `"Emotion: Detecting..."`.
    pub fn headline(&self) -> String {
        match (self.dominant_emotion, self.dominant_score()) {
            (Some(emotion), Some(score)) => {
                format!("Emotion: {emotion} - {:.2}%", score * 100.0)
            }
            _ => format!("Emotion: {DETECTING_LABEL}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn happy_detection() -> FaceEmotion {
        FaceEmotion {
            face_box: FaceBox::new(10, 20, 30, 40),
            scores: EmotionScores::from_array([0.0, 0.0, 0.0, 0.9, 0.1, 0.0, 0.0]),
        }
    }

    #[test]
    fn test_empty_has_all_fields_absent() {
        let annotation = FrameAnnotation::empty();
        assert!(annotation.is_empty());
        assert_eq!(annotation.face_box(), None);
        assert_eq!(annotation.scores(), None);
        assert_eq!(annotation.dominant_emotion(), None);
    }

    #[test]
    fn test_from_no_detections_is_empty() {
        assert!(FrameAnnotation::from_detections(&[]).is_empty());
    }

    #[test]
    fn test_from_detection_passes_box_through() {
        let annotation = FrameAnnotation::from_detection(&happy_detection());
        assert_eq!(annotation.face_box(), Some(FaceBox::new(10, 20, 30, 40)));
        assert_eq!(annotation.dominant_emotion(), Some(Emotion::Happy));
    }

    #[test]
    fn test_detection_sets_every_field() {
        let detection = happy_detection();
        let annotation = FrameAnnotation::from_detection(&detection);
        assert!(!annotation.is_empty());
        assert_eq!(annotation.scores(), Some(detection.scores));
        assert!(annotation.face_box().is_some());
        assert!(annotation.dominant_emotion().is_some());
    }

    #[test]
    fn test_uses_first_detection_only() {
        let second = FaceEmotion {
            face_box: FaceBox::new(200, 200, 80, 80),
            scores: EmotionScores::only(Emotion::Angry, 1.0),
        };
        let annotation = FrameAnnotation::from_detections(&[happy_detection(), second]);
        assert_eq!(annotation.face_box(), Some(FaceBox::new(10, 20, 30, 40)));
        assert_eq!(annotation.dominant_emotion(), Some(Emotion::Happy));
    }

    #[test]
    fn test_bar_values() {
        let annotation = FrameAnnotation::from_detection(&happy_detection());
        let bars = annotation.bar_values();
        assert_eq!(bars[Emotion::Happy.index()], (Emotion::Happy, 90));
        assert_eq!(bars[Emotion::Sad.index()], (Emotion::Sad, 10));
        assert_eq!(bars[Emotion::Angry.index()], (Emotion::Angry, 0));
    }

    #[test]
    fn test_bar_values_empty_are_zero() {
        let bars = FrameAnnotation::empty().bar_values();
        assert!(bars.iter().all(|&(_, pct)| pct == 0));
    }

    #[test]
    fn test_headline_with_face() {
        let annotation = FrameAnnotation::from_detection(&happy_detection());
        assert_eq!(annotation.headline(), "Emotion: Happy - 90.00%");
    }

    #[test]
    fn test_headline_without_face() {
        assert_eq!(FrameAnnotation::empty().headline(), "Emotion: Detecting...");
    }
}
