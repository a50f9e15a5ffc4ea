use super::emotion::Emotion;

/// Per-emotion confidences, one field per member of [`Emotion::ALL`].
///
/// Every value lies in `[0, 1]`; the values are independent confidences and
/// need not sum to 1. Fields are private so every value goes through the
/// clamping constructors.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EmotionScores {
    angry: f32,
    disgust: f32,
    fear: f32,
    happy: f32,
    sad: f32,
    surprise: f32,
    neutral: f32,
}

impl EmotionScores {
    /// Builds scores from values in canonical order, clamping each into `[0, 1]`.
    pub fn from_array(values: [f32; 7]) -> Self {
        let [angry, disgust, fear, happy, sad, surprise, neutral] = values.map(sanitize);
        Self {
            angry,
            disgust,
            fear,
            happy,
            sad,
            surprise,
            neutral,
        }
    }

    pub fn from_fn(mut f: impl FnMut(Emotion) -> f32) -> Self {
        Self::from_array(Emotion::ALL.map(&mut f))
    }

    /// All zero except `emotion`.
    pub fn only(emotion: Emotion, score: f32) -> Self {
        Self::from_fn(|e| if e == emotion { score } else { 0.0 })
    }

    pub fn get(&self, emotion: Emotion) -> f32 {
        match emotion {
            Emotion::Angry => self.angry,
            Emotion::Disgust => self.disgust,
            Emotion::Fear => self.fear,
            Emotion::Happy => self.happy,
            Emotion::Sad => self.sad,
            Emotion::Surprise => self.surprise,
            Emotion::Neutral => self.neutral,
        }
    }

    pub fn to_array(&self) -> [f32; 7] {
        Emotion::ALL.map(|e| self.get(e))
    }

    /// `(emotion, score)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f32)> + '_ {
        Emotion::ALL.into_iter().map(move |e| (e, self.get(e)))
    }

    /// Emotion with the highest score.
    ///
    /// Ties go to the emotion that comes first in canonical order.
    pub fn dominant(&self) -> (Emotion, f32) {
        let mut best = (Emotion::ALL[0], self.get(Emotion::ALL[0]));
        for (emotion, score) in self.iter().skip(1) {
            if score > best.1 {
                best = (emotion, score);
            }
        }
        best
    }

    /// Score as a whole percentage, `round(score * 100)`.
    pub fn percent(&self, emotion: Emotion) -> u8 {
        (self.get(emotion) * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
