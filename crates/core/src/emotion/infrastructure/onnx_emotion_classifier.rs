/// FER+ emotion classifier using ONNX Runtime via `ort`.
///
/// Input is a single 64x64 grayscale face with raw 0-255 intensities.
/// Output is 8 logits in FER+ order, softmaxed and mapped onto [`Emotion`].
use std::path::Path;

use image::imageops::FilterType;
use image::GrayImage;

use crate::emotion::domain::emotion::Emotion;
use crate::emotion::domain::emotion_classifier::EmotionClassifier;
use crate::emotion::domain::emotion_scores::EmotionScores;
use crate::shared::frame::Frame;

use super::execution_provider::load_session;
use super::math::{luma, softmax};

const INPUT_SIZE: u32 = 64;

/// FER+ output order. `None` marks classes without a canonical emotion.
const FERPLUS_CLASSES: [Option<Emotion>; 8] = [
    Some(Emotion::Neutral),
    Some(Emotion::Happy),
    Some(Emotion::Surprise),
    Some(Emotion::Sad),
    Some(Emotion::Angry),
    Some(Emotion::Disgust),
    Some(Emotion::Fear),
    None, // contempt
];

pub struct OnnxEmotionClassifier {
    session: ort::session::Session,
}

impl OnnxEmotionClassifier {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = load_session(model_path)?;
        log::info!("Emotion model loaded ({INPUT_SIZE}x{INPUT_SIZE} grayscale)");
        Ok(Self { session })
    }
}

impl EmotionClassifier for OnnxEmotionClassifier {
    fn classify(&mut self, face: &Frame) -> Result<EmotionScores, Box<dyn std::error::Error>> {
        let input = preprocess(face)?;
        let input_value = ort::value::Tensor::from_array(input)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("Emotion model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let logits: Vec<f32> = tensor.iter().copied().collect();
        scores_from_logits(&logits)
    }
}

/// Grayscale, resize to 64x64 and lay out as `[1, 1, 64, 64]`.
fn preprocess(face: &Frame) -> Result<ndarray::Array4<f32>, Box<dyn std::error::Error>> {
    if face.width() == 0 || face.height() == 0 {
        return Err("Cannot classify an empty face crop".into());
    }
    let gray = to_gray(face);
    let resized = image::imageops::resize(&gray, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);

    let size = INPUT_SIZE as usize;
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 1, size, size));
    for (x, y, pixel) in resized.enumerate_pixels() {
        tensor[[0, 0, y as usize, x as usize]] = pixel.0[0] as f32;
    }
    Ok(tensor)
}

fn to_gray(frame: &Frame) -> GrayImage {
    let arr = frame.as_ndarray();
    let channels = frame.channels() as usize;
    GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        let (x, y) = (x as usize, y as usize);
        let value = if channels >= 3 {
            luma(arr[[y, x, 0]], arr[[y, x, 1]], arr[[y, x, 2]])
        } else {
            arr[[y, x, 0]] as f32
        };
        image::Luma([value.round().clamp(0.0, 255.0) as u8])
    })
}

/// Softmax over all FER+ classes, then keep the seven canonical ones.
fn scores_from_logits(logits: &[f32]) -> Result<EmotionScores, Box<dyn std::error::Error>> {
    if logits.len() != FERPLUS_CLASSES.len() {
        return Err(format!(
            "Expected {} emotion logits, got {}",
            FERPLUS_CLASSES.len(),
            logits.len()
        )
        .into());
    }
    let probs = softmax(logits);
    let mut values = [0.0f32; 7];
    for (class, prob) in FERPLUS_CLASSES.iter().zip(probs) {
        if let Some(emotion) = class {
            values[emotion.index()] = prob;
        }
    }
    Ok(EmotionScores::from_array(values))
}
