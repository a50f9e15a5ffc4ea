use std::time::Duration;

use crate::shared::model_resolver::ModelSpec;

pub const FACE_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const FACE_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const EMOTION_MODEL_NAME: &str = "emotion-ferplus-8.onnx";
pub const EMOTION_MODEL_URL: &str =
    "https://github.com/onnx/models/raw/main/validated/vision/body_analysis/emotion_ferplus/model/emotion-ferplus-8.onnx";

pub const FACE_MODEL: ModelSpec = ModelSpec {
    name: FACE_MODEL_NAME,
    url: FACE_MODEL_URL,
};

pub const EMOTION_MODEL: ModelSpec = ModelSpec {
    name: EMOTION_MODEL_NAME,
    url: EMOTION_MODEL_URL,
};

pub const DEFAULT_DEVICE_INDEX: u32 = 0;

/// Tick period of the inference loop (20 ticks per second).
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(50);

/// Max time a single frame grab may block before the tick is skipped.
pub const DEFAULT_READ_TIMEOUT: Duration = DEFAULT_TICK_PERIOD;

/// Max time to wait for the OS to hand over the camera.
pub const DEFAULT_OPEN_TIMEOUT: Duration = Duration::from_secs(5);

/// Consecutive skipped ticks before the user is told (~1.5 s at 50 ms).
pub const DEFAULT_FAILURE_THRESHOLD: usize = 30;

/// Face detection confidence threshold.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Faces smaller than this (in either dimension) are ignored.
pub const MIN_FACE_SIZE: i32 = 30;

pub const DETECTING_LABEL: &str = "Detecting...";
pub const CAMERA_UNAVAILABLE_MESSAGE: &str = "Error: Camera not accessible";
pub const READ_FAILED_MESSAGE: &str = "Error: Could not read frame";
