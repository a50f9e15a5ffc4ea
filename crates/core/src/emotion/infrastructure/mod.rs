pub mod detector_factory;
pub mod execution_provider;
pub mod face_emotion_detector;
pub mod math;
pub mod onnx_emotion_classifier;
pub mod onnx_face_locator;
