use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use moodmirror_core::camera::infrastructure::nokhwa_frame_source::{
    CaptureConfig, NokhwaFrameSource,
};
use moodmirror_core::emotion::domain::emotion_detector::EmotionDetector;
use moodmirror_core::emotion::infrastructure::detector_factory::{create_detector, ModelPaths};
use moodmirror_core::pipeline::inference_loop::{InferenceLoop, LoopConfig};
use moodmirror_core::pipeline::infrastructure::threaded_loop_runner::LoopRunner;
use moodmirror_core::pipeline::pipeline_logger::NullPipelineLogger;
use moodmirror_core::pipeline::presenter::Presenter;

use crate::settings::Settings;
use crate::workers::model_cache::ModelCache;

pub struct CameraParams {
    pub device_index: u32,
    pub tick_period: Duration,
    pub confidence: f64,
    pub failure_threshold: usize,
}

impl CameraParams {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            device_index: settings.camera_index,
            tick_period: settings.tick_period(),
            confidence: settings.confidence_fraction(),
            failure_threshold: settings.failure_threshold.max(1) as usize,
        }
    }
}

/// A running camera pipeline plus the flag that aborts a pending model wait.
pub struct CameraWorker {
    pub runner: LoopRunner,
    cancelled: Arc<AtomicBool>,
}

impl CameraWorker {
    /// Spawns the inference loop. Models are awaited and the detector is
    /// built on the loop's own thread; failures arrive as `BuildFailed`.
    ///
    /// `predecessor` is the teardown of a retired worker. It is joined on the
    /// loop thread before the camera is opened so the device is free.
    pub fn spawn(
        params: CameraParams,
        models: Arc<ModelCache>,
        predecessor: Option<JoinHandle<()>>,
    ) -> Result<Self, String> {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();

        let runner = LoopRunner::spawn(params.tick_period, move |mut presenter| {
            await_teardown(predecessor);
            build_loop(&params, &models, &flag, presenter.as_mut()).map(|(source, detector)| {
                InferenceLoop::new(
                    Box::new(source),
                    detector,
                    presenter,
                    Box::new(NullPipelineLogger),
                    LoopConfig {
                        device_index: params.device_index,
                        failure_threshold: params.failure_threshold,
                    },
                )
            })
        })
        .map_err(|e| e.to_string())?;

        Ok(Self { runner, cancelled })
    }

    pub fn shutdown(&mut self) {
        self.cancelled.store(true, Ordering::Relaxed);
        self.runner.shutdown();
    }

    /// Shuts the worker down on a background thread so the caller never waits
    /// for the camera to close.
    pub fn retire(self) -> JoinHandle<()> {
        self.cancelled.store(true, Ordering::Relaxed);
        teardown_in_background(self)
    }
}

fn teardown_in_background<T: Send + 'static>(worker: T) -> JoinHandle<()> {
    thread::spawn(move || drop(worker))
}

fn await_teardown(teardown: Option<JoinHandle<()>>) {
    if let Some(handle) = teardown {
        if handle.join().is_err() {
            log::warn!("Previous camera worker panicked during teardown");
        }
    }
}

impl Drop for CameraWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

type LoopParts = (NokhwaFrameSource, Box<dyn EmotionDetector>);

fn build_loop(
    params: &CameraParams,
    models: &ModelCache,
    cancelled: &AtomicBool,
    presenter: &mut dyn Presenter,
) -> Result<LoopParts, String> {
    let mut report = |downloaded: u64, total: u64| {
        let pct = downloaded as f64 / total as f64 * 100.0;
        presenter.show_status(&format!("Downloading models... {pct:.0}%"));
    };
    let face = models.wait_for_face(&mut report, cancelled)?;
    let emotion = models.wait_for_emotion(&mut report, cancelled)?;

    let detector = create_detector(&ModelPaths { face, emotion }, params.confidence)
        .map_err(|e| format!("Failed to load models: {e}"))?;

    let capture = CaptureConfig {
        read_timeout: params.tick_period,
        ..CaptureConfig::default()
    };
    Ok((NokhwaFrameSource::new(capture), detector))
}
