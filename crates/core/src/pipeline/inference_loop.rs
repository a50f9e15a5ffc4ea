use std::time::Instant;

use crate::camera::domain::frame_source::{CameraError, CameraSession, FrameSource};
use crate::emotion::domain::emotion_detector::EmotionDetector;
use crate::emotion::domain::frame_annotation::FrameAnnotation;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::presenter::Presenter;
use crate::shared::constants::{
    CAMERA_UNAVAILABLE_MESSAGE, DEFAULT_DEVICE_INDEX, DEFAULT_FAILURE_THRESHOLD,
    READ_FAILED_MESSAGE,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopConfig {
    pub device_index: u32,
    /// Consecutive skipped ticks before the presenter is told.
    pub failure_threshold: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            device_index: DEFAULT_DEVICE_INDEX,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    ReadFailed,
    DetectorFailed,
}

/// What a single [`InferenceLoop::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No camera session; nothing was read.
    Idle,
    /// A frame was rendered; `faces` is how many the detector found.
    Rendered { faces: usize },
    Skipped(SkipReason),
}

enum LoopState {
    Idle,
    Running(CameraSession),
}

/// Camera → mirror → detect → annotate → present, one frame per tick.
///
/// Owns the camera session for as long as it is running. Ticks are driven
/// externally (see `TickScheduler` and `LoopRunner`), so only one tick can
/// be in flight. Dropping the loop stops it.
pub struct InferenceLoop {
    source: Box<dyn FrameSource>,
    detector: Box<dyn EmotionDetector>,
    presenter: Box<dyn Presenter>,
    logger: Box<dyn PipelineLogger>,
    config: LoopConfig,
    state: LoopState,
    consecutive_failures: usize,
    next_index: usize,
}

impl InferenceLoop {
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: Box<dyn EmotionDetector>,
        presenter: Box<dyn Presenter>,
        logger: Box<dyn PipelineLogger>,
        config: LoopConfig,
    ) -> Self {
        Self {
            source,
            detector,
            presenter,
            logger,
            config,
            state: LoopState::Idle,
            consecutive_failures: 0,
            next_index: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running(_))
    }

    pub fn session(&self) -> Option<&CameraSession> {
        match &self.state {
            LoopState::Running(session) => Some(session),
            LoopState::Idle => None,
        }
    }

    /// Opens the camera. No-op if already running.
    ///
    /// On failure the presenter is shown the unavailable message and the
    /// loop stays idle.
    pub fn start(&mut self) -> Result<(), CameraError> {
        if self.is_running() {
            return Ok(());
        }
        match self.source.open(self.config.device_index) {
            Ok(session) => {
                self.logger.info(&format!(
                    "Camera {} started ({}, {}x{})",
                    session.device_index, session.name, session.width, session.height
                ));
                self.consecutive_failures = 0;
                self.state = LoopState::Running(session);
                Ok(())
            }
            Err(e) => {
                log::warn!("Failed to start camera: {e}");
                self.presenter.show_status(CAMERA_UNAVAILABLE_MESSAGE);
                Err(e)
            }
        }
    }

    /// Closes the camera, clears the presenter and emits the session summary.
    /// No-op if idle.
    pub fn stop(&mut self) {
        let LoopState::Running(session) = std::mem::replace(&mut self.state, LoopState::Idle)
        else {
            return;
        };
        let device_index = session.device_index;
        self.source.close(session);
        self.presenter.clear();
        self.consecutive_failures = 0;
        self.logger.info(&format!("Camera {device_index} stopped"));
        self.logger.summary();
    }

    /// Runs one read → flip → detect → render cycle.
    ///
    /// Failures skip the tick; they never stop the loop.
    pub fn tick(&mut self) -> TickOutcome {
        let LoopState::Running(session) = &self.state else {
            return TickOutcome::Idle;
        };

        let t0 = Instant::now();
        let frame = match self.source.read(session) {
            Ok(frame) => frame,
            Err(e) => {
                log::debug!("Skipping tick: {e}");
                return self.skip(SkipReason::ReadFailed);
            }
        };
        let t1 = Instant::now();
        let mirrored = frame.flip_horizontal().with_index(self.next_index);
        self.next_index += 1;
        let t2 = Instant::now();
        let detections = match self.detector.detect(&mirrored) {
            Ok(detections) => detections,
            Err(e) => {
                log::warn!("Emotion detection failed: {e}");
                return self.skip(SkipReason::DetectorFailed);
            }
        };
        let t3 = Instant::now();

        let faces = detections.len();
        let annotation = FrameAnnotation::from_detections(&detections);
        self.presenter.render(mirrored, annotation);

        self.consecutive_failures = 0;
        self.logger.timing("read", ms(t1 - t0));
        self.logger.timing("flip", ms(t2 - t1));
        self.logger.timing("detect", ms(t3 - t2));
        self.logger.metric("faces", faces as f64);
        self.logger.tick(true);

        TickOutcome::Rendered { faces }
    }

    fn skip(&mut self, reason: SkipReason) -> TickOutcome {
        self.consecutive_failures += 1;
        self.logger.tick(false);
        if self.consecutive_failures == self.config.failure_threshold.max(1) {
            log::warn!(
                "{} consecutive ticks skipped (last: {reason:?})",
                self.consecutive_failures
            );
            self.presenter.show_status(READ_FAILED_MESSAGE);
        }
        TickOutcome::Skipped(reason)
    }
}

impl Drop for InferenceLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn ms(d: std::time::Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use crate::emotion::domain::emotion::Emotion;
    use crate::emotion::domain::emotion_detector::FaceEmotion;
    use crate::emotion::domain::emotion_scores::EmotionScores;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::face_box::FaceBox;
    use crate::shared::frame::Frame;

    /// Ordered record of every call the stubs see.
    type CallLog = Arc<Mutex<Vec<String>>>;

    fn calls(log: &CallLog) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    fn count(log: &CallLog, name: &str) -> usize {
        log.lock().unwrap().iter().filter(|c| *c == name).count()
    }

    /// 3x1 RGB frame whose red channel encodes the column.
    fn column_frame() -> Frame {
        Frame::new(vec![0, 9, 9, 1, 9, 9, 2, 9, 9], 3, 1, 3, 0)
    }

    struct StubSource {
        log: CallLog,
        open_error: Option<CameraError>,
        reads: VecDeque<Result<Frame, CameraError>>,
    }

    impl FrameSource for StubSource {
        fn open(&mut self, device_index: u32) -> Result<CameraSession, CameraError> {
            self.log.lock().unwrap().push("open".to_string());
            if let Some(e) = self.open_error.clone() {
                return Err(e);
            }
            Ok(CameraSession {
                device_index,
                width: 3,
                height: 1,
                name: "Stub".to_string(),
            })
        }

        fn read(&mut self, _session: &CameraSession) -> Result<Frame, CameraError> {
            self.log.lock().unwrap().push("read".to_string());
            self.reads.pop_front().unwrap_or_else(|| Ok(column_frame()))
        }

        fn close(&mut self, _session: CameraSession) {
            self.log.lock().unwrap().push("close".to_string());
        }
    }

    struct StubDetector {
        seen: Arc<Mutex<Vec<Frame>>>,
        result: Result<Vec<FaceEmotion>, String>,
    }

    impl EmotionDetector for StubDetector {
        fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceEmotion>, Box<dyn std::error::Error>> {
            self.seen.lock().unwrap().push(frame.clone());
            self.result.clone().map_err(|e| e.into())
        }
    }

    #[derive(Default)]
    struct Presented {
        renders: Vec<(Frame, FrameAnnotation)>,
        statuses: Vec<String>,
        clears: usize,
    }

    struct StubPresenter(Arc<Mutex<Presented>>);

    impl Presenter for StubPresenter {
        fn render(&mut self, frame: Frame, annotation: FrameAnnotation) {
            self.0.lock().unwrap().renders.push((frame, annotation));
        }

        fn show_status(&mut self, message: &str) {
            self.0.lock().unwrap().statuses.push(message.to_string());
        }

        fn clear(&mut self) {
            self.0.lock().unwrap().clears += 1;
        }
    }

    struct Harness {
        inference: InferenceLoop,
        log: CallLog,
        seen: Arc<Mutex<Vec<Frame>>>,
        presented: Arc<Mutex<Presented>>,
    }

    struct HarnessBuilder {
        open_error: Option<CameraError>,
        reads: Vec<Result<Frame, CameraError>>,
        detections: Result<Vec<FaceEmotion>, String>,
        failure_threshold: usize,
    }

    impl HarnessBuilder {
        fn new() -> Self {
            Self {
                open_error: None,
                reads: Vec::new(),
                detections: Ok(Vec::new()),
                failure_threshold: 3,
            }
        }

        fn open_error(mut self, e: CameraError) -> Self {
            self.open_error = Some(e);
            self
        }

        fn reads(mut self, reads: Vec<Result<Frame, CameraError>>) -> Self {
            self.reads = reads;
            self
        }

        fn detections(mut self, detections: Result<Vec<FaceEmotion>, String>) -> Self {
            self.detections = detections;
            self
        }

        fn build(self) -> Harness {
            let log = CallLog::default();
            let seen = Arc::new(Mutex::new(Vec::new()));
            let presented = Arc::new(Mutex::new(Presented::default()));
            let inference = InferenceLoop::new(
                Box::new(StubSource {
                    log: log.clone(),
                    open_error: self.open_error,
                    reads: self.reads.into(),
                }),
                Box::new(StubDetector {
                    seen: seen.clone(),
                    result: self.detections,
                }),
                Box::new(StubPresenter(presented.clone())),
                Box::new(NullPipelineLogger),
                LoopConfig {
                    device_index: 0,
                    failure_threshold: self.failure_threshold,
                },
            );
            Harness {
                inference,
                log,
                seen,
                presented,
            }
        }
    }

    fn read_failed() -> Result<Frame, CameraError> {
        Err(CameraError::ReadFailed("unplugged".to_string()))
    }

    fn happy_face() -> FaceEmotion {
        FaceEmotion {
            face_box: FaceBox::new(10, 20, 30, 40),
            scores: EmotionScores::from_array([0.0, 0.0, 0.0, 0.9, 0.1, 0.0, 0.0]),
        }
    }

    #[test]
    fn test_no_faces_yields_empty_annotations() {
        let mut h = HarnessBuilder::new().build();
        h.inference.start().unwrap();
        for _ in 0..5 {
            assert_eq!(h.inference.tick(), TickOutcome::Rendered { faces: 0 });
        }
        let presented = h.presented.lock().unwrap();
        assert_eq!(presented.renders.len(), 5);
        assert!(presented.renders.iter().all(|(_, a)| a.is_empty()));
    }

    #[test]
    fn test_happy_face_annotation() {
        let mut h = HarnessBuilder::new()
            .detections(Ok(vec![happy_face()]))
            .build();
        h.inference.start().unwrap();
        assert_eq!(h.inference.tick(), TickOutcome::Rendered { faces: 1 });

        let presented = h.presented.lock().unwrap();
        let (_, annotation) = &presented.renders[0];
        assert_eq!(annotation.dominant_emotion(), Some(Emotion::Happy));
        assert_eq!(annotation.bar_values()[Emotion::Happy.index()].1, 90);
        assert_eq!(annotation.face_box(), Some(FaceBox::new(10, 20, 30, 40)));
    }

    #[test]
    fn test_restart_reopens_camera_after_close() {
        let mut h = HarnessBuilder::new().build();
        h.inference.start().unwrap();
        h.inference.stop();
        h.inference.start().unwrap();
        assert!(h.inference.is_running());
        assert_eq!(calls(&h.log), ["open", "close", "open"]);
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let mut h = HarnessBuilder::new().build();
        h.inference.stop();
        assert!(calls(&h.log).is_empty());
        assert_eq!(h.presented.lock().unwrap().clears, 0);
    }

    #[test]
    fn test_start_when_running_is_noop() {
        let mut h = HarnessBuilder::new().build();
        h.inference.start().unwrap();
        h.inference.start().unwrap();
        assert_eq!(count(&h.log, "open"), 1);
    }

    #[test]
    fn test_stop_clears_presenter() {
        let mut h = HarnessBuilder::new().build();
        h.inference.start().unwrap();
        h.inference.tick();
        h.inference.stop();
        assert!(!h.inference.is_running());
        assert_eq!(h.presented.lock().unwrap().clears, 1);
        assert_eq!(h.inference.tick(), TickOutcome::Idle);
    }

    #[test]
    fn test_open_failure_stays_idle() {
        let error = CameraError::Unavailable {
            device: 0,
            reason: "busy".to_string(),
        };
        let mut h = HarnessBuilder::new().open_error(error.clone()).build();

        assert_eq!(h.inference.start(), Err(error));
        assert!(!h.inference.is_running());
        assert_eq!(h.inference.tick(), TickOutcome::Idle);
        assert_eq!(count(&h.log, "read"), 0);
        assert_eq!(
            h.presented.lock().unwrap().statuses,
            vec![CAMERA_UNAVAILABLE_MESSAGE.to_string()]
        );
    }

    #[test]
    fn test_flip_applied_once_before_detection() {
        let mut h = HarnessBuilder::new().build();
        h.inference.start().unwrap();
        h.inference.tick();

        let seen = h.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let reds: Vec<u8> = seen[0].data().chunks(3).map(|px| px[0]).collect();
        assert_eq!(reds, vec![2, 1, 0]);

        let presented = h.presented.lock().unwrap();
        assert_eq!(presented.renders[0].0.data(), seen[0].data());
    }

    #[test]
    fn test_read_failure_skips_tick_and_keeps_running() {
        let mut h = HarnessBuilder::new().reads(vec![read_failed()]).build();
        h.inference.start().unwrap();

        assert_eq!(
            h.inference.tick(),
            TickOutcome::Skipped(SkipReason::ReadFailed)
        );
        assert!(h.inference.is_running());
        assert_eq!(h.inference.tick(), TickOutcome::Rendered { faces: 0 });
        assert!(h.seen.lock().unwrap().len() == 1);
    }

    #[test]
    fn test_detector_failure_skips_tick() {
        let mut h = HarnessBuilder::new()
            .detections(Err("model crashed".to_string()))
            .build();
        h.inference.start().unwrap();

        assert_eq!(
            h.inference.tick(),
            TickOutcome::Skipped(SkipReason::DetectorFailed)
        );
        assert!(h.inference.is_running());
        assert!(h.presented.lock().unwrap().renders.is_empty());
    }

    #[test]
    fn test_failure_escalates_once_per_streak() {
        let mut h = HarnessBuilder::new()
            .reads(vec![
                read_failed(),
                read_failed(),
                read_failed(),
                read_failed(),
                read_failed(),
                Ok(column_frame()),
                read_failed(),
                read_failed(),
                read_failed(),
            ])
            .build();
        h.inference.start().unwrap();

        for _ in 0..5 {
            h.inference.tick();
        }
        assert_eq!(
            h.presented.lock().unwrap().statuses,
            vec![READ_FAILED_MESSAGE.to_string()]
        );

        assert_eq!(h.inference.tick(), TickOutcome::Rendered { faces: 0 });
        for _ in 0..3 {
            h.inference.tick();
        }
        assert_eq!(h.presented.lock().unwrap().statuses.len(), 2);
    }

    #[test]
    fn test_frames_get_increasing_indices() {
        let mut h = HarnessBuilder::new().build();
        h.inference.start().unwrap();
        h.inference.tick();
        h.inference.tick();
        let presented = h.presented.lock().unwrap();
        assert_eq!(presented.renders[0].0.index(), 0);
        assert_eq!(presented.renders[1].0.index(), 1);
    }

    #[test]
    fn test_drop_closes_camera() {
        let h = HarnessBuilder::new().build();
        let Harness {
            mut inference, log, ..
        } = h;
        inference.start().unwrap();
        drop(inference);
        assert_eq!(calls(&log), ["open", "close"]);
    }
}
