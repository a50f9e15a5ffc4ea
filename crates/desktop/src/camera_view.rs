use iced::widget::image::Handle;

use moodmirror_core::emotion::domain::emotion::Emotion;
use moodmirror_core::emotion::domain::frame_annotation::FrameAnnotation;
use moodmirror_core::pipeline::infrastructure::threaded_loop_runner::LoopEvent;
use moodmirror_core::presentation::overlay::annotate_frame;
use moodmirror_core::shared::constants::CAMERA_UNAVAILABLE_MESSAGE;
use moodmirror_core::shared::frame::Frame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    Idle,
    Starting,
    Running,
}

/// What the main tab shows, folded from the runner's events.
pub struct CameraView {
    pub state: CameraState,
    pub camera_name: Option<String>,
    /// Latest raw frame and its annotation, kept for snapshots.
    pub last: Option<(Frame, FrameAnnotation)>,
    pub image: Option<Handle>,
    pub status: Option<String>,
    /// Set when the pipeline could not be built; the worker must be respawned.
    pub broken: bool,
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            state: CameraState::Idle,
            camera_name: None,
            last: None,
            image: None,
            status: None,
            broken: false,
        }
    }
}

impl CameraView {
    pub fn starting(&mut self) {
        self.state = CameraState::Starting;
        self.status = None;
        self.broken = false;
    }

    pub fn apply(&mut self, event: LoopEvent) {
        match event {
            LoopEvent::Ready | LoopEvent::TicksSkipped(_) => {}
            LoopEvent::BuildFailed(e) => {
                self.state = CameraState::Idle;
                self.status = Some(format!("Error: {e}"));
                self.broken = true;
            }
            LoopEvent::Started { name, .. } => {
                self.state = CameraState::Running;
                self.camera_name = Some(name);
                self.status = None;
            }
            LoopEvent::StartFailed(_) => {
                self.state = CameraState::Idle;
                self.status = Some(CAMERA_UNAVAILABLE_MESSAGE.to_string());
            }
            LoopEvent::Frame(frame, annotation) => {
                self.image = Some(to_handle(&annotate_frame(&frame, &annotation)));
                self.last = Some((frame, annotation));
                self.status = None;
            }
            LoopEvent::Status(message) => self.status = Some(message),
            LoopEvent::Cleared => {
                self.image = None;
                self.last = None;
            }
            LoopEvent::Stopped | LoopEvent::Exited => {
                self.state = CameraState::Idle;
                self.camera_name = None;
            }
        }
    }

    pub fn annotation(&self) -> FrameAnnotation {
        self.last.as_ref().map(|(_, a)| *a).unwrap_or_default()
    }

    /// The status text when set, otherwise the emotion headline.
    pub fn headline(&self) -> String {
        match &self.status {
            Some(status) => status.clone(),
            None => self.annotation().headline(),
        }
    }

    pub fn bars(&self) -> [(Emotion, u8); 7] {
        self.annotation().bar_values()
    }

    pub fn toggle_label(&self) -> &'static str {
        match self.state {
            CameraState::Idle => "Start Camera",
            CameraState::Starting => "Starting...",
            CameraState::Running => "Stop Camera",
        }
    }

    pub fn is_error(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.starts_with("Error"))
    }
}

/// Expands packed RGB into the RGBA layout iced expects.
fn to_handle(frame: &Frame) -> Handle {
    let rgba: Vec<u8> = match frame.channels() {
        4 => frame.data().to_vec(),
        _ => frame
            .data()
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect(),
    };
    Handle::from_rgba(frame.width(), frame.height(), rgba)
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodmirror_core::camera::domain::frame_source::CameraError;
    use moodmirror_core::emotion::domain::emotion_detector::FaceEmotion;
    use moodmirror_core::emotion::domain::emotion_scores::EmotionScores;
    use moodmirror_core::shared::constants::READ_FAILED_MESSAGE;
    use moodmirror_core::shared::face_box::FaceBox;

    fn happy_annotation() -> FrameAnnotation {
        FrameAnnotation::from_detection(&FaceEmotion {
            face_box: FaceBox::new(1, 1, 4, 4),
            scores: EmotionScores::only(Emotion::Happy, 0.9),
        })
    }

    fn frame() -> Frame {
        Frame::new(vec![0; 8 * 8 * 3], 8, 8, 3, 0)
    }

    fn started() -> LoopEvent {
        LoopEvent::Started {
            device_index: 0,
            name: "Test Cam".into(),
            width: 8,
            height: 8,
        }
    }

    #[test]
    fn test_idle_view_shows_detecting_and_empty_bars() {
        let view = CameraView::default();
        assert_eq!(view.headline(), "Emotion: Detecting...");
        assert!(view.bars().iter().all(|(_, pct)| *pct == 0));
        assert_eq!(view.toggle_label(), "Start Camera");
    }

    #[test]
    fn test_start_then_frame_updates_headline_and_bars() {
        let mut view = CameraView::default();
        view.starting();
        assert_eq!(view.toggle_label(), "Starting...");

        view.apply(started());
        view.apply(LoopEvent::Frame(frame(), happy_annotation()));

        assert_eq!(view.state, CameraState::Running);
        assert_eq!(view.camera_name.as_deref(), Some("Test Cam"));
        assert_eq!(view.headline(), "Emotion: Happy - 90.00%");
        assert!(view.image.is_some());
        let happy = view.bars()[Emotion::Happy.index()];
        assert_eq!(happy, (Emotion::Happy, 90));
    }

    #[test]
    fn test_start_failure_shows_camera_error() {
        let mut view = CameraView::default();
        view.starting();
        view.apply(LoopEvent::StartFailed(CameraError::Unavailable {
            device: 0,
            reason: "busy".into(),
        }));
        assert_eq!(view.state, CameraState::Idle);
        assert_eq!(view.headline(), CAMERA_UNAVAILABLE_MESSAGE);
        assert!(view.is_error());
    }

    #[test]
    fn test_status_is_replaced_by_next_frame() {
        let mut view = CameraView::default();
        view.apply(started());
        view.apply(LoopEvent::Status(READ_FAILED_MESSAGE.into()));
        assert_eq!(view.headline(), READ_FAILED_MESSAGE);

        view.apply(LoopEvent::Frame(frame(), FrameAnnotation::empty()));
        assert_eq!(view.headline(), "Emotion: Detecting...");
        assert!(!view.is_error());
    }

    #[test]
    fn test_stop_clears_surface() {
        let mut view = CameraView::default();
        view.apply(started());
        view.apply(LoopEvent::Frame(frame(), happy_annotation()));
        view.apply(LoopEvent::Cleared);
        view.apply(LoopEvent::Stopped);

        assert_eq!(view.state, CameraState::Idle);
        assert!(view.image.is_none());
        assert!(view.last.is_none());
        assert_eq!(view.toggle_label(), "Start Camera");
    }

    #[test]
    fn test_build_failure_marks_worker_broken() {
        let mut view = CameraView::default();
        view.starting();
        view.apply(LoopEvent::BuildFailed("no models".into()));
        assert!(view.broken);
        assert_eq!(view.headline(), "Error: no models");

        view.starting();
        assert!(!view.broken);
    }
}
