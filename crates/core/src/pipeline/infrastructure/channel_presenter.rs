use crossbeam_channel::Sender;

use crate::emotion::domain::frame_annotation::FrameAnnotation;
use crate::pipeline::infrastructure::threaded_loop_runner::LoopEvent;
use crate::pipeline::presenter::Presenter;
use crate::shared::frame::Frame;

/// Unread events of any kind at which new frames start being dropped.
const DEFAULT_MAX_PENDING: usize = 4;

/// Presenter that forwards everything to another thread as [`LoopEvent`]s.
///
/// Never blocks the inference loop: if the receiver falls behind, frames are
/// dropped while status and clear events are always delivered.
pub struct ChannelPresenter {
    events: Sender<LoopEvent>,
    max_pending: usize,
    dropped: u64,
}

impl ChannelPresenter {
    pub fn new(events: Sender<LoopEvent>) -> Self {
        Self {
            events,
            max_pending: DEFAULT_MAX_PENDING,
            dropped: 0,
        }
    }

    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending.max(1);
        self
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn send(&self, event: LoopEvent) {
        // A closed channel means nobody is watching any more.
        let _ = self.events.send(event);
    }
}

impl Presenter for ChannelPresenter {
    fn render(&mut self, frame: Frame, annotation: FrameAnnotation) {
        if self.events.len() >= self.max_pending {
            self.dropped += 1;
            log::debug!("Presenter behind, dropped frame {}", frame.index());
            return;
        }
        self.send(LoopEvent::Frame(frame, annotation));
    }

    fn show_status(&mut self, message: &str) {
        self.send(LoopEvent::Status(message.to_string()));
    }

    fn clear(&mut self) {
        self.send(LoopEvent::Cleared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(index: usize) -> Frame {
        Frame::new(vec![0u8; 3], 1, 1, 3, index)
    }

    #[test]
    fn test_forwards_calls_in_order() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut presenter = ChannelPresenter::new(tx);

        presenter.render(frame(0), FrameAnnotation::empty());
        presenter.show_status("Error: Could not read frame");
        presenter.clear();

        let events: Vec<LoopEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                LoopEvent::Frame(frame(0), FrameAnnotation::empty()),
                LoopEvent::Status("Error: Could not read frame".to_string()),
                LoopEvent::Cleared,
            ]
        );
    }

    #[test]
    fn test_drops_frames_when_receiver_lags() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut presenter = ChannelPresenter::new(tx).with_max_pending(2);

        for i in 0..5 {
            presenter.render(frame(i), FrameAnnotation::empty());
        }
        presenter.clear();

        assert_eq!(presenter.dropped(), 3);
        let events: Vec<LoopEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert_eq!(events[2], LoopEvent::Cleared);
    }

    #[test]
    fn test_pending_statuses_count_against_frame_budget() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut presenter = ChannelPresenter::new(tx).with_max_pending(2);

        presenter.show_status("first");
        presenter.show_status("second");
        presenter.render(frame(0), FrameAnnotation::empty());
        presenter.clear();

        assert_eq!(presenter.dropped(), 1);
        let events: Vec<LoopEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                LoopEvent::Status("first".to_string()),
                LoopEvent::Status("second".to_string()),
                LoopEvent::Cleared,
            ]
        );
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (tx, rx) = crossbeam_channel::unbounded();
        drop(rx);
        let mut presenter = ChannelPresenter::new(tx);
        presenter.render(frame(0), FrameAnnotation::empty());
        presenter.show_status("gone");
        presenter.clear();
    }
}
