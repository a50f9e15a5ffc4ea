use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::camera::domain::frame_source::{CameraError, CameraSession};
use crate::emotion::domain::frame_annotation::FrameAnnotation;
use crate::pipeline::inference_loop::InferenceLoop;
use crate::pipeline::infrastructure::channel_presenter::ChannelPresenter;
use crate::pipeline::presenter::Presenter;
use crate::pipeline::tick_scheduler::TickScheduler;
use crate::shared::frame::Frame;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopCommand {
    Start,
    Stop,
    Shutdown,
}

/// Everything the worker thread reports back.
#[derive(Clone, Debug, PartialEq)]
pub enum LoopEvent {
    /// The loop was built and is idle.
    Ready,
    BuildFailed(String),
    Started {
        device_index: u32,
        name: String,
        width: u32,
        height: u32,
    },
    StartFailed(CameraError),
    Frame(Frame, FrameAnnotation),
    Status(String),
    /// The video surface should be blanked.
    Cleared,
    Stopped,
    /// A tick overran and this many deadlines were skipped.
    TicksSkipped(u64),
    /// The worker is gone; no more events follow.
    Exited,
}

impl LoopEvent {
    fn started(session: &CameraSession) -> Self {
        LoopEvent::Started {
            device_index: session.device_index,
            name: session.name.clone(),
            width: session.width,
            height: session.height,
        }
    }
}

/// Runs an [`InferenceLoop`] on its own thread at a fixed tick period.
///
/// The loop is built on the worker by `builder`, which receives the
/// presenter to wire in. Commands are only handled between ticks.
/// Dropping the runner shuts the worker down and waits for it.
pub struct LoopRunner {
    commands: Sender<LoopCommand>,
    events: Receiver<LoopEvent>,
    handle: Option<JoinHandle<()>>,
}

impl LoopRunner {
    pub fn spawn<B>(period: Duration, builder: B) -> Result<Self, Box<dyn std::error::Error>>
    where
        B: FnOnce(Box<dyn Presenter>) -> Result<InferenceLoop, String> + Send + 'static,
    {
        if period.is_zero() {
            return Err("tick period must be positive".into());
        }
        let (command_tx, command_rx) = crossbeam_channel::unbounded();
        let (event_tx, event_rx) = crossbeam_channel::unbounded();

        let handle = std::thread::Builder::new()
            .name("inference-loop".to_string())
            .spawn(move || run_worker(period, builder, command_rx, event_tx))?;

        Ok(Self {
            commands: command_tx,
            events: event_rx,
            handle: Some(handle),
        })
    }

    pub fn start(&self) {
        self.send(LoopCommand::Start);
    }

    pub fn stop(&self) {
        self.send(LoopCommand::Stop);
    }

    pub fn events(&self) -> &Receiver<LoopEvent> {
        &self.events
    }

    /// All events that have arrived so far, without blocking.
    pub fn drain_events(&self) -> Vec<LoopEvent> {
        self.events.try_iter().collect()
    }

    /// Stops the camera, ends the worker and waits for it. Idempotent.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.send(LoopCommand::Shutdown);
        if handle.join().is_err() {
            log::error!("Inference loop thread panicked");
        }
    }

    fn send(&self, command: LoopCommand) {
        if self.commands.send(command).is_err() {
            log::warn!("Inference loop is gone; dropped {command:?}");
        }
    }
}

impl Drop for LoopRunner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker<B>(
    period: Duration,
    builder: B,
    commands: Receiver<LoopCommand>,
    events: Sender<LoopEvent>,
) where
    B: FnOnce(Box<dyn Presenter>) -> Result<InferenceLoop, String>,
{
    let emit = |event: LoopEvent| {
        let _ = events.send(event);
    };

    let presenter = ChannelPresenter::new(events.clone());
    let mut inference = match builder(Box::new(presenter)) {
        Ok(inference) => inference,
        Err(e) => {
            log::error!("Failed to build inference loop: {e}");
            emit(LoopEvent::BuildFailed(e));
            emit(LoopEvent::Exited);
            return;
        }
    };
    emit(LoopEvent::Ready);

    let mut scheduler = TickScheduler::new(period);
    loop {
        // Sleep on the command channel until the next tick is due.
        let received = match scheduler.time_until_next(Instant::now()) {
            Some(wait) => commands.recv_timeout(wait),
            None => commands.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        let command = match received {
            Ok(command) => Some(command),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(LoopCommand::Shutdown),
        };

        match command {
            Some(LoopCommand::Start) if !inference.is_running() => match inference.start() {
                Ok(()) => {
                    scheduler.start(Instant::now());
                    if let Some(session) = inference.session() {
                        emit(LoopEvent::started(session));
                    }
                }
                Err(e) => emit(LoopEvent::StartFailed(e)),
            },
            Some(LoopCommand::Stop) if inference.is_running() => {
                inference.stop();
                scheduler.stop();
                emit(LoopEvent::Stopped);
            }
            Some(LoopCommand::Shutdown) => break,
            Some(_) | None => {}
        }

        if let Some(missed) = scheduler.poll(Instant::now()) {
            if missed > 0 {
                log::debug!("Tick overran; skipped {missed} deadline(s)");
                emit(LoopEvent::TicksSkipped(missed));
            }
            inference.tick();
        }
    }

    if inference.is_running() {
        inference.stop();
        emit(LoopEvent::Stopped);
    }
    drop(inference);
    emit(LoopEvent::Exited);
}
