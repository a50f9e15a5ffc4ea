use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

use crate::camera::domain::frame_source::{CameraError, CameraSession, FrameSource};
use crate::shared::constants::{DEFAULT_OPEN_TIMEOUT, DEFAULT_READ_TIMEOUT};
use crate::shared::frame::Frame;

/// Backoff between failed grabs so a dead device doesn't spin the thread.
const GRAB_RETRY_DELAY: Duration = Duration::from_millis(10);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureConfig {
    pub read_timeout: Duration,
    pub open_timeout: Duration,
    /// How long `close` waits for the capture thread before detaching it.
    pub close_grace: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            open_timeout: DEFAULT_OPEN_TIMEOUT,
            close_grace: Duration::from_secs(1),
        }
    }
}

/// A camera available on this machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub index: String,
    pub name: String,
    pub description: String,
}

/// Lists the cameras the platform backend can see.
pub fn list_devices() -> Result<Vec<DeviceInfo>, Box<dyn std::error::Error>> {
    let cameras = nokhwa::query(ApiBackend::Auto)?;
    Ok(cameras
        .into_iter()
        .map(|info| DeviceInfo {
            index: info.index().to_string(),
            name: info.human_name(),
            description: info.description().to_string(),
        })
        .collect())
}

/// Device-side half of a capture thread. Lives and dies on that thread.
trait CaptureDevice {
    fn grab(&mut self) -> Result<Frame, String>;
    fn shutdown(&mut self);
}

type Connector =
    Arc<dyn Fn(u32) -> Result<(CameraSession, Box<dyn CaptureDevice>), String> + Send + Sync>;

struct NokhwaDevice {
    camera: Camera,
    next_index: usize,
}

impl CaptureDevice for NokhwaDevice {
    fn grab(&mut self) -> Result<Frame, String> {
        let buffer = self.camera.frame().map_err(|e| e.to_string())?;
        let image = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| e.to_string())?;
        let (width, height) = image.dimensions();
        let frame = Frame::new(image.into_raw(), width, height, 3, self.next_index);
        self.next_index += 1;
        Ok(frame)
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            log::warn!("Failed to stop camera stream: {e}");
        }
    }
}

fn connect_nokhwa(device_index: u32) -> Result<(CameraSession, Box<dyn CaptureDevice>), String> {
    let requested =
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
    let mut camera =
        Camera::new(CameraIndex::Index(device_index), requested).map_err(|e| e.to_string())?;
    camera.open_stream().map_err(|e| e.to_string())?;

    let resolution = camera.resolution();
    let session = CameraSession {
        device_index,
        width: resolution.width(),
        height: resolution.height(),
        name: camera.info().human_name(),
    };
    Ok((
        session,
        Box::new(NokhwaDevice {
            camera,
            next_index: 0,
        }),
    ))
}

struct CaptureThread {
    device_index: u32,
    stop: Arc<AtomicBool>,
    frames: Receiver<Frame>,
    handle: JoinHandle<()>,
}

/// Webcam frame source backed by `nokhwa`.
///
/// The camera is owned by a dedicated capture thread that keeps only the
/// latest frame, so `read` never returns a stale backlog.
pub struct NokhwaFrameSource {
    config: CaptureConfig,
    connector: Connector,
    capture: Option<CaptureThread>,
}

impl NokhwaFrameSource {
    pub fn new(config: CaptureConfig) -> Self {
        Self::with_connector(config, Arc::new(connect_nokhwa))
    }

    fn with_connector(config: CaptureConfig, connector: Connector) -> Self {
        Self {
            config,
            connector,
            capture: None,
        }
    }

    fn shutdown_capture(&mut self) {
        let Some(capture) = self.capture.take() else {
            return;
        };
        capture.stop.store(true, Ordering::SeqCst);
        drop(capture.frames);

        let deadline = Instant::now() + self.config.close_grace;
        while !capture.handle.is_finished() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        if capture.handle.is_finished() {
            if capture.handle.join().is_err() {
                log::warn!("Capture thread for camera {} panicked", capture.device_index);
            }
        } else {
            log::warn!(
                "Capture thread for camera {} did not stop within {:?}; detaching",
                capture.device_index,
                self.config.close_grace
            );
        }
    }
}

impl Default for NokhwaFrameSource {
    fn default() -> Self {
        Self::new(CaptureConfig::default())
    }
}

impl FrameSource for NokhwaFrameSource {
    fn open(&mut self, device_index: u32) -> Result<CameraSession, CameraError> {
        self.shutdown_capture();

        let unavailable = |reason: String| CameraError::Unavailable {
            device: device_index,
            reason,
        };

        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
        let (frame_tx, frame_rx) = crossbeam_channel::bounded(1);
        let drain = frame_rx.clone();
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();
        let connector = self.connector.clone();

        let handle = std::thread::Builder::new()
            .name(format!("camera-{device_index}"))
            .spawn(move || {
                capture_loop(device_index, connector, ready_tx, frame_tx, drain, thread_stop)
            })
            .map_err(|e| unavailable(format!("failed to spawn capture thread: {e}")))?;

        match ready_rx.recv_timeout(self.config.open_timeout) {
            Ok(Ok(session)) => {
                log::info!(
                    "Opened camera {device_index} ({}, {}x{})",
                    session.name,
                    session.width,
                    session.height
                );
                self.capture = Some(CaptureThread {
                    device_index,
                    stop,
                    frames: frame_rx,
                    handle,
                });
                Ok(session)
            }
            Ok(Err(reason)) => {
                let _ = handle.join();
                Err(unavailable(reason))
            }
            Err(RecvTimeoutError::Timeout) => {
                stop.store(true, Ordering::SeqCst);
                Err(unavailable(format!(
                    "timed out after {:?} waiting for the device",
                    self.config.open_timeout
                )))
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = handle.join();
                Err(unavailable("capture thread exited".to_string()))
            }
        }
    }

    fn read(&mut self, session: &CameraSession) -> Result<Frame, CameraError> {
        let capture = self
            .capture
            .as_ref()
            .filter(|c| c.device_index == session.device_index)
            .ok_or_else(|| CameraError::ReadFailed("camera not open".to_string()))?;

        match capture.frames.recv_timeout(self.config.read_timeout) {
            Ok(frame) => Ok(frame),
            Err(RecvTimeoutError::Timeout) => Err(CameraError::ReadFailed(format!(
                "timed out after {} ms",
                self.config.read_timeout.as_millis()
            ))),
            Err(RecvTimeoutError::Disconnected) => {
                Err(CameraError::ReadFailed("capture thread exited".to_string()))
            }
        }
    }

    fn close(&mut self, session: CameraSession) {
        log::info!("Closing camera {}", session.device_index);
        self.shutdown_capture();
    }
}

impl Drop for NokhwaFrameSource {
    fn drop(&mut self) {
        self.shutdown_capture();
    }
}

fn capture_loop(
    device_index: u32,
    connector: Connector,
    ready: Sender<Result<CameraSession, String>>,
    frames: Sender<Frame>,
    drain: Receiver<Frame>,
    stop: Arc<AtomicBool>,
) {
    let mut device = match connector(device_index) {
        Ok((session, device)) => {
            if ready.send(Ok(session)).is_err() {
                // open() gave up waiting
                let mut device = device;
                device.shutdown();
                return;
            }
            device
        }
        Err(reason) => {
            let _ = ready.send(Err(reason));
            return;
        }
    };
    drop(ready);

    while !stop.load(Ordering::SeqCst) {
        match device.grab() {
            Ok(frame) => {
                if !publish_latest(&frames, &drain, frame) {
                    break;
                }
            }
            Err(e) => {
                log::debug!("Camera {device_index} grab failed: {e}");
                std::thread::sleep(GRAB_RETRY_DELAY);
            }
        }
    }
    device.shutdown();
}

/// Puts `frame` in the single-slot channel, evicting an unread older frame.
///
/// Returns `false` once the channel is disconnected.
fn publish_latest(frames: &Sender<Frame>, drain: &Receiver<Frame>, frame: Frame) -> bool {
    match frames.try_send(frame) {
        Ok(()) => true,
        Err(TrySendError::Full(frame)) => {
            let _ = drain.try_recv();
            !matches!(frames.try_send(frame), Err(TrySendError::Disconnected(_)))
        }
        Err(TrySendError::Disconnected(_)) => false,
    }
}
