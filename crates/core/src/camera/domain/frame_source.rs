use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("camera {device} not accessible: {reason}")]
    Unavailable { device: u32, reason: String },
    #[error("could not read frame: {0}")]
    ReadFailed(String),
}

/// Handle to an open camera.
///
/// Not `Clone`: [`FrameSource::close`] consumes it, so a closed session
/// cannot be read from again.
#[derive(Debug, PartialEq, Eq)]
pub struct CameraSession {
    pub device_index: u32,
    pub width: u32,
    pub height: u32,
    pub name: String,
}

/// Produces live frames from a camera device.
///
/// At most one session is open per source. Implementations own the OS-level
/// handle and release it in `close`.
pub trait FrameSource: Send {
    /// Acquires the camera at `device_index`.
    fn open(&mut self, device_index: u32) -> Result<CameraSession, CameraError>;

    /// Returns the next frame, waiting at most a short, finite timeout.
    fn read(&mut self, session: &CameraSession) -> Result<Frame, CameraError>;

    /// Releases the camera handle.
    fn close(&mut self, session: CameraSession);
}
