use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use moodmirror_core::shared::constants::{EMOTION_MODEL, FACE_MODEL};
use moodmirror_core::shared::model_resolver::ModelSpec;

/// Resolves both models in the background at startup.
///
/// The camera worker waits on the slots when it builds its pipeline, so the
/// first Start press doesn't pay for the download if it already happened.
pub struct ModelCache {
    face: Arc<ModelSlot>,
    emotion: Arc<ModelSlot>,
}

struct ModelSlot {
    result: Mutex<Option<Result<PathBuf, String>>>,
    ready: Condvar,
    progress: Mutex<(u64, u64)>,
}

impl ModelCache {
    pub fn new() -> Arc<Self> {
        let cache = Arc::new(Self {
            face: Arc::new(ModelSlot::new()),
            emotion: Arc::new(ModelSlot::new()),
        });

        let face_slot = cache.face.clone();
        let emotion_slot = cache.emotion.clone();
        thread::spawn(move || {
            face_slot.resolve(FACE_MODEL);
            emotion_slot.resolve(EMOTION_MODEL);
        });

        cache
    }

    /// Wait for the face model. `on_progress(downloaded, total)` is called
    /// while a download is running. Returns early if `cancelled` is set.
    pub fn wait_for_face(
        &self,
        on_progress: &mut dyn FnMut(u64, u64),
        cancelled: &AtomicBool,
    ) -> Result<PathBuf, String> {
        self.face.wait(on_progress, cancelled)
    }

    pub fn wait_for_emotion(
        &self,
        on_progress: &mut dyn FnMut(u64, u64),
        cancelled: &AtomicBool,
    ) -> Result<PathBuf, String> {
        self.emotion.wait(on_progress, cancelled)
    }
}

impl ModelSlot {
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            ready: Condvar::new(),
            progress: Mutex::new((0, 0)),
        }
    }

    fn resolve(self: &Arc<Self>, model: ModelSpec) {
        let slot = self.clone();
        let result = model.resolve(
            None,
            Some(Box::new(move |downloaded: u64, total: u64| {
                if let Ok(mut progress) = slot.progress.lock() {
                    *progress = (downloaded, total);
                }
            })),
        );
        if let Err(ref e) = result {
            log::error!("Failed to resolve {}: {e}", model.name);
        }
        self.fill(result.map_err(|e| e.to_string()));
    }

    fn fill(&self, result: Result<PathBuf, String>) {
        if let Ok(mut guard) = self.result.lock() {
            *guard = Some(result);
        }
        self.ready.notify_all();
    }

    fn wait(
        &self,
        on_progress: &mut dyn FnMut(u64, u64),
        cancelled: &AtomicBool,
    ) -> Result<PathBuf, String> {
        let mut guard = self.result.lock().map_err(|e| e.to_string())?;
        loop {
            if cancelled.load(Ordering::Relaxed) {
                return Err("Cancelled".into());
            }
            if let Some(ref result) = *guard {
                return result.clone();
            }
            if let Ok(progress) = self.progress.try_lock() {
                let (downloaded, total) = *progress;
                if total > 0 {
                    on_progress(downloaded, total);
                }
            }
            let (next, _) = self
                .ready
                .wait_timeout(guard, Duration::from_millis(100))
                .map_err(|e| e.to_string())?;
            guard = next;
        }
    }
}
