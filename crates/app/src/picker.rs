use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tokio::sync::mpsc;

use spamscan_core::{AcquiredImage, Acquisition, ImageSource};

use crate::config::CameraConfig;

#[derive(Debug, Error)]
pub enum PickError {
    #[error("could not read image file: {0}")]
    Io(#[from] std::io::Error),
    #[error("no capture device present")]
    NoCaptureDevice,
    #[error("no capture command configured")]
    NoCaptureCommand,
}

/// Library pick: the path is whatever the user chose in their file manager
/// or dropped into the intake folder. The bytes are taken as-is; whether
/// they decode is the extraction stage's problem.
pub fn pick_from_library(path: &Path) -> Result<Acquisition, PickError> {
    let bytes = std::fs::read(path)?;
    Ok(Acquisition::Image(AcquiredImage::new(
        bytes,
        ImageSource::Library,
    )))
}

/// Whether the camera option should be offered at all. Callers check this
/// before exposing the affordance.
pub fn camera_available(cfg: &CameraConfig) -> bool {
    cfg.capture_command.is_some() && cfg.device.exists()
}

/// Run the configured capture command; its stdout is one frame. A non-zero
/// exit or empty output means the user dismissed the capture UI, which is
/// cancellation, not an error.
pub fn capture_from_camera(cfg: &CameraConfig) -> Result<Acquisition, PickError> {
    if !cfg.device.exists() {
        return Err(PickError::NoCaptureDevice);
    }
    let cmd = cfg
        .capture_command
        .as_deref()
        .ok_or(PickError::NoCaptureCommand)?;

    let output = Command::new("sh").arg("-c").arg(cmd).output()?;
    if !output.status.success() || output.stdout.is_empty() {
        tracing::info!("capture dismissed ({})", output.status);
        return Ok(Acquisition::Cancelled);
    }

    Ok(Acquisition::Image(AcquiredImage::new(
        output.stdout,
        ImageSource::Camera,
    )))
}

/// Spawn a notify watcher on `watch_dir` that forwards newly created file
/// paths to `tx`. The returned watcher must be kept alive for watching to
/// continue.
pub fn spawn_intake_watcher(
    watch_dir: &Path,
    tx: mpsc::Sender<PathBuf>,
) -> notify::Result<impl notify::Watcher> {
    use notify::{EventKind, RecursiveMode, Watcher};

    let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
        if let Ok(ev) = event {
            if matches!(ev.kind, EventKind::Create(_)) {
                for path in ev.paths {
                    let _ = tx.try_send(path);
                }
            }
        }
    })?;

    watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
