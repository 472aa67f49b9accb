use std::sync::{
    Arc, Condvar, Mutex,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::{Duration, SystemTime};

use opencv::{
    core::AlgorithmHint,
    imgproc,
    prelude::*,
    videoio,
};

/// Pause after a failed read, so an unplugged camera does not spin the capture thread.
const READ_RETRY_DELAY: Duration = Duration::from_millis(10);

/// The most recent frame published by the camera thread.
pub struct CapturedFrame {
    pub frame: Mat,
    pub timestamp: SystemTime,

    /// Incremented on every published frame, so waiters can tell new frames from old ones.
    pub sequence: u64,
}

impl CapturedFrame {
    pub fn new() -> Self {
        Self {
            frame: Mat::default(),
            timestamp: SystemTime::UNIX_EPOCH,
            sequence: 0,
        }
    }
}

impl Default for CapturedFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// Frame slot shared between the camera thread and the render loop.
pub type SharedFrame = Arc<(Mutex<CapturedFrame>, Condvar)>;

pub fn new_shared_frame() -> SharedFrame {
    Arc::new((Mutex::new(CapturedFrame::new()), Condvar::new()))
}

/// Open camera `index` and request `resolution`. Returns the capture device together with
/// the resolution the device actually delivers.
pub fn open_camera(
    index: i32,
    resolution: (u32, u32),
) -> Result<(videoio::VideoCapture, (u32, u32)), Box<dyn std::error::Error>> {
    let mut cam = videoio::VideoCapture::new(index, videoio::CAP_ANY)?;
    if !cam.is_opened()? {
        return Err(format!("Failed to initialize video device {}", index).into());
    }
    cam.set(videoio::CAP_PROP_FRAME_WIDTH, resolution.0 as f64)?;
    cam.set(videoio::CAP_PROP_FRAME_HEIGHT, resolution.1 as f64)?;
    let width = cam.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
    let height = cam.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
    if width == 0 || height == 0 {
        return Err(format!("Video device {} reports an empty resolution", index).into());
    }
    if (width, height) != resolution {
        log::warn!(
            "Requested {}x{} from video device {}, got {}x{}",
            resolution.0,
            resolution.1,
            index,
            width,
            height
        );
    }
    log::info!(
        "Successfully initialized video device {} ({}x{})",
        index,
        width,
        height
    );
    Ok((cam, (width, height)))
}

/// Read frames from `cam` into `shared_frame` until `termination_signal` is set.
pub fn camera_thread_main(
    termination_signal: Arc<AtomicBool>,
    mut cam: videoio::VideoCapture,
    shared_frame: SharedFrame,
) {
    let (lock, condvar) = &*shared_frame;
    while !termination_signal.load(Ordering::Relaxed) {
        let Some(frame) = read_frame(&mut cam) else {
            thread::sleep(READ_RETRY_DELAY);
            continue;
        };
        publish_frame(lock, condvar, frame);
    }

    // Make sure no waiter is left blocked
    condvar.notify_all();
    log::info!("Camera thread stopped");
}

/// Grab one frame. Read errors are logged and reported like an empty read, so the capture
/// thread keeps retrying instead of exiting.
fn read_frame(cam: &mut impl VideoCaptureTrait) -> Option<Mat> {
    let mut frame = Mat::default();
    let result = cam.read(&mut frame);
    accept_frame(result, frame)
}

fn accept_frame(read_result: opencv::Result<bool>, frame: Mat) -> Option<Mat> {
    match read_result {
        Ok(true) if !frame.empty() => Some(frame),
        Ok(_) => None,
        Err(e) => {
            log::warn!("Failed to read from video device: {}", e);
            None
        }
    }
}

fn publish_frame(lock: &Mutex<CapturedFrame>, condvar: &Condvar, frame: Mat) {
    let mut captured = lock.lock().unwrap();
    captured.frame = frame;
    captured.timestamp = SystemTime::now();
    captured.sequence += 1;
    drop(captured);
    condvar.notify_all();
}

/// Wait up to `timeout` for a frame newer than `last_sequence`.
///
/// Returns a copy of the frame and its sequence number, or `None` if no new frame arrived in
/// time.
pub fn wait_for_frame(
    shared_frame: &SharedFrame,
    last_sequence: u64,
    timeout: Duration,
) -> opencv::Result<Option<(Mat, u64)>> {
    let (lock, condvar) = &**shared_frame;
    let guard = lock.lock().unwrap();
    let (guard, result) = condvar
        .wait_timeout_while(guard, timeout, |captured| {
            captured.sequence == last_sequence
        })
        .unwrap();
    if result.timed_out() {
        return Ok(None);
    }
    Ok(Some((guard.frame.try_clone()?, guard.sequence)))
}

/// Convert a BGR frame as delivered by `VideoCapture` into a continuous RGB frame.
pub fn bgr_to_rgb(bgr: &Mat) -> opencv::Result<Mat> {
    let mut rgb = Mat::default();
    imgproc::cvt_color(
        bgr,
        &mut rgb,
        imgproc::COLOR_BGR2RGB,
        0,
        AlgorithmHint::ALGO_HINT_ACCURATE,
    )?;
    Ok(rgb)
}
