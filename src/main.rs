use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use clap::Parser;
use opencv::prelude::*;

use blob_capture::blob::find_in_rgb_mat;
use blob_capture::camera::{
    SharedFrame, bgr_to_rgb, camera_thread_main, new_shared_frame, open_camera, wait_for_frame,
};
use blob_capture::config::ToolConfig;
use blob_capture::utils::timestamped_path;
use blob_capture::window::controls::ThresholdControls;
use blob_capture::window::{CaptureMode, CaptureWindow, status_title};

const WINDOW_NAME: &str = "Data Collection Tool";
const CONTROLS_WINDOW_NAME: &str = "Thresholds";

/// `wait_key` delays. Edit mode has no camera wait to pace the loop.
const LIVE_KEY_DELAY_MS: i32 = 1;
const EDIT_KEY_DELAY_MS: i32 = 30;

#[derive(Parser, Debug)]
#[command(
    name = "blob_capture",
    version,
    about = "Collect camera images while tracking the largest colored blob.",
    long_about = r#"Collect camera images while tracking the largest colored blob.

The camera image is shown in a window. Every frame is thresholded in HSV, and the largest region whose color lies outside the threshold range is located. The first overlay rectangle follows that region.

Keys:
  e          toggle edit mode (freezes the image; drag to draw overlay rectangles)
  c          remove all overlay rectangles
  s / SPACE  save the current frame as a JPEG
  w          write the current thresholds to the config file
  q / ESC    quit"#
)]
struct Args {
    /// The device index of the camera. Laptop's builtin camera is usually at index 0.
    #[arg(short, long, default_value_t = 0)]
    cam_id: i32,

    /// The camera resolution's X component.
    #[arg(long, default_value_t = 1280)]
    res_x: u32,

    /// The camera resolution's Y component.
    #[arg(long, default_value_t = 720)]
    res_y: u32,

    /// Path of the JSON config file. It is created by the `w` key if it does not exist.
    #[arg(long, default_value = "blob-capture.json")]
    config: PathBuf,

    /// Directory to save captured images to. Overrides the config file.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// JPEG quality (0-100) of saved images. Overrides the config file.
    #[arg(short, long, value_parser = clap::value_parser!(i32).range(0..=100))]
    quality: Option<i32>,

    /// Horizontal position of the camera image inside the window. Overrides the config file.
    #[arg(long)]
    offset_x: Option<i32>,

    /// Vertical position of the camera image inside the window. Overrides the config file.
    #[arg(long)]
    offset_y: Option<i32>,

    /// How long to wait for a camera frame, in milliseconds. Overrides the config file.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Log every detection.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply_overrides(&self, config: &mut ToolConfig) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(quality) = self.quality {
            config.jpeg_quality = quality;
        }
        if let Some(x) = self.offset_x {
            config.offset.0 = x;
        }
        if let Some(y) = self.offset_y {
            config.offset.1 = y;
        }
        if let Some(timeout) = self.timeout_ms {
            config.capture_timeout_ms = timeout;
        }
    }
}

enum KeyAction {
    Quit,
    Save,
    ToggleMode,
    ClearWidgets,
    WriteConfig,
}

impl KeyAction {
    fn from_key(key: i32) -> Option<Self> {
        if key < 0 {
            return None;
        }
        match (key & 0xff) as u8 {
            27 | b'q' => Some(Self::Quit),
            b's' | b' ' => Some(Self::Save),
            b'e' => Some(Self::ToggleMode),
            b'c' => Some(Self::ClearWidgets),
            b'w' => Some(Self::WriteConfig),
            _ => None,
        }
    }
}

fn render_loop(
    window: &mut CaptureWindow,
    controls: &ThresholdControls,
    config: &mut ToolConfig,
    config_path: &Path,
    shared_frame: &SharedFrame,
) -> Result<(), Box<dyn Error>> {
    let timeout = Duration::from_millis(config.capture_timeout_ms);
    let mut frame = Mat::default();
    let mut sequence = 0;

    while window.is_open()? {
        if window.mode() == CaptureMode::Live {
            match wait_for_frame(shared_frame, sequence, timeout)? {
                Some((new_frame, new_sequence)) => {
                    frame = new_frame;
                    sequence = new_sequence;
                }
                None => log::warn!(
                    "Failed to capture image from camera within {} ms",
                    config.capture_timeout_ms
                ),
            }
        }

        config.threshold = controls.read()?;
        if !frame.empty() {
            let rgb = bgr_to_rgb(&frame)?;
            let bbox = find_in_rgb_mat(&rgb, &config.threshold)?;
            match bbox {
                Some(bbox) => log::debug!("Frame {}: largest blob at {}", sequence, bbox),
                None => log::debug!("Frame {}: no blob found", sequence),
            }

            #[cfg(feature = "visualize")]
            blob_capture::visualize::show_debug_windows(
                &frame,
                &blob_capture::blob::mask::in_range_mask(&rgb, &config.threshold)?,
                bbox,
            )?;

            window.update_widget(bbox);
            window.render(&frame, config.offset.0, config.offset.1)?;
        }
        let title = status_title(window.fps(), &config.threshold);
        window.set_title(&title)?;

        let delay = match window.mode() {
            CaptureMode::Live => LIVE_KEY_DELAY_MS,
            CaptureMode::Edit => EDIT_KEY_DELAY_MS,
        };
        match KeyAction::from_key(window.poll_key(delay)?) {
            Some(KeyAction::Quit) => break,
            Some(KeyAction::Save) => {
                let path = timestamped_path(&config.output_dir, "capture", "jpg", &chrono::Local::now());
                if let Err(e) = window.save(&path, &frame, config.jpeg_quality, true) {
                    log::error!("{}", e);
                }
            }
            Some(KeyAction::ToggleMode) => {
                let mode = match window.mode() {
                    CaptureMode::Live => CaptureMode::Edit,
                    CaptureMode::Edit => CaptureMode::Live,
                };
                window.set_mode(mode);
            }
            Some(KeyAction::ClearWidgets) => {
                window.remove_all_widgets();
                log::info!("Removed all widgets");
            }
            Some(KeyAction::WriteConfig) => {
                if let Err(e) = config.save_to_file(config_path) {
                    log::error!("Failed to write config file {}: {}", config_path.display(), e);
                }
            }
            None => {}
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .parse_default_env()
        .try_init()?;

    let mut config = ToolConfig::from_file_or_default(&args.config)?;
    args.apply_overrides(&mut config);

    let (cam, camera_size) = open_camera(args.cam_id, (args.res_x, args.res_y)).inspect_err(|e| {
        log::error!("Failed to initialize video device: {}", e);
    })?;
    let mut window = CaptureWindow::create(WINDOW_NAME, camera_size, config.offset).inspect_err(|e| {
        log::error!("Failed to create display window: {}", e);
    })?;
    let controls = ThresholdControls::create(CONTROLS_WINDOW_NAME, &config.threshold)?;

    // highgui has to stay on the main thread, so the camera gets the spawned one.
    thread::scope(|s| {
        let termination_signal = Arc::new(AtomicBool::new(false));
        let shared_frame = new_shared_frame();

        // start camera thread
        let termination_signal_clone = termination_signal.clone();
        let shared_frame_clone = shared_frame.clone();
        let camera_thread =
            s.spawn(move || camera_thread_main(termination_signal_clone, cam, shared_frame_clone));

        let result = render_loop(
            &mut window,
            &controls,
            &mut config,
            &args.config,
            &shared_frame,
        );
        termination_signal.store(true, Ordering::Relaxed);
        if camera_thread.join().is_err() {
            log::error!("Camera thread panicked");
        }
        result
    })?;

    Ok(())
}
