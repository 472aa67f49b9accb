use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use opencv::{
    core::{self, Point, Rect, Scalar, Vector},
    highgui, imgcodecs, imgproc,
    prelude::*,
};

use crate::blob::BoundingBox;
use crate::blob::hsv::HsvRange;
use crate::utils::FpsCounter;
use crate::window::overlay::{CursorShape, DragMode, DragTracker, MouseEvent, Widget, WidgetSet};

/// Widgets, drag handling and cursor state, independent of any GUI backend
pub mod overlay;

/// Trackbars for editing the threshold range
pub mod controls;

/// Blank border kept to the right of and below the camera image.
pub const WINDOW_MARGIN: i32 = 5;

/// Extra size given to the tracking widget around the detected bounding box.
pub const WIDGET_PADDING: i32 = 10;

pub const TITLE_PREFIX: &str = "Data Collection Tool";

/// BGR colors of the overlay elements
const WIDGET_COLOR: (f64, f64, f64) = (0.0, 255.0, 0.0);
const PENDING_WIDGET_COLOR: (f64, f64, f64) = (0.0, 255.0, 255.0);
const CURSOR_COLOR: (f64, f64, f64) = (255.0, 255.0, 255.0);
const CURSOR_SIZE: i32 = 20;

fn bgr((b, g, r): (f64, f64, f64)) -> Scalar {
    Scalar::new(b, g, r, 0.0)
}

/// Whether the window follows the camera or holds the current frame for annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    Live,
    Edit,
}

/// Move the first widget over `bbox`.
///
/// Nothing happens when there is no widget or when the box is missing or degenerate. Returns
/// whether the widget was updated.
pub fn follow_bounding_box(widgets: &mut WidgetSet, bbox: Option<BoundingBox>) -> bool {
    let Some(bbox) = bbox.filter(|b| !b.is_degenerate()) else {
        return false;
    };
    match widgets.get_mut(0) {
        Some(widget) => {
            widget.set_position(bbox.x, bbox.y);
            widget.set_size(bbox.width + WIDGET_PADDING, bbox.height + WIDGET_PADDING);
            true
        }
        None => false,
    }
}

/// The status line shown in the window title.
pub fn status_title(fps: f64, range: &HsvRange) -> String {
    format!("{} | {:.0} FPS | {}", TITLE_PREFIX, fps, range)
}

/// A highgui window showing the camera image with overlay widgets on top.
pub struct CaptureWindow {
    name: String,
    title: String,
    camera_size: (u32, u32),
    offset: (i32, i32),
    mode: CaptureMode,
    cursor: CursorShape,
    drag_mode: DragMode,
    widgets: WidgetSet,
    tracker: DragTracker,

    /// Raw window-coordinate events pushed by the highgui mouse callback
    mouse_events: Arc<Mutex<Vec<(i32, i32, i32)>>>,
    fps: FpsCounter,
}

impl CaptureWindow {
    pub fn create(
        name: &str,
        camera_size: (u32, u32),
        offset: (i32, i32),
    ) -> Result<Self, Box<dyn std::error::Error>> {
        highgui::named_window(name, highgui::WINDOW_AUTOSIZE)?;
        let mouse_events = Arc::new(Mutex::new(Vec::new()));
        let events = mouse_events.clone();
        highgui::set_mouse_callback(
            name,
            Some(Box::new(move |event: i32, x: i32, y: i32, _flags: i32| {
                if let Ok(mut events) = events.lock() {
                    events.push((event, x, y));
                }
            })),
        )?;
        let window = Self {
            name: name.to_string(),
            title: TITLE_PREFIX.to_string(),
            camera_size,
            offset: (offset.0.max(0), offset.1.max(0)),
            mode: CaptureMode::Live,
            cursor: CursorShape::Default,
            drag_mode: DragMode::Default,
            widgets: WidgetSet::new(),
            tracker: DragTracker::new(),
            mouse_events,
            fps: FpsCounter::new(),
        };
        log::info!(
            "Created window \"{}\" ({}x{})",
            name,
            window.width(),
            window.height()
        );
        Ok(window)
    }

    /// Draw `frame` at the given offset, together with the widgets and the cursor.
    pub fn render(&mut self, frame: &Mat, offset_x: i32, offset_y: i32) -> opencv::Result<()> {
        self.offset = (offset_x.max(0), offset_y.max(0));
        self.process_mouse_events();

        let mut canvas = Mat::default();
        core::copy_make_border(
            frame,
            &mut canvas,
            self.offset.1,
            WINDOW_MARGIN,
            self.offset.0,
            WINDOW_MARGIN,
            core::BORDER_CONSTANT,
            Scalar::all(0.0),
        )?;

        for widget in self.widgets.iter() {
            imgproc::rectangle(
                &mut canvas,
                self.to_window_rect(widget),
                bgr(WIDGET_COLOR),
                2,
                imgproc::LINE_8,
                0,
            )?;
        }
        if let Some(pending) = self.tracker.pending_widget() {
            imgproc::rectangle(
                &mut canvas,
                self.to_window_rect(&pending),
                bgr(PENDING_WIDGET_COLOR),
                1,
                imgproc::LINE_8,
                0,
            )?;
        }
        if let (CursorShape::Crosshair, Some((x, y))) = (self.cursor, self.tracker.pointer()) {
            imgproc::draw_marker(
                &mut canvas,
                Point::new(x + self.offset.0, y + self.offset.1),
                bgr(CURSOR_COLOR),
                imgproc::MARKER_CROSS,
                CURSOR_SIZE,
                1,
                imgproc::LINE_8,
            )?;
        }

        highgui::imshow(&self.name, &canvas)?;
        self.fps.tick(Instant::now());
        Ok(())
    }

    fn to_window_rect(&self, widget: &Widget) -> Rect {
        let (x, y) = widget.position();
        let (width, height) = widget.size();
        Rect::new(x + self.offset.0, y + self.offset.1, width, height)
    }

    /// Feed the mouse events collected since the last frame to the drag tracker.
    fn process_mouse_events(&mut self) {
        let events = match self.mouse_events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(_) => return,
        };
        for (event, x, y) in events {
            let (x, y) = (x - self.offset.0, y - self.offset.1);
            let event = match event {
                highgui::EVENT_LBUTTONDOWN => MouseEvent::Down { x, y },
                highgui::EVENT_MOUSEMOVE => MouseEvent::Move { x, y },
                highgui::EVENT_LBUTTONUP => MouseEvent::Up { x, y },
                _ => continue,
            };
            if let Some(index) = self.tracker.handle(event, self.drag_mode, &mut self.widgets) {
                log::info!("Added widget {}", index);
            }
        }
    }

    /// Move the tracking widget over the detected blob. See [`follow_bounding_box`].
    pub fn update_widget(&mut self, bbox: Option<BoundingBox>) -> bool {
        follow_bounding_box(&mut self.widgets, bbox)
    }

    /// Write `frame` to `path` as an image, with the given JPEG quality.
    pub fn save<P: AsRef<Path>>(
        &self,
        path: P,
        frame: &Mat,
        quality: i32,
        show: bool,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let path = path.as_ref();
        if frame.empty() {
            return Err(format!("No frame to save to {}", path.display()).into());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file_name = path
            .to_str()
            .ok_or(format!("Invalid file name {}", path.display()))?;
        let params = Vector::<i32>::from_slice(&[imgcodecs::IMWRITE_JPEG_QUALITY, quality]);
        if !imgcodecs::imwrite(file_name, frame, &params)? {
            return Err(format!("Failed to save {}", file_name).into());
        }
        if show {
            log::info!("Saved {}", file_name);
        }
        Ok(())
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CaptureMode) {
        self.mode = mode;
        match mode {
            CaptureMode::Edit => {
                self.set_default_cursor(CursorShape::Crosshair);
                self.set_drag_mode(DragMode::Create);
            }
            CaptureMode::Live => {
                self.reset_default_cursor();
                self.set_drag_mode(DragMode::Default);
            }
        }
        log::info!("Switched to {:?} mode", mode);
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) -> opencv::Result<()> {
        if self.title != title {
            highgui::set_window_title(&self.name, title)?;
            self.title = title.to_string();
        }
        Ok(())
    }

    pub fn default_cursor(&self) -> CursorShape {
        self.cursor
    }

    pub fn set_default_cursor(&mut self, cursor: CursorShape) {
        self.cursor = cursor;
    }

    pub fn reset_default_cursor(&mut self) {
        self.cursor = CursorShape::Default;
    }

    pub fn drag_mode(&self) -> DragMode {
        self.drag_mode
    }

    pub fn set_drag_mode(&mut self, drag_mode: DragMode) {
        self.drag_mode = drag_mode;
    }

    pub fn add_widget(&mut self, widget: Widget) -> usize {
        self.widgets.add(widget)
    }

    pub fn get_widget(&self, index: usize) -> Option<&Widget> {
        self.widgets.get(index)
    }

    pub fn get_widget_mut(&mut self, index: usize) -> Option<&mut Widget> {
        self.widgets.get_mut(index)
    }

    pub fn remove_widget(&mut self, index: usize) -> Option<Widget> {
        self.widgets.remove(index)
    }

    pub fn remove_all_widgets(&mut self) {
        self.widgets.remove_all();
    }

    pub fn widget_count(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_open(&self) -> opencv::Result<bool> {
        Ok(highgui::get_window_property(&self.name, highgui::WND_PROP_VISIBLE)? >= 1.0)
    }

    pub fn is_closed(&self) -> opencv::Result<bool> {
        Ok(!self.is_open()?)
    }

    pub fn fps(&self) -> f64 {
        self.fps.fps()
    }

    pub fn camera_width(&self) -> u32 {
        self.camera_size.0
    }

    pub fn camera_height(&self) -> u32 {
        self.camera_size.1
    }

    pub fn width(&self) -> i32 {
        self.camera_size.0 as i32 + self.offset.0 + WINDOW_MARGIN
    }

    pub fn height(&self) -> i32 {
        self.camera_size.1 as i32 + self.offset.1 + WINDOW_MARGIN
    }

    /// Wait up to `delay` milliseconds for a key press and process pending GUI events.
    pub fn poll_key(&self, delay: i32) -> opencv::Result<i32> {
        highgui::wait_key(delay)
    }
}

impl Drop for CaptureWindow {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_window(&self.name) {
            log::debug!("Failed to destroy window \"{}\": {}", self.name, e);
        }
    }
}
