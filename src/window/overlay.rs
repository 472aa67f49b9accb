/// Distance from a widget's bottom-right corner within which a drag resizes it.
pub const RESIZE_HANDLE: i32 = 6;

/// A rectangle drawn on top of the camera image, in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Widget {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    moveable: bool,
    resizeable: bool,
}

impl Widget {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width: width.max(0),
            height: height.max(0),
            moveable: true,
            resizeable: true,
        }
    }

    /// The rectangle spanned by two opposite corners, in any order.
    pub fn from_corners(a: (i32, i32), b: (i32, i32)) -> Self {
        Self::new(
            a.0.min(b.0),
            a.1.min(b.1),
            (a.0 - b.0).abs(),
            (a.1 - b.1).abs(),
        )
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    pub fn set_size(&mut self, width: i32, height: i32) {
        self.width = width.max(0);
        self.height = height.max(0);
    }

    pub fn is_moveable(&self) -> bool {
        self.moveable
    }

    pub fn set_moveable(&mut self, moveable: bool) {
        self.moveable = moveable;
    }

    pub fn is_resizeable(&self) -> bool {
        self.resizeable
    }

    pub fn set_resizeable(&mut self, resizeable: bool) {
        self.resizeable = resizeable;
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x <= self.x + self.width && y <= self.y + self.height
    }

    fn on_resize_handle(&self, x: i32, y: i32) -> bool {
        (x - (self.x + self.width)).abs() <= RESIZE_HANDLE
            && (y - (self.y + self.height)).abs() <= RESIZE_HANDLE
    }
}

/// The overlay widgets of a window, addressed by insertion index.
#[derive(Debug, Clone, Default)]
pub struct WidgetSet {
    widgets: Vec<Widget>,
}

impl WidgetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a widget and return its index.
    pub fn add(&mut self, widget: Widget) -> usize {
        self.widgets.push(widget);
        self.widgets.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Widget> {
        self.widgets.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Widget> {
        self.widgets.get_mut(index)
    }

    /// Remove the widget at `index`. Later widgets shift down by one.
    pub fn remove(&mut self, index: usize) -> Option<Widget> {
        (index < self.widgets.len()).then(|| self.widgets.remove(index))
    }

    pub fn remove_all(&mut self) {
        self.widgets.clear();
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Widget> {
        self.widgets.iter()
    }

    /// Index of the topmost (most recently added) widget containing the point.
    pub fn find_at(&self, x: i32, y: i32) -> Option<usize> {
        self.widgets.iter().rposition(|w| w.contains(x, y))
    }
}

/// What a left-button drag does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragMode {
    /// Move or resize existing widgets.
    #[default]
    Default,

    /// Draw a new widget.
    Create,

    /// Ignore drags.
    Disabled,
}

/// Cursor drawn over the camera image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Default,
    Crosshair,
}

/// Mouse events in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEvent {
    Down { x: i32, y: i32 },
    Move { x: i32, y: i32 },
    Up { x: i32, y: i32 },
}

impl MouseEvent {
    pub fn position(&self) -> (i32, i32) {
        match *self {
            MouseEvent::Down { x, y } | MouseEvent::Move { x, y } | MouseEvent::Up { x, y } => {
                (x, y)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DragState {
    #[default]
    Idle,
    Moving {
        index: usize,
        grab: (i32, i32),
    },
    Resizing {
        index: usize,
    },
    Creating {
        anchor: (i32, i32),
        current: (i32, i32),
    },
}

/// Turns mouse events into widget edits according to the window's drag mode.
#[derive(Debug, Clone, Default)]
pub struct DragTracker {
    state: DragState,
    pointer: Option<(i32, i32)>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known pointer position.
    pub fn pointer(&self) -> Option<(i32, i32)> {
        self.pointer
    }

    pub fn is_dragging(&self) -> bool {
        self.state != DragState::Idle
    }

    /// The rectangle being drawn in create mode, if any.
    pub fn pending_widget(&self) -> Option<Widget> {
        match self.state {
            DragState::Creating { anchor, current } => Some(Widget::from_corners(anchor, current)),
            _ => None,
        }
    }

    /// Apply one mouse event. Returns the index of a widget created by this event.
    pub fn handle(&mut self, event: MouseEvent, mode: DragMode, widgets: &mut WidgetSet) -> Option<usize> {
        let (x, y) = event.position();
        self.pointer = Some((x, y));
        match (event, self.state) {
            (MouseEvent::Down { .. }, DragState::Idle) => {
                self.state = match mode {
                    DragMode::Create => DragState::Creating {
                        anchor: (x, y),
                        current: (x, y),
                    },
                    DragMode::Default => Self::grab(widgets, x, y),
                    DragMode::Disabled => DragState::Idle,
                };
                None
            }
            (MouseEvent::Move { .. }, DragState::Moving { index, grab }) => {
                if let Some(widget) = widgets.get_mut(index) {
                    widget.set_position(x - grab.0, y - grab.1);
                }
                None
            }
            (MouseEvent::Move { .. }, DragState::Resizing { index }) => {
                if let Some(widget) = widgets.get_mut(index) {
                    let (left, top) = widget.position();
                    widget.set_size(x - left, y - top);
                }
                None
            }
            (MouseEvent::Move { .. }, DragState::Creating { anchor, .. }) => {
                self.state = DragState::Creating {
                    anchor,
                    current: (x, y),
                };
                None
            }
            (MouseEvent::Up { .. }, DragState::Creating { anchor, .. }) => {
                self.state = DragState::Idle;
                let widget = Widget::from_corners(anchor, (x, y));
                let (width, height) = widget.size();
                if width > 0 && height > 0 {
                    let index = widgets.add(widget);
                    log::debug!("Created widget {} at ({}, {}) {}x{}", index, widget.x, widget.y, width, height);
                    Some(index)
                } else {
                    None
                }
            }
            (MouseEvent::Up { .. }, _) => {
                self.state = DragState::Idle;
                None
            }
            _ => None,
        }
    }

    fn grab(widgets: &WidgetSet, x: i32, y: i32) -> DragState {
        let resize_target = widgets
            .widgets
            .iter()
            .rposition(|w| w.is_resizeable() && w.on_resize_handle(x, y));
        if let Some(index) = resize_target {
            return DragState::Resizing { index };
        }
        match widgets.find_at(x, y) {
            Some(index) if widgets.widgets[index].is_moveable() => {
                let (left, top) = widgets.widgets[index].position();
                DragState::Moving {
                    index,
                    grab: (x - left, y - top),
                }
            }
            _ => DragState::Idle,
        }
    }
}
