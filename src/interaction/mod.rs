use serde::{Deserialize, Serialize};

use crate::core::types::{Point, Rect};

/// Keyboard-level commands understood by the plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyCommand {
    MoveLeft,
    MoveRight,
    /// Select the previous series.
    LastData,
    /// Select the next series.
    NextData,
    ZoomIn,
    ZoomOut,
    ShowAll,
}

/// Pointer events forwarded by the host toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseEventKind {
    Down,
    Up,
    Move,
    SingleTap,
    DoubleTap,
}

/// Events the plot raises towards its owner when buttons are pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlotEvent {
    Start,
    Pause,
    Clear,
    Save,
}

/// Receiver for [`PlotEvent`]s.
pub trait PlotEventSink {
    fn on_event(&mut self, event: PlotEvent);
}

/// Default sink that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

impl PlotEventSink for NoopEventSink {
    fn on_event(&mut self, _event: PlotEvent) {}
}

/// Transient pointer state of a zoom-box drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DragState {
    /// Press position that started the drag.
    pub start: Option<Point>,
    /// Latest pointer position while dragging.
    pub current: Option<Point>,
    /// Position at the last accepted move.
    pub last: Option<Point>,
    /// Zoom-box rectangle being shown, widget-local.
    pub zoom_box: Option<Rect>,
}

impl DragState {
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.start.is_some()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
