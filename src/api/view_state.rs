use std::time::{Duration, Instant};

use crate::interaction::DragState;

use super::config::{MIN_UPDATE_DELAY_MS, XyPlotConfig};

/// Interaction and invalidation state owned by the plot.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub(super) selected: usize,
    pub(super) paused: bool,
    pub(super) legend_visible: bool,
    pub(super) legend_expanded: bool,
    pub(super) start_button_visible: bool,
    pub(super) clear_button_visible: bool,
    pub(super) save_button_visible: bool,
    pub(super) labels_visible: bool,
    pub(super) smooth_scroll: bool,
    pub(super) allow_pause_on_data_click: bool,
    pub(super) zoom_box_enabled: bool,
    pub(super) optimized_line_drawing: bool,
    pub(super) global_y_zoom: bool,
    pub(super) block_next_tap: bool,
    pub(super) drag: DragState,
    pub(super) needs_redraw: bool,
    pub(super) scale_changed: bool,
    pub(super) buttons_changed: bool,
    pub(super) zoom_box_needs_redraw: bool,
    pub(super) last_paint: Option<Instant>,
    pub(super) last_new_value_check: Option<Instant>,
    pub(super) update_delay: Duration,
    pub(super) zoom_box_delay: Duration,
    pub(super) last_zoom_at_position: Option<i32>,
}

impl ViewState {
    pub(super) fn from_config(config: &XyPlotConfig) -> Self {
        Self {
            selected: 0,
            paused: false,
            legend_visible: config.legend_visible,
            legend_expanded: config.legend_visible && config.legend_expanded,
            start_button_visible: config.start_button_visible,
            clear_button_visible: config.clear_button_visible,
            save_button_visible: config.save_button_visible,
            labels_visible: config.labels_visible,
            smooth_scroll: config.smooth_scroll,
            allow_pause_on_data_click: config.allow_pause_on_data_click,
            zoom_box_enabled: config.zoom_box,
            optimized_line_drawing: config.optimized_line_drawing,
            global_y_zoom: false,
            block_next_tap: false,
            drag: DragState::default(),
            needs_redraw: true,
            scale_changed: true,
            buttons_changed: true,
            zoom_box_needs_redraw: false,
            last_paint: None,
            last_new_value_check: None,
            update_delay: Duration::from_millis(config.update_delay_ms.max(MIN_UPDATE_DELAY_MS)),
            zoom_box_delay: Duration::from_millis(config.zoom_box_delay_ms),
            last_zoom_at_position: None,
        }
    }

    /// Index of the series whose Y axis and buttons are shown.
    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn legend_visible(&self) -> bool {
        self.legend_visible
    }

    #[must_use]
    pub fn legend_expanded(&self) -> bool {
        self.legend_expanded
    }

    #[must_use]
    pub fn start_button_visible(&self) -> bool {
        self.start_button_visible
    }

    #[must_use]
    pub fn clear_button_visible(&self) -> bool {
        self.clear_button_visible
    }

    #[must_use]
    pub fn save_button_visible(&self) -> bool {
        self.save_button_visible
    }

    #[must_use]
    pub fn labels_visible(&self) -> bool {
        self.labels_visible
    }

    #[must_use]
    pub fn smooth_scroll(&self) -> bool {
        self.smooth_scroll
    }

    #[must_use]
    pub fn allow_pause_on_data_click(&self) -> bool {
        self.allow_pause_on_data_click
    }

    #[must_use]
    pub fn zoom_box_enabled(&self) -> bool {
        self.zoom_box_enabled
    }

    #[must_use]
    pub fn optimized_line_drawing(&self) -> bool {
        self.optimized_line_drawing
    }

    /// `true` while the selected unit is Y-scaled to the visible X window.
    #[must_use]
    pub fn global_y_zoom(&self) -> bool {
        self.global_y_zoom
    }

    #[must_use]
    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    #[must_use]
    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// `true` when the next paint redraws background and axes.
    #[must_use]
    pub fn scale_changed(&self) -> bool {
        self.scale_changed
    }

    #[must_use]
    pub fn last_paint(&self) -> Option<Instant> {
        self.last_paint
    }

    #[must_use]
    pub fn update_delay(&self) -> Duration {
        self.update_delay
    }

    #[must_use]
    pub fn zoom_box_delay(&self) -> Duration {
        self.zoom_box_delay
    }

    /// Time since the last cursor paint has reached the zoom-box debounce.
    pub(super) fn zoom_box_debounce_elapsed(&self, now: Instant) -> bool {
        self.last_paint
            .is_none_or(|last| now.saturating_duration_since(last) >= self.zoom_box_delay)
    }
}
