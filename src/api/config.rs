use serde::{Deserialize, Serialize};

use crate::core::types::Rect;
use crate::error::{PlotError, PlotResult};

/// Default polling interval for freshly appended samples.
pub const DEFAULT_UPDATE_DELAY_MS: u64 = 500;
/// Lower bound for the update delay.
pub const MIN_UPDATE_DELAY_MS: u64 = 10;
/// Default debounce delay while a zoom box is being dragged.
pub const DEFAULT_ZOOM_BOX_DELAY_MS: u64 = 10;

/// Public plot bootstrap configuration.
///
/// This type is serializable so host applications can persist the widget
/// setup next to their own settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XyPlotConfig {
    pub bounds: Rect,
    #[serde(default = "default_update_delay_ms")]
    pub update_delay_ms: u64,
    #[serde(default = "default_zoom_box_delay_ms")]
    pub zoom_box_delay_ms: u64,
    #[serde(default = "default_true")]
    pub smooth_scroll: bool,
    #[serde(default)]
    pub allow_pause_on_data_click: bool,
    #[serde(default)]
    pub zoom_box: bool,
    #[serde(default = "default_true")]
    pub start_button_visible: bool,
    #[serde(default = "default_true")]
    pub clear_button_visible: bool,
    #[serde(default)]
    pub save_button_visible: bool,
    #[serde(default = "default_true")]
    pub legend_visible: bool,
    #[serde(default)]
    pub legend_expanded: bool,
    /// Axis labels, buttons and legend. When off only curves and axis lines
    /// are painted.
    #[serde(default = "default_true")]
    pub labels_visible: bool,
    /// Merge segments sharing one pixel column into a single stroke.
    #[serde(default = "default_true")]
    pub optimized_line_drawing: bool,
}

impl XyPlotConfig {
    #[must_use]
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            update_delay_ms: default_update_delay_ms(),
            zoom_box_delay_ms: default_zoom_box_delay_ms(),
            smooth_scroll: true,
            allow_pause_on_data_click: false,
            zoom_box: false,
            start_button_visible: true,
            clear_button_visible: true,
            save_button_visible: false,
            legend_visible: true,
            legend_expanded: false,
            labels_visible: true,
            optimized_line_drawing: true,
        }
    }

    /// Sets the new-sample polling interval; values below
    /// [`MIN_UPDATE_DELAY_MS`] are raised to it.
    #[must_use]
    pub fn with_update_delay_ms(mut self, delay_ms: u64) -> Self {
        self.update_delay_ms = delay_ms.max(MIN_UPDATE_DELAY_MS);
        self
    }

    #[must_use]
    pub fn with_zoom_box_delay_ms(mut self, delay_ms: u64) -> Self {
        self.zoom_box_delay_ms = delay_ms;
        self
    }

    #[must_use]
    pub fn with_smooth_scroll(mut self, enabled: bool) -> Self {
        self.smooth_scroll = enabled;
        self
    }

    #[must_use]
    pub fn with_pause_on_data_click(mut self, enabled: bool) -> Self {
        self.allow_pause_on_data_click = enabled;
        self
    }

    #[must_use]
    pub fn with_zoom_box(mut self, enabled: bool) -> Self {
        self.zoom_box = enabled;
        self
    }

    #[must_use]
    pub fn with_start_button(mut self, visible: bool) -> Self {
        self.start_button_visible = visible;
        self
    }

    #[must_use]
    pub fn with_clear_button(mut self, visible: bool) -> Self {
        self.clear_button_visible = visible;
        self
    }

    #[must_use]
    pub fn with_save_button(mut self, visible: bool) -> Self {
        self.save_button_visible = visible;
        self
    }

    #[must_use]
    pub fn with_legend(mut self, visible: bool, expanded: bool) -> Self {
        self.legend_visible = visible;
        self.legend_expanded = visible && expanded;
        self
    }

    #[must_use]
    pub fn with_labels(mut self, visible: bool) -> Self {
        self.labels_visible = visible;
        self
    }

    #[must_use]
    pub fn with_optimized_line_drawing(mut self, enabled: bool) -> Self {
        self.optimized_line_drawing = enabled;
        self
    }

    /// Rejects bounds without area and update delays below the floor.
    ///
    /// Deserialized configs bypass the builder clamps, so hosts loading a
    /// persisted config should call this before [`super::XyPlot::new`].
    pub fn validate(&self) -> PlotResult<()> {
        if !self.bounds.is_valid() {
            return Err(PlotError::InvalidBounds {
                width: self.bounds.width,
                height: self.bounds.height,
            });
        }
        if self.update_delay_ms < MIN_UPDATE_DELAY_MS {
            return Err(PlotError::InvalidConfig(format!(
                "update delay must be >= {MIN_UPDATE_DELAY_MS} ms, got {}",
                self.update_delay_ms
            )));
        }
        Ok(())
    }
}

fn default_update_delay_ms() -> u64 {
    DEFAULT_UPDATE_DELAY_MS
}

fn default_zoom_box_delay_ms() -> u64 {
    DEFAULT_ZOOM_BOX_DELAY_MS
}

fn default_true() -> bool {
    true
}
