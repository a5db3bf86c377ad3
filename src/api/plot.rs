use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::core::number_format::{DecimalFormatter, NumberFormatter};
use crate::core::scale::{ScaleRequest, ScaleState, max_ticks_for_height, max_ticks_for_width};
use crate::core::snapshot::PlotSnapshot;
use crate::core::store::{SeriesHandle, SeriesId, SeriesStore, StoreGuard};
use crate::core::types::{Rect, Rgb};
use crate::core::wake::WakeScheduler;
use crate::core::zoom_stack::ZoomStack;
use crate::error::{PlotError, PlotResult};
use crate::interaction::{NoopEventSink, PlotEvent, PlotEventSink};
use crate::render::{ColorRole, DrawingBackend};

use super::config::{MIN_UPDATE_DELAY_MS, XyPlotConfig};
use super::layout::{AxisFrame, ButtonMetrics, ClickAreas};
use super::view_state::ViewState;

/// Embeddable XY plot: owns the X scale, the view state and the list of
/// attached series, and paints through a [`DrawingBackend`].
///
/// All methods run on the host's UI thread. Series are fed from any thread
/// through their [`SeriesHandle`]s.
pub struct XyPlot<B: DrawingBackend> {
    pub(super) backend: B,
    pub(super) store: SeriesStore,
    pub(super) series: Vec<SeriesHandle>,
    pub(super) wake: Arc<WakeScheduler>,
    pub(super) bounds: Rect,
    pub(super) buttons: ButtonMetrics,
    pub(super) x_scale: ScaleState,
    pub(super) zoom_stack: ZoomStack,
    pub(super) view: ViewState,
    pub(super) frame: Option<AxisFrame>,
    pub(super) click_areas: ClickAreas,
    pub(super) user_x_range: (f64, f64),
    pub(super) x_text: String,
    pub(super) x_unit: String,
    pub(super) events: Box<dyn PlotEventSink>,
    pub(super) formatter: Box<dyn NumberFormatter>,
}

impl<B: DrawingBackend> XyPlot<B> {
    /// Creates a plot attached to the process-wide [`SeriesStore::shared`].
    pub fn new(backend: B, config: XyPlotConfig) -> PlotResult<Self> {
        Self::with_store(backend, config, SeriesStore::shared())
    }

    /// Creates a plot whose series live in `store`.
    pub fn with_store(backend: B, config: XyPlotConfig, store: SeriesStore) -> PlotResult<Self> {
        config.validate()?;

        let wake = Arc::new(WakeScheduler::new(
            backend.wake_trigger(),
            Duration::from_millis(config.update_delay_ms),
        ));
        let buttons = ButtonMetrics::for_bounds(config.bounds, backend.button_aspect_ratio());
        let mut plot = Self {
            backend,
            store,
            series: Vec::new(),
            wake,
            bounds: config.bounds,
            buttons,
            x_scale: ScaleState::new(),
            zoom_stack: ZoomStack::new(),
            view: ViewState::from_config(&config),
            frame: None,
            click_areas: ClickAreas::default(),
            user_x_range: (0.0, 1.0),
            x_text: String::new(),
            x_unit: String::new(),
            events: Box::new(NoopEventSink),
            formatter: Box::new(DecimalFormatter::default()),
        };
        let request = plot.x_scale_request(0.0, 1.0, false);
        plot.x_scale.compute(request);
        debug!(
            width = config.bounds.width,
            height = config.bounds.height,
            "plot created"
        );
        Ok(plot)
    }

    /// Attaches `handle` and returns its slot. Attaching twice returns the
    /// existing slot.
    pub fn add_series(&mut self, handle: &SeriesHandle) -> PlotResult<usize> {
        if !handle.store().same_store(&self.store) {
            return Err(PlotError::InvalidConfig(
                "series belongs to a different store".to_owned(),
            ));
        }
        if let Some(slot) = self.slot_of(handle) {
            return Ok(slot);
        }

        self.store.set_owner(handle.id(), Some(Arc::clone(&self.wake)));
        self.series.push(handle.clone());
        let slot = self.series.len() - 1;
        if let Some(color) = handle.read(|series| series.color()) {
            self.backend.register_series_color(slot, color);
        }
        self.view.scale_changed = true;
        self.view.needs_redraw = true;
        debug!(slot, id = handle.id().raw(), "series attached");
        Ok(slot)
    }

    /// Detaches `handle`. Returns `false` if it was not attached.
    pub fn remove_series(&mut self, handle: &SeriesHandle) -> bool {
        let Some(slot) = self.slot_of(handle) else {
            return false;
        };
        self.series.remove(slot);
        self.store.set_owner(handle.id(), None);
        if self.view.selected >= self.series.len() {
            self.view.selected = 0;
        }
        self.register_series_colors();
        self.view.scale_changed = true;
        self.view.needs_redraw = true;
        debug!(slot, id = handle.id().raw(), "series detached");
        true
    }

    /// Detaches every series.
    pub fn clear_series(&mut self) {
        for handle in &self.series {
            self.store.set_owner(handle.id(), None);
        }
        let removed = self.series.len();
        self.series.clear();
        self.view.selected = 0;
        self.view.scale_changed = true;
        self.view.needs_redraw = true;
        debug!(removed, "all series detached");
    }

    #[must_use]
    pub fn series(&self) -> &[SeriesHandle] {
        &self.series
    }

    #[must_use]
    pub fn selected_series(&self) -> Option<&SeriesHandle> {
        self.series.get(self.view.selected)
    }

    /// Selects the series whose Y axis is shown. Out-of-range slots are
    /// ignored.
    pub fn set_selected(&mut self, slot: usize) -> bool {
        if slot >= self.series.len() {
            return false;
        }
        self.view.selected = slot;
        self.view.scale_changed = true;
        true
    }

    /// Replaces the receiver of start, pause, clear and save events.
    pub fn register_event_handler(&mut self, sink: impl PlotEventSink + 'static) {
        self.events = Box::new(sink);
    }

    pub fn set_number_formatter(&mut self, formatter: impl NumberFormatter + 'static) {
        self.formatter = Box::new(formatter);
        self.view.scale_changed = true;
        self.view.needs_redraw = true;
    }

    /// Moves or resizes the widget.
    pub fn set_bounds(&mut self, bounds: Rect) -> PlotResult<()> {
        if !bounds.is_valid() {
            return Err(PlotError::InvalidBounds {
                width: bounds.width,
                height: bounds.height,
            });
        }
        self.bounds = bounds;
        self.buttons = ButtonMetrics::for_bounds(bounds, self.backend.button_aspect_ratio());
        self.view.scale_changed = true;
        self.view.needs_redraw = true;
        Ok(())
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Sets the new-sample polling interval, floored at 10 ms.
    pub fn set_update_delay(&mut self, delay: Duration) {
        let delay = delay.max(Duration::from_millis(MIN_UPDATE_DELAY_MS));
        self.view.update_delay = delay;
        self.wake.set_delay(delay);
    }

    pub fn set_zoom_box_delay(&mut self, delay: Duration) {
        self.view.zoom_box_delay = delay;
    }

    pub fn set_font_size(&mut self, label_size: u32, title_size: u32) {
        self.backend.set_font_size(label_size, title_size);
        self.view.scale_changed = true;
        self.view.needs_redraw = true;
    }

    pub fn set_role_color(&mut self, role: ColorRole, color: Rgb) {
        self.backend.set_role_color(role, color);
        self.view.scale_changed = true;
        self.view.needs_redraw = true;
    }

    pub fn set_legend_expanded(&mut self, expanded: bool) {
        if expanded == self.view.legend_expanded {
            return;
        }
        self.view.legend_expanded = expanded;
        self.view.scale_changed = true;
        self.view.needs_redraw = true;
        if self.view.legend_visible {
            self.wake.request();
        }
    }

    /// Showing or hiding the legend also collapses it.
    pub fn set_legend_visible(&mut self, visible: bool) {
        if visible == self.view.legend_visible {
            return;
        }
        self.view.legend_visible = visible;
        self.view.legend_expanded = false;
        self.view.scale_changed = true;
        self.view.needs_redraw = true;
        self.wake.request();
    }

    pub fn set_start_button_visible(&mut self, visible: bool) {
        if visible != self.view.start_button_visible {
            self.view.start_button_visible = visible;
            self.mark_layout_changed();
        }
    }

    pub fn set_clear_button_visible(&mut self, visible: bool) {
        if visible != self.view.clear_button_visible {
            self.view.clear_button_visible = visible;
            self.mark_layout_changed();
        }
    }

    pub fn set_save_button_visible(&mut self, visible: bool) {
        if visible != self.view.save_button_visible {
            self.view.save_button_visible = visible;
            self.mark_layout_changed();
        }
    }

    /// Shows or hides axis labels, buttons and legend together.
    pub fn set_labels_visible(&mut self, visible: bool) {
        if visible != self.view.labels_visible {
            self.view.labels_visible = visible;
            self.mark_layout_changed();
        }
    }

    pub fn set_smooth_scroll(&mut self, enabled: bool) {
        self.view.smooth_scroll = enabled;
    }

    pub fn set_allow_pause_on_data_click(&mut self, enabled: bool) {
        self.view.allow_pause_on_data_click = enabled;
    }

    pub fn set_zoom_box_enabled(&mut self, enabled: bool) {
        self.view.zoom_box_enabled = enabled;
    }

    pub fn set_optimized_line_drawing(&mut self, enabled: bool) {
        self.view.optimized_line_drawing = enabled;
    }

    pub fn set_x_text(&mut self, text: impl Into<String>) {
        self.x_text = text.into();
        self.view.scale_changed = true;
    }

    #[must_use]
    pub fn x_text(&self) -> &str {
        &self.x_text
    }

    pub fn set_x_unit(&mut self, unit: impl Into<String>) {
        self.x_unit = unit.into();
        self.view.scale_changed = true;
    }

    #[must_use]
    pub fn x_unit(&self) -> &str {
        &self.x_unit
    }

    /// Lower bound of the visible X range in true units.
    #[must_use]
    pub fn x_min(&self) -> f64 {
        self.x_scale.value_min()
    }

    #[must_use]
    pub fn x_max(&self) -> f64 {
        self.x_scale.value_max()
    }

    #[must_use]
    pub fn x_scale(&self) -> &ScaleState {
        &self.x_scale
    }

    /// Range last set through `set_x_range` or `init_x_range`.
    #[must_use]
    pub fn user_x_range(&self) -> (f64, f64) {
        self.user_x_range
    }

    #[must_use]
    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.view.paused
    }

    /// Axis frame of the last layout pass; `None` before the first paint.
    #[must_use]
    pub fn axis_frame(&self) -> Option<AxisFrame> {
        self.frame
    }

    #[must_use]
    pub fn click_areas(&self) -> &ClickAreas {
        &self.click_areas
    }

    #[must_use]
    pub fn button_metrics(&self) -> ButtonMetrics {
        self.buttons
    }

    #[must_use]
    pub fn zoom_depth(&self) -> usize {
        self.zoom_stack.len()
    }

    #[must_use]
    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    /// Scheduler the attached series use to request repaints.
    #[must_use]
    pub fn wake_scheduler(&self) -> Arc<WakeScheduler> {
        Arc::clone(&self.wake)
    }

    /// To be called by the host once a requested wake was delivered.
    pub fn wake_fired(&self) {
        self.wake.fired();
    }

    /// Captures axis texts and every attached series.
    #[must_use]
    pub fn snapshot(&self) -> PlotSnapshot {
        PlotSnapshot::capture(self.x_text.clone(), self.x_unit.clone(), &self.series)
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    pub(super) fn slot_of(&self, handle: &SeriesHandle) -> Option<usize> {
        self.series.iter().position(|attached| attached == handle)
    }

    pub(super) fn selected_id(&self) -> Option<SeriesId> {
        self.series.get(self.view.selected).map(SeriesHandle::id)
    }

    pub(super) fn emit(&mut self, event: PlotEvent) {
        debug!(?event, "plot event");
        self.events.on_event(event);
    }

    pub(super) fn register_series_colors(&mut self) {
        for (slot, handle) in self.series.iter().enumerate() {
            if let Some(color) = handle.read(|series| series.color()) {
                self.backend.register_series_color(slot, color);
            }
        }
    }

    pub(super) fn x_scale_request(&self, min: f64, max: f64, exact: bool) -> ScaleRequest {
        let char_width = self.backend.average_char_size().x;
        let span = self.frame.map_or(0.0, |frame| f64::from(frame.width()));
        ScaleRequest::new(min, max, max_ticks_for_width(self.bounds.width, char_width))
            .with_axis_span_px(span)
            .tracking_exact_range(exact || self.view.paused || self.view.smooth_scroll)
    }

    pub(super) fn y_scale_request(&self, min: f64, max: f64) -> ScaleRequest {
        let char_height = self.backend.average_char_size().y;
        let (height, span) = match self.frame {
            Some(frame) => (frame.height(), f64::from(frame.height())),
            None => (self.bounds.height, 0.0),
        };
        ScaleRequest::new(min, max, max_ticks_for_height(height, char_height))
            .with_axis_span_px(span)
    }

    /// Recomputes the X scale and every series' visible point count.
    pub(super) fn rescale_x(
        &mut self,
        guard: &mut StoreGuard<'_>,
        min: f64,
        max: f64,
        exact: bool,
    ) -> bool {
        let request = self.x_scale_request(min, max, exact);
        let changed = self.x_scale.compute(request);
        let (value_min, value_max) = (self.x_scale.value_min(), self.x_scale.value_max());
        for handle in &self.series {
            if let Some(series) = guard.get_mut(handle.id()) {
                series.count_visible(value_min, value_max);
            }
        }
        if changed {
            debug!(min, max, value_min, value_max, "x scale changed");
        }
        self.view.scale_changed |= changed;
        changed
    }

    fn mark_layout_changed(&mut self) {
        self.view.scale_changed = true;
        self.view.needs_redraw = true;
    }
}
