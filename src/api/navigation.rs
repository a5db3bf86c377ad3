use tracing::{debug, trace};

use crate::core::series::Series;
use crate::core::store::{SeriesHandle, SeriesId, StoreGuard};
use crate::core::zoom_stack::ZoomRange;
use crate::render::DrawingBackend;

use super::XyPlot;
use super::coordinates::{screen_to_value_x, value_to_screen_x};

/// Cursor moves needed to cross one screen.
pub const MOVES_PER_SCREEN: usize = 20;
/// Zoom-in halves the visible span.
pub const ZOOM_IN_FACTOR: f64 = 2.0;
/// Pixels a pan may reach beyond the first or last sample.
pub const PAN_OVERSCROLL_PX: f64 = 50.0;
/// Screen moves tried before the cursor is placed at the right edge.
const CURSOR_CHASE_ATTEMPTS: usize = 4;

/// Direction of a cursor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Step {
    Left,
    Right,
}

impl<B: DrawingBackend> XyPlot<B> {
    /// Sets the X range of the running plot. While paused only the range used
    /// by "show all" is updated.
    pub fn set_x_range(&mut self, min: f64, max: f64) {
        self.user_x_range = (min, max);
        if self.view.paused {
            return;
        }
        let store = self.store.clone();
        let mut guard = store.lock();
        self.rescale_x(&mut guard, min, max, false);
        drop(guard);
        if self.view.scale_changed {
            self.wake.request();
            self.view.needs_redraw = true;
        }
    }

    /// Forces the X axis to exactly `[min, max]`, paused or not.
    pub fn init_x_range(&mut self, min: f64, max: f64) {
        self.user_x_range = (min, max);
        let store = self.store.clone();
        let mut guard = store.lock();
        self.rescale_x(&mut guard, min, max, true);
        drop(guard);
        self.view.scale_changed = true;
        self.view.needs_redraw = true;
        self.wake.request();
    }

    /// Pins the Y axis of `handle` to `[min, max]` and turns its automatic
    /// scaling off.
    pub fn set_y_range(&mut self, handle: &SeriesHandle, min: f64, max: f64) -> bool {
        if self.slot_of(handle).is_none() {
            return false;
        }
        let request = self.y_scale_request(min, max);
        let store = self.store.clone();
        let mut guard = store.lock();
        let Some(series) = guard.get_mut(handle.id()) else {
            return false;
        };
        series.set_auto_scale(false);
        let changed = series.y_scale_mut().compute(request);
        self.view.scale_changed |= changed;
        self.view.needs_redraw = true;
        changed
    }

    /// Switches between running and paused. Pausing places each cursor on
    /// its newest drawn sample.
    pub fn set_paused(&mut self, paused: bool) {
        let store = self.store.clone();
        let mut guard = store.lock();
        self.apply_paused(&mut guard, paused);
        self.view.needs_redraw = true;
    }

    /// Halves the visible span around the selected series' cursor.
    pub fn zoom_in(&mut self) -> bool {
        let Some(id) = self.selected_id() else {
            return false;
        };
        let range = self.x_scale.requested_span() / ZOOM_IN_FACTOR;
        let store = self.store.clone();
        let mut guard = store.lock();
        let zoomed = self.zoom_screen_by(&mut guard, id, range);
        self.view.needs_redraw = true;
        zoomed
    }

    /// Restores the range before the last zoom-in, or the full data range.
    pub fn zoom_out(&mut self) -> bool {
        let Some(id) = self.selected_id() else {
            return false;
        };
        let store = self.store.clone();
        let mut guard = store.lock();
        let zoomed = self.zoom_screen_out_of(&mut guard, id);
        self.view.needs_redraw = true;
        zoomed
    }

    /// Back to the caller's range: clears the zoom history, hides cursors and
    /// resumes running.
    pub fn show_all(&mut self) {
        let store = self.store.clone();
        let mut guard = store.lock();
        self.show_all_locked(&mut guard);
        self.view.needs_redraw = true;
    }

    /// Pinch or wheel zoom around the pixel column `position`.
    ///
    /// `factor` above one zooms in and is clamped to `[0.01, 1.99]`. The zoom
    /// history is cleared.
    pub fn zoom_at(&mut self, position: i32, factor: f64) -> bool {
        let (Some(id), Some(frame)) = (self.selected_id(), self.frame) else {
            return false;
        };
        let anchor = screen_to_value_x(&frame, &self.x_scale, position);
        let factor = factor.clamp(0.01, 1.99);
        let (lmin, lmax) = self.x_scale.requested_range();
        let min = anchor - (anchor - lmin) / factor;
        let max = anchor + (lmax - anchor) / factor;

        let store = self.store.clone();
        let mut guard = store.lock();
        if self.view.last_zoom_at_position != Some(position) {
            self.view.last_zoom_at_position = Some(position);
            if let Some(series) = guard.get_mut(id) {
                if let Some(index) = series.find_nearest_index_by_x(anchor) {
                    series.set_cursor(index);
                }
            }
        }
        self.zoom_stack.clear();
        let zoomed = self.zoom_screen_to(&mut guard, id, min, max);
        self.view.needs_redraw = true;
        zoomed
    }

    /// Pans the X axis by `pixels`.
    ///
    /// The window may reach up to 50 px (at most one data span) beyond the
    /// selected series. Returns `false` when the shift had to be cut short,
    /// which callers use to stop a fling. A window wider than that band is
    /// left where it is.
    pub fn move_by_pixels(&mut self, pixels: i32) -> bool {
        let Some(id) = self.selected_id() else {
            return false;
        };
        let factor = self.x_scale.pixels_per_unit();
        if factor == 0.0 {
            return false;
        }
        let store = self.store.clone();
        let mut guard = store.lock();
        let Some((data_min, data_max)) = guard.get(id).map(|s| (s.x_min(), s.x_max())) else {
            return false;
        };

        let shift = f64::from(pixels) / factor;
        let space = (PAN_OVERSCROLL_PX / factor).min(data_max - data_min);
        let lower = data_min - space;
        let upper = data_max + space;
        let (lmin, lmax) = self.x_scale.requested_range();
        let span = lmax - lmin;
        if span > upper - lower {
            trace!(pixels, span, lower, upper, "window wider than the pan band");
            return false;
        }
        let mut min = lmin + shift;
        let mut max = lmax + shift;
        let mut honored = true;
        if min < lower {
            min = lower;
            max = min + span;
            honored = false;
        }
        if max > upper {
            max = upper;
            min = max - span;
            honored = false;
        }

        if self.rescale_x(&mut guard, min, max, false) {
            self.view.needs_redraw = true;
        }
        trace!(pixels, honored, min, max, "pan");
        honored
    }

    /// Steps every cursor one move to the left, panning to keep it visible.
    pub fn move_left(&mut self) -> bool {
        self.step_cursors(Step::Left)
    }

    pub fn move_right(&mut self) -> bool {
        self.step_cursors(Step::Right)
    }

    pub(super) fn step_cursors(&mut self, step: Step) -> bool {
        if self.series.is_empty() || self.frame.is_none() {
            return false;
        }
        let store = self.store.clone();
        let mut guard = store.lock();
        let ids: Vec<SeriesId> = self.series.iter().map(SeriesHandle::id).collect();
        for id in ids {
            let Some(series) = guard.get_mut(id) else {
                continue;
            };
            if series.is_empty() {
                continue;
            }
            let visible = series.visible_points();
            let cursor = series.cursor().unwrap_or(visible.saturating_sub(1));
            let stride = (visible / MOVES_PER_SCREEN).max(1);
            let target = match step {
                Step::Left => cursor.saturating_sub(stride),
                Step::Right => cursor.saturating_add(stride),
            };
            series.set_cursor(target);

            let mut attempts = 0;
            while !self.is_cursor_visible(&guard, id) && attempts < CURSOR_CHASE_ATTEMPTS {
                attempts += 1;
                match step {
                    Step::Left => self.move_screen_left(&mut guard),
                    Step::Right => self.move_screen_right(&mut guard),
                }
            }
            if !self.is_cursor_visible(&guard, id) {
                self.set_cursor_visible(&mut guard, id);
            }
        }
        self.view.needs_redraw = true;
        true
    }

    pub(super) fn apply_paused(&mut self, guard: &mut StoreGuard<'_>, paused: bool) {
        if paused && !self.view.paused {
            for handle in &self.series {
                if let Some(series) = guard.get_mut(handle.id()) {
                    let newest = series
                        .last_drawn()
                        .checked_sub(1)
                        .unwrap_or(series.len().saturating_sub(1));
                    series.set_cursor(newest);
                }
            }
        }
        if paused != self.view.paused {
            debug!(paused, "pause state changed");
        }
        self.view.paused = paused;
        self.view.buttons_changed = true;
    }

    pub(super) fn allow_zoom_in(series: &Series) -> bool {
        series.visible_points() > MOVES_PER_SCREEN
    }

    pub(super) fn allow_zoom_out(&self, series: &Series) -> bool {
        series.x_min() < self.x_scale.value_min() || series.x_max() > self.x_scale.value_max()
    }

    /// Zooms to a span of `range` centered on the cursor of `id`. Pushes the
    /// previous range when the scale changed.
    pub(super) fn zoom_screen_by(&mut self, guard: &mut StoreGuard<'_>, id: SeriesId, range: f64) -> bool {
        let Some(series) = guard.get(id) else {
            return false;
        };
        let Some(center) = series.cursor_sample().map(|sample| sample.x) else {
            return false;
        };
        let (lmin, lmax) = self.x_scale.requested_range();
        if !(lmax - lmin < range || Self::allow_zoom_in(series)) {
            return false;
        }
        let (min, max) = clamp_to_overscroll(series, center - range / 2.0, center + range / 2.0);

        self.apply_paused(guard, true);
        let changed = self.rescale_x(guard, min, max, false);
        if changed {
            self.zoom_stack.push(ZoomRange::new(lmin, lmax));
            debug!(min, max, depth = self.zoom_stack.len(), "zoomed in");
        }
        changed
    }

    /// Zooms to `[min, max]` without recording history.
    pub(super) fn zoom_screen_to(
        &mut self,
        guard: &mut StoreGuard<'_>,
        id: SeriesId,
        min: f64,
        max: f64,
    ) -> bool {
        let Some(series) = guard.get(id) else {
            return false;
        };
        let (lmin, lmax) = self.x_scale.requested_range();
        if !(Self::allow_zoom_in(series) || lmax - lmin < max - min) {
            return false;
        }
        let (min, max) = clamp_to_overscroll(series, min, max);

        self.apply_paused(guard, true);
        self.rescale_x(guard, min, max, false)
    }

    /// Pops the zoom history, falling back to the data range of `id`.
    pub(super) fn zoom_screen_out_of(&mut self, guard: &mut StoreGuard<'_>, id: SeriesId) -> bool {
        let Some(series) = guard.get(id) else {
            return false;
        };
        if series.cursor().is_none() || !self.allow_zoom_out(series) {
            return false;
        }
        let fallback = ZoomRange::new(series.x_min(), series.x_max());
        let range = self.zoom_stack.pop().unwrap_or(fallback);

        let changed = self.rescale_x(guard, range.min, range.max, false);
        self.apply_paused(guard, true);
        debug!(
            min = range.min,
            max = range.max,
            depth = self.zoom_stack.len(),
            "zoomed out"
        );
        changed
    }

    pub(super) fn show_all_locked(&mut self, guard: &mut StoreGuard<'_>) {
        let (min, max) = self.user_x_range;
        self.rescale_x(guard, min, max, false);
        self.view.scale_changed = true;
        self.apply_paused(guard, false);
        self.zoom_stack.clear();
        for handle in &self.series {
            if let Some(series) = guard.get_mut(handle.id()) {
                series.hide_cursor();
            }
        }
        debug!(min, max, "show all");
    }

    pub(super) fn move_screen_pos1(&mut self, guard: &mut StoreGuard<'_>) {
        let Some(first) = self
            .selected_id()
            .and_then(|id| guard.get(id).map(Series::x_min))
        else {
            return;
        };
        let span = self.x_scale.requested_span();
        self.rescale_x(guard, first, first + span, false);
    }

    pub(super) fn move_screen_left(&mut self, guard: &mut StoreGuard<'_>) {
        let span = self.x_scale.requested_span();
        let (lmin, _) = self.x_scale.requested_range();
        let min = lmin - span / 2.0;
        self.rescale_x(guard, min, min + span, false);
    }

    pub(super) fn move_screen_right(&mut self, guard: &mut StoreGuard<'_>) {
        let span = self.x_scale.requested_span();
        let (_, lmax) = self.x_scale.requested_range();
        let max = lmax + span / 2.0;
        self.rescale_x(guard, max - span, max, false);
    }

    pub(super) fn move_screen_end(&mut self, guard: &mut StoreGuard<'_>) {
        let Some(last) = self
            .selected_id()
            .and_then(|id| guard.get(id).map(Series::x_max))
        else {
            return;
        };
        let span = self.x_scale.requested_span();
        self.rescale_x(guard, last - span, last, false);
    }

    pub(super) fn is_cursor_visible(&self, guard: &StoreGuard<'_>, id: SeriesId) -> bool {
        let Some(frame) = self.frame else {
            return false;
        };
        guard
            .get(id)
            .and_then(Series::cursor_sample)
            .is_some_and(|sample| {
                let x = value_to_screen_x(&frame, &self.x_scale, sample.x);
                x >= frame.left && x <= frame.right
            })
    }

    /// Puts the cursor on the sample at the right edge and ends the window
    /// there.
    pub(super) fn set_cursor_visible(&mut self, guard: &mut StoreGuard<'_>, id: SeriesId) -> bool {
        let Some(frame) = self.frame else {
            return false;
        };
        let left = screen_to_value_x(&frame, &self.x_scale, frame.left);
        let right = screen_to_value_x(&frame, &self.x_scale, frame.right);
        let Some(series) = guard.get_mut(id) else {
            return false;
        };
        let Some(index) = series.find_nearest_index_by_x(right) else {
            return false;
        };
        series.set_cursor(index);
        let max = series.sample_or_default(index).x;
        self.rescale_x(guard, max - (right - left), max, false);
        true
    }
}

/// Keeps `[min, max]` within one data span of the series' X range.
fn clamp_to_overscroll(series: &Series, min: f64, max: f64) -> (f64, f64) {
    let data_min = series.x_min();
    let data_max = series.x_max();
    let span = data_max - data_min;
    (min.max(data_min - span), max.min(data_max + span))
}
