use std::time::Instant;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::core::series::Series;
use crate::core::store::{SeriesId, StoreGuard};
use crate::core::types::{Point, Rect};
use crate::interaction::{KeyCommand, MouseEventKind, PlotEvent};
use crate::render::DrawingBackend;

use super::XyPlot;
use super::coordinates::screen_to_value_x;
use super::navigation::{Step, ZOOM_IN_FACTOR};

/// Narrowest zoom box, in pixels, that still zooms on release.
pub const MIN_ZOOM_RECT_SIZE: i32 = 10;
/// Pointer travel, in pixels, below which a drag move is ignored.
pub const MIN_MOVE_DETECT_SIZE: i32 = 5;
/// Fewest samples a zoom box must span.
const MIN_ZOOM_BOX_SAMPLES: usize = 2;

type PendingEvents = SmallVec<[PlotEvent; 2]>;

impl<B: DrawingBackend> XyPlot<B> {
    /// Applies a keyboard command. Returns `false` while nothing is attached
    /// or before the first layout pass.
    pub fn eval_key(&mut self, key: KeyCommand) -> bool {
        if self.series.is_empty() || self.frame.is_none() {
            return false;
        }
        trace!(?key, "key command");
        match key {
            KeyCommand::ShowAll => self.show_all(),
            KeyCommand::ZoomIn => {
                self.zoom_in();
            }
            KeyCommand::ZoomOut => {
                self.zoom_out();
            }
            KeyCommand::MoveLeft => {
                self.step_cursors(Step::Left);
            }
            KeyCommand::MoveRight => {
                self.step_cursors(Step::Right);
            }
            KeyCommand::NextData => {
                self.view.selected = (self.view.selected + 1) % self.series.len();
                self.view.scale_changed = true;
            }
            KeyCommand::LastData => {
                let count = self.series.len();
                self.view.selected = (self.view.selected + count - 1) % count;
                self.view.scale_changed = true;
            }
        }
        self.view.needs_redraw = true;
        true
    }

    /// Routes a pointer event given in host coordinates.
    ///
    /// Returns `true` when the event changed something that needs a repaint.
    /// Button presses are reported to the registered event handler.
    pub fn eval_mouse_event(&mut self, kind: MouseEventKind, x: i32, y: i32) -> bool {
        if self.series.is_empty() || self.frame.is_none() || !self.bounds.contains(x, y) {
            return false;
        }
        let point = Point::new(x - self.bounds.x, y - self.bounds.y);

        let mut pending = PendingEvents::new();
        // The drag updates re-arm the wake only after the store lock is gone.
        let rearm_wake = match kind {
            MouseEventKind::Up => self.view.drag.zoom_box.is_some(),
            MouseEventKind::Move => self.view.drag.is_dragging(),
            _ => false,
        };
        let store = self.store.clone();
        let mut guard = store.lock();
        let handled = match kind {
            MouseEventKind::Down => self.mouse_down(&mut guard, point, &mut pending),
            MouseEventKind::SingleTap => {
                let hit = !self.view.block_next_tap
                    && self.check_draw_area_hit(&mut guard, point, &mut pending);
                self.view.block_next_tap = false;
                hit
            }
            MouseEventKind::DoubleTap => {
                let hit = self.check_draw_area_hit(&mut guard, point, &mut pending);
                if hit {
                    if let Some(id) = self.selected_id() {
                        let range = self.x_scale.requested_span() / ZOOM_IN_FACTOR;
                        self.zoom_screen_by(&mut guard, id, range);
                    }
                }
                hit
            }
            MouseEventKind::Up => self.mouse_up(&mut guard),
            MouseEventKind::Move => self.mouse_move(point, Instant::now()),
        };
        drop(guard);

        if rearm_wake {
            self.wake.request_with_delay(self.view.zoom_box_delay);
        }
        for event in pending {
            self.emit(event);
        }
        handled
    }

    fn mouse_down(
        &mut self,
        guard: &mut StoreGuard<'_>,
        point: Point,
        pending: &mut PendingEvents,
    ) -> bool {
        let Point { x, y } = point;
        let hits = |rect: Option<Rect>| rect.is_some_and(|rect| rect.contains(x, y));

        let legend_slot = self.series.iter().position(|handle| {
            guard
                .get(handle.id())
                .and_then(Series::legend_rect)
                .is_some_and(|rect| rect.contains(x, y))
        });
        if let Some(slot) = legend_slot {
            debug!(slot, "series selected from legend");
            self.view.selected = slot;
            self.view.scale_changed = true;
            self.view.needs_redraw = true;
            return true;
        }

        let areas = self.click_areas;
        let Some(selected) = self.selected_id() else {
            return false;
        };
        if hits(areas.legend_button) {
            self.view.legend_expanded = !self.view.legend_expanded;
            self.view.block_next_tap = true;
        } else if hits(areas.zoom_y) {
            self.view.global_y_zoom = !self.view.global_y_zoom;
            self.view.buttons_changed = true;
        } else if hits(areas.save) {
            pending.push(PlotEvent::Save);
        } else if hits(areas.start) {
            if self.view.paused {
                self.show_all_locked(guard);
                pending.push(PlotEvent::Start);
            } else {
                self.apply_paused(guard, true);
                pending.push(PlotEvent::Pause);
            }
        } else if hits(areas.clear) {
            pending.push(PlotEvent::Clear);
        } else if hits(areas.pos1) {
            self.move_screen_pos1(guard);
        } else if hits(areas.left) {
            self.move_screen_left(guard);
        } else if hits(areas.right) {
            self.move_screen_right(guard);
        } else if hits(areas.end) {
            self.move_screen_end(guard);
        } else if hits(areas.zoom_out) {
            self.zoom_screen_out_of(guard, selected);
        } else if hits(areas.zoom_in) {
            let range = self.x_scale.requested_span() / ZOOM_IN_FACTOR;
            self.zoom_screen_by(guard, selected, range);
        } else if self.view.zoom_box_enabled {
            return self.check_draw_area_hit(guard, point, pending);
        } else {
            return false;
        }
        self.view.scale_changed = true;
        self.view.needs_redraw = true;
        true
    }

    fn mouse_up(&mut self, guard: &mut StoreGuard<'_>) -> bool {
        let zoom_box = self.view.drag.zoom_box;
        self.view.drag.reset();
        if let (Some(zoom_box), Some(frame), Some(id)) = (zoom_box, self.frame, self.selected_id()) {
            let left = screen_to_value_x(&frame, &self.x_scale, zoom_box.x);
            let right = screen_to_value_x(&frame, &self.x_scale, zoom_box.right());
            self.zoom_to_box(guard, id, zoom_box, left, right);
        }
        self.view.needs_redraw = true;
        true
    }

    fn zoom_to_box(
        &mut self,
        guard: &mut StoreGuard<'_>,
        id: SeriesId,
        zoom_box: Rect,
        left: f64,
        right: f64,
    ) {
        if zoom_box.width <= MIN_ZOOM_RECT_SIZE {
            return;
        }
        let Some(series) = guard.get_mut(id) else {
            return;
        };
        let (Some(first), Some(last)) = (
            series.find_nearest_index_by_x(left),
            series.find_nearest_index_by_x(right),
        ) else {
            return;
        };
        if first.abs_diff(last) <= MIN_ZOOM_BOX_SAMPLES {
            return;
        }
        let span = (right - left).abs();
        series.set_cursor((first + last) / 2);
        debug!(first, last, span, "zoom box released");
        self.zoom_screen_by(guard, id, span);
    }

    fn mouse_move(&mut self, point: Point, now: Instant) -> bool {
        let Some(start) = self.view.drag.start else {
            return false;
        };
        let drag = &mut self.view.drag;
        if drag.current.is_none() {
            drag.zoom_box = Some(Rect::new(start.x, start.y, 1, 1));
        }
        drag.current = Some(point);
        let moved = drag.last.is_none_or(|last| {
            (point.x - last.x).abs() >= MIN_MOVE_DETECT_SIZE
                || (point.y - last.y).abs() >= MIN_MOVE_DETECT_SIZE
        });

        let mut accepted = false;
        if moved && self.view.zoom_box_debounce_elapsed(now) {
            self.view.drag.last = Some(point);
            self.view.zoom_box_needs_redraw = true;
            accepted = true;
        }
        accepted
    }

    /// Moves every cursor to the sample under `point` when it lies inside the
    /// plot area. The first hit of a drag may pause the plot.
    pub(super) fn check_draw_area_hit(
        &mut self,
        guard: &mut StoreGuard<'_>,
        point: Point,
        pending: &mut PendingEvents,
    ) -> bool {
        let Some(frame) = self.frame else {
            return false;
        };
        let Point { x, y } = point;
        if self
            .click_areas
            .legend_frame
            .is_some_and(|rect| rect.contains(x, y))
            || y >= frame.bottom
        {
            return false;
        }
        if x < frame.left || x > frame.right || y < frame.top {
            return false;
        }

        let value = screen_to_value_x(&frame, &self.x_scale, x)
            .clamp(self.x_scale.value_min(), self.x_scale.value_max());
        let hits: SmallVec<[(SeriesId, usize); 4]> = self
            .series
            .iter()
            .filter_map(|handle| {
                let series = guard.get(handle.id())?;
                if series.len() < 2 {
                    return None;
                }
                series
                    .find_nearest_index_by_x(value)
                    .map(|index| (handle.id(), index))
            })
            .collect();
        if hits.is_empty() {
            return false;
        }

        if self.view.allow_pause_on_data_click || self.view.paused {
            if self.view.drag.start.is_none() {
                self.view.drag.start = Some(point);
                self.view.drag.last = Some(point);
                if !self.view.paused {
                    self.apply_paused(guard, true);
                    pending.push(PlotEvent::Pause);
                }
            }
            for (id, index) in hits {
                if let Some(series) = guard.get_mut(id) {
                    series.set_cursor(index);
                }
            }
            self.view.needs_redraw = true;
        }
        true
    }
}
