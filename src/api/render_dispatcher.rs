use std::ops::Range;
use std::time::Instant;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::core::number_format::exponent_caption;
use crate::core::series::Series;
use crate::core::store::StoreGuard;
use crate::core::types::{Point, Rect, YRange};
use crate::render::{
    BackgroundRole, ButtonGlyph, CurveBatcher, DrawingBackend, FontWeight, ForegroundRole,
    StrokeStyle, clip_segment,
};

use super::XyPlot;
use super::coordinates::{value_to_screen, value_to_screen_x, value_to_screen_y};
use super::labels::{format_tick, format_value, format_value_unit, trim_text, unit_suffix};
use super::layout::{AxisFrame, LEGEND_BOX_BORDER, TICK_LEN};

/// Minimum pixel distance between sample markers drawn while paused.
pub const POINT_DISTANCE_FOR_CIRCLES: i32 = 30;
const SAMPLE_MARKER_RADIUS: i32 = 3;
const CURSOR_MARKER_RADIUS: i32 = 5;
const BUTTON_RADIUS: i32 = 8;
const BUTTON_BAR_RADIUS: i32 = 4;
const TITLE_OFFSET: i32 = 40;
const TITLE_SWATCH: i32 = 20;

/// What a call to [`XyPlot::paint`] redrew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepaintKind {
    /// Background, axes, buttons and every curve.
    Full,
    /// Only samples appended since the previous paint.
    Incremental,
    /// Nothing is attached.
    Skipped,
}

impl<B: DrawingBackend> XyPlot<B> {
    /// Reports whether the plot wants a repaint.
    ///
    /// New samples are only looked at once per update delay while running.
    /// Metadata changes on any series always count and force a full paint.
    pub fn is_outdated(&mut self, reset: bool) -> bool {
        self.is_outdated_at(Instant::now(), reset)
    }

    pub fn is_outdated_at(&mut self, now: Instant, reset: bool) -> bool {
        let mut outdated = self.view.needs_redraw;
        if reset {
            self.view.needs_redraw = false;
        }

        let store = self.store.clone();
        let mut guard = store.lock();
        let poll_due = self
            .view
            .last_new_value_check
            .is_none_or(|last| now.saturating_duration_since(last) > self.view.update_delay);
        if !self.view.paused && !outdated && poll_due {
            outdated = self
                .series
                .iter()
                .any(|handle| guard.get(handle.id()).is_some_and(Series::has_new_values));
            self.view.last_new_value_check = Some(now);
        }
        for handle in &self.series {
            if guard
                .get_mut(handle.id())
                .is_some_and(Series::take_other_changes)
            {
                self.view.scale_changed = true;
                outdated = true;
            }
        }
        outdated
    }

    /// Host-coordinate rectangle to repaint, or `None` when nothing changed.
    ///
    /// While a zoom box is shown only the box is returned, at most once per
    /// zoom-box delay.
    pub fn redraw_area(&mut self) -> Option<Rect> {
        self.redraw_area_at(Instant::now())
    }

    pub fn redraw_area_at(&mut self, now: Instant) -> Option<Rect> {
        if let Some(zoom_box) = self.view.drag.zoom_box {
            if self.view.zoom_box_debounce_elapsed(now) {
                self.view.zoom_box_needs_redraw = true;
            }
            if self.view.zoom_box_needs_redraw {
                self.view.zoom_box_needs_redraw = false;
                return Some(Rect::new(
                    zoom_box.x + self.bounds.x,
                    zoom_box.y + self.bounds.y,
                    zoom_box.width,
                    zoom_box.height,
                ));
            }
        }
        self.is_outdated(false).then_some(self.bounds)
    }

    /// Paints the plot.
    ///
    /// Falls back to a full paint whenever a scale, the layout or a series'
    /// metadata changed. Otherwise only the samples appended since the last
    /// paint are drawn.
    pub fn paint(&mut self) -> RepaintKind {
        self.view.needs_redraw = false;
        let local = Rect::new(0, 0, self.bounds.width, self.bounds.height);
        if self.series.is_empty() {
            self.backend.set_bg_color(BackgroundRole::Background);
            self.backend.draw_background(local);
            self.view.scale_changed = false;
            return RepaintKind::Skipped;
        }

        let store = self.store.clone();
        let mut guard = store.lock();
        for handle in &self.series {
            if let Some(series) = guard.get_mut(handle.id()) {
                if series.take_other_changes() {
                    self.view.scale_changed = true;
                }
                series.take_new_values();
            }
        }
        self.autoscale_y(&mut guard);

        let full = self.view.scale_changed || self.frame.is_none();
        if full {
            self.calculate_axis_position(&mut guard);
            // Tick limits depend on the frame height just laid out.
            self.autoscale_y(&mut guard);
            for (slot, handle) in self.series.iter().enumerate() {
                if let Some(series) = guard.get(handle.id()) {
                    self.backend.register_series_color(slot, series.color());
                }
            }
            self.paint_background();
            self.paint_plot_area(&guard, true);
            self.paint_axis(&guard);
            for handle in &self.series {
                if let Some(series) = guard.get_mut(handle.id()) {
                    series.set_last_drawn(0);
                }
            }
        } else {
            self.paint_plot_area(&guard, false);
        }

        let count = self.series.len();
        let selected = self.view.selected;
        for slot in (1..=count).map(|offset| (selected + offset) % count) {
            let id = self.series[slot].id();
            let Some(series) = guard.get(id) else {
                continue;
            };
            let len = series.len();
            let from = series.last_drawn().saturating_sub(1);
            self.draw_curve(series, slot, from..len);
            if let Some(series) = guard.get_mut(id) {
                series.set_last_drawn(len);
            }
        }

        if self.view.labels_visible {
            if full || self.view.buttons_changed {
                self.layout_click_areas();
                self.paint_buttons(&guard);
            }
            self.layout_legend(&mut guard);
            self.paint_legend_area();
            for slot in 0..count {
                if let Some(series) = guard.get(self.series[slot].id()) {
                    self.paint_legend_box(series, slot);
                }
            }
        } else {
            self.layout_legend(&mut guard);
        }

        self.view.scale_changed = false;
        self.view.buttons_changed = false;
        if full {
            debug!(series = count, "full repaint");
            RepaintKind::Full
        } else {
            trace!(series = count, "incremental repaint");
            RepaintKind::Incremental
        }
    }

    /// Paints the cursor overlay: the zoom box while dragging, otherwise the
    /// cursor line, marker and value label of the selected series.
    pub fn paint_cursor(&mut self) {
        self.paint_cursor_at(Instant::now());
    }

    pub fn paint_cursor_at(&mut self, now: Instant) {
        let (Some(frame), Some(handle)) = (self.frame, self.series.get(self.view.selected)) else {
            return;
        };
        let store = self.store.clone();
        let guard = store.lock();
        let Some(series) = guard.get(handle.id()) else {
            return;
        };
        if let Some(sample) = series.cursor_sample() {
            let y_scale = *series.y_scale();
            let position = value_to_screen(&frame, &self.x_scale, &y_scale, sample.x, sample.y);
            match (self.view.drag.start, self.view.drag.current) {
                (Some(start), Some(current)) => {
                    let zoom_box = Rect::new(
                        start.x.min(current.x) - 1,
                        start.y,
                        (start.x - current.x).abs() + 2,
                        4,
                    );
                    self.view.drag.zoom_box = Some(zoom_box);
                    self.backend.set_fg_color(ForegroundRole::Cursor);
                    self.backend.set_stroke(StrokeStyle::Solid, 1);
                    self.backend.draw_rect(Rect::new(
                        zoom_box.x + 1,
                        zoom_box.y + 1,
                        zoom_box.width - 3,
                        zoom_box.height - 3,
                    ));
                }
                _ if position.x >= frame.left && position.x <= frame.right => {
                    let text = format!(
                        "{} / {}",
                        self.formatter.format(
                            sample.x,
                            self.x_scale.fraction_digits() + 1,
                            self.x_scale.fraction_digits() + 1,
                        ),
                        format_value(self.formatter.as_ref(), &y_scale, sample.y),
                    );
                    self.draw_cursor(&frame, position, &text);
                }
                _ => {}
            }
        }
        self.view.last_paint = Some(now);
    }

    fn draw_cursor(&mut self, frame: &AxisFrame, position: Point, text: &str) {
        let slot = self.view.selected;
        self.backend.set_fg_color(ForegroundRole::Cursor);
        self.backend.set_stroke(StrokeStyle::Solid, 2);
        self.backend.draw_line(
            Point::new(position.x - 1, frame.top),
            Point::new(position.x - 1, frame.bottom),
        );
        self.backend.set_bg_series_color(slot);
        self.backend.draw_circle(position, CURSOR_MARKER_RADIUS);
        if !self.view.labels_visible {
            return;
        }

        self.backend.set_font(FontWeight::Normal);
        let extent = self.backend.text_extent(text);
        let width = extent.x + 10;
        let height = extent.y + 5;
        let mut x = position.x + 1;
        if x + width > frame.right {
            x = position.x - 1 - width;
        }
        let label = Rect::new(x, frame.top - height - 2, width, height);
        self.backend.set_bg_color(BackgroundRole::CursorBackground);
        self.backend.set_stroke(StrokeStyle::Solid, 1);
        self.backend.fill_round_rect(label, BUTTON_RADIUS);
        self.backend.draw_round_rect(label, BUTTON_RADIUS);
        self.backend.draw_text(text, Point::new(label.x + 3, label.y + 4));
    }

    /// Fits each auto-scaled Y axis to its data. Series sharing a unit share
    /// one range; with the global Y zoom the selected series' visible range
    /// wins for its unit.
    fn autoscale_y(&mut self, guard: &mut StoreGuard<'_>) {
        let (value_min, value_max) = (self.x_scale.value_min(), self.x_scale.value_max());
        let selected = self.view.selected;
        let global = self.view.global_y_zoom;

        let mut unit_ranges: IndexMap<String, YRange> = IndexMap::new();
        let mut zoomed: Option<(String, YRange)> = None;
        for (slot, handle) in self.series.iter().enumerate() {
            let Some(series) = guard.get(handle.id()) else {
                continue;
            };
            let range = if global && slot == selected {
                match (
                    series.find_nearest_index_by_x(value_min),
                    series.find_nearest_index_by_x(value_max),
                ) {
                    (Some(first), Some(last)) => series.y_range_between(first, last),
                    _ => None,
                }
            } else {
                series.display_y_range()
            };
            let Some(range) = range else {
                continue;
            };
            if global && slot == selected {
                zoomed = Some((series.unit().to_owned(), range));
            }
            unit_ranges
                .entry(series.unit().to_owned())
                .and_modify(|shared| *shared = shared.union(range))
                .or_insert(range);
        }

        for handle in &self.series {
            let Some(series) = guard.get(handle.id()) else {
                continue;
            };
            if !series.auto_scale() {
                continue;
            }
            let range = match &zoomed {
                Some((unit, range)) if unit == series.unit() => Some(*range),
                _ => unit_ranges.get(series.unit()).copied(),
            };
            let Some(range) = range else {
                continue;
            };
            let request = self.y_scale_request(range.min, range.max);
            if let Some(series) = guard.get_mut(handle.id()) {
                if series.y_scale_mut().compute(request) {
                    self.view.scale_changed = true;
                }
            }
        }
    }

    fn paint_background(&mut self) {
        let width = self.bounds.width;
        let height = self.bounds.height;
        self.backend.set_bg_color(BackgroundRole::Background);
        self.backend.draw_background(Rect::new(0, 0, width, height));
        if self.view.labels_visible {
            let bar = self.buttons.bar_height;
            self.backend.set_fg_color(ForegroundRole::Button);
            self.backend.set_stroke(StrokeStyle::Solid, 1);
            self.backend.draw_round_rect(
                Rect::new(4, height - bar, width - 8, self.buttons.height + 4),
                BUTTON_BAR_RADIUS,
            );
        }
    }

    /// Clears the plot area and redraws the grid. An incremental pass only
    /// clears the strip left of the oldest sample and redraws the curves
    /// crossing it.
    fn paint_plot_area(&mut self, guard: &StoreGuard<'_>, full: bool) {
        let Some(frame) = self.frame else {
            return;
        };
        let width = if full {
            frame.width()
        } else {
            self.series
                .iter()
                .filter_map(|handle| guard.get(handle.id()))
                .filter_map(|series| series.sample(0))
                .map(|sample| value_to_screen_x(&frame, &self.x_scale, sample.x).min(frame.right))
                .max()
                .map_or(0, |x| x - frame.left)
        };
        if width <= 0 {
            return;
        }

        self.backend.set_bg_color(BackgroundRole::PlotBackground);
        self.backend
            .fill_rect(Rect::new(frame.left + 1, frame.top - 1, width - 1, frame.height()));

        if let Some(series) = self.series.get(self.view.selected).and_then(|h| guard.get(h.id())) {
            let y_scale = *series.y_scale();
            let factor = y_scale.display_factor();
            self.backend.set_fg_color(ForegroundRole::Grid);
            self.backend.set_stroke(StrokeStyle::Dashed, 1);
            for tick in y_scale.tick_values() {
                let y = value_to_screen_y(&frame, &y_scale, tick * factor);
                if y == frame.bottom || y < frame.top || y > frame.bottom {
                    continue;
                }
                self.backend.draw_line(
                    Point::new(frame.left + 1, y),
                    Point::new(frame.left + width, y),
                );
            }
        }

        if !full {
            let strip_right = frame.left + width;
            for slot in 0..self.series.len() {
                let Some(series) = guard.get(self.series[slot].id()) else {
                    continue;
                };
                let end = series
                    .samples()
                    .position(|sample| value_to_screen_x(&frame, &self.x_scale, sample.x) > strip_right)
                    .map_or(series.len(), |index| index + 1);
                self.draw_curve(series, slot, 0..end);
            }
        }
    }

    /// Draws the segments between samples in `range` as clipped polylines.
    fn draw_curve(&mut self, series: &Series, slot: usize, range: Range<usize>) {
        let Some(frame) = self.frame else {
            return;
        };
        if range.len() < 2 {
            return;
        }
        let y_scale = *series.y_scale();
        let bounds = frame.clip_bounds();
        let width = if slot == self.view.selected { 3 } else { 2 };
        self.backend.set_stroke(StrokeStyle::Solid, width);
        self.backend.set_fg_series_color(slot);

        let mut batcher = CurveBatcher::new(self.view.optimized_line_drawing);
        let mut markers: SmallVec<[Point; 32]> = SmallVec::new();
        let mut previous: Option<(Point, bool)> = None;
        for index in range {
            let sample = series.sample_or_default(index);
            let point = value_to_screen(&frame, &self.x_scale, &y_scale, sample.x, sample.y);
            match previous {
                Some((_, true)) => batcher.break_line(),
                Some((from, false)) => {
                    if let Some((a, b)) = clip_segment(from, point, bounds) {
                        batcher.push_segment(a, b);
                    }
                }
                None => {}
            }
            if self.view.paused
                && point.x >= frame.left
                && point.x <= frame.right
                && markers
                    .last()
                    .is_none_or(|last| point.x - last.x > POINT_DISTANCE_FOR_CIRCLES)
            {
                markers.push(point);
            }
            previous = Some((point, sample.segment_break));
        }

        for line in batcher.finish() {
            self.backend.draw_polyline(&line);
        }
        for marker in markers {
            self.backend.draw_circle(marker, SAMPLE_MARKER_RADIUS);
        }
    }

    fn paint_axis(&mut self, guard: &StoreGuard<'_>) {
        let Some(frame) = self.frame else {
            return;
        };
        let slot = self.view.selected;
        let Some(series) = self.series.get(slot).and_then(|h| guard.get(h.id())) else {
            return;
        };
        let y_scale = *series.y_scale();

        self.backend.set_font(FontWeight::Bold);
        self.backend.set_fg_color(ForegroundRole::Axis);
        self.backend.set_stroke(StrokeStyle::Solid, 1);
        self.backend
            .draw_line(Point::new(frame.left, frame.top - 2), Point::new(frame.left, frame.bottom));

        if self.view.labels_visible {
            let title = format!("{}{}", series.legend(), unit_suffix(series));
            let at = Point::new(frame.left + TITLE_OFFSET, 3);
            self.backend.set_bg_series_color(slot);
            self.backend
                .fill_rect(Rect::new(at.x - 30, at.y, TITLE_SWATCH, TITLE_SWATCH));
            self.backend.draw_text(&title, at);

            self.backend.set_font(FontWeight::Normal);
            let caption = exponent_caption(y_scale.display_exponent());
            if !caption.is_empty() {
                let extent = self.backend.text_extent(&caption);
                self.backend
                    .draw_text(&caption, Point::new(frame.left - extent.x - 2, 4));
            }

            let factor = y_scale.display_factor();
            for tick in y_scale.tick_values() {
                let y = value_to_screen_y(&frame, &y_scale, tick * factor);
                if y_scale.is_categorical() {
                    let index = tick.round();
                    let label = if index < 0.0 {
                        ""
                    } else {
                        series.label(index as usize).unwrap_or_default()
                    };
                    let extent = self.backend.text_extent(label);
                    let rect = Rect::new(
                        frame.left - extent.x - 2 * LEGEND_BOX_BORDER,
                        y - extent.y / 2,
                        extent.x + LEGEND_BOX_BORDER,
                        extent.y,
                    );
                    self.backend.set_bg_color(BackgroundRole::LegendBackground);
                    self.backend.fill_rect(rect);
                    self.backend.draw_text(label, Point::new(rect.x + 2, rect.y));
                } else {
                    self.backend
                        .draw_line(Point::new(frame.left - TICK_LEN, y), Point::new(frame.left, y));
                    let text = format_tick(self.formatter.as_ref(), &y_scale, tick);
                    let extent = self.backend.text_extent(&text);
                    self.backend.draw_text(
                        &text,
                        Point::new(frame.left - TICK_LEN - extent.x - 4, y - extent.y / 2),
                    );
                }
            }
        }

        self.paint_x_axis(&frame);
    }

    fn paint_x_axis(&mut self, frame: &AxisFrame) {
        let mut title = format!("{} [{}]", self.x_text, self.x_unit);
        title.push_str(&exponent_caption(self.x_scale.display_exponent()));
        let title_extent = self.backend.text_extent(&title);
        let title_x = self.bounds.width - title_extent.x - 10;
        if self.view.labels_visible {
            self.backend
                .draw_text(&title, Point::new(title_x, frame.bottom + TICK_LEN));
        }
        self.backend.set_fg_color(ForegroundRole::Axis);
        self.backend.set_stroke(StrokeStyle::Solid, 1);
        self.backend
            .draw_line(Point::new(frame.left, frame.bottom), Point::new(frame.right, frame.bottom));

        let factor = self.x_scale.display_factor();
        let ticks: SmallVec<[f64; 16]> = self.x_scale.tick_values().skip(1).collect();
        for tick in ticks {
            let x = value_to_screen_x(frame, &self.x_scale, tick * factor);
            if x < frame.left || x > frame.right {
                continue;
            }
            self.backend
                .draw_line(Point::new(x, frame.bottom), Point::new(x, frame.bottom + TICK_LEN));
            if !self.view.labels_visible {
                continue;
            }
            let text = format_tick(self.formatter.as_ref(), &self.x_scale, tick);
            let extent = self.backend.text_extent(&text);
            let label_x = x - extent.x / 2;
            if label_x > frame.left && label_x + extent.x < title_x {
                self.backend
                    .draw_text(&text, Point::new(label_x, frame.bottom + TICK_LEN));
            }
        }
    }

    fn paint_buttons(&mut self, guard: &StoreGuard<'_>) {
        let areas = self.click_areas;
        let paused = self.view.paused;
        let cursor_set = self
            .series
            .get(self.view.selected)
            .and_then(|h| guard.get(h.id()))
            .is_some_and(|series| series.cursor().is_some());
        let (zoom_in_enabled, zoom_out_enabled) = self
            .series
            .get(self.view.selected)
            .and_then(|h| guard.get(h.id()))
            .map_or((false, false), |series| {
                (
                    Self::allow_zoom_in(series) && cursor_set,
                    self.allow_zoom_out(series) && cursor_set,
                )
            });

        let buttons = [
            (areas.zoom_in, ButtonGlyph::Plus, zoom_in_enabled),
            (areas.zoom_out, ButtonGlyph::Minus, zoom_out_enabled),
            (areas.pos1, ButtonGlyph::Pos1, true),
            (areas.left, ButtonGlyph::Left, true),
            (areas.right, ButtonGlyph::Right, true),
            (areas.end, ButtonGlyph::End, true),
            (
                areas.start,
                if paused {
                    ButtonGlyph::Start
                } else {
                    ButtonGlyph::Pause
                },
                true,
            ),
            (areas.clear, ButtonGlyph::Clear, true),
            (
                areas.zoom_y,
                if self.view.global_y_zoom {
                    ButtonGlyph::ZoomDown
                } else {
                    ButtonGlyph::ZoomUp
                },
                true,
            ),
            (areas.save, ButtonGlyph::SaveCurve, true),
        ];
        for (rect, glyph, enabled) in buttons {
            if let Some(rect) = rect {
                self.draw_button(rect, glyph, enabled);
            }
        }
    }

    fn draw_button(&mut self, rect: Rect, glyph: ButtonGlyph, enabled: bool) {
        self.backend.set_fg_color(ForegroundRole::Button);
        if self.backend.draws_own_button(glyph) {
            self.backend.set_bg_color(BackgroundRole::Background);
        } else {
            self.backend.set_bg_color(if enabled {
                BackgroundRole::ButtonBackground
            } else {
                BackgroundRole::ButtonDisabled
            });
            self.backend.set_stroke(StrokeStyle::Solid, 1);
            self.backend.draw_round_rect(rect, BUTTON_RADIUS);
        }
        self.backend.fill_round_rect(rect, BUTTON_RADIUS);
        self.backend.draw_button_glyph(rect, glyph, enabled);
    }

    fn paint_legend_area(&mut self) {
        let (Some(frame), Some(button)) =
            (self.click_areas.legend_frame, self.click_areas.legend_button)
        else {
            return;
        };
        self.backend.set_bg_color(BackgroundRole::LegendBackground);
        self.backend.set_fg_color(ForegroundRole::Axis);
        self.backend.set_stroke(StrokeStyle::Dashed, 1);
        let glyph = if self.view.legend_expanded {
            self.backend.fill_round_rect(frame, BUTTON_RADIUS);
            self.backend.draw_round_rect(frame, BUTTON_RADIUS);
            ButtonGlyph::Up
        } else {
            ButtonGlyph::Down
        };
        self.draw_button(button, glyph, true);
    }

    fn paint_legend_box(&mut self, series: &Series, slot: usize) {
        let Some(rect) = series.legend_rect() else {
            return;
        };
        self.backend.set_bg_color(if slot == self.view.selected {
            BackgroundRole::LegendSelected
        } else {
            BackgroundRole::LegendBackground
        });
        self.backend.fill_rect(rect);
        self.backend.set_font(FontWeight::Normal);
        self.backend.set_fg_color(ForegroundRole::Axis);
        let legend = trim_text(&self.backend, series.legend(), rect.width);
        self.backend.draw_text(&legend, Point::new(rect.x, rect.y));

        self.backend.set_bg_series_color(slot);
        self.backend
            .fill_rect(Rect::new(rect.x, rect.bottom() - 3, rect.width, 2));

        let sample = if self.view.paused {
            series.cursor_sample()
        } else {
            series.len().checked_sub(1).and_then(|last| series.sample(last))
        };
        if let Some(sample) = sample {
            let text = format_value_unit(self.formatter.as_ref(), series, sample.y);
            let text = trim_text(&self.backend, &text, rect.width);
            self.backend
                .draw_text(&text, Point::new(rect.x, rect.y + rect.height / 2 - 2));
        }
    }
}
