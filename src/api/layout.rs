use tracing::debug;

use crate::core::number_format::exponent_caption;
use crate::core::store::StoreGuard;
use crate::core::types::{Point, Rect};
use crate::render::{ClipBounds, DrawingBackend, FontWeight};

use super::XyPlot;
use super::labels::{format_value, format_value_unit};

/// Number of buttons that should fit across the shorter widget side.
pub const BUTTON_COUNT: i32 = 10;
pub const BUTTON_SPACING: i32 = 10;
pub const MIN_BUTTON_WIDTH: i32 = 44;
/// Gap between buttons of the right-aligned group.
pub const BUTTON_GROUP_GAP: i32 = 8;
pub const LEGEND_BOX_BORDER: i32 = 4;
pub const TICK_LEN: i32 = 4;
pub const PADDING_TOP: i32 = 3;
pub const PADDING_BUTTON: i32 = 5;
pub const PADDING_XR: i32 = 5;
/// Extra glyph columns reserved left of the Y axis.
const Y_GUTTER_EXTRA_CHARS: u32 = 4;

/// Button geometry derived from the widget bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonMetrics {
    pub width: i32,
    pub height: i32,
    pub bar_height: i32,
}

impl ButtonMetrics {
    /// `aspect_ratio` is height over width; `0` keeps buttons square.
    #[must_use]
    pub fn for_bounds(bounds: Rect, aspect_ratio: f32) -> Self {
        let base = bounds.width.min(bounds.height);
        let width = MIN_BUTTON_WIDTH.max(base / BUTTON_COUNT - BUTTON_SPACING);
        let mut height = (aspect_ratio * width as f32).round() as i32;
        if height == 0 {
            height = width;
        }
        Self {
            width,
            height,
            bar_height: height + 8,
        }
    }
}

/// Pixel frame of the plot area, widget-local.
///
/// ```text
/// (left, top)
///      |
///      |
/// (left, bottom) ------------ (right, bottom)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisFrame {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
    /// Width of one expanded legend column.
    pub legend_width: i32,
}

impl AxisFrame {
    #[must_use]
    pub fn clip_bounds(&self) -> ClipBounds {
        ClipBounds {
            left: self.left,
            right: self.right,
            top: self.top,
            bottom: self.bottom,
        }
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Hit areas cached by the last layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClickAreas {
    pub start: Option<Rect>,
    pub clear: Option<Rect>,
    pub zoom_y: Option<Rect>,
    pub save: Option<Rect>,
    pub pos1: Option<Rect>,
    pub left: Option<Rect>,
    pub zoom_in: Option<Rect>,
    pub zoom_out: Option<Rect>,
    pub right: Option<Rect>,
    pub end: Option<Rect>,
    pub legend_frame: Option<Rect>,
    pub legend_button: Option<Rect>,
}

impl<B: DrawingBackend> XyPlot<B> {
    /// Layout pass: places the axes from font metrics, legend content and
    /// the button bar, then refits every pixel factor.
    pub(super) fn calculate_axis_position(&mut self, guard: &mut StoreGuard<'_>) {
        let labels = self.view.labels_visible;
        let char_size = if labels {
            self.backend.set_font(FontWeight::Normal);
            self.backend.average_char_size()
        } else {
            Point::new(0, 0)
        };
        let width = self.bounds.width;
        let height = self.bounds.height;
        let bar = self.buttons.bar_height;

        let mut left = 0;
        let mut top = 0;
        let mut bottom = height - 1;
        let mut right = width;
        let mut legend_width = 0;
        let legend_pad = 3 * LEGEND_BOX_BORDER;

        for handle in &self.series {
            let Some(series) = guard.get(handle.id()) else {
                continue;
            };
            let scale = *series.y_scale();
            let texts = [
                series.legend().to_owned(),
                format_value_unit(self.formatter.as_ref(), series, scale.value_max()),
                format_value_unit(self.formatter.as_ref(), series, scale.value_min()),
            ];
            for text in &texts {
                legend_width = legend_width.max(legend_pad + self.backend.text_extent(text).x);
            }

            if labels {
                let gutter_chars = scale.glyph_width() + Y_GUTTER_EXTRA_CHARS;
                left = left.max(gutter_chars as i32 * char_size.x + TICK_LEN);
                if scale.display_exponent() != 0 {
                    let caption = exponent_caption(scale.display_exponent());
                    left = left.max(self.backend.text_extent(&caption).x);
                }
                top = top.max(bar + char_size.y / 2);
                bottom = bottom.min(height - bar - PADDING_BUTTON * 2 - TICK_LEN - char_size.y);
                let x_label = format_value(
                    self.formatter.as_ref(),
                    &self.x_scale,
                    self.x_scale.value_max(),
                );
                right = (width - self.backend.text_extent(&x_label).x)
                    .min(width - (PADDING_XR + 10));
            }
        }

        let frame = AxisFrame {
            left,
            right,
            top,
            bottom,
            legend_width,
        };
        let y_span = f64::from(frame.height());
        for handle in &self.series {
            if let Some(series) = guard.get_mut(handle.id()) {
                series.y_scale_mut().fit_to_pixels(y_span);
            }
        }
        self.x_scale.fit_to_pixels(f64::from(frame.width()));
        if self.frame != Some(frame) {
            debug!(left, right, top, bottom, legend_width, "axis frame laid out");
        }
        self.frame = Some(frame);
    }

    /// Places the button bar. Navigation buttons exist only while paused,
    /// the outer four only when six buttons fit left of the fixed group.
    pub(super) fn layout_click_areas(&mut self) {
        let ButtonMetrics {
            width: w,
            height: h,
            bar_height,
        } = self.buttons;
        let y = self.bounds.height - bar_height + 2;
        let mut areas = ClickAreas {
            legend_frame: self.click_areas.legend_frame,
            legend_button: self.click_areas.legend_button,
            ..ClickAreas::default()
        };

        let mut x = self.bounds.width - w - BUTTON_GROUP_GAP;
        if self.view.start_button_visible {
            areas.start = Some(Rect::new(x, y, w, h));
            x -= w + BUTTON_GROUP_GAP;
        }
        if self.view.clear_button_visible {
            areas.clear = Some(Rect::new(x, y, w, h));
            x -= w + BUTTON_GROUP_GAP;
        }
        areas.zoom_y = Some(Rect::new(x, y, w, h));
        x -= w + BUTTON_GROUP_GAP;
        if self.view.save_button_visible {
            areas.save = Some(Rect::new(x, y, w, h));
        }

        let room_for_all = x > (w + BUTTON_SPACING) * 6;
        let paused = self.view.paused;
        let mut x = BUTTON_SPACING;
        let next = |x: &mut i32| {
            let rect = Rect::new(*x, y, w, h);
            *x += w + BUTTON_SPACING;
            Some(rect)
        };
        if paused && room_for_all {
            areas.pos1 = next(&mut x);
            areas.left = next(&mut x);
            areas.zoom_in = next(&mut x);
        }
        if paused {
            areas.zoom_out = next(&mut x);
        }
        if paused && room_for_all {
            areas.right = next(&mut x);
            areas.end = next(&mut x);
        }
        self.click_areas = areas;
    }

    /// Places the legend frame and, when expanded, one box per series.
    pub(super) fn layout_legend(&mut self, guard: &mut StoreGuard<'_>) {
        let Some(frame) = self.frame else {
            return;
        };
        self.click_areas.legend_frame = None;
        self.click_areas.legend_button = None;
        if !self.view.legend_visible || !self.view.labels_visible {
            for handle in &self.series {
                if let Some(series) = guard.get_mut(handle.id()) {
                    series.set_legend_rect(None);
                }
            }
            return;
        }

        let ButtonMetrics {
            width: bw,
            height: bh,
            ..
        } = self.buttons;
        let expanded = self.view.legend_expanded;
        let frame_width = if expanded { frame.legend_width } else { bw };
        let frame_x = self.bounds.width - LEGEND_BOX_BORDER - frame_width;
        let padding = 1;
        let button = Rect::new(
            frame_x + 1 + padding,
            PADDING_TOP + 1 + padding,
            frame_width - 4 - padding,
            bh - 4 - padding,
        );

        self.backend.set_font(FontWeight::Normal);
        let char_height = self.backend.average_char_size().y;
        let item_height = char_height * 2 + LEGEND_BOX_BORDER;
        let mut frame_height = bh;
        for (slot, handle) in self.series.iter().enumerate() {
            let Some(series) = guard.get_mut(handle.id()) else {
                continue;
            };
            if expanded {
                let rect = Rect::new(
                    self.bounds.width - frame.legend_width,
                    PADDING_TOP + slot as i32 * item_height + 4 + button.height,
                    frame.legend_width - 2 * LEGEND_BOX_BORDER,
                    item_height,
                );
                frame_height += rect.height + 1;
                series.set_legend_rect(Some(rect));
            } else {
                series.set_legend_rect(None);
            }
        }

        self.click_areas.legend_frame =
            Some(Rect::new(frame_x, PADDING_TOP, frame_width, frame_height));
        self.click_areas.legend_button = Some(button);
    }
}
