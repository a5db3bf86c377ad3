mod clip;
mod polyline;
mod primitives;
mod recording;

use std::sync::Arc;

pub use clip::{ClipBounds, clip_segment};
pub use polyline::CurveBatcher;
pub use primitives::{BackgroundRole, ButtonGlyph, ColorRole, FontWeight, ForegroundRole, StrokeStyle};
pub use recording::{CountingWakeTrigger, DrawCommand, RecordingBackend};

use crate::core::types::{Point, Rect, Rgb};
use crate::core::wake::{NoopWakeTrigger, WakeTrigger};

/// Drawing capabilities the plot needs from a host toolkit.
///
/// Coordinates are widget-local pixels. Colors are selected by role or by
/// series slot, the backend owns the concrete palette.
pub trait DrawingBackend {
    /// Average glyph size of the current font (`x` width, `y` height).
    fn average_char_size(&self) -> Point;
    fn text_extent(&self, text: &str) -> Point;

    fn set_font(&mut self, weight: FontWeight);
    fn set_font_size(&mut self, label_size: u32, title_size: u32);

    /// Associates `color` with series slot `slot`.
    fn register_series_color(&mut self, slot: usize, color: Rgb);
    /// Overrides the concrete color behind a semantic role.
    fn set_role_color(&mut self, role: ColorRole, color: Rgb);

    fn set_fg_color(&mut self, role: ForegroundRole);
    fn set_fg_series_color(&mut self, slot: usize);
    fn set_bg_color(&mut self, role: BackgroundRole);
    fn set_bg_series_color(&mut self, slot: usize);
    fn set_stroke(&mut self, style: StrokeStyle, width: u32);

    fn draw_rect(&mut self, rect: Rect);
    fn fill_rect(&mut self, rect: Rect);
    fn draw_round_rect(&mut self, rect: Rect, radius: i32);
    fn fill_round_rect(&mut self, rect: Rect, radius: i32);
    fn draw_background(&mut self, rect: Rect);
    fn draw_line(&mut self, from: Point, to: Point);
    fn draw_polyline(&mut self, points: &[Point]);
    fn draw_circle(&mut self, center: Point, radius: i32);
    fn draw_text(&mut self, text: &str, at: Point);
    fn draw_button_glyph(&mut self, rect: Rect, glyph: ButtonGlyph, enabled: bool);

    /// `true` if the backend paints the whole button for `glyph` itself.
    fn draws_own_button(&self, _glyph: ButtonGlyph) -> bool {
        false
    }

    /// Button height divided by width; `0` means square.
    fn button_aspect_ratio(&self) -> f32 {
        1.0
    }

    /// Hook used to schedule a delayed repaint from producer threads.
    fn wake_trigger(&self) -> Arc<dyn WakeTrigger> {
        Arc::new(NoopWakeTrigger)
    }
}
