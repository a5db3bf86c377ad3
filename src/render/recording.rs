use std::sync::{Arc, OnceLock};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use indexmap::IndexMap;

use crate::core::store::SeriesStore;
use crate::core::types::{Point, Rect, Rgb};
use crate::core::wake::WakeTrigger;
use crate::render::{
    BackgroundRole, ButtonGlyph, ColorRole, DrawingBackend, FontWeight, ForegroundRole,
    StrokeStyle,
};

/// One call received by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    SetFont(FontWeight),
    SetFg(ForegroundRole),
    SetFgSeries(usize),
    SetBg(BackgroundRole),
    SetBgSeries(usize),
    SetStroke { style: StrokeStyle, width: u32 },
    Rect(Rect),
    FillRect(Rect),
    RoundRect(Rect),
    FillRoundRect(Rect),
    Background(Rect),
    Line(Point, Point),
    Polyline(Vec<Point>),
    Circle { center: Point, radius: i32 },
    Text { text: String, at: Point },
    Button { rect: Rect, glyph: ButtonGlyph, enabled: bool },
}

/// Wake trigger that only counts requests.
#[derive(Debug, Default)]
pub struct CountingWakeTrigger {
    requests: AtomicUsize,
    requests_under_lock: AtomicUsize,
    watched: OnceLock<SeriesStore>,
}

impl CountingWakeTrigger {
    #[must_use]
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Also counts requests issued while the lock of `store` is held.
    /// Returns `false` if a store is already watched.
    pub fn watch_store(&self, store: SeriesStore) -> bool {
        self.watched.set(store).is_ok()
    }

    #[must_use]
    pub fn requests_under_lock(&self) -> usize {
        self.requests_under_lock.load(Ordering::SeqCst)
    }
}

impl WakeTrigger for CountingWakeTrigger {
    fn request_wake(&self, _delay: Duration) {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.watched.get().is_some_and(SeriesStore::is_locked) {
            self.requests_under_lock.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Headless backend that records every draw call.
///
/// Text metrics are fixed: each character is `char_size.x` wide and
/// `char_size.y` high.
#[derive(Debug)]
pub struct RecordingBackend {
    commands: Vec<DrawCommand>,
    char_size: Point,
    button_aspect_ratio: f32,
    own_button_drawing: bool,
    series_colors: IndexMap<usize, Rgb>,
    role_colors: IndexMap<ColorRole, Rgb>,
    font_sizes: (u32, u32),
    wake: Arc<CountingWakeTrigger>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            char_size: Point::new(8, 16),
            button_aspect_ratio: 1.0,
            own_button_drawing: false,
            series_colors: IndexMap::new(),
            role_colors: IndexMap::new(),
            font_sizes: (10, 12),
            wake: Arc::new(CountingWakeTrigger::default()),
        }
    }
}

impl RecordingBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_char_size(mut self, width: i32, height: i32) -> Self {
        self.char_size = Point::new(width.max(1), height.max(1));
        self
    }

    #[must_use]
    pub fn with_button_aspect_ratio(mut self, ratio: f32) -> Self {
        self.button_aspect_ratio = ratio;
        self
    }

    #[must_use]
    pub fn with_own_button_drawing(mut self, own: bool) -> Self {
        self.own_button_drawing = own;
        self
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// All recorded polylines, in call order.
    #[must_use]
    pub fn polylines(&self) -> Vec<&[Point]> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Polyline(points) => Some(points.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// All recorded text, in call order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Buttons drawn so far, in call order.
    #[must_use]
    pub fn buttons(&self) -> Vec<(Rect, ButtonGlyph, bool)> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Button {
                    rect,
                    glyph,
                    enabled,
                } => Some((*rect, *glyph, *enabled)),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn count(&self, predicate: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|command| predicate(command)).count()
    }

    #[must_use]
    pub fn series_color(&self, slot: usize) -> Option<Rgb> {
        self.series_colors.get(&slot).copied()
    }

    #[must_use]
    pub fn role_color(&self, role: ColorRole) -> Option<Rgb> {
        self.role_colors.get(&role).copied()
    }

    #[must_use]
    pub fn font_sizes(&self) -> (u32, u32) {
        self.font_sizes
    }

    /// Shared counter behind [`DrawingBackend::wake_trigger`].
    #[must_use]
    pub fn wake_counter(&self) -> Arc<CountingWakeTrigger> {
        Arc::clone(&self.wake)
    }
}

impl DrawingBackend for RecordingBackend {
    fn average_char_size(&self) -> Point {
        self.char_size
    }

    fn text_extent(&self, text: &str) -> Point {
        let chars = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
        Point::new(chars.saturating_mul(self.char_size.x), self.char_size.y)
    }

    fn set_font(&mut self, weight: FontWeight) {
        self.commands.push(DrawCommand::SetFont(weight));
    }

    fn set_font_size(&mut self, label_size: u32, title_size: u32) {
        self.font_sizes = (label_size, title_size);
    }

    fn register_series_color(&mut self, slot: usize, color: Rgb) {
        self.series_colors.insert(slot, color);
    }

    fn set_role_color(&mut self, role: ColorRole, color: Rgb) {
        self.role_colors.insert(role, color);
    }

    fn set_fg_color(&mut self, role: ForegroundRole) {
        self.commands.push(DrawCommand::SetFg(role));
    }

    fn set_fg_series_color(&mut self, slot: usize) {
        self.commands.push(DrawCommand::SetFgSeries(slot));
    }

    fn set_bg_color(&mut self, role: BackgroundRole) {
        self.commands.push(DrawCommand::SetBg(role));
    }

    fn set_bg_series_color(&mut self, slot: usize) {
        self.commands.push(DrawCommand::SetBgSeries(slot));
    }

    fn set_stroke(&mut self, style: StrokeStyle, width: u32) {
        self.commands.push(DrawCommand::SetStroke { style, width });
    }

    fn draw_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Rect(rect));
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::FillRect(rect));
    }

    fn draw_round_rect(&mut self, rect: Rect, _radius: i32) {
        self.commands.push(DrawCommand::RoundRect(rect));
    }

    fn fill_round_rect(&mut self, rect: Rect, _radius: i32) {
        self.commands.push(DrawCommand::FillRoundRect(rect));
    }

    fn draw_background(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::Background(rect));
    }

    fn draw_line(&mut self, from: Point, to: Point) {
        self.commands.push(DrawCommand::Line(from, to));
    }

    fn draw_polyline(&mut self, points: &[Point]) {
        self.commands.push(DrawCommand::Polyline(points.to_vec()));
    }

    fn draw_circle(&mut self, center: Point, radius: i32) {
        self.commands.push(DrawCommand::Circle { center, radius });
    }

    fn draw_text(&mut self, text: &str, at: Point) {
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            at,
        });
    }

    fn draw_button_glyph(&mut self, rect: Rect, glyph: ButtonGlyph, enabled: bool) {
        self.commands.push(DrawCommand::Button {
            rect,
            glyph,
            enabled,
        });
    }

    fn draws_own_button(&self, _glyph: ButtonGlyph) -> bool {
        self.own_button_drawing
    }

    fn button_aspect_ratio(&self) -> f32 {
        self.button_aspect_ratio
    }

    fn wake_trigger(&self) -> Arc<dyn WakeTrigger> {
        self.wake.clone()
    }
}
