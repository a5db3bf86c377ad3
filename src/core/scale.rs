use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// Largest decade exponent still displayed without a separate exponent caption.
pub const NON_EXPONENT_MAX: i32 = 3;
/// Smallest decade exponent still displayed without a separate exponent caption.
pub const NON_EXPONENT_MIN: i32 = -2;
/// Requested spans narrower than this are treated as flat data.
pub const DEGENERATE_SPAN_EPSILON: f64 = 1e-20;
/// Flat data is widened to this fraction of its magnitude (or to this absolute span at zero).
pub const DEGENERATE_SPAN_RATIO: f64 = 0.1;
/// Upper bound for the tick correction loop.
pub const MAX_TICK_ITERATIONS: usize = 10;
/// Estimated label width on the X axis, in average characters.
pub const X_LABEL_WIDTH_CHARS: i32 = 25;
/// Estimated label pitch on the Y axis, in text lines.
pub const Y_LABEL_PITCH_LINES: i32 = 4;

/// Multiplier most recently applied to the tick delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickDivisor {
    Ten,
    Five,
    Two,
    /// Advanced to the next value of the 1-2-5 sequence because no divisor fit.
    NiceStep,
}

const TICK_DIVISORS: [(TickDivisor, f64); 3] = [
    (TickDivisor::Ten, 10.0),
    (TickDivisor::Five, 5.0),
    (TickDivisor::Two, 2.0),
];

/// Input of one scale computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRequest {
    pub min: f64,
    pub max: f64,
    pub max_ticks: usize,
    /// Pixel length of the axis; `0` before the first layout pass.
    pub axis_span_px: f64,
    /// Show exactly the requested range instead of snapping to tick bounds.
    pub track_exact_range: bool,
}

impl ScaleRequest {
    #[must_use]
    pub fn new(min: f64, max: f64, max_ticks: usize) -> Self {
        Self {
            min,
            max,
            max_ticks,
            axis_span_px: 0.0,
            track_exact_range: false,
        }
    }

    #[must_use]
    pub fn with_axis_span_px(mut self, axis_span_px: f64) -> Self {
        self.axis_span_px = axis_span_px;
        self
    }

    #[must_use]
    pub fn tracking_exact_range(mut self, track: bool) -> Self {
        self.track_exact_range = track;
        self
    }
}

/// Number of labelled ticks that fit on a horizontal axis.
#[must_use]
pub fn max_ticks_for_width(width_px: i32, avg_char_width: i32) -> usize {
    let label_width = avg_char_width.max(1) * X_LABEL_WIDTH_CHARS;
    (width_px.max(0) / label_width) as usize + 1
}

/// Number of labelled ticks that fit on a vertical axis.
#[must_use]
pub fn max_ticks_for_height(height_px: i32, avg_char_height: i32) -> usize {
    let label_pitch = avg_char_height.max(1) * Y_LABEL_PITCH_LINES;
    (height_px.max(0) / label_pitch) as usize + 1
}

/// Scaling state of one axis.
///
/// `shown_*`, `tick_*` and the delta are expressed in display units, i.e. divided
/// by `10^display_exponent`. `value_min`/`value_max` are true units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScaleState {
    requested_min: f64,
    requested_max: f64,
    shown_min: f64,
    shown_max: f64,
    tick_min: f64,
    tick_max: f64,
    tick_delta: f64,
    tick_count: usize,
    max_ticks: usize,
    tick_divisor: Option<TickDivisor>,
    display_exponent: i32,
    integer_digits: u32,
    fraction_digits: u32,
    glyph_width: u32,
    value_min: f64,
    value_max: f64,
    pixels_per_unit: f64,
    categorical: bool,
    tick_bound_exhausted: bool,
}

struct TickPlan {
    delta: f64,
    divisor: Option<TickDivisor>,
    exhausted: bool,
}

impl ScaleState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state for a switch-label axis.
    #[must_use]
    pub fn categorical() -> Self {
        Self {
            categorical: true,
            ..Self::default()
        }
    }

    /// Recomputes the tick layout for `request` and reports whether anything
    /// the axes depend on moved.
    ///
    /// A `true` result means background and axes need a full repaint; `false`
    /// lets the caller draw only newly appended points.
    pub fn compute(&mut self, request: ScaleRequest) -> bool {
        if !request.min.is_finite() || !request.max.is_finite() {
            warn!(
                min = request.min,
                max = request.max,
                "ignoring non-finite scale request"
            );
            return false;
        }

        let (mut min, mut max) = if request.min <= request.max {
            (request.min, request.max)
        } else {
            (request.max, request.min)
        };
        if !(max - min).is_finite() {
            warn!(min, max, "ignoring scale request with overflowing span");
            return false;
        }

        self.requested_min = request.min;
        self.requested_max = request.max;

        if max - min < DEGENERATE_SPAN_EPSILON {
            (min, max) = widen_degenerate(min, max);
        }

        let mut exponent = decade_exponent(max - min);
        let mut display_exponent = 0;
        if !(NON_EXPONENT_MIN..=NON_EXPONENT_MAX).contains(&exponent) {
            display_exponent = exponent;
            let factor = pow10(display_exponent);
            min /= factor;
            max /= factor;
            exponent = 0;
        }

        let plan = fit_tick_delta(min, max, pow10(exponent) / 10.0, request.max_ticks);
        if plan.exhausted {
            warn!(
                min,
                max,
                max_ticks = request.max_ticks,
                delta = plan.delta,
                "tick correction loop reached its iteration cap"
            );
        }

        let mut delta = plan.delta;
        if self.categorical && delta < 1.0 {
            delta = 1.0;
        }

        let integer_digits = integer_digits(max);
        let fraction_digits = if exponent <= 0 {
            fraction_digits(delta)
        } else {
            0
        };
        let sign_width = if min < 0.0 || max < 0.0 { 3 } else { 2 };

        let tick_min = snap_down(min, delta);
        let tick_max = snap_up(max, delta);
        let tolerance = delta / 10.0;

        let mut changed = (tick_min - self.tick_min).abs() > tolerance
            || (tick_max - self.tick_max).abs() > tolerance
            || delta != self.tick_delta
            || display_exponent != self.display_exponent
            || integer_digits != self.integer_digits
            || fraction_digits != self.fraction_digits;

        let (shown_min, shown_max) = if request.track_exact_range {
            (min, max)
        } else {
            (tick_min, tick_max)
        };
        if shown_min != self.shown_min || shown_max != self.shown_max {
            changed = true;
        }

        let factor = pow10(display_exponent);
        self.shown_min = shown_min;
        self.shown_max = shown_max;
        self.tick_min = tick_min;
        self.tick_max = tick_max;
        self.tick_delta = delta;
        self.tick_count = ((tick_max - tick_min) / delta).round() as usize + 1;
        self.max_ticks = request.max_ticks;
        self.tick_divisor = plan.divisor;
        self.tick_bound_exhausted = plan.exhausted;
        self.display_exponent = display_exponent;
        self.integer_digits = integer_digits;
        self.fraction_digits = fraction_digits;
        self.glyph_width = integer_digits + fraction_digits + sign_width;
        self.value_min = shown_min * factor;
        self.value_max = shown_max * factor;
        self.fit_to_pixels(request.axis_span_px);

        trace!(
            changed,
            delta,
            tick_count = self.tick_count,
            display_exponent,
            value_min = self.value_min,
            value_max = self.value_max,
            "scale computed"
        );
        changed
    }

    /// Recomputes the pixel factor for an axis of `axis_span_px` pixels.
    ///
    /// Leaves the factor at `0` while the pixel span or value span is empty.
    pub fn fit_to_pixels(&mut self, axis_span_px: f64) {
        let value_span = self.value_max - self.value_min;
        self.pixels_per_unit = if value_span > 0.0 && axis_span_px > 0.0 {
            axis_span_px / value_span
        } else {
            0.0
        };
    }

    pub(crate) fn set_categorical(&mut self, categorical: bool) {
        self.categorical = categorical;
    }

    pub(crate) fn reset_shown_range(&mut self) {
        self.shown_min = 0.0;
        self.shown_max = 0.0;
        self.categorical = false;
    }

    /// Tick positions in display units, lowest first.
    pub fn tick_values(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.tick_count).map(move |i| self.tick_min + i as f64 * self.tick_delta)
    }

    /// Factor converting display units back to true units.
    #[must_use]
    pub fn display_factor(&self) -> f64 {
        pow10(self.display_exponent)
    }

    #[must_use]
    pub fn requested_range(&self) -> (f64, f64) {
        (self.requested_min, self.requested_max)
    }

    #[must_use]
    pub fn requested_span(&self) -> f64 {
        self.requested_max - self.requested_min
    }

    #[must_use]
    pub fn shown_range(&self) -> (f64, f64) {
        (self.shown_min, self.shown_max)
    }

    #[must_use]
    pub fn tick_range(&self) -> (f64, f64) {
        (self.tick_min, self.tick_max)
    }

    #[must_use]
    pub fn tick_delta(&self) -> f64 {
        self.tick_delta
    }

    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.tick_count
    }

    #[must_use]
    pub fn max_ticks(&self) -> usize {
        self.max_ticks
    }

    #[must_use]
    pub fn tick_divisor(&self) -> Option<TickDivisor> {
        self.tick_divisor
    }

    /// `true` when the last computation stopped at the iteration cap with
    /// more ticks than allowed.
    #[must_use]
    pub fn tick_bound_exhausted(&self) -> bool {
        self.tick_bound_exhausted
    }

    #[must_use]
    pub fn display_exponent(&self) -> i32 {
        self.display_exponent
    }

    #[must_use]
    pub fn integer_digits(&self) -> u32 {
        self.integer_digits
    }

    #[must_use]
    pub fn fraction_digits(&self) -> u32 {
        self.fraction_digits
    }

    /// Estimated label width in glyphs, used to size the Y label gutter.
    #[must_use]
    pub fn glyph_width(&self) -> u32 {
        self.glyph_width
    }

    #[must_use]
    pub fn value_min(&self) -> f64 {
        self.value_min
    }

    #[must_use]
    pub fn value_max(&self) -> f64 {
        self.value_max
    }

    #[must_use]
    pub fn pixels_per_unit(&self) -> f64 {
        self.pixels_per_unit
    }

    #[must_use]
    pub fn is_categorical(&self) -> bool {
        self.categorical
    }
}

fn widen_degenerate(min: f64, max: f64) -> (f64, f64) {
    let center = (min + max) / 2.0;
    let mut span = min.abs().max(max.abs()) * DEGENERATE_SPAN_RATIO;
    if !(span > 0.0) {
        span = DEGENERATE_SPAN_RATIO;
    }
    (center - span / 2.0, center + span / 2.0)
}

fn fit_tick_delta(min: f64, max: f64, initial_delta: f64, max_ticks: usize) -> TickPlan {
    let limit = max_ticks.max(1);
    let mut delta = initial_delta;
    let mut count = snapped_tick_count(min, max, delta);
    let mut divisor = None;
    let mut iterations = 0;

    while count > limit {
        if iterations == MAX_TICK_ITERATIONS {
            return TickPlan {
                delta,
                divisor,
                exhausted: true,
            };
        }
        iterations += 1;

        let (chosen, factor) = TICK_DIVISORS
            .iter()
            .copied()
            .find(|(_, factor)| count as f64 >= factor * limit as f64)
            .unwrap_or_else(|| (TickDivisor::NiceStep, next_nice_delta(delta) / delta));
        delta *= factor;
        divisor = Some(chosen);
        count = snapped_tick_count(min, max, delta);
    }

    TickPlan {
        delta,
        divisor,
        exhausted: false,
    }
}

/// Smallest value of the 1-2-5 sequence strictly above `delta`.
fn next_nice_delta(delta: f64) -> f64 {
    let decade = pow10(decade_exponent(delta));
    [1.0, 2.0, 5.0, 10.0]
        .into_iter()
        .map(|mantissa| mantissa * decade)
        .find(|candidate| *candidate > delta * (1.0 + 1e-9))
        .unwrap_or(20.0 * decade)
}

fn snapped_tick_count(min: f64, max: f64, delta: f64) -> usize {
    ((snap_up(max, delta) - snap_down(min, delta)) / delta).round() as usize + 1
}

fn snap_down(value: f64, delta: f64) -> f64 {
    let snapped = (value / delta).round() * delta;
    if value < snapped - delta * 1e-9 {
        snapped - delta
    } else {
        snapped
    }
}

fn snap_up(value: f64, delta: f64) -> f64 {
    let snapped = (value / delta).round() * delta;
    if value > snapped + delta * 1e-9 {
        snapped + delta
    } else {
        snapped
    }
}

fn decade_exponent(value: f64) -> i32 {
    value.log10().floor() as i32
}

fn integer_digits(max: f64) -> u32 {
    let magnitude = max.abs();
    if magnitude == 0.0 {
        return 1;
    }
    let digits = magnitude.log10().round() as i32;
    digits.max(1) as u32
}

fn fraction_digits(delta: f64) -> u32 {
    if delta >= 1.0 - 1e-9 {
        return 0;
    }
    (0.499 + delta.log10().abs()).round() as u32
}

fn pow10(exponent: i32) -> f64 {
    10f64.powi(exponent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_identical_request_reports_no_change() {
        let mut state = ScaleState::new();
        let request = ScaleRequest::new(3.0, 97.0, 6).with_axis_span_px(400.0);

        assert!(state.compute(request));
        let snapshot = state;
        assert!(!state.compute(request));
        assert_eq!(state, snapshot);
    }

    #[test]
    fn thousand_range_stays_unscaled_and_fits_tick_limit() {
        let mut state = ScaleState::new();
        state.compute(ScaleRequest::new(0.0, 1234.0, 5));

        assert_eq!(state.display_exponent(), 0);
        assert_eq!(state.tick_delta(), 500.0);
        assert_eq!(state.tick_count(), 4);
        assert_eq!(state.tick_range(), (0.0, 1500.0));
        assert_eq!(state.tick_divisor(), Some(TickDivisor::NiceStep));
        assert_eq!(state.integer_digits(), 3);
        assert_eq!(state.fraction_digits(), 0);
        assert_eq!(state.glyph_width(), 5);
    }

    #[test]
    fn large_values_switch_to_scaled_display() {
        let mut state = ScaleState::new();
        state.compute(ScaleRequest::new(0.0, 250_000.0, 6));

        assert_eq!(state.display_exponent(), 5);
        assert!(state.tick_count() <= 6);
        let (tmin, tmax) = state.tick_range();
        assert!(tmin <= 0.0 && tmax >= 2.5);
        assert!((state.value_max() - state.shown_range().1 * 1e5).abs() < 1e-6);
    }

    #[test]
    fn small_values_switch_to_negative_exponent() {
        let mut state = ScaleState::new();
        state.compute(ScaleRequest::new(0.0, 0.0004, 6));

        assert_eq!(state.display_exponent(), -4);
        assert!(state.value_max() >= 0.0004 - 1e-12);
    }

    #[test]
    fn flat_data_is_widened_without_nan() {
        let mut state = ScaleState::new();
        state.compute(ScaleRequest::new(42.0, 42.0, 6).with_axis_span_px(300.0));

        assert!(state.value_min() < 42.0);
        assert!(state.value_max() > 42.0);
        assert!(state.pixels_per_unit().is_finite());
        assert!(state.pixels_per_unit() > 0.0);

        let mut zero = ScaleState::new();
        zero.compute(ScaleRequest::new(0.0, 0.0, 6));
        assert!(zero.value_min() < 0.0 && zero.value_max() > 0.0);
        assert!(zero.tick_delta().is_finite());
    }

    #[test]
    fn negative_values_widen_glyph_estimate() {
        let mut positive = ScaleState::new();
        positive.compute(ScaleRequest::new(10.0, 90.0, 6));
        let mut negative = ScaleState::new();
        negative.compute(ScaleRequest::new(-90.0, -10.0, 6));

        assert_eq!(positive.integer_digits(), negative.integer_digits());
        assert_eq!(negative.glyph_width(), positive.glyph_width() + 1);
    }

    #[test]
    fn tracking_exact_range_keeps_requested_bounds() {
        let mut state = ScaleState::new();
        state.compute(ScaleRequest::new(3.3, 47.1, 6).tracking_exact_range(true));

        assert_eq!(state.shown_range(), (3.3, 47.1));
        assert_eq!(state.value_min(), 3.3);

        let mut snapped = ScaleState::new();
        snapped.compute(ScaleRequest::new(3.3, 47.1, 6));
        assert_eq!(snapped.shown_range(), snapped.tick_range());
    }

    #[test]
    fn tracking_a_moving_window_reports_change_each_step() {
        let mut state = ScaleState::new();
        state.compute(ScaleRequest::new(0.0, 100.0, 6).tracking_exact_range(true));
        assert!(state.compute(ScaleRequest::new(0.5, 100.5, 6).tracking_exact_range(true)));
    }

    #[test]
    fn categorical_axis_never_uses_fractional_ticks() {
        let mut state = ScaleState::categorical();
        state.compute(ScaleRequest::new(0.0, 1.0, 12));

        assert!(state.tick_delta() >= 1.0);
        assert_eq!(state.tick_count(), 2);
        assert!(state.tick_values().all(|v| v.fract() == 0.0));
    }

    #[test]
    fn non_finite_request_leaves_state_untouched() {
        let mut state = ScaleState::new();
        state.compute(ScaleRequest::new(0.0, 10.0, 6));
        let before = state;

        assert!(!state.compute(ScaleRequest::new(f64::NAN, 10.0, 6)));
        assert!(!state.compute(ScaleRequest::new(0.0, f64::INFINITY, 6)));
        assert_eq!(state, before);
    }

    #[test]
    fn single_tick_limit_exhausts_the_correction_loop() {
        let mut state = ScaleState::new();
        state.compute(ScaleRequest::new(0.0, 1234.0, 1));

        assert!(state.tick_bound_exhausted());
        assert!(state.tick_count() > 1);
    }

    #[test]
    fn reversed_request_is_ordered() {
        let mut state = ScaleState::new();
        state.compute(ScaleRequest::new(100.0, 0.0, 6));
        assert!(state.value_min() <= state.value_max());
        assert_eq!(state.requested_range(), (100.0, 0.0));
    }

    #[test]
    fn next_nice_delta_walks_one_two_five() {
        assert!((next_nice_delta(1.0) - 2.0).abs() < 1e-12);
        assert!((next_nice_delta(2.0) - 5.0).abs() < 1e-12);
        assert!((next_nice_delta(5.0) - 10.0).abs() < 1e-12);
        assert!((next_nice_delta(0.4) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn max_tick_helpers_follow_label_size() {
        assert_eq!(max_ticks_for_width(800, 8), 5);
        assert_eq!(max_ticks_for_height(640, 16), 11);
        assert_eq!(max_ticks_for_width(100, 0), 5);
    }
}
