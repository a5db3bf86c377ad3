use crate::core::scale::ScaleState;
use crate::core::types::Point;
use crate::render::DrawingBackend;

use super::XyPlot;
use super::layout::AxisFrame;

/// X value under pixel column `px`. Returns the axis minimum while the
/// pixel factor is not known yet.
#[must_use]
pub fn screen_to_value_x(frame: &AxisFrame, x_scale: &ScaleState, px: i32) -> f64 {
    let factor = x_scale.pixels_per_unit();
    if factor == 0.0 {
        return x_scale.value_min();
    }
    f64::from(px - frame.left) / factor + x_scale.value_min()
}

#[must_use]
pub fn value_to_screen_x(frame: &AxisFrame, x_scale: &ScaleState, x: f64) -> i32 {
    ((x - x_scale.value_min()) * x_scale.pixels_per_unit() + f64::from(frame.left)) as i32
}

#[must_use]
pub fn value_to_screen_y(frame: &AxisFrame, y_scale: &ScaleState, y: f64) -> i32 {
    (f64::from(frame.bottom) - (y - y_scale.value_min()) * y_scale.pixels_per_unit()) as i32
}

#[must_use]
pub fn value_to_screen(
    frame: &AxisFrame,
    x_scale: &ScaleState,
    y_scale: &ScaleState,
    x: f64,
    y: f64,
) -> Point {
    Point::new(
        value_to_screen_x(frame, x_scale, x),
        value_to_screen_y(frame, y_scale, y),
    )
}

impl<B: DrawingBackend> XyPlot<B> {
    /// X value under the widget-local pixel column `px`, or `None` before
    /// the first layout pass.
    #[must_use]
    pub fn screen_to_value_x(&self, px: i32) -> Option<f64> {
        self.frame
            .map(|frame| screen_to_value_x(&frame, &self.x_scale, px))
    }

    /// Widget-local pixel of `(x, y)` on the Y scale of series `slot`.
    #[must_use]
    pub fn value_to_screen(&self, slot: usize, x: f64, y: f64) -> Option<Point> {
        let frame = self.frame?;
        let y_scale = self.series.get(slot)?.read(|series| *series.y_scale())?;
        Some(value_to_screen(&frame, &self.x_scale, &y_scale, x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scale::ScaleRequest;

    fn frame() -> AxisFrame {
        AxisFrame {
            left: 50,
            right: 250,
            top: 10,
            bottom: 110,
            legend_width: 0,
        }
    }

    fn scale(min: f64, max: f64, span: f64) -> ScaleState {
        let mut scale = ScaleState::new();
        scale.compute(
            ScaleRequest::new(min, max, 10)
                .with_axis_span_px(span)
                .tracking_exact_range(true),
        );
        scale
    }

    #[test]
    fn maps_corners_of_the_plot_area() {
        let frame = frame();
        let x_scale = scale(0.0, 100.0, 200.0);
        let y_scale = scale(0.0, 10.0, 100.0);

        assert_eq!(value_to_screen(&frame, &x_scale, &y_scale, 0.0, 0.0), Point::new(50, 110));
        assert_eq!(value_to_screen(&frame, &x_scale, &y_scale, 100.0, 10.0), Point::new(250, 10));
        assert_eq!(value_to_screen(&frame, &x_scale, &y_scale, 50.0, 5.0), Point::new(150, 60));
    }

    #[test]
    fn screen_to_value_inverts_x_mapping() {
        let frame = frame();
        let x_scale = scale(0.0, 100.0, 200.0);
        assert!((screen_to_value_x(&frame, &x_scale, 150) - 50.0).abs() <= 1e-9);
        assert!((screen_to_value_x(&frame, &x_scale, 50) - 0.0).abs() <= 1e-9);
    }

    #[test]
    fn unknown_pixel_factor_yields_axis_minimum() {
        let x_scale = scale(20.0, 40.0, 0.0);
        assert!((screen_to_value_x(&frame(), &x_scale, 999) - 20.0).abs() <= 1e-9);
    }
}
