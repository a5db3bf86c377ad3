use approx::assert_relative_eq;
use xyplot_rs::core::{ScaleRequest, ScaleState, exponent_caption, max_ticks_for_width};

#[test]
fn thousand_range_picks_a_nice_delta_within_the_tick_limit() {
    let mut scale = ScaleState::new();
    scale.compute(ScaleRequest::new(0.0, 1234.0, 5));

    assert_eq!(scale.display_exponent(), 0);
    assert!((3..=5).contains(&scale.tick_count()));
    assert!([100.0, 200.0, 500.0, 1000.0].contains(&scale.tick_delta()));
    let (tick_min, tick_max) = scale.tick_range();
    assert!(tick_min <= 0.0);
    assert!(tick_max >= 1234.0);
}

#[test]
fn identical_requests_are_idempotent() {
    let mut scale = ScaleState::new();
    let request = ScaleRequest::new(-12.5, 87.25, 8).with_axis_span_px(640.0);

    assert!(scale.compute(request));
    let first = scale;
    for _ in 0..3 {
        assert!(!scale.compute(request));
    }
    assert_eq!(scale, first);
}

#[test]
fn pixel_factor_spans_the_axis() {
    let mut scale = ScaleState::new();
    scale.compute(
        ScaleRequest::new(0.0, 250.0, 6)
            .with_axis_span_px(500.0)
            .tracking_exact_range(true),
    );
    assert_relative_eq!(scale.pixels_per_unit(), 2.0);

    scale.fit_to_pixels(0.0);
    assert_eq!(scale.pixels_per_unit(), 0.0);
}

#[test]
fn degenerate_ranges_stay_finite() {
    for value in [0.0, 1.0, -3.5, 1e9, 1e-9] {
        let mut scale = ScaleState::new();
        scale.compute(ScaleRequest::new(value, value, 6).with_axis_span_px(200.0));

        assert!(scale.value_min() < scale.value_max(), "value {value}");
        assert!(scale.tick_delta().is_finite() && scale.tick_delta() > 0.0);
        assert!(scale.pixels_per_unit().is_finite());
    }
}

#[test]
fn tick_count_respects_the_limit_for_common_ranges() {
    let ranges = [(0.0, 1.0), (0.0, 7.0), (-40.0, 40.0), (3.0, 97.0), (0.0, 1e6)];
    for (min, max) in ranges {
        for max_ticks in 2..=12 {
            let mut scale = ScaleState::new();
            scale.compute(ScaleRequest::new(min, max, max_ticks));
            if !scale.tick_bound_exhausted() {
                assert!(
                    scale.tick_count() <= max_ticks,
                    "range {min}..{max} with {max_ticks} ticks gave {}",
                    scale.tick_count()
                );
            }
        }
    }
}

#[test]
fn ticks_cover_the_shown_range() {
    let mut scale = ScaleState::new();
    scale.compute(ScaleRequest::new(13.0, 211.0, 7));

    let factor = scale.display_factor();
    let ticks: Vec<f64> = scale.tick_values().map(|tick| tick * factor).collect();
    let first = ticks.first().copied().expect("ticks");
    let last = ticks.last().copied().expect("ticks");
    assert!(first <= 13.0);
    assert!(last >= 211.0);
    assert!(ticks.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn exact_tracking_restores_the_requested_range_bit_for_bit() {
    let mut scale = ScaleState::new();
    let (min, max) = (0.1 + 0.2, 1.0 / 3.0 + 10.0);
    scale.compute(ScaleRequest::new(min, max, 6).tracking_exact_range(true));

    assert_eq!(scale.requested_range(), (min, max));
    assert_eq!(scale.requested_span(), max - min);
}

#[test]
fn exponent_captions_cover_both_directions() {
    assert_eq!(exponent_caption(0), "");
    assert_eq!(exponent_caption(3), " x 1000");
    assert_eq!(exponent_caption(-2), " x 0.01");
    assert_eq!(exponent_caption(9), " x 1E9");
}

#[test]
fn wider_axes_allow_more_ticks() {
    assert!(max_ticks_for_width(1600, 8) > max_ticks_for_width(800, 8));
}
