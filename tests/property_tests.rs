use proptest::prelude::*;
use xyplot_rs::core::{Rect, Rgb, ScaleRequest, ScaleState, SeriesHandle, SeriesStore, YRange};
use xyplot_rs::render::RecordingBackend;
use xyplot_rs::{XyPlot, XyPlotConfig};

fn ramp_plot(points: u32) -> (XyPlot<RecordingBackend>, SeriesHandle) {
    let store = SeriesStore::new();
    let handle = store
        .create_series(points as usize, Rgb::new(0, 0, 0))
        .expect("series");
    for i in 0..points {
        handle.append(f64::from(i), f64::from(i % 7));
    }
    let mut plot = XyPlot::with_store(
        RecordingBackend::new(),
        XyPlotConfig::new(Rect::new(0, 0, 900, 500)),
        store,
    )
    .expect("plot");
    plot.add_series(&handle).expect("attach");
    plot.init_x_range(0.0, f64::from(points - 1));
    plot.paint();
    (plot, handle)
}

proptest! {
    #[test]
    fn scale_covers_the_requested_range(
        min in -1.0e7f64..1.0e7,
        span in 1.0e-3f64..1.0e7,
        max_ticks in 2usize..16
    ) {
        let max = min + span;
        let mut scale = ScaleState::new();
        scale.compute(ScaleRequest::new(min, max, max_ticks).with_axis_span_px(800.0));

        let slack = span * 1e-6 + (min.abs() + max.abs()) * 1e-12;
        prop_assert!(scale.value_min() <= min + slack);
        prop_assert!(scale.value_max() >= max - slack);
        prop_assert!(scale.tick_delta() > 0.0);
        if !scale.tick_bound_exhausted() {
            prop_assert!(scale.tick_count() <= max_ticks);
        }
    }

    #[test]
    fn ring_buffer_keeps_the_newest_samples_and_their_extremes(
        capacity in 1usize..64,
        ys in prop::collection::vec(-1_000.0f64..1_000.0, 0..200)
    ) {
        let store = SeriesStore::new();
        let handle = store.create_series(capacity, Rgb::new(1, 1, 1)).expect("series");
        for (i, &y) in ys.iter().enumerate() {
            handle.append(i as f64, y);
        }

        let kept = &ys[ys.len().saturating_sub(capacity)..];
        prop_assert_eq!(handle.len(), kept.len());
        let stored: Vec<f64> = handle.samples().iter().map(|sample| sample.y).collect();
        prop_assert_eq!(&stored[..], kept);

        let expected = kept.iter().copied().fold(None, |range: Option<YRange>, y| {
            Some(range.map_or(YRange::new(y, y), |r| YRange::new(r.min.min(y), r.max.max(y))))
        });
        prop_assert_eq!(handle.y_range(), expected);
    }

    #[test]
    fn nearest_index_has_the_smallest_distance(
        xs in prop::collection::vec(-1_000.0f64..1_000.0, 1..50),
        position in 0.0f64..=1.0
    ) {
        let mut xs = xs;
        xs.sort_by(f64::total_cmp);
        let store = SeriesStore::new();
        let handle = store.create_series(xs.len(), Rgb::new(1, 1, 1)).expect("series");
        for &x in &xs {
            handle.append(x, 1.0);
        }
        let first = xs[0];
        let last = xs[xs.len() - 1];
        let query = first + (last - first) * position;

        let index = handle.find_nearest_index_by_x(query).expect("non-empty");
        prop_assert!(index < xs.len());
        let best = xs
            .iter()
            .map(|x| (x - query).abs())
            .fold(f64::INFINITY, f64::min);
        prop_assert_eq!((xs[index] - query).abs(), best);
    }

    #[test]
    fn panning_never_leaves_the_overscroll_band(
        moves in prop::collection::vec(-2_000i32..2_000, 1..12)
    ) {
        let (mut plot, _handle) = ramp_plot(500);
        let (start_min, start_max) = plot.x_scale().requested_range();
        let span = start_max - start_min;

        for pixels in moves {
            plot.move_by_pixels(pixels);
            let (min, max) = plot.x_scale().requested_range();
            prop_assert!(min >= -span - 1e-6);
            prop_assert!(max <= 499.0 + span + 1e-6);
            prop_assert!(((max - min) - span).abs() <= 1e-6 * span);
        }
    }

    #[test]
    fn panning_a_wide_window_never_produces_a_range_outside_the_band(
        points in 2u32..60,
        window in 1.0f64..400.0,
        moves in prop::collection::vec(-3_000i32..3_000, 1..10)
    ) {
        let (mut plot, _handle) = ramp_plot(points);
        plot.init_x_range(0.0, window);
        plot.paint();
        let data_span = f64::from(points - 1);

        for pixels in moves {
            let before = plot.x_scale().requested_range();
            plot.move_by_pixels(pixels);
            let (min, max) = plot.x_scale().requested_range();
            if (min, max) != before {
                prop_assert!(min >= -data_span - 1e-6);
                prop_assert!(max <= 2.0 * data_span + 1e-6);
            }
        }
    }

    #[test]
    fn zoom_out_undoes_zoom_in(cursor in 0usize..1_000, depth in 1usize..4) {
        let (mut plot, handle) = ramp_plot(1_000);
        prop_assert!(handle.set_cursor(cursor));
        let original = plot.x_scale().requested_range();

        let mut zoomed = 0;
        for _ in 0..depth {
            if plot.zoom_in() {
                zoomed += 1;
            }
        }
        prop_assert_eq!(plot.zoom_depth(), zoomed);
        for _ in 0..zoomed {
            plot.zoom_out();
        }
        prop_assert_eq!(plot.x_scale().requested_range(), original);
    }
}
