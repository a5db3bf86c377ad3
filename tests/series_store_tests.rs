use std::thread;

use approx::assert_relative_eq;
use xyplot_rs::core::{ManualBounds, Rect, Rgb, SeriesStore, YRange};
use xyplot_rs::render::RecordingBackend;
use xyplot_rs::{XyPlot, XyPlotConfig};

fn red() -> Rgb {
    Rgb::new(200, 0, 0)
}

#[test]
fn ring_buffer_keeps_newest_samples() {
    let store = SeriesStore::new();
    let handle = store.create_series(5, red()).expect("series");
    for i in 0..=6 {
        handle.append(f64::from(i), f64::from(i));
    }

    assert_eq!(handle.len(), 5);
    let xs: Vec<f64> = handle.samples().iter().map(|sample| sample.x).collect();
    assert_eq!(xs, vec![2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(handle.y_range(), Some(YRange::new(2.0, 6.0)));
}

#[test]
fn evicting_an_extreme_rescans_the_range() {
    let store = SeriesStore::new();
    let handle = store.create_series(3, red()).expect("series");
    handle.append(0.0, 100.0);
    handle.append(1.0, 5.0);
    handle.append(2.0, 7.0);
    assert_eq!(handle.y_range(), Some(YRange::new(5.0, 100.0)));

    handle.append(3.0, 6.0);
    assert_eq!(handle.y_range(), Some(YRange::new(5.0, 7.0)));
}

#[test]
fn zero_capacity_is_rejected() {
    let store = SeriesStore::new();
    assert!(store.create_series(0, red()).is_err());
}

#[test]
fn categorical_labels_are_sorted_descending() {
    let store = SeriesStore::new();
    let handle = store.create_series(16, red()).expect("series");
    handle.append_categorical(0.0, "B");
    handle.append_categorical(1.0, "A");

    let labels = handle
        .read(|series| series.labels().to_vec())
        .expect("live series");
    assert_eq!(labels, vec!["B".to_owned(), "A".to_owned()]);
    let ys: Vec<f64> = handle.samples().iter().map(|sample| sample.y).collect();
    assert_eq!(ys, vec![0.0, 1.0]);
}

#[test]
fn inserted_label_reindexes_existing_samples() {
    let store = SeriesStore::new();
    let handle = store.create_series(16, red()).expect("series");
    handle.append_categorical(0.0, "B");
    handle.append_categorical(1.0, "A");
    handle.append_categorical(2.0, "C");

    let labels = handle
        .read(|series| series.labels().to_vec())
        .expect("live series");
    assert_eq!(labels, vec!["C".to_owned(), "B".to_owned(), "A".to_owned()]);
    let ys: Vec<f64> = handle.samples().iter().map(|sample| sample.y).collect();
    assert_eq!(ys, vec![1.0, 2.0, 0.0]);
    assert_eq!(handle.y_range(), Some(YRange::new(0.0, 2.0)));
}

#[test]
fn nearest_index_walks_sorted_x() {
    let store = SeriesStore::new();
    let handle = store.create_series(8, red()).expect("series");
    assert_eq!(handle.find_nearest_index_by_x(1.0), None);

    for x in [0.0, 10.0, 20.0, 30.0] {
        handle.append(x, 1.0);
    }
    assert_eq!(handle.find_nearest_index_by_x(-50.0), Some(0));
    assert_eq!(handle.find_nearest_index_by_x(14.0), Some(1));
    assert_eq!(handle.find_nearest_index_by_x(16.0), Some(2));
    assert_eq!(handle.find_nearest_index_by_x(99.0), Some(3));
}

#[test]
fn manual_bounds_only_extend_the_data_range() {
    let store = SeriesStore::new();
    let handle = store.create_series(8, red()).expect("series");
    handle.append(0.0, 2.0);
    handle.append(1.0, 4.0);

    handle.set_manual_bounds(ManualBounds::MinMax(0.0, 3.0));
    let range = handle
        .read(|series| series.display_y_range())
        .flatten()
        .expect("range");
    assert_relative_eq!(range.min, 0.0);
    assert_relative_eq!(range.max, 4.0);
}

#[test]
fn cursor_follows_eviction() {
    let store = SeriesStore::new();
    let handle = store.create_series(3, red()).expect("series");
    for i in 0..3 {
        handle.append(f64::from(i), 0.0);
    }
    assert!(handle.set_cursor(1));
    handle.append(3.0, 0.0);
    assert_eq!(handle.cursor(), Some(0));
    handle.append(4.0, 0.0);
    assert_eq!(handle.cursor(), Some(0));
}

#[test]
fn clear_drops_samples_and_keeps_the_series() {
    let store = SeriesStore::new();
    let handle = store.create_series(4, red()).expect("series");
    handle.append(0.0, 1.0);
    handle.clear();

    assert!(handle.is_empty());
    assert_eq!(handle.y_range(), None);
    assert_eq!(store.len(), 1);
}

#[test]
fn dropping_every_handle_reclaims_the_series() {
    let store = SeriesStore::new();
    let keep = store.create_series(4, red()).expect("series");
    let dropped = store.create_series(4, red()).expect("series");
    let clone = dropped.clone();
    assert_eq!(store.len(), 2);

    drop(dropped);
    assert_eq!(store.len(), 2);
    drop(clone);
    assert_eq!(store.len(), 1);
    assert!(keep.read(|series| series.len()).is_some());
}

#[test]
fn producers_on_other_threads_share_one_lock() {
    let store = SeriesStore::new();
    let handle = store.create_series(10_000, red()).expect("series");

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let handle = handle.clone();
            thread::spawn(move || {
                for i in 0..500 {
                    handle.append(f64::from(worker * 1_000 + i), 1.0);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("producer thread");
    }
    assert_eq!(handle.len(), 2_000);
}

#[test]
fn appending_to_an_attached_series_wakes_the_plot_once() {
    let store = SeriesStore::new();
    let handle = store.create_series(16, red()).expect("series");
    let backend = RecordingBackend::new();
    let counter = backend.wake_counter();
    let mut plot = XyPlot::with_store(
        backend,
        XyPlotConfig::new(Rect::new(0, 0, 640, 480)),
        store.clone(),
    )
    .expect("plot");

    handle.append(0.0, 0.0);
    assert_eq!(counter.requests(), 0);

    plot.add_series(&handle).expect("attach");
    handle.append(1.0, 1.0);
    handle.append(2.0, 2.0);
    assert_eq!(counter.requests(), 1);

    plot.wake_fired();
    handle.append(3.0, 3.0);
    assert_eq!(counter.requests(), 2);

    assert!(plot.remove_series(&handle));
    plot.wake_fired();
    handle.append(4.0, 4.0);
    assert_eq!(counter.requests(), 2);
}

#[test]
fn series_from_another_store_is_rejected() {
    let store = SeriesStore::new();
    let foreign = SeriesStore::new().create_series(4, red()).expect("series");
    let mut plot = XyPlot::with_store(
        RecordingBackend::new(),
        XyPlotConfig::new(Rect::new(0, 0, 640, 480)),
        store,
    )
    .expect("plot");

    assert!(plot.add_series(&foreign).is_err());
    assert!(plot.series().is_empty());
}
