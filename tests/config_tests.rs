use std::time::Duration;

use xyplot_rs::api::{DEFAULT_UPDATE_DELAY_MS, MIN_UPDATE_DELAY_MS};
use xyplot_rs::core::{Rect, SeriesStore};
use xyplot_rs::render::RecordingBackend;
use xyplot_rs::{PlotError, XyPlot, XyPlotConfig};

#[test]
fn defaults_match_a_running_widget() {
    let config = XyPlotConfig::new(Rect::new(0, 0, 320, 240));
    assert_eq!(config.update_delay_ms, DEFAULT_UPDATE_DELAY_MS);
    assert!(config.smooth_scroll);
    assert!(config.start_button_visible);
    assert!(!config.save_button_visible);
    assert!(!config.zoom_box);
    assert!(config.validate().is_ok());
}

#[test]
fn empty_bounds_are_rejected() {
    let config = XyPlotConfig::new(Rect::new(0, 0, 0, 240));
    let result = XyPlot::with_store(RecordingBackend::new(), config, SeriesStore::new());
    assert!(matches!(
        result.err(),
        Some(PlotError::InvalidBounds { width: 0, height: 240 })
    ));
}

#[test]
fn builder_floors_the_update_delay() {
    let config = XyPlotConfig::new(Rect::new(0, 0, 320, 240)).with_update_delay_ms(1);
    assert_eq!(config.update_delay_ms, MIN_UPDATE_DELAY_MS);
}

#[test]
fn deserialized_delay_below_the_floor_fails_validation() {
    let json = r#"{"bounds":{"x":0,"y":0,"width":320,"height":240},"update_delay_ms":2}"#;
    let config: XyPlotConfig = serde_json::from_str(json).expect("config json");
    assert!(matches!(config.validate(), Err(PlotError::InvalidConfig(_))));
}

#[test]
fn omitted_fields_take_their_defaults() {
    let json = r#"{"bounds":{"x":0,"y":0,"width":320,"height":240}}"#;
    let config: XyPlotConfig = serde_json::from_str(json).expect("config json");
    assert_eq!(config, XyPlotConfig::new(Rect::new(0, 0, 320, 240)));
}

#[test]
fn legend_cannot_start_expanded_while_hidden() {
    let config = XyPlotConfig::new(Rect::new(0, 0, 320, 240)).with_legend(false, true);
    assert!(!config.legend_expanded);
}

#[test]
fn runtime_setters_update_the_view_state() {
    let mut plot = XyPlot::with_store(
        RecordingBackend::new(),
        XyPlotConfig::new(Rect::new(0, 0, 320, 240)),
        SeriesStore::new(),
    )
    .expect("plot");

    plot.set_update_delay(Duration::from_millis(2));
    assert_eq!(plot.view_state().update_delay(), Duration::from_millis(10));

    plot.set_legend_expanded(true);
    assert!(plot.view_state().legend_expanded());
    plot.set_legend_visible(false);
    assert!(!plot.view_state().legend_visible());
    assert!(!plot.view_state().legend_expanded());

    assert!(plot.set_bounds(Rect::new(0, 0, -1, 10)).is_err());
    assert!(plot.set_bounds(Rect::new(5, 5, 400, 300)).is_ok());
    assert_eq!(plot.bounds(), Rect::new(5, 5, 400, 300));
}
