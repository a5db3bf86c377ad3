//! xyplot-rs: headless core of an embeddable XY plot widget.
//!
//! Producers append samples to [`core::SeriesHandle`]s from any thread; the
//! host toolkit owns an [`XyPlot`], forwards pointer and key input to it and
//! lets it paint through a [`render::DrawingBackend`]. Only samples appended
//! since the previous paint are drawn unless a scale or the layout changed.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{RepaintKind, XyPlot, XyPlotConfig};
pub use error::{PlotError, PlotResult};
