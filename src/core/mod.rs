pub mod number_format;
pub mod scale;
pub mod series;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod wake;
pub mod zoom_stack;

pub use number_format::{DecimalFormatter, NumberFormatter, exponent_caption};
pub use scale::{ScaleRequest, ScaleState, TickDivisor, max_ticks_for_height, max_ticks_for_width};
pub use series::{Extremes, MISSING_TEXT, ManualBounds, Series};
pub use snapshot::{PlotSnapshot, SeriesSnapshot};
pub use store::{SeriesHandle, SeriesId, SeriesStore, StoreGuard};
pub use types::{Point, Rect, Rgb, Sample, YRange};
pub use wake::{MIN_REARM_INTERVAL, NoopWakeTrigger, WakeScheduler, WakeTrigger};
pub use zoom_stack::{ZOOM_STACK_CAPACITY, ZoomRange, ZoomStack};
