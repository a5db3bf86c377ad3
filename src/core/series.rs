use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::scale::ScaleState;
use crate::core::types::{Rect, Rgb, Sample, YRange};
use crate::error::{PlotError, PlotResult};

/// Placeholder shown for a missing legend text or unit.
pub const MISSING_TEXT: &str = "-";

/// Running Y extremes and the sample indices holding them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extremes {
    pub min: f64,
    pub max: f64,
    pub min_index: usize,
    pub max_index: usize,
}

/// Caller-imposed Y bounds. They extend the data range, they never shrink it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ManualBounds {
    #[default]
    None,
    Min(f64),
    MinMax(f64, f64),
}

/// Fixed-capacity ring buffer of samples plus the per-curve display state.
#[derive(Debug, Clone)]
pub struct Series {
    samples: VecDeque<Sample>,
    capacity: usize,
    extremes: Option<Extremes>,
    cursor: Option<usize>,
    manual_bounds: ManualBounds,
    labels: Vec<String>,
    new_values: usize,
    other_changes: bool,
    legend: Option<String>,
    unit: Option<String>,
    color: Rgb,
    auto_scale: bool,
    legend_rect: Option<Rect>,
    visible_points: usize,
    last_drawn: usize,
    y_scale: ScaleState,
}

impl Series {
    pub fn new(capacity: usize, color: Rgb) -> PlotResult<Self> {
        if capacity == 0 {
            return Err(PlotError::InvalidCapacity(capacity));
        }
        Ok(Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            extremes: None,
            cursor: None,
            manual_bounds: ManualBounds::None,
            labels: Vec::new(),
            new_values: 0,
            other_changes: false,
            legend: None,
            unit: None,
            color,
            auto_scale: true,
            legend_rect: None,
            visible_points: 0,
            last_drawn: 0,
            y_scale: ScaleState::new(),
        })
    }

    /// Appends one sample and returns the number of stored samples.
    ///
    /// At capacity the oldest sample is evicted and every cached index moves
    /// down by one. Evicting the sample holding an extreme triggers a rescan.
    pub fn append(&mut self, x: f64, y: f64) -> usize {
        self.push_sample(Sample::new(x, y));
        trace!(x, y, count = self.samples.len(), "append sample");
        self.samples.len()
    }

    /// Appends a sample whose Y value is the index of `label` in the
    /// descending label list. Returns the number of known labels.
    pub fn append_categorical(&mut self, x: f64, label: &str) -> usize {
        let index = match self.labels.iter().position(|known| known == label) {
            Some(index) => index,
            None => self.insert_label(label),
        };
        self.y_scale.set_categorical(true);
        self.push_sample(Sample::new(x, index as f64));
        self.labels.len()
    }

    fn insert_label(&mut self, label: &str) -> usize {
        let index = self
            .labels
            .iter()
            .position(|known| known.as_str() < label)
            .unwrap_or(self.labels.len());
        self.labels.insert(index, label.to_owned());

        let threshold = index as f64;
        let mut shifted = false;
        for sample in &mut self.samples {
            if sample.y >= threshold {
                sample.y += 1.0;
                shifted = true;
            }
        }
        if shifted {
            self.rescan_extremes();
        }
        self.other_changes = true;
        index
    }

    fn push_sample(&mut self, sample: Sample) {
        let mut rescan = false;
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
            if let Some(extremes) = &mut self.extremes {
                if extremes.min_index == 0 || extremes.max_index == 0 {
                    rescan = true;
                } else {
                    extremes.min_index -= 1;
                    extremes.max_index -= 1;
                }
            }
            self.cursor = self.cursor.map(|cursor| cursor.saturating_sub(1));
            self.last_drawn = self.last_drawn.saturating_sub(1);
        }

        self.samples.push_back(sample);
        if rescan {
            self.rescan_extremes();
        } else {
            self.track_extremes(self.samples.len() - 1, sample.y);
        }
        self.new_values += 1;
    }

    fn track_extremes(&mut self, index: usize, y: f64) {
        if !y.is_finite() {
            return;
        }
        match &mut self.extremes {
            Some(extremes) => {
                if y < extremes.min {
                    extremes.min = y;
                    extremes.min_index = index;
                }
                if y > extremes.max {
                    extremes.max = y;
                    extremes.max_index = index;
                }
            }
            None => {
                self.extremes = Some(Extremes {
                    min: y,
                    max: y,
                    min_index: index,
                    max_index: index,
                });
            }
        }
    }

    fn rescan_extremes(&mut self) {
        self.extremes = scan_extremes(self.samples.iter().enumerate());
    }

    /// Overwrites the Y values of the first `min(len, ys.len())` samples.
    pub fn replace_all_y(&mut self, ys: &[f64]) {
        for (sample, y) in self.samples.iter_mut().zip(ys) {
            sample.y = *y;
        }
        self.rescan_extremes();
        self.other_changes = true;
    }

    /// Flags the newest sample so no line connects it to the next one.
    pub fn mark_segment_break(&mut self) -> bool {
        match self.samples.back_mut() {
            Some(last) => {
                last.segment_break = true;
                true
            }
            None => false,
        }
    }

    /// Index of the sample whose X is closest to `x`.
    ///
    /// Walks forward and stops once the distance grows, so the answer is only
    /// exact for non-decreasing X. Returns `None` for an empty series.
    #[must_use]
    pub fn find_nearest_index_by_x(&self, x: f64) -> Option<usize> {
        let first = self.samples.front()?;
        let mut best = 0;
        let mut best_diff = (first.x - x).abs();
        for (index, sample) in self.samples.iter().enumerate().skip(1) {
            let diff = (sample.x - x).abs();
            if diff > best_diff {
                break;
            }
            best = index;
            best_diff = diff;
        }
        Some(best)
    }

    /// Cached extremes over all stored samples.
    #[must_use]
    pub fn extremes(&self) -> Option<Extremes> {
        self.extremes
    }

    /// Data Y range over all stored samples.
    #[must_use]
    pub fn y_range(&self) -> Option<YRange> {
        self.extremes
            .map(|extremes| YRange::new(extremes.min, extremes.max))
    }

    /// Data Y range over the inclusive index interval `first..=last`.
    #[must_use]
    pub fn y_range_between(&self, first: usize, last: usize) -> Option<YRange> {
        if self.samples.is_empty() || first > last {
            return None;
        }
        let last = last.min(self.samples.len() - 1);
        scan_extremes(
            self.samples
                .iter()
                .enumerate()
                .skip(first)
                .take(last.saturating_sub(first) + 1),
        )
        .map(|extremes| YRange::new(extremes.min, extremes.max))
    }

    /// Data Y range extended by the manual bounds.
    #[must_use]
    pub fn display_y_range(&self) -> Option<YRange> {
        let data = self.y_range();
        match (self.manual_bounds, data) {
            (ManualBounds::None, data) => data,
            (ManualBounds::Min(min), Some(data)) => Some(YRange::new(data.min.min(min), data.max)),
            (ManualBounds::Min(min), None) => Some(YRange::new(min, min)),
            (ManualBounds::MinMax(min, max), Some(data)) => {
                Some(data.union(YRange::new(min, max)))
            }
            (ManualBounds::MinMax(min, max), None) => Some(YRange::new(min, max)),
        }
    }

    /// Counts samples with X inside `[min, max]` and caches the result.
    pub fn count_visible(&mut self, min: f64, max: f64) -> usize {
        self.visible_points = self
            .samples
            .iter()
            .filter(|sample| sample.x >= min && sample.x <= max)
            .count();
        self.visible_points
    }

    /// Moves the cursor to `index`, clamped to the stored range.
    ///
    /// Returns `false` when the series is empty or the cursor did not move.
    pub fn set_cursor(&mut self, index: usize) -> bool {
        if self.samples.is_empty() {
            return false;
        }
        let clamped = index.min(self.samples.len() - 1);
        let changed = self.cursor != Some(clamped);
        self.cursor = Some(clamped);
        changed
    }

    pub fn hide_cursor(&mut self) -> bool {
        self.cursor.take().is_some()
    }

    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    #[must_use]
    pub fn cursor_sample(&self) -> Option<Sample> {
        self.cursor.and_then(|index| self.sample(index))
    }

    /// Drops every sample and label. Marks the series as changed so the next
    /// paint is a full one.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.labels.clear();
        self.extremes = None;
        self.cursor = None;
        self.new_values = 0;
        self.visible_points = 0;
        self.last_drawn = 0;
        self.y_scale.reset_shown_range();
        self.other_changes = true;
    }

    /// Returns and resets the number of samples appended since the last call.
    pub fn take_new_values(&mut self) -> usize {
        std::mem::take(&mut self.new_values)
    }

    #[must_use]
    pub fn has_new_values(&self) -> bool {
        self.new_values > 0
    }

    /// Returns and resets the metadata-changed flag.
    pub fn take_other_changes(&mut self) -> bool {
        std::mem::take(&mut self.other_changes)
    }

    #[must_use]
    pub fn has_other_changes(&self) -> bool {
        self.other_changes
    }

    #[must_use]
    pub fn sample(&self, index: usize) -> Option<Sample> {
        self.samples.get(index).copied()
    }

    /// Sample at `index`, or a zero sample when out of range.
    #[must_use]
    pub fn sample_or_default(&self, index: usize) -> Sample {
        self.sample(index).unwrap_or_default()
    }

    pub fn samples(&self) -> impl ExactSizeIterator<Item = &Sample> + '_ {
        self.samples.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// X of the oldest sample, `0` when empty.
    #[must_use]
    pub fn x_min(&self) -> f64 {
        self.samples.front().map_or(0.0, |sample| sample.x)
    }

    /// X of the newest sample, `0` when empty.
    #[must_use]
    pub fn x_max(&self) -> f64 {
        self.samples.back().map_or(0.0, |sample| sample.x)
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn is_categorical(&self) -> bool {
        self.y_scale.is_categorical()
    }

    #[must_use]
    pub fn legend(&self) -> &str {
        self.legend.as_deref().unwrap_or(MISSING_TEXT)
    }

    #[must_use]
    pub fn raw_legend(&self) -> Option<&str> {
        self.legend.as_deref()
    }

    pub fn set_legend(&mut self, legend: Option<String>) {
        if self.legend != legend {
            self.legend = legend;
            self.other_changes = true;
        }
    }

    /// Unit used for display and for grouping series onto one Y range.
    #[must_use]
    pub fn unit(&self) -> &str {
        match self.unit.as_deref() {
            Some(unit) if !unit.is_empty() => unit,
            _ => MISSING_TEXT,
        }
    }

    /// Raw unit text as set by the caller.
    #[must_use]
    pub fn raw_unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn set_unit(&mut self, unit: Option<String>) {
        if self.unit != unit {
            self.unit = unit;
            self.other_changes = true;
        }
    }

    #[must_use]
    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn set_color(&mut self, color: Rgb) {
        if self.color != color {
            self.color = color;
            self.other_changes = true;
        }
    }

    #[must_use]
    pub fn manual_bounds(&self) -> ManualBounds {
        self.manual_bounds
    }

    pub fn set_manual_bounds(&mut self, bounds: ManualBounds) {
        if self.manual_bounds != bounds {
            self.manual_bounds = bounds;
            self.other_changes = true;
        }
    }

    #[must_use]
    pub fn auto_scale(&self) -> bool {
        self.auto_scale
    }

    pub fn set_auto_scale(&mut self, auto_scale: bool) {
        if self.auto_scale != auto_scale {
            self.auto_scale = auto_scale;
            self.other_changes = true;
        }
    }

    #[must_use]
    pub fn visible_points(&self) -> usize {
        self.visible_points
    }

    #[must_use]
    pub fn legend_rect(&self) -> Option<Rect> {
        self.legend_rect
    }

    pub(crate) fn set_legend_rect(&mut self, rect: Option<Rect>) {
        self.legend_rect = rect;
    }

    /// Index of the next sample the incremental paint has not drawn yet.
    #[must_use]
    pub fn last_drawn(&self) -> usize {
        self.last_drawn
    }

    pub(crate) fn set_last_drawn(&mut self, last_drawn: usize) {
        self.last_drawn = last_drawn.min(self.samples.len());
    }

    #[must_use]
    pub fn y_scale(&self) -> &ScaleState {
        &self.y_scale
    }

    pub(crate) fn y_scale_mut(&mut self) -> &mut ScaleState {
        &mut self.y_scale
    }
}

fn scan_extremes<'a>(samples: impl Iterator<Item = (usize, &'a Sample)>) -> Option<Extremes> {
    samples
        .filter(|(_, sample)| sample.y.is_finite())
        .fold(None, |acc: Option<Extremes>, (index, sample)| {
            Some(match acc {
                None => Extremes {
                    min: sample.y,
                    max: sample.y,
                    min_index: index,
                    max_index: index,
                },
                Some(mut extremes) => {
                    if sample.y < extremes.min {
                        extremes.min = sample.y;
                        extremes.min_index = index;
                    }
                    if sample.y > extremes.max {
                        extremes.max = sample.y;
                        extremes.max_index = index;
                    }
                    extremes
                }
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(capacity: usize) -> Series {
        Series::new(capacity, Rgb::new(0, 0, 255)).expect("valid capacity")
    }

    #[test]
    fn evicting_the_maximum_rescans() {
        let mut s = series(3);
        s.append(0.0, 9.0);
        s.append(1.0, 1.0);
        s.append(2.0, 2.0);
        s.append(3.0, 3.0);

        let extremes = s.extremes().expect("extremes");
        assert_eq!(extremes.max, 3.0);
        assert_eq!(extremes.max_index, 2);
        assert_eq!(extremes.min, 1.0);
        assert_eq!(extremes.min_index, 0);
    }

    #[test]
    fn eviction_shifts_cached_indices() {
        let mut s = series(3);
        s.append(0.0, 5.0);
        s.append(1.0, 0.0);
        s.append(2.0, 10.0);
        s.set_cursor(2);
        s.set_last_drawn(3);
        s.append(3.0, 4.0);

        let extremes = s.extremes().expect("extremes");
        assert_eq!((extremes.min_index, extremes.max_index), (0, 1));
        assert_eq!(s.cursor(), Some(1));
        assert_eq!(s.last_drawn(), 2);
    }

    #[test]
    fn new_label_ahead_of_existing_reindexes_prior_samples() {
        let mut s = series(10);
        assert_eq!(s.append_categorical(0.0, "B"), 1);
        assert_eq!(s.append_categorical(1.0, "A"), 2);
        assert_eq!(s.append_categorical(2.0, "C"), 3);

        assert_eq!(s.labels(), ["C", "B", "A"]);
        let ys: Vec<f64> = s.samples().map(|sample| sample.y).collect();
        assert_eq!(ys, vec![1.0, 2.0, 0.0]);
        assert_eq!(s.y_range(), Some(YRange::new(0.0, 2.0)));
        assert!(s.is_categorical());
    }

    #[test]
    fn replace_all_y_updates_prefix_and_extremes() {
        let mut s = series(4);
        for x in 0..4 {
            s.append(f64::from(x), 1.0);
        }
        s.take_other_changes();
        s.replace_all_y(&[7.0, -2.0]);

        let ys: Vec<f64> = s.samples().map(|sample| sample.y).collect();
        assert_eq!(ys, vec![7.0, -2.0, 1.0, 1.0]);
        assert_eq!(s.y_range(), Some(YRange::new(-2.0, 7.0)));
        assert!(s.take_other_changes());
    }

    #[test]
    fn manual_bounds_extend_data_range() {
        let mut s = series(4);
        s.append(0.0, 5.0);
        s.append(1.0, 6.0);
        s.set_manual_bounds(ManualBounds::Min(0.0));
        assert_eq!(s.display_y_range(), Some(YRange::new(0.0, 6.0)));
        s.set_manual_bounds(ManualBounds::MinMax(5.5, 5.8));
        assert_eq!(s.display_y_range(), Some(YRange::new(5.0, 6.0)));
    }

    #[test]
    fn partial_range_scan_is_clamped() {
        let mut s = series(8);
        for (x, y) in [(0.0, 3.0), (1.0, -1.0), (2.0, 8.0), (3.0, 2.0)] {
            s.append(x, y);
        }
        assert_eq!(s.y_range_between(2, 99), Some(YRange::new(2.0, 8.0)));
        assert_eq!(s.y_range_between(3, 1), None);
    }

    #[test]
    fn empty_series_lookups_are_sentinels() {
        let s = series(2);
        assert_eq!(s.find_nearest_index_by_x(1.0), None);
        assert_eq!(s.sample_or_default(5), Sample::default());
        assert_eq!(s.x_min(), 0.0);
        assert_eq!(s.legend(), MISSING_TEXT);
        assert!(Series::new(0, Rgb::default()).is_err());
    }
}
