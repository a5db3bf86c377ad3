use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::series::Series;
use crate::core::store::{SeriesHandle, SeriesStore};
use crate::core::types::Rgb;
use crate::error::PlotResult;

/// Persistable record of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSnapshot {
    pub legend: Option<String>,
    pub unit: Option<String>,
    pub color: Rgb,
    pub capacity: usize,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    /// Indices of samples flagged as segment breaks.
    #[serde(default)]
    pub breaks: Vec<usize>,
    #[serde(default)]
    pub cursor: Option<usize>,
}

impl SeriesSnapshot {
    /// Captures `handle`, or `None` if its series is no longer in the store.
    #[must_use]
    pub fn capture(handle: &SeriesHandle) -> Option<Self> {
        handle.read(Self::from_series)
    }

    fn from_series(series: &Series) -> Self {
        let mut xs = Vec::with_capacity(series.len());
        let mut ys = Vec::with_capacity(series.len());
        let mut breaks = Vec::new();
        for (index, sample) in series.samples().enumerate() {
            xs.push(sample.x);
            ys.push(sample.y);
            if sample.segment_break {
                breaks.push(index);
            }
        }
        Self {
            legend: series.raw_legend().map(str::to_owned),
            unit: series.raw_unit().map(str::to_owned),
            color: series.color(),
            capacity: series.capacity(),
            xs,
            ys,
            breaks,
            cursor: series.cursor(),
        }
    }

    /// Rebuilds the series in `store` from create, append, break and cursor
    /// calls only.
    pub fn restore(&self, store: &SeriesStore) -> PlotResult<SeriesHandle> {
        let handle = store.create_series(self.capacity, self.color)?;
        handle.set_legend(self.legend.clone());
        handle.set_unit(self.unit.clone());

        if self.xs.len() != self.ys.len() {
            warn!(
                xs = self.xs.len(),
                ys = self.ys.len(),
                "snapshot coordinate lists differ in length, truncating"
            );
        }
        let count = self.xs.len().min(self.ys.len());

        let mut breaks = self.breaks.clone();
        breaks.sort_unstable();
        breaks.dedup();
        if let Some(&outside) = breaks.iter().find(|&&index| index >= count) {
            warn!(index = outside, count, "ignoring segment break outside sample range");
        }

        for (index, (&x, &y)) in self.xs.iter().zip(&self.ys).enumerate() {
            handle.append(x, y);
            if breaks.binary_search(&index).is_ok() {
                handle.mark_segment_break();
            }
        }
        if let Some(cursor) = self.cursor {
            handle.set_cursor(cursor);
        }
        Ok(handle)
    }
}

/// Persistable record of a whole plot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotSnapshot {
    #[serde(default)]
    pub x_text: String,
    #[serde(default)]
    pub x_unit: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub series: Vec<SeriesSnapshot>,
}

impl PlotSnapshot {
    /// Captures every live series in `handles`.
    #[must_use]
    pub fn capture(
        x_text: impl Into<String>,
        x_unit: impl Into<String>,
        handles: &[SeriesHandle],
    ) -> Self {
        Self {
            x_text: x_text.into(),
            x_unit: x_unit.into(),
            comment: String::new(),
            series: handles.iter().filter_map(SeriesSnapshot::capture).collect(),
        }
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Recreates all series in `store`, in record order.
    pub fn restore(&self, store: &SeriesStore) -> PlotResult<Vec<SeriesHandle>> {
        let handles = self
            .series
            .iter()
            .map(|series| series.restore(store))
            .collect::<PlotResult<Vec<_>>>()?;
        debug!(series = handles.len(), "snapshot restored");
        Ok(handles)
    }

    pub fn to_json(&self) -> PlotResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> PlotResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
