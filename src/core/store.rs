//! Series ownership and the single lock guarding all of them.
//!
//! Producers append through [`SeriesHandle`] from any thread while the painter
//! walks every attached series under the same lock. Painting touches all
//! series together, so one coarse mutex is used instead of per-series locks.
//! Critical sections are CPU-only and the lock is never nested with another.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, TryLockError, Weak};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::series::{ManualBounds, Series};
use crate::core::types::{Rgb, Sample, YRange};
use crate::core::wake::WakeScheduler;
use crate::error::PlotResult;

/// Store-unique identifier of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesId(u64);

impl SeriesId {
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct SeriesToken {
    id: SeriesId,
}

#[derive(Debug)]
struct SeriesSlot {
    token: Weak<SeriesToken>,
    id: SeriesId,
    series: Series,
    owner: Option<Arc<WakeScheduler>>,
}

#[derive(Debug, Default)]
struct StoreState {
    next_id: u64,
    slots: Vec<SeriesSlot>,
}

impl StoreState {
    fn sweep(&mut self) {
        let before = self.slots.len();
        self.slots.retain(|slot| slot.token.strong_count() > 0);
        let removed = before - self.slots.len();
        if removed > 0 {
            debug!(removed, remaining = self.slots.len(), "reclaimed dropped series");
        }
    }

    fn slot(&self, id: SeriesId) -> Option<&SeriesSlot> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    fn slot_mut(&mut self, id: SeriesId) -> Option<&mut SeriesSlot> {
        self.slots.iter_mut().find(|slot| slot.id == id)
    }
}

/// Owner of every series in one lock domain.
#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    state: Arc<Mutex<StoreState>>,
}

impl SeriesStore {
    /// Creates an isolated store with its own lock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide store used by plots created without an explicit store.
    #[must_use]
    pub fn shared() -> Self {
        static SHARED: OnceLock<SeriesStore> = OnceLock::new();
        SHARED.get_or_init(SeriesStore::new).clone()
    }

    /// Creates an empty series. Fails for a capacity of zero.
    pub fn create_series(&self, capacity: usize, color: Rgb) -> PlotResult<SeriesHandle> {
        let series = Series::new(capacity, color)?;
        let mut guard = self.lock();
        let id = SeriesId(guard.state.next_id);
        guard.state.next_id += 1;

        let token = Arc::new(SeriesToken { id });
        guard.state.slots.push(SeriesSlot {
            token: Arc::downgrade(&token),
            id,
            series,
            owner: None,
        });
        debug!(id = id.raw(), capacity, "series created");

        Ok(SeriesHandle {
            store: self.clone(),
            token,
        })
    }

    /// Takes the store lock, reclaiming series whose handles were all dropped.
    pub fn lock(&self) -> StoreGuard<'_> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.sweep();
        StoreGuard { state }
    }

    /// `true` while some thread holds the store lock.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        matches!(self.state.try_lock(), Err(TryLockError::WouldBlock))
    }

    /// Number of live series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().state.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn same_store(&self, other: &SeriesStore) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    pub(crate) fn set_owner(&self, id: SeriesId, owner: Option<Arc<WakeScheduler>>) {
        if let Some(slot) = self.lock().state.slot_mut(id) {
            slot.owner = owner;
        }
    }
}

/// Exclusive access to every series of a store.
pub struct StoreGuard<'a> {
    state: MutexGuard<'a, StoreState>,
}

impl StoreGuard<'_> {
    #[must_use]
    pub fn get(&self, id: SeriesId) -> Option<&Series> {
        self.state.slot(id).map(|slot| &slot.series)
    }

    pub fn get_mut(&mut self, id: SeriesId) -> Option<&mut Series> {
        self.state.slot_mut(id).map(|slot| &mut slot.series)
    }

    /// Identifiers of all live series in creation order.
    #[must_use]
    pub fn ids(&self) -> Vec<SeriesId> {
        self.state.slots.iter().map(|slot| slot.id).collect()
    }
}

/// Shared reference to one series.
///
/// The series lives as long as at least one handle does. Mutating calls take
/// the store lock, then ask the owning plot for a repaint after releasing it.
#[derive(Debug, Clone)]
pub struct SeriesHandle {
    store: SeriesStore,
    token: Arc<SeriesToken>,
}

impl PartialEq for SeriesHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.token, &other.token)
    }
}

impl Eq for SeriesHandle {}

impl SeriesHandle {
    #[must_use]
    pub fn id(&self) -> SeriesId {
        self.token.id
    }

    #[must_use]
    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    /// Runs `f` on the series under the store lock.
    pub fn read<T>(&self, f: impl FnOnce(&Series) -> T) -> Option<T> {
        let guard = self.store.lock();
        guard.get(self.id()).map(f)
    }

    fn mutate<T: Default>(&self, wake: bool, f: impl FnOnce(&mut Series) -> T) -> T {
        let (value, owner) = {
            let mut guard = self.store.lock();
            match guard.state.slot_mut(self.id()) {
                Some(slot) => (f(&mut slot.series), slot.owner.clone()),
                None => (T::default(), None),
            }
        };
        if wake {
            if let Some(owner) = owner {
                owner.request();
            }
        }
        value
    }

    /// See [`Series::append`].
    pub fn append(&self, x: f64, y: f64) -> usize {
        self.mutate(true, |series| series.append(x, y))
    }

    /// See [`Series::append_categorical`].
    pub fn append_categorical(&self, x: f64, label: &str) -> usize {
        self.mutate(true, |series| series.append_categorical(x, label))
    }

    pub fn replace_all_y(&self, ys: &[f64]) {
        self.mutate(true, |series| series.replace_all_y(ys));
    }

    pub fn mark_segment_break(&self) -> bool {
        self.mutate(false, Series::mark_segment_break)
    }

    pub fn clear(&self) {
        self.mutate(true, Series::clear);
    }

    pub fn set_cursor(&self, index: usize) -> bool {
        self.mutate(false, |series| series.set_cursor(index))
    }

    pub fn hide_cursor(&self) -> bool {
        self.mutate(false, Series::hide_cursor)
    }

    pub fn set_legend(&self, legend: Option<String>) {
        self.mutate(true, |series| series.set_legend(legend));
    }

    pub fn set_unit(&self, unit: Option<String>) {
        self.mutate(true, |series| series.set_unit(unit));
    }

    pub fn set_color(&self, color: Rgb) {
        self.mutate(true, |series| series.set_color(color));
    }

    pub fn set_manual_bounds(&self, bounds: ManualBounds) {
        self.mutate(true, |series| series.set_manual_bounds(bounds));
    }

    pub fn set_auto_scale(&self, auto_scale: bool) {
        self.mutate(true, |series| series.set_auto_scale(auto_scale));
    }

    #[must_use]
    pub fn find_nearest_index_by_x(&self, x: f64) -> Option<usize> {
        self.read(|series| series.find_nearest_index_by_x(x)).flatten()
    }

    #[must_use]
    pub fn y_range(&self) -> Option<YRange> {
        self.read(Series::y_range).flatten()
    }

    #[must_use]
    pub fn y_range_between(&self, first: usize, last: usize) -> Option<YRange> {
        self.read(|series| series.y_range_between(first, last)).flatten()
    }

    #[must_use]
    pub fn sample(&self, index: usize) -> Option<Sample> {
        self.read(|series| series.sample(index)).flatten()
    }

    /// Copy of all stored samples, oldest first.
    #[must_use]
    pub fn samples(&self) -> Vec<Sample> {
        self.read(|series| series.samples().copied().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read(Series::len).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.read(Series::cursor).flatten()
    }
}
