// ── Per-entity client-side stores ──
//
// Each store caches the last-fetched collection of one record type, the
// last search term and a loading flag, and re-derives the filtered view
// synchronously on every mutation. State is published as immutable
// `StoreView` snapshots through a `watch` channel; every mutation is a
// single `send_modify`, so readers never observe a half-applied change.

mod remote;
mod stream;

use std::path::Path;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::error::CoreError;
use crate::model::{Appointment, EditAppointmentPatientData, Entity, EntityId};
use crate::notify::Notifier;

pub use remote::{RemoteAppointments, RemoteCollection, RemotePatientScoped, RemoteWritable};
pub use stream::{StoreStream, StoreWatchStream};

// ── StoreView ────────────────────────────────────────────────────────

/// Immutable snapshot of one store.
#[derive(Debug)]
pub struct StoreView<T> {
    /// Full cache, in server order (new records first).
    pub data: Vec<Arc<T>>,
    /// `data` narrowed by `search`, source order preserved.
    pub filtered: Vec<Arc<T>>,
    pub search: String,
    pub is_loading: bool,
}

impl<T> StoreView<T> {
    pub fn total(&self) -> usize {
        self.data.len()
    }

    pub fn get(&self, id: &EntityId) -> Option<&Arc<T>>
    where
        T: Entity,
    {
        self.data.iter().find(|item| item.id() == id)
    }
}

impl<T> Default for StoreView<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            filtered: Vec::new(),
            search: String::new(),
            is_loading: false,
        }
    }
}

impl<T> Clone for StoreView<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            filtered: self.filtered.clone(),
            search: self.search.clone(),
            is_loading: self.is_loading,
        }
    }
}

impl<T: Entity> StoreView<T> {
    fn refilter(&mut self) {
        let needle = self.search.to_lowercase();
        self.filtered = if needle.is_empty() {
            self.data.clone()
        } else {
            self.data
                .iter()
                .filter(|item| item.matches(&needle))
                .cloned()
                .collect()
        };
    }

    /// Replace the entry with the record's id, or prepend it.
    fn upsert(&mut self, record: Arc<T>) {
        match self.data.iter_mut().find(|item| item.id() == record.id()) {
            Some(slot) => *slot = record,
            None => self.data.insert(0, record),
        }
    }

    /// Replace the entry whose id is `id`. Leaves the cache untouched when
    /// no entry matches.
    fn replace(&mut self, id: &EntityId, record: Arc<T>) {
        if let Some(slot) = self.data.iter_mut().find(|item| item.id() == id) {
            *slot = record;
        }
    }
}

// ── EntityStore ──────────────────────────────────────────────────────

/// Single-writer cache of one record type backed by a remote collection.
///
/// Concurrent operations are neither serialized nor queued: the loading flag
/// is one logical bit and the last response to land wins.
pub struct EntityStore<T: Entity, R> {
    remote: R,
    state: watch::Sender<Arc<StoreView<T>>>,
    notifier: Notifier,
}

impl<T: Entity, R> EntityStore<T, R> {
    pub fn new(remote: R, notifier: Notifier) -> Self {
        let (state, _) = watch::channel(Arc::new(StoreView::default()));
        Self {
            remote,
            state,
            notifier,
        }
    }

    /// Current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<StoreView<T>> {
        self.state.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> StoreStream<T> {
        StoreStream::new(self.state.subscribe())
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    // ── Local operations ─────────────────────────────────────────────

    /// Store `term` and recompute the filtered view.
    pub fn apply_search(&self, term: &str) {
        self.mutate(|view| {
            view.search = term.to_owned();
            view.refilter();
        });
    }

    /// Re-apply the current search term.
    pub fn reload(&self) {
        self.mutate(StoreView::refilter);
    }

    /// Insert or replace a record without a server round-trip.
    pub fn upsert_local(&self, record: T) -> Arc<T> {
        let record = Arc::new(record);
        let inserted = Arc::clone(&record);
        self.mutate(move |view| {
            view.upsert(record);
            view.refilter();
        });
        inserted
    }

    /// Drop a record from the cache only; nothing is deleted server-side.
    pub fn remove_local(&self, id: &EntityId) -> Option<Arc<T>> {
        let mut removed = None;
        self.mutate(|view| {
            if let Some(pos) = view.data.iter().position(|item| item.id() == id) {
                removed = Some(view.data.remove(pos));
            }
            view.refilter();
        });
        removed
    }

    // ── Internal helpers ─────────────────────────────────────────────

    fn mutate(&self, f: impl FnOnce(&mut StoreView<T>)) {
        // `send_modify` updates unconditionally, even with zero receivers.
        self.state.send_modify(|snap| f(Arc::make_mut(snap)));
    }

    fn set_loading(&self, is_loading: bool) {
        self.mutate(|view| view.is_loading = is_loading);
    }

    fn replace_collection(&self, items: Vec<T>) {
        let data: Vec<Arc<T>> = items.into_iter().map(Arc::new).collect();
        self.mutate(move |view| {
            view.data = data;
            view.is_loading = false;
            view.refilter();
        });
    }

    /// Apply a successful single-record response, or report the failure.
    fn settle(
        &self,
        result: Result<T, podoscan_api::Error>,
        apply: impl FnOnce(&mut StoreView<T>, Arc<T>),
        success: Option<String>,
        failure: String,
    ) -> Result<Arc<T>, CoreError> {
        match result {
            Ok(record) => {
                let record = Arc::new(record);
                let applied = Arc::clone(&record);
                self.mutate(move |view| {
                    apply(view, record);
                    view.is_loading = false;
                    view.refilter();
                });
                if let Some(message) = success {
                    self.notifier.success(message);
                }
                Ok(applied)
            }
            Err(e) => {
                self.set_loading(false);
                self.notifier.error(format!("{failure}: {e}"));
                Err(e.into())
            }
        }
    }
}

// ── Remote operations ────────────────────────────────────────────────

impl<T: Entity, R: RemoteCollection<T>> EntityStore<T, R> {
    /// Replace the cache with the full remote collection.
    ///
    /// Failures are reported through the notifier and swallowed; the cache
    /// is left untouched.
    pub async fn fetch_all(&self) {
        self.set_loading(true);
        match self.remote.list().await {
            Ok(items) => {
                debug!(kind = T::LABEL, count = items.len(), "collection refreshed");
                self.replace_collection(items);
            }
            Err(e) => {
                self.set_loading(false);
                self.notifier
                    .error(format!("Could not load {} list: {e}", T::LABEL));
            }
        }
    }

    /// Fetch one record and upsert it into the cache.
    pub async fn find_one(&self, id: &EntityId) -> Result<Arc<T>, CoreError> {
        self.set_loading(true);
        let result = self.remote.fetch(id).await;
        self.settle(
            result,
            StoreView::upsert,
            None,
            format!("Could not fetch {} {id}", T::LABEL),
        )
    }
}

impl<T: Entity, R: RemotePatientScoped<T>> EntityStore<T, R> {
    /// Replace the cache with one patient's records. Same failure contract
    /// as [`fetch_all`](Self::fetch_all).
    pub async fn fetch_by_patient(&self, patient_id: &EntityId) {
        self.set_loading(true);
        match self.remote.list_by_patient(patient_id).await {
            Ok(items) => {
                debug!(kind = T::LABEL, %patient_id, count = items.len(), "patient collection refreshed");
                self.replace_collection(items);
            }
            Err(e) => {
                self.set_loading(false);
                self.notifier.error(format!(
                    "Could not load {} list for patient {patient_id}: {e}",
                    T::LABEL
                ));
            }
        }
    }
}

impl<T: Entity, R: RemoteWritable<T>> EntityStore<T, R> {
    /// Create a record remotely and prepend it to the cache.
    pub async fn create(&self, body: &R::Upsert) -> Result<Arc<T>, CoreError> {
        self.set_loading(true);
        let result = self.remote.create(body).await;
        self.settle(
            result,
            |view, record| view.data.insert(0, record),
            Some(format!("Created {}", T::LABEL)),
            format!("Could not create {}", T::LABEL),
        )
    }

    /// Update a record remotely and replace the cached entry with id `id`.
    pub async fn update(&self, id: &EntityId, body: &R::Upsert) -> Result<Arc<T>, CoreError> {
        self.set_loading(true);
        let result = self.remote.update(id, body).await;
        self.settle(
            result,
            |view, record| view.replace(id, record),
            Some(format!("Updated {}", T::LABEL)),
            format!("Could not update {}", T::LABEL),
        )
    }
}

impl<R: RemoteAppointments> EntityStore<Appointment, R> {
    /// Save the doctor's clinical readings and note.
    pub async fn edit_patient_data(
        &self,
        id: &EntityId,
        body: &EditAppointmentPatientData,
    ) -> Result<Arc<Appointment>, CoreError> {
        self.set_loading(true);
        let result = self.remote.edit_patient_data(id, body).await;
        self.settle(
            result,
            |view, record| view.replace(id, record),
            Some("Updated clinical data".to_owned()),
            "Could not update clinical data".to_owned(),
        )
    }

    /// Attach a foot photo to the appointment.
    pub async fn upload_photo(
        &self,
        id: &EntityId,
        file: &Path,
    ) -> Result<Arc<Appointment>, CoreError> {
        self.set_loading(true);
        let result = self.remote.upload_photo(id, file).await;
        self.settle(
            result,
            |view, record| view.replace(id, record),
            Some("Uploaded photo".to_owned()),
            "Could not upload photo".to_owned(),
        )
    }
}

#[cfg(test)]
mod tests;
