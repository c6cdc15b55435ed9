//! Per-model report cache with reference-counted lifecycle.
//!
//! One [`QualityReportProvider`] serves every consumer of quality reports
//! (color themes, tooltips). Each model gets at most one cache entry:
//!
//! - The first attach for a model fetches and builds the store. Attaches
//!   arriving while that fetch is in flight block on the same outcome
//!   instead of issuing a second request.
//! - A successful attach with `add_ref` bumps the entry's reference count;
//!   [`detach`](QualityReportProvider::detach) drops it and evicts the entry
//!   at zero.
//! - A failed population is delivered to every waiter, then the entry is
//!   evicted so the next attach retries.
//!
//! Stores are immutable `Arc` snapshots; only the entry map is locked.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock};

use rustc_hash::FxHashMap;

use super::fetch::ReportFetcher;
use super::{build_store, ReportError, ResidueIndexedStore};
use crate::model::{ModelId, StructureModel};
use crate::options::ReportOptions;

type Outcome = Result<Arc<ResidueIndexedStore>, ReportError>;

/// Snapshot of one model's cache entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Current store, if one has been built.
    pub store: Option<Arc<ResidueIndexedStore>>,
    /// Parameters `store` was requested with.
    pub params: Option<ReportOptions>,
    /// Number of outstanding references.
    pub ref_count: usize,
    /// Whether a fetch is in flight.
    pub fetching: bool,
}

/// A fetch in progress, shared by every attach waiting on it.
struct InFlight {
    params: ReportOptions,
    outcome: Mutex<Option<Outcome>>,
    done: Condvar,
}

impl InFlight {
    fn new(params: ReportOptions) -> Self {
        Self {
            params,
            outcome: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    fn wait(&self) -> Outcome {
        let mut outcome = lock(&self.outcome);
        loop {
            if let Some(result) = outcome.as_ref() {
                return result.clone();
            }
            outcome = self
                .done
                .wait(outcome)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn complete(&self, result: Outcome) {
        *lock(&self.outcome) = Some(result);
        self.done.notify_all();
    }
}

struct Ready {
    params: ReportOptions,
    store: Arc<ResidueIndexedStore>,
}

enum Slot {
    /// Fetch in flight. `previous` is the store being replaced, restored if
    /// the fetch fails.
    Pending {
        flight: Arc<InFlight>,
        previous: Option<Ready>,
    },
    Ready(Ready),
}

struct Entry {
    slot: Slot,
    ref_count: usize,
}

enum Step {
    Done(Arc<ResidueIndexedStore>),
    Lead(Arc<InFlight>),
    Wait(Arc<InFlight>),
}

/// Process-wide registry of quality-report stores keyed by model identity.
pub struct QualityReportProvider<F> {
    fetcher: F,
    defaults: RwLock<ReportOptions>,
    auto_attach: AtomicBool,
    entries: Mutex<FxHashMap<ModelId, Entry>>,
}

impl<F: ReportFetcher> QualityReportProvider<F> {
    /// Provider requesting reports through `fetcher`, with `defaults` used
    /// by attaches that pass no explicit parameters.
    pub fn new(fetcher: F, defaults: ReportOptions, auto_attach: bool) -> Self {
        Self {
            fetcher,
            defaults: RwLock::new(defaults),
            auto_attach: AtomicBool::new(auto_attach),
            entries: Mutex::new(FxHashMap::default()),
        }
    }

    /// Parameters used by attaches without explicit ones.
    #[must_use]
    pub fn default_params(&self) -> ReportOptions {
        self.defaults
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether newly loaded models should be populated automatically.
    #[must_use]
    pub fn auto_attach(&self) -> bool {
        self.auto_attach.load(Ordering::Acquire)
    }

    /// Replace the defaults for future attaches. Cached stores are left
    /// untouched. Returns whether the auto-attach state changed.
    pub fn update(&self, defaults: ReportOptions, auto_attach: bool) -> bool {
        *self
            .defaults
            .write()
            .unwrap_or_else(PoisonError::into_inner) = defaults;
        self.auto_attach.swap(auto_attach, Ordering::AcqRel) != auto_attach
    }

    /// Ensure a store for `model` built with `params` (or the defaults),
    /// blocking until it is available.
    ///
    /// With `add_ref` the caller holds a reference that must be released
    /// with [`detach`](Self::detach). Attaching with parameters different
    /// from the cached store's re-fetches and replaces it.
    ///
    /// # Errors
    ///
    /// The fetch or parse failure of the population attempt this call
    /// joined. Concurrent callers of the same attempt see the same error.
    pub fn attach<M: StructureModel + ?Sized>(
        &self,
        model: &M,
        params: Option<ReportOptions>,
        add_ref: bool,
    ) -> Result<Arc<ResidueIndexedStore>, ReportError> {
        let params = params.unwrap_or_else(|| self.default_params());
        let id = model.id();

        loop {
            match self.begin(id, &params, add_ref) {
                Step::Done(store) => return Ok(store),
                Step::Lead(flight) => {
                    let mut guard = AbandonGuard {
                        provider: self,
                        id,
                        flight: &flight,
                        armed: true,
                    };
                    let outcome = self.populate(model, &params);
                    guard.armed = false;
                    self.finish(id, &flight, &outcome, add_ref);
                    flight.complete(outcome.clone());
                    return outcome;
                }
                Step::Wait(flight) => {
                    log::debug!("model {id:?}: waiting on in-flight fetch");
                    let outcome = flight.wait();
                    if flight.params != params {
                        continue;
                    }
                    match outcome {
                        Err(e) => return Err(e),
                        Ok(store) => {
                            if self.take_ref(id, &store, add_ref) {
                                return Ok(store);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Release one reference. The entry is evicted when the count reaches
    /// zero. No-op for models without an entry or without references.
    pub fn detach<M: StructureModel + ?Sized>(&self, model: &M) {
        let id = model.id();
        let mut entries = lock(&self.entries);
        let Some(entry) = entries.get_mut(&id) else {
            return;
        };
        if entry.ref_count == 0 {
            return;
        }
        entry.ref_count -= 1;
        if entry.ref_count == 0 && matches!(entry.slot, Slot::Ready(_)) {
            let _ = entries.remove(&id);
            log::debug!("model {id:?}: last reference released, evicted");
        }
    }

    /// Snapshot of the cache entry for `model`.
    pub fn get<M: StructureModel + ?Sized>(
        &self,
        model: &M,
    ) -> Option<CacheEntry> {
        self.entry(model.id())
    }

    /// Snapshot of the cache entry for a model id.
    #[must_use]
    pub fn entry(&self, id: ModelId) -> Option<CacheEntry> {
        let entries = lock(&self.entries);
        let entry = entries.get(&id)?;
        let (ready, fetching) = match &entry.slot {
            Slot::Ready(ready) => (Some(ready), false),
            Slot::Pending { previous, .. } => (previous.as_ref(), true),
        };
        Some(CacheEntry {
            store: ready.map(|r| Arc::clone(&r.store)),
            params: ready.map(|r| r.params.clone()),
            ref_count: entry.ref_count,
            fetching,
        })
    }

    /// Current store for a model id, if populated.
    #[must_use]
    pub fn store(&self, id: ModelId) -> Option<Arc<ResidueIndexedStore>> {
        self.entry(id).and_then(|e| e.store)
    }

    /// Whether any consumer holds a reference on the model's entry.
    #[must_use]
    pub fn has_reference(&self, id: ModelId) -> bool {
        lock(&self.entries)
            .get(&id)
            .is_some_and(|e| e.ref_count > 0)
    }

    /// Drop the entry of a model the host has unloaded, regardless of
    /// references. An in-flight fetch still completes for its waiters.
    pub fn dispose(&self, id: ModelId) {
        if lock(&self.entries).remove(&id).is_some() {
            log::debug!("model {id:?}: disposed");
        }
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }

    fn begin(&self, id: ModelId, params: &ReportOptions, add_ref: bool) -> Step {
        let mut entries = lock(&self.entries);
        let Some(entry) = entries.get_mut(&id) else {
            let flight = Arc::new(InFlight::new(params.clone()));
            let _ = entries.insert(
                id,
                Entry {
                    slot: Slot::Pending {
                        flight: Arc::clone(&flight),
                        previous: None,
                    },
                    ref_count: 0,
                },
            );
            return Step::Lead(flight);
        };

        let current = match &entry.slot {
            Slot::Ready(ready) if ready.params == *params => {
                Some(Step::Done(Arc::clone(&ready.store)))
            }
            Slot::Pending { flight, .. } => {
                Some(Step::Wait(Arc::clone(flight)))
            }
            Slot::Ready(_) => None,
        };
        if let Some(step) = current {
            if add_ref && matches!(step, Step::Done(_)) {
                entry.ref_count += 1;
            }
            return step;
        }

        log::debug!("model {id:?}: parameters changed, re-fetching");
        let flight = Arc::new(InFlight::new(params.clone()));
        let pending = Slot::Pending {
            flight: Arc::clone(&flight),
            previous: None,
        };
        if let Slot::Ready(previous) = std::mem::replace(&mut entry.slot, pending)
        {
            entry.slot = Slot::Pending {
                flight: Arc::clone(&flight),
                previous: Some(previous),
            };
        }
        Step::Lead(flight)
    }

    fn populate<M: StructureModel + ?Sized>(
        &self,
        model: &M,
        params: &ReportOptions,
    ) -> Outcome {
        let url = params.entry_url(model.entry_id());
        log::info!(
            "fetching quality report for {} (model {})",
            model.entry_id(),
            model.model_num()
        );
        let body = self.fetcher.fetch(&url)?;
        let store = build_store(model, &body, params.metric)?;
        log::info!(
            "{}: {} annotated residues, {} issue types",
            model.entry_id(),
            store.len(),
            store.issue_types().len()
        );
        Ok(Arc::new(store))
    }

    /// Publish the leader's outcome into the entry map.
    fn finish(
        &self,
        id: ModelId,
        flight: &Arc<InFlight>,
        outcome: &Outcome,
        add_ref: bool,
    ) {
        let mut entries = lock(&self.entries);
        let Some(entry) = entries.get_mut(&id) else {
            return;
        };
        let ours = matches!(
            &entry.slot,
            Slot::Pending { flight: f, .. } if Arc::ptr_eq(f, flight)
        );
        if !ours {
            return;
        }
        let previous = match &mut entry.slot {
            Slot::Pending { previous, .. } => previous.take(),
            Slot::Ready(_) => None,
        };

        match outcome {
            Ok(store) => {
                entry.slot = Slot::Ready(Ready {
                    params: flight.params.clone(),
                    store: Arc::clone(store),
                });
                if add_ref {
                    entry.ref_count += 1;
                }
            }
            Err(e) => {
                log::warn!("model {id:?}: quality report unavailable: {e}");
                match previous {
                    Some(previous) if entry.ref_count > 0 => {
                        entry.slot = Slot::Ready(previous);
                    }
                    _ => {
                        let _ = entries.remove(&id);
                        log::debug!("model {id:?}: no references left, evicted");
                    }
                }
            }
        }
    }

    /// Add a reference for a waiter, provided `store` is still the one
    /// cached.
    fn take_ref(
        &self,
        id: ModelId,
        store: &Arc<ResidueIndexedStore>,
        add_ref: bool,
    ) -> bool {
        let mut entries = lock(&self.entries);
        let Some(entry) = entries.get_mut(&id) else {
            return false;
        };
        let current = matches!(
            &entry.slot,
            Slot::Ready(ready) if Arc::ptr_eq(&ready.store, store)
        );
        if current && add_ref {
            entry.ref_count += 1;
        }
        current
    }
}

/// Completes an in-flight fetch with an error if the leader unwinds
/// before publishing, so waiters never block forever.
struct AbandonGuard<'a, F: ReportFetcher> {
    provider: &'a QualityReportProvider<F>,
    id: ModelId,
    flight: &'a Arc<InFlight>,
    armed: bool,
}

impl<F: ReportFetcher> Drop for AbandonGuard<'_, F> {
    fn drop(&mut self) {
        if self.armed {
            let outcome = Err(ReportError::Http("fetch abandoned".into()));
            self.provider.finish(self.id, self.flight, &outcome, false);
            self.flight.complete(outcome);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
