//! Background writer for note collection snapshots.
//!
//! # Responsibility
//! - Persist serialized snapshots off the caller's thread.
//! - Coalesce bursts of mutations so only the newest snapshot is written.
//!
//! # Invariants
//! - Snapshots are written whole, one at a time, in generation order.
//! - A pending snapshot is replaced, never merged, by a newer submission.
//! - A failed write is not retried; the next submission carries full state.

use crate::repo::kv_store::{KeyValueStore, StorageError, StorageResult};
use log::{debug, error, info, warn};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Instant;

/// Store handle shared by the writer thread and synchronous readers.
pub type SharedStore = Arc<Mutex<Box<dyn KeyValueStore>>>;

#[derive(Default)]
struct Slot {
    pending: Option<(u64, String)>,
    completed_generation: u64,
    last_failure: Option<(u64, String)>,
    shutdown: bool,
}

struct Shared {
    slot: Mutex<Slot>,
    changed: Condvar,
}

/// Latest-wins snapshot writer.
pub struct SnapshotWriter {
    key: String,
    store: SharedStore,
    shared: Arc<Shared>,
    submitted_generation: u64,
    worker: Option<JoinHandle<()>>,
}

impl SnapshotWriter {
    /// Starts the writer thread for `key`.
    ///
    /// Falls back to synchronous writes when the thread cannot be spawned.
    pub fn spawn(store: SharedStore, key: impl Into<String>) -> Self {
        let key = key.into();
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot::default()),
            changed: Condvar::new(),
        });

        let worker = {
            let shared = Arc::clone(&shared);
            let store = Arc::clone(&store);
            let key = key.clone();
            std::thread::Builder::new()
                .name("taskpad-snapshot-writer".to_string())
                .spawn(move || run_worker(&shared, &store, &key))
        };
        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!(
                    "event=snapshot_writer_start module=service status=error mode=inline error={}",
                    err
                );
                None
            }
        };

        Self {
            key,
            store,
            shared,
            submitted_generation: 0,
            worker,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Queues `blob` as the newest snapshot and returns immediately.
    pub fn submit(&mut self, blob: String) {
        self.submitted_generation += 1;
        let generation = self.submitted_generation;

        if self.worker.is_none() {
            let outcome = write_snapshot(&self.store, &self.key, generation, &blob);
            if let Ok(mut slot) = self.shared.slot.lock() {
                record_outcome(&mut slot, generation, outcome);
            }
            return;
        }

        match self.shared.slot.lock() {
            Ok(mut slot) => {
                if let Some((stale, _)) = slot.pending.replace((generation, blob)) {
                    debug!(
                        "event=snapshot_write module=service status=coalesced generation={} replaced={}",
                        generation, stale
                    );
                }
                self.shared.changed.notify_all();
            }
            Err(_) => error!(
                "event=snapshot_write module=service status=error generation={} error=slot_poisoned",
                generation
            ),
        }
    }

    /// Blocks until every submitted snapshot has been handled.
    ///
    /// # Errors
    /// - The newest snapshot's write failure, if it failed.
    pub fn flush(&self) -> StorageResult<()> {
        let target = self.submitted_generation;
        let mut slot = lock_slot(&self.shared)?;
        while slot.completed_generation < target && self.worker.is_some() {
            slot = self
                .shared
                .changed
                .wait(slot)
                .map_err(|_| poisoned())?;
        }

        match &slot.last_failure {
            Some((generation, message)) if *generation == slot.completed_generation => {
                Err(StorageError::Unavailable(message.clone()))
            }
            _ => Ok(()),
        }
    }
}

impl Drop for SnapshotWriter {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.shared.slot.lock() {
            slot.shutdown = true;
            self.shared.changed.notify_all();
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!(
                    "event=snapshot_writer_stop module=service status=error error=worker_panicked"
                );
            }
        }
    }
}

fn run_worker(shared: &Shared, store: &SharedStore, key: &str) {
    let Ok(mut slot) = shared.slot.lock() else {
        return;
    };
    loop {
        if let Some((generation, blob)) = slot.pending.take() {
            drop(slot);
            let outcome = write_snapshot(store, key, generation, &blob);
            slot = match shared.slot.lock() {
                Ok(slot) => slot,
                Err(_) => return,
            };
            record_outcome(&mut slot, generation, outcome);
            shared.changed.notify_all();
            continue;
        }
        if slot.shutdown {
            return;
        }
        slot = match shared.changed.wait(slot) {
            Ok(slot) => slot,
            Err(_) => return,
        };
    }
}

fn write_snapshot(
    store: &SharedStore,
    key: &str,
    generation: u64,
    blob: &str,
) -> StorageResult<()> {
    let started_at = Instant::now();
    let result = store
        .lock()
        .map_err(|_| StorageError::Unavailable("store lock poisoned".to_string()))
        .and_then(|mut store| store.set(key, blob));

    match &result {
        Ok(()) => info!(
            "event=snapshot_write module=service status=ok key={} generation={} bytes={} duration_ms={}",
            key,
            generation,
            blob.len(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=snapshot_write module=service status=error key={} generation={} duration_ms={} error={}",
            key,
            generation,
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

fn record_outcome(slot: &mut Slot, generation: u64, outcome: StorageResult<()>) {
    slot.completed_generation = slot.completed_generation.max(generation);
    if let Err(err) = outcome {
        slot.last_failure = Some((generation, err.to_string()));
    }
}

fn lock_slot(shared: &Shared) -> StorageResult<MutexGuard<'_, Slot>> {
    shared.slot.lock().map_err(|_| poisoned())
}

fn poisoned() -> StorageError {
    StorageError::Unavailable("snapshot writer state poisoned".to_string())
}
