//! Service reconciler: scale intents and their persistence.
//!
//! Scale changes arrive as rapid increments and decrements, so they are
//! buffered as a pending intent and written once the user stops clicking
//! (trailing-edge debounce). Weight and pause changes are single discrete
//! actions and are written immediately.
//!
//! ```text
//! Idle ──scale_up/down──▶ Pending ──timer fires──▶ Writing ──done──▶ Idle
//!                          ▲    │
//!                          └────┘ scale_up/down re-arms the timer
//! ```
//!
//! A write failure is sent to the `Notifier` and never returned to the
//! caller. The pending intent is cleared after every write attempt; there is
//! no retry. A successful write re-reads the resource so the next intent
//! builds on what was written.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rio_core::{ServiceId, ServiceResource};
use rio_store::patch::{REPLICAS_PATH, ROLLOUT_PAUSE_PATH, WEIGHT_PATH};
use rio_store::{PatchOp, ResourceStore, StoreError, StoreResult, fetch_service};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::notify::{
    Notification, Notifier, PAUSE_ERROR_TITLE, SCALE_ERROR_TITLE, WEIGHT_ERROR_TITLE,
};
use crate::state::ResourceState;
use crate::summary::{ScaleSummary, compute_scale};
use crate::weights::{Weights, compute_weights};

/// Quiet period before a buffered scale change is written.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Locally buffered scale intent.
///
/// `scale` and `timer` are set and cleared together.
#[derive(Default)]
struct PendingIntent {
    scale: Option<u32>,
    timer: Option<ScaleTimer>,
    /// Bumped on every re-arm; a write only clears the intent it armed.
    generation: u64,
}

struct ScaleTimer {
    generation: u64,
    /// Set once the delay elapsed and the write is in flight.
    fired: bool,
    handle: JoinHandle<()>,
}

#[derive(Clone, Copy)]
enum ScaleStep {
    Up,
    Down,
}

/// Reconciles user intent for one service against the resource store.
pub struct ServiceReconciler {
    id: ServiceId,
    store: Arc<dyn ResourceStore>,
    notifier: Arc<dyn Notifier>,
    debounce: Duration,
    state: Arc<Mutex<ResourceState>>,
    pending: Arc<Mutex<PendingIntent>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ServiceReconciler {
    /// Create a reconciler for `service`, seeded with its current state.
    pub fn new(
        service: &ServiceResource,
        store: Arc<dyn ResourceStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            id: service.id.clone(),
            store,
            notifier,
            debounce: DEFAULT_DEBOUNCE,
            state: Arc::new(Mutex::new(ResourceState::from(service))),
            pending: Arc::new(Mutex::new(PendingIntent::default())),
        }
    }

    /// Override the debounce window for scale writes.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Replace the resource snapshot with a fresh copy from the store.
    pub fn observe(&self, service: &ServiceResource) {
        *lock(&self.state) = ResourceState::from(service);
    }

    /// Re-read the resource from the store and observe it.
    pub async fn refresh(&self) -> StoreResult<()> {
        let service = fetch_service(self.store.as_ref(), &self.id).await?;
        self.observe(&service);
        Ok(())
    }

    pub fn state(&self) -> ResourceState {
        *lock(&self.state)
    }

    /// Buffered scale not yet confirmed written.
    pub fn pending_scale(&self) -> Option<u32> {
        lock(&self.pending).scale
    }

    pub fn scales(&self) -> ScaleSummary {
        let state = self.state();
        compute_scale(&state, self.pending_scale())
    }

    pub fn weights(&self) -> Weights {
        compute_weights(&self.state())
    }

    /// Request one more replica. No-op for global services.
    ///
    /// Must be called from within a tokio runtime.
    pub fn scale_up(&self) {
        self.adjust_scale(ScaleStep::Up);
    }

    /// Request one fewer replica, never below 0. No-op for global services.
    ///
    /// Must be called from within a tokio runtime.
    pub fn scale_down(&self) {
        self.adjust_scale(ScaleStep::Down);
    }

    fn adjust_scale(&self, step: ScaleStep) {
        let state = self.state();
        if state.global {
            debug!(service = %self.id, "ignoring scale intent for global service");
            return;
        }

        let mut pending = lock(&self.pending);
        let base = match (&pending.timer, pending.scale) {
            (Some(_), Some(scale)) => scale,
            _ => {
                let summary = compute_scale(&state, None);
                summary.desired.as_fixed().unwrap_or(summary.current)
            }
        };

        let next = match step {
            ScaleStep::Up => base.saturating_add(1),
            ScaleStep::Down => base.saturating_sub(1),
        };

        self.arm(&mut pending, next);
    }

    /// Buffer `scale` and (re)start the debounce timer.
    fn arm(&self, pending: &mut PendingIntent, scale: u32) {
        if let Some(old) = pending.timer.take()
            && !old.fired
        {
            old.handle.abort();
        }

        pending.generation += 1;
        let generation = pending.generation;

        let handle = tokio::spawn(write_scale_after(
            self.id.clone(),
            self.store.clone(),
            self.notifier.clone(),
            self.state.clone(),
            self.pending.clone(),
            generation,
            self.debounce,
        ));

        pending.scale = Some(scale);
        pending.timer = Some(ScaleTimer {
            generation,
            fired: false,
            handle,
        });
        debug!(service = %self.id, replicas = scale, "scale intent buffered");
    }

    /// Write a new traffic weight immediately.
    ///
    /// NaN and infinite weights have no JSON form and are rejected without
    /// touching the store.
    pub async fn save_weight(&self, weight: f64) {
        if !weight.is_finite() {
            let err =
                StoreError::Rejected(format!("weight must be a finite number, got {weight}"));
            self.notifier.notify(Notification::new(WEIGHT_ERROR_TITLE, err));
            return;
        }
        self.write_now(WEIGHT_PATH, Value::from(weight), WEIGHT_ERROR_TITLE, |state| {
            state.spec_weight = Some(weight);
        })
        .await;
    }

    /// Pause the service's rollout.
    pub async fn pause(&self) {
        self.set_paused(true).await;
    }

    /// Resume the service's rollout.
    pub async fn resume(&self) {
        self.set_paused(false).await;
    }

    async fn set_paused(&self, pause: bool) {
        self.write_now(ROLLOUT_PAUSE_PATH, Value::from(pause), PAUSE_ERROR_TITLE, |_| {})
            .await;
    }

    async fn write_now(
        &self,
        path: &str,
        value: Value,
        title: &'static str,
        apply: impl FnOnce(&mut ResourceState),
    ) {
        let op = PatchOp::replace(path, value);
        match self.store.patch(&self.id, vec![op]).await {
            Ok(()) => {
                info!(service = %self.id, %path, "service updated");
                observe_write(&self.id, self.store.as_ref(), &self.state, apply).await;
            }
            Err(e) => self.notifier.notify(Notification::new(title, e)),
        }
    }
}

impl Drop for ServiceReconciler {
    fn drop(&mut self) {
        let mut pending = lock(&self.pending);
        pending.scale = None;
        if let Some(timer) = pending.timer.take()
            && !timer.fired
        {
            timer.handle.abort();
        }
    }
}

/// Debounce task: wait out the quiet period, then write the buffered scale.
async fn write_scale_after(
    id: ServiceId,
    store: Arc<dyn ResourceStore>,
    notifier: Arc<dyn Notifier>,
    state: Arc<Mutex<ResourceState>>,
    pending: Arc<Mutex<PendingIntent>>,
    generation: u64,
    delay: Duration,
) {
    tokio::time::sleep(delay).await;

    let scale = {
        let mut guard = lock(&pending);
        let intent = &mut *guard;
        match intent.timer.as_mut() {
            Some(timer) if timer.generation == generation => {
                timer.fired = true;
                intent.scale
            }
            // Re-armed after the sleep elapsed; the newer timer owns the intent.
            _ => None,
        }
    };
    let Some(scale) = scale else {
        return;
    };

    let op = PatchOp::replace(REPLICAS_PATH, scale);
    match store.patch(&id, vec![op]).await {
        Ok(()) => {
            info!(service = %id, replicas = scale, "scale updated");
            observe_write(&id, store.as_ref(), &state, |state| {
                state.spec_replicas = Some(scale);
            })
            .await;
        }
        Err(e) => notifier.notify(Notification::new(SCALE_ERROR_TITLE, e)),
    }

    let mut guard = lock(&pending);
    if guard
        .timer
        .as_ref()
        .is_some_and(|t| t.generation == generation)
    {
        guard.timer = None;
        guard.scale = None;
    }
}

/// Refresh the snapshot after an accepted write.
///
/// Falls back to applying the written field locally when the resource
/// cannot be re-read.
async fn observe_write(
    id: &str,
    store: &dyn ResourceStore,
    state: &Mutex<ResourceState>,
    apply: impl FnOnce(&mut ResourceState),
) {
    match fetch_service(store, id).await {
        Ok(service) => *lock(state) = ResourceState::from(&service),
        Err(e) => {
            debug!(service = %id, error = %e, "re-read after write failed, applying locally");
            apply(&mut lock(state));
        }
    }
}
