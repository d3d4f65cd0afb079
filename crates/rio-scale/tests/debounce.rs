//! Debounced scale writes and immediate weight/pause writes against a
//! recording store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rio_core::ServiceResource;
use rio_scale::{ChannelNotifier, Desired, ServiceReconciler};
use rio_store::patch::{REPLICAS_PATH, ROLLOUT_PAUSE_PATH, WEIGHT_PATH};
use rio_store::{
    MemoryStore, PatchKind, PatchOp, ResourceStore, StoreError, StoreFuture, fetch_service,
};
use serde_json::{Value, json};
use tokio::sync::Semaphore;
use tokio::time::sleep;

/// Records every patch; optionally rejects them or holds them until released.
struct RecordingStore {
    patches: Mutex<Vec<Vec<PatchOp>>>,
    fail: AtomicBool,
    gate: Option<Semaphore>,
}

impl RecordingStore {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            patches: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            gate: None,
        })
    }

    fn gated() -> Arc<Self> {
        Arc::new(Self {
            patches: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            gate: Some(Semaphore::new(0)),
        })
    }

    fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    fn patches(&self) -> Vec<Vec<PatchOp>> {
        self.patches.lock().unwrap().clone()
    }

    fn replica_writes(&self) -> Vec<Value> {
        self.patches()
            .into_iter()
            .flatten()
            .filter(|op| op.path == REPLICAS_PATH)
            .filter_map(|op| op.value)
            .collect()
    }
}

impl ResourceStore for RecordingStore {
    fn get<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Value> {
        Box::pin(async move { Err(StoreError::NotFound(id.to_string())) })
    }

    fn patch<'a>(&'a self, _id: &'a str, ops: Vec<PatchOp>) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.patches.lock().unwrap().push(ops);
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::Rejected("conflict".to_string()));
            }
            Ok(())
        })
    }

    fn put<'a>(&'a self, _id: &'a str, _doc: Value) -> StoreFuture<'a, ()> {
        Box::pin(async move { Ok(()) })
    }

    fn list(&self) -> StoreFuture<'_, Vec<String>> {
        Box::pin(async move { Ok(Vec::new()) })
    }
}

fn service(replicas: u32) -> ServiceResource {
    let mut svc = ServiceResource {
        id: "default/api".to_string(),
        ..Default::default()
    };
    svc.spec.replicas = Some(replicas);
    svc
}

#[tokio::test(start_paused = true)]
async fn rapid_scale_ups_coalesce_into_one_write() {
    let store = RecordingStore::new();
    let (notifier, mut rx) = ChannelNotifier::channel();
    let reconciler = ServiceReconciler::new(&service(2), store.clone(), Arc::new(notifier));

    reconciler.scale_up();
    reconciler.scale_up();
    reconciler.scale_up();
    assert_eq!(reconciler.pending_scale(), Some(5));
    assert!(store.patches().is_empty());

    sleep(Duration::from_millis(600)).await;

    assert_eq!(
        store.patches(),
        vec![vec![PatchOp::replace(REPLICAS_PATH, 5)]]
    );
    assert_eq!(store.patches()[0][0].op, PatchKind::Replace);
    assert_eq!(reconciler.pending_scale(), None);
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn each_intent_restarts_the_quiet_period() {
    let store = RecordingStore::new();
    let (notifier, _rx) = ChannelNotifier::channel();
    let reconciler = ServiceReconciler::new(&service(2), store.clone(), Arc::new(notifier));

    reconciler.scale_up();
    sleep(Duration::from_millis(400)).await;
    reconciler.scale_up();
    sleep(Duration::from_millis(400)).await;
    assert!(store.patches().is_empty());

    sleep(Duration::from_millis(200)).await;
    assert_eq!(store.replica_writes(), vec![json!(4)]);
}

#[tokio::test(start_paused = true)]
async fn custom_debounce_window() {
    let store = RecordingStore::new();
    let (notifier, _rx) = ChannelNotifier::channel();
    let reconciler = ServiceReconciler::new(&service(2), store.clone(), Arc::new(notifier))
        .with_debounce(Duration::from_millis(50));

    reconciler.scale_down();
    sleep(Duration::from_millis(60)).await;
    assert_eq!(store.replica_writes(), vec![json!(1)]);
}

#[tokio::test(start_paused = true)]
async fn mixed_intents_write_the_latest_value() {
    let store = RecordingStore::new();
    let (notifier, _rx) = ChannelNotifier::channel();
    let reconciler = ServiceReconciler::new(&service(2), store.clone(), Arc::new(notifier));

    reconciler.scale_up();
    reconciler.scale_up();
    reconciler.scale_down();
    assert_eq!(reconciler.scales().desired, Desired::Fixed(3));

    sleep(Duration::from_millis(600)).await;
    assert_eq!(store.replica_writes(), vec![json!(3)]);
}

#[tokio::test(start_paused = true)]
async fn failed_write_notifies_once_and_clears_intent() {
    let store = RecordingStore::new();
    store.fail.store(true, Ordering::SeqCst);
    let (notifier, mut rx) = ChannelNotifier::channel();
    let reconciler = ServiceReconciler::new(&service(2), store.clone(), Arc::new(notifier));

    reconciler.scale_up();
    reconciler.scale_up();
    sleep(Duration::from_millis(600)).await;

    let notification = rx.try_recv().unwrap();
    assert_eq!(notification.title, "Error updating scale");
    assert!(matches!(*notification.error, StoreError::Rejected(_)));
    assert!(rx.try_recv().is_err());
    assert_eq!(reconciler.pending_scale(), None);

    // The lost value (4) is not the base for the next intent.
    store.fail.store(false, Ordering::SeqCst);
    reconciler.scale_up();
    assert_eq!(reconciler.pending_scale(), Some(3));
    sleep(Duration::from_millis(600)).await;
    assert_eq!(store.replica_writes(), vec![json!(4), json!(3)]);
}

#[tokio::test(start_paused = true)]
async fn second_burst_builds_on_written_scale() {
    let store = Arc::new(MemoryStore::new());
    let svc = service(2);
    store.put_service(&svc).await.unwrap();
    let (notifier, _rx) = ChannelNotifier::channel();
    let reconciler = ServiceReconciler::new(&svc, store.clone(), Arc::new(notifier));

    reconciler.scale_up();
    reconciler.scale_up();
    reconciler.scale_up();
    sleep(Duration::from_millis(600)).await;
    assert_eq!(reconciler.pending_scale(), None);
    assert_eq!(reconciler.scales().desired, Desired::Fixed(5));

    reconciler.scale_up();
    assert_eq!(reconciler.pending_scale(), Some(6));
    sleep(Duration::from_millis(600)).await;

    let stored = fetch_service(store.as_ref(), "default/api").await.unwrap();
    assert_eq!(stored.spec.replicas, Some(6));
}

#[tokio::test(start_paused = true)]
async fn written_scale_is_kept_when_reread_fails() {
    // RecordingStore cannot serve reads.
    let store = RecordingStore::new();
    let (notifier, _rx) = ChannelNotifier::channel();
    let reconciler = ServiceReconciler::new(&service(2), store.clone(), Arc::new(notifier));

    reconciler.scale_up();
    sleep(Duration::from_millis(600)).await;
    assert_eq!(reconciler.state().spec_replicas, Some(3));

    reconciler.scale_down();
    reconciler.scale_down();
    sleep(Duration::from_millis(600)).await;
    assert_eq!(store.replica_writes(), vec![json!(3), json!(1)]);
}

#[tokio::test(start_paused = true)]
async fn global_service_ignores_scale_intents() {
    let store = RecordingStore::new();
    let (notifier, _rx) = ChannelNotifier::channel();
    let mut svc = service(2);
    svc.spec.global = true;
    let reconciler = ServiceReconciler::new(&svc, store.clone(), Arc::new(notifier));

    let before = reconciler.scales();
    reconciler.scale_up();
    reconciler.scale_down();
    assert_eq!(reconciler.pending_scale(), None);
    assert_eq!(reconciler.scales(), before);

    sleep(Duration::from_secs(1)).await;
    assert!(store.patches().is_empty());
}

#[tokio::test(start_paused = true)]
async fn intent_during_inflight_write_issues_a_second_write() {
    let store = RecordingStore::gated();
    let (notifier, _rx) = ChannelNotifier::channel();
    let reconciler = ServiceReconciler::new(&service(2), store.clone(), Arc::new(notifier));

    reconciler.scale_up();
    sleep(Duration::from_millis(600)).await;
    // First write (3) is in flight and held by the gate.
    assert_eq!(store.replica_writes(), vec![json!(3)]);
    assert_eq!(reconciler.pending_scale(), Some(3));

    // Coalesces on top of the in-flight value.
    reconciler.scale_up();
    assert_eq!(reconciler.pending_scale(), Some(4));

    store.release();
    sleep(Duration::from_millis(10)).await;
    // The finished first write leaves the newer intent alone.
    assert_eq!(reconciler.pending_scale(), Some(4));

    store.release();
    sleep(Duration::from_millis(600)).await;
    assert_eq!(store.replica_writes(), vec![json!(3), json!(4)]);
    assert_eq!(reconciler.pending_scale(), None);
}

#[tokio::test]
async fn save_weight_writes_immediately() {
    let store = RecordingStore::new();
    let (notifier, mut rx) = ChannelNotifier::channel();
    let reconciler = ServiceReconciler::new(&service(1), store.clone(), Arc::new(notifier));

    reconciler.save_weight(30.0).await;
    assert_eq!(
        store.patches(),
        vec![vec![PatchOp::replace(WEIGHT_PATH, 30.0)]]
    );
    assert!(rx.try_recv().is_err());

    store.fail.store(true, Ordering::SeqCst);
    reconciler.save_weight(40.0).await;
    assert_eq!(rx.try_recv().unwrap().title, "Error updating weight");
    assert_eq!(store.patches().len(), 2);
}

#[tokio::test]
async fn saved_weight_shows_in_snapshot() {
    let store = RecordingStore::new();
    let (notifier, _rx) = ChannelNotifier::channel();
    let reconciler = ServiceReconciler::new(&service(1), store.clone(), Arc::new(notifier));

    reconciler.save_weight(30.0).await;
    assert_eq!(reconciler.state().spec_weight, Some(30.0));
}

#[tokio::test]
async fn non_finite_weight_is_rejected_without_a_write() {
    let store = RecordingStore::new();
    let (notifier, mut rx) = ChannelNotifier::channel();
    let mut svc = service(1);
    svc.spec.weight = Some(10.0);
    let reconciler = ServiceReconciler::new(&svc, store.clone(), Arc::new(notifier));

    for weight in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        reconciler.save_weight(weight).await;
        let notification = rx.try_recv().unwrap();
        assert_eq!(notification.title, "Error updating weight");
        assert!(matches!(*notification.error, StoreError::Rejected(_)));
    }
    assert!(rx.try_recv().is_err());
    assert!(store.patches().is_empty());
    assert_eq!(reconciler.state().spec_weight, Some(10.0));
}

#[tokio::test]
async fn pause_and_resume_toggle_rollout_flag() {
    let store = RecordingStore::new();
    let (notifier, mut rx) = ChannelNotifier::channel();
    let reconciler = ServiceReconciler::new(&service(1), store.clone(), Arc::new(notifier));

    reconciler.pause().await;
    reconciler.resume().await;
    assert_eq!(
        store.patches(),
        vec![
            vec![PatchOp::replace(ROLLOUT_PAUSE_PATH, true)],
            vec![PatchOp::replace(ROLLOUT_PAUSE_PATH, false)],
        ]
    );

    store.fail.store(true, Ordering::SeqCst);
    reconciler.pause().await;
    let notification = rx.try_recv().unwrap();
    assert_eq!(notification.title, "Error updating pause");
    assert!(rx.try_recv().is_err());
}
