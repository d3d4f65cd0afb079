use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rio_scale::{ChannelNotifier, Notification, ServiceReconciler};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

/// Polling interval while waiting for a debounced write to settle.
const SETTLE_POLL: Duration = Duration::from_millis(25);

async fn reconciler(
    store_path: &Path,
    id: &str,
    debounce: Duration,
) -> anyhow::Result<(ServiceReconciler, UnboundedReceiver<Notification>)> {
    let (store, service) = super::load(store_path, id).await?;
    let (notifier, rx) = ChannelNotifier::channel();
    let reconciler = ServiceReconciler::new(&service, Arc::new(store), Arc::new(notifier))
        .with_debounce(debounce);
    Ok((reconciler, rx))
}

/// Print any failure notifications and turn them into an exit error.
fn report(mut rx: UnboundedReceiver<Notification>) -> anyhow::Result<()> {
    let mut failed = 0;
    while let Ok(notification) = rx.try_recv() {
        eprintln!("✗ {notification}");
        failed += 1;
    }
    if failed > 0 {
        anyhow::bail!("{failed} update(s) failed");
    }
    Ok(())
}

pub async fn scale(
    store_path: &Path,
    id: &str,
    up: u32,
    down: u32,
    debounce: Duration,
) -> anyhow::Result<()> {
    let (reconciler, rx) = reconciler(store_path, id, debounce).await?;

    for _ in 0..up {
        reconciler.scale_up();
    }
    for _ in 0..down {
        reconciler.scale_down();
    }

    let Some(target) = reconciler.pending_scale() else {
        println!("{id}: nothing to scale");
        return Ok(());
    };

    while reconciler.pending_scale().is_some() {
        tokio::time::sleep(SETTLE_POLL).await;
    }
    debug!(service = %id, replicas = target, "scale settled");

    report(rx)?;
    println!("✓ {id} scaled to {target}");
    Ok(())
}

pub async fn weight(store_path: &Path, id: &str, weight: f64) -> anyhow::Result<()> {
    let (reconciler, rx) = reconciler(store_path, id, Duration::ZERO).await?;
    reconciler.save_weight(weight).await;
    report(rx)?;
    println!("✓ {id} weight set to {weight}");
    Ok(())
}

pub async fn pause(store_path: &Path, id: &str, pause: bool) -> anyhow::Result<()> {
    let (reconciler, rx) = reconciler(store_path, id, Duration::ZERO).await?;
    if pause {
        reconciler.pause().await;
    } else {
        reconciler.resume().await;
    }
    report(rx)?;
    println!("✓ {id} rollout {}", if pause { "paused" } else { "resumed" });
    Ok(())
}
