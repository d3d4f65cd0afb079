use std::fmt::Write as _;
use std::path::Path;

use rio_core::{ServiceResource, available_actions};
use rio_scale::{ResourceState, ScaleSummary, Weights, compute_scale, compute_weights};
use rio_store::{FileStore, ResourceStore};

pub async fn list(store_path: &Path) -> anyhow::Result<()> {
    let store = FileStore::open(store_path).await?;
    for id in store.list().await? {
        println!("{id}");
    }
    Ok(())
}

pub async fn show(store_path: &Path, id: &str, format: &str) -> anyhow::Result<()> {
    let (_, service) = super::load(store_path, id).await?;
    let state = ResourceState::from(&service);
    let scales = compute_scale(&state, None);
    let weights = compute_weights(&state);

    match format {
        "json" => {
            let doc = to_json(&service, &scales, &weights);
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        _ => print!("{}", format_text(&service, &scales, &weights)),
    }
    Ok(())
}

fn to_json(
    service: &ServiceResource,
    scales: &ScaleSummary,
    weights: &Weights,
) -> serde_json::Value {
    serde_json::json!({
        "id": service.id,
        "name": service.name_display(),
        "namespaceName": service.namespace_name_display(),
        "image": service.image_display(),
        "scales": scales,
        "showDesiredScale": scales.show_desired_scale(),
        "complexScale": scales.complex_scale(),
        "scaleParts": scales.parts(),
        "weights": weights,
        "actions": available_actions(service),
    })
}

fn format_text(service: &ServiceResource, scales: &ScaleSummary, weights: &Weights) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Service:  {} ({})",
        service.namespace_name_display(),
        service.name_display()
    );
    let _ = writeln!(out, "Image:    {}", service.image_display());

    let mut scale_line = scales.current.to_string();
    if scales.global {
        scale_line.push_str(" (global)");
    } else if scales.show_desired_scale() {
        let _ = write!(scale_line, " (desired {})", scales.desired);
    }
    let _ = writeln!(out, "Scale:    {scale_line}");
    if scales.complex_scale() {
        for part in scales.parts() {
            let _ = writeln!(out, "  {:<12} {}", part.label, part.value);
        }
    }

    let _ = writeln!(out, "Weight:   current {}, desired {}", weights.current, weights.desired);

    let actions: Vec<&str> = available_actions(service)
        .into_iter()
        .filter(|a| a.enabled)
        .map(|a| a.label)
        .collect();
    let actions = if actions.is_empty() { "-".to_string() } else { actions.join(", ") };
    let _ = writeln!(out, "Actions:  {actions}");
    out
}
