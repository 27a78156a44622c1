//! Marker Runtime
//!
//! Fetches the asset manifest, starts every load, and places the assets on
//! a (simulated) tracked image as they become ready.
//!
//! Usage: `marker [settings.json]`

use anyhow::{Context, Result};
use marker_asset::{AssetRegistry, SourceLoader};
use marker_scene::{PlacementEvent, SceneGraph, Session};
use marker_services::tracking::spawn_simulated_tracking;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    tracing::info!("Marker v{}", marker_core::VERSION);

    let settings_path = std::env::args().nth(1).map(PathBuf::from);
    let settings = marker_services::load_settings(settings_path.as_deref())
        .context("failed to load settings")?;

    let manifest = match marker_services::fetch_manifest(&settings.manifest.url).await {
        Ok(manifest) => manifest,
        Err(err) => {
            tracing::error!(error = %err, "cannot start without an asset manifest");
            return Err(err).context("failed to fetch asset manifest");
        }
    };

    let loader = Arc::new(SourceLoader::new(&settings.loading.layout_dir));
    let mut registry = AssetRegistry::new(loader, settings.loading.timeout());
    let count = marker_services::register_assets(&mut registry, manifest, &settings.builtin_assets);
    tracing::info!(assets = count, "loads issued");

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let tracking = spawn_simulated_tracking(&settings.tracking);
    let session = Session::new(registry, SceneGraph::new()).with_events(events_tx);
    let running = tokio::spawn(session.run(tracking));

    // Drains until the session finishes and drops its sender.
    while let Some(event) = events_rx.recv().await {
        match event {
            PlacementEvent::Failed { asset, error } => {
                tracing::warn!(%asset, %error, "asset unavailable, scene is incomplete")
            }
            PlacementEvent::Settled { placed, failed } => {
                tracing::info!(placed, failed, "every asset has settled")
            }
            PlacementEvent::Placed { .. } | PlacementEvent::AnimationStarted { .. } => {}
        }
    }

    let report = running.await.context("placement session panicked")?;
    tracing::info!(
        placed = report.placed.len(),
        failed = report.failed.len(),
        passes = report.passes,
        "session finished"
    );

    Ok(())
}
