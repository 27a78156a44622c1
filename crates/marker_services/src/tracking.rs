//! Simulated tracking provider
//!
//! Stands in for the AR runtime: reports the configured image pose a fixed
//! number of times, then closes the feed.

use crate::settings::TrackingSettings;
use marker_scene::TrackedImage;
use tokio::sync::mpsc;

pub fn spawn_simulated_tracking(settings: &TrackingSettings) -> mpsc::Receiver<TrackedImage> {
    let (tx, rx) = mpsc::channel(8);
    let image = settings.image();
    let updates = settings.updates;
    let mut ticker = tokio::time::interval(settings.interval());

    tokio::spawn(async move {
        for _ in 0..updates {
            ticker.tick().await;
            if tx.send(image.clone()).await.is_err() {
                tracing::debug!("tracking consumer went away");
                break;
            }
        }
    });

    rx
}
