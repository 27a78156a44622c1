//! Placement session
//!
//! Owns the registry, the scene and the placer for one tracked marker and
//! drives them from a single task:
//! - every tracking update re-runs placement with the new anchor pose
//! - while the readiness gate reports a pending load, its continuation is
//!   raced against the next tracking update; either one re-runs placement
//!
//! Progress is published as [`PlacementEvent`]s so a host can show which
//! assets are up and which failed.

use crate::{
    AnchorContext, Continuation, NodeId, PlacedNode, PlacementPass, Placer, ReadinessGate, Scene,
    TrackedImage,
};
use marker_asset::{AssetId, AssetRegistry, LoadError, LoadState, Renderable};
use marker_core::math::Vec3;
use tokio::sync::mpsc;

/// Per-asset status published while a session runs
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementEvent {
    Placed {
        asset: AssetId,
        node: NodeId,
        world_position: Vec3,
    },
    Failed {
        asset: AssetId,
        error: LoadError,
    },
    AnimationStarted {
        asset: AssetId,
        node: NodeId,
        clip: usize,
    },
    /// Every load has finished; sent once
    Settled { placed: usize, failed: usize },
}

/// Final state of a session
#[derive(Debug)]
pub struct SessionReport {
    pub placed: Vec<PlacedNode>,
    pub failed: Vec<(AssetId, LoadError)>,
    /// Number of placement passes run
    pub passes: usize,
}

pub struct Session<S: Scene> {
    registry: AssetRegistry,
    scene: S,
    placer: Placer,
    gate: ReadinessGate,
    events: Option<mpsc::UnboundedSender<PlacementEvent>>,
    failed: Vec<(AssetId, LoadError)>,
    passes: usize,
    settled: bool,
}

impl<S: Scene> Session<S> {
    pub fn new(registry: AssetRegistry, scene: S) -> Self {
        Self {
            registry,
            scene,
            placer: Placer::new(),
            gate: ReadinessGate::new(),
            events: None,
            failed: Vec::new(),
            passes: 0,
            settled: false,
        }
    }

    /// Publish [`PlacementEvent`]s on `events`.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<PlacementEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn placer(&self) -> &Placer {
        &self.placer
    }

    /// Run one placement pass against `anchor` and publish what changed.
    pub fn place(&mut self, anchor: &AnchorContext) -> PlacementPass {
        let pass = self.placer.place(&mut self.scene, anchor, &self.registry);
        self.passes += 1;

        for placed in &pass.placed {
            tracing::info!(
                asset = %placed.asset,
                node = %placed.node,
                position = ?placed.world_position,
                "placed asset"
            );
            self.emit(PlacementEvent::Placed {
                asset: placed.asset.clone(),
                node: placed.node,
                world_position: placed.world_position,
            });
        }
        for (asset, node, clip) in &pass.animations {
            tracing::info!(%asset, %node, clip, "started animation");
            self.emit(PlacementEvent::AnimationStarted {
                asset: asset.clone(),
                node: *node,
                clip: *clip,
            });
        }
        for (asset, error) in &pass.failed {
            self.emit(PlacementEvent::Failed {
                asset: asset.clone(),
                error: error.clone(),
            });
        }
        self.failed.extend(pass.failed.iter().cloned());

        pass
    }

    /// Place, then ask the gate what to wait for.
    fn step(&mut self, anchor: &AnchorContext) -> Option<Continuation> {
        self.place(anchor);
        self.watch()
    }

    /// Continuation on the first pending load, or `None` once every load
    /// has settled.
    fn watch(&mut self) -> Option<Continuation> {
        let placed = self.placer.placed_count();
        let settled = &mut self.settled;
        let events = &self.events;
        self.gate.await_all(self.registry.iter(), |settlement| {
            if *settled {
                return;
            }
            *settled = true;
            tracing::info!(
                placed,
                failed = settlement.failed.len(),
                "all assets settled"
            );
            if let Some(tx) = events {
                let _ = tx.send(PlacementEvent::Settled {
                    placed,
                    failed: settlement.failed.len(),
                });
            }
        })
    }

    /// Drive placement from `tracking` until the feed closes and every load
    /// has settled.
    ///
    /// With no tracking update ever received nothing can be placed, and the
    /// session ends as soon as the feed closes.
    pub async fn run(mut self, mut tracking: mpsc::Receiver<TrackedImage>) -> SessionReport {
        let mut anchor: Option<AnchorContext> = None;
        let mut continuation: Option<Continuation> = None;
        let mut tracking_open = true;

        while tracking_open || continuation.is_some() {
            let waiting = continuation.is_some();
            tokio::select! {
                // Settled loads go first so a closing feed never hides one.
                biased;

                (asset, state) = next_settled(continuation.take()) => {
                    tracing::debug!(%asset, ?state, "load settled, re-running placement");
                    continuation = match &anchor {
                        Some(ctx) => self.step(ctx),
                        None => None,
                    };
                }
                update = tracking.recv(), if tracking_open => match update {
                    Some(image) => {
                        tracing::debug!(image = %image.name, "tracking update");
                        let ctx = AnchorContext::from_image(&image);
                        continuation = self.step(&ctx);
                        anchor = Some(ctx);
                    }
                    None => {
                        tracing::debug!("tracking feed closed");
                        tracking_open = false;
                        // A load may have finished since the last pass.
                        continuation = match &anchor {
                            Some(ctx) if waiting => self.step(ctx),
                            _ => None,
                        };
                    }
                },
            }
        }

        self.into_report()
    }

    pub fn into_report(self) -> SessionReport {
        SessionReport {
            placed: self.placer.placed().cloned().collect(),
            failed: self.failed,
            passes: self.passes,
        }
    }

    fn emit(&self, event: PlacementEvent) {
        if let Some(tx) = &self.events {
            // A host that stopped listening does not stop placement.
            let _ = tx.send(event);
        }
    }
}

async fn next_settled(continuation: Option<Continuation>) -> (AssetId, LoadState<Renderable>) {
    match continuation {
        Some(continuation) => continuation.await,
        None => std::future::pending().await,
    }
}
