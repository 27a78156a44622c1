//! Readiness gate
//!
//! Decides whether a set of loads has settled. When something is still
//! pending, the gate hands back a [`Continuation`] on the first pending
//! handle; awaiting it and checking again from the top covers any number of
//! pending handles, one resolution at a time.
//!
//! Failed handles never block the gate. They are logged once and reported in
//! the [`Settlement`] so callers can show a degraded scene instead of waiting
//! forever.

use marker_asset::{
    AssetId, AssetRegistry, LoadError, LoadHandle, LoadState, RegistryEntry, Renderable,
};
use std::collections::HashSet;
use std::future::{Future, IntoFuture};
use std::pin::Pin;

/// Outcome once no handle is pending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settlement {
    pub ready: Vec<AssetId>,
    pub failed: Vec<(AssetId, LoadError)>,
}

impl Settlement {
    /// Every handle reached `Ready`.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug)]
pub enum Readiness {
    /// Nothing is pending
    Settled(Settlement),
    /// At least one handle is pending; `continuation` watches the first one
    Pending {
        continuation: Continuation,
        pending: usize,
    },
}

/// Fires when the watched handle leaves `Pending`.
#[derive(Debug)]
pub struct Continuation {
    asset: AssetId,
    handle: LoadHandle<Renderable>,
}

impl Continuation {
    pub fn asset(&self) -> &AssetId {
        &self.asset
    }
}

impl IntoFuture for Continuation {
    type Output = (AssetId, LoadState<Renderable>);
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let state = self.handle.settled().await;
            (self.asset, state)
        })
    }
}

#[derive(Default)]
pub struct ReadinessGate {
    reported: HashSet<AssetId>,
}

impl ReadinessGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify every entry without waiting.
    pub fn check<'a>(
        &mut self,
        entries: impl IntoIterator<Item = &'a RegistryEntry>,
    ) -> Readiness {
        let mut settlement = Settlement::default();
        let mut first_pending: Option<&RegistryEntry> = None;
        let mut pending = 0;

        for entry in entries {
            match entry.handle().state() {
                LoadState::Ready(_) => settlement.ready.push(entry.id().clone()),
                LoadState::Failed(err) => {
                    if self.reported.insert(entry.id().clone()) {
                        tracing::warn!(
                            asset = %entry.id(),
                            error = %err,
                            "asset failed to load, skipping it"
                        );
                    }
                    settlement.failed.push((entry.id().clone(), err));
                }
                LoadState::Pending => {
                    pending += 1;
                    first_pending.get_or_insert(entry);
                }
            }
        }

        match first_pending {
            Some(entry) => Readiness::Pending {
                continuation: Continuation {
                    asset: entry.id().clone(),
                    handle: entry.handle().clone(),
                },
                pending,
            },
            None => Readiness::Settled(settlement),
        }
    }

    /// Run `on_ready` now if nothing is pending, otherwise return the
    /// continuation to await before asking again.
    ///
    /// Failed handles count as settled, so `on_ready` also runs when some
    /// loads failed; check [`Settlement::is_complete`] to tell the cases
    /// apart.
    pub fn await_all<'a, F>(
        &mut self,
        entries: impl IntoIterator<Item = &'a RegistryEntry>,
        on_ready: F,
    ) -> Option<Continuation>
    where
        F: FnOnce(&Settlement),
    {
        match self.check(entries) {
            Readiness::Settled(settlement) => {
                on_ready(&settlement);
                None
            }
            Readiness::Pending {
                continuation,
                pending,
            } => {
                tracing::debug!(waiting_on = %continuation.asset(), pending, "assets still loading");
                Some(continuation)
            }
        }
    }

    /// Wait until every handle in `registry` has settled.
    pub async fn wait_settled(&mut self, registry: &AssetRegistry) -> Settlement {
        loop {
            match self.check(registry.iter()) {
                Readiness::Settled(settlement) => return settlement,
                Readiness::Pending { continuation, .. } => {
                    continuation.await;
                }
            }
        }
    }
}
