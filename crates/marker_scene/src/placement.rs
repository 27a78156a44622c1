//! Placement routine
//!
//! Attaches one node per ready asset under a single anchor. Calling
//! [`Placer::place`] again only adds what became ready since the last call,
//! so re-running it after every load or tracking update never duplicates
//! nodes.

use crate::{AnchorContext, AnchorId, NodeId, Scene};
use marker_asset::{AssetId, AssetRegistry, LoadError, LoadState, Renderable};
use marker_core::math::Vec3;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// A node created for a ready asset
#[derive(Debug, Clone)]
pub struct PlacedNode {
    pub node: NodeId,
    pub asset: AssetId,
    pub parent: AnchorId,
    pub local_offset: Vec3,
    /// Position under the anchor pose of the most recent pass
    pub world_position: Vec3,
    pub renderable: Arc<Renderable>,
}

/// What a single call to [`Placer::place`] changed.
#[derive(Debug, Default)]
pub struct PlacementPass {
    /// Nodes created in this pass
    pub placed: Vec<PlacedNode>,
    /// Assets still loading
    pub deferred: Vec<AssetId>,
    /// Assets seen failed for the first time
    pub failed: Vec<(AssetId, LoadError)>,
    /// Animations started in this pass, as `(asset, node, clip)`
    pub animations: Vec<(AssetId, NodeId, usize)>,
}

impl PlacementPass {
    pub fn is_idle(&self) -> bool {
        self.placed.is_empty() && self.failed.is_empty()
    }
}

#[derive(Default)]
pub struct Placer {
    anchor: Option<AnchorId>,
    placed: BTreeMap<AssetId, PlacedNode>,
    failed: HashSet<AssetId>,
    next_clip: usize,
}

impl Placer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor(&self) -> Option<AnchorId> {
        self.anchor
    }

    pub fn is_placed(&self, asset: &AssetId) -> bool {
        self.placed.contains_key(asset)
    }

    /// Nodes placed so far, in asset id order.
    pub fn placed(&self) -> impl Iterator<Item = &PlacedNode> {
        self.placed.values()
    }

    pub fn placed_count(&self) -> usize {
        self.placed.len()
    }

    pub fn place<S>(
        &mut self,
        scene: &mut S,
        anchor: &AnchorContext,
        registry: &AssetRegistry,
    ) -> PlacementPass
    where
        S: Scene + ?Sized,
    {
        let anchor_id = self.bind_anchor(scene, anchor);
        let mut pass = PlacementPass::default();

        for entry in registry.iter() {
            let id = entry.id();
            if self.placed.contains_key(id) || self.failed.contains(id) {
                continue;
            }

            match entry.handle().state() {
                LoadState::Pending => pass.deferred.push(id.clone()),
                LoadState::Failed(err) => {
                    tracing::warn!(asset = %id, error = %err, "not placing failed asset");
                    self.failed.insert(id.clone());
                    pass.failed.push((id.clone(), err));
                }
                LoadState::Ready(renderable) => {
                    let local_offset = anchor.local_offset(&entry.descriptor().offset);
                    let node = scene.attach(anchor_id, Arc::clone(&renderable), local_offset);
                    tracing::debug!(asset = %id, %node, ?local_offset, "attached node");

                    if entry.descriptor().animate {
                        if let Some(clip) = self.take_clip(&renderable) {
                            scene.start_animation(node, clip);
                            pass.animations.push((id.clone(), node, clip));
                        } else {
                            tracing::debug!(asset = %id, "no animation clips to play");
                        }
                    }

                    let placed = PlacedNode {
                        node,
                        asset: id.clone(),
                        parent: anchor_id,
                        local_offset,
                        world_position: anchor.world_position(local_offset),
                        renderable,
                    };
                    self.placed.insert(id.clone(), placed.clone());
                    pass.placed.push(placed);
                }
            }
        }

        pass
    }

    /// Create the anchor on first use, otherwise move it to the new pose.
    fn bind_anchor<S>(&mut self, scene: &mut S, anchor: &AnchorContext) -> AnchorId
    where
        S: Scene + ?Sized,
    {
        match self.anchor {
            Some(id) => {
                scene.set_anchor_pose(id, anchor.pose);
                for placed in self.placed.values_mut() {
                    placed.world_position = anchor.world_position(placed.local_offset);
                }
                id
            }
            None => {
                let id = scene.create_anchor(anchor.pose);
                tracing::debug!(anchor = %id, "anchor created");
                self.anchor = Some(id);
                id
            }
        }
    }

    fn take_clip(&mut self, renderable: &Renderable) -> Option<usize> {
        let count = renderable.clip_count();
        if count == 0 {
            return None;
        }
        let clip = self.next_clip % count;
        self.next_clip = (clip + 1) % count;
        Some(clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{duck, empty_registry, model};
    use crate::SceneGraph;
    use marker_asset::{AssetDescriptor, AssetSource, LoadHandle, Offset};
    use marker_core::math::{Pose, Quat};

    fn anchor_at(x: f32, y: f32, z: f32) -> AnchorContext {
        AnchorContext::new(Pose::from_translation(Vec3::new(x, y, z)), 0.5, 0.25)
    }

    #[test]
    fn ready_asset_is_placed_at_its_offset_under_the_anchor() {
        let mut registry = empty_registry();
        registry.register(duck([0.0, 0.1, -0.2]), LoadHandle::ready(model("duck")));

        let mut scene = SceneGraph::new();
        let mut placer = Placer::new();
        let pass = placer.place(&mut scene, &anchor_at(1.0, 0.0, 0.0), &registry);

        assert_eq!(pass.placed.len(), 1);
        let node = &pass.placed[0];
        assert_eq!(node.local_offset, Vec3::new(0.0, 0.1, -0.2));
        assert_eq!(Some(node.parent), placer.anchor());
        assert_eq!(scene.node(node.node).map(|n| n.parent), placer.anchor());
        assert_eq!(node.world_position, Vec3::new(1.0, 0.1, -0.2));
    }

    #[test]
    fn pending_asset_is_deferred() {
        let mut registry = empty_registry();
        let (_completer, handle) = LoadHandle::pending();
        registry.register(duck([0.0; 3]), handle);

        let mut scene = SceneGraph::new();
        let pass = Placer::new().place(&mut scene, &anchor_at(0.0, 0.0, 0.0), &registry);

        assert!(pass.placed.is_empty());
        assert_eq!(pass.deferred, vec![AssetId::from("duck")]);
        assert!(scene.nodes().is_empty());
    }

    #[test]
    fn repeated_passes_do_not_duplicate_nodes() {
        let mut registry = empty_registry();
        registry.register(duck([0.0; 3]), LoadHandle::ready(model("duck")));
        let (_completer, handle) = LoadHandle::pending();
        registry.register(AssetDescriptor::model("brain", "brain.sfb", [0.0; 3]), handle);

        let mut scene = SceneGraph::new();
        let mut placer = Placer::new();
        let anchor = anchor_at(0.0, 0.0, 0.0);
        let first = placer.place(&mut scene, &anchor, &registry);
        let second = placer.place(&mut scene, &anchor, &registry);

        assert_eq!(first.placed.len(), 1);
        assert!(second.placed.is_empty());
        assert_eq!(scene.nodes().len(), 1);
        assert_eq!(scene.anchor_count(), 1);
        assert_eq!(placer.placed_count(), 1);
    }

    #[test]
    fn failed_asset_is_reported_once_and_never_attached() {
        let mut registry = empty_registry();
        registry.register(duck([0.0; 3]), LoadHandle::ready(model("duck")));
        registry.register(
            AssetDescriptor::model("brain", "brain.sfb", [0.0; 3]),
            LoadHandle::failed(LoadError::Abandoned),
        );

        let mut scene = SceneGraph::new();
        let mut placer = Placer::new();
        let anchor = anchor_at(0.0, 0.0, 0.0);
        let first = placer.place(&mut scene, &anchor, &registry);
        let second = placer.place(&mut scene, &anchor, &registry);

        assert_eq!(first.placed.len(), 1);
        assert_eq!(first.failed, vec![(AssetId::from("brain"), LoadError::Abandoned)]);
        assert!(second.failed.is_empty());
        assert!(!placer.is_placed(&AssetId::from("brain")));
        assert_eq!(scene.nodes().len(), 1);
    }

    #[test]
    fn anchor_moves_instead_of_being_recreated() {
        let mut registry = empty_registry();
        registry.register(duck([0.0; 3]), LoadHandle::ready(model("duck")));

        let mut scene = SceneGraph::new();
        let mut placer = Placer::new();
        placer.place(&mut scene, &anchor_at(0.0, 0.0, 0.0), &registry);
        let moved = AnchorContext::new(
            Pose::new(Vec3::new(0.0, 0.0, -1.0), Quat::IDENTITY),
            0.5,
            0.25,
        );
        placer.place(&mut scene, &moved, &registry);

        let anchor = placer.anchor().unwrap();
        assert_eq!(scene.anchor_count(), 1);
        assert_eq!(scene.anchor_pose(anchor), Some(moved.pose));
        let node = placer.placed().next().unwrap();
        assert_eq!(node.world_position, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn extent_scaled_offset_uses_image_size() {
        let mut registry = empty_registry();
        registry.register(
            AssetDescriptor::new(
                "cesium_man",
                AssetSource::Model("CesiumMan.sfb".into()),
                Offset::ExtentScaled(Vec3::new(-0.5, 0.0, -0.5)),
            ),
            LoadHandle::ready(model("cesium_man")),
        );

        let mut scene = SceneGraph::new();
        let pass = Placer::new().place(&mut scene, &anchor_at(0.0, 0.0, 0.0), &registry);
        assert_eq!(pass.placed[0].local_offset, Vec3::new(-0.25, 0.0, -0.125));
    }

    #[test]
    fn animated_assets_cycle_through_clips() {
        let mut registry = empty_registry();
        for name in ["andy_a", "andy_b", "andy_c"] {
            registry.register(
                AssetDescriptor::model(name, "andy_dance.sfb", [0.0; 3]).with_animation(),
                LoadHandle::ready(model(name).with_clips(2)),
            );
        }
        registry.register(
            AssetDescriptor::model("still", "still.sfb", [0.0; 3]).with_animation(),
            LoadHandle::ready(model("still")),
        );

        let mut scene = SceneGraph::new();
        let mut placer = Placer::new();
        let pass = placer.place(&mut scene, &anchor_at(0.0, 0.0, 0.0), &registry);

        let clips: Vec<usize> = pass.animations.iter().map(|(_, _, clip)| *clip).collect();
        assert_eq!(clips, vec![0, 1, 0]);
        for (_, node, clip) in &pass.animations {
            assert_eq!(scene.node(*node).and_then(|n| n.animation), Some(*clip));
        }

        // Placed assets are never re-animated.
        let again = placer.place(&mut scene, &anchor_at(0.0, 0.0, 0.0), &registry);
        assert!(again.animations.is_empty());
    }
}
