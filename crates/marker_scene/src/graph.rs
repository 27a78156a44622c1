//! Scene graph seam
//!
//! The real graph lives in the rendering SDK. [`Scene`] is the slice of it
//! the placement code calls; [`SceneGraph`] keeps the same information in
//! memory for the binary and for tests.

use marker_asset::Renderable;
use marker_core::math::{Pose, Vec3};
use std::fmt;
use std::sync::Arc;

/// Anchor handle
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct AnchorId(u32);

impl fmt::Display for AnchorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anchor#{}", self.0)
    }
}

/// Scene node handle
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

pub trait Scene {
    fn create_anchor(&mut self, pose: Pose) -> AnchorId;

    fn set_anchor_pose(&mut self, anchor: AnchorId, pose: Pose);

    /// Create a child node of `parent` carrying `renderable`.
    fn attach(&mut self, parent: AnchorId, renderable: Arc<Renderable>, local_offset: Vec3)
        -> NodeId;

    fn start_animation(&mut self, node: NodeId, clip: usize);
}

/// Node as stored by [`SceneGraph`]
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub id: NodeId,
    pub parent: AnchorId,
    pub local_offset: Vec3,
    pub renderable: Arc<Renderable>,
    /// Clip being played, if any
    pub animation: Option<usize>,
}

#[derive(Default)]
pub struct SceneGraph {
    anchors: Vec<Pose>,
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    pub fn anchor_pose(&self, anchor: AnchorId) -> Option<Pose> {
        self.anchors.get(anchor.0 as usize).copied()
    }

    pub fn node(&self, node: NodeId) -> Option<&SceneNode> {
        self.nodes.get(node.0 as usize)
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn children(&self, anchor: AnchorId) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter().filter(move |node| node.parent == anchor)
    }

    /// Node position under its anchor's current pose.
    pub fn world_position(&self, node: NodeId) -> Option<Vec3> {
        let node = self.node(node)?;
        let pose = self.anchor_pose(node.parent)?;
        Some(pose.transform_point(node.local_offset))
    }
}

impl Scene for SceneGraph {
    fn create_anchor(&mut self, pose: Pose) -> AnchorId {
        let id = AnchorId(self.anchors.len() as u32);
        self.anchors.push(pose);
        id
    }

    fn set_anchor_pose(&mut self, anchor: AnchorId, pose: Pose) {
        match self.anchors.get_mut(anchor.0 as usize) {
            Some(current) => *current = pose,
            None => tracing::warn!(%anchor, "pose update for unknown anchor"),
        }
    }

    fn attach(
        &mut self,
        parent: AnchorId,
        renderable: Arc<Renderable>,
        local_offset: Vec3,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SceneNode {
            id,
            parent,
            local_offset,
            renderable,
            animation: None,
        });
        id
    }

    fn start_animation(&mut self, node: NodeId, clip: usize) {
        match self.nodes.get_mut(node.0 as usize) {
            Some(node) => node.animation = Some(clip),
            None => tracing::warn!(%node, "animation for unknown node"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_follow_their_anchor() {
        let mut graph = SceneGraph::new();
        let anchor = graph.create_anchor(Pose::IDENTITY);
        let node = graph.attach(
            anchor,
            Arc::new(Renderable::model("duck", vec![1])),
            Vec3::new(0.0, 0.5, 0.0),
        );
        assert_eq!(graph.world_position(node), Some(Vec3::new(0.0, 0.5, 0.0)));

        graph.set_anchor_pose(anchor, Pose::from_translation(Vec3::new(2.0, 0.0, 0.0)));
        assert_eq!(graph.world_position(node), Some(Vec3::new(2.0, 0.5, 0.0)));
        assert_eq!(graph.children(anchor).count(), 1);
    }

    #[test]
    fn animation_is_recorded_on_the_node() {
        let mut graph = SceneGraph::new();
        let anchor = graph.create_anchor(Pose::IDENTITY);
        let node = graph.attach(anchor, Arc::new(Renderable::model("andy", vec![1])), Vec3::ZERO);
        graph.start_animation(node, 2);
        assert_eq!(graph.node(node).and_then(|n| n.animation), Some(2));
    }
}
