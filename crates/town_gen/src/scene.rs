//! Ordered scene product collection.
//!
//! The collection starts with a fixed prefix of persistent objects; every stage that
//! produced something appends one [`SubScene`] after it. Rebuilding from a stage removes
//! exactly the sub-scenes of that stage and the ones after it.
use std::sync::Arc;

use crate::product::Product;

/// A named sub-scene holding one stage's product.
#[derive(Debug, Clone)]
pub struct SubScene {
    /// Position of the producing stage in the pipeline.
    pub stage_index: usize,
    /// Label of the producing stage.
    pub label: String,
    /// The product shared with the control set of the pass that built it.
    pub product: Arc<Product>,
}

/// A node of the scene root.
#[derive(Debug, Clone)]
pub enum SceneNode {
    /// Engine-owned object that survives every rebuild.
    Persistent(&'static str),
    /// Stage output.
    Stage(SubScene),
}

impl SceneNode {
    pub fn name(&self) -> &str {
        match self {
            SceneNode::Persistent(name) => name,
            SceneNode::Stage(sub) => &sub.label,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SceneCollection {
    nodes: Vec<SceneNode>,
    persistent_len: usize,
}

impl SceneCollection {
    /// Create a collection whose persistent prefix is made of `names`.
    pub fn with_persistent<I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        let nodes: Vec<SceneNode> = names.into_iter().map(SceneNode::Persistent).collect();
        let persistent_len = nodes.len();
        Self {
            nodes,
            persistent_len,
        }
    }

    /// Number of persistent objects at the front of the collection.
    pub fn persistent_len(&self) -> usize {
        self.persistent_len
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    /// Iterate over the stage sub-scenes in insertion order.
    pub fn sub_scenes(&self) -> impl Iterator<Item = &SubScene> {
        self.nodes.iter().filter_map(|node| match node {
            SceneNode::Stage(sub) => Some(sub),
            SceneNode::Persistent(_) => None,
        })
    }

    /// Find the sub-scene produced by the stage with `label`.
    pub fn get(&self, label: &str) -> Option<&SubScene> {
        self.sub_scenes().find(|sub| sub.label == label)
    }

    pub(crate) fn push(&mut self, sub: SubScene) {
        self.nodes.push(SceneNode::Stage(sub));
    }

    /// Drop every sub-scene, keeping the persistent prefix. Returns the number removed.
    pub(crate) fn clear_all(&mut self) -> usize {
        let removed = self.nodes.len() - self.persistent_len;
        self.nodes.truncate(self.persistent_len);
        removed
    }

    /// Drop the sub-scenes built by stage `stage_index` and every later stage.
    pub(crate) fn clear_from(&mut self, stage_index: usize) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|node| match node {
            SceneNode::Stage(sub) => sub.stage_index < stage_index,
            SceneNode::Persistent(_) => true,
        });
        before - self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::water::WaterData;

    fn sub(index: usize, label: &str) -> SubScene {
        SubScene {
            stage_index: index,
            label: label.to_string(),
            product: Arc::new(Product::Water(WaterData {
                level: 0.5,
                rivers: false,
            })),
        }
    }

    fn populated() -> SceneCollection {
        let mut scene = SceneCollection::with_persistent(["lights", "camera"]);
        scene.push(sub(0, "ground"));
        scene.push(sub(1, "water"));
        scene.push(sub(3, "roads"));
        scene
    }

    #[test]
    fn clear_all_keeps_persistent_prefix() {
        let mut scene = populated();
        assert_eq!(scene.clear_all(), 3);
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.nodes()[0].name(), "lights");
    }

    #[test]
    fn clear_from_removes_resumed_stage_and_later() {
        let mut scene = populated();
        assert_eq!(scene.clear_from(1), 2);
        let labels: Vec<_> = scene.sub_scenes().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["ground"]);
    }

    #[test]
    fn clear_from_handles_stages_without_sub_scene() {
        let mut scene = populated();
        // stage 2 never produced a sub-scene; only roads (3) goes.
        assert_eq!(scene.clear_from(2), 1);
        assert!(scene.get("water").is_some());
        assert!(scene.get("roads").is_none());
    }
}
