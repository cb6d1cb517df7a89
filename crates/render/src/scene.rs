use std::collections::BTreeMap;

use cityscape_common::NodeId;
use glam::DVec3;

use crate::primitives::SceneNode;

/// The visible scene as seen from the generator.
///
/// The generator keeps ownership of every node; the sink only records what
/// it needs to draw. Attaching receives the node mutably so the sink can
/// upload dirty line data and clear the flag.
pub trait SceneSink {
    fn attach(&mut self, node: &mut SceneNode);
    fn detach(&mut self, node: &SceneNode);
}

/// What the recording scene keeps for one attached node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttachedNode {
    pub origin: DVec3,
    pub lines: usize,
    pub meshes: usize,
}

/// Headless sink that tracks attached nodes and upload traffic.
///
/// Used by the CLI and tests in place of a GPU-backed scene.
#[derive(Debug, Default)]
pub struct RecordingScene {
    attached: BTreeMap<NodeId, AttachedNode>,
    attach_count: usize,
    detach_count: usize,
    line_uploads: usize,
}

impl RecordingScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.attached.contains_key(&id)
    }

    pub fn attached(&self) -> &BTreeMap<NodeId, AttachedNode> {
        &self.attached
    }

    pub fn node_count(&self) -> usize {
        self.attached.len()
    }

    pub fn attach_count(&self) -> usize {
        self.attach_count
    }

    pub fn detach_count(&self) -> usize {
        self.detach_count
    }

    /// Lines whose vertex data was (re)uploaded on attach.
    pub fn line_uploads(&self) -> usize {
        self.line_uploads
    }

    pub fn total_lines(&self) -> usize {
        self.attached.values().map(|n| n.lines).sum()
    }

    pub fn total_meshes(&self) -> usize {
        self.attached.values().map(|n| n.meshes).sum()
    }
}

impl SceneSink for RecordingScene {
    fn attach(&mut self, node: &mut SceneNode) {
        for line in node.lines.iter_mut().filter(|l| l.needs_upload()) {
            line.mark_uploaded();
            self.line_uploads += 1;
        }
        let entry = AttachedNode {
            origin: node.origin,
            lines: node.line_count(),
            meshes: node.mesh_count(),
        };
        if self.attached.insert(node.id, entry).is_some() {
            tracing::warn!(node = %node.id.short(), "node attached twice");
        }
        self.attach_count += 1;
    }

    fn detach(&mut self, node: &SceneNode) {
        if self.attached.remove(&node.id).is_none() {
            tracing::warn!(node = %node.id.short(), "detaching node that is not attached");
            return;
        }
        self.detach_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::LineSegment;
    use glam::Vec3;

    fn node_with_lines(count: usize) -> SceneNode {
        let mut node = SceneNode::new();
        for i in 0..count {
            let z = -(i as f32);
            node.lines
                .push(LineSegment::new(Vec3::new(-1.0, 0.0, z), Vec3::new(1.0, 0.0, z)));
        }
        node
    }

    #[test]
    fn attach_uploads_dirty_lines_once() {
        let mut scene = RecordingScene::new();
        let mut node = node_with_lines(3);
        node.lines[1].mark_uploaded();

        scene.attach(&mut node);
        assert_eq!(scene.line_uploads(), 2);
        assert!(node.lines.iter().all(|l| !l.needs_upload()));
        assert!(scene.is_attached(node.id));
        assert_eq!(scene.total_lines(), 3);
    }

    #[test]
    fn attach_records_node_origin() {
        let mut scene = RecordingScene::new();
        let mut node = node_with_lines(1);
        node.origin = DVec3::new(0.0, 0.0, -1500.0);
        scene.attach(&mut node);
        assert_eq!(scene.attached()[&node.id].origin.z, -1500.0);
    }

    #[test]
    fn detach_removes_node() {
        let mut scene = RecordingScene::new();
        let mut node = node_with_lines(1);
        scene.attach(&mut node);
        scene.detach(&node);

        assert_eq!(scene.node_count(), 0);
        assert_eq!(scene.attach_count(), 1);
        assert_eq!(scene.detach_count(), 1);
    }

    #[test]
    fn detaching_unknown_node_is_ignored() {
        let mut scene = RecordingScene::new();
        scene.detach(&SceneNode::new());
        assert_eq!(scene.detach_count(), 0);
    }
}
