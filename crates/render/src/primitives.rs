use std::sync::Arc;

use cityscape_common::{NodeId, Transform};
use glam::{DVec3, Vec3};

/// A straight renderable line with two mutable endpoints.
///
/// Moving the endpoints marks the backing vertex data for re-upload; the
/// scene sink clears the flag once it has consumed the new coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSegment {
    id: NodeId,
    start: Vec3,
    end: Vec3,
    needs_upload: bool,
}

impl LineSegment {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self {
            id: NodeId::new(),
            start,
            end,
            needs_upload: true,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn endpoints(&self) -> (Vec3, Vec3) {
        (self.start, self.end)
    }

    /// Overwrite both endpoints in place.
    pub fn set_endpoints(&mut self, start: Vec3, end: Vec3) {
        self.start = start;
        self.end = end;
        self.needs_upload = true;
    }

    pub fn needs_upload(&self) -> bool {
        self.needs_upload
    }

    pub fn mark_uploaded(&mut self) {
        self.needs_upload = false;
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// Axis-aligned box centered on its local origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxGeometry {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl BoxGeometry {
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth) * 0.5
    }

    /// The eight corners, bottom face first.
    pub fn corners(&self) -> [Vec3; 8] {
        let h = self.half_extents();
        [
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ]
    }
}

/// Wireframe outline of a box: its twelve hard edges.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgesGeometry {
    edges: Vec<[Vec3; 2]>,
}

impl EdgesGeometry {
    pub fn from_box(geometry: &BoxGeometry) -> Self {
        let c = geometry.corners();
        let mut edges = Vec::with_capacity(12);
        for i in 0..4 {
            let next = (i + 1) % 4;
            edges.push([c[i], c[next]]);
            edges.push([c[i + 4], c[next + 4]]);
            edges.push([c[i], c[i + 4]]);
        }
        Self { edges }
    }

    pub fn edges(&self) -> &[[Vec3; 2]] {
        &self.edges
    }
}

/// One placed building: a shared opaque box plus its shared outline.
#[derive(Debug, Clone)]
pub struct MeshInstance {
    pub id: NodeId,
    /// Ground-level anchor; the box sits on top of it.
    pub transform: Transform,
    pub mesh: Arc<BoxGeometry>,
    pub edges: Arc<EdgesGeometry>,
}

impl MeshInstance {
    pub fn new(transform: Transform, mesh: Arc<BoxGeometry>, edges: Arc<EdgesGeometry>) -> Self {
        Self {
            id: NodeId::new(),
            transform,
            mesh,
            edges,
        }
    }

    /// Center of the box after scaling, in its node's local frame.
    pub fn center(&self) -> Vec3 {
        self.transform.position + Vec3::Y * (self.mesh.height * 0.5 * self.transform.scale.y)
    }

    pub fn world_height(&self) -> f32 {
        self.mesh.height * self.transform.scale.y
    }
}

/// A composed group handed to the scene as one unit.
///
/// Lines and meshes are local to `origin`, so their `f32` coordinates stay
/// small however far the node sits along the travel axis.
#[derive(Debug, Clone, Default)]
pub struct SceneNode {
    pub id: NodeId,
    pub origin: DVec3,
    pub lines: Vec<LineSegment>,
    pub meshes: Vec<MeshInstance>,
}

impl SceneNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(origin: DVec3) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    /// A local point in world space.
    pub fn to_world(&self, local: Vec3) -> DVec3 {
        self.origin + local.as_dvec3()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }
}
