use glam::DVec3;

use crate::camera::Camera;
use crate::scene::RecordingScene;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: DVec3,
    /// Point the camera is looking at.
    pub target: DVec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self::from(&Camera::default())
    }
}

impl From<&Camera> for RenderView {
    fn from(camera: &Camera) -> Self {
        Self {
            eye: camera.position,
            target: camera.position + camera.forward().as_dvec3(),
            fov_degrees: camera.fov.to_degrees(),
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the recorded scene and a view, then produces output.
/// It never touches the generator's sections.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and view.
    fn render(&self, scene: &RecordingScene, view: &RenderView) -> Self::Output;
}

/// Produces a human-readable dump of the attached scene.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &RecordingScene, view: &RenderView) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== Scene (nodes={}, lines={}, meshes={}) ===\n",
            scene.node_count(),
            scene.total_lines(),
            scene.total_meshes()
        ));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        ));
        out.push_str(&format!(
            "Traffic: attached={} detached={} line_uploads={}\n",
            scene.attach_count(),
            scene.detach_count(),
            scene.line_uploads()
        ));

        for (id, node) in scene.attached() {
            out.push_str(&format!(
                "  [{}] z={:.0} lines={} meshes={}\n",
                id.short(),
                node.origin.z,
                node.lines,
                node.meshes
            ));
        }

        out
    }
}
