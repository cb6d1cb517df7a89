//! Rendering Adapter: the contract between the generator and whatever draws it.
//!
//! # Invariants
//! - The scene never owns generator nodes; it is told to attach and detach them.
//! - A line is uploaded after its endpoints change and before it is drawn.
//!
//! # Workaround
//! Ships a recording sink and a debug text renderer in place of a GPU scene.
//! The `SceneSink` trait is stable; a GPU backend implements it without
//! changing the generator.

mod camera;
mod primitives;
mod renderer;
mod scene;

pub use camera::Camera;
pub use primitives::{BoxGeometry, EdgesGeometry, LineSegment, MeshInstance, SceneNode};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use scene::{AttachedNode, RecordingScene, SceneSink};

pub fn crate_info() -> &'static str {
    "cityscape-render v0.1.0"
}
