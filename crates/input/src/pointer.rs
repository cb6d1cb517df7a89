use cityscape_common::CameraConfig;
use cityscape_render::Camera;
use glam::Vec2;

/// Pointer position relative to the viewport center, in `[-0.5, 0.5]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerLook {
    pub offset: Vec2,
}

impl PointerLook {
    /// From a cursor position in pixels and the viewport size.
    pub fn from_cursor(cursor: Vec2, viewport: Vec2) -> Self {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return Self::default();
        }
        let offset = (cursor - viewport * 0.5) / viewport;
        Self {
            offset: offset.clamp(Vec2::splat(-0.5), Vec2::splat(0.5)),
        }
    }

    /// Write the look bias and the eased-toward height. Pointer down lowers
    /// the camera.
    pub fn apply(&self, camera: &mut Camera, config: &CameraConfig) {
        camera.look_bias = self.offset;
        camera.target_height = config.base_height - self.offset.y * config.pointer_height_range;
    }
}
