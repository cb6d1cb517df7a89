use cityscape_common::CameraConfig;
use glam::{DVec3, EulerRot, Mat4, Quat, Vec2, Vec3};

/// Forward-travelling camera.
///
/// The streaming controller owns the travel axis (`position.z`) and the
/// height easing. `target_height` and `look_bias` are written from outside,
/// typically by a pointer-look control, and read once per frame.
///
/// `position` is kept in `f64` so the camera keeps moving at any distance
/// from the origin. Matrices are camera-relative: the eye sits at the origin
/// and world points go through `relative` first.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: DVec3,
    pub pitch: f32,
    pub yaw: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub target_height: f32,
    /// Pointer offset in `[-0.5, 0.5]` on both axes.
    pub look_bias: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl Camera {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            position: config.start_position.as_dvec3(),
            pitch: 0.0,
            yaw: 0.0,
            fov: config.fov_degrees.to_radians(),
            aspect: 16.0 / 9.0,
            near: config.near,
            far: config.far,
            target_height: config.base_height,
            look_bias: Vec2::ZERO,
        }
    }

    /// Position on the travel axis. Forward is toward -Z.
    pub fn travel(&self) -> f64 {
        self.position.z
    }

    pub fn advance(&mut self, distance: f32) {
        self.position.z -= f64::from(distance);
    }

    /// Close `easing` of the gap between the current and target height.
    pub fn ease_height(&mut self, easing: f32) {
        let target = f64::from(self.target_height);
        self.position.y += (target - self.position.y) * f64::from(easing);
    }

    pub fn apply_look_bias(&mut self, sensitivity: f32) {
        self.pitch = self.look_bias.y * sensitivity;
        self.yaw = self.look_bias.x * sensitivity;
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.pitch, self.yaw, 0.0)
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    /// `world` as an offset from the eye, small enough for `f32`.
    pub fn relative(&self, world: DVec3) -> Vec3 {
        (world - self.position).as_vec3()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(Vec3::ZERO, self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
