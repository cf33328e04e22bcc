use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::input::InputState;

/// Translation speed, world units per second.
pub const MOVE_SPEED: f32 = 100.0;
/// Look speed, radians per pixel per second of drag.
pub const LOOK_SPEED: f32 = MOVE_SPEED * (std::f32::consts::PI / 180.0);

/// Fly camera: position plus an orthonormal right-handed basis derived from
/// accumulated yaw/pitch, and a left-handed perspective projection.
///
/// The three derived matrices are recomputed after every mutation, so
/// readers always see a consistent view of the camera.
#[derive(Debug, Clone)]
pub struct Camera {
    pub origin: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    pub total_pitch: f32,
    pub total_yaw: f32,

    fov_angle_deg: f32,
    aspect: f32,
    near: f32,
    far: f32,

    view: Mat4,
    inv_view: Mat4,
    projection: Mat4,
}

impl Camera {
    pub fn new(aspect: f32, fov_angle_deg: f32, origin: Vec3) -> Self {
        let mut camera = Self {
            origin,
            forward: Vec3::Z,
            up: Vec3::Y,
            right: Vec3::X,
            total_pitch: 0.0,
            total_yaw: 0.0,
            fov_angle_deg,
            aspect,
            near: 0.1,
            far: 100.0,
            view: Mat4::IDENTITY,
            inv_view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        camera.calculate_view();
        camera.calculate_projection();
        camera
    }

    /// Apply one frame of polled input: keyboard translation along the
    /// current basis, mouse-drag translation and look rotation.
    pub fn update(&mut self, dt: f32, input: &InputState) {
        // Drag-translate uses raw pixel deltas scaled only by elapsed time.
        if input.left_drag() {
            self.origin.z -= input.mouse_delta.y * dt;
        }
        if input.right_drag() {
            self.origin.y -= input.mouse_delta.y * dt;
        }

        // Keyboard translation along the basis from the previous frame.
        if input.move_forward {
            self.origin += MOVE_SPEED * dt * self.forward;
        }
        if input.move_backward {
            self.origin -= MOVE_SPEED * dt * self.forward;
        }
        if input.strafe_left {
            self.origin -= MOVE_SPEED * dt * self.right;
        }
        if input.strafe_right {
            self.origin += MOVE_SPEED * dt * self.right;
        }

        if input.left_drag() || input.right_drag() {
            self.total_pitch -= LOOK_SPEED * input.mouse_delta.y * dt;
            self.total_yaw -= LOOK_SPEED * input.mouse_delta.x * dt;
        }

        // Forward is always re-derived from the accumulated angles by
        // rotating the unit Z axis, never incrementally rotated.
        self.forward =
            Quat::from_euler(EulerRot::YXZ, self.total_yaw, self.total_pitch, 0.0) * Vec3::Z;

        self.calculate_view();
    }

    pub fn set_fov_angle(&mut self, fov_angle_deg: f32) {
        self.fov_angle_deg = fov_angle_deg;
        self.calculate_projection();
    }

    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.calculate_projection();
    }

    /// World-to-view transform.
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    /// View-to-world transform (the camera basis plus origin).
    pub fn inv_view_matrix(&self) -> Mat4 {
        self.inv_view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// Combined world-to-clip transform.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Rebuild the basis from `forward` by Gram-Schmidt against world up,
    /// then derive view as the inverse of the basis+origin transform.
    fn calculate_view(&mut self) {
        let lateral = Vec3::Y.cross(self.forward);
        // Degenerate when forward is parallel to world up; keep the last
        // valid right vector for this frame rather than emit NaNs.
        if lateral.length_squared() > f32::EPSILON {
            self.right = lateral.normalize();
        } else {
            tracing::debug!("camera forward parallel to world up, basis held");
        }
        self.up = self.forward.cross(self.right);

        self.inv_view = Mat4::from_cols(
            self.right.extend(0.0),
            self.up.extend(0.0),
            self.forward.extend(0.0),
            self.origin.extend(1.0),
        );
        self.view = self.inv_view.inverse();
    }

    fn calculate_projection(&mut self) {
        self.projection = Mat4::perspective_lh(
            self.fov_angle_deg.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    const TOL: f32 = 1e-4;

    fn drag_input(dx: f32, dy: f32, left: bool, right: bool) -> InputState {
        InputState {
            mouse_delta: Vec2::new(dx, dy),
            left_button: left,
            right_button: right,
            ..InputState::default()
        }
    }

    #[test]
    fn basis_stays_orthonormal_under_look_input() {
        let mut camera = Camera::new(16.0 / 9.0, 45.0, Vec3::ZERO);
        let drags = [
            (35.0, -12.0),
            (-80.0, 44.0),
            (3.0, 151.0),
            (-260.0, -7.0),
            (14.0, 14.0),
        ];
        for (dx, dy) in drags {
            camera.update(0.016, &drag_input(dx, dy, true, false));
            assert!((camera.forward.length() - 1.0).abs() < TOL);
            assert!((camera.right.length() - 1.0).abs() < TOL);
            assert!((camera.up.length() - 1.0).abs() < TOL);
            assert!(camera.forward.dot(camera.right).abs() < TOL);
            assert!(camera.forward.dot(camera.up).abs() < TOL);
            assert!(camera.right.dot(camera.up).abs() < TOL);
        }
    }

    #[test]
    fn basis_is_right_handed() {
        let mut camera = Camera::new(1.0, 60.0, Vec3::ZERO);
        camera.update(0.016, &drag_input(120.0, 35.0, false, true));
        let rebuilt = camera.right.cross(camera.up);
        assert!((rebuilt - camera.forward).length() < TOL);
    }

    #[test]
    fn projection_is_pure_in_its_parameters() {
        let mut a = Camera::new(16.0 / 9.0, 45.0, Vec3::ZERO);
        let b = Camera::new(16.0 / 9.0, 45.0, Vec3::new(5.0, -3.0, 20.0));

        // Unrelated mutations must not affect the projection.
        a.update(0.25, &drag_input(55.0, -20.0, true, false));
        a.update(0.25, &InputState {
            move_forward: true,
            ..InputState::default()
        });

        assert_eq!(a.projection_matrix(), b.projection_matrix());

        a.set_fov_angle(90.0);
        a.set_fov_angle(45.0);
        assert_eq!(a.projection_matrix(), b.projection_matrix());
    }

    #[test]
    fn forward_move_covers_speed_times_dt() {
        let mut camera = Camera::new(1.0, 45.0, Vec3::ZERO);
        let dt = 0.5;
        camera.update(
            dt,
            &InputState {
                move_forward: true,
                ..InputState::default()
            },
        );
        // No rotation applied: forward is exactly +Z.
        assert_eq!(camera.origin, Vec3::new(0.0, 0.0, MOVE_SPEED * dt));
    }

    #[test]
    fn set_aspect_only_touches_projection() {
        let mut camera = Camera::new(1.0, 45.0, Vec3::new(1.0, 2.0, 3.0));
        let view = camera.view_matrix();
        camera.set_aspect_ratio(2.0);
        assert_eq!(camera.view_matrix(), view);
        assert_ne!(
            camera.projection_matrix(),
            Camera::new(1.0, 45.0, Vec3::ZERO).projection_matrix()
        );
    }

    #[test]
    fn view_inverts_basis_transform() {
        let mut camera = Camera::new(1.0, 45.0, Vec3::new(4.0, -2.0, 9.0));
        camera.update(0.1, &drag_input(-30.0, 60.0, true, false));
        let product = camera.view_matrix() * camera.inv_view_matrix();
        for col in 0..4 {
            for row in 0..4 {
                let expected = if col == row { 1.0 } else { 0.0 };
                assert!((product.col(col)[row] - expected).abs() < TOL);
            }
        }
    }

    #[test]
    fn left_drag_translates_along_z() {
        let mut camera = Camera::new(1.0, 45.0, Vec3::ZERO);
        camera.update(1.0, &drag_input(0.0, 10.0, true, false));
        assert!(camera.origin.z < 0.0);
    }

    #[test]
    fn straight_up_pitch_does_not_produce_nan() {
        let mut camera = Camera::new(1.0, 45.0, Vec3::ZERO);
        camera.total_pitch = -std::f32::consts::FRAC_PI_2;
        camera.update(0.016, &InputState::default());
        assert!(!camera.view_matrix().col(0).x.is_nan());
        assert!((camera.right.length() - 1.0).abs() < TOL);
    }
}
