use glam::{Mat4, Vec3};

use super::controller::Button;
use crate::camera::REFERENCE_ORIENTATION;
use crate::math::{rotation, wrap_angle};
use crate::scene::Scene;

pub const DEFAULT_MOVE_SPEED: f32 = 0.25;
pub const DEFAULT_LOOK_SENSITIVITY: f32 = 250.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigationSettings {
    /// World units travelled per frame while a movement key is held
    pub move_speed: f32,
    /// Screen units of pointer motion per radian of rotation
    pub look_sensitivity: f32,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            move_speed: DEFAULT_MOVE_SPEED,
            look_sensitivity: DEFAULT_LOOK_SENSITIVITY,
        }
    }
}

/// Movement direction flags
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovementState {
    pub forward: bool,
    pub back: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
}

impl MovementState {
    pub const fn any(&self) -> bool {
        self.forward || self.back || self.strafe_left || self.strafe_right
    }

    fn flag_mut(&mut self, button: Button) -> Option<&mut bool> {
        match button {
            Button::KeyW | Button::ArrowUp => Some(&mut self.forward),
            Button::KeyS | Button::ArrowDown => Some(&mut self.back),
            Button::KeyA | Button::ArrowLeft => Some(&mut self.strafe_left),
            Button::KeyD | Button::ArrowRight => Some(&mut self.strafe_right),
            _ => None,
        }
    }
}

/// First-person navigation: held keys move the camera once per frame,
/// pointer deltas steer it.
///
/// Orientation is always rebuilt from the accumulated `(yaw, pitch)` pair and
/// the constant reference orientation, never composed into the live matrix.
#[derive(Debug, Clone)]
pub struct NavigationController {
    movement: MovementState,
    yaw: f32,
    pitch: f32,
    settings: NavigationSettings,
}

impl NavigationController {
    pub fn new(settings: NavigationSettings) -> Self {
        Self {
            movement: MovementState::default(),
            yaw: 0.0,
            pitch: 0.0,
            settings,
        }
    }

    pub fn key_down(&mut self, button: Button) {
        self.set_held(button, true);
    }

    pub fn key_up(&mut self, button: Button) {
        self.set_held(button, false);
    }

    fn set_held(&mut self, button: Button, held: bool) {
        if let Some(flag) = self.movement.flag_mut(button) {
            *flag = held;
        }
    }

    pub fn movement(&self) -> MovementState {
        self.movement
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn settings(&self) -> &NavigationSettings {
        &self.settings
    }

    /// Displace the camera for every held direction. Returns whether it moved.
    pub fn apply_movement(&self, scene: &mut Scene) -> bool {
        if !self.movement.any() {
            return false;
        }

        let camera = &mut scene.camera;
        let forward = camera.forward();
        let right = camera.right();
        let speed = self.settings.move_speed;

        let mut displacement = Vec3::ZERO;
        if self.movement.forward {
            displacement += forward * speed;
        }
        if self.movement.back {
            displacement -= forward * speed;
        }
        if self.movement.strafe_right {
            displacement += right * speed;
        }
        if self.movement.strafe_left {
            displacement -= right * speed;
        }

        camera.position += displacement;
        scene.did_change_camera = true;
        true
    }

    /// Accumulate a pointer delta and rebuild the camera orientation.
    /// A zero delta leaves the scene untouched.
    pub fn mouse_delta(&mut self, dx: f32, dy: f32, scene: &mut Scene) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }

        self.yaw = wrap_angle(self.yaw - dx / self.settings.look_sensitivity);
        self.pitch = wrap_angle(self.pitch + dy / self.settings.look_sensitivity);

        scene.camera.orientation = self.orientation();
        scene.did_change_camera = true;
    }

    /// `rotate(pitch, up₀) · rotate(yaw, right₀) · reference`
    pub fn orientation(&self) -> Mat4 {
        Self::orientation_for(self.yaw, self.pitch)
    }

    pub fn orientation_for(yaw: f32, pitch: f32) -> Mat4 {
        let up = REFERENCE_ORIENTATION.y_axis.truncate();
        let right = REFERENCE_ORIENTATION.x_axis.truncate();

        rotation(pitch, up) * rotation(yaw, right) * REFERENCE_ORIENTATION
    }
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new(NavigationSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::math::orthonormality_error;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::f32::consts::PI;

    fn scene() -> Scene {
        Scene::builder(Camera::new(Vec3::new(0.0, 0.0, 5.0), 5.0, 2.0, 2.0)).build()
    }

    #[test]
    fn test_key_last_write_wins() {
        let mut nav = NavigationController::default();

        nav.key_down(Button::KeyW);
        nav.key_down(Button::KeyW);
        assert!(nav.movement().forward);

        nav.key_up(Button::KeyW);
        assert!(!nav.movement().forward);

        nav.key_up(Button::KeyW);
        nav.key_down(Button::KeyW);
        assert!(nav.movement().forward);
    }

    #[test]
    fn test_unmatched_key_up_is_noop() {
        let mut nav = NavigationController::default();
        nav.key_up(Button::KeyD);
        assert_eq!(nav.movement(), MovementState::default());
    }

    #[test]
    fn test_unrecognised_keys_ignored() {
        let mut nav = NavigationController::default();
        nav.key_down(Button::Escape);
        nav.key_down(Button::MouseLeft);
        assert!(!nav.movement().any());
    }

    #[test]
    fn test_arrow_keys_alias_wasd() {
        let mut nav = NavigationController::default();
        nav.key_down(Button::ArrowUp);
        nav.key_down(Button::ArrowRight);
        assert!(nav.movement().forward);
        assert!(nav.movement().strafe_right);

        nav.key_up(Button::KeyW);
        assert!(!nav.movement().forward);
    }

    #[test]
    fn test_no_keys_no_movement() {
        let nav = NavigationController::default();
        let mut scene = scene();
        let before = scene.camera.position;

        assert!(!nav.apply_movement(&mut scene));
        assert_eq!(scene.camera.position, before);
        assert!(!scene.did_change_camera);
    }

    #[test]
    fn test_forward_and_back_cancel() {
        let mut nav = NavigationController::default();
        nav.key_down(Button::KeyW);
        nav.key_down(Button::KeyS);
        let mut scene = scene();

        assert!(nav.apply_movement(&mut scene));
        assert!((scene.camera.position - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-6);
        assert!(scene.did_change_camera);
    }

    #[test]
    fn test_forward_and_strafe_sum() {
        let mut nav = NavigationController::default();
        nav.key_down(Button::KeyW);
        nav.key_down(Button::KeyD);
        let mut scene = scene();

        nav.apply_movement(&mut scene);
        let expected = Vec3::new(DEFAULT_MOVE_SPEED, 0.0, 5.0 - DEFAULT_MOVE_SPEED);
        assert!((scene.camera.position - expected).length() < 1e-6);
    }

    #[test]
    fn test_forward_n_frames() {
        let mut nav = NavigationController::default();
        nav.key_down(Button::KeyW);
        let mut scene = scene();
        let start = scene.camera.position;
        let forward = scene.camera.forward();

        let frames = 40;
        for _ in 0..frames {
            nav.apply_movement(&mut scene);
        }

        let expected = start + forward * (0.25 * frames as f32);
        assert!((scene.camera.position - expected).length() < 1e-4);
    }

    #[test]
    fn test_look_sign_conventions() {
        let mut nav = NavigationController::default();
        let mut scene = scene();

        nav.mouse_delta(100.0, 50.0, &mut scene);
        assert!((nav.yaw() + 0.4).abs() < 1e-6);
        assert!((nav.pitch() - 0.2).abs() < 1e-6);
        assert!(scene.did_change_camera);
    }

    #[test]
    fn test_reconstruction_is_event_count_independent() {
        let mut one = NavigationController::default();
        let mut two = NavigationController::default();
        let mut scene_one = scene();
        let mut scene_two = scene();

        one.mouse_delta(100.0, 0.0, &mut scene_one);
        two.mouse_delta(50.0, 0.0, &mut scene_two);
        two.mouse_delta(50.0, 0.0, &mut scene_two);

        assert!(scene_one.camera.orientation.abs_diff_eq(scene_two.camera.orientation, 1e-6));
    }

    #[test]
    fn test_zero_delta_keeps_reference() {
        let mut nav = NavigationController::default();
        let mut scene = scene();
        nav.mouse_delta(0.0, 0.0, &mut scene);

        assert!(scene.camera.orientation.abs_diff_eq(REFERENCE_ORIENTATION, 1e-7));
        assert!(!scene.did_change_camera);
    }

    #[test]
    fn test_zero_delta_after_look_keeps_flag_clear() {
        let mut nav = NavigationController::default();
        let mut scene = scene();
        nav.mouse_delta(40.0, -20.0, &mut scene);
        let orientation = scene.camera.orientation;
        scene.did_change_camera = false;

        nav.mouse_delta(0.0, 0.0, &mut scene);
        assert_eq!(scene.camera.orientation, orientation);
        assert!(!scene.did_change_camera);
    }

    #[test]
    fn test_random_deltas_stay_bounded_and_orthonormal() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut nav = NavigationController::default();
        let mut scene = scene();

        for _ in 0..10_000 {
            let dx = rng.gen_range(-400.0..400.0);
            let dy = rng.gen_range(-400.0..400.0);
            nav.mouse_delta(dx, dy, &mut scene);

            assert!(nav.yaw() > -PI && nav.yaw() <= PI);
            assert!(nav.pitch() > -PI && nav.pitch() <= PI);
        }

        assert!(orthonormality_error(&scene.camera.orientation) < 1e-4);
    }

    #[test]
    fn test_look_does_not_touch_position() {
        let mut nav = NavigationController::default();
        let mut scene = scene();
        let before = scene.camera.position;

        nav.mouse_delta(321.0, -123.0, &mut scene);
        assert_eq!(scene.camera.position, before);
    }
}
