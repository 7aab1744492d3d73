use bevy::input::mouse::MouseScrollUnit;
use bevy::math::EulerRot;
use bevy::{
    input::mouse::{MouseMotion, MouseWheel},
    prelude::*,
};

use crate::tools::trip_scheduler::form::FormState;

#[derive(Resource, Debug, Clone)]
pub struct ViewportCamera {
    pub focus_point: Vec3,
    pub height: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub last_mouse_pos: Vec2,
}

impl ViewportCamera {
    pub fn new(focus_point: Vec3, height: f32) -> Self {
        Self {
            focus_point,
            height,
            ..default()
        }
    }

    pub fn view_rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Transform the camera eases towards.
    pub fn target_transform(&self) -> Transform {
        Transform {
            translation: self.focus_point,
            rotation: self.view_rotation(),
            ..default()
        }
    }
}

impl Default for ViewportCamera {
    fn default() -> Self {
        Self {
            focus_point: Vec3::new(0.0, 120.0, 160.0),
            height: 100.0,
            pitch: -0.6,
            yaw: 0.0,
            last_mouse_pos: Vec2::ZERO,
        }
    }
}

/// WASD/QE movement in camera space, unnormalised.
pub fn movement_input(keyboard: &ButtonInput<KeyCode>) -> Vec3 {
    let mut move_input = Vec3::ZERO;
    if keyboard.pressed(KeyCode::KeyW) {
        move_input.z -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) {
        move_input.z += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) {
        move_input.x += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) {
        move_input.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyE) {
        move_input.y += 1.0; // Up
    }
    if keyboard.pressed(KeyCode::KeyQ) {
        move_input.y -= 1.0; // Down
    }
    move_input
}

pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut maps_camera: ResMut<ViewportCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    mut cursor_moved: EventReader<CursorMoved>,
    keyboard: Res<ButtonInput<KeyCode>>,
    form: Res<FormState>,
    time: Res<Time>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    // Update cursor position
    for cursor in cursor_moved.read() {
        maps_camera.last_mouse_pos = cursor.position;
    }

    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();

    // Mouse motion with right click (look around)
    if mouse_button.pressed(MouseButton::Right) && mouse_delta != Vec2::ZERO {
        let yaw_sens = 0.0035;
        let pitch_sens = 0.0030;
        maps_camera.yaw += -mouse_delta.x * yaw_sens;
        maps_camera.pitch += -mouse_delta.y * pitch_sens;
        maps_camera.pitch = maps_camera.pitch.clamp(-1.55, 1.55);
    }

    // Mouse wheel scroll accumulation (pixel and line scroll)
    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }

    // Mouse wheel dolly along the view direction
    if scroll_accum.abs() > f32::EPSILON {
        let dolly_speed = (maps_camera.height * 0.2).clamp(0.5, 500.0);
        let forward = (maps_camera.view_rotation() * Vec3::Z).normalize();
        maps_camera.focus_point -= forward * (scroll_accum * dolly_speed);
    }

    // Typing into a focused form field must not fly the camera. The web
    // host page owns its own text fields.
    let typing = cfg!(not(target_arch = "wasm32")) && form.focused_text_field().is_some();
    let move_input = if typing {
        Vec3::ZERO
    } else {
        movement_input(&keyboard)
    };

    if move_input != Vec3::ZERO {
        let view_rot = maps_camera.view_rotation();
        let forward = (view_rot * Vec3::Z).normalize();
        let right = (view_rot * Vec3::X).normalize();

        // Shift = faster, ctrl = slower
        let mut speed = maps_camera.height.clamp(2.0, 200.0);
        if keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) {
            speed *= 3.5;
        }
        if keyboard.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]) {
            speed *= 0.25;
        }

        let world_delta = right * move_input.x + Vec3::Y * move_input.y + forward * move_input.z;
        maps_camera.focus_point += world_delta.normalize_or_zero() * speed * time.delta_secs();
    }

    let target = maps_camera.target_transform();
    let lerp_speed = (12.0 * time.delta_secs()).min(1.0);
    camera_transform.translation = camera_transform.translation.lerp(target.translation, lerp_speed);
    camera_transform.rotation = camera_transform.rotation.slerp(target.rotation, lerp_speed);
}
