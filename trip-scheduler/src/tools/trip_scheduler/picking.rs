use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use super::ray::ray_hits_obb;
use super::state::TripSelection;

/// Pickable ground geometry. `size` is the full extent of the surface box in
/// the entity's local space.
#[derive(Component, Debug, Clone, Copy)]
pub struct GroundSurface {
    pub size: Vec3,
}

/// Camera used to turn a normalised screen position into a world ray.
#[derive(Clone, Copy)]
pub struct PickCamera<'a> {
    pub camera: &'a Camera,
    pub transform: &'a GlobalTransform,
}

impl<'a> PickCamera<'a> {
    pub fn new(camera: &'a Camera, transform: &'a GlobalTransform) -> Self {
        Self { camera, transform }
    }

    /// World ray through `ndc`, from the near plane towards the far plane.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray3d> {
        // Reverse-Z: the near plane sits at depth 1.
        let near = self.camera.ndc_to_world(self.transform, ndc.extend(1.0))?;
        let far = self
            .camera
            .ndc_to_world(self.transform, ndc.extend(f32::EPSILON))?;
        let direction = Dir3::new(far - near).ok()?;
        Some(Ray3d::new(near, direction))
    }
}

/// Resolves a normalised screen position to ground points, nearest first.
pub trait GroundPicker {
    fn intersect(&self, ndc: Vec2, camera: &PickCamera) -> Vec<Vec3>;
}

/// Map a cursor position in pixels (origin top-left) to normalised device
/// coordinates in [-1, 1] with +y up.
pub fn screen_to_ndc(cursor: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(
        (cursor.x / viewport.x) * 2.0 - 1.0,
        -(cursor.y / viewport.y) * 2.0 + 1.0,
    )
}

/// Ground picker over every `GroundSurface` in the scene.
pub struct SceneGroundPicker {
    surfaces: Vec<(GlobalTransform, Vec3)>,
}

impl SceneGroundPicker {
    pub fn new(surfaces: impl IntoIterator<Item = (GlobalTransform, Vec3)>) -> Self {
        Self {
            surfaces: surfaces.into_iter().collect(),
        }
    }

    /// Hits of `ray` against all surfaces, sorted by ray distance.
    pub fn intersect_ray(&self, ray: Ray3d) -> Vec<Vec3> {
        let dir = *ray.direction;
        let mut hits: Vec<f32> = self
            .surfaces
            .iter()
            .filter_map(|(xf, size)| ray_hits_obb(ray.origin, dir, xf, *size))
            .collect();
        hits.sort_by(|a, b| a.total_cmp(b));
        hits.into_iter().map(|t| ray.origin + dir * t).collect()
    }
}

impl GroundPicker for SceneGroundPicker {
    fn intersect(&self, ndc: Vec2, camera: &PickCamera) -> Vec<Vec3> {
        match camera.ray_from_ndc(ndc) {
            Some(ray) => self.intersect_ray(ray),
            None => Vec::new(),
        }
    }
}

/// Whether any UI node reports the pointer over or pressing it.
pub fn pointer_over_ui<'a>(interactions: impl IntoIterator<Item = &'a Interaction>) -> bool {
    interactions
        .into_iter()
        .any(|interaction| *interaction != Interaction::None)
}

/// Feed left clicks on the scene into the trip selection while picking.
pub fn trip_pick_system(
    mouse: Res<ButtonInput<MouseButton>>,
    mut selection: ResMut<TripSelection>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&GlobalTransform, &Camera), With<Camera3d>>,
    surfaces: Query<(&GlobalTransform, &GroundSurface)>,
    ui_nodes: Query<&Interaction, With<Node>>,
) {
    if !mouse.just_pressed(MouseButton::Left) || !selection.is_awaiting_point() {
        return;
    }

    // Clicks on the panel belong to the panel.
    if pointer_over_ui(ui_nodes.iter()) {
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor_pos) = window.cursor_position() else {
        return;
    };
    let Ok((cam_xform, camera)) = cameras.single() else {
        return;
    };

    let picker = SceneGroundPicker::new(
        surfaces
            .iter()
            .map(|(xf, surface)| (*xf, surface.size)),
    );
    let viewport = Vec2::new(window.width(), window.height());

    // Only mutate (and mark changed) when a point is actually placed.
    let camera = PickCamera::new(camera, cam_xform);
    if selection
        .bypass_change_detection()
        .pick(cursor_pos, viewport, &camera, &picker)
        .is_some()
    {
        selection.set_changed();
    }
}
