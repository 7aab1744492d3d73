use bevy::prelude::*;
use constants::render_settings::{GROUND_PICK_THICKNESS, GROUND_SIZE};

use crate::tools::trip_scheduler::picking::GroundSurface;

#[derive(Component)]
pub struct GroundPlane;

/// Spawn the ground plane centred on the origin. Its `GroundSurface` is the
/// only thing trip picks can land on.
pub fn spawn_ground(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) -> Entity {
    let ground_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.32, 0.36, 0.30),
        perceptual_roughness: 1.0,
        ..default()
    });

    commands
        .spawn((
            Mesh3d(meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE))),
            MeshMaterial3d(ground_material),
            Transform::IDENTITY,
            GroundPlane,
            GroundSurface {
                size: ground_pick_size(),
            },
            Name::new("Ground"),
        ))
        .id()
}

/// Full extents of the ground's pick box.
pub fn ground_pick_size() -> Vec3 {
    Vec3::new(GROUND_SIZE, GROUND_PICK_THICKNESS, GROUND_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::trip_scheduler::picking::SceneGroundPicker;

    #[test]
    fn ground_is_pickable_from_above() {
        let picker = SceneGroundPicker::new([(GlobalTransform::IDENTITY, ground_pick_size())]);
        let ray = Ray3d::new(Vec3::new(12.0, 50.0, -7.0), Dir3::NEG_Y);
        let hits = picker.intersect_ray(ray);
        assert_eq!(hits.len(), 1);
        assert!((hits[0] - Vec3::new(12.0, GROUND_PICK_THICKNESS * 0.5, -7.0)).length() < 1e-4);
    }

    #[test]
    fn rays_past_the_edge_miss() {
        let picker = SceneGroundPicker::new([(GlobalTransform::IDENTITY, ground_pick_size())]);
        let ray = Ray3d::new(Vec3::new(GROUND_SIZE, 50.0, 0.0), Dir3::NEG_Y);
        assert!(picker.intersect_ray(ray).is_empty());
    }
}
