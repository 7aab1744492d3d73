use bevy::prelude::*;
use constants::render_settings::{
    BEAM_HEIGHT, BEAM_OPACITY, BEAM_RADIUS, BEAM_RESOLUTION, DROPOFF_BEAM_RGB, PICKUP_BEAM_RGB,
};

use super::state::{PointRole, TripSelection};

/// Vertical beam marking one of the picked points.
#[derive(Component, Debug, Clone, Copy)]
pub struct BeamMarker(pub PointRole);

/// Spawn the two beams once; they are hidden until their point is picked.
pub fn spawn_beam_markers(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut selection: ResMut<TripSelection>,
) {
    let beam = meshes.add(
        Cylinder::new(BEAM_RADIUS, BEAM_HEIGHT)
            .mesh()
            .resolution(BEAM_RESOLUTION),
    );

    for (role, rgb) in [
        (PointRole::Pickup, PICKUP_BEAM_RGB),
        (PointRole::Dropoff, DROPOFF_BEAM_RGB),
    ] {
        let marker = commands
            .spawn((
                Mesh3d(beam.clone()),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: Color::srgba(rgb[0], rgb[1], rgb[2], BEAM_OPACITY),
                    alpha_mode: AlphaMode::Blend,
                    unlit: true,
                    ..default()
                })),
                Transform::default(),
                Visibility::Hidden,
                BeamMarker(role),
                Name::new(format!("{:?}Beam", role)),
            ))
            .id();
        selection.attach_marker(role, marker);
    }
}

/// Mirror picked point positions and visibility onto the beams.
pub fn sync_beam_markers(
    selection: Res<TripSelection>,
    mut beams: Query<(&BeamMarker, &mut Transform, &mut Visibility)>,
) {
    if !selection.is_changed() {
        return;
    }

    for (BeamMarker(role), mut transform, mut visibility) in &mut beams {
        let point = selection.point(*role);
        transform.translation = point.position;
        *visibility = if point.visible {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::trip_scheduler::form::FormState;

    #[test]
    fn beams_follow_selection() {
        let mut app = App::new();
        app.init_resource::<TripSelection>()
            .add_systems(Update, sync_beam_markers);

        let pickup = app
            .world_mut()
            .spawn((BeamMarker(PointRole::Pickup), Transform::default(), Visibility::Hidden))
            .id();
        let dropoff = app
            .world_mut()
            .spawn((BeamMarker(PointRole::Dropoff), Transform::default(), Visibility::Hidden))
            .id();

        {
            let mut form = FormState::default();
            let mut selection = app.world_mut().resource_mut::<TripSelection>();
            selection.open_form(&mut form);
            selection.place(Vec3::new(2.0, 0.0, 5.0));
        }
        app.update();

        let world = app.world();
        assert_eq!(world.get::<Transform>(pickup).map(|t| t.translation), Some(Vec3::new(2.0, 0.0, 5.0)));
        assert_eq!(world.get::<Visibility>(pickup), Some(&Visibility::Visible));
        assert_eq!(world.get::<Visibility>(dropoff), Some(&Visibility::Hidden));

        {
            let mut form = FormState::default();
            app.world_mut().resource_mut::<TripSelection>().cancel(&mut form);
        }
        app.update();
        assert_eq!(app.world().get::<Visibility>(pickup), Some(&Visibility::Hidden));
    }
}
