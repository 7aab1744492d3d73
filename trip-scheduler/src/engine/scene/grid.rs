/// Flat reference grid over the ground plane
use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::view::NoFrustumCulling;
use constants::render_settings::{GROUND_GRID_SPACING, GROUND_SIZE};

#[derive(Component)]
pub struct GroundGrid;

// Lifted slightly so lines don't z-fight with the plane
const GRID_LIFT: f32 = 0.01;

/// Create the ground grid as a single line mesh
pub fn create_ground_grid(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let grid_material = materials.add(StandardMaterial {
        base_color: Color::srgba(1.0, 1.0, 1.0, 0.25),
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    });

    let (vertices, indices) = grid_lines(GROUND_SIZE, GROUND_GRID_SPACING);

    let mut mesh = Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::RENDER_WORLD);
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, vertices);
    mesh.insert_indices(Indices::U32(indices));

    commands.spawn((
        Mesh3d(meshes.add(mesh)),
        MeshMaterial3d(grid_material),
        Visibility::Visible,
        NoFrustumCulling,
        Transform::IDENTITY,
        GroundGrid,
        Name::new("GroundGrid"),
    ));
}

/// Line endpoints for a square grid of side `size` centred on the origin.
/// Lines run along both X and Z, `spacing` apart; the count is rounded so
/// both edges get a line.
fn grid_lines(size: f32, spacing: f32) -> (Vec<[f32; 3]>, Vec<u32>) {
    let half = size * 0.5;
    let line_count = ((size / spacing).round() as u32).max(1);
    let step = size / line_count as f32;

    let mut vertices = Vec::with_capacity((line_count as usize + 1) * 4);
    for i in 0..=line_count {
        let offset = -half + i as f32 * step;
        // Line along Z (fixed X)
        vertices.push([offset, GRID_LIFT, -half]);
        vertices.push([offset, GRID_LIFT, half]);
        // Line along X (fixed Z)
        vertices.push([-half, GRID_LIFT, offset]);
        vertices.push([half, GRID_LIFT, offset]);
    }

    let indices = (0..vertices.len() as u32).collect();
    (vertices, indices)
}
