/// Scale from editor world units to backend grid units on the ground plane.
pub const GRID_SCALE: f64 = 14.2;

/// Height at which the backend spawns entities. Ground picks carry no usable
/// height, so every transformed position is pinned here.
pub const FIXED_HEIGHT: f64 = 254.665;

/// Convert a picked world point into a backend grid position.
/// The input height is discarded and replaced by `FIXED_HEIGHT`.
pub fn world_to_grid(point: [f64; 3]) -> [f64; 3] {
    [point[0] * GRID_SCALE, FIXED_HEIGHT, point[2] * GRID_SCALE]
}

/// Ground-plane projection (x, z) of a picked world point in grid units.
pub fn world_to_grid_plane(point: [f64; 3]) -> [f64; 2] {
    [point[0] * GRID_SCALE, point[2] * GRID_SCALE]
}
