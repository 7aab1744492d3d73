pub const BEAM_RADIUS: f32 = 0.2;
pub const BEAM_HEIGHT: f32 = 3000.0;
pub const BEAM_RESOLUTION: u32 = 16;
pub const BEAM_OPACITY: f32 = 0.5;

/// Pickup beam colour (yellow), linear sRGB without alpha.
pub const PICKUP_BEAM_RGB: [f32; 3] = [1.0, 1.0, 0.0];

/// Drop-off beam colour (green), linear sRGB without alpha.
pub const DROPOFF_BEAM_RGB: [f32; 3] = [0.0, 1.0, 0.0];

/// Side length of the default flat ground plane in world units.
pub const GROUND_SIZE: f32 = 400.0;

/// Pickable thickness of a ground surface, centred on its plane.
pub const GROUND_PICK_THICKNESS: f32 = 0.02;

/// Spacing between reference grid lines drawn over the ground.
pub const GROUND_GRID_SPACING: f32 = 10.0;
