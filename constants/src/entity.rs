/// Suffix appended to the trip name to name its package entity.
pub const PACKAGE_NAME_SUFFIX: &str = "_package";

pub const PACKAGE_TYPE: &str = "package";
pub const PACKAGE_MESH: &str = "assets/model/package1.glb";
pub const PACKAGE_SCALE: [f64; 3] = [0.75, 0.75, 0.75];

pub const ROBOT_TYPE: &str = "robot";
pub const ROBOT_MESH: &str = "assets/model/robot.glb";
pub const ROBOT_SCALE: [f64; 3] = [0.25, 0.25, 0.25];

/// Shared by both spawned entities.
pub const ENTITY_SPEED: f64 = 30.0;
pub const ENTITY_RADIUS: f64 = 1.0;
pub const ENTITY_DIRECTION: [f64; 3] = [1.0, 0.0, 0.0];

/// Zero rotation with a trailing placeholder component; the backend reads
/// four values and ignores the last.
pub const ENTITY_ROTATION: [f64; 4] = [0.0, 0.0, 0.0, 0.0];
