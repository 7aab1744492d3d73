pub mod camera;
pub mod scene;
