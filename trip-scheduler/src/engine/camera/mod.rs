//! Viewport camera for flying over the ground plane.
//!
//! Provides free-look camera controls with smooth interpolation and
//! keyboard/mouse input handling.

/// Viewport camera resource and controller system for scene navigation.
pub mod viewport_camera;

pub use viewport_camera::{ViewportCamera, camera_controller};
