//! World conventions shared by the trip scheduler and any tooling that has to
//! agree with the simulation backend on units and defaults.

/// World-to-grid coordinate conversion used for every backend position.
pub mod coordinate_system;

/// Default entity templates for the package and robot spawned per trip.
pub mod entity;

/// Default option lists for the scheduling form selectors.
pub mod form;

/// Beam marker and ground plane render settings.
pub mod render_settings;
