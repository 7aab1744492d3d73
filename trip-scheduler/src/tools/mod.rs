//! Interactive tools driven from the viewport.
//!
//! Tools are controlled by keyboard shortcuts and a Bevy UI panel in native
//! builds, and by JSON-RPC from the host page in WASM builds. Each tool ships
//! a plugin that registers its resources, events and systems.
//!
//! ## Available Tools
//!
//! ### Trip Scheduler (`TripSchedulerPlugin`)
//! - **Activation**: `Space` key, "Schedule Trip" button or `schedule_open` RPC
//! - **Purpose**: Define a delivery trip by clicking a pickup and drop-off
//!   point on the ground, then send it to the simulation backend
//! - **Workflow**:
//!   1. First click places the pickup beam
//!   2. Second click places the drop-off beam
//!   3. Enter or "Submit" validates the name and both points
//!   4. Package, robot and trip commands are sent in that order
//! - **Features**:
//!   - Search strategy and shipping priority selectors
//!   - Change-priority panel for packages already scheduled
//!   - State notifications to the host page after every action

/// Trip scheduling with ground picking, beam markers and backend commands.
///
/// Selection state machine, command builders and the native form panel.
pub mod trip_scheduler;
