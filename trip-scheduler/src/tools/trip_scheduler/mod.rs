//! Interactive trip scheduling: pick a pickup and drop-off point on the
//! ground, name the trip, and send it to the simulation backend.
//!
//! ## Scheduling Flow
//!
//! ```text
//! Space / "Schedule Trip" / schedule_open
//!   └─> AwaitingFirstPoint ──click──> AwaitingSecondPoint ──click──> ReadyToSubmit
//!                                                                        │
//!   Enter / "Submit" / schedule_submit ─────────────────────────────────┤
//!     ├─> CreateEntity (package at pickup)                               │
//!     ├─> CreateEntity (robot at drop-off)                               │
//!     └─> ScheduleTrip                                                   │
//!                                                                        ▼
//!   Escape / "Cancel" / schedule_cancel ──────────────────────────────> Idle
//! ```
//!
//! Clicks resolve against `GroundSurface` boxes and only the nearest hit is
//! used. Each placed point is marked by a vertical beam, yellow for pickup
//! and green for drop-off.
//!
//! ## Change Priority
//!
//! A separate panel re-prioritises an already scheduled package by name and
//! sends a single `ChangePriority` command. It does not touch the selection.
//!
//! ## Cross-Platform Considerations
//!
//! ### Native Builds
//! - Bevy UI panel mirroring `FormState`, keyboard shortcuts and text entry
//!
//! ### WASM Builds
//! - The host page renders the form and drives it over JSON-RPC
//! - `schedule_state_changed` notifications after every action
//!
//! ## Events
//!
//! - `SchedulerActionEvent`: every request from keyboard, buttons or RPC

use bevy::prelude::*;

use crate::config::{ConfigLoader, SchedulerConfig, load_config_system};
use crate::rpc::web_rpc::RpcSet;

/// Action vocabulary, keyboard routing and the action handler.
pub mod actions;

/// Backend command payloads and the builders that validate them.
pub mod commands;

/// Form model shared by the native panel and the host page.
pub mod form;

/// Pickup and drop-off beam markers.
pub mod markers;

/// Screen-to-ground picking.
pub mod picking;

/// Change-priority panel operations.
pub mod priority;

/// Ray and oriented box intersection.
pub mod ray;

/// Selection state machine.
pub mod state;

/// Native Bevy UI panel.
#[cfg(not(target_arch = "wasm32"))]
pub mod ui;

use actions::{SchedulerActionEvent, handle_scheduler_actions, scheduler_keyboard_system};
use form::FormState;
use markers::{spawn_beam_markers, sync_beam_markers};
use picking::trip_pick_system;
use state::TripSelection;

pub struct TripSchedulerPlugin;

impl Plugin for TripSchedulerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TripSelection>()
            .init_resource::<FormState>()
            .init_resource::<SchedulerConfig>()
            .init_resource::<ConfigLoader>()
            .add_event::<SchedulerActionEvent>()
            .add_systems(Startup, spawn_beam_markers)
            .add_systems(
                Update,
                (
                    load_config_system,
                    (scheduler_keyboard_system, trip_pick_system),
                    handle_scheduler_actions
                        .after(RpcSet::Receive)
                        .before(RpcSet::Send),
                    sync_beam_markers,
                )
                    .chain(),
            );

        #[cfg(not(target_arch = "wasm32"))]
        {
            use ui::{form_button_interaction, reflect_form_state, spawn_scheduler_ui};

            app.add_systems(Startup, spawn_scheduler_ui).add_systems(
                Update,
                (
                    form_button_interaction.before(handle_scheduler_actions),
                    reflect_form_state.after(handle_scheduler_actions),
                ),
            );
        }
    }
}
