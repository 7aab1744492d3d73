//! JSON-RPC 2.0 communication layer for host page integration.
//!
//! Implements bidirectional messaging between the Bevy engine and the host page via
//! iframe postMessage, supporting both request-response and notification patterns.
//!
//! ## Architecture
//!
//! The RPC system uses standard JSON-RPC 2.0 protocol with:
//! - **Requests**: Expect responses with matching IDs
//! - **Notifications**: One-way messages without responses
//! - **Responses**: Reply to requests with results or errors
//!
//! ## Message Flow
//!
//! ```text
//! Host (Parent Window)  <──postMessage──>  Bevy (iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │                                        ├─ Process request
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        │ <────────── Notification (no ID) ─────┤
//! ```
//!
//! ## Adding New RPC Methods
//!
//! Add a match arm in `handle_rpc_request()` and a handler taking the request
//! params and the `SchedulerRpc` context. Handlers deserialize their params
//! into a local struct and map failures to `RpcError::invalid_params`:
//!
//! ```rust,ignore
//! fn handle_cycle_search(params: &Value, ctx: &mut SchedulerRpc) -> Result<Value, RpcError> {
//!     #[derive(Deserialize)]
//!     struct CycleParams {
//!         step: i32,
//!     }
//!
//!     let cycle = serde_json::from_value::<CycleParams>(params.clone())
//!         .map_err(|_| RpcError::invalid_params("Expected integer 'step' parameter"))?;
//!     ctx.trigger(SchedulerAction::CycleSearchStrategy(cycle.step));
//!     Ok(json!({ "success": true }))
//! }
//! ```
//!
//! From the host page:
//!
//! ```typescript
//! iframe.contentWindow.postMessage(JSON.stringify({
//!   jsonrpc: "2.0",
//!   method: "schedule_submit",
//!   params: { name: "bob", priority: "Expedited" },
//!   id: 1
//! }), "*");
//! ```
//!
//! Requests without an `id` are applied but get no response.
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32700`: Parse error
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//!
//! Form validation failures are not RPC errors. The request succeeds and the
//! failure arrives as a `schedule_error` or `priority_change_error` notification.
//!
//! ## Existing Methods
//!
//! ### Trip Scheduling
//! - `schedule_open`: Start picking a pickup point
//! - `schedule_cancel`: Abandon the current trip
//! - `schedule_submit`: Submit with `name` and optional `search`/`priority`
//! - `schedule_cycle_search`: Move the search strategy selector by `step`
//! - `get_schedule_state`: Mode, picked points and form contents
//!
//! ### Priority Changes
//! - `change_priority`: Re-prioritise `packageName` to `priority`
//!
//! ## Outgoing Notifications
//!
//! - Backend commands: `CreateEntity`, `ScheduleTrip`, `ChangePriority`,
//!   flushed before anything else queued in the same frame
//! - `schedule_state_changed`: Sent after every scheduler action
//! - `schedule_error`, `priority_change_error`: Rejected submissions

/// JSON-RPC 2.0 bidirectional communication system for host page integration.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;
