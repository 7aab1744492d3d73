use crate::tools::trip_scheduler::actions::{
    ActionSource, SchedulerAction, SchedulerActionEvent, schedule_state,
};
use crate::tools::trip_scheduler::commands::CommandChannel;
use crate::tools::trip_scheduler::form::{FormElement, FormState, FormSurface};
use crate::tools::trip_scheduler::state::TripSelection;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error structure following specification.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// One queued message, tagged by the queue it came from.
#[derive(Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum OutgoingMessage {
    Command(RpcNotification),
    Notification(RpcNotification),
    Response(RpcResponse),
}

/// Ordering of the RPC systems within `Update`. Scheduler systems that react
/// to requests run between the two.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum RpcSet {
    Receive,
    Send,
}

/// Resource managing bidirectional RPC communication between the host page and Bevy.
/// Backend commands, UI notifications and responses are queued separately and
/// flushed in that order.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_commands: Vec<RpcNotification>,
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the host page without expecting response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(notification(method, params));
    }

    /// Backend commands waiting for the next flush.
    pub fn pending_commands(&self) -> &[RpcNotification] {
        &self.outgoing_commands
    }

    pub fn pending_notifications(&self) -> &[RpcNotification] {
        &self.outgoing_notifications
    }

    /// Empty every queue: commands first, then notifications, then responses.
    pub fn drain_outgoing(&mut self) -> Vec<OutgoingMessage> {
        let commands = self.outgoing_commands.drain(..).map(OutgoingMessage::Command);
        let notifications = self
            .outgoing_notifications
            .drain(..)
            .map(OutgoingMessage::Notification);
        let responses = self.outgoing_responses.drain(..).map(OutgoingMessage::Response);
        commands.chain(notifications).chain(responses).collect()
    }

    /// Queue response for transmission to the host page.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Backend commands travel as notifications named after the command.
impl CommandChannel for WebRpcInterface {
    fn send(&mut self, command_name: &str, payload: serde_json::Value) {
        self.outgoing_commands.push(notification(command_name, payload));
    }
}

fn notification(method: &str, params: serde_json::Value) -> RpcNotification {
    RpcNotification {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
    }
}

/// Plugin establishing WebRPC communication layer for iframe-based deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .configure_sets(Update, RpcSet::Receive.before(RpcSet::Send))
            .add_systems(
                Update,
                (process_incoming_messages, handle_rpc_messages)
                    .chain()
                    .in_set(RpcSet::Receive),
            )
            .add_systems(Update, send_outgoing_messages.in_set(RpcSet::Send));

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // Thread-safe message queue for cross-thread communication.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        // Filter messages to ensure they contain string data.
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    let Some(window) = window() else {
        error!("Window object not available, RPC listener not registered");
        return;
    };
    if let Err(e) =
        window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
    {
        error!("Failed to register message listener: {:?}", e);
        return;
    }

    // Prevent closure from being dropped by transferring ownership to JS.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing incoming RPC message from the host page.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut form: ResMut<FormState>,
    selection: Res<TripSelection>,
    mut actions: EventWriter<SchedulerActionEvent>,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                debug!("Processing RPC method: {}", request.method);
                let mut ctx = SchedulerRpc {
                    form: &mut *form,
                    selection: &*selection,
                    actions: &mut actions,
                };
                if let Some(response) = handle_rpc_request(&request, &mut ctx) {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                warn!("Discarding malformed RPC message: {}", parse_error);
                rpc_interface.queue_response(create_error_response(
                    serde_json::Value::Null,
                    -32700,
                    "Parse error",
                    Some(serde_json::json!({ "detail": parse_error.to_string() })),
                ));
            }
        }
    }
}

/// State the scheduler methods read and write while a request is handled.
struct SchedulerRpc<'a, 'w> {
    form: &'a mut FormState,
    selection: &'a TripSelection,
    actions: &'a mut EventWriter<'w, SchedulerActionEvent>,
}

impl SchedulerRpc<'_, '_> {
    fn trigger(&mut self, action: SchedulerAction) {
        self.actions.write(SchedulerActionEvent {
            action,
            source: ActionSource::Rpc,
        });
    }
}

/// Handle individual RPC request. Requests without an ID are still applied
/// but get no response.
fn handle_rpc_request(request: &RpcRequest, ctx: &mut SchedulerRpc) -> Option<RpcResponse> {
    let result = match request.method.as_str() {
        "schedule_open" => handle_schedule_open(ctx),
        "schedule_cancel" => handle_schedule_cancel(ctx),
        "schedule_submit" => handle_schedule_submit(&request.params, ctx),
        "schedule_cycle_search" => handle_cycle_search(&request.params, ctx),
        "change_priority" => handle_change_priority(&request.params, ctx),
        "get_schedule_state" => Ok(schedule_state(ctx.selection, ctx.form)),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            return Some(create_error_response(
                request.id.clone()?,
                -32601,
                "Method not found",
                Some(serde_json::json!({"method": request.method})),
            ));
        }
    };

    let id = request.id.clone()?;
    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        }),
    }
}

/// Open the schedule form with an empty name, as the Space shortcut does.
fn handle_schedule_open(ctx: &mut SchedulerRpc) -> Result<serde_json::Value, RpcError> {
    if ctx.selection.is_picking() {
        return Ok(serde_json::json!({ "success": false, "mode": ctx.selection.mode() }));
    }
    ctx.form.set_text(FormElement::ScheduleName, "");
    ctx.trigger(SchedulerAction::OpenForm);
    Ok(serde_json::json!({ "success": true }))
}

fn handle_schedule_cancel(ctx: &mut SchedulerRpc) -> Result<serde_json::Value, RpcError> {
    let was_picking = ctx.selection.is_picking();
    ctx.trigger(SchedulerAction::Cancel);
    Ok(serde_json::json!({ "success": true, "was_picking": was_picking }))
}

/// Fill the form from the request and submit it. Validation failures are
/// reported through the `schedule_error` notification.
fn handle_schedule_submit(
    params: &serde_json::Value,
    ctx: &mut SchedulerRpc,
) -> Result<serde_json::Value, RpcError> {
    #[derive(serde::Deserialize)]
    struct SubmitParams {
        name: String,
        search: Option<String>,
        priority: Option<String>,
    }

    let submit = serde_json::from_value::<SubmitParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'name' parameter"))?;

    // Check every token before touching the form.
    let selections = [
        (FormElement::SearchStrategy, submit.search.as_deref()),
        (FormElement::ShippingPriority, submit.priority.as_deref()),
    ];
    for (element, token) in selections {
        check_option(ctx.form, element, token)?;
    }
    for (element, token) in selections {
        if let Some(token) = token {
            ctx.form.set_text(element, token);
        }
    }
    ctx.form.set_text(FormElement::ScheduleName, &submit.name);
    ctx.trigger(SchedulerAction::Submit);

    Ok(serde_json::json!({
        "success": true,
        "name": submit.name,
        "search": ctx.form.field_value(FormElement::SearchStrategy),
        "priority": ctx.form.field_value(FormElement::ShippingPriority),
    }))
}

fn handle_cycle_search(
    params: &serde_json::Value,
    ctx: &mut SchedulerRpc,
) -> Result<serde_json::Value, RpcError> {
    #[derive(serde::Deserialize)]
    struct CycleParams {
        step: i32,
    }

    let cycle = serde_json::from_value::<CycleParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected integer 'step' parameter"))?;

    ctx.trigger(SchedulerAction::CycleSearchStrategy(cycle.step));
    Ok(serde_json::json!({ "success": true }))
}

/// Fill the change-priority panel and submit it. An empty name is reported
/// through the `priority_change_error` notification.
fn handle_change_priority(
    params: &serde_json::Value,
    ctx: &mut SchedulerRpc,
) -> Result<serde_json::Value, RpcError> {
    #[derive(serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ChangePriorityParams {
        package_name: String,
        priority: String,
    }

    let change = serde_json::from_value::<ChangePriorityParams>(params.clone()).map_err(|_| {
        RpcError::invalid_params("Expected 'packageName' and 'priority' parameters")
    })?;

    check_option(ctx.form, FormElement::ChangePriorityValue, Some(&change.priority))?;
    ctx.form.set_text(FormElement::ChangePriorityValue, &change.priority);
    ctx.form.set_text(FormElement::ChangePriorityName, &change.package_name);
    ctx.trigger(SchedulerAction::SubmitPriorityChange);

    Ok(serde_json::json!({
        "success": true,
        "packageName": change.package_name,
        "priority": change.priority,
    }))
}

/// Reject tokens a selector does not offer. A missing token always passes.
fn check_option(form: &FormState, element: FormElement, token: Option<&str>) -> Result<(), RpcError> {
    let Some(token) = token else {
        return Ok(());
    };
    let Some(select) = form.selector(element) else {
        return Err(RpcError::internal_error("Element is not a selector"));
    };
    if select.options().iter().any(|option| option == token) {
        Ok(())
    } else {
        let mut error = RpcError::invalid_params(&format!("Unknown option: {}", token));
        error.data = Some(serde_json::json!({ "options": select.options() }));
        Err(error)
    }
}

/// Create standardized error response with optional data payload.
fn create_error_response(
    id: serde_json::Value,
    code: i32,
    message: &str,
    data: Option<serde_json::Value>,
) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

/// Send queued commands, notifications and responses to the host page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    // Backend commands go out before the state notifications they caused.
    for message in rpc_interface.drain_outgoing() {
        // Native builds have no host page to receive commands.
        #[cfg(not(target_arch = "wasm32"))]
        if let OutgoingMessage::Command(command) = &message {
            info!("Backend command {}: {}", command.method, command.params);
        }

        send_message_to_parent(&message);
    }
}

/// Send serialized message to parent window (host page).
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        match serde_json::to_string(message) {
            Ok(json) => trace!("Outgoing RPC message: {}", json),
            Err(e) => error!("Failed to serialize message: {}", e),
        }
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}
