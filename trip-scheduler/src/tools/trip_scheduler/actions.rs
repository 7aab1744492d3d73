use bevy::input::ButtonState;
use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::prelude::*;

use super::commands::{TripCommandBuilder, render_errors};
use super::form::{FormElement, FormState, FormSurface};
use super::priority::{cancel_priority_change, submit_priority_change, toggle_priority_panel};
use super::state::{PickingMode, TripSelection};
use crate::config::SchedulerConfig;
use crate::rpc::web_rpc::WebRpcInterface;

/// Everything the form, keyboard or host page can ask the scheduler to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerAction {
    OpenForm,
    Cancel,
    Submit,
    CycleSearchStrategy(i32),
    CycleShippingPriority(i32),
    TogglePriorityPanel,
    CyclePriorityValue(i32),
    SubmitPriorityChange,
    CancelPriorityChange,
}

/// Origin of an action, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSource {
    Keyboard,
    Button,
    Rpc,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct SchedulerActionEvent {
    pub action: SchedulerAction,
    pub source: ActionSource,
}

/// What a single key press means for the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRoute {
    Action(SchedulerAction),
    Type(String),
    Backspace,
    ToggleFocus,
}

/// Map a key press to a scheduler action or text edit.
///
/// Space opens the form only from idle with no text field focused; Enter,
/// Escape and the vertical arrows act only while picking. Tab hands the
/// keyboard between an open form and the camera. Everything printable goes
/// to the focused field.
pub fn route_key(key: &Key, mode: PickingMode, focus: Option<FormElement>) -> Option<KeyRoute> {
    let picking = mode != PickingMode::Idle;
    match key {
        Key::Space if mode == PickingMode::Idle && focus.is_none() => {
            Some(KeyRoute::Action(SchedulerAction::OpenForm))
        }
        Key::Character(text) if text.as_str() == " " && mode == PickingMode::Idle && focus.is_none() => {
            Some(KeyRoute::Action(SchedulerAction::OpenForm))
        }
        Key::Space => focus.map(|_| KeyRoute::Type(" ".to_string())),
        Key::Enter if picking => Some(KeyRoute::Action(SchedulerAction::Submit)),
        Key::Escape if picking => Some(KeyRoute::Action(SchedulerAction::Cancel)),
        Key::ArrowUp if picking => Some(KeyRoute::Action(SchedulerAction::CycleSearchStrategy(-1))),
        Key::ArrowDown if picking => {
            Some(KeyRoute::Action(SchedulerAction::CycleSearchStrategy(1)))
        }
        Key::Tab => Some(KeyRoute::ToggleFocus),
        Key::Backspace => focus.map(|_| KeyRoute::Backspace),
        Key::Character(text) => focus.map(|_| KeyRoute::Type(text.to_string())),
        _ => None,
    }
}

/// Keyboard shortcuts and text entry for the native panel.
#[cfg(not(target_arch = "wasm32"))]
pub fn scheduler_keyboard_system(
    mut keys: EventReader<KeyboardInput>,
    selection: Res<TripSelection>,
    mut form: ResMut<FormState>,
    mut actions: EventWriter<SchedulerActionEvent>,
) {
    // Mode and focus as of this frame; the form opens once actions resolve.
    let mut mode = selection.mode();
    let mut focus = form.focused_text_field();
    for event in keys.read() {
        if event.state != ButtonState::Pressed {
            continue;
        }
        match route_key(&event.logical_key, mode, focus) {
            Some(KeyRoute::Action(action)) => {
                if action == SchedulerAction::OpenForm {
                    // Fresh name; keys later in this frame type into it.
                    form.set_text(FormElement::ScheduleName, "");
                    mode = PickingMode::AwaitingFirstPoint;
                    focus = Some(FormElement::ScheduleName);
                }
                actions.write(SchedulerActionEvent {
                    action,
                    source: ActionSource::Keyboard,
                });
            }
            Some(KeyRoute::Type(text)) => {
                if let Some(field) = focus {
                    form.type_into(field, &text);
                }
            }
            Some(KeyRoute::Backspace) => {
                if let Some(field) = focus {
                    form.backspace_in(field);
                }
            }
            Some(KeyRoute::ToggleFocus) => {
                let focused = form.toggle_focus();
                focus = form.focused_text_field();
                debug!("Text field focus {}", if focused { "taken" } else { "released" });
            }
            None => {}
        }
    }
}

/// No native shortcuts in WASM builds; the host page drives actions via RPC.
#[cfg(target_arch = "wasm32")]
pub fn scheduler_keyboard_system() {}

/// Apply scheduler actions to the selection, the form and the command channel.
pub fn handle_scheduler_actions(
    mut events: EventReader<SchedulerActionEvent>,
    mut selection: ResMut<TripSelection>,
    mut form: ResMut<FormState>,
    config: Res<SchedulerConfig>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for event in events.read() {
        debug!("Scheduler action {:?} via {:?}", event.action, event.source);
        let form = &mut *form;

        match event.action {
            SchedulerAction::OpenForm => {
                selection.open_form(form);
            }
            SchedulerAction::Cancel => {
                selection.cancel(form);
            }
            SchedulerAction::Submit => {
                let builder = TripCommandBuilder::new(&config.package, &config.robot);
                if let Err(errors) = selection.submit(form, &builder, &mut *rpc_interface) {
                    rpc_interface.send_notification(
                        "schedule_error",
                        serde_json::json!({
                            "errors": errors.iter().map(|e| format!("{:?}", e)).collect::<Vec<_>>(),
                            "message": render_errors(&errors),
                        }),
                    );
                }
            }
            SchedulerAction::CycleSearchStrategy(step) => {
                if selection.is_picking() {
                    form.search_strategy.cycle(step);
                }
            }
            SchedulerAction::CycleShippingPriority(step) => {
                form.shipping_priority.cycle(step);
            }
            SchedulerAction::TogglePriorityPanel => toggle_priority_panel(form),
            SchedulerAction::CyclePriorityValue(step) => form.new_priority.cycle(step),
            SchedulerAction::SubmitPriorityChange => {
                if let Err(err) = submit_priority_change(form, &mut *rpc_interface) {
                    rpc_interface.send_notification(
                        "priority_change_error",
                        serde_json::json!({ "message": err.to_string() }),
                    );
                }
            }
            SchedulerAction::CancelPriorityChange => cancel_priority_change(form),
        }

        rpc_interface.send_notification("schedule_state_changed", schedule_state(&selection, form));
    }
}

/// Snapshot of the scheduler for the host page.
pub fn schedule_state(selection: &TripSelection, form: &FormState) -> serde_json::Value {
    use super::state::PointRole;

    let point = |role: PointRole| {
        selection
            .picked_position(role)
            .map(|p| [p.x, p.y, p.z])
    };
    serde_json::json!({
        "mode": selection.mode(),
        "pickup": point(PointRole::Pickup),
        "dropoff": point(PointRole::Dropoff),
        "form_visible": form.is_visible(FormElement::ScheduleForm),
        "name": form.field_value(FormElement::ScheduleName),
        "search": form.field_value(FormElement::SearchStrategy),
        "priority": form.field_value(FormElement::ShippingPriority),
        "error": form.field_value(FormElement::ScheduleError),
        "change_priority_visible": form.is_visible(FormElement::ChangePriorityPanel),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::trip_scheduler::state::PointRole;

    fn route(key: Key, mode: PickingMode, focus: Option<FormElement>) -> Option<KeyRoute> {
        route_key(&key, mode, focus)
    }

    #[test]
    fn space_opens_only_from_idle_without_focus() {
        assert_eq!(
            route(Key::Space, PickingMode::Idle, None),
            Some(KeyRoute::Action(SchedulerAction::OpenForm))
        );
        assert_eq!(
            route(Key::Space, PickingMode::AwaitingFirstPoint, Some(FormElement::ScheduleName)),
            Some(KeyRoute::Type(" ".to_string()))
        );
        assert_eq!(
            route(Key::Space, PickingMode::Idle, Some(FormElement::ChangePriorityName)),
            Some(KeyRoute::Type(" ".to_string()))
        );
    }

    #[test]
    fn enter_escape_and_arrows_need_active_picking() {
        assert_eq!(route(Key::Enter, PickingMode::Idle, None), None);
        assert_eq!(route(Key::Escape, PickingMode::Idle, None), None);
        assert_eq!(route(Key::ArrowUp, PickingMode::Idle, None), None);
        let focus = Some(FormElement::ScheduleName);
        assert_eq!(
            route(Key::Enter, PickingMode::ReadyToSubmit, focus),
            Some(KeyRoute::Action(SchedulerAction::Submit))
        );
        assert_eq!(
            route(Key::Escape, PickingMode::AwaitingSecondPoint, focus),
            Some(KeyRoute::Action(SchedulerAction::Cancel))
        );
        assert_eq!(
            route(Key::ArrowUp, PickingMode::AwaitingFirstPoint, focus),
            Some(KeyRoute::Action(SchedulerAction::CycleSearchStrategy(-1)))
        );
        assert_eq!(
            route(Key::ArrowDown, PickingMode::AwaitingFirstPoint, focus),
            Some(KeyRoute::Action(SchedulerAction::CycleSearchStrategy(1)))
        );
    }

    #[test]
    fn characters_type_into_focused_field() {
        let focus = Some(FormElement::ScheduleName);
        assert_eq!(
            route(Key::Character("b".into()), PickingMode::AwaitingFirstPoint, focus),
            Some(KeyRoute::Type("b".to_string()))
        );
        assert_eq!(
            route(Key::Backspace, PickingMode::AwaitingFirstPoint, focus),
            Some(KeyRoute::Backspace)
        );
        assert_eq!(route(Key::Character("b".into()), PickingMode::Idle, None), None);
    }

    #[test]
    fn tab_toggles_focus_in_any_mode() {
        assert_eq!(route(Key::Tab, PickingMode::Idle, None), Some(KeyRoute::ToggleFocus));
        assert_eq!(
            route(Key::Tab, PickingMode::AwaitingFirstPoint, Some(FormElement::ScheduleName)),
            Some(KeyRoute::ToggleFocus)
        );
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn press(app: &mut App, key_code: KeyCode, logical_key: Key) {
        app.world_mut().send_event(KeyboardInput {
            key_code,
            logical_key,
            state: ButtonState::Pressed,
            text: None,
            repeat: false,
            window: Entity::PLACEHOLDER,
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn keyboard_app() -> App {
        let mut app = App::new();
        app.add_event::<KeyboardInput>()
            .add_event::<SchedulerActionEvent>()
            .init_resource::<TripSelection>()
            .init_resource::<FormState>()
            .add_systems(Update, scheduler_keyboard_system);
        app
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn space_leaves_opening_to_the_action_handler() {
        let mut app = keyboard_app();
        app.world_mut().resource_mut::<FormState>().trip_name = "old".to_string();
        press(&mut app, KeyCode::Space, Key::Space);
        press(&mut app, KeyCode::KeyB, Key::Character("b".into()));
        app.update();

        let form = app.world().resource::<FormState>();
        assert!(!form.schedule_form_visible);
        assert_eq!(form.trip_name, "b");

        let events = app.world().resource::<Events<SchedulerActionEvent>>();
        let written: Vec<_> = events.iter_current_update_events().map(|e| e.action).collect();
        assert_eq!(written, [SchedulerAction::OpenForm]);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn tab_releases_the_name_field() {
        let mut app = keyboard_app();
        app.world_mut()
            .resource_mut::<FormState>()
            .set_visible(FormElement::ScheduleForm, true);
        press(&mut app, KeyCode::KeyA, Key::Character("a".into()));
        press(&mut app, KeyCode::Tab, Key::Tab);
        press(&mut app, KeyCode::KeyW, Key::Character("w".into()));
        app.update();

        let form = app.world().resource::<FormState>();
        assert_eq!(form.trip_name, "a");
        assert_eq!(form.focused_text_field(), None);
    }

    fn scheduler_app() -> App {
        let mut app = App::new();
        app.add_event::<SchedulerActionEvent>()
            .init_resource::<TripSelection>()
            .init_resource::<FormState>()
            .init_resource::<SchedulerConfig>()
            .init_resource::<WebRpcInterface>()
            .add_systems(Update, handle_scheduler_actions);
        app
    }

    fn act(app: &mut App, action: SchedulerAction) {
        app.world_mut().send_event(SchedulerActionEvent {
            action,
            source: ActionSource::Rpc,
        });
        app.update();
    }

    fn sent_commands(app: &App) -> Vec<String> {
        app.world()
            .resource::<WebRpcInterface>()
            .pending_commands()
            .iter()
            .map(|c| c.method.clone())
            .collect()
    }

    #[test]
    fn full_trip_through_actions() {
        let mut app = scheduler_app();
        act(&mut app, SchedulerAction::OpenForm);
        assert_eq!(
            app.world().resource::<TripSelection>().mode(),
            PickingMode::AwaitingFirstPoint
        );

        {
            let world = app.world_mut();
            let mut selection = world.resource_mut::<TripSelection>();
            selection.place(Vec3::new(1.0, 0.0, 2.0));
            selection.place(Vec3::new(3.0, 0.0, 4.0));
            world.resource_mut::<FormState>().trip_name = "bob".to_string();
        }

        act(&mut app, SchedulerAction::CycleSearchStrategy(1));
        act(&mut app, SchedulerAction::Submit);

        assert_eq!(sent_commands(&app), ["CreateEntity", "CreateEntity", "ScheduleTrip"]);
        let rpc = app.world().resource::<WebRpcInterface>();
        assert_eq!(rpc.pending_commands()[2].params["search"], "dfs");

        let selection = app.world().resource::<TripSelection>();
        assert_eq!(selection.mode(), PickingMode::Idle);
        assert!(!selection.point(PointRole::Dropoff).visible);
    }

    #[test]
    fn rejected_submit_notifies_host() {
        let mut app = scheduler_app();
        act(&mut app, SchedulerAction::OpenForm);
        act(&mut app, SchedulerAction::Submit);

        assert!(sent_commands(&app).is_empty());
        let rpc = app.world().resource::<WebRpcInterface>();
        let error = rpc
            .pending_notifications()
            .iter()
            .find(|n| n.method == "schedule_error")
            .expect("error notification");
        assert_eq!(error.params["errors"], serde_json::json!(["MissingName", "MissingLocations"]));
        assert_eq!(
            app.world().resource::<TripSelection>().mode(),
            PickingMode::AwaitingFirstPoint
        );
    }

    #[test]
    fn priority_change_through_actions() {
        let mut app = scheduler_app();
        act(&mut app, SchedulerAction::TogglePriorityPanel);
        app.world_mut().resource_mut::<FormState>().package_name = "pkg1".to_string();
        act(&mut app, SchedulerAction::CyclePriorityValue(-1));
        act(&mut app, SchedulerAction::SubmitPriorityChange);

        let rpc = app.world().resource::<WebRpcInterface>();
        assert_eq!(rpc.pending_commands().len(), 1);
        assert_eq!(
            rpc.pending_commands()[0].params,
            serde_json::json!({ "packageName": "pkg1", "priority": "Expedited" })
        );
        assert!(!app.world().resource::<FormState>().change_priority_visible);
    }

    #[test]
    fn search_cycling_is_ignored_while_idle() {
        let mut app = scheduler_app();
        act(&mut app, SchedulerAction::CycleSearchStrategy(1));
        assert_eq!(
            app.world().resource::<FormState>().field_value(FormElement::SearchStrategy),
            "astar"
        );
    }
}
