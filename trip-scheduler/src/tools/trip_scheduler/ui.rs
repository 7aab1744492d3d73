use bevy::ecs::hierarchy::ChildSpawnerCommands;
use bevy::prelude::*;
use bevy::ui::FocusPolicy;

use super::actions::{ActionSource, SchedulerAction, SchedulerActionEvent};
use super::form::{FormElement, FormState, FormSurface};

const BUTTON_IDLE: Color = Color::srgb(0.22, 0.24, 0.28);
const BUTTON_HOVER: Color = Color::srgb(0.26, 0.28, 0.32);
const BUTTON_PRESSED: Color = Color::srgb(0.18, 0.20, 0.24);

/// Node whose display follows the visibility of a form element.
#[derive(Component, Debug, Clone, Copy)]
pub struct FormNode(pub FormElement);

/// Text that mirrors a form element's label.
#[derive(Component, Debug, Clone, Copy)]
pub struct FormText(pub FormElement);

/// Button that emits a scheduler action when pressed.
#[derive(Component, Debug, Clone, Copy)]
pub struct FormButton(pub SchedulerAction);

// Spawns the scheduler panel in the bottom-left corner
pub fn spawn_scheduler_ui(mut commands: Commands) {
    commands
        .spawn((
            Name::new("TripSchedulerPanel"),
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(12.0),
                bottom: Val::Px(12.0),
                width: Val::Px(300.0),
                display: Display::Flex,
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(8.0),
                ..default()
            },
            // Hover state keeps scene picking from firing through the panel.
            Interaction::default(),
            FocusPolicy::Pass,
        ))
        .with_children(|panel| {
            spawn_button(
                panel,
                "Schedule Trip",
                SchedulerAction::OpenForm,
                None,
                Some(FormElement::ScheduleButton),
            );

            panel
                .spawn((
                    FormNode(FormElement::ScheduleForm),
                    Name::new("ScheduleForm"),
                    BackgroundColor(Color::srgb(0.12, 0.13, 0.15)),
                    section_node(),
                    Interaction::default(),
                    FocusPolicy::Pass,
                ))
                .with_children(|form| {
                    spawn_label(form, "Click pickup, then drop-off", None);
                    spawn_label(form, "", Some(FormElement::ScheduleName));
                    spawn_button(
                        form,
                        "",
                        SchedulerAction::CycleSearchStrategy(1),
                        Some(FormElement::SearchStrategy),
                        None,
                    );
                    spawn_button(
                        form,
                        "",
                        SchedulerAction::CycleShippingPriority(1),
                        Some(FormElement::ShippingPriority),
                        None,
                    );
                    spawn_button(form, "Submit", SchedulerAction::Submit, None, None);
                    spawn_button(form, "Cancel", SchedulerAction::Cancel, None, None);
                    spawn_error(form, FormElement::ScheduleError);
                });

            spawn_button(
                panel,
                "Change Priority",
                SchedulerAction::TogglePriorityPanel,
                None,
                Some(FormElement::ChangePriorityButton),
            );

            panel
                .spawn((
                    FormNode(FormElement::ChangePriorityPanel),
                    Name::new("ChangePriorityPanel"),
                    BackgroundColor(Color::srgb(0.12, 0.13, 0.15)),
                    section_node(),
                    Interaction::default(),
                    FocusPolicy::Pass,
                ))
                .with_children(|form| {
                    spawn_label(form, "", Some(FormElement::ChangePriorityName));
                    spawn_button(
                        form,
                        "",
                        SchedulerAction::CyclePriorityValue(1),
                        Some(FormElement::ChangePriorityValue),
                        None,
                    );
                    spawn_button(form, "Submit", SchedulerAction::SubmitPriorityChange, None, None);
                    spawn_button(form, "Cancel", SchedulerAction::CancelPriorityChange, None, None);
                    spawn_error(form, FormElement::ChangePriorityError);
                });
        });
}

fn section_node() -> Node {
    Node {
        width: Val::Percent(100.0),
        padding: UiRect::axes(Val::Px(12.0), Val::Px(8.0)),
        row_gap: Val::Px(6.0),
        display: Display::None,
        flex_direction: FlexDirection::Column,
        ..default()
    }
}

fn spawn_label(parent: &mut ChildSpawnerCommands, text: &str, mirrors: Option<FormElement>) {
    let mut label = parent.spawn((
        Text::new(text),
        TextFont { font_size: 16.0, ..default() },
        TextColor(Color::WHITE),
    ));
    if let Some(element) = mirrors {
        label.insert(FormText(element));
    }
}

fn spawn_error(parent: &mut ChildSpawnerCommands, element: FormElement) {
    parent.spawn((
        Text::new(""),
        TextFont { font_size: 14.0, ..default() },
        TextColor(Color::srgb(1.0, 0.2, 0.2)),
        FormText(element),
    ));
}

/// Button with a centred label. `mirrors` binds the label to a form element,
/// `toggles` binds the button's own display.
fn spawn_button(
    parent: &mut ChildSpawnerCommands,
    text: &str,
    action: SchedulerAction,
    mirrors: Option<FormElement>,
    toggles: Option<FormElement>,
) {
    let mut button = parent.spawn((
        Button,
        FormButton(action),
        BackgroundColor(BUTTON_IDLE),
        BorderColor(Color::srgba(0.0, 0.0, 0.0, 0.25)),
        Node {
            width: Val::Percent(100.0),
            height: Val::Px(32.0),
            display: Display::Flex,
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            border: UiRect::all(Val::Px(1.0)),
            ..default()
        },
    ));
    if let Some(element) = toggles {
        button.insert(FormNode(element));
    }
    button.with_children(|btn| {
        let mut label = btn.spawn((
            Text::new(text),
            TextFont { font_size: 16.0, ..default() },
            TextColor(Color::WHITE),
        ));
        if let Some(element) = mirrors {
            label.insert(FormText(element));
        }
    });
}

/// Forward button presses as scheduler actions.
pub fn form_button_interaction(
    mut q: Query<(&Interaction, &FormButton, &mut BackgroundColor), (Changed<Interaction>, With<Button>)>,
    mut actions: EventWriter<SchedulerActionEvent>,
) {
    for (interaction, FormButton(action), mut bg) in &mut q {
        match *interaction {
            Interaction::Pressed => {
                *bg = BackgroundColor(BUTTON_PRESSED);
                actions.write(SchedulerActionEvent {
                    action: *action,
                    source: ActionSource::Button,
                });
            }
            Interaction::Hovered => *bg = BackgroundColor(BUTTON_HOVER),
            Interaction::None => *bg = BackgroundColor(BUTTON_IDLE),
        }
    }
}

/// Reflect form visibility and text into the panel.
pub fn reflect_form_state(
    form: Res<FormState>,
    mut nodes: Query<(&FormNode, &mut Node)>,
    mut texts: Query<(&FormText, &mut Text)>,
) {
    if !form.is_changed() {
        return;
    }

    for (FormNode(element), mut node) in &mut nodes {
        node.display = if form.is_visible(*element) { Display::Flex } else { Display::None };
    }
    for (FormText(element), mut text) in &mut texts {
        let label = form.display_text(*element);
        if text.0 != label {
            text.0 = label;
        }
    }
}
