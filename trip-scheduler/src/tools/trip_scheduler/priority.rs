//! Change-priority panel: re-prioritise an already scheduled package by name.
//! Independent of the trip selection.

use bevy::prelude::*;

use super::commands::{
    CommandChannel, PriorityChangeBuilder, PriorityChangeRequest, ValidationError, dispatch,
};
use super::form::{FormElement, FormSurface};

pub fn toggle_priority_panel(form: &mut impl FormSurface) {
    let visible = form.is_visible(FormElement::ChangePriorityPanel);
    form.set_visible(FormElement::ChangePriorityPanel, !visible);
}

pub fn submit_priority_change(
    form: &mut impl FormSurface,
    channel: &mut impl CommandChannel,
) -> Result<(), ValidationError> {
    let request = PriorityChangeRequest {
        package_name: form.field_value(FormElement::ChangePriorityName),
        priority: form.field_value(FormElement::ChangePriorityValue),
    };

    let command = match PriorityChangeBuilder::build(&request) {
        Ok(command) => command,
        Err(err) => {
            warn!("Priority change rejected: {}", err);
            form.set_text(FormElement::ChangePriorityError, &err.to_string());
            return Err(err);
        }
    };

    dispatch(channel, [&command]);
    info!(
        "Requested priority {} for package '{}'",
        request.priority, request.package_name
    );
    close_panel(form);
    Ok(())
}

/// Discard whatever was typed; nothing is sent.
pub fn cancel_priority_change(form: &mut impl FormSurface) {
    close_panel(form);
}

fn close_panel(form: &mut impl FormSurface) {
    form.set_visible(FormElement::ChangePriorityPanel, false);
    form.set_text(FormElement::ChangePriorityName, "");
    form.set_text(FormElement::ChangePriorityError, "");
}
