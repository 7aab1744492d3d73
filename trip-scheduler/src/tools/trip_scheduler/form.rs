use bevy::prelude::*;
use constants::form::{SEARCH_STRATEGIES, SHIPPING_PRIORITIES};

/// Every form control the scheduler reads from or writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormElement {
    ScheduleButton,
    ScheduleForm,
    ScheduleName,
    SearchStrategy,
    ShippingPriority,
    ScheduleError,
    ChangePriorityButton,
    ChangePriorityPanel,
    ChangePriorityName,
    ChangePriorityValue,
    ChangePriorityError,
}

/// Capabilities the scheduler needs from whatever renders the form.
pub trait FormSurface {
    /// Current value of a text field or selector. Empty for other elements.
    fn field_value(&self, element: FormElement) -> String;
    fn is_visible(&self, element: FormElement) -> bool;
    fn set_visible(&mut self, element: FormElement, visible: bool);
    /// Replace the text of a field or message. Selectors switch to the
    /// matching option and ignore unknown tokens.
    fn set_text(&mut self, element: FormElement, text: &str);
}

/// Fixed list of option tokens with a wrapping cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSelect {
    options: Vec<String>,
    selected: usize,
}

impl OptionSelect {
    pub fn new<S: AsRef<str>>(options: &[S]) -> Self {
        Self {
            options: options.iter().map(|o| o.as_ref().to_string()).collect(),
            selected: 0,
        }
    }

    pub fn value(&self) -> &str {
        self.options
            .get(self.selected)
            .map_or("", String::as_str)
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Move the cursor by `step` options, wrapping at both ends.
    pub fn cycle(&mut self, step: i32) {
        if self.options.is_empty() {
            return;
        }
        let len = self.options.len() as i64;
        let next = (self.selected as i64 + step as i64).rem_euclid(len);
        self.selected = next as usize;
    }

    /// Select the option equal to `token`. Returns false if it is not offered.
    pub fn select(&mut self, token: &str) -> bool {
        match self.options.iter().position(|o| o == token) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    /// Swap the option list, keeping the current token selected when it
    /// survives the swap.
    pub fn replace_options<S: AsRef<str>>(&mut self, options: &[S]) {
        let current = self.value().to_string();
        *self = Self::new(options);
        self.select(&current);
    }
}

/// Form contents and visibility shared by the native panel and the web host.
#[derive(Resource, Debug, Clone)]
pub struct FormState {
    pub schedule_button_visible: bool,
    pub schedule_form_visible: bool,
    pub trip_name: String,
    pub search_strategy: OptionSelect,
    pub shipping_priority: OptionSelect,
    pub schedule_error: String,
    pub change_priority_button_visible: bool,
    pub change_priority_visible: bool,
    pub package_name: String,
    pub new_priority: OptionSelect,
    pub change_priority_error: String,
    /// Keystrokes go to the open text field instead of the camera.
    pub text_focus: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            schedule_button_visible: true,
            schedule_form_visible: false,
            trip_name: String::new(),
            search_strategy: OptionSelect::new(SEARCH_STRATEGIES),
            shipping_priority: OptionSelect::new(SHIPPING_PRIORITIES),
            schedule_error: String::new(),
            change_priority_button_visible: true,
            change_priority_visible: false,
            package_name: String::new(),
            new_priority: OptionSelect::new(SHIPPING_PRIORITIES),
            change_priority_error: String::new(),
            text_focus: false,
        }
    }
}

impl FormState {
    /// Text field that receives typed characters, if any.
    pub fn focused_text_field(&self) -> Option<FormElement> {
        if !self.text_focus {
            None
        } else if self.schedule_form_visible {
            Some(FormElement::ScheduleName)
        } else if self.change_priority_visible {
            Some(FormElement::ChangePriorityName)
        } else {
            None
        }
    }

    /// Hand keystrokes between the open text field and the camera.
    /// Returns whether the field now has focus.
    pub fn toggle_focus(&mut self) -> bool {
        self.text_focus = !self.text_focus && self.any_form_visible();
        self.text_focus
    }

    fn any_form_visible(&self) -> bool {
        self.schedule_form_visible || self.change_priority_visible
    }

    pub fn type_text(&mut self, text: &str) {
        if let Some(field) = self.focused_text_field() {
            self.type_into(field, text);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.focused_text_field() {
            self.backspace_in(field);
        }
    }

    /// Append printable characters to a text field, focused or not.
    pub fn type_into(&mut self, element: FormElement, text: &str) {
        if let Some(field) = self.text_field_mut(element) {
            field.extend(text.chars().filter(|c| !c.is_control()));
        }
    }

    pub fn backspace_in(&mut self, element: FormElement) {
        if let Some(field) = self.text_field_mut(element) {
            field.pop();
        }
    }

    fn text_field_mut(&mut self, element: FormElement) -> Option<&mut String> {
        match element {
            FormElement::ScheduleName => Some(&mut self.trip_name),
            FormElement::ChangePriorityName => Some(&mut self.package_name),
            _ => None,
        }
    }

    pub fn selector(&self, element: FormElement) -> Option<&OptionSelect> {
        match element {
            FormElement::SearchStrategy => Some(&self.search_strategy),
            FormElement::ShippingPriority => Some(&self.shipping_priority),
            FormElement::ChangePriorityValue => Some(&self.new_priority),
            _ => None,
        }
    }

    pub fn select_mut(&mut self, element: FormElement) -> Option<&mut OptionSelect> {
        match element {
            FormElement::SearchStrategy => Some(&mut self.search_strategy),
            FormElement::ShippingPriority => Some(&mut self.shipping_priority),
            FormElement::ChangePriorityValue => Some(&mut self.new_priority),
            _ => None,
        }
    }

    /// Label shown for an element in the native panel.
    /// The focused field shows a trailing cursor.
    pub fn display_text(&self, element: FormElement) -> String {
        let cursor = if self.focused_text_field() == Some(element) { "_" } else { "" };
        match element {
            FormElement::ScheduleName => format!("Name: {}{}", self.trip_name, cursor),
            FormElement::SearchStrategy => format!("Search: {}", self.search_strategy.value()),
            FormElement::ShippingPriority => {
                format!("Priority: {}", self.shipping_priority.value())
            }
            FormElement::ChangePriorityName => format!("Package: {}{}", self.package_name, cursor),
            FormElement::ChangePriorityValue => {
                format!("New priority: {}", self.new_priority.value())
            }
            _ => self.field_value(element),
        }
    }
}

impl FormSurface for FormState {
    fn is_visible(&self, element: FormElement) -> bool {
        match element {
            FormElement::ScheduleButton => self.schedule_button_visible,
            FormElement::ScheduleForm
            | FormElement::ScheduleName
            | FormElement::SearchStrategy
            | FormElement::ShippingPriority
            | FormElement::ScheduleError => self.schedule_form_visible,
            FormElement::ChangePriorityButton => self.change_priority_button_visible,
            FormElement::ChangePriorityPanel
            | FormElement::ChangePriorityName
            | FormElement::ChangePriorityValue
            | FormElement::ChangePriorityError => self.change_priority_visible,
        }
    }

    fn field_value(&self, element: FormElement) -> String {
        match element {
            FormElement::ScheduleName => self.trip_name.clone(),
            FormElement::SearchStrategy => self.search_strategy.value().to_string(),
            FormElement::ShippingPriority => self.shipping_priority.value().to_string(),
            FormElement::ScheduleError => self.schedule_error.clone(),
            FormElement::ChangePriorityName => self.package_name.clone(),
            FormElement::ChangePriorityValue => self.new_priority.value().to_string(),
            FormElement::ChangePriorityError => self.change_priority_error.clone(),
            _ => String::new(),
        }
    }

    fn set_visible(&mut self, element: FormElement, visible: bool) {
        match element {
            FormElement::ScheduleButton => self.schedule_button_visible = visible,
            FormElement::ScheduleForm => self.schedule_form_visible = visible,
            FormElement::ChangePriorityButton => self.change_priority_button_visible = visible,
            FormElement::ChangePriorityPanel => self.change_priority_visible = visible,
            other => debug!("Visibility of {:?} follows its container", other),
        }
        // Opening a form focuses its field; closing the last one releases it.
        if matches!(
            element,
            FormElement::ScheduleForm | FormElement::ChangePriorityPanel
        ) {
            self.text_focus = if visible {
                true
            } else {
                self.text_focus && self.any_form_visible()
            };
        }
    }

    fn set_text(&mut self, element: FormElement, text: &str) {
        match element {
            FormElement::ScheduleName => self.trip_name = text.to_string(),
            FormElement::ScheduleError => self.schedule_error = text.to_string(),
            FormElement::ChangePriorityName => self.package_name = text.to_string(),
            FormElement::ChangePriorityError => self.change_priority_error = text.to_string(),
            FormElement::SearchStrategy
            | FormElement::ShippingPriority
            | FormElement::ChangePriorityValue => {
                if let Some(select) = self.select_mut(element) {
                    if !select.select(text) {
                        warn!("Ignoring unknown option '{}' for {:?}", text, element);
                    }
                }
            }
            other => debug!("{:?} carries no text", other),
        }
    }
}
