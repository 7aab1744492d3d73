use bevy::prelude::*;
use serde::Serialize;

use super::commands::{
    CommandChannel, TripCommandBuilder, TripRequest, ValidationError, dispatch, render_errors,
};
use super::form::{FormElement, FormSurface};
use super::picking::{GroundPicker, PickCamera, screen_to_ndc};

/// Step of the two-click trip definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickingMode {
    #[default]
    Idle,
    AwaitingFirstPoint,
    AwaitingSecondPoint,
    ReadyToSubmit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointRole {
    Pickup,
    Dropoff,
}

/// One of the two reusable point slots and its beam marker.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PickedPoint {
    pub position: Vec3,
    pub visible: bool,
    pub marker: Option<Entity>,
}

/// Picking mode plus the pickup and drop-off slots.
///
/// The slots live for the whole session and are reused by every trip. A slot's
/// position is only meaningful once the mode has moved past the step that
/// places it; use `picked_position` to read it.
#[derive(Resource, Debug, Clone, Default)]
pub struct TripSelection {
    mode: PickingMode,
    pickup: PickedPoint,
    dropoff: PickedPoint,
}

impl TripSelection {
    pub fn mode(&self) -> PickingMode {
        self.mode
    }

    /// True from opening the form until cancel or a successful submit.
    pub fn is_picking(&self) -> bool {
        self.mode != PickingMode::Idle
    }

    pub fn is_awaiting_point(&self) -> bool {
        matches!(
            self.mode,
            PickingMode::AwaitingFirstPoint | PickingMode::AwaitingSecondPoint
        )
    }

    pub fn point(&self, role: PointRole) -> &PickedPoint {
        match role {
            PointRole::Pickup => &self.pickup,
            PointRole::Dropoff => &self.dropoff,
        }
    }

    fn point_mut(&mut self, role: PointRole) -> &mut PickedPoint {
        match role {
            PointRole::Pickup => &mut self.pickup,
            PointRole::Dropoff => &mut self.dropoff,
        }
    }

    /// Position of a slot that has been placed in the current session.
    pub fn picked_position(&self, role: PointRole) -> Option<Vec3> {
        let placed = match role {
            PointRole::Pickup => matches!(
                self.mode,
                PickingMode::AwaitingSecondPoint | PickingMode::ReadyToSubmit
            ),
            PointRole::Dropoff => self.mode == PickingMode::ReadyToSubmit,
        };
        placed.then(|| self.point(role).position)
    }

    pub fn attach_marker(&mut self, role: PointRole, marker: Entity) {
        self.point_mut(role).marker = Some(marker);
    }

    /// Start a session. Only allowed while idle.
    pub fn open_form(&mut self, form: &mut impl FormSurface) -> bool {
        if self.mode != PickingMode::Idle {
            debug!("Schedule form already open ({:?})", self.mode);
            return false;
        }
        self.mode = PickingMode::AwaitingFirstPoint;
        form.set_visible(FormElement::ScheduleButton, false);
        form.set_visible(FormElement::ScheduleForm, true);
        info!("Trip scheduling started, awaiting pickup point");
        true
    }

    /// Abandon the session. Safe to call in any mode; returns whether a
    /// session was actually open.
    pub fn cancel(&mut self, form: &mut impl FormSurface) -> bool {
        let was_picking = self.is_picking();
        self.reset(form);
        if was_picking {
            info!("Trip scheduling cancelled");
        }
        was_picking
    }

    fn reset(&mut self, form: &mut impl FormSurface) {
        self.mode = PickingMode::Idle;
        self.pickup.visible = false;
        self.dropoff.visible = false;
        form.set_visible(FormElement::ScheduleButton, true);
        form.set_visible(FormElement::ScheduleForm, false);
    }

    /// Resolve a click to a ground point and place the next slot.
    /// Only the nearest intersection is used. Returns the slot placed, or
    /// `None` when not awaiting a point or the ray missed the ground.
    pub fn pick(
        &mut self,
        cursor: Vec2,
        viewport: Vec2,
        camera: &PickCamera,
        picker: &impl GroundPicker,
    ) -> Option<PointRole> {
        if !self.is_awaiting_point() {
            return None;
        }
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return None;
        }

        let ndc = screen_to_ndc(cursor, viewport);
        let Some(&nearest) = picker.intersect(ndc, camera).first() else {
            debug!("Pick at {:?} missed the ground", cursor);
            return None;
        };
        self.place(nearest)
    }

    /// Placement policy for one ground hit.
    pub fn place(&mut self, hit: Vec3) -> Option<PointRole> {
        let (role, next) = match self.mode {
            PickingMode::AwaitingFirstPoint => {
                (PointRole::Pickup, PickingMode::AwaitingSecondPoint)
            }
            PickingMode::AwaitingSecondPoint => (PointRole::Dropoff, PickingMode::ReadyToSubmit),
            PickingMode::Idle | PickingMode::ReadyToSubmit => return None,
        };

        let point = self.point_mut(role);
        point.position = hit;
        point.visible = true;
        self.mode = next;
        info!("{:?} point set at {:?}, now {:?}", role, hit, next);
        Some(role)
    }

    /// Validate the form and picked points, send the trip commands and close
    /// the session. On failure every error is shown and nothing changes.
    pub fn submit(
        &mut self,
        form: &mut impl FormSurface,
        builder: &TripCommandBuilder,
        channel: &mut impl CommandChannel,
    ) -> Result<(), Vec<ValidationError>> {
        let request = TripRequest {
            name: form.field_value(FormElement::ScheduleName),
            search_strategy: form.field_value(FormElement::SearchStrategy),
            priority: form.field_value(FormElement::ShippingPriority),
            pickup: self.picked_position(PointRole::Pickup),
            dropoff: self.picked_position(PointRole::Dropoff),
        };

        form.set_text(FormElement::ScheduleError, "");
        let commands = match builder.build(&request) {
            Ok(commands) => commands,
            Err(errors) => {
                warn!("Trip submission rejected: {:?}", errors);
                form.set_text(FormElement::ScheduleError, &render_errors(&errors));
                return Err(errors);
            }
        };

        dispatch(channel, &commands);
        info!(
            "Scheduled trip '{}' ({}, {})",
            request.name, request.search_strategy, request.priority
        );
        self.reset(form);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EntityTemplate;
    use crate::tools::trip_scheduler::commands::tests::RecordingChannel;
    use crate::tools::trip_scheduler::form::FormState;

    /// Picker returning canned hits regardless of the ray.
    struct FixedPicker(Vec<Vec3>);

    impl GroundPicker for FixedPicker {
        fn intersect(&self, _ndc: Vec2, _camera: &PickCamera) -> Vec<Vec3> {
            self.0.clone()
        }
    }

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    fn click(selection: &mut TripSelection, hits: &[Vec3]) -> Option<PointRole> {
        let camera = Camera::default();
        let transform = GlobalTransform::IDENTITY;
        selection.pick(
            Vec2::new(400.0, 300.0),
            VIEWPORT,
            &PickCamera::new(&camera, &transform),
            &FixedPicker(hits.to_vec()),
        )
    }

    fn ready_selection(form: &mut FormState) -> TripSelection {
        let mut selection = TripSelection::default();
        selection.open_form(form);
        click(&mut selection, &[Vec3::new(1.0, 0.0, 2.0)]);
        click(&mut selection, &[Vec3::new(3.0, 0.0, 4.0)]);
        selection
    }

    #[test]
    fn two_hits_make_trip_ready() {
        let mut form = FormState::default();
        let mut selection = TripSelection::default();
        assert!(selection.open_form(&mut form));
        assert!(!form.schedule_button_visible);
        assert!(form.schedule_form_visible);

        assert_eq!(click(&mut selection, &[Vec3::new(1.0, 0.0, 2.0)]), Some(PointRole::Pickup));
        assert_eq!(selection.mode(), PickingMode::AwaitingSecondPoint);
        assert_eq!(click(&mut selection, &[Vec3::new(3.0, 0.0, 4.0)]), Some(PointRole::Dropoff));
        assert_eq!(selection.mode(), PickingMode::ReadyToSubmit);

        assert_eq!(selection.picked_position(PointRole::Pickup), Some(Vec3::new(1.0, 0.0, 2.0)));
        assert_eq!(selection.picked_position(PointRole::Dropoff), Some(Vec3::new(3.0, 0.0, 4.0)));
        assert!(selection.point(PointRole::Pickup).visible);
        assert!(selection.point(PointRole::Dropoff).visible);
    }

    #[test]
    fn pick_is_ignored_when_idle_or_ready() {
        let mut selection = TripSelection::default();
        assert_eq!(click(&mut selection, &[Vec3::ONE]), None);
        assert_eq!(selection.mode(), PickingMode::Idle);
        assert_eq!(*selection.point(PointRole::Pickup), PickedPoint::default());

        let mut form = FormState::default();
        let mut selection = ready_selection(&mut form);
        let before = selection.clone();
        assert_eq!(click(&mut selection, &[Vec3::splat(9.0)]), None);
        assert_eq!(selection.mode(), PickingMode::ReadyToSubmit);
        assert_eq!(selection.point(PointRole::Pickup), before.point(PointRole::Pickup));
        assert_eq!(selection.point(PointRole::Dropoff), before.point(PointRole::Dropoff));
    }

    #[test]
    fn miss_leaves_state_unchanged() {
        let mut form = FormState::default();
        let mut selection = TripSelection::default();
        selection.open_form(&mut form);
        assert_eq!(click(&mut selection, &[]), None);
        assert_eq!(selection.mode(), PickingMode::AwaitingFirstPoint);
        assert!(!selection.point(PointRole::Pickup).visible);
    }

    #[test]
    fn only_nearest_hit_is_used() {
        let mut form = FormState::default();
        let mut selection = TripSelection::default();
        selection.open_form(&mut form);
        click(&mut selection, &[Vec3::new(1.0, 3.0, 1.0), Vec3::new(1.0, 0.0, 1.0)]);
        assert_eq!(selection.mode(), PickingMode::AwaitingSecondPoint);
        assert_eq!(selection.picked_position(PointRole::Pickup), Some(Vec3::new(1.0, 3.0, 1.0)));
        assert_eq!(selection.picked_position(PointRole::Dropoff), None);
    }

    #[test]
    fn zero_viewport_never_picks() {
        let mut form = FormState::default();
        let mut selection = TripSelection::default();
        selection.open_form(&mut form);
        let camera = Camera::default();
        let transform = GlobalTransform::IDENTITY;
        let placed = selection.pick(
            Vec2::ZERO,
            Vec2::ZERO,
            &PickCamera::new(&camera, &transform),
            &FixedPicker(vec![Vec3::ONE]),
        );
        assert_eq!(placed, None);
        assert_eq!(selection.mode(), PickingMode::AwaitingFirstPoint);
    }

    #[test]
    fn open_form_only_from_idle() {
        let mut form = FormState::default();
        let mut selection = TripSelection::default();
        assert!(selection.open_form(&mut form));
        click(&mut selection, &[Vec3::ONE]);
        assert!(!selection.open_form(&mut form));
        assert_eq!(selection.mode(), PickingMode::AwaitingSecondPoint);
    }

    #[test]
    fn cancel_hides_markers_and_is_idempotent() {
        let mut form = FormState::default();
        let mut selection = ready_selection(&mut form);

        assert!(selection.cancel(&mut form));
        assert_eq!(selection.mode(), PickingMode::Idle);
        assert!(!selection.point(PointRole::Pickup).visible);
        assert!(!selection.point(PointRole::Dropoff).visible);
        assert!(form.schedule_button_visible);
        assert!(!form.schedule_form_visible);
        assert_eq!(selection.picked_position(PointRole::Pickup), None);

        assert!(!selection.cancel(&mut form));
        assert_eq!(selection.mode(), PickingMode::Idle);
        assert!(form.schedule_button_visible);
    }

    #[test]
    fn markers_survive_reset() {
        let mut form = FormState::default();
        let mut selection = TripSelection::default();
        let marker = Entity::from_raw(7);
        selection.attach_marker(PointRole::Pickup, marker);
        selection.open_form(&mut form);
        click(&mut selection, &[Vec3::ONE]);
        selection.cancel(&mut form);
        assert_eq!(selection.point(PointRole::Pickup).marker, Some(marker));
    }

    #[test]
    fn submit_sends_commands_and_resets() {
        let mut form = FormState::default();
        let mut selection = ready_selection(&mut form);
        form.trip_name = "bob".to_string();
        form.schedule_error = "stale".to_string();

        let package = EntityTemplate::package();
        let robot = EntityTemplate::robot();
        let builder = TripCommandBuilder::new(&package, &robot);
        let mut channel = RecordingChannel::default();

        selection
            .submit(&mut form, &builder, &mut channel)
            .expect("ready trip");

        let names: Vec<_> = channel.sent.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["CreateEntity", "CreateEntity", "ScheduleTrip"]);
        assert_eq!(channel.sent[2].1["search"], "astar");
        assert_eq!(channel.sent[2].1["priority"], "Standard");

        assert_eq!(selection.mode(), PickingMode::Idle);
        assert!(!selection.point(PointRole::Pickup).visible);
        assert!(!selection.point(PointRole::Dropoff).visible);
        assert!(form.schedule_button_visible);
        assert!(!form.schedule_form_visible);
        assert_eq!(form.schedule_error, "");

        assert!(selection.open_form(&mut form));
        assert!(!selection.point(PointRole::Pickup).visible);
        assert!(!selection.point(PointRole::Dropoff).visible);
    }

    #[test]
    fn rejected_submit_reports_all_errors_and_keeps_state() {
        let mut form = FormState::default();
        let mut selection = TripSelection::default();
        selection.open_form(&mut form);
        click(&mut selection, &[Vec3::ONE]);

        let package = EntityTemplate::package();
        let robot = EntityTemplate::robot();
        let builder = TripCommandBuilder::new(&package, &robot);
        let mut channel = RecordingChannel::default();

        let errors = selection
            .submit(&mut form, &builder, &mut channel)
            .unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::MissingName, ValidationError::MissingLocations]
        );
        assert!(channel.sent.is_empty());
        assert_eq!(selection.mode(), PickingMode::AwaitingSecondPoint);
        assert!(form.schedule_form_visible);
        assert_eq!(form.schedule_error.lines().count(), 2);
    }
}
