use bevy::prelude::*;
use constants::coordinate_system::{world_to_grid, world_to_grid_plane};
use constants::entity::PACKAGE_NAME_SUFFIX;
use constants::form::{
    MISSING_LOCATIONS_MESSAGE, MISSING_NAME_MESSAGE, MISSING_PACKAGE_NAME_MESSAGE,
};
use serde_json::{Value, json};

use crate::config::EntityTemplate;

/// Rejected submission. The message is what the form displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{}", MISSING_NAME_MESSAGE)]
    MissingName,
    #[error("{}", MISSING_LOCATIONS_MESSAGE)]
    MissingLocations,
    #[error("{}", MISSING_PACKAGE_NAME_MESSAGE)]
    MissingPackageName,
}

/// Join errors one per line for an inline message element.
pub fn render_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Outbound transport toward the simulation backend. Fire and forget.
pub trait CommandChannel {
    fn send(&mut self, command_name: &str, payload: Value);
}

/// Send commands in order through the channel.
pub fn dispatch<'a>(
    channel: &mut impl CommandChannel,
    commands: impl IntoIterator<Item = &'a Command>,
) {
    for command in commands {
        debug!("Sending {} command", command.name());
        channel.send(command.name(), command.payload());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    CreateEntity,
    ScheduleTrip,
    ChangePriority,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateEntity {
    pub entity_type: String,
    pub name: String,
    pub mesh: String,
    pub position: [f64; 3],
    pub scale: [f64; 3],
    pub direction: [f64; 3],
    pub speed: f64,
    pub radius: f64,
    pub rotation: [f64; 4],
}

/// `start` is the (x, z) ground projection while `end` is a full position;
/// the backend contract expects exactly these shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleTrip {
    pub name: String,
    pub start: [f64; 2],
    pub end: [f64; 3],
    pub search: String,
    pub priority: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangePriority {
    pub package_name: String,
    pub priority: String,
}

/// Immutable backend command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateEntity(CreateEntity),
    ScheduleTrip(ScheduleTrip),
    ChangePriority(ChangePriority),
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::CreateEntity(_) => CommandKind::CreateEntity,
            Self::ScheduleTrip(_) => CommandKind::ScheduleTrip,
            Self::ChangePriority(_) => CommandKind::ChangePriority,
        }
    }

    /// Wire name of the command.
    pub fn name(&self) -> &'static str {
        match self.kind() {
            CommandKind::CreateEntity => "CreateEntity",
            CommandKind::ScheduleTrip => "ScheduleTrip",
            CommandKind::ChangePriority => "ChangePriority",
        }
    }

    /// Wire payload with the backend's field names.
    pub fn payload(&self) -> Value {
        match self {
            Self::CreateEntity(entity) => json!({
                "type": entity.entity_type,
                "name": entity.name,
                "mesh": entity.mesh,
                "position": entity.position,
                "scale": entity.scale,
                "direction": entity.direction,
                "speed": entity.speed,
                "radius": entity.radius,
                "rotation": entity.rotation,
            }),
            Self::ScheduleTrip(trip) => json!({
                "name": trip.name,
                "start": trip.start,
                "end": trip.end,
                "search": trip.search,
                "priority": trip.priority,
            }),
            Self::ChangePriority(change) => json!({
                "packageName": change.package_name,
                "priority": change.priority,
            }),
        }
    }
}

/// Everything needed to schedule one trip, captured at submit time.
/// A point is `None` until the selection has placed it.
///
/// Points stay `f32` like the rest of the scene and are widened to `f64`
/// only when the commands are built, so scaled coordinates carry `f32`
/// rounding (0.1 becomes 1.4200000211 after scaling, not 1.42).
#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
    pub name: String,
    pub search_strategy: String,
    pub priority: String,
    pub pickup: Option<Vec3>,
    pub dropoff: Option<Vec3>,
}

impl TripRequest {
    /// All applicable errors, not just the first.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.name.is_empty() {
            errors.push(ValidationError::MissingName);
        }
        if self.pickup.is_none() || self.dropoff.is_none() {
            errors.push(ValidationError::MissingLocations);
        }
        errors
    }
}

/// Turns a trip request into the package, robot and trip commands.
pub struct TripCommandBuilder<'a> {
    package: &'a EntityTemplate,
    robot: &'a EntityTemplate,
}

impl<'a> TripCommandBuilder<'a> {
    pub fn new(package: &'a EntityTemplate, robot: &'a EntityTemplate) -> Self {
        Self { package, robot }
    }

    /// Entities come first so the trip can reference them by name.
    pub fn build(&self, request: &TripRequest) -> Result<[Command; 3], Vec<ValidationError>> {
        let errors = request.validate();
        let (Some(pickup), Some(dropoff), true) =
            (request.pickup, request.dropoff, errors.is_empty())
        else {
            return Err(errors);
        };

        let pickup = pickup.as_dvec3().to_array();
        let dropoff = dropoff.as_dvec3().to_array();

        let package = create_entity(
            self.package,
            format!("{}{}", request.name, PACKAGE_NAME_SUFFIX),
            pickup,
        );
        let robot = create_entity(self.robot, request.name.clone(), dropoff);
        let trip = Command::ScheduleTrip(ScheduleTrip {
            name: request.name.clone(),
            start: world_to_grid_plane(pickup),
            end: world_to_grid(dropoff),
            search: request.search_strategy.clone(),
            priority: request.priority.clone(),
        });

        Ok([package, robot, trip])
    }
}

fn create_entity(template: &EntityTemplate, name: String, point: [f64; 3]) -> Command {
    Command::CreateEntity(CreateEntity {
        entity_type: template.entity_type.clone(),
        name,
        mesh: template.mesh.clone(),
        position: world_to_grid(point),
        scale: template.scale,
        direction: template.direction,
        speed: template.speed,
        radius: template.radius,
        rotation: template.rotation,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityChangeRequest {
    pub package_name: String,
    pub priority: String,
}

pub struct PriorityChangeBuilder;

impl PriorityChangeBuilder {
    pub fn build(request: &PriorityChangeRequest) -> Result<Command, ValidationError> {
        if request.package_name.is_empty() {
            return Err(ValidationError::MissingPackageName);
        }
        Ok(Command::ChangePriority(ChangePriority {
            package_name: request.package_name.clone(),
            priority: request.priority.clone(),
        }))
    }
}
