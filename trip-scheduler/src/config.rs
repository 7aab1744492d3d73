//! Runtime scheduler configuration loaded from a JSON asset.
//!
//! Defaults mirror the `constants` crate, so the scheduler is fully usable
//! before (or without) the asset. Once the asset loads it replaces the
//! `SchedulerConfig` resource and the form selector options.

use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::entity::{
    ENTITY_DIRECTION, ENTITY_RADIUS, ENTITY_ROTATION, ENTITY_SPEED, PACKAGE_MESH, PACKAGE_SCALE,
    PACKAGE_TYPE, ROBOT_MESH, ROBOT_SCALE, ROBOT_TYPE,
};
use constants::form::{SEARCH_STRATEGIES, SHIPPING_PRIORITIES};
use serde::{Deserialize, Serialize};

use crate::tools::trip_scheduler::form::FormState;

pub const CONFIG_PATH: &str = "config/trip.scheduler.json";
pub const CONFIG_EXTENSIONS: &[&str] = &["scheduler.json"];

/// Backend entity defaults applied to every spawned package or robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTemplate {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub mesh: String,
    pub scale: [f64; 3],
    pub direction: [f64; 3],
    pub speed: f64,
    pub radius: f64,
    pub rotation: [f64; 4],
}

impl EntityTemplate {
    pub fn package() -> Self {
        Self {
            entity_type: PACKAGE_TYPE.to_string(),
            mesh: PACKAGE_MESH.to_string(),
            scale: PACKAGE_SCALE,
            direction: ENTITY_DIRECTION,
            speed: ENTITY_SPEED,
            radius: ENTITY_RADIUS,
            rotation: ENTITY_ROTATION,
        }
    }

    pub fn robot() -> Self {
        Self {
            entity_type: ROBOT_TYPE.to_string(),
            mesh: ROBOT_MESH.to_string(),
            scale: ROBOT_SCALE,
            ..Self::package()
        }
    }
}

#[derive(Asset, Resource, TypePath, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub search_strategies: Vec<String>,
    pub shipping_priorities: Vec<String>,
    pub package: EntityTemplate,
    pub robot: EntityTemplate,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            search_strategies: SEARCH_STRATEGIES.iter().map(|s| s.to_string()).collect(),
            shipping_priorities: SHIPPING_PRIORITIES.iter().map(|s| s.to_string()).collect(),
            package: EntityTemplate::package(),
            robot: EntityTemplate::robot(),
        }
    }
}

impl SchedulerConfig {
    /// Push option lists into the form selectors.
    pub fn apply_to_form(&self, form: &mut FormState) {
        form.search_strategy.replace_options(&self.search_strategies);
        form.shipping_priority.replace_options(&self.shipping_priorities);
        form.new_priority.replace_options(&self.shipping_priorities);
    }
}

#[derive(Resource, Default)]
pub struct ConfigLoader {
    handle: Option<Handle<SchedulerConfig>>,
    loaded: bool,
}

/// Load the config asset once and swap it in when ready.
pub fn load_config_system(
    mut loader: ResMut<ConfigLoader>,
    mut commands: Commands,
    mut form: ResMut<FormState>,
    asset_server: Res<AssetServer>,
    configs: Res<Assets<SchedulerConfig>>,
) {
    if loader.loaded {
        return;
    }

    let Some(handle) = loader.handle.clone() else {
        info!("Loading scheduler config from: {}", CONFIG_PATH);
        loader.handle = Some(asset_server.load(CONFIG_PATH));
        return;
    };

    if let Some(config) = configs.get(&handle) {
        info!(
            "Scheduler config loaded: {} strategies, {} priorities",
            config.search_strategies.len(),
            config.shipping_priorities.len()
        );
        config.apply_to_form(&mut form);
        commands.insert_resource(config.clone());
        loader.loaded = true;
    } else if let Some(LoadState::Failed(err)) = asset_server.get_load_state(handle.id()) {
        warn!("Scheduler config unavailable ({}), using defaults", err);
        loader.loaded = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::trip_scheduler::form::FormSurface;
    use crate::tools::trip_scheduler::form::FormElement;

    #[test]
    fn defaults_match_world_conventions() {
        let config = SchedulerConfig::default();
        assert_eq!(config.search_strategies, ["astar", "dfs", "bfs", "dijkstra"]);
        assert_eq!(config.shipping_priorities, ["Standard", "NoRush", "Expedited"]);
        assert_eq!(config.package.entity_type, "package");
        assert_eq!(config.robot.entity_type, "robot");
        assert_eq!(config.robot.scale, [0.25, 0.25, 0.25]);
        assert_eq!(config.robot.speed, 30.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: SchedulerConfig =
            serde_json::from_str(r#"{ "search_strategies": ["astar", "beeline"] }"#)
                .expect("valid config");
        assert_eq!(config.search_strategies, ["astar", "beeline"]);
        assert_eq!(config.package, EntityTemplate::package());
    }

    #[test]
    fn template_uses_wire_type_key() {
        let json = serde_json::to_value(EntityTemplate::robot()).expect("serialisable");
        assert_eq!(json["type"], "robot");
        assert_eq!(json["mesh"], "assets/model/robot.glb");
    }

    #[test]
    fn applying_config_replaces_form_options() {
        let mut form = FormState::default();
        let config = SchedulerConfig {
            search_strategies: vec!["dijkstra".to_string(), "beeline".to_string()],
            ..Default::default()
        };
        form.set_text(FormElement::SearchStrategy, "dijkstra");
        config.apply_to_form(&mut form);
        assert_eq!(form.search_strategy.options(), ["dijkstra", "beeline"]);
        assert_eq!(form.field_value(FormElement::SearchStrategy), "dijkstra");
    }
}
