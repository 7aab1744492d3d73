use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy::window::PresentMode;
use bevy_common_assets::json::JsonAssetPlugin;

mod config;
mod engine;
mod rpc;
mod tools;

use config::{CONFIG_EXTENSIONS, SchedulerConfig};
use engine::{
    camera::{ViewportCamera, camera_controller},
    scene::{grid::create_ground_grid, ground::spawn_ground},
};
use rpc::web_rpc::WebRpcPlugin;
use tools::trip_scheduler::TripSchedulerPlugin;

fn main() {
    let mut app = create_app();

    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen_futures::spawn_local(async move {
            app.run();
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        app.run();
    }
}

fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(JsonAssetPlugin::<SchedulerConfig>::new(CONFIG_EXTENSIONS))
        .add_plugins(WebRpcPlugin)
        .add_plugins(TripSchedulerPlugin)
        .init_resource::<ViewportCamera>()
        .insert_resource(ClearColor(Color::srgb(0.05, 0.06, 0.08)))
        .add_systems(Startup, setup)
        .add_systems(Update, camera_controller);

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}

fn create_window_config() -> Window {
    #[cfg(target_arch = "wasm32")]
    {
        Window {
            canvas: Some("#bevy".into()),
            fit_canvas_to_parent: true,
            prevent_default_event_handling: false,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Window {
            title: "Trip Scheduler".into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    info!("=== TRIP SCHEDULER ===");

    spawn_lighting(&mut commands);
    spawn_camera(&mut commands);
    spawn_ground(&mut commands, &mut meshes, &mut materials);
    create_ground_grid(&mut commands, &mut meshes, &mut materials);
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: false,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
}

fn spawn_camera(commands: &mut Commands) {
    let vp_camera = ViewportCamera::new(Vec3::new(0.0, 120.0, 160.0), 100.0);
    commands.spawn((Camera3d::default(), vp_camera.target_transform()));
    commands.insert_resource(vp_camera);
}
