use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use std::env;

use coalesce::scenario::{
    scenario_fire_driver_system, scenario_frame_system, spawn_scenario_merge_chain,
    spawn_scenario_settle, spawn_scenario_staged_fire, spawn_scenario_terminal_sink,
    ScenarioState,
};
use coalesce::simulation::SimulationPlugin;
use coalesce::tier::load_tier_catalog;

/// Configure Rapier physics: disable global gravity — the well is the only
/// attractor in this simulation.
fn setup_physics_config(mut config: Query<&mut RapierConfiguration>) {
    for mut cfg in config.iter_mut() {
        cfg.gravity = Vec2::ZERO;
    }
}

fn main() {
    let scenario = env::var("WELL_SIM_SCENARIO").unwrap_or_else(|_| "merge_chain".to_string());

    let mut app = App::new();

    // Headless: scheduling + transforms + logging, no window or renderer.
    app.add_plugins(MinimalPlugins)
        .add_plugins(bevy::transform::TransformPlugin)
        .add_plugins(bevy::log::LogPlugin::default())
        // pixels_per_meter(1.0) keeps world units identical in physics-space;
        // larger values shrink collider mass quadratically and make
        // ExternalForce produce runaway acceleration at the same numerics.
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0))
        .add_plugins(SimulationPlugin)
        .insert_resource(ScenarioState::new(&scenario))
        .add_systems(Startup, setup_physics_config)
        .add_systems(Update, (scenario_fire_driver_system, scenario_frame_system));

    // Scenario cast, spawned after the config and catalog have loaded.
    match scenario.as_str() {
        "settle" => {
            app.add_systems(Startup, spawn_scenario_settle.after(load_tier_catalog));
        }
        "terminal_sink" => {
            app.add_systems(
                Startup,
                spawn_scenario_terminal_sink.after(load_tier_catalog),
            );
        }
        "staged_fire" => {
            app.add_systems(Startup, spawn_scenario_staged_fire.after(load_tier_catalog));
        }
        _ => {
            app.add_systems(Startup, spawn_scenario_merge_chain.after(load_tier_catalog));
        }
    }

    println!("Running scenario: {scenario}");
    app.run();
}
