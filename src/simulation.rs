//! Simulation plugin: resource registration and system scheduling.
//!
//! ## Schedule layout
//!
//! | System | Schedule | Why there |
//! |--------|----------|-----------|
//! | `load_sim_config`, `load_tier_catalog` | Startup | Load-time data, before anything simulates |
//! | `check_config` | Startup | Safety-range warnings for overridden constants |
//! | `launch_fire_system` | Update | Fires must be live before the physics step |
//! | `well_attraction_system` | Update | Writes `ExternalForce` read by Rapier's step |
//! | `staged_respawn_system` | Update | Pure timer work |
//! | `merge_resolution_system` | PostUpdate | Needs the contact events Rapier wrote this step |
//! | `wake_sleeping_units_system` | PostUpdate, after merges | A claimed unit must stay `Merging` |
//! | `score_award_system` | PostUpdate, after merges | Folds the step's awards |
//! | `clear_all_units_system` | PostUpdate | Board reset |
//!
//! `CollisionEvent` itself is registered by `RapierPhysicsPlugin`; headless
//! tests that skip Rapier add it with `app.add_message::<CollisionEvent>()`
//! and write synthetic pairs.

use crate::config::{load_sim_config, SimConfig};
use crate::error::{validate_damp_radius, validate_gravity_const, validate_max_force};
use crate::launch::{launch_fire_system, FireRequest};
use crate::merge::{merge_resolution_system, MergeCompleted};
use crate::registry::{
    clear_all_units_system, staged_respawn_system, ClearAllUnits, RespawnTimer, UnitRegistry,
};
use crate::scoring::{score_award_system, Score, ScoreAwarded};
use crate::tier::{load_tier_catalog, TierCatalog};
use crate::unit::UnitIdAllocator;
use crate::well::{wake_sleeping_units_system, well_attraction_system};
use bevy::prelude::*;

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimConfig>()
            .init_resource::<TierCatalog>()
            .init_resource::<UnitIdAllocator>()
            .init_resource::<UnitRegistry>()
            .init_resource::<RespawnTimer>()
            .init_resource::<Score>()
            .add_message::<FireRequest>()
            .add_message::<MergeCompleted>()
            .add_message::<ScoreAwarded>()
            .add_message::<ClearAllUnits>()
            .add_systems(
                Startup,
                (load_sim_config, load_tier_catalog, check_config).chain(),
            )
            .add_systems(
                Update,
                (
                    launch_fire_system,
                    well_attraction_system,
                    staged_respawn_system,
                )
                    .chain(),
            )
            .add_systems(
                PostUpdate,
                (
                    merge_resolution_system,
                    wake_sleeping_units_system,
                    score_award_system,
                    clear_all_units_system,
                )
                    .chain(),
            );
    }
}

/// Warn about config overrides outside their tested safe ranges.
///
/// Runs once after the TOML load.  These are warnings, not errors — a tuner
/// experimenting beyond the tested envelope gets told, not blocked.  The tier
/// catalog, by contrast, is validated fatally in `load_tier_catalog`.
fn check_config(config: Res<SimConfig>) {
    if let Err(e) = validate_gravity_const(config.gravity_const) {
        warn!("{e}");
    }
    if let Err(e) = validate_damp_radius(config.damp_radius, config.sleep_radius) {
        warn!("{e}");
    }
    if let Err(e) = validate_max_force(config.max_force) {
        warn!("{e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_registers_resources_and_messages() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(SimulationPlugin);
        app.add_message::<bevy_rapier2d::prelude::CollisionEvent>();
        app.update();

        assert!(app.world().contains_resource::<SimConfig>());
        assert!(app.world().contains_resource::<TierCatalog>());
        assert!(app.world().contains_resource::<Score>());
        assert!(app.world().contains_resource::<UnitRegistry>());
    }
}
