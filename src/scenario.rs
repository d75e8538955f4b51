//! Scripted headless scenarios for the simulation binary.
//!
//! Each scenario spawns a well plus a starting cast of units, then lets the
//! physics run for a bounded number of frames while a driver system plays
//! any scripted inputs (fires).  Selected via the `WELL_SIM_SCENARIO`
//! environment variable in `main.rs`.

use crate::config::SimConfig;
use crate::launch::FireRequest;
use crate::registry::UnitRegistry;
use crate::scoring::Score;
use crate::tier::TierCatalog;
use crate::unit::{spawn_airborne_unit, spawn_staged_unit, Unit, UnitIdAllocator, UnitState};
use crate::well::{spawn_well, GravityWell};
use bevy::app::AppExit;
use bevy::prelude::*;

/// Scenario bookkeeping: which script is running and how long it may run.
#[derive(Resource)]
pub struct ScenarioState {
    pub name: String,
    pub frame_limit: u32,
    pub frame_count: u32,
}

impl ScenarioState {
    pub fn new(name: &str) -> Self {
        let frame_limit = match name {
            "settle" => 900,
            _ => 600,
        };
        Self {
            name: name.to_string(),
            frame_limit,
            frame_count: 0,
        }
    }
}

/// Two tier-1 units on a collision course above the well: they merge, and the
/// tier-2 result falls in and settles.
pub fn spawn_scenario_merge_chain(
    mut commands: Commands,
    config: Res<SimConfig>,
    catalog: Res<TierCatalog>,
    mut allocator: ResMut<UnitIdAllocator>,
    mut registry: ResMut<UnitRegistry>,
) {
    let well = spawn_well(&mut commands, &config, Vec2::ZERO);
    let pair = [
        (Vec2::new(-2.0, 0.0), Vec2::new(1.0, 0.0)),
        (Vec2::new(2.0, 0.0), Vec2::new(-1.0, 0.0)),
    ];
    for (position, velocity) in pair {
        if let Err(e) = spawn_airborne_unit(
            &mut commands,
            &catalog,
            &mut allocator,
            &mut registry,
            &config,
            1,
            position,
            velocity,
            well,
        ) {
            warn!("scenario spawn failed: {e}");
        }
    }
    println!("✓ Spawned scenario: two tier-1 units on a collision course");
}

/// A single unit released at distance with no velocity: it must fall in,
/// damp out, and go to sleep.
pub fn spawn_scenario_settle(
    mut commands: Commands,
    config: Res<SimConfig>,
    catalog: Res<TierCatalog>,
    mut allocator: ResMut<UnitIdAllocator>,
    mut registry: ResMut<UnitRegistry>,
) {
    let well = spawn_well(&mut commands, &config, Vec2::ZERO);
    if let Err(e) = spawn_airborne_unit(
        &mut commands,
        &catalog,
        &mut allocator,
        &mut registry,
        &config,
        1,
        Vec2::new(6.0, 0.0),
        Vec2::ZERO,
        well,
    ) {
        warn!("scenario spawn failed: {e}");
    }
    println!("✓ Spawned scenario: single unit falling to rest");
}

/// Two terminal-tier units converging: the merge consumes both and spawns
/// nothing, leaving an empty board with the score awarded.
pub fn spawn_scenario_terminal_sink(
    mut commands: Commands,
    config: Res<SimConfig>,
    catalog: Res<TierCatalog>,
    mut allocator: ResMut<UnitIdAllocator>,
    mut registry: ResMut<UnitRegistry>,
) {
    let well = spawn_well(&mut commands, &config, Vec2::ZERO);
    let top = catalog.final_tier();
    let pair = [
        (Vec2::new(-1.5, 0.0), Vec2::new(0.8, 0.0)),
        (Vec2::new(1.5, 0.0), Vec2::new(-0.8, 0.0)),
    ];
    for (position, velocity) in pair {
        if let Err(e) = spawn_airborne_unit(
            &mut commands,
            &catalog,
            &mut allocator,
            &mut registry,
            &config,
            top,
            position,
            velocity,
            well,
        ) {
            warn!("scenario spawn failed: {e}");
        }
    }
    println!("✓ Spawned scenario: terminal-tier pair (the max-tier sink)");
}

/// One staged unit at the staging point; the driver fires it toward the well
/// a few frames in, exercising the full launch path.
pub fn spawn_scenario_staged_fire(
    mut commands: Commands,
    config: Res<SimConfig>,
    catalog: Res<TierCatalog>,
    mut allocator: ResMut<UnitIdAllocator>,
    mut registry: ResMut<UnitRegistry>,
) {
    spawn_well(&mut commands, &config, Vec2::ZERO);
    if let Err(e) = spawn_staged_unit(
        &mut commands,
        &catalog,
        &mut allocator,
        &mut registry,
        &config,
        1,
        config.staging_point(),
    ) {
        warn!("scenario spawn failed: {e}");
    }
    println!("✓ Spawned scenario: staged unit awaiting fire");
}

/// Fire every still-staged unit toward the well on frame 10 of the
/// `staged_fire` scenario.
pub fn scenario_fire_driver_system(
    scenario: Res<ScenarioState>,
    config: Res<SimConfig>,
    q_units: Query<(Entity, &Transform, &UnitState), With<Unit>>,
    q_well: Query<&Transform, With<GravityWell>>,
    mut fires: MessageWriter<FireRequest>,
) {
    if scenario.name != "staged_fire" || scenario.frame_count != 10 {
        return;
    }
    let Ok(well_transform) = q_well.single() else {
        return;
    };
    let center = well_transform.translation.truncate();

    for (entity, transform, state) in q_units.iter() {
        if *state != UnitState::Idle {
            continue;
        }
        let dir = (center - transform.translation.truncate()).normalize_or_zero();
        fires.write(FireRequest {
            unit: entity,
            impulse: dir * config.max_impulse(),
        });
    }
}

/// Advance the frame counter, log progress, and exit at the frame limit.
pub fn scenario_frame_system(
    mut scenario: ResMut<ScenarioState>,
    registry: Res<UnitRegistry>,
    score: Res<Score>,
    mut exit: MessageWriter<AppExit>,
) {
    scenario.frame_count += 1;

    if scenario.frame_count % 120 == 0 {
        info!(
            "[{}] frame {}: live={} merges={} score={}",
            scenario.name,
            scenario.frame_count,
            registry.total_live(),
            registry.merges_total,
            score.total
        );
    }

    if scenario.frame_count >= scenario.frame_limit {
        println!(
            "✓ Scenario '{}' finished after {} frames: live={} merges={} score={}",
            scenario.name,
            scenario.frame_count,
            registry.total_live(),
            registry.merges_total,
            score.total
        );
        exit.write(AppExit::Success);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_scenario_gets_a_longer_frame_budget() {
        assert!(ScenarioState::new("settle").frame_limit > ScenarioState::new("merge_chain").frame_limit);
    }

    #[test]
    fn frame_counter_starts_at_zero() {
        assert_eq!(ScenarioState::new("merge_chain").frame_count, 0);
    }
}
