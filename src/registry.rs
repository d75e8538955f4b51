//! Unit registry: live-set bookkeeping, staged respawn, and the reset path.
//!
//! The ECS world owns the unit entities themselves; this module owns the
//! counters layered over them (per-tier live counts, lifetime totals) and the
//! two registry-level operations the simulation needs: respawning a staged
//! unit after a fire, and clearing the board.
//!
//! Looking up the live set is a query (`Query<.., With<Unit>>`), not a
//! registry call — systems iterate it directly.

use crate::config::SimConfig;
use crate::scoring::Score;
use crate::tier::TierCatalog;
use crate::unit::{spawn_staged_unit, Unit, UnitIdAllocator, UnitTier};
use bevy::prelude::*;
use std::collections::BTreeMap;

/// Live-set counters.  Updated by the spawn helpers and the despawn paths;
/// never authoritative over the ECS world, only over the numbers.
#[derive(Resource, Debug, Default)]
pub struct UnitRegistry {
    /// Live unit count per tier index.
    counts: BTreeMap<u32, u32>,
    /// Units ever spawned.
    pub spawned_total: u64,
    /// Units ever despawned (merged away or cleared).
    pub despawned_total: u64,
    /// Completed merges.
    pub merges_total: u64,
}

impl UnitRegistry {
    pub fn record_spawn(&mut self, tier: u32) {
        *self.counts.entry(tier).or_insert(0) += 1;
        self.spawned_total += 1;
    }

    pub fn record_despawn(&mut self, tier: u32) {
        if let Some(count) = self.counts.get_mut(&tier) {
            *count = count.saturating_sub(1);
        }
        self.despawned_total += 1;
    }

    /// Live units of one tier.
    pub fn count(&self, tier: u32) -> u32 {
        self.counts.get(&tier).copied().unwrap_or(0)
    }

    /// Live units across all tiers.
    pub fn total_live(&self) -> u32 {
        self.counts.values().sum()
    }

    /// Drop all per-tier counts; lifetime totals are preserved.
    pub fn reset_counts(&mut self) {
        self.counts.clear();
    }
}

/// Countdown to the next staged unit.  Armed by the launch system after each
/// successful fire; `None` while no respawn is pending.
#[derive(Resource, Debug, Default)]
pub struct RespawnTimer {
    pub remaining: Option<f32>,
}

/// Clears the board: despawns every unit, zeroes the counters and the score.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ClearAllUnits;

/// Tick the respawn countdown and spawn the next staged unit when it expires.
///
/// The tier is rolled from the lower half of the catalog so fresh units are
/// always low-tier material for the merge chain.
pub fn staged_respawn_system(
    mut commands: Commands,
    time: Res<Time>,
    mut timer: ResMut<RespawnTimer>,
    catalog: Res<TierCatalog>,
    config: Res<SimConfig>,
    mut allocator: ResMut<UnitIdAllocator>,
    mut registry: ResMut<UnitRegistry>,
) {
    let Some(remaining) = timer.remaining else {
        return;
    };
    let remaining = remaining - time.delta_secs();
    if remaining > 0.0 {
        timer.remaining = Some(remaining);
        return;
    }
    timer.remaining = None;

    let tier = catalog.roll_staged_tier(&mut rand::thread_rng());
    if let Err(e) = spawn_staged_unit(
        &mut commands,
        &catalog,
        &mut allocator,
        &mut registry,
        &config,
        tier,
        config.staging_point(),
    ) {
        warn!("staged respawn failed: {e}");
    }
}

/// Handle [`ClearAllUnits`]: despawn every unit and reset counters and score.
pub fn clear_all_units_system(
    mut commands: Commands,
    mut requests: MessageReader<ClearAllUnits>,
    q_units: Query<(Entity, &UnitTier), With<Unit>>,
    mut registry: ResMut<UnitRegistry>,
    mut score: ResMut<Score>,
    mut timer: ResMut<RespawnTimer>,
) {
    if requests.is_empty() {
        return;
    }
    requests.clear();

    let mut cleared = 0u32;
    for (entity, tier) in q_units.iter() {
        commands.entity(entity).despawn();
        registry.record_despawn(tier.0);
        cleared += 1;
    }
    registry.reset_counts();
    score.reset();
    timer.remaining = None;
    info!("cleared {cleared} units");
}
