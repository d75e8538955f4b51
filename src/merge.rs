//! Merge resolution: fuse two same-tier units into one unit of the next tier.
//!
//! Rapier reports each physical contact as one unordered *pair* event, and
//! several unrelated pairs may land in the same step.  Resolution therefore
//! has to guarantee exactly one merge per pair even when a third unit
//! collides with one of the participants in the same batch.  The guarantees
//! come from two rules applied inside a single synchronous pass:
//!
//! 1. the pair is normalized by [`crate::unit::UnitId`] — the lower id is the
//!    proceeding side, so any event ordering produces the same outcome;
//! 2. both participants are moved to `UnitState::Merging` *before* any other
//!    side effect, and every later event touching either unit sees that state
//!    and aborts.
//!
//! The merged unit inherits the pair midpoint and the plain average of the
//! two velocities.  This is deliberately not mass-weighted momentum
//! conservation; the averaged value is the defined gameplay behavior.

use crate::config::SimConfig;
use crate::registry::UnitRegistry;
use crate::scoring::ScoreAwarded;
use crate::tier::TierCatalog;
use crate::unit::{
    spawn_airborne_unit, AttractedBy, Unit, UnitId, UnitIdAllocator, UnitState, UnitTier,
};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Emitted once per completed merge, after both source units are queued for
/// despawn.  Audio/visual collaborators key off `consumed_tier`.
#[derive(Message, Debug, Clone, Copy)]
pub struct MergeCompleted {
    /// Tier of the two consumed units.
    pub consumed_tier: u32,
    /// Tier of the replacement, `None` when the terminal tier merged away.
    pub next_tier: Option<u32>,
    /// Replacement entity, `None` for a terminal-tier sink.
    pub spawned: Option<Entity>,
    /// Midpoint the replacement appeared at.
    pub position: Vec2,
}

/// Resolve merge-eligible collision pairs for this step.
///
/// Runs in `PostUpdate`, after Rapier has written the step's contact events.
/// All rejections are silent no-ops: wrong category, tier mismatch, a unit
/// already claimed, or a participant that is still `Idle`.
#[allow(clippy::too_many_arguments)]
pub fn merge_resolution_system(
    mut commands: Commands,
    mut collision_events: MessageReader<CollisionEvent>,
    mut q_units: Query<
        (
            &UnitId,
            &UnitTier,
            &Transform,
            &Velocity,
            &AttractedBy,
            &mut UnitState,
        ),
        With<Unit>,
    >,
    catalog: Res<TierCatalog>,
    config: Res<SimConfig>,
    mut allocator: ResMut<UnitIdAllocator>,
    mut registry: ResMut<UnitRegistry>,
    mut merges: MessageWriter<MergeCompleted>,
    mut scores: MessageWriter<ScoreAwarded>,
) {
    for event in collision_events.read() {
        let (e1, e2) = match event {
            CollisionEvent::Started(e1, e2, _) => (*e1, *e2),
            CollisionEvent::Stopped(..) => continue,
        };

        // Both participants must be live units; anything else (a wall, an
        // already-despawned entity) makes the pair ineligible.
        let Ok([a, b]) = q_units.get_many_mut([e1, e2]) else {
            continue;
        };
        let (id_a, tier_a, tf_a, vel_a, well_a, mut state_a) = a;
        let (id_b, tier_b, tf_b, vel_b, well_b, mut state_b) = b;

        if tier_a.0 != tier_b.0 {
            continue;
        }
        // Only launched units (airborne or resting at the well) can fuse.  An
        // already-merging unit means a claim on this pair, or on one of the
        // participants with a third party, happened earlier in this pass.
        let fusable = |s: UnitState| matches!(s, UnitState::Airborne | UnitState::Sleeping);
        if !fusable(*state_a) || !fusable(*state_b) {
            continue;
        }

        // Normalize the pair: the lower UnitId is the proceeding side.  The
        // merged unit registers with the proceeding side's well, so the
        // outcome is identical however the event ordered the pair.
        let (low_well, high_entity, low_entity) = if id_a < id_b {
            (well_a, e2, e1)
        } else {
            (well_b, e1, e2)
        };

        // Claim both before any other side effect.
        *state_a = UnitState::Merging;
        *state_b = UnitState::Merging;

        let tier = tier_a.0;
        let merge_pos = (tf_a.translation.truncate() + tf_b.translation.truncate()) / 2.0;
        let merge_vel = (vel_a.linvel + vel_b.linvel) / 2.0;
        let well = low_well.0;

        commands.entity(low_entity).despawn();
        commands.entity(high_entity).despawn();
        registry.record_despawn(tier);
        registry.record_despawn(tier);

        let next_tier = catalog.next_tier(tier);
        let spawned = match next_tier {
            Some(next) => spawn_airborne_unit(
                &mut commands,
                &catalog,
                &mut allocator,
                &mut registry,
                &config,
                next,
                merge_pos,
                merge_vel,
                well,
            )
            .ok(),
            // Terminal tier: the pair is permanently removed.
            None => None,
        };

        registry.merges_total += 1;
        if let Ok(template) = catalog.template(tier) {
            scores.write(ScoreAwarded {
                amount: template.score_value,
            });
        }
        merges.write(MergeCompleted {
            consumed_tier: tier,
            next_tier,
            spawned,
            position: merge_pos,
        });
        info!(
            "merged tier {tier} pair at {merge_pos} → {}",
            match next_tier {
                Some(n) => format!("tier {n}"),
                None => "terminal sink".to_string(),
            }
        );
    }
}
