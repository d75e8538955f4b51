//! Unit components and spawn helpers.
//!
//! A unit is one circular body in the well: a tier reference, a lifecycle
//! state, and the Rapier component set that makes it a dynamic rigid body.
//! Position, velocity and integration belong to Rapier; this crate reads them
//! and contributes forces and impulses.

use crate::config::SimConfig;
use crate::error::SimResult;
use crate::registry::UnitRegistry;
use crate::tier::TierCatalog;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Marker component for every unit entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unit;

/// Tier index of this unit, resolved against the [`TierCatalog`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitTier(pub u32);

/// Lifecycle state machine.
///
/// `Idle → Airborne → {Sleeping ⇄ Airborne} → Merging`.  `Idle` is left
/// exactly once (the fire operation) and `Merging` is terminal — the unit is
/// being torn down and no system may act on it again.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitState {
    /// Staged, never launched: exempt from gravity and merging, colliders
    /// disabled so it cannot interfere while waiting.
    Idle,
    /// Launched and live: attracted by its well, eligible to merge.
    Airborne,
    /// Settled at the well: receives no force until an external impulse
    /// wakes it.  Still eligible to merge.
    Sleeping,
    /// Claimed by a merge; despawn is already queued.
    Merging,
}

/// Stable per-unit identity used **only** for the merge tie-break.
///
/// Allocated from a monotonic counter so the total order is deterministic
/// across runs, which Bevy's generational `Entity` ids are not.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(pub u64);

/// Counts consecutive settled frames; drives the `Airborne → Sleeping`
/// transition.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct SleepFrames(pub u32);

/// Registers a unit with the gravity well that attracts it.  Present on every
/// `Airborne` or `Sleeping` unit, absent while `Idle`.
#[derive(Component, Debug, Clone, Copy)]
pub struct AttractedBy(pub Entity);

/// Hands out [`UnitId`]s in spawn order.
#[derive(Resource, Debug, Default)]
pub struct UnitIdAllocator {
    next: u64,
}

impl UnitIdAllocator {
    pub fn allocate(&mut self) -> UnitId {
        let id = UnitId(self.next);
        self.next += 1;
        id
    }
}

// ── Collision groups ──────────────────────────────────────────────────────────

/// Groups for a live (fired) unit: member of the unit layer, collides with
/// other units.
pub fn live_collision_groups() -> CollisionGroups {
    CollisionGroups::new(Group::GROUP_1, Group::GROUP_1)
}

/// Groups for a staged (Idle) unit: member of nothing, collides with nothing.
/// The fire operation swaps in [`live_collision_groups`].
pub fn staged_collision_groups() -> CollisionGroups {
    CollisionGroups::new(Group::NONE, Group::NONE)
}

// ── Spawn helpers ─────────────────────────────────────────────────────────────

/// Spawn a staged `Idle` unit of `tier` at `position`.
///
/// The unit has its full physics component set but empty collision groups and
/// no well registration; it becomes a live body only when fired.
pub fn spawn_staged_unit(
    commands: &mut Commands,
    catalog: &TierCatalog,
    allocator: &mut UnitIdAllocator,
    registry: &mut UnitRegistry,
    config: &SimConfig,
    tier: u32,
    position: Vec2,
) -> SimResult<Entity> {
    let template = catalog.template(tier)?;
    let entity = commands
        .spawn((
            (
                Unit,
                UnitTier(tier),
                UnitState::Idle,
                allocator.allocate(),
                SleepFrames(0),
                Transform::from_translation(position.extend(0.0)),
                RigidBody::Dynamic,
            ),
            (
                Collider::ball(config.base_unit_radius * template.scale),
                ColliderMassProperties::Mass(template.mass),
                Restitution::coefficient(config.unit_restitution),
                Friction::coefficient(config.unit_friction),
                Velocity::zero(),
                Damping {
                    linear_damping: 0.0,
                    angular_damping: 0.0,
                },
                ExternalForce {
                    force: Vec2::ZERO,
                    torque: 0.0,
                },
                ExternalImpulse::default(),
                staged_collision_groups(),
                ActiveEvents::COLLISION_EVENTS,
                Sleeping::disabled(),
            ),
        ))
        .id();
    registry.record_spawn(tier);
    info!("spawned staged {} (tier {tier}) at {position}", template.name);
    Ok(entity)
}

/// Spawn a unit born already fired — the replacement a merge produces.
///
/// It starts `Airborne` with the inherited velocity, live collision groups,
/// and a well registration, bypassing the launch path entirely.
#[allow(clippy::too_many_arguments)]
pub fn spawn_airborne_unit(
    commands: &mut Commands,
    catalog: &TierCatalog,
    allocator: &mut UnitIdAllocator,
    registry: &mut UnitRegistry,
    config: &SimConfig,
    tier: u32,
    position: Vec2,
    velocity: Vec2,
    well: Entity,
) -> SimResult<Entity> {
    let template = catalog.template(tier)?;
    let entity = commands
        .spawn((
            (
                Unit,
                UnitTier(tier),
                UnitState::Airborne,
                allocator.allocate(),
                SleepFrames(0),
                AttractedBy(well),
                Transform::from_translation(position.extend(0.0)),
                RigidBody::Dynamic,
            ),
            (
                Collider::ball(config.base_unit_radius * template.scale),
                ColliderMassProperties::Mass(template.mass),
                Restitution::coefficient(config.unit_restitution),
                Friction::coefficient(config.unit_friction),
                Velocity {
                    linvel: velocity,
                    angvel: 0.0,
                },
                Damping {
                    linear_damping: 0.0,
                    angular_damping: 0.0,
                },
                ExternalForce {
                    force: Vec2::ZERO,
                    torque: 0.0,
                },
                ExternalImpulse::default(),
                live_collision_groups(),
                ActiveEvents::COLLISION_EVENTS,
                Sleeping::disabled(),
            ),
        ))
        .id();
    registry.record_spawn(tier);
    Ok(entity)
}
