//! Gravity well: per-step stabilizing attraction and the sleep lifecycle.
//!
//! Naive inverse-square gravity alone makes units orbit or bounce forever
//! near the center.  The well therefore layers three stabilizers over the
//! pull: a blended radial/tangential damping zone, a micro-bounce kill just
//! inside the boundary, and a hard sleep exit once a unit has been still for
//! long enough.  Sleeping units receive zero force until an external
//! collision wakes them.
//!
//! Force is contributed through Rapier's `ExternalForce` (continuous, applied
//! by the integrator over the step), never as a velocity write — except for
//! the bounce-kill and the epsilon snap, which the algorithm defines as
//! direct velocity edits.

use crate::config::SimConfig;
use crate::tier::TierCatalog;
use crate::unit::{AttractedBy, SleepFrames, Unit, UnitState, UnitTier};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// The central attractor.  One per scene in normal play; every `Airborne` or
/// `Sleeping` unit is registered to exactly one well via
/// [`crate::unit::AttractedBy`].
///
/// Sign convention used throughout: the radial axis points **outward** (from
/// the well center toward the unit), so a positive radial velocity is a
/// rebound away from the center.
#[derive(Component, Debug, Clone)]
pub struct GravityWell {
    pub gravity_const: f32,
    pub sleep_radius: f32,
    pub sleep_speed: f32,
    pub sleep_frame_threshold: u32,
    pub damp_radius: f32,
    pub radial_damping_coef: f32,
    pub tangential_damping_coef: f32,
    pub max_force: f32,
    pub bounce_kill_radius: f32,
    pub bounce_kill_speed: f32,
    pub velocity_epsilon: f32,
}

impl GravityWell {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            gravity_const: config.gravity_const,
            sleep_radius: config.sleep_radius,
            sleep_speed: config.sleep_speed,
            sleep_frame_threshold: config.sleep_frame_threshold,
            damp_radius: config.damp_radius,
            radial_damping_coef: config.radial_damping_coef,
            tangential_damping_coef: config.tangential_damping_coef,
            max_force: config.max_force,
            bounce_kill_radius: config.bounce_kill_radius,
            bounce_kill_speed: config.bounce_kill_speed,
            velocity_epsilon: config.velocity_epsilon,
        }
    }
}

/// Spawn a well entity at `position` with parameters taken from the config.
pub fn spawn_well(commands: &mut Commands, config: &SimConfig, position: Vec2) -> Entity {
    commands
        .spawn((
            GravityWell::from_config(config),
            Transform::from_translation(position.extend(0.0)),
        ))
        .id()
}

// ── Pure per-step math ────────────────────────────────────────────────────────

/// Blend factor for the damping zone: 0 at or beyond `damp_radius`, ramping
/// linearly to 1 as the distance approaches `sleep_radius`.
pub fn damping_blend(well: &GravityWell, dist: f32) -> f32 {
    if dist >= well.damp_radius {
        return 0.0;
    }
    let span = well.damp_radius - well.sleep_radius;
    if span <= f32::EPSILON {
        return 1.0;
    }
    ((well.damp_radius - dist) / span).clamp(0.0, 1.0)
}

/// True when the unit currently qualifies as settled.
pub fn sleep_eligible(well: &GravityWell, dist: f32, speed: f32) -> bool {
    dist < well.sleep_radius && speed < well.sleep_speed
}

/// Remove a small outward rebound from `velocity`, if one is present.
///
/// `offset` is the unit's position relative to the well center.  Only
/// rebounds slower than `bounce_kill_speed` inside `bounce_kill_radius` are
/// touched; everything else passes through unchanged.
pub fn kill_micro_bounce(well: &GravityWell, offset: Vec2, velocity: Vec2) -> Vec2 {
    let dist = offset.length();
    if dist >= well.bounce_kill_radius || dist <= f32::EPSILON {
        return velocity;
    }
    let outward = offset / dist;
    let v_rad = velocity.dot(outward);
    if v_rad > 0.0 && v_rad < well.bounce_kill_speed {
        velocity - outward * v_rad
    } else {
        velocity
    }
}

/// Net stabilizing force on one unit for this step, magnitude-clamped.
///
/// `offset` is the unit's position relative to the well center.  The force is
/// the sum of the inverse-square pull (distance floored at `sleep_radius` so
/// the singularity never divides by ~zero) and the blended radial/tangential
/// damping terms.  A degenerate offset yields no directed pull.
pub fn stabilizing_force(well: &GravityWell, offset: Vec2, velocity: Vec2, mass: f32) -> Vec2 {
    let dist = offset.length();
    if dist <= f32::EPSILON {
        return Vec2::ZERO;
    }
    let outward = offset / dist;

    let safe_dist = dist.max(well.sleep_radius);
    let gravity = -outward * (well.gravity_const / (safe_dist * safe_dist)) * mass;

    let t = damping_blend(well, dist);
    let v_rad = velocity.dot(outward);
    let v_tan = velocity - outward * v_rad;
    let radial_damping = -outward * v_rad * well.radial_damping_coef * t * mass;
    let tangential_damping = -v_tan * well.tangential_damping_coef * t * mass;

    (gravity + radial_damping + tangential_damping).clamp_length_max(well.max_force)
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Per-step force pass over every unit registered to a well.
///
/// `Idle` units carry no registration and never enter the loop.  `Sleeping`
/// and `Merging` units only have any stale force cleared (`ExternalForce`
/// persists across frames in Rapier).  `Airborne` units run the full
/// stabilization step: epsilon snap, sleep counting, bounce kill, force
/// computation.
pub fn well_attraction_system(
    q_wells: Query<(&Transform, &GravityWell)>,
    catalog: Res<TierCatalog>,
    mut q_units: Query<
        (
            &AttractedBy,
            &UnitTier,
            &Transform,
            &mut Velocity,
            &mut ExternalForce,
            &mut UnitState,
            &mut SleepFrames,
        ),
        With<Unit>,
    >,
) {
    for (attracted_by, tier, transform, mut velocity, mut force, mut state, mut frames) in
        q_units.iter_mut()
    {
        force.force = Vec2::ZERO;
        force.torque = 0.0;

        if *state != UnitState::Airborne {
            continue;
        }
        // A well that despawned mid-session leaves a dangling registration;
        // the unit is skipped, not an error.
        let Ok((well_transform, well)) = q_wells.get(attracted_by.0) else {
            continue;
        };
        // Tier indices are validated at startup; a miss here means the unit
        // outlived a catalog reload and is skipped.
        let Ok(template) = catalog.template(tier.0) else {
            continue;
        };

        // Snap away sub-epsilon jitter from the previous integration step so
        // it cannot keep resetting the sleep counter.
        if velocity.linvel.length() < well.velocity_epsilon {
            velocity.linvel = Vec2::ZERO;
        }
        if velocity.angvel.abs() < well.velocity_epsilon {
            velocity.angvel = 0.0;
        }

        let offset = (transform.translation - well_transform.translation).truncate();
        let dist = offset.length();
        let speed = velocity.linvel.length();

        if sleep_eligible(well, dist, speed) {
            frames.0 += 1;
        } else {
            frames.0 = 0;
        }

        if frames.0 >= well.sleep_frame_threshold {
            velocity.linvel = Vec2::ZERO;
            velocity.angvel = 0.0;
            *state = UnitState::Sleeping;
            continue;
        }

        velocity.linvel = kill_micro_bounce(well, offset, velocity.linvel);
        force.force = stabilizing_force(well, offset, velocity.linvel, template.mass);
    }
}

/// Wake `Sleeping` units touched by a fresh collision.
///
/// Sleep is a terminal stabilization from the well's point of view; the only
/// re-entry to `Airborne` is an external impulse, which in this simulation
/// always arrives as a new contact.  Runs after merge resolution so a unit
/// claimed by a merge in the same step stays `Merging`.
pub fn wake_sleeping_units_system(
    mut collision_events: MessageReader<CollisionEvent>,
    mut q_units: Query<(&mut UnitState, &mut SleepFrames), With<Unit>>,
) {
    for event in collision_events.read() {
        let (e1, e2) = match event {
            CollisionEvent::Started(e1, e2, _) => (*e1, *e2),
            CollisionEvent::Stopped(..) => continue,
        };
        for entity in [e1, e2] {
            let Ok((mut state, mut frames)) = q_units.get_mut(entity) else {
                continue;
            };
            if *state == UnitState::Sleeping {
                *state = UnitState::Airborne;
                frames.0 = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::UnitId;

    fn test_well() -> GravityWell {
        GravityWell::from_config(&SimConfig::default())
    }

    // ── Pure math ─────────────────────────────────────────────────────────────

    #[test]
    fn gravity_magnitude_matches_inverse_square_at_distance_ten() {
        // d = 10, G = 300 → |F| = 300/100 × mass = 3 × mass, toward center.
        let well = test_well();
        let force = stabilizing_force(&well, Vec2::new(10.0, 0.0), Vec2::ZERO, 2.0);
        assert!((force.length() - 6.0).abs() < 1e-4);
        assert!(force.x < 0.0, "pull must point toward the center");
        assert!(force.y.abs() < 1e-6);
    }

    #[test]
    fn coincident_position_yields_zero_force_not_nan() {
        let well = test_well();
        let force = stabilizing_force(&well, Vec2::ZERO, Vec2::new(1.0, 0.0), 1.0);
        assert_eq!(force, Vec2::ZERO);
    }

    #[test]
    fn force_inside_sleep_radius_uses_floored_distance() {
        // At d = 0.1 the raw inverse square would be G/0.01; the floor keeps
        // it at G/sleep_radius².
        let well = test_well();
        let force = stabilizing_force(&well, Vec2::new(0.1, 0.0), Vec2::ZERO, 1.0);
        let expected = well.gravity_const / (well.sleep_radius * well.sleep_radius);
        let expected = expected.min(well.max_force);
        assert!((force.length() - expected).abs() < 1e-3);
    }

    #[test]
    fn force_magnitude_never_exceeds_clamp() {
        let mut well = test_well();
        well.gravity_const = 1e6;
        for d in [0.05_f32, 0.3, 0.61, 1.0, 2.0, 10.0] {
            let force = stabilizing_force(
                &well,
                Vec2::new(d, d * 0.5),
                Vec2::new(-3.0, 7.0),
                4.0,
            );
            assert!(
                force.length() <= well.max_force + 1e-3,
                "|F| = {} at d = {d}",
                force.length()
            );
        }
    }

    #[test]
    fn damping_blend_ramps_linearly_between_radii() {
        let well = test_well();
        assert_eq!(damping_blend(&well, well.damp_radius), 0.0);
        assert_eq!(damping_blend(&well, well.damp_radius + 5.0), 0.0);
        assert_eq!(damping_blend(&well, well.sleep_radius), 1.0);
        let mid = (well.damp_radius + well.sleep_radius) / 2.0;
        assert!((damping_blend(&well, mid) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn damping_opposes_tangential_velocity_inside_zone() {
        let well = test_well();
        // Unit at (1, 0) orbiting with purely tangential velocity (0, 2).
        let force = stabilizing_force(&well, Vec2::new(1.0, 0.0), Vec2::new(0.0, 2.0), 1.0);
        assert!(force.y < 0.0, "tangential damping must oppose +y motion");
    }

    #[test]
    fn micro_bounce_outward_component_is_removed() {
        // Inside the kill radius, drifting outward at 0.03 < 0.06: the radial
        // component goes, the tangential survives.
        let well = test_well();
        let offset = Vec2::new(0.5, 0.0);
        let velocity = Vec2::new(0.03, 0.02);
        let killed = kill_micro_bounce(&well, offset, velocity);
        assert!(killed.x.abs() < 1e-6);
        assert!((killed.y - 0.02).abs() < 1e-6);
    }

    #[test]
    fn fast_rebound_is_left_to_the_damping_forces() {
        let well = test_well();
        let velocity = Vec2::new(0.2, 0.0);
        let killed = kill_micro_bounce(&well, Vec2::new(0.5, 0.0), velocity);
        assert_eq!(killed, velocity);
    }

    #[test]
    fn inward_motion_is_never_bounce_killed() {
        let well = test_well();
        let velocity = Vec2::new(-0.03, 0.0);
        let killed = kill_micro_bounce(&well, Vec2::new(0.5, 0.0), velocity);
        assert_eq!(killed, velocity);
    }

    #[test]
    fn bounce_kill_outside_radius_is_inert() {
        let well = test_well();
        let velocity = Vec2::new(0.03, 0.0);
        let killed = kill_micro_bounce(&well, Vec2::new(2.0, 0.0), velocity);
        assert_eq!(killed, velocity);
    }

    // ── System behaviour (headless app, no Rapier plugin) ────────────────────

    fn well_test_app() -> (App, Entity) {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TierCatalog::default());
        app.add_systems(Update, well_attraction_system);
        let config = SimConfig::default();
        let well = app
            .world_mut()
            .spawn((
                GravityWell::from_config(&config),
                Transform::from_translation(Vec3::ZERO),
            ))
            .id();
        app.insert_resource(config);
        (app, well)
    }

    fn spawn_test_unit(
        app: &mut App,
        well: Entity,
        state: UnitState,
        position: Vec2,
        velocity: Vec2,
    ) -> Entity {
        app.world_mut()
            .spawn((
                Unit,
                UnitTier(1),
                UnitId(0),
                state,
                SleepFrames(0),
                AttractedBy(well),
                Transform::from_translation(position.extend(0.0)),
                Velocity {
                    linvel: velocity,
                    angvel: 0.0,
                },
                ExternalForce::default(),
            ))
            .id()
    }

    #[test]
    fn airborne_unit_receives_the_scenario_force() {
        let (mut app, well) = well_test_app();
        let unit = spawn_test_unit(
            &mut app,
            well,
            UnitState::Airborne,
            Vec2::new(10.0, 0.0),
            Vec2::ZERO,
        );
        app.update();

        let force = app.world().get::<ExternalForce>(unit).unwrap();
        // Tier 1 mass is 1.0 → |F| ≈ 3.0 toward the origin.
        assert!((force.force.length() - 3.0).abs() < 1e-3);
        assert!(force.force.x < 0.0);
    }

    #[test]
    fn idle_and_merging_units_receive_no_force() {
        let (mut app, well) = well_test_app();
        let idle = spawn_test_unit(
            &mut app,
            well,
            UnitState::Idle,
            Vec2::new(5.0, 0.0),
            Vec2::ZERO,
        );
        let merging = spawn_test_unit(
            &mut app,
            well,
            UnitState::Merging,
            Vec2::new(5.0, 0.0),
            Vec2::ZERO,
        );
        app.update();

        assert_eq!(app.world().get::<ExternalForce>(idle).unwrap().force, Vec2::ZERO);
        assert_eq!(
            app.world().get::<ExternalForce>(merging).unwrap().force,
            Vec2::ZERO
        );
    }

    #[test]
    fn settled_unit_sleeps_after_threshold_and_feels_nothing() {
        let (mut app, well) = well_test_app();
        let threshold = SimConfig::default().sleep_frame_threshold;
        // Inside the sleep radius, slower than the sleep speed.
        let unit = spawn_test_unit(
            &mut app,
            well,
            UnitState::Airborne,
            Vec2::new(0.3, 0.0),
            Vec2::new(0.01, 0.0),
        );

        for _ in 0..threshold {
            app.update();
        }

        assert_eq!(
            *app.world().get::<UnitState>(unit).unwrap(),
            UnitState::Sleeping
        );
        assert_eq!(
            app.world().get::<Velocity>(unit).unwrap().linvel,
            Vec2::ZERO
        );

        // Further steps must leave it untouched.
        app.update();
        assert_eq!(
            app.world().get::<ExternalForce>(unit).unwrap().force,
            Vec2::ZERO
        );
    }

    #[test]
    fn fast_unit_inside_radius_resets_the_sleep_counter() {
        let (mut app, well) = well_test_app();
        let unit = spawn_test_unit(
            &mut app,
            well,
            UnitState::Airborne,
            Vec2::new(0.3, 0.0),
            // Faster than sleep_speed: never eligible.
            Vec2::new(1.0, 0.0),
        );

        for _ in 0..(SimConfig::default().sleep_frame_threshold + 10) {
            app.update();
        }

        assert_eq!(
            *app.world().get::<UnitState>(unit).unwrap(),
            UnitState::Airborne
        );
        assert_eq!(app.world().get::<SleepFrames>(unit).unwrap().0, 0);
    }

    #[test]
    fn dangling_well_reference_is_skipped() {
        let (mut app, well) = well_test_app();
        let unit = spawn_test_unit(
            &mut app,
            well,
            UnitState::Airborne,
            Vec2::new(5.0, 0.0),
            Vec2::ZERO,
        );
        app.world_mut().entity_mut(well).despawn();
        app.update();

        // No panic, no force.
        assert_eq!(
            app.world().get::<ExternalForce>(unit).unwrap().force,
            Vec2::ZERO
        );
    }

    #[test]
    fn collision_wakes_a_sleeping_unit() {
        let (mut app, well) = well_test_app();
        app.add_message::<CollisionEvent>();
        app.add_systems(PostUpdate, wake_sleeping_units_system);

        let sleeper = spawn_test_unit(
            &mut app,
            well,
            UnitState::Sleeping,
            Vec2::new(0.3, 0.0),
            Vec2::ZERO,
        );
        let other = spawn_test_unit(
            &mut app,
            well,
            UnitState::Airborne,
            Vec2::new(0.4, 0.0),
            Vec2::ZERO,
        );

        app.world_mut().write_message(CollisionEvent::Started(
            sleeper,
            other,
            bevy_rapier2d::rapier::geometry::CollisionEventFlags::empty(),
        ));
        app.update();

        assert_eq!(
            *app.world().get::<UnitState>(sleeper).unwrap(),
            UnitState::Airborne
        );
    }
}
