//! Launch interface: the single `fire` operation the input layer calls.
//!
//! Whatever produces the gesture (drag, tap, script) is outside this crate;
//! it hands the core a [`FireRequest`] and the core does the rest: the
//! one-way `Idle → Airborne` transition, collision-group activation, well
//! registration, and the impulse itself.
//!
//! The impulse is applied through Rapier's `ExternalImpulse` (an
//! instantaneous velocity change scaled by mass), matching the original
//! impulse-mode launch rather than the continuous-force variant.

use crate::config::SimConfig;
use crate::registry::RespawnTimer;
use crate::unit::{live_collision_groups, AttractedBy, SleepFrames, Unit, UnitState};
use crate::well::GravityWell;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Fire a staged unit with the given impulse vector.
#[derive(Message, Debug, Clone, Copy)]
pub struct FireRequest {
    pub unit: Entity,
    pub impulse: Vec2,
}

/// Consume the step's [`FireRequest`]s.
///
/// A request for a missing entity or a unit that has already left `Idle` is a
/// silent no-op — firing happens exactly once per unit.  The impulse
/// magnitude is clamped to `max_power × power_coef` so scripted callers
/// cannot exceed what a full-strength drag produces.
pub fn launch_fire_system(
    mut commands: Commands,
    mut requests: MessageReader<FireRequest>,
    q_wells: Query<Entity, With<GravityWell>>,
    mut q_units: Query<
        (
            &mut UnitState,
            &mut ExternalImpulse,
            &mut CollisionGroups,
            &mut SleepFrames,
        ),
        With<Unit>,
    >,
    config: Res<SimConfig>,
    mut respawn: ResMut<RespawnTimer>,
) {
    for request in requests.read() {
        let Ok(well) = q_wells.single() else {
            warn!("fire request dropped: no gravity well in scene");
            return;
        };
        let Ok((mut state, mut impulse, mut groups, mut frames)) = q_units.get_mut(request.unit)
        else {
            continue;
        };
        if *state != UnitState::Idle {
            continue;
        }

        *state = UnitState::Airborne;
        frames.0 = 0;
        *groups = live_collision_groups();
        impulse.impulse += request.impulse.clamp_length_max(config.max_impulse());
        commands.entity(request.unit).insert(AttractedBy(well));
        respawn.remaining = Some(config.respawn_delay_secs);

        info!("fired unit {:?} with impulse {}", request.unit, request.impulse);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{staged_collision_groups, UnitId, UnitTier};

    fn launch_test_app(with_well: bool) -> (App, Option<Entity>) {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_message::<FireRequest>();
        app.insert_resource(SimConfig::default());
        app.insert_resource(RespawnTimer::default());
        app.add_systems(Update, launch_fire_system);
        let well = with_well.then(|| {
            let config = SimConfig::default();
            app.world_mut()
                .spawn((
                    GravityWell::from_config(&config),
                    Transform::from_translation(Vec3::ZERO),
                ))
                .id()
        });
        (app, well)
    }

    fn spawn_staged(app: &mut App) -> Entity {
        app.world_mut()
            .spawn((
                Unit,
                UnitTier(1),
                UnitId(0),
                UnitState::Idle,
                SleepFrames(0),
                Transform::from_translation(Vec3::new(3.5, 0.0, 0.0)),
                Velocity::zero(),
                ExternalImpulse::default(),
                staged_collision_groups(),
            ))
            .id()
    }

    #[test]
    fn fire_transitions_idle_to_airborne_exactly_once() {
        let (mut app, well) = launch_test_app(true);
        let unit = spawn_staged(&mut app);

        app.world_mut().write_message(FireRequest {
            unit,
            impulse: Vec2::new(-2.0, 0.5),
        });
        app.update();

        assert_eq!(
            *app.world().get::<UnitState>(unit).unwrap(),
            UnitState::Airborne
        );
        assert_eq!(
            app.world().get::<AttractedBy>(unit).unwrap().0,
            well.unwrap()
        );
        assert_eq!(
            app.world().get::<ExternalImpulse>(unit).unwrap().impulse,
            Vec2::new(-2.0, 0.5)
        );
        assert_eq!(
            *app.world().get::<CollisionGroups>(unit).unwrap(),
            live_collision_groups()
        );
        assert!(app.world().resource::<RespawnTimer>().remaining.is_some());
    }

    #[test]
    fn second_fire_on_the_same_unit_is_a_no_op() {
        let (mut app, _) = launch_test_app(true);
        let unit = spawn_staged(&mut app);

        app.world_mut().write_message(FireRequest {
            unit,
            impulse: Vec2::new(1.0, 0.0),
        });
        app.update();
        // Rapier would have consumed the impulse after integration.
        app.world_mut()
            .get_mut::<ExternalImpulse>(unit)
            .unwrap()
            .impulse = Vec2::ZERO;

        app.world_mut().write_message(FireRequest {
            unit,
            impulse: Vec2::new(5.0, 5.0),
        });
        app.update();

        assert_eq!(
            app.world().get::<ExternalImpulse>(unit).unwrap().impulse,
            Vec2::ZERO,
            "a unit can only be fired once"
        );
    }

    #[test]
    fn impulse_magnitude_is_clamped_to_full_drag_strength() {
        let (mut app, _) = launch_test_app(true);
        let unit = spawn_staged(&mut app);
        let max = SimConfig::default().max_impulse();

        app.world_mut().write_message(FireRequest {
            unit,
            impulse: Vec2::new(1000.0, 0.0),
        });
        app.update();

        let applied = app.world().get::<ExternalImpulse>(unit).unwrap().impulse;
        assert!((applied.length() - max).abs() < 1e-4);
    }

    #[test]
    fn fire_request_for_missing_entity_is_silently_dropped() {
        let (mut app, _) = launch_test_app(true);
        let ghost = spawn_staged(&mut app);
        app.world_mut().entity_mut(ghost).despawn();

        app.world_mut().write_message(FireRequest {
            unit: ghost,
            impulse: Vec2::X,
        });
        app.update(); // must not panic
    }

    #[test]
    fn fire_without_a_well_leaves_the_unit_staged() {
        let (mut app, _) = launch_test_app(false);
        let unit = spawn_staged(&mut app);

        app.world_mut().write_message(FireRequest {
            unit,
            impulse: Vec2::X,
        });
        app.update();

        assert_eq!(*app.world().get::<UnitState>(unit).unwrap(), UnitState::Idle);
    }
}
