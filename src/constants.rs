//! Centralised simulation and gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//!
//! ## Tuning guidance
//!
//! Each constant includes the tested range and the observable consequence of
//! changing it.  `src/constants.rs` remains the **authoritative default**
//! source used by `SimConfig::default()`; runtime overrides go in
//! `assets/simulation.toml`.

// ── Gravity Well ──────────────────────────────────────────────────────────────

/// Inverse-square attraction strength of the central well.
///
/// Higher values → faster infall → harder collisions at the well boundary.
/// At 300.0 a unit 10 u from the center feels `300/10² = 3` force units per
/// unit mass.  Values above ~800 cause launched units to overshoot and orbit.
pub const GRAVITY_CONST: f32 = 300.0;

/// Distance floor used in the inverse-square denominator.
///
/// Below `SLEEP_RADIUS` the raw `G/d²` term diverges; the force is evaluated
/// at `max(d, SLEEP_RADIUS)` instead, so the pull saturates at the boundary
/// rather than spiking toward infinity.
pub const SLEEP_RADIUS: f32 = 0.6;

/// Maximum speed (u/s) at which a unit inside `SLEEP_RADIUS` counts as settled.
///
/// Lower values → units must come to a firmer rest before sleeping.
/// Tested range: 0.02–0.10.
pub const SLEEP_SPEED: f32 = 0.05;

/// Consecutive settled frames required before a unit transitions to sleep.
///
/// At 45 frames a unit must hold still for ~0.75 s of fixed steps.  Shorter
/// thresholds sleep units that are merely pausing at an orbit apex.
pub const SLEEP_FRAME_THRESHOLD: u32 = 45;

/// Outer radius of the damping blend zone.
///
/// Between `DAMP_RADIUS` and `SLEEP_RADIUS` the damping blend factor ramps
/// linearly from 0 to 1.  Units outside `DAMP_RADIUS` feel pure gravity.
/// Must stay strictly greater than `SLEEP_RADIUS`.
pub const DAMP_RADIUS: f32 = 2.4;

/// Damping coefficient applied to the radial velocity component inside the
/// blend zone, per unit mass.
///
/// Tested range: 4.0–12.0.  Too low and units bounce off the well boundary
/// repeatedly; too high and they stop dead mid-fall, looking stuck.
pub const RADIAL_DAMPING_COEF: f32 = 8.0;

/// Damping coefficient applied to the tangential velocity component inside
/// the blend zone, per unit mass.
///
/// This is what prevents indefinite orbiting around the center.  Kept lower
/// than the radial coefficient so approaches still curve naturally.
pub const TANGENTIAL_DAMPING_COEF: f32 = 4.0;

/// Magnitude clamp applied to the net per-step force on any one unit.
///
/// Bounds the worst-case acceleration when gravity and both damping terms
/// align.  Tested range: 40–100.
pub const MAX_FORCE: f32 = 60.0;

/// Radius inside which small outward rebounds are cancelled directly on the
/// velocity.
///
/// Slightly smaller than `SLEEP_RADIUS` so the kill zone sits just inside the
/// well boundary where contact rebounds originate.
pub const BOUNCE_KILL_RADIUS: f32 = 0.55;

/// Outward radial speed (u/s) below which a rebound is considered a
/// micro-bounce and removed.
///
/// Rebounds at or above this speed are real physics responses and are left to
/// the damping forces.  Tested range: 0.04–0.10.
pub const BOUNCE_KILL_SPEED: f32 = 0.06;

/// Speed (and rad/s) below which linear/angular velocity snaps to exactly
/// zero after force application.
///
/// Suppresses floating-point jitter that would otherwise keep resetting the
/// sleep counter.
pub const VELOCITY_EPSILON: f32 = 1e-3;

// ── Launch ────────────────────────────────────────────────────────────────────

/// Maximum drag distance (world units) a launch gesture converts to power.
pub const MAX_POWER: f32 = 3.0;

/// Multiplier from clamped drag distance to impulse magnitude.
pub const POWER_COEF: f32 = 5.0;

/// Seconds between a successful fire and the next staged unit appearing.
pub const RESPAWN_DELAY_SECS: f32 = 1.0;

/// Staging point where Idle units wait to be fired, relative to the well
/// center.
pub const STAGING_OFFSET_X: f32 = 3.5;
pub const STAGING_OFFSET_Y: f32 = 0.0;

// ── Units ─────────────────────────────────────────────────────────────────────

/// Collider radius of a tier at `scale = 1.0`; the template scale multiplies
/// this.
pub const BASE_UNIT_RADIUS: f32 = 0.25;

/// Restitution coefficient for unit–unit contacts.
/// 0.0 = perfectly inelastic; kept low so stacked units settle instead of
/// trampolining inside the damping zone.
pub const UNIT_RESTITUTION: f32 = 0.2;

/// Friction coefficient for unit–unit contacts.
pub const UNIT_FRICTION: f32 = 0.8;
