//! Runtime simulation configuration loaded from `assets/simulation.toml`.
//!
//! [`SimConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_sim_config`] reads
//! `assets/simulation.toml` and overwrites the defaults with any values
//! present in the file.  Missing keys fall back to the compile-time defaults,
//! so a minimal TOML can override just the constants you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<SimConfig>` to any system parameter list and read values
//! with `config.gravity_const`, `config.sleep_radius`, etc.
//!
//! ## Tuning workflow
//!
//! 1. Edit `assets/simulation.toml`.
//! 2. Restart the simulation — no recompilation required.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `SimConfig::default()`.

use crate::constants::*;
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable simulation configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Override any subset by setting the value in
/// `assets/simulation.toml`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // ── Gravity Well ─────────────────────────────────────────────────────────
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

    // ── Launch ───────────────────────────────────────────────────────────────
    pub max_power: f32,
    pub power_coef: f32,
    pub respawn_delay_secs: f32,
    pub staging_offset_x: f32,
    pub staging_offset_y: f32,

    // ── Units ────────────────────────────────────────────────────────────────
    pub base_unit_radius: f32,
    pub unit_restitution: f32,
    pub unit_friction: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            // Gravity Well
            gravity_const: GRAVITY_CONST,
            sleep_radius: SLEEP_RADIUS,
            sleep_speed: SLEEP_SPEED,
            sleep_frame_threshold: SLEEP_FRAME_THRESHOLD,
            damp_radius: DAMP_RADIUS,
            radial_damping_coef: RADIAL_DAMPING_COEF,
            tangential_damping_coef: TANGENTIAL_DAMPING_COEF,
            max_force: MAX_FORCE,
            bounce_kill_radius: BOUNCE_KILL_RADIUS,
            bounce_kill_speed: BOUNCE_KILL_SPEED,
            velocity_epsilon: VELOCITY_EPSILON,
            // Launch
            max_power: MAX_POWER,
            power_coef: POWER_COEF,
            respawn_delay_secs: RESPAWN_DELAY_SECS,
            staging_offset_x: STAGING_OFFSET_X,
            staging_offset_y: STAGING_OFFSET_Y,
            // Units
            base_unit_radius: BASE_UNIT_RADIUS,
            unit_restitution: UNIT_RESTITUTION,
            unit_friction: UNIT_FRICTION,
        }
    }
}

impl SimConfig {
    /// World-space staging point for newly spawned Idle units.
    pub fn staging_point(&self) -> Vec2 {
        Vec2::new(self.staging_offset_x, self.staging_offset_y)
    }

    /// Upper bound on the impulse magnitude a single fire may apply.
    pub fn max_impulse(&self) -> f32 {
        self.max_power * self.power_coef
    }
}

/// Startup system: attempt to load `assets/simulation.toml` and overwrite the
/// `SimConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  TOML parse errors are logged
/// but do not abort the simulation.  A missing file is silently ignored
/// (defaults are already in place from `insert_resource`).
pub fn load_sim_config(mut config: ResMut<SimConfig>) {
    let path = "assets/simulation.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<SimConfig>(&contents) {
            Ok(loaded) => {
                *config = loaded;
                println!("✓ Loaded simulation config from {path}");
            }
            Err(e) => {
                warn!("Failed to parse {path}: {e}; using defaults");
            }
        },
        Err(_) => {
            // File not present — defaults are already in place; not an error.
            println!("ℹ No {path} found; using compiled defaults");
        }
    }
}
