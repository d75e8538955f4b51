//! Simulation-specific error types.
//!
//! The simulation core recovers from runtime anomalies locally (stale entity
//! references are skipped, degenerate geometry is floored, re-entrant merge
//! claims are absorbed), so these types exist for the one class of failure
//! that must surface: invalid load-time data.  A tier catalog that fails
//! validation aborts startup before the first simulation step.

use std::fmt;

/// Top-level error enum for the coalesce simulation.
#[derive(Debug)]
pub enum SimError {
    /// The tier catalog contains no templates.
    EmptyCatalog,

    /// A tier index was requested that has no template in the catalog.
    UnknownTier {
        /// The tier index that failed to resolve.
        tier: u32,
    },

    /// Catalog tier indices are not strictly increasing, so the
    /// next-tier chain would be ambiguous or cyclic.
    NonMonotonicCatalog {
        /// Tier index at which the ordering broke.
        tier: u32,
    },

    /// A tier template carries a non-positive mass or scale.
    DegenerateTemplate {
        /// Offending tier index.
        tier: u32,
        /// Name of the field that was rejected.
        field: &'static str,
    },

    /// Simulation constant is outside its safe operating range.
    /// Returned by validation helpers; not triggered at runtime by default.
    UnsafeConstant {
        /// Name of the constant (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::EmptyCatalog => write!(f, "tier catalog is empty"),
            SimError::UnknownTier { tier } => {
                write!(f, "no template found for tier {}", tier)
            }
            SimError::NonMonotonicCatalog { tier } => write!(
                f,
                "tier catalog indices must be strictly increasing (broken at tier {})",
                tier
            ),
            SimError::DegenerateTemplate { tier, field } => {
                write!(f, "tier {} has a non-positive '{}'", tier, field)
            }
            SimError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
        }
    }
}

impl std::error::Error for SimError {}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error if `gravity_const` is outside its validated safe range.
///
/// Values above 800.0 have been observed to cause launched units to
/// repeatedly overshoot the well and orbit at the damping boundary.
pub fn validate_gravity_const(value: f32) -> SimResult<()> {
    if value <= 0.0 || value > 800.0 {
        Err(SimError::UnsafeConstant {
            name: "GRAVITY_CONST",
            value,
            safe_range: "(0.0, 800.0]",
        })
    } else {
        Ok(())
    }
}

/// Returns an error unless `damp_radius` is strictly greater than
/// `sleep_radius` — the damping blend divides by their difference.
pub fn validate_damp_radius(damp_radius: f32, sleep_radius: f32) -> SimResult<()> {
    if damp_radius <= sleep_radius {
        Err(SimError::UnsafeConstant {
            name: "DAMP_RADIUS",
            value: damp_radius,
            safe_range: "(SLEEP_RADIUS, ∞)",
        })
    } else {
        Ok(())
    }
}

/// Returns an error if `max_force` is not strictly positive.
pub fn validate_max_force(value: f32) -> SimResult<()> {
    if value <= 0.0 {
        Err(SimError::UnsafeConstant {
            name: "MAX_FORCE",
            value,
            safe_range: "(0.0, ∞)",
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gravity_const_in_range_passes() {
        assert!(validate_gravity_const(300.0).is_ok());
    }

    #[test]
    fn gravity_const_zero_is_rejected() {
        assert!(validate_gravity_const(0.0).is_err());
    }

    #[test]
    fn damp_radius_must_exceed_sleep_radius() {
        assert!(validate_damp_radius(2.4, 0.6).is_ok());
        assert!(validate_damp_radius(0.6, 0.6).is_err());
        assert!(validate_damp_radius(0.5, 0.6).is_err());
    }

    #[test]
    fn error_messages_name_the_offending_tier() {
        let msg = SimError::UnknownTier { tier: 9 }.to_string();
        assert!(msg.contains('9'));
    }
}
