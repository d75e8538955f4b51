//! Tier catalog: the ordered table of unit templates.
//!
//! Every unit in the simulation is an instance of a [`TierTemplate`].  The
//! catalog is load-time data — it is read once at startup (compiled defaults,
//! optionally overridden by `assets/tiers.toml`), validated, and never
//! mutated afterwards.  A catalog that fails validation aborts startup:
//! handing the simulation a tier index with no template is a configuration
//! error, not a runtime condition.

use crate::error::{SimError, SimResult};
use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;

/// Immutable description of one unit tier.
#[derive(Debug, Clone, Deserialize)]
pub struct TierTemplate {
    /// Position in the tier order, 1-based.  Strictly increasing across the
    /// catalog; merging two units of tier `n` produces one unit of the next
    /// catalog entry.
    pub tier: u32,
    /// Display name, used only for logging.
    pub name: String,
    /// Rigid-body mass handed to the physics engine and used by the gravity
    /// force computation.
    pub mass: f32,
    /// Multiplier on [`crate::constants::BASE_UNIT_RADIUS`] giving the
    /// collider radius.
    pub scale: f32,
    /// Points awarded when a pair of this tier is consumed by a merge.
    pub score_value: u32,
}

/// The ordered tier table, resolved and validated at startup.
#[derive(Resource, Debug, Clone)]
pub struct TierCatalog {
    templates: Vec<TierTemplate>,
}

/// On-disk shape of `assets/tiers.toml`.
#[derive(Debug, Deserialize)]
struct TierCatalogFile {
    tiers: Vec<TierTemplate>,
}

impl Default for TierCatalog {
    /// Seven tiers from dust to star.  Mass grows by half a unit per tier
    /// (tier 1 has mass 1.0); score doubles the base 10 per tier step.
    fn default() -> Self {
        let names = [
            "dust", "pebble", "boulder", "moonlet", "moon", "planet", "star",
        ];
        let templates = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let tier = i as u32 + 1;
                TierTemplate {
                    tier,
                    name: (*name).to_string(),
                    mass: 1.0 + i as f32 * 0.5,
                    scale: 1.0 + i as f32 * 0.45,
                    score_value: 10 * tier,
                }
            })
            .collect();
        Self { templates }
    }
}

impl TierCatalog {
    /// Build a catalog from an explicit template list, validating it.
    pub fn from_templates(templates: Vec<TierTemplate>) -> SimResult<Self> {
        let catalog = Self { templates };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Checks the invariants the merge chain depends on: at least one tier,
    /// strictly increasing tier indices, positive mass and scale.
    pub fn validate(&self) -> SimResult<()> {
        if self.templates.is_empty() {
            return Err(SimError::EmptyCatalog);
        }
        let mut prev: Option<u32> = None;
        for t in &self.templates {
            if let Some(p) = prev {
                if t.tier <= p {
                    return Err(SimError::NonMonotonicCatalog { tier: t.tier });
                }
            }
            if t.mass <= 0.0 {
                return Err(SimError::DegenerateTemplate {
                    tier: t.tier,
                    field: "mass",
                });
            }
            if t.scale <= 0.0 {
                return Err(SimError::DegenerateTemplate {
                    tier: t.tier,
                    field: "scale",
                });
            }
            prev = Some(t.tier);
        }
        Ok(())
    }

    /// Look up the template for a tier index.
    pub fn template(&self, tier: u32) -> SimResult<&TierTemplate> {
        self.templates
            .iter()
            .find(|t| t.tier == tier)
            .ok_or(SimError::UnknownTier { tier })
    }

    /// The tier produced by merging a pair of `tier`, or `None` for the
    /// terminal tier — the catalog order itself is the next-tier chain.
    pub fn next_tier(&self, tier: u32) -> Option<u32> {
        let idx = self.templates.iter().position(|t| t.tier == tier)?;
        self.templates.get(idx + 1).map(|t| t.tier)
    }

    /// Index of the terminal tier (highest entry).  The catalog is validated
    /// non-empty before any system runs.
    pub fn final_tier(&self) -> u32 {
        self.templates.last().map(|t| t.tier).unwrap_or(0)
    }

    /// Number of tiers in the catalog.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// True when the catalog holds no templates (only before validation).
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// All templates in catalog order.
    pub fn templates(&self) -> &[TierTemplate] {
        &self.templates
    }

    /// Pick a random tier from the lower half of the catalog — the pool that
    /// staged respawns draw from, so the player is never handed a tier they
    /// should have to earn by merging.
    pub fn roll_staged_tier<R: Rng>(&self, rng: &mut R) -> u32 {
        let half = (self.templates.len() / 2).max(1);
        self.templates[rng.gen_range(0..half)].tier
    }
}

/// Startup system: replace the compiled default catalog with
/// `assets/tiers.toml` when present.
///
/// Unlike [`crate::config::load_sim_config`], a file that parses but fails
/// validation is **fatal** — the merge chain cannot run against a broken
/// tier order, and the failure belongs to the person who edited the file.
pub fn load_tier_catalog(mut catalog: ResMut<TierCatalog>) {
    let path = "assets/tiers.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<TierCatalogFile>(&contents) {
            Ok(file) => {
                match TierCatalog::from_templates(file.tiers) {
                    Ok(loaded) => {
                        *catalog = loaded;
                        println!("✓ Loaded {} tiers from {path}", catalog.len());
                    }
                    Err(e) => panic!("invalid tier catalog in {path}: {e}"),
                }
            }
            Err(e) => panic!("failed to parse {path}: {e}"),
        },
        Err(_) => {
            println!("ℹ No {path} found; using compiled default catalog");
        }
    }
}
