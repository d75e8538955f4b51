//! Merge-and-drop gravity-well simulation core
//!
//! Launched circular units of ordered tiers are pulled toward a central well;
//! two touching units of the same tier fuse into one unit of the next tier,
//! chaining until the terminal tier. Rigid-body integration and collision
//! detection are delegated to Rapier2D; this crate owns the gravity-well
//! stabilization model and the merge resolution protocol layered on top.

pub mod config;
pub mod constants;
pub mod error;
pub mod launch;
pub mod merge;
pub mod registry;
pub mod scenario;
pub mod scoring;
pub mod simulation;
pub mod tier;
pub mod unit;
pub mod well;
