//! Shared types for the agro backend.
//!
//! Provides the typed identifiers used across the producer, farm and
//! planted-crop resources so that IDs of different resources cannot be
//! mixed up.

pub mod ids;

pub use ids::{CropId, FarmId, ProducerId};
