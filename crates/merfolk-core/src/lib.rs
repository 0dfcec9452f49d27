//! # Merfolk Core
//!
//! Target-agnostic intermediate code model produced by the Merfolk diagram
//! front-end and consumed by code emitters.
//!
//! - [`model`] - Entities, attributes, methods and statement bodies.
//! - [`types`] - Classification of type names (void, primitives) and default values.
//! - [`naming`] - Local variable naming helpers.

pub mod model;
pub mod naming;
pub mod types;
