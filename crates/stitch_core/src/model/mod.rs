//! Declaration-time descriptor models.
//!
//! # Responsibility
//! - Define the canonical records consumed by the locate/resolve/compose
//!   pipeline.
//! - Keep identifier and naming rules in one place.

pub mod fragment;
pub mod repository;
