//! Shared types and collaborator interfaces
//!
//! This module contains the value types and traits used across the wheel,
//! layout and rules components.

pub mod types;
pub mod traits;
