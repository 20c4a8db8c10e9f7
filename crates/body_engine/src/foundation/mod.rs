//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and precision conversions
//! - Handle types for externally owned registries
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod logging;
