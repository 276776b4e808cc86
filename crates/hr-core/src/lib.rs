//! # hr-core
//!
//! Core types, traits, and utilities for the HR portal backend.
//!
//! This crate provides the foundational building blocks used across all other crates:
//! - Common error types
//! - Result type alias
//! - Core traits (Identifiable, Timestamped)
//! - Pagination types
//! - Configuration types

pub mod config;
pub mod error;
pub mod pagination;
pub mod result;
pub mod traits;

pub use error::*;
pub use pagination::*;
pub use result::*;
pub use traits::*;
