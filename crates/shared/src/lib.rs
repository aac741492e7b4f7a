//! Shared types, errors, and configuration for budgetexec.
//!
//! This crate provides common pieces used across the other crates:
//! - Pagination types for row listings
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, StalePolicy};
pub use error::{AppError, AppResult};
