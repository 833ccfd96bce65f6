//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" shared by every crate in
//! the workspace:
//! - Unified error type and result aliases
//! - Error classification that maps onto HTTP status codes
//! - Type-safe ID wrappers for domain entities
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
