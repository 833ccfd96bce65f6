//! Domain Layer
//!
//! Contains entities, value objects, the token codec, and the
//! repository trait.

pub mod entity;
pub mod repository;
pub mod token;
pub mod value_object;

// Re-exports
pub use entity::account::{Account, Identity};
pub use repository::AccountRepository;
