//! Value Objects

pub mod account_id;
pub mod email;

pub use account_id::AccountId;
pub use email::Email;
