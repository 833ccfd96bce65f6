//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Cookie management
//! - Small cryptographic utilities (random bytes, constant-time compare)

pub mod cookie;
pub mod crypto;
pub mod password;
