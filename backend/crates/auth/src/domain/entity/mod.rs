//! Entities

pub mod account;
