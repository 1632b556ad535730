//! Command implementations

pub mod cache;
pub mod import;
pub mod list;
pub mod seed_admin;
