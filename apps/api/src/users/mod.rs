//! Admin user management.

pub mod handlers;
pub mod repo;
