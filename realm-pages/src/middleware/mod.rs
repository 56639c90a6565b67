//! Middleware for page routers

pub mod admin;

pub use admin::require_admin;
