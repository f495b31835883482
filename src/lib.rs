//! Behavior-tree task assignment service.

pub mod assignment;
pub mod config;
pub mod error;
pub mod store;
