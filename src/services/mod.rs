//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence concerns so route
//! handlers can stay focused on protocol translation.

pub mod assistant;
pub mod diagram;
pub mod guard;
pub mod persistence;
pub mod transcript;
