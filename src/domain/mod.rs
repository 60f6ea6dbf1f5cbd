//! Domain layer - Pure business logic.

pub mod errors;
pub mod media;
pub mod state;
