//! Ports - Trait definitions the application layer depends on.

pub mod engine;
pub mod ingest;
pub mod observer;
