//! Application layer - Generic services that use ports.

pub mod pipeline;
pub mod transcoder;
