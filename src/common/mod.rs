/// Shared helpers used across the synthesis pipeline.
pub mod xml;
