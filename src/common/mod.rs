// Shared constants and helpers used across the crate
pub mod constants;
pub mod utils;
