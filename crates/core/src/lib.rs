//! Core business logic for CIRS.

pub mod services;

pub use services::*;
