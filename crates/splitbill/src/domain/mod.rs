//! Core records shared by every layer.

pub mod errors;
pub mod model;
