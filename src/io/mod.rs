//! Input loading and artifact export at the simulation boundary.

pub mod export;
pub mod input;
