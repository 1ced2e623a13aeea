//! Restoration domain logic

pub mod entities;
pub mod state;
