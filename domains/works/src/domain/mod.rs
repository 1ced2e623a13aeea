//! Works domain logic

pub mod entities;
