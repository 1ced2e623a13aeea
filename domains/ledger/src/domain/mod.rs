//! Ledger domain logic

pub mod entities;
pub mod rewards;
