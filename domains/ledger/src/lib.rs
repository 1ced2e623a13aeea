//! Ledger domain: energy balance and reward center

pub mod domain;

// Re-export domain types at the crate root for convenience
pub use domain::entities::CreditLedger;
pub use domain::rewards::{RewardCenter, RewardKind};
