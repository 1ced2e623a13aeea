//! Works domain: restored-work gallery with 24-hour retention

pub mod domain;
pub mod scheduler;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{retention, WorkGallery, WorkItem, WorkKind};
pub use scheduler::ExpiryScheduler;
