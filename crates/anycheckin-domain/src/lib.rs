// Domain layer - Pure business logic
// No dependencies on infrastructure or presentation layers

pub mod account;
pub mod challenge;
pub mod check_in;
pub mod notification;
pub mod session;
pub mod shared;
pub mod task;

// Re-exports for convenience
pub use shared::{AccountId, DomainError, TaskId};
