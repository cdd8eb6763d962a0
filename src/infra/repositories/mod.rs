//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

pub(crate) mod entities;
mod executor;
mod user_repository;

pub use executor::Executor;
pub use user_repository::{UserRepository, UserStore};
