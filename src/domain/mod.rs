//! Domain layer - Core business entities
//!
//! Plain data types describing a user account and the inputs that create,
//! change, and list them. No infrastructure concerns live here.

pub mod user;

pub use user::{NewUser, User, UserChanges, UserListFilter};
