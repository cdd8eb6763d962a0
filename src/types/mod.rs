//! Shared types for DRY compliance.

mod pagination;
mod response;

pub use pagination::{Page, PageRequest, UserPage};
pub use response::{Created, NoContent};
