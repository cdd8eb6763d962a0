//! User Scaffold - user CRUD service
//!
//! A single "user" resource backed by a relational store, with writes
//! wrapped in transactions and reads served through an optional Redis
//! cache.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities
//! - **services**: Application use cases and error translation
//! - **infra**: Database, transactions, user store and cache
//! - **api**: HTTP handlers, extractors, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{NewUser, User, UserChanges, UserListFilter};
pub use errors::{AppError, AppResult, ErrorKind};
pub use infra::{Cache, TransactionManager, TxContext};
pub use services::{UserManager, UserService};
