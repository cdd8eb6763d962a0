//! User domain entity and related types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User domain entity
///
/// This is also the payload stored in the cache, so field changes must be
/// paired with a bump of the cache key version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Store-assigned identifier
    #[schema(example = 42)]
    pub id: i64,
    /// External identifier, unique when present
    pub external_id: Option<Uuid>,
    /// Email address, unique across users
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Display name
    #[schema(example = "John Doe")]
    pub name: String,
    /// Alternate or former name
    pub used_name: Option<String>,
    /// Affiliation
    pub company: Option<String>,
    /// Birth date
    #[schema(example = "1990-05-17")]
    pub birth: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub used_name: Option<String>,
    pub company: Option<String>,
    pub birth: Option<NaiveDate>,
}

impl NewUser {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Input for updating a user.
///
/// Optional attributes are replaced wholesale; `email` is only changed
/// when provided.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub email: Option<String>,
    pub name: String,
    pub used_name: Option<String>,
    pub company: Option<String>,
    pub birth: Option<NaiveDate>,
}

impl UserChanges {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Filter for listing users.
///
/// `page` and `page_size` are taken as given; out-of-range values are
/// normalised by [`crate::types::PageRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListFilter {
    /// Exact email match
    pub email: Option<String>,
    /// Substring match on name
    pub name_like: Option<String>,
    pub page: i64,
    pub page_size: i64,
}
