//! Custom request extractors.

mod params;
mod validated_json;

pub use params::{UserId, ValidQuery};
pub use validated_json::ValidatedJson;
