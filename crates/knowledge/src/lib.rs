//! Keyword knowledge base.
//!
//! A persisted keyword-to-department table, independent of the embedding
//! classifier. It is loaded once at startup from a CSV or `.xlsx` sheet whose header row names
//! the departments and whose cells below each header are that department's
//! keywords, and it is rewritten in full after every insert.

mod error;
pub mod registry;
mod store;

pub use crate::error::KnowledgeError;
pub use crate::registry::{resolve_department, OTHER_DEPARTMENT};
pub use crate::store::{AddOutcome, KnowledgeBase};
