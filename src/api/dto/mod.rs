//! Data Transfer Objects for REST request/response serialization.
//!
//! Event bodies are the domain records themselves; these types only wrap
//! them with query and pagination envelopes.

pub mod common_dto;
pub mod event_dto;

pub use common_dto::*;
pub use event_dto::*;
