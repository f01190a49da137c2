//! Error types for trace generation and playback
//!
//! Every error is recoverable: the playback engine halts the current step and
//! `reset` is always available.

use thiserror::Error;

use crate::sim::entity::{EntityId, Property};

pub type Result<T> = std::result::Result<T, VisError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisError {
    /// Malformed generator arguments or configuration
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// An operation named an identifier that is not in the current collection
    #[error("entity not found: {id}")]
    EntityNotFound { id: EntityId },

    /// A retarget was issued while another retarget of the same property is live
    #[error("conflicting {property} operation on entity {id}")]
    ConflictingOperation { id: EntityId, property: Property },
}

impl VisError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
