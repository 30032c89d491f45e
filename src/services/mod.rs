pub mod membership_service;

pub use membership_service::{MembershipService, MembershipStore};

use thiserror::Error;

use crate::database::DatabaseError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
