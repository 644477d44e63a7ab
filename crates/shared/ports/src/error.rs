use agora_core::{OrderId, Side};
use thiserror::Error;

/// Domain-level errors for book operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("{0:?} container is empty")]
    Empty(Side),

    #[error("Order {0} is queued but missing from the container index")]
    MissingOrder(OrderId),
}

pub type BookResult<T> = std::result::Result<T, BookError>;
