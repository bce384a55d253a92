use thiserror::Error;

use crate::parser::traits::ParseError;
use crate::store::error::StoreError;

/// Failure that aborts a whole sync phase
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Manifest(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
