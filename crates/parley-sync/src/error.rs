use thiserror::Error;

use parley_shared::error::ApiError;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("view is closed")]
    Closed,

    #[error(transparent)]
    Api(#[from] ApiError),
}
