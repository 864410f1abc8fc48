use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unrecognized scope type '{0}'")]
    InvalidScope(String),

    #[error(transparent)]
    Store(#[from] devreg_store::StoreError),
}
