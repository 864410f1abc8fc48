use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("domain error: {0}")]
    Domain(#[from] devreg_domain::DomainError),

    #[error("store error: {0}")]
    Store(#[from] devreg_store::StoreError),
}
