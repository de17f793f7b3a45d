//! File-backed stores for protection state and the event log

pub mod file;
pub mod log_store;
pub mod protection_store;

pub use log_store::LogStore;
pub use protection_store::ProtectionStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
