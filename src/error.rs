use crate::domain::access::{Role, Screen};
use crate::domain::customer::CustomerId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),
    #[error("Payment #{number} not found for customer {customer}")]
    PaymentNotFound { customer: CustomerId, number: usize },
    #[error("Confirmation required: {0}")]
    ConfirmationRequired(String),
    #[error("Access denied: role '{role}' cannot open {screen}")]
    AccessDenied { role: Role, screen: Screen },
    #[error("Invalid user or password")]
    InvalidCredentials,
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
