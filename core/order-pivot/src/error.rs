//! FILENAME: core/order-pivot/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No data to export")]
    NoDataToExport,

    #[error("Render target not found: {0}")]
    MissingRenderTarget(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Export sink failed: {0}")]
    Sink(String),
}
