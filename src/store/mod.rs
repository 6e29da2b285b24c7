pub mod history;
pub mod port;
pub mod templates;

pub use history::*;
pub use port::*;
pub use templates::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
