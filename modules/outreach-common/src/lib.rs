pub mod types;
pub mod ingest;
pub mod config;
pub mod error;

pub use types::*;
pub use config::{Config, DedupKey};
pub use error::OutreachError;
