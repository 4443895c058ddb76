pub mod backend;
pub mod error;
mod models;
mod path;
mod source;

pub use crate::backend::StorageBackend;
pub use crate::models::FileRecord;
pub use crate::path::validate as validate_path;
pub use crate::source::SourceFolder;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
