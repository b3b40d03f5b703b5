//! Storage for the watched archive directory.
//!
//! The catalog only ever looks at one flat directory. This crate hides how
//! that directory is reached behind [`StorageBackend`], so the library can
//! list archives, fingerprint them, open them for reading and drop uploads
//! into place without caring about the filesystem underneath.

pub mod backend;
pub mod error;
mod models;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::models::FileInfo;
pub use crate::path::validate as validate_path;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
