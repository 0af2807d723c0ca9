//! Storage abstraction and implementations for EduHub.
//!
//! The course catalog and the enrollment store are separate traits so a
//! caller can back them with different services. Both a JSON-file and an
//! in-memory implementation are provided.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;
pub mod memory;

pub use trait_::{Catalog, EnrollmentStore, StorageError, Result};
pub use json_storage::JsonStorage;
pub use memory::MemoryStorage;
