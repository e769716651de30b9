//! Storage layer.
//!
//! The [`PersistenceGateway`] trait is the boundary between the in-memory
//! entity store and durable storage. Two backends ship with the crate:
//!
//! | Backend | Location | Use |
//! |---------|----------|-----|
//! | [`FilesystemGateway`] | One JSON file per collection | Application data |
//! | [`MemoryGateway`] | Process memory | Tests, failure injection |
//!
//! Multi-collection operations (deleting a folder rewrites both the folder and
//! the prompt collections) are sequential whole-file writes, not a transaction.

// Allow significant_drop_tightening - guards are held only across a clone or assignment.
#![allow(clippy::significant_drop_tightening)]

mod filesystem;
mod memory;
mod traits;

pub use filesystem::{BACKUP_VERSION, BackupData, BackupDocument, FilesystemGateway};
pub use memory::{Collection, MemoryGateway};
pub use traits::PersistenceGateway;
