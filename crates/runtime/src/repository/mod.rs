//! Repository layer for dynamic runtime data.
//!
//! Repositories handle data that changes during play:
//! - The committed action log, used for replay and late-join catch-up
//! - World snapshots, used for save/load

mod action_log;
mod error;
mod state;

pub use action_log::{ActionLogReader, ActionLogRecord, FileActionLog, MAX_RECORD_LEN};
pub use error::{RepositoryError, Result};
pub use state::{FileStateRepository, StateRepository};
