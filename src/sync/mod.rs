//! Sync layer: reconciles the manifest and the package index into records
//!
//! # Flow
//!
//! ```text
//! requirements.txt ──▶ sync_local ──▶ RecordStore ──▶ sync_remote ──▶ SyncReport
//!                                          ▲               │
//!                                          └── update ─────┘
//!                                                          │
//!                                                     PackageIndex
//! ```
//!
//! # Modules
//!
//! - [`engine`]: `SyncEngine`, the only writer of package records
//! - [`report`]: `LocalSync`, `SyncReport` and the text summary
//! - [`clock`]: Injectable time source for `checked_pypi_at`
//! - [`error`]: `SyncError`

pub mod clock;
pub mod engine;
pub mod error;
pub mod report;

pub use clock::{Clock, SystemClock};
pub use engine::SyncEngine;
pub use error::SyncError;
pub use report::{FailureKind, LocalSync, SyncFailure, SyncReport};
