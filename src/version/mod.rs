//! Version layer: parsing, classification and index access
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Index    │────▶│ IndexPackage│────▶│   Version   │
//! │  (fetch)    │     │  (metadata) │     │  (PEP 440)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                                       │
//!        ▼                                       ▼
//! ┌─────────────┐                         ┌─────────────┐
//! │ Registries  │                         │    Diff     │
//! │   (PyPI)    │                         │ (classify)  │
//! └─────────────┘                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`pep440`]: Comparable `Version` built on PEP 440 parsing
//! - [`diff`]: `DiffStatus` and the pure `classify` function
//! - [`registry`]: `PackageIndex` trait for fetching package metadata
//! - [`registries`]: Concrete index implementations (PyPI)
//! - [`types`]: `IndexPackage` and classifier helpers
//! - [`error`]: Error types for version parsing and index access

pub mod diff;
pub mod error;
pub mod pep440;
pub mod registries;
pub mod registry;
pub mod types;

pub use diff::{DiffStatus, classify};
pub use pep440::Version;
