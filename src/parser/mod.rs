//! Manifest parser layer
//! - traits.rs: ManifestParser trait definition
//! - types.rs: Common types (RequirementSpec, Manifest, SkippedLine)
//! - requirements_txt.rs: pip requirements file parser

pub mod requirements_txt;
pub mod traits;
pub mod types;

pub use requirements_txt::RequirementsTxtParser;
pub use traits::{ManifestParser, ParseError};
pub use types::{Manifest, RequirementSpec, SkippedLine, normalize_name};
