//! Document sections.
//!
//! A section is one subdivision of the build document: either the build
//! procedure of a single package, or a series of free-standing configuration
//! commands. Sections are generated strictly in document order; their ids are
//! only keys for directive and parameter lookups, never a sort order (ids can
//! regress across document subdivisions).
//!
//! # Submodules
//!
//! - [`archive`] - Resolution of a package section's archive and subdirectory

pub mod archive;
mod types;

pub use types::*;
